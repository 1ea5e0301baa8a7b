//! Loose views of form values.
//!
//! Form input reaches the validators as strings, numbers, booleans, JSON
//! values or nothing at all. [`FieldValue`] gives each of those the views
//! the predicates need: text form, string-only view, number and length.

use std::borrow::Cow;

use serde_json::Value;

pub trait FieldValue {
    /// Text form of the value; `None` for an absent or null value.
    fn field_text(&self) -> Option<Cow<'_, str>>;

    /// Loose numeric coercion; `NaN` when the value is not numeric.
    fn field_number(&self) -> f64;

    /// The value itself when it is a string, without coercion.
    fn as_text(&self) -> Option<&str> {
        None
    }

    /// Length in UTF-16 code units. Only strings (and JSON arrays) have one.
    fn field_len(&self) -> Option<usize> {
        self.as_text().map(|text| text.encode_utf16().count())
    }
}

/// Coerces text to a number the way loosely typed form code does:
/// surrounding whitespace is ignored, empty text is zero, `Infinity` and
/// `0x`/`0o`/`0b` prefixes are understood, anything else is `NaN`.
pub fn text_to_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match trimmed.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&trimmed[2..], radix)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }

    // Rust also accepts "inf" and "nan", which are not numbers here.
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return f64::NAN;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

impl FieldValue for str {
    fn field_text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self))
    }

    fn field_number(&self) -> f64 {
        text_to_number(self)
    }

    fn as_text(&self) -> Option<&str> {
        Some(self)
    }
}

impl FieldValue for String {
    fn field_text(&self) -> Option<Cow<'_, str>> {
        self.as_str().field_text()
    }

    fn field_number(&self) -> f64 {
        self.as_str().field_number()
    }

    fn as_text(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

impl FieldValue for bool {
    fn field_text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(if *self { "true" } else { "false" }))
    }

    fn field_number(&self) -> f64 {
        if *self {
            1.0
        } else {
            0.0
        }
    }
}

impl FieldValue for f64 {
    fn field_text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(self.to_string()))
    }

    fn field_number(&self) -> f64 {
        *self
    }
}

macro_rules! integer_field_value {
    ($($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                fn field_text(&self) -> Option<Cow<'_, str>> {
                    Some(Cow::Owned(self.to_string()))
                }

                fn field_number(&self) -> f64 {
                    *self as f64
                }
            }
        )*
    };
}

integer_field_value!(i32, i64, u32, u64, usize);

impl FieldValue for Value {
    fn field_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Null => None,
            Value::String(s) => s.field_text(),
            Value::Bool(b) => b.field_text(),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::Array(items) => {
                // Arrays stringify as their comma-joined elements.
                let parts: Vec<String> = items
                    .iter()
                    .map(|item| item.field_text().map(Cow::into_owned).unwrap_or_default())
                    .collect();
                Some(Cow::Owned(parts.join(",")))
            }
            Value::Object(_) => Some(Cow::Borrowed("[object Object]")),
        }
    }

    fn field_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => b.field_number(),
            Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            Value::String(s) => text_to_number(s),
            // `[5]` reads as "5", `[]` as "" and `[1, 2]` as "1,2".
            Value::Array(_) => self
                .field_text()
                .map_or(f64::NAN, |text| text_to_number(&text)),
            Value::Object(_) => f64::NAN,
        }
    }

    fn as_text(&self) -> Option<&str> {
        self.as_str()
    }

    /// Arrays have a length too: their element count.
    fn field_len(&self) -> Option<usize> {
        match self {
            Value::Array(items) => Some(items.len()),
            _ => self.as_text().map(|text| text.encode_utf16().count()),
        }
    }
}

/// `None` is an absent value: no text, not a number, no length.
impl<T: FieldValue> FieldValue for Option<T> {
    fn field_text(&self) -> Option<Cow<'_, str>> {
        self.as_ref().and_then(FieldValue::field_text)
    }

    fn field_number(&self) -> f64 {
        self.as_ref().map_or(f64::NAN, FieldValue::field_number)
    }

    fn as_text(&self) -> Option<&str> {
        self.as_ref().and_then(FieldValue::as_text)
    }
}

impl<T: FieldValue + ?Sized> FieldValue for &T {
    fn field_text(&self) -> Option<Cow<'_, str>> {
        (**self).field_text()
    }

    fn field_number(&self) -> f64 {
        (**self).field_number()
    }

    fn as_text(&self) -> Option<&str> {
        (**self).as_text()
    }
}
