//! Form-field validators.
//!
//! Stateless predicates over loosely typed input. None of them panic or
//! return errors: input that does not fit simply fails the check.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

pub mod date;
pub mod value;

pub use value::{text_to_number, FieldValue};

pub const TASK_STATUSES: [&str; 3] = ["todo", "doing", "done"];
pub const PRIORITIES: [&str; 3] = ["low", "medium", "high"];
pub const MAX_NOTE_LENGTH: usize = 5000;
pub const DEFAULT_MIN_LENGTH: usize = 1;
pub const DEFAULT_MAX_LENGTH: usize = 255;

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static OBJECT_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{24}$").unwrap());
static ATTACHMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(https?://[^\s]+)$").unwrap());

fn regex_matches<T: FieldValue + ?Sized>(regex: &Regex, value: &T) -> bool {
    value
        .field_text()
        .is_some_and(|text| regex.is_match(&text))
}

/// True when the value is present and its text form has non-whitespace
/// content. `0` and `false` count as present.
pub fn required<T: FieldValue + ?Sized>(value: &T) -> bool {
    value
        .field_text()
        .is_some_and(|text| !text.trim().is_empty())
}

pub fn is_email<T: FieldValue + ?Sized>(value: &T) -> bool {
    regex_matches(&EMAIL_REGEX, value)
}

/// At least 8 characters on a single line, with a lowercase letter, an
/// uppercase letter and a digit.
pub fn is_strong_password<T: FieldValue + ?Sized>(value: &T) -> bool {
    let Some(text) = value.field_text() else {
        return false;
    };

    let single_line = !text
        .chars()
        .any(|c| matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}'));

    single_line
        && text.encode_utf16().count() >= 8
        && text.chars().any(|c| c.is_ascii_lowercase())
        && text.chars().any(|c| c.is_ascii_uppercase())
        && text.chars().any(|c| c.is_ascii_digit())
}

/// True when the value reads as a date under lenient parsing. Days are
/// bounded by 31, not by the month.
pub fn is_valid_date<T: FieldValue + ?Sized>(value: &T) -> bool {
    value
        .field_text()
        .is_some_and(|text| date::is_lenient_date(&text))
}

/// Numeric after loose coercion and strictly greater than zero.
pub fn is_positive_number<T: FieldValue + ?Sized>(value: &T) -> bool {
    value.field_number() > 0.0
}

pub fn is_valid_task_status<T: FieldValue + ?Sized>(value: &T) -> bool {
    value
        .as_text()
        .is_some_and(|status| TASK_STATUSES.contains(&status))
}

/// Case-insensitive, so `"HIGH"` passes.
pub fn is_valid_priority<T: FieldValue + ?Sized>(value: &T) -> bool {
    value
        .as_text()
        .is_some_and(|priority| PRIORITIES.contains(&priority.to_lowercase().as_str()))
}

/// True for an array whose every element is a 24-hex-digit id. An empty
/// array passes.
pub fn is_valid_id_array(value: &Value) -> bool {
    value
        .as_array()
        .is_some_and(|ids| ids.iter().all(|id| regex_matches(&OBJECT_ID_REGEX, id)))
}

pub fn is_valid_note_content<T: FieldValue + ?Sized>(value: &T) -> bool {
    required(value) && value.field_len().is_some_and(|len| len <= MAX_NOTE_LENGTH)
}

pub fn is_valid_attachment<T: FieldValue + ?Sized>(value: &T) -> bool {
    regex_matches(&ATTACHMENT_REGEX, value)
}

pub fn is_valid_marks<M, T>(marks: &M, total: &T) -> bool
where
    M: FieldValue + ?Sized,
    T: FieldValue + ?Sized,
{
    is_positive_number(marks) && marks.field_number() <= total.field_number()
}

/// Title and category present, amount positive, date valid. A missing key
/// is an absent value.
pub fn is_valid_budget_entry(entry: &Value) -> bool {
    let field = |key: &str| entry.get(key);

    required(&field("title"))
        && is_positive_number(&field("amount"))
        && required(&field("category"))
        && is_valid_date(&field("date"))
}

/// Present and between `min` and `max` UTF-16 code units, inclusive. The
/// usual bounds are [`DEFAULT_MIN_LENGTH`] and [`DEFAULT_MAX_LENGTH`].
pub fn is_valid_length<T: FieldValue + ?Sized>(value: &T, min: usize, max: usize) -> bool {
    required(value)
        && value
            .field_len()
            .is_some_and(|len| len >= min && len <= max)
}
