//! Schedule payload parsing.
//!
//! Request bodies arrive as loosely typed JSON. [`SCHEDULE_FIELDS`] declares
//! each field's kind and presence rule; [`NewSchedule::from_json`] and
//! [`SchedulePatch::from_json`] check a body against that table before
//! anything reaches a store. Keys not in the table (including `id`,
//! `ownerId` and the timestamps) are ignored.

use serde_json::{Map, Value};

use crate::models::schedule::{Weekday, DEFAULT_COLOR};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Day,
    Flag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Must be present and non-empty on create; may not be cleared.
    Required,
    /// Filled from the default on create; may not be cleared.
    Defaulted,
    /// May be omitted or set to `null`.
    Optional,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub key: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
}

const fn rule(key: &'static str, kind: FieldKind, presence: Presence) -> FieldRule {
    FieldRule {
        key,
        kind,
        presence,
    }
}

pub const SUBJECT: FieldRule = rule("subject", FieldKind::Text, Presence::Required);
pub const DAY: FieldRule = rule("day", FieldKind::Day, Presence::Required);
pub const START_TIME: FieldRule = rule("startTime", FieldKind::Text, Presence::Required);
pub const END_TIME: FieldRule = rule("endTime", FieldKind::Text, Presence::Required);
pub const LOCATION: FieldRule = rule("location", FieldKind::Text, Presence::Optional);
pub const COLOR: FieldRule = rule("color", FieldKind::Text, Presence::Defaulted);
pub const TEACHER: FieldRule = rule("teacher", FieldKind::Text, Presence::Optional);
pub const RECURRING: FieldRule = rule("recurring", FieldKind::Flag, Presence::Defaulted);

pub const SCHEDULE_FIELDS: [FieldRule; 8] = [
    SUBJECT, DAY, START_TIME, END_TIME, LOCATION, COLOR, TEACHER, RECURRING,
];

/// A validated schedule ready for insertion. The owner is attached by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSchedule {
    pub subject: String,
    pub day: Weekday,
    pub start_time: String,
    pub end_time: String,
    pub location: Option<String>,
    pub color: String,
    pub teacher: Option<String>,
    pub recurring: bool,
}

/// A validated partial update. `None` leaves a column untouched;
/// `Some(None)` clears a nullable column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchedulePatch {
    pub subject: Option<String>,
    pub day: Option<Weekday>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: Option<Option<String>>,
    pub color: Option<String>,
    pub teacher: Option<Option<String>>,
    pub recurring: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
enum Cast {
    Text(String),
    Day(Weekday),
    Flag(bool),
}

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Absent,
    Null,
    Set(Cast),
    Invalid,
}

struct FieldReader<'a> {
    body: &'a Map<String, Value>,
    errors: Vec<String>,
}

impl<'a> FieldReader<'a> {
    fn new(body: &'a Map<String, Value>) -> Self {
        let ignored: Vec<&str> = body
            .keys()
            .map(String::as_str)
            .filter(|key| !SCHEDULE_FIELDS.iter().any(|field| field.key == *key))
            .collect();
        if !ignored.is_empty() {
            tracing::debug!(?ignored, "Ignoring non-schedule fields in payload");
        }

        Self {
            body,
            errors: Vec::new(),
        }
    }

    fn fail(&mut self, rule: FieldRule, reason: impl Into<String>) {
        self.errors.push(format!("{}: {}", rule.key, reason.into()));
    }

    fn read(&mut self, rule: FieldRule) -> Slot {
        let value = match self.body.get(rule.key) {
            None => return Slot::Absent,
            Some(Value::Null) => return Slot::Null,
            Some(value) => value,
        };

        match cast(rule.kind, value) {
            Ok(Cast::Text(text)) if rule.presence == Presence::Required && text.is_empty() => {
                self.fail(rule, format!("`{}` is required", rule.key));
                Slot::Invalid
            }
            Ok(cast) => Slot::Set(cast),
            Err(reason) => {
                self.fail(rule, reason);
                Slot::Invalid
            }
        }
    }

    /// Reads a field for insertion; missing required fields are errors.
    fn read_new(&mut self, rule: FieldRule) -> Option<Cast> {
        match self.read(rule) {
            Slot::Set(cast) => Some(cast),
            Slot::Absent | Slot::Null => {
                if rule.presence == Presence::Required {
                    self.fail(rule, format!("`{}` is required", rule.key));
                }
                None
            }
            Slot::Invalid => None,
        }
    }

    /// Reads a field for a partial update. The outer `Option` is "touched".
    fn read_patch(&mut self, rule: FieldRule) -> Option<Option<Cast>> {
        match self.read(rule) {
            Slot::Absent | Slot::Invalid => None,
            Slot::Set(cast) => Some(Some(cast)),
            Slot::Null => match rule.presence {
                Presence::Optional => Some(None),
                Presence::Required => {
                    self.fail(rule, format!("`{}` is required", rule.key));
                    None
                }
                Presence::Defaulted => {
                    self.fail(rule, format!("`{}` cannot be null", rule.key));
                    None
                }
            },
        }
    }

    fn finish(self) -> Result<(), String> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(format!(
                "Schedule validation failed: {}",
                self.errors.join(", ")
            ))
        }
    }
}

fn cast(kind: FieldKind, value: &Value) -> Result<Cast, String> {
    match kind {
        FieldKind::Text => cast_text(value).map(Cast::Text),
        FieldKind::Day => {
            let text = cast_text(value)?;
            text.parse::<Weekday>().map(Cast::Day)
        }
        FieldKind::Flag => cast_flag(value).map(Cast::Flag),
    }
}

fn cast_text(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(format!("Cast to string failed for value `{}`", other)),
    }
}

fn cast_flag(value: &Value) -> Result<bool, String> {
    match value {
        Value::Bool(b) => return Ok(*b),
        Value::Number(n) if n.as_f64() == Some(1.0) => return Ok(true),
        Value::Number(n) if n.as_f64() == Some(0.0) => return Ok(false),
        Value::String(s) => match s.as_str() {
            "true" | "1" | "yes" => return Ok(true),
            "false" | "0" | "no" => return Ok(false),
            _ => {}
        },
        _ => {}
    }
    Err(format!("Cast to boolean failed for value `{}`", value))
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, String> {
    body.as_object()
        .ok_or_else(|| "Request body must be a JSON object".to_string())
}

fn into_text(cast: Cast) -> String {
    match cast {
        Cast::Text(text) => text,
        Cast::Day(day) => day.to_string(),
        Cast::Flag(flag) => flag.to_string(),
    }
}

fn into_day(cast: Cast) -> Option<Weekday> {
    match cast {
        Cast::Day(day) => Some(day),
        _ => None,
    }
}

fn into_flag(cast: Cast) -> Option<bool> {
    match cast {
        Cast::Flag(flag) => Some(flag),
        _ => None,
    }
}

impl NewSchedule {
    pub fn from_json(body: &Value) -> Result<Self, String> {
        let mut reader = FieldReader::new(as_object(body)?);

        let subject = reader.read_new(SUBJECT).map(into_text);
        let day = reader.read_new(DAY).and_then(into_day);
        let start_time = reader.read_new(START_TIME).map(into_text);
        let end_time = reader.read_new(END_TIME).map(into_text);
        let location = reader.read_new(LOCATION).map(into_text);
        let color = reader.read_new(COLOR).map(into_text);
        let teacher = reader.read_new(TEACHER).map(into_text);
        let recurring = reader.read_new(RECURRING).and_then(into_flag);

        reader.finish()?;

        match (subject, day, start_time, end_time) {
            (Some(subject), Some(day), Some(start_time), Some(end_time)) => Ok(NewSchedule {
                subject,
                day,
                start_time,
                end_time,
                location,
                color: color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
                teacher,
                recurring: recurring.unwrap_or(true),
            }),
            _ => Err("Schedule validation failed".to_string()),
        }
    }
}

impl SchedulePatch {
    pub fn from_json(body: &Value) -> Result<Self, String> {
        let mut reader = FieldReader::new(as_object(body)?);

        let patch = SchedulePatch {
            subject: reader.read_patch(SUBJECT).flatten().map(into_text),
            day: reader.read_patch(DAY).flatten().and_then(into_day),
            start_time: reader.read_patch(START_TIME).flatten().map(into_text),
            end_time: reader.read_patch(END_TIME).flatten().map(into_text),
            location: reader
                .read_patch(LOCATION)
                .map(|cast| cast.map(into_text)),
            color: reader.read_patch(COLOR).flatten().map(into_text),
            teacher: reader.read_patch(TEACHER).map(|cast| cast.map(into_text)),
            recurring: reader.read_patch(RECURRING).flatten().and_then(into_flag),
        };

        reader.finish()?;
        Ok(patch)
    }
}
