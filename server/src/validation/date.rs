//! Lenient calendar-date recognition.
//!
//! Accepts the forms browsers and Node accept for `Date.parse`: ISO dates
//! with or without a time, slash dates, written-out month names, an
//! optional leading weekday, a trailing clock time, and bare numbers.
//! Days are only checked against 1..=31, so `2024-02-30` passes and rolls
//! over like it does there.

use std::sync::LazyLock;

use chrono::DateTime;
use regex::Regex;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

static WEEKDAY_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?,?\s+").unwrap());
static TIME_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:t|\s+)(\d{1,2}):(\d{2})(?::(\d{2})(?:\.\d+)?)?(?:\s*[ap]m)?(?:\s*(?:z|utc|gmt|[+-]\d{2}:?\d{2}))?$",
    )
    .unwrap()
});
static YMD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})[-/](\d{1,2})[-/](\d{1,2})$").unwrap());
static YM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})[-/](\d{1,2})$").unwrap());
static MDY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap());
static NAMED_MDY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]{3,})\.?\s+(\d{1,2}),?\s+(\d{4})$").unwrap());
static NAMED_DMY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})\s+([A-Za-z]{3,})\.?,?\s+(\d{4})$").unwrap());
static NAMED_MY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]{3,})\.?,?\s+(\d{4})$").unwrap());
static BARE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,6}$").unwrap());

fn number(text: &str) -> Option<u32> {
    text.parse().ok()
}

fn month_number(name: &str) -> Option<u32> {
    let prefix = name.get(..3)?.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|month| *month == prefix)
        .map(|index| index as u32 + 1)
}

fn month_day(month: Option<u32>, day: Option<u32>) -> bool {
    matches!((month, day), (Some(1..=12), Some(1..=31)))
}

fn valid_time(text: &str) -> Option<&str> {
    let Some(caps) = TIME_SUFFIX.captures(text) else {
        return Some(text);
    };
    let hour = number(&caps[1])?;
    let minute = number(&caps[2])?;
    let second = caps.get(3).map_or(Some(0), |s| number(s.as_str()))?;
    if hour > 24 || minute > 59 || second > 59 {
        return None;
    }
    caps.get(0).map(|whole| &text[..whole.start()])
}

fn date_part(text: &str) -> bool {
    if BARE_NUMBER.is_match(text) {
        return true;
    }
    if let Some(caps) = YMD.captures(text) {
        return month_day(number(&caps[2]), number(&caps[3]));
    }
    if let Some(caps) = YM.captures(text) {
        return month_day(number(&caps[2]), Some(1));
    }
    if let Some(caps) = MDY.captures(text) {
        return month_day(number(&caps[1]), number(&caps[2]));
    }
    if let Some(caps) = NAMED_MDY.captures(text) {
        return month_day(month_number(&caps[1]), number(&caps[2]));
    }
    if let Some(caps) = NAMED_DMY.captures(text) {
        return month_day(month_number(&caps[2]), number(&caps[1]));
    }
    if let Some(caps) = NAMED_MY.captures(text) {
        return month_day(month_number(&caps[1]), Some(1));
    }
    false
}

pub fn is_lenient_date(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }
    if DateTime::parse_from_rfc3339(text).is_ok() || DateTime::parse_from_rfc2822(text).is_ok() {
        return true;
    }

    let without_weekday = WEEKDAY_PREFIX.replace(text, "");
    match valid_time(&without_weekday) {
        Some(date) => date_part(date.trim()),
        None => false,
    }
}
