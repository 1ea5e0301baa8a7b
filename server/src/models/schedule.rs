use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const DEFAULT_COLOR: &str = "#3B82F6";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Day names are matched exactly; `"monday"` is not a weekday.
impl FromStr for Weekday {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Weekday::ALL
            .into_iter()
            .find(|day| day.as_str() == s)
            .ok_or_else(|| format!("`{}` is not a valid day", s))
    }
}

/// One weekly class slot owned by a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub subject: String,
    pub day: Weekday,
    pub start_time: String,
    pub end_time: String,
    pub location: Option<String>,
    pub color: String,
    pub teacher: Option<String>,
    pub recurring: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape of the `schedules` table; `day` is stored as text.
#[derive(Debug, Clone, FromRow)]
pub struct ScheduleRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub subject: String,
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub location: Option<String>,
    pub color: String,
    pub teacher: Option<String>,
    pub recurring: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ScheduleRow> for Schedule {
    type Error = sqlx::Error;

    fn try_from(row: ScheduleRow) -> Result<Self, Self::Error> {
        let day = row.day.parse::<Weekday>().map_err(|e| sqlx::Error::ColumnDecode {
            index: "day".to_string(),
            source: e.into(),
        })?;

        Ok(Schedule {
            id: row.id,
            owner_id: row.owner_id,
            subject: row.subject,
            day,
            start_time: row.start_time,
            end_time: row.end_time,
            location: row.location,
            color: row.color,
            teacher: row.teacher,
            recurring: row.recurring,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
