use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::schedule::Schedule;
use crate::models::schedule_input::{NewSchedule, SchedulePatch};
use crate::store::{OwnerScope, ScheduleStore};

/// In-process store keeping rows in insertion order.
#[derive(Debug, Default)]
pub struct MemoryScheduleStore {
    rows: RwLock<Vec<Schedule>>,
}

impl MemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows across all owners.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

fn apply(schedule: &mut Schedule, patch: SchedulePatch) {
    if let Some(subject) = patch.subject {
        schedule.subject = subject;
    }
    if let Some(day) = patch.day {
        schedule.day = day;
    }
    if let Some(start_time) = patch.start_time {
        schedule.start_time = start_time;
    }
    if let Some(end_time) = patch.end_time {
        schedule.end_time = end_time;
    }
    if let Some(location) = patch.location {
        schedule.location = location;
    }
    if let Some(color) = patch.color {
        schedule.color = color;
    }
    if let Some(teacher) = patch.teacher {
        schedule.teacher = teacher;
    }
    if let Some(recurring) = patch.recurring {
        schedule.recurring = recurring;
    }
    schedule.updated_at = Utc::now();
}

#[async_trait]
impl ScheduleStore for MemoryScheduleStore {
    async fn list(&self, scope: OwnerScope) -> Result<Vec<Schedule>, sqlx::Error> {
        let rows = self.rows.read().await;
        Ok(rows.iter().filter(|s| scope.owns(s)).cloned().collect())
    }

    async fn get(&self, scope: OwnerScope, id: Uuid) -> Result<Option<Schedule>, sqlx::Error> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|s| s.id == id && scope.owns(s)).cloned())
    }

    async fn insert(
        &self,
        scope: OwnerScope,
        entry: NewSchedule,
    ) -> Result<Schedule, sqlx::Error> {
        let now = Utc::now();
        let schedule = Schedule {
            id: Uuid::new_v4(),
            owner_id: scope.owner_id(),
            subject: entry.subject,
            day: entry.day,
            start_time: entry.start_time,
            end_time: entry.end_time,
            location: entry.location,
            color: entry.color,
            teacher: entry.teacher,
            recurring: entry.recurring,
            created_at: now,
            updated_at: now,
        };
        self.rows.write().await.push(schedule.clone());
        Ok(schedule)
    }

    async fn update(
        &self,
        scope: OwnerScope,
        id: Uuid,
        patch: SchedulePatch,
    ) -> Result<Option<Schedule>, sqlx::Error> {
        let mut rows = self.rows.write().await;
        let Some(schedule) = rows.iter_mut().find(|s| s.id == id && scope.owns(s)) else {
            return Ok(None);
        };
        apply(schedule, patch);
        Ok(Some(schedule.clone()))
    }

    async fn delete(&self, scope: OwnerScope, id: Uuid) -> Result<Option<Schedule>, sqlx::Error> {
        let mut rows = self.rows.write().await;
        let position = rows.iter().position(|s| s.id == id && scope.owns(s));
        Ok(position.map(|index| rows.remove(index)))
    }
}
