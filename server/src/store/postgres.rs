use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::schedule::{Schedule, ScheduleRow};
use crate::models::schedule_input::{NewSchedule, SchedulePatch};
use crate::store::{OwnerScope, ScheduleStore};

const RETURNING_COLS: &str = "id, owner_id, subject, day, start_time, end_time, location, \
     color, teacher, recurring, created_at, updated_at";

#[derive(Clone)]
pub struct PgScheduleStore {
    pool: PgPool,
}

impl PgScheduleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_schedules(rows: Vec<ScheduleRow>) -> Result<Vec<Schedule>, sqlx::Error> {
    rows.into_iter().map(Schedule::try_from).collect()
}

#[async_trait]
impl ScheduleStore for PgScheduleStore {
    async fn list(&self, scope: OwnerScope) -> Result<Vec<Schedule>, sqlx::Error> {
        let sql = format!("SELECT {RETURNING_COLS} FROM schedules WHERE owner_id = $1");
        let rows = sqlx::query_as::<_, ScheduleRow>(&sql)
            .bind(scope.owner_id())
            .fetch_all(&self.pool)
            .await?;
        into_schedules(rows)
    }

    async fn get(&self, scope: OwnerScope, id: Uuid) -> Result<Option<Schedule>, sqlx::Error> {
        let sql =
            format!("SELECT {RETURNING_COLS} FROM schedules WHERE id = $1 AND owner_id = $2");
        let row = sqlx::query_as::<_, ScheduleRow>(&sql)
            .bind(id)
            .bind(scope.owner_id())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Schedule::try_from).transpose()
    }

    async fn insert(
        &self,
        scope: OwnerScope,
        entry: NewSchedule,
    ) -> Result<Schedule, sqlx::Error> {
        let sql = format!(
            "INSERT INTO schedules \
             (id, owner_id, subject, day, start_time, end_time, location, color, teacher, recurring) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {RETURNING_COLS}"
        );
        let row = sqlx::query_as::<_, ScheduleRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(scope.owner_id())
            .bind(entry.subject)
            .bind(entry.day.as_str())
            .bind(entry.start_time)
            .bind(entry.end_time)
            .bind(entry.location)
            .bind(entry.color)
            .bind(entry.teacher)
            .bind(entry.recurring)
            .fetch_one(&self.pool)
            .await?;
        Schedule::try_from(row)
    }

    async fn update(
        &self,
        scope: OwnerScope,
        id: Uuid,
        patch: SchedulePatch,
    ) -> Result<Option<Schedule>, sqlx::Error> {
        // Nullable columns carry a "touched" flag so NULL can clear them.
        let sql = format!(
            "UPDATE schedules SET \
               subject = COALESCE($3, subject), \
               day = COALESCE($4, day), \
               start_time = COALESCE($5, start_time), \
               end_time = COALESCE($6, end_time), \
               location = CASE WHEN $7 THEN $8 ELSE location END, \
               color = COALESCE($9, color), \
               teacher = CASE WHEN $10 THEN $11 ELSE teacher END, \
               recurring = COALESCE($12, recurring), \
               updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 \
             RETURNING {RETURNING_COLS}"
        );
        let row = sqlx::query_as::<_, ScheduleRow>(&sql)
            .bind(id)
            .bind(scope.owner_id())
            .bind(patch.subject)
            .bind(patch.day.map(|day| day.as_str()))
            .bind(patch.start_time)
            .bind(patch.end_time)
            .bind(patch.location.is_some())
            .bind(patch.location.flatten())
            .bind(patch.color)
            .bind(patch.teacher.is_some())
            .bind(patch.teacher.flatten())
            .bind(patch.recurring)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Schedule::try_from).transpose()
    }

    async fn delete(&self, scope: OwnerScope, id: Uuid) -> Result<Option<Schedule>, sqlx::Error> {
        let sql = format!(
            "DELETE FROM schedules WHERE id = $1 AND owner_id = $2 RETURNING {RETURNING_COLS}"
        );
        let row = sqlx::query_as::<_, ScheduleRow>(&sql)
            .bind(id)
            .bind(scope.owner_id())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Schedule::try_from).transpose()
    }
}
