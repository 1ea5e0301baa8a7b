//! Persistence boundary for schedules.
//!
//! Every operation takes an [`OwnerScope`]. The scope can only be obtained
//! from an authenticated caller, and each backend folds it into the filter
//! of the single statement it runs, so rows belonging to another owner are
//! never read or written.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::schedule::Schedule;
use crate::models::schedule_input::{NewSchedule, SchedulePatch};

pub mod memory;
pub mod postgres;

pub use memory::MemoryScheduleStore;
pub use postgres::PgScheduleStore;

/// The caller identity every schedule query is filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerScope {
    owner_id: Uuid,
}

impl OwnerScope {
    pub(crate) fn new(owner_id: Uuid) -> Self {
        Self { owner_id }
    }

    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    pub fn owns(&self, schedule: &Schedule) -> bool {
        schedule.owner_id == self.owner_id
    }
}

#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// All schedules owned by the scope, in backend order.
    async fn list(&self, scope: OwnerScope) -> Result<Vec<Schedule>, sqlx::Error>;

    /// The owned schedule `id`, if any.
    async fn get(&self, scope: OwnerScope, id: Uuid) -> Result<Option<Schedule>, sqlx::Error>;

    /// Inserts `entry` with the scope's owner.
    async fn insert(&self, scope: OwnerScope, entry: NewSchedule)
        -> Result<Schedule, sqlx::Error>;

    /// Applies `patch` to the owned schedule `id`. `None` when no owned row matches.
    async fn update(
        &self,
        scope: OwnerScope,
        id: Uuid,
        patch: SchedulePatch,
    ) -> Result<Option<Schedule>, sqlx::Error>;

    /// Removes the owned schedule `id`, returning it. `None` when no owned row matches.
    async fn delete(&self, scope: OwnerScope, id: Uuid) -> Result<Option<Schedule>, sqlx::Error>;
}
