pub mod schedule;
pub mod schedule_input;

pub use schedule::{Schedule, Weekday, DEFAULT_COLOR};
pub use schedule_input::{NewSchedule, SchedulePatch};
