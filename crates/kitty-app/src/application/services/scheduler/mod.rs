mod clock;
mod task;

pub use clock::{AnchoredClock, Clock, LocalClock};
pub use task::{ScheduledTask, TaskAction};
