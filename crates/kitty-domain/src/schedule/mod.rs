//! Wall-clock arithmetic for daily recurring work.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::setting::validate_hour;
use crate::shared::DomainError;

/// Days searched for a date on which the hour exists locally
const MAX_DAYS_AHEAD: u32 = 8;

/// Observable state of a recurring task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Stopped,
    Running,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Stopped => "stopped",
            TaskStatus::Running => "running",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, TaskStatus::Running)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First instant strictly after `now` whose local time is `hour`:00:00.
///
/// Dates on which that local time falls in a gap are skipped; when it is
/// ambiguous the earlier instant wins.
pub fn next_run_at<Tz: TimeZone>(
    now: &DateTime<Tz>,
    hour: u32,
) -> Result<DateTime<Tz>, DomainError> {
    let hour = validate_hour(hour)?;
    let tz = now.timezone();
    let mut date = now.date_naive();

    for _ in 0..MAX_DAYS_AHEAD {
        let candidate = date
            .and_hms_opt(hour, 0, 0)
            .and_then(|naive| tz.from_local_datetime(&naive).earliest());

        if let Some(candidate) = candidate {
            if candidate > *now {
                return Ok(candidate);
            }
        }

        date = date.succ_opt().ok_or_else(|| {
            DomainError::InvalidInput(format!("No calendar day after {date}"))
        })?;
    }

    Err(DomainError::InvalidInput(format!(
        "Local time {hour:02}:00 does not occur within {MAX_DAYS_AHEAD} days"
    )))
}

/// Time left until the next `hour`:00:00, never negative
pub fn delay_until_next_run<Tz: TimeZone>(
    now: &DateTime<Tz>,
    hour: u32,
) -> Result<Duration, DomainError> {
    let next = next_run_at(now, hour)?;
    Ok(next
        .signed_duration_since(now.clone())
        .to_std()
        .unwrap_or(Duration::ZERO))
}
