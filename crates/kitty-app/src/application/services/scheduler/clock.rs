use chrono::{DateTime, Local, TimeDelta, TimeZone};
use tokio::time::Instant;

/// Source of wall-clock time for scheduling
pub trait Clock: Send + Sync + 'static {
    type Tz: TimeZone;

    fn now(&self) -> DateTime<Self::Tz>;
}

/// System clock in the local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    type Tz = Local;

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Wall clock that starts at a fixed instant and advances with tokio's
/// clock, so paused-time runtimes can fast-forward it.
#[derive(Debug, Clone)]
pub struct AnchoredClock<Tz: TimeZone> {
    origin: DateTime<Tz>,
    started: Instant,
}

impl<Tz: TimeZone> AnchoredClock<Tz> {
    pub fn new(origin: DateTime<Tz>) -> Self {
        Self {
            origin,
            started: Instant::now(),
        }
    }
}

impl<Tz> Clock for AnchoredClock<Tz>
where
    Tz: TimeZone + Send + Sync + 'static,
    Tz::Offset: Send + Sync,
{
    type Tz = Tz;

    fn now(&self) -> DateTime<Tz> {
        let elapsed = TimeDelta::from_std(self.started.elapsed()).unwrap_or(TimeDelta::zero());
        self.origin.clone() + elapsed
    }
}
