//! Practice Clock
//!
//! A one-second repeating tick source. Acquiring a [`Clock`] starts it and
//! dropping it stops it; the runner holds one only while the engine is in a
//! phase that counts down.
//!
//! Ticks are scheduled against the instant the clock started, not against
//! the previous tick, so handler latency never accumulates into drift. A
//! tick that is late because the runtime was busy is still delivered
//! (`MissedTickBehavior::Burst`) so the number of ticks tracks elapsed wall
//! time.

use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Wall-clock period between ticks
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Repeating tick source
#[derive(Debug)]
pub struct Clock {
    interval: Interval,
    ticks: u64,
}

impl Clock {
    /// Start a clock with the standard one-second period
    #[must_use]
    pub fn start() -> Self {
        Self::with_period(TICK_PERIOD)
    }

    /// Start a clock with a custom period
    ///
    /// The first tick fires one full period after the start.
    #[must_use]
    pub fn with_period(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
        tracing::trace!(?period, "Clock started");
        Self {
            interval,
            ticks: 0,
        }
    }

    /// Wait for the next tick; returns the tick count
    pub async fn tick(&mut self) -> u64 {
        self.interval.tick().await;
        self.ticks += 1;
        self.ticks
    }

    /// Ticks delivered so far
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Drop for Clock {
    fn drop(&mut self) {
        tracing::trace!(ticks = self.ticks, "Clock stopped");
    }
}
