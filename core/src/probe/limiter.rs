use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

const MIN_PERIOD: Duration = Duration::from_nanos(1);

/// Enforces a minimum spacing between successive releases on the monotonic clock.
///
/// The first release happens one period after creation. A late caller never
/// gets a burst of catch-up releases.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Interval,
}

impl RateLimiter {
    pub fn new(period: Duration) -> Self {
        let period = period.max(MIN_PERIOD);
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }

    /// Suspends until the next release.
    pub async fn wait(&mut self) -> Instant {
        self.interval.tick().await
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
