//! Polling fallback for notification state.

use std::time::Duration;

use tokio::time::Instant;

/// Default interval between notification refreshes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Decides when notification state must be refetched.
///
/// Socket delivery is best-effort, so the client refreshes on a fixed
/// interval and whenever the window regains focus. Staleness is bounded by the
/// interval even when the socket is down.
#[derive(Debug, Clone)]
pub struct PollSchedule {
    interval: Duration,
    last_refresh: Option<Instant>,
    focus_regained: bool,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl PollSchedule {
    /// Creates a schedule that is due immediately.
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_refresh: None,
            focus_regained: false,
        }
    }

    /// Returns the refresh interval.
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns whether a refresh should run at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        self.focus_regained || self.time_until_due(now).is_zero()
    }

    /// Returns how long until the next interval refresh.
    pub fn time_until_due(&self, now: Instant) -> Duration {
        match self.last_refresh {
            None => Duration::ZERO,
            Some(at) => (at + self.interval).saturating_duration_since(now),
        }
    }

    /// Records that the window regained focus.
    pub fn on_focus_regained(&mut self) {
        self.focus_regained = true;
    }

    /// Records a completed refresh (successful or not).
    pub fn mark_refreshed(&mut self, now: Instant) {
        self.last_refresh = Some(now);
        self.focus_regained = false;
    }

    /// Sleeps until the next interval refresh is due.
    pub async fn tick(&self) {
        tokio::time::sleep(self.time_until_due(Instant::now())).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_immediately_then_after_interval() {
        let start = Instant::now();
        let mut schedule = PollSchedule::default();
        assert!(schedule.is_due(start));

        schedule.mark_refreshed(start);
        assert!(!schedule.is_due(start + Duration::from_secs(29)));
        assert!(schedule.is_due(start + Duration::from_secs(30)));
        assert_eq!(
            schedule.time_until_due(start + Duration::from_secs(10)),
            Duration::from_secs(20)
        );
    }

    #[test]
    fn focus_regain_forces_refresh() {
        let start = Instant::now();
        let mut schedule = PollSchedule::default();
        schedule.mark_refreshed(start);

        schedule.on_focus_regained();
        assert!(schedule.is_due(start + Duration::from_secs(1)));

        schedule.mark_refreshed(start + Duration::from_secs(1));
        assert!(!schedule.is_due(start + Duration::from_secs(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn tick_waits_for_the_interval() {
        let mut schedule = PollSchedule::new(Duration::from_secs(30));
        let start = Instant::now();
        schedule.mark_refreshed(start);

        schedule.tick().await;
        assert!(Instant::now() - start >= Duration::from_secs(30));
        assert!(schedule.is_due(Instant::now()));
    }
}
