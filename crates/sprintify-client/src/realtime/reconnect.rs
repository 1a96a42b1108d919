//! Reconnect backoff for the realtime socket.

use std::time::Duration;

use tokio::time::Instant;

/// Attempts made before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Delay before the first reconnect attempt.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);

/// Upper bound of the delay between attempts.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

/// Uptime after which a lost connection starts a fresh attempt budget.
pub const DEFAULT_STABLE_AFTER: Duration = Duration::from_secs(10);

/// Exponential backoff with a capped number of attempts.
///
/// The delay doubles after each failed attempt up to [`max_delay`]. When
/// every attempt is spent the policy reports [`ConnectionState::Failed`],
/// which is terminal until [`reset`] is called by a user action.
///
/// A handshake alone does not refill the budget: only a connection that
/// stayed up for [`stable_after`] does. A server that accepts and then drops
/// every connection still ends in `Failed`.
///
/// [`max_delay`]: ReconnectPolicy::max_delay
/// [`reset`]: ReconnectPolicy::reset
/// [`stable_after`]: ReconnectPolicy::with_stable_after
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
    stable_after: Duration,
    attempt: u32,
    connected_at: Option<Instant>,
}

/// Observable state of the realtime connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Handshake completed.
    Connected,
    /// Waiting `delay` before attempt number `attempt` (1-based).
    Reconnecting { attempt: u32, delay: Duration },
    /// Every attempt failed. Realtime features stay off; polling continues.
    Failed,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_INITIAL_DELAY, DEFAULT_MAX_DELAY)
    }
}

impl ReconnectPolicy {
    /// Creates a policy.
    pub const fn new(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay,
            stable_after: DEFAULT_STABLE_AFTER,
            attempt: 0,
            connected_at: None,
        }
    }

    /// Sets the uptime after which a lost connection refills the budget.
    pub const fn with_stable_after(mut self, stable_after: Duration) -> Self {
        self.stable_after = stable_after;
        self
    }

    /// Returns the configured upper bound of the delay.
    pub const fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Returns the number of attempts made since the last stable connection.
    pub const fn attempts(&self) -> u32 {
        self.attempt
    }

    /// Returns whether every attempt has been spent.
    pub const fn is_exhausted(&self) -> bool {
        self.attempt >= self.max_attempts
    }

    /// Records a lost connection or failed attempt at `now` and returns what
    /// to do next.
    pub fn on_failure(&mut self, now: Instant) -> ConnectionState {
        if let Some(connected_at) = self.connected_at.take()
            && now.saturating_duration_since(connected_at) >= self.stable_after
        {
            self.attempt = 0;
        }

        if self.is_exhausted() {
            return ConnectionState::Failed;
        }

        let delay = self.delay_for(self.attempt);
        self.attempt += 1;
        ConnectionState::Reconnecting {
            attempt: self.attempt,
            delay,
        }
    }

    /// Records a successful handshake at `now`.
    pub fn on_connected(&mut self, now: Instant) -> ConnectionState {
        self.connected_at = Some(now);
        ConnectionState::Connected
    }

    /// Clears a terminal failure, for example after the user asks to retry.
    pub fn reset(&mut self) {
        self.attempt = 0;
        self.connected_at = None;
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delays(policy: &mut ReconnectPolicy) -> Vec<ConnectionState> {
        let now = Instant::now();
        (0..6).map(|_| policy.on_failure(now)).collect()
    }

    #[test]
    fn doubles_then_gives_up() {
        let mut policy = ReconnectPolicy::default();
        let secs = |attempt, s| ConnectionState::Reconnecting {
            attempt,
            delay: Duration::from_secs(s),
        };

        assert_eq!(
            delays(&mut policy),
            vec![
                secs(1, 1),
                secs(2, 2),
                secs(3, 4),
                secs(4, 8),
                secs(5, 16),
                ConnectionState::Failed,
            ]
        );
        assert!(policy.is_exhausted());
    }

    #[test]
    fn delay_is_capped() {
        let mut policy =
            ReconnectPolicy::new(10, Duration::from_secs(5), DEFAULT_MAX_DELAY);
        let last = delays(&mut policy).pop();
        assert_eq!(
            last,
            Some(ConnectionState::Reconnecting {
                attempt: 6,
                delay: DEFAULT_MAX_DELAY,
            })
        );
    }

    #[test]
    fn stable_connection_resets_the_budget() {
        let start = Instant::now();
        let mut policy = ReconnectPolicy::default();
        policy.on_failure(start);
        policy.on_failure(start);
        assert_eq!(policy.on_connected(start), ConnectionState::Connected);

        let ConnectionState::Reconnecting { attempt, delay } =
            policy.on_failure(start + DEFAULT_STABLE_AFTER)
        else {
            panic!("expected a reconnect");
        };
        assert_eq!((attempt, delay), (1, DEFAULT_INITIAL_DELAY));
    }

    #[test]
    fn flapping_connection_still_exhausts_the_budget() {
        let start = Instant::now();
        let mut policy = ReconnectPolicy::new(3, Duration::from_secs(1), DEFAULT_MAX_DELAY);

        let mut states = Vec::new();
        for _ in 0..4 {
            policy.on_connected(start);
            states.push(policy.on_failure(start + Duration::from_millis(50)));
        }

        assert!(matches!(states[2], ConnectionState::Reconnecting { attempt: 3, .. }));
        assert_eq!(states[3], ConnectionState::Failed);
    }

    #[test]
    fn reset_clears_a_terminal_failure() {
        let now = Instant::now();
        let mut policy = ReconnectPolicy::new(1, Duration::from_secs(1), DEFAULT_MAX_DELAY);
        policy.on_failure(now);
        assert_eq!(policy.on_failure(now), ConnectionState::Failed);

        policy.reset();
        assert!(!policy.is_exhausted());
    }
}
