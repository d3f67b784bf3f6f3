//! Linear backoff schedule for the connection bootstrap.
//!
//! Attempt `n` (1-indexed) waits `n * step` before probing, giving a
//! slow-starting daemon progressively more warm-up time.

use crate::config::ConnectionConfig;
use std::time::Duration;

/// Attempt-scaled delay schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffSchedule {
    /// Maximum number of attempts (at least one).
    pub max_attempts: u32,
    /// Delay unit multiplied by the attempt number.
    pub step: Duration,
}

impl BackoffSchedule {
    pub fn new(max_attempts: u32, step: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            step,
        }
    }

    pub fn from_config(config: &ConnectionConfig) -> Self {
        Self::new(config.max_attempts(), config.backoff_step())
    }

    /// Delay before attempt `attempt` (1-indexed).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.step.saturating_mul(attempt)
    }

    /// Every `(attempt, delay)` pair in order.
    fn attempts(&self) -> impl Iterator<Item = (u32, Duration)> + '_ {
        (1..=self.max_attempts).map(move |attempt| (attempt, self.delay_for(attempt)))
    }

    /// Sum of all delays if every attempt fails.
    pub(crate) fn total_delay(&self) -> Duration {
        self.attempts()
            .fold(Duration::ZERO, |acc, (_, delay)| acc.saturating_add(delay))
    }
}

/// What happened during one establishment run.
#[derive(Debug, Clone, Default)]
pub struct RetryStats {
    /// Number of probes issued.
    pub attempts: u32,
    /// Total delay accumulated before probes.
    pub total_delay: Duration,
    /// Whether a probe succeeded.
    pub success: bool,
    /// Last failure message, if any.
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_is_linear_in_attempt() {
        let schedule = BackoffSchedule::new(3, Duration::from_millis(100));
        assert_eq!(schedule.delay_for(1), Duration::from_millis(100));
        assert_eq!(schedule.delay_for(2), Duration::from_millis(200));
        assert_eq!(schedule.delay_for(3), Duration::from_millis(300));
    }

    #[test]
    fn test_attempts_enumerates_schedule() {
        let schedule = BackoffSchedule::new(3, Duration::from_millis(100));
        let pairs: Vec<_> = schedule.attempts().collect();
        assert_eq!(
            pairs,
            vec![
                (1, Duration::from_millis(100)),
                (2, Duration::from_millis(200)),
                (3, Duration::from_millis(300)),
            ]
        );
        assert_eq!(schedule.total_delay(), Duration::from_millis(600));
    }

    #[test]
    fn test_zero_attempts_clamped() {
        let schedule = BackoffSchedule::new(0, Duration::from_millis(10));
        assert_eq!(schedule.max_attempts, 1);
        assert_eq!(schedule.attempts().count(), 1);
    }

    #[test]
    fn test_from_config_uses_backoff_step() {
        let config = ConnectionConfig::from_host("127.0.0.1", 8332, "u", "p")
            .unwrap()
            .with_timeout(Duration::from_millis(100))
            .with_max_attempts(4);
        let schedule = BackoffSchedule::from_config(&config);
        assert_eq!(schedule.max_attempts, 4);
        assert_eq!(schedule.step, Duration::from_millis(100));

        let schedule =
            BackoffSchedule::from_config(&config.with_backoff_step(Duration::from_millis(5)));
        assert_eq!(schedule.delay_for(4), Duration::from_millis(20));
    }
}
