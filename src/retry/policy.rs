//! Retry policy value object.

use std::time::Duration;

/// Default delay used as the exponential backoff base.
pub const DEFAULT_BASE_DELAY_SECS: f64 = 5.0;
/// Default ceiling for exponential backoff growth.
pub const DEFAULT_MAX_DELAY_SECS: f64 = 120.0;
/// Default wait floor once the remote service reports quota exhaustion.
pub const DEFAULT_RATE_LIMIT_DELAY_SECS: f64 = 180.0;
/// Default number of attempts, including the first one.
pub const DEFAULT_MAX_RETRIES: u32 = 5;
/// Default growth factor between consecutive backoff delays.
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;
/// Default upper bound of the random jitter added to each backoff delay.
pub const DEFAULT_JITTER_MAX_SECS: f64 = 2.0;

/// Timing and budget parameters for one retry session.
///
/// The policy is an immutable value: setters consume and return a new policy,
/// so an executor can never observe a change mid-flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    base_delay: Duration,
    max_delay: Duration,
    rate_limit_delay: Duration,
    max_retries: u32,
    backoff_multiplier: f64,
    jitter_max: Duration,
    backoff_after_rate_limit: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs_f64(DEFAULT_BASE_DELAY_SECS),
            max_delay: Duration::from_secs_f64(DEFAULT_MAX_DELAY_SECS),
            rate_limit_delay: Duration::from_secs_f64(DEFAULT_RATE_LIMIT_DELAY_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            jitter_max: Duration::from_secs_f64(DEFAULT_JITTER_MAX_SECS),
            backoff_after_rate_limit: true,
        }
    }
}

impl RetryPolicy {
    /// Backoff delay before the second attempt; later delays grow from it.
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Ceiling for the exponential part of the backoff (jitter is added on top).
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Minimum wait after a rate-limited failure.
    pub fn rate_limit_delay(&self) -> Duration {
        self.rate_limit_delay
    }

    /// Total attempt budget, including the initial call. Always at least 1.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Growth factor between consecutive backoff delays.
    pub fn backoff_multiplier(&self) -> f64 {
        self.backoff_multiplier
    }

    /// Upper bound of the random jitter added to each backoff delay.
    pub fn jitter_max(&self) -> Duration {
        self.jitter_max
    }

    /// Whether the standard pre-attempt backoff still runs after a
    /// rate-limited failure has already waited.
    pub fn backoff_after_rate_limit(&self) -> bool {
        self.backoff_after_rate_limit
    }

    /// Set the backoff base delay.
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the backoff ceiling. A ceiling below the base caps every delay.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the rate-limit wait floor.
    pub fn with_rate_limit_delay(mut self, delay: Duration) -> Self {
        self.rate_limit_delay = delay;
        self
    }

    /// Set the attempt budget. Zero is raised to one so every operation runs
    /// at least once.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Set the growth factor. Values that do not produce a finite,
    /// non-negative delay make every backoff wait the full `max_delay`.
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Set the jitter bound; zero disables jitter.
    pub fn with_jitter_max(mut self, jitter: Duration) -> Self {
        self.jitter_max = jitter;
        self
    }

    /// Choose whether the pre-attempt backoff also runs after a rate-limit wait.
    pub fn with_backoff_after_rate_limit(mut self, enabled: bool) -> Self {
        self.backoff_after_rate_limit = enabled;
        self
    }

    /// Wait applied right after a rate-limited failure.
    ///
    /// A service-provided hint only ever lengthens the wait; it is not capped
    /// by `max_delay`.
    pub fn rate_limit_wait(&self, hint: Option<Duration>) -> Duration {
        match hint {
            Some(hint) => hint.max(self.rate_limit_delay),
            None => self.rate_limit_delay,
        }
    }

    /// True when `attempt` (0-based) is the last one the budget allows.
    pub fn is_final_attempt(&self, attempt: u32) -> bool {
        attempt.saturating_add(1) >= self.max_retries
    }

    /// Shorthand for test and tuning call sites that only care about scale.
    pub fn fast(scale: Duration) -> Self {
        Self::default()
            .with_base_delay(scale)
            .with_max_delay(scale.saturating_mul(16))
            .with_rate_limit_delay(scale.saturating_mul(4))
            .with_jitter_max(Duration::ZERO)
    }
}
