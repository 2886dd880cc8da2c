//! Exponential backoff with jitter.

use rand::Rng;
use std::time::Duration;

use super::RetryPolicy;

/// Source of the random component added to each backoff delay.
pub trait Jitter: Send + Sync {
    /// Return a value in `[0, max]`.
    fn sample(&self, max: Duration) -> Duration;
}

/// Uniform jitter drawn from the thread-local RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRngJitter;

impl Jitter for ThreadRngJitter {
    fn sample(&self, max: Duration) -> Duration {
        if max.is_zero() {
            return Duration::ZERO;
        }
        let secs = rand::thread_rng().gen_range(0.0..=max.as_secs_f64());
        Duration::try_from_secs_f64(secs).map_or(max, |sampled| sampled.min(max))
    }
}

/// Deterministic jitter that always contributes nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoJitter;

impl Jitter for NoJitter {
    fn sample(&self, _max: Duration) -> Duration {
        Duration::ZERO
    }
}

/// Backoff before re-attempt `attempt`, using thread-local jitter.
pub fn compute_backoff_delay(attempt: u32, policy: &RetryPolicy) -> Duration {
    compute_backoff_delay_with(attempt, policy, &ThreadRngJitter)
}

/// `min(base * multiplier^attempt, max_delay) + jitter`.
pub fn compute_backoff_delay_with(
    attempt: u32,
    policy: &RetryPolicy,
    jitter: &dyn Jitter,
) -> Duration {
    let max_delay = policy.max_delay();
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    let grown = policy.base_delay().as_secs_f64() * policy.backoff_multiplier().powi(exponent);
    // Overflow, NaN, and negative growth all fall back to the ceiling.
    let delay = if grown.is_finite() {
        Duration::try_from_secs_f64(grown.min(max_delay.as_secs_f64())).unwrap_or(max_delay)
    } else {
        max_delay
    };
    delay.saturating_add(jitter.sample(policy.jitter_max()))
}
