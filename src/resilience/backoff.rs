//! Exponential backoff with jitter.

use rand::Rng;
use std::time::Duration;

/// Calculate the delay before retrying after failed attempt `attempt`
/// (0-based): `base_ms * 2^attempt`, scaled by a uniform jitter multiplier
/// in [1, 2).
pub fn calculate_backoff(attempt: u32, base_ms: u64) -> Duration {
    let exponential = 2u64.saturating_pow(attempt);
    let delay_ms = base_ms.saturating_mul(exponential);

    let jitter: f64 = rand::thread_rng().gen_range(1.0..2.0);

    Duration::from_millis((delay_ms as f64 * jitter).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_respects_jitter_bounds() {
        for attempt in 0..4 {
            let base = 300u64;
            let floor = base * 2u64.pow(attempt);
            let delay = calculate_backoff(attempt, base);
            let ms = delay.as_millis() as u64;
            assert!(ms >= floor, "attempt {}: {:?}", attempt, delay);
            assert!(ms <= floor * 2, "attempt {}: {:?}", attempt, delay);
        }
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        assert!(calculate_backoff(0, 300).as_millis() >= 300);
        assert!(calculate_backoff(1, 300).as_millis() >= 600);
        assert!(calculate_backoff(2, 300).as_millis() >= 1200);
    }
}
