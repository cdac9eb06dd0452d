use std::time::Duration;

use rand::Rng;

/// Calculate exponential backoff delay with jitter.
///
/// Formula: `min(base_ms * 2^(attempt-1) + jitter, max_ms)` (0-25% jitter)
pub fn backoff_delay(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let exp_factor = 2u64.saturating_pow(attempt - 1);
    let delay_ms = base_ms.saturating_mul(exp_factor);

    let jitter = if delay_ms > 0 {
        rand::rng().random_range(0..=delay_ms / 4)
    } else {
        0
    };

    let total_delay = delay_ms.saturating_add(jitter).min(max_ms);
    Duration::from_millis(total_delay)
}
