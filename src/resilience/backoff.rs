//! Exponential backoff with jitter for subscription reconnects.

use rand::Rng;
use std::time::Duration;

use crate::config::IngestConfig;

/// Delay before reconnect attempt `attempt` (1-based).
///
/// `base_ms * 2^(attempt-1)`, capped at `max_ms`, plus 0–10% jitter.
/// Attempt 0 means "no failure yet" and yields no delay.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let factor = 2u64.saturating_pow(attempt - 1);
    let capped = base_ms.saturating_mul(factor).min(max_ms);

    let jitter_range = capped / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped + jitter)
}

/// Reconnect delay for the ingestor's `attempt`-th consecutive failure.
pub fn reconnect_delay(attempt: u32, config: &IngestConfig) -> Duration {
    calculate_backoff(
        attempt,
        config.reconnect_base_delay_ms,
        config.reconnect_max_delay_ms,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_then_caps() {
        assert_eq!(calculate_backoff(0, 500, 30_000), Duration::ZERO);

        let first = calculate_backoff(1, 500, 30_000).as_millis();
        assert!((500..550).contains(&first));

        let third = calculate_backoff(3, 500, 30_000).as_millis();
        assert!((2_000..2_200).contains(&third));

        let capped = calculate_backoff(40, 500, 30_000).as_millis();
        assert!((30_000..33_000).contains(&capped));
    }

    #[test]
    fn test_reconnect_delay_uses_ingest_config() {
        let config = IngestConfig {
            reconnect_base_delay_ms: 5,
            reconnect_max_delay_ms: 8,
            ..IngestConfig::default()
        };
        assert_eq!(reconnect_delay(1, &config), Duration::from_millis(5));
        assert_eq!(reconnect_delay(4, &config), Duration::from_millis(8));
    }
}
