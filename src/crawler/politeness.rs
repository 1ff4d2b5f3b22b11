//! Randomized pauses between outbound requests

use rand::Rng;
use serde::Deserialize;
use std::time::Duration;

/// Inclusive range of milliseconds to pause for
///
/// Used for politeness delays between pages and items as well as for retry
/// backoff. In TOML it is written as `{ min-ms = 800, max-ms = 2000 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    /// No pause at all
    pub const ZERO: Self = Self::from_millis(0, 0);

    pub const fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// Draws a duration uniformly from the range
    ///
    /// An inverted range collapses to its lower bound.
    pub fn sample(&self) -> Duration {
        let millis = if self.max_ms <= self.min_ms {
            self.min_ms
        } else {
            rand::thread_rng().gen_range(self.min_ms..=self.max_ms)
        };
        Duration::from_millis(millis)
    }

    /// Sleeps for a sampled duration
    pub async fn pause(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            tracing::trace!("Pausing for {:?}", delay);
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_within_bounds() {
        let range = DelayRange::from_millis(800, 2000);
        for _ in 0..200 {
            let delay = range.sample();
            assert!(delay >= Duration::from_millis(800));
            assert!(delay <= Duration::from_millis(2000));
        }
    }

    #[test]
    fn test_degenerate_ranges() {
        assert_eq!(DelayRange::ZERO.sample(), Duration::ZERO);
        assert_eq!(
            DelayRange::from_millis(50, 50).sample(),
            Duration::from_millis(50)
        );
        assert_eq!(
            DelayRange::from_millis(70, 10).sample(),
            Duration::from_millis(70)
        );
    }

    #[tokio::test]
    async fn test_zero_pause_returns_immediately() {
        let start = std::time::Instant::now();
        DelayRange::ZERO.pause().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
