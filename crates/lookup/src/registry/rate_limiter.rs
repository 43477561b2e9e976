//! Jittered rate limiter for the catalogue sources.
//!
//! Every outbound query is preceded by a random pause, and a longer random
//! cool-down is applied between batches of processed items. Randomizing the
//! gaps keeps a sequential batch from looking like a fixed-interval bot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use log::debug;
use rand::Rng;

use crate::models::SourceKind;

/// Default pause before each source query.
const DEFAULT_REQUEST_DELAY: DelayRange = DelayRange::from_millis(1_500, 3_000);

/// Default pause between batches of items.
const DEFAULT_COOLDOWN: DelayRange = DelayRange::from_millis(8_000, 15_000);

/// Default number of items per batch.
const DEFAULT_COOLDOWN_EVERY: usize = 5;

/// Inclusive range of milliseconds to wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    /// Create a range; the bounds are swapped if given in reverse.
    pub const fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        if min_ms <= max_ms {
            Self { min_ms, max_ms }
        } else {
            Self {
                min_ms: max_ms,
                max_ms: min_ms,
            }
        }
    }

    /// A range that never waits.
    pub const fn zero() -> Self {
        Self::from_millis(0, 0)
    }

    pub fn is_zero(&self) -> bool {
        self.max_ms == 0
    }

    /// Pick a duration uniformly from the range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        Duration::from_millis(rng.gen_range(self.min_ms..=self.max_ms))
    }

    /// Parse `"min-max"` or a single `"ms"` value.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        match value.split_once('-') {
            Some((min, max)) => {
                let min = min.trim().parse().ok()?;
                let max = max.trim().parse().ok()?;
                Some(Self::from_millis(min, max))
            }
            None => {
                let ms = value.parse().ok()?;
                Some(Self::from_millis(ms, ms))
            }
        }
    }
}

/// Pacing policy for a run.
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    /// Pause before each source query.
    pub request_delay: DelayRange,
    /// Pause after every `cooldown_every` processed items.
    pub cooldown: DelayRange,
    /// Batch size for the cool-down. Zero disables cool-downs.
    pub cooldown_every: usize,
}

impl RateLimitConfig {
    /// No pauses at all. Batches are still counted.
    pub fn disabled() -> Self {
        Self {
            request_delay: DelayRange::zero(),
            cooldown: DelayRange::zero(),
            cooldown_every: DEFAULT_COOLDOWN_EVERY,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            request_delay: DEFAULT_REQUEST_DELAY,
            cooldown: DEFAULT_COOLDOWN,
            cooldown_every: DEFAULT_COOLDOWN_EVERY,
        }
    }
}

/// Randomized delay source shared by all providers of a run.
///
/// Holds no state besides counters, so it is safe to share behind an `Arc`.
#[derive(Debug, Default)]
pub struct RateLimiter {
    config: RateLimitConfig,
    requests: AtomicU64,
    cooldowns: AtomicU64,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            requests: AtomicU64::new(0),
            cooldowns: AtomicU64::new(0),
        }
    }

    /// Suspend for a random duration within `range`.
    pub async fn wait(&self, range: DelayRange) -> Duration {
        if range.is_zero() {
            return Duration::ZERO;
        }
        let delay = range.sample(&mut rand::thread_rng());
        tokio::time::sleep(delay).await;
        delay
    }

    /// Pause before querying `source`.
    pub async fn before_request(&self, source: SourceKind) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let delay = self.wait(self.config.request_delay).await;
        if !delay.is_zero() {
            debug!(
                "Rate limiter: paused {:.1}s before querying {}",
                delay.as_secs_f64(),
                source
            );
        }
    }

    /// Whether a cool-down is due after `processed` items out of `total`.
    ///
    /// Due after every full batch, except when that item closes the run.
    pub fn cooldown_due(&self, processed: usize, total: usize) -> bool {
        let every = self.config.cooldown_every;
        every > 0 && processed > 0 && processed % every == 0 && processed < total
    }

    /// Long pause between batches.
    pub async fn cooldown(&self) {
        self.cooldowns.fetch_add(1, Ordering::Relaxed);
        let delay = self.wait(self.config.cooldown).await;
        if !delay.is_zero() {
            debug!("Rate limiter: batch cool-down {:.1}s", delay.as_secs_f64());
        }
    }

    /// Number of source queries paced so far.
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Number of batch cool-downs applied so far.
    pub fn cooldown_count(&self) -> u64 {
        self.cooldowns.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tokio::time::Instant;

    #[test]
    fn test_sample_stays_in_range() {
        let range = DelayRange::from_millis(1_500, 3_000);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let d = range.sample(&mut rng).as_millis() as u64;
            assert!((1_500..=3_000).contains(&d), "{} out of range", d);
        }
    }

    #[test]
    fn test_reversed_bounds_are_swapped() {
        let range = DelayRange::from_millis(15_000, 8_000);
        assert_eq!(range.min_ms, 8_000);
        assert_eq!(range.max_ms, 15_000);
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(
            DelayRange::parse("1500-3000"),
            Some(DelayRange::from_millis(1_500, 3_000))
        );
        assert_eq!(
            DelayRange::parse(" 250 "),
            Some(DelayRange::from_millis(250, 250))
        );
        assert_eq!(DelayRange::parse("fast"), None);
        assert_eq!(DelayRange::parse("10-"), None);
    }

    #[test]
    fn test_defaults() {
        let config = RateLimitConfig::default();
        assert_eq!(config.request_delay, DelayRange::from_millis(1_500, 3_000));
        assert_eq!(config.cooldown, DelayRange::from_millis(8_000, 15_000));
        assert_eq!(config.cooldown_every, 5);
    }

    #[test]
    fn test_cooldown_due_every_fifth_except_last() {
        let limiter = RateLimiter::new(RateLimitConfig::disabled());

        let due: Vec<usize> = (1..=12).filter(|n| limiter.cooldown_due(*n, 12)).collect();
        assert_eq!(due, vec![5, 10]);

        // Exactly one batch: the fifth item is also the last.
        assert!(!limiter.cooldown_due(5, 5));
        assert!(limiter.cooldown_due(5, 6));
    }

    #[test]
    fn test_cooldown_disabled_when_every_is_zero() {
        let limiter = RateLimiter::new(RateLimitConfig {
            cooldown_every: 0,
            ..RateLimitConfig::disabled()
        });
        assert!(!limiter.cooldown_due(5, 10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_before_request_sleeps_within_range() {
        let limiter = RateLimiter::new(RateLimitConfig::default());

        let start = Instant::now();
        limiter.before_request(SourceKind::GoogleBooks).await;
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(1_500));
        assert!(elapsed <= Duration::from_millis(3_000) + Duration::from_millis(5));
        assert_eq!(limiter.request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_sleeps_within_range() {
        let limiter = RateLimiter::new(RateLimitConfig::default());

        let start = Instant::now();
        limiter.cooldown().await;
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(8_000));
        assert!(elapsed <= Duration::from_millis(15_000) + Duration::from_millis(5));
        assert_eq!(limiter.cooldown_count(), 1);
    }

    #[tokio::test]
    async fn test_disabled_config_does_not_sleep() {
        let limiter = RateLimiter::new(RateLimitConfig::disabled());

        let start = std::time::Instant::now();
        limiter.before_request(SourceKind::OpenLibrary).await;
        limiter.cooldown().await;

        assert!(start.elapsed() < Duration::from_millis(100));
        assert_eq!(limiter.request_count(), 1);
        assert_eq!(limiter.cooldown_count(), 1);
    }
}
