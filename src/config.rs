//! Run configuration: search terms, browser launch flags, and timing policies.
//!
//! Everything here is passed into components at construction time. The timing
//! policies ([`Pacing`], [`RetryPolicy`]) carry their delay ranges explicitly
//! so tests can run with zero delay.

use rand::{Rng, rng};
use std::time::Duration;
use tokio::time::sleep;

/// Search terms driving the per-term scrape pipeline, in run order.
pub const SEARCH_TERMS: &[&str] = &["hdfc", "tata motors"];

/// Fixed browser launch flags: headless, fixed geometry and locale, the
/// automation-detection blink feature disabled, and a pinned user agent.
pub const BROWSER_ARGS: &[&str] = &[
    "--headless=new",
    "--disable-gpu",
    "--window-size=1920,1080",
    "--lang=en-US",
    "--disable-blink-features=AutomationControlled",
    "--user-agent=Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/91.0.4472.124 Safari/537.36",
];

/// Maximum article links taken per search term. A throttle, not a ranking.
pub const MAX_LINKS_PER_TERM: usize = 5;

/// How long the store keeps superseded row versions before vacuuming them.
pub const DEFAULT_RETENTION_HOURS: i64 = 168;

/// A randomized delay range, awaited between requests to avoid detectable
/// request regularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Pacing {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// Zero delay, for tests.
    pub const fn none() -> Self {
        Self { min_ms: 0, max_ms: 0 }
    }

    /// Sleep for a uniformly random duration within the range.
    pub async fn pause(&self) {
        if self.max_ms == 0 {
            return;
        }
        let ms = rng().random_range(self.min_ms..=self.max_ms);
        sleep(Duration::from_millis(ms)).await;
    }
}

/// Caller-side retry policy for article fetches.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: u32,
    /// Randomized backoff slept between attempts.
    pub backoff: Pacing,
}

/// Timing knobs for one scrape run.
#[derive(Debug, Clone, Copy)]
pub struct ScrapeConfig {
    /// Jitter inserted before parsing a results page or navigating to an article.
    pub pacing: Pacing,
    /// Retry policy applied around each article fetch.
    pub retry: RetryPolicy,
    /// Upper bound on waiting for the article container to become visible.
    pub content_timeout: Duration,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            pacing: Pacing::new(1_000, 3_000),
            retry: RetryPolicy {
                attempts: 3,
                backoff: Pacing::new(1_000, 3_000),
            },
            content_timeout: Duration::from_secs(120),
        }
    }
}

impl ScrapeConfig {
    /// A configuration with no delays and a short wait, for tests.
    pub fn immediate() -> Self {
        Self {
            pacing: Pacing::none(),
            retry: RetryPolicy {
                attempts: 3,
                backoff: Pacing::none(),
            },
            content_timeout: Duration::from_millis(50),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_pacing_none_returns_immediately() {
        let t0 = Instant::now();
        Pacing::none().pause().await;
        assert!(t0.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_pacing_sleeps_within_range() {
        let t0 = Instant::now();
        Pacing::new(10, 20).pause().await;
        let elapsed = t0.elapsed();
        assert!(elapsed >= Duration::from_millis(10));
    }

    #[test]
    fn test_default_config_matches_site_policy() {
        let config = ScrapeConfig::default();
        assert_eq!(config.retry.attempts, 3);
        assert_eq!(config.retry.backoff, Pacing::new(1_000, 3_000));
        assert_eq!(config.content_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_search_terms_are_ordered() {
        assert_eq!(SEARCH_TERMS, &["hdfc", "tata motors"]);
    }
}
