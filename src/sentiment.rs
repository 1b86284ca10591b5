//! Sentiment scoring.
//!
//! Placeholder implementation: the score is drawn uniformly from [0, 1) with
//! no relationship to the input. The contract the pipeline relies on is the
//! interface only — pure, always returns, output bounded to [0, 1] — so a
//! real model can replace this without touching callers.

use rand::{Rng, rng};

/// Score the sentiment of an article body. Always succeeds.
pub fn score(_article: &str) -> f64 {
    rng().random::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_is_bounded() {
        for _ in 0..1_000 {
            let s = score("Tata Motors posted record quarterly results.");
            assert!((0.0..=1.0).contains(&s));
        }
    }

    #[test]
    fn test_score_handles_empty_input() {
        let s = score("");
        assert!((0.0..=1.0).contains(&s));
    }
}
