//! Finshots scraper stub.
//!
//! The source is selectable from the CLI but scraping is not implemented
//! yet; a run against it logs the fact and produces an empty batch.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::models::{ArticleRecord, Website};
use crate::scrapers::Scraper;

pub struct FinshotsScraper {
    date: NaiveDate,
}

impl FinshotsScraper {
    pub fn new(date: NaiveDate) -> Self {
        info!(%date, "Initialized Finshots scraper");
        Self { date }
    }
}

impl Scraper for FinshotsScraper {
    fn website(&self) -> Website {
        Website::Finshots
    }

    async fn scrape(&self) -> Vec<ArticleRecord> {
        warn!(date = %self.date, "Finshots scraping is not implemented; returning no articles");
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_finshots_scrape_is_empty() {
        let scraper = FinshotsScraper::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(scraper.website(), Website::Finshots);
        assert!(scraper.scrape().await.is_empty());
    }
}
