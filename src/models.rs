//! Data model for the scraping pipeline.
//!
//! [`ArticleLink`] is the ephemeral output of link discovery, consumed
//! immediately by the content fetcher. [`ArticleRecord`] is the persisted
//! row shape: it is built once by the result assembler and never mutated —
//! an upsert replaces the whole row.

use chrono::{DateTime, NaiveDate, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Supported news sources. Doubles as the store's partition value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum Website {
    #[value(name = "yourstory")]
    YourStory,
    #[value(name = "finshots")]
    Finshots,
}

impl Website {
    pub fn as_str(&self) -> &'static str {
        match self {
            Website::YourStory => "yourstory",
            Website::Finshots => "finshots",
        }
    }
}

impl fmt::Display for Website {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate article found on a search-results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleLink {
    /// Publication date shown next to the link on the results page.
    pub published: NaiveDate,
    /// Absolute article URL, resolved against the results page.
    pub url: Url,
}

/// Text extracted from a loaded article page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleContent {
    /// Body text of the article container.
    pub article: String,
    /// Primary heading.
    pub header: String,
    /// Secondary heading.
    pub tagline: String,
}

/// One persisted row of the article store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub date: NaiveDate,
    pub url: String,
    pub article: String,
    pub header: String,
    pub tagline: String,
    /// Always within [0, 1].
    pub sentiment_score: f64,
    /// Deduplication key, stable across runs for the same URL and query date.
    pub unique_key: String,
    pub scraping_timestamp: DateTime<Utc>,
}

impl ArticleRecord {
    /// Assemble a record from a discovered link, its fetched content, and a
    /// sentiment score. Stamps the current wall-clock time.
    pub fn assemble(
        link: &ArticleLink,
        content: ArticleContent,
        sentiment_score: f64,
        query_date: NaiveDate,
    ) -> Self {
        let url = link.url.to_string();
        let unique_key = unique_key(&url, query_date);
        Self {
            date: link.published,
            url,
            article: content.article,
            header: content.header,
            tagline: content.tagline,
            sentiment_score,
            unique_key,
            scraping_timestamp: Utc::now(),
        }
    }
}

/// Derive the deduplication key: trimmed, lowercased URL concatenated with
/// the ISO query date.
pub fn unique_key(url: &str, query_date: NaiveDate) -> String {
    format!("{}{}", url.trim().to_lowercase(), query_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_link() -> ArticleLink {
        ArticleLink {
            published: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            url: Url::parse("https://yourstory.com/2024/03/some-article").unwrap(),
        }
    }

    #[test]
    fn test_unique_key_normalizes_url() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(
            unique_key("  HTTPS://YourStory.com/Story  ", date),
            "https://yourstory.com/story2024-03-01"
        );
    }

    #[test]
    fn test_unique_key_stable_across_calls() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(
            unique_key("https://yourstory.com/a", date),
            unique_key("https://yourstory.com/a", date)
        );
    }

    #[test]
    fn test_assemble_builds_full_record() {
        let link = sample_link();
        let content = ArticleContent {
            article: "Body text".to_string(),
            header: "Header".to_string(),
            tagline: "Tagline".to_string(),
        };
        let query_date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let record = ArticleRecord::assemble(&link, content, 0.42, query_date);

        assert_eq!(record.date, link.published);
        assert_eq!(record.url, "https://yourstory.com/2024/03/some-article");
        assert_eq!(record.article, "Body text");
        assert_eq!(record.header, "Header");
        assert_eq!(record.tagline, "Tagline");
        assert_eq!(record.sentiment_score, 0.42);
        assert_eq!(
            record.unique_key,
            "https://yourstory.com/2024/03/some-article2024-03-01"
        );
    }

    #[test]
    fn test_website_display_matches_cli_names() {
        assert_eq!(Website::YourStory.to_string(), "yourstory");
        assert_eq!(Website::Finshots.to_string(), "finshots");
    }
}
