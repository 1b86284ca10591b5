//! Website scrapers.
//!
//! Each supported source implements the [`Scraper`] contract: given a target
//! date and the configured search terms, produce the run-level batch of
//! [`ArticleRecord`]s. Failures inside a scraper never abort the run — a
//! failed term or URL is logged and skipped, so `scrape` itself is
//! infallible.
//!
//! | Source | Module | Notes |
//! |--------|--------|-------|
//! | YourStory | [`yourstory`] | Search-driven discovery + per-article fetch |
//! | Finshots | [`finshots`] | Stub, returns an empty batch |

use chromiumoxide::error::CdpError;
use std::time::Duration;
use thiserror::Error;

use crate::models::{ArticleRecord, Website};

pub mod finshots;
pub mod yourstory;

/// Errors raised while driving the browser or extracting page content.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The browser configuration could not be built or the launch failed
    /// in a way chromiumoxide reports as a plain message.
    #[error("failed to configure browser: {0}")]
    Launch(String),

    /// The fallback provisioning path could not download a browser binary.
    #[error("failed to provision a browser binary: {0}")]
    Provision(String),

    /// CDP-level failure: launch, navigation, or page interaction.
    #[error("browser error: {0}")]
    Browser(#[from] CdpError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// The awaited element never became available within the bound.
    #[error("timed out after {waited:?} waiting for `{selector}`")]
    Timeout { selector: String, waited: Duration },

    /// The page loaded but a required element was absent.
    #[error("element `{0}` not found in page")]
    MissingElement(&'static str),
}

/// Contract implemented by each source variant.
///
/// `scrape` runs the whole per-source pipeline (discovery, fetch, scoring,
/// assembly) for every configured search term and returns the aggregated
/// batch. Records for articles that failed fetching after retries are
/// simply absent.
pub trait Scraper {
    /// The source this scraper handles; used as the store partition.
    fn website(&self) -> Website;

    /// Run the pipeline and return the assembled batch.
    async fn scrape(&self) -> Vec<ArticleRecord>;
}
