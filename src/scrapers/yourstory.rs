//! YourStory scraper.
//!
//! Discovery runs against the site's search page, one search term at a time:
//! the story container is parsed out of the loaded results page, displayed
//! dates (`DD/MM/YYYY`) are compared against the target date, and at most
//! [`MAX_LINKS_PER_TERM`] matches are kept in document order. Each matched
//! article is then fetched in its own browser session — sessions are never
//! reused across articles — and extracted with the `scraper` crate.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::browser::{BrowserSession, wait_for_selector};
use crate::config::{MAX_LINKS_PER_TERM, Pacing, RetryPolicy, ScrapeConfig};
use crate::models::{ArticleContent, ArticleLink, ArticleRecord, Website};
use crate::scrapers::{ScrapeError, Scraper};
use crate::sentiment;
use crate::utils::truncate_for_log;

/// Selector the results page must satisfy before its markup is read.
const STORY_CONTAINER: &str = "div.storyItem";
/// Selector the article page must satisfy before its content is read.
const ARTICLE_CONTAINER: &str = "div#article_container";

// Class names below are the site's generated ones and change when the site
// redeploys its styles.
static STORY_CONTAINER_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(STORY_CONTAINER).unwrap());
static STORY_ITEM_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("li.sc-c9f6afaa-0").unwrap());
static ANCHOR_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static ITEM_DATE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("span.dpmmXH").unwrap());
static ARTICLE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse(ARTICLE_CONTAINER).unwrap());
static HEADER_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static TAGLINE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("h2").unwrap());

/// Scraper for the YourStory website.
pub struct YourStoryScraper {
    date: NaiveDate,
    search_terms: Vec<String>,
    config: ScrapeConfig,
}

impl YourStoryScraper {
    pub fn new(date: NaiveDate, search_terms: &[&str], config: ScrapeConfig) -> Self {
        info!(%date, ?search_terms, "Initialized YourStory scraper");
        Self {
            date,
            search_terms: search_terms.iter().map(|s| s.to_string()).collect(),
            config,
        }
    }

    /// Run discovery + fetch for one search term.
    ///
    /// Errors here mean the term produced nothing (launch or discovery
    /// failure); individual article failures are handled inside and do not
    /// surface.
    #[instrument(level = "info", skip(self))]
    async fn scrape_term(&self, term: &str) -> Result<Vec<ArticleRecord>, ScrapeError> {
        let search_url = search_url(term);
        let base_url = Url::parse(&search_url)?;

        let session = BrowserSession::launch().await?;
        let page_source = {
            let result = async {
                let page = session.open(&search_url).await?;
                wait_for_selector(&page, STORY_CONTAINER, self.config.content_timeout).await?;
                page.content().await.map_err(ScrapeError::from)
            }
            .await;
            session.close().await;
            result?
        };

        let links = discover_links(&page_source, &base_url, self.date, &self.config.pacing).await;
        info!(term, count = links.len(), "Discovered article links");

        let fetcher = BrowserFetch {
            config: &self.config,
        };
        Ok(assemble_records(&fetcher, &links, &self.config.retry, self.date).await)
    }
}

impl Scraper for YourStoryScraper {
    fn website(&self) -> Website {
        Website::YourStory
    }

    #[instrument(level = "info", skip(self), fields(date = %self.date))]
    async fn scrape(&self) -> Vec<ArticleRecord> {
        let mut batch = Vec::new();
        for term in &self.search_terms {
            info!(term, "Scraping articles for search term");
            match self.scrape_term(term).await {
                Ok(mut records) => {
                    info!(term, count = records.len(), "Search term completed");
                    batch.append(&mut records);
                }
                Err(e) => {
                    warn!(term, error = %e, "Search term failed; continuing with the next");
                }
            }
        }
        batch
    }
}

/// Search-results URL for one term.
fn search_url(term: &str) -> String {
    format!(
        "https://yourstory.com/search?q={}&page=1",
        urlencoding::encode(term)
    )
}

/// Extract article links from a loaded search-results page, keeping only
/// those whose displayed date equals `target`, capped at
/// [`MAX_LINKS_PER_TERM`] in document order.
///
/// A missing story container or zero matches is a normal empty result.
pub async fn discover_links(
    page_source: &str,
    base_url: &Url,
    target: NaiveDate,
    pacing: &Pacing,
) -> Vec<ArticleLink> {
    // Jitter before touching the markup, to break up request regularity.
    pacing.pause().await;

    let document = Html::parse_document(page_source);
    let Some(container) = document.select(&STORY_CONTAINER_SEL).next() else {
        warn!("No story items found on the page");
        return Vec::new();
    };

    let mut links = Vec::new();
    for item in container.select(&STORY_ITEM_SEL) {
        let Some(anchor) = item.select(&ANCHOR_SEL).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(date_span) = item.select(&ITEM_DATE_SEL).next() else {
            continue;
        };

        let shown = date_span.text().collect::<String>();
        let shown = shown.trim();
        let Ok(published) = NaiveDate::parse_from_str(shown, "%d/%m/%Y") else {
            debug!(shown, "Unparseable date on story item; skipping");
            continue;
        };
        if published != target {
            continue;
        }

        let Ok(resolved) = base_url.join(href) else {
            debug!(href, "Unresolvable href on story item; skipping");
            continue;
        };
        links.push(ArticleLink {
            published,
            url: resolved,
        });
        if links.len() == MAX_LINKS_PER_TERM {
            break;
        }
    }

    if links.is_empty() {
        warn!(%target, "No articles found for the given date");
    }
    links
}

/// Contract for fetching one article's content.
///
/// The production implementation ([`BrowserFetch`]) drives a fresh browser
/// session per call; tests substitute implementations that fail on demand
/// to exercise the retry and skip behavior.
pub(crate) trait FetchArticle {
    async fn fetch(&self, url: &Url) -> Result<ArticleContent, ScrapeError>;
}

/// Production fetcher: one browser session per article.
struct BrowserFetch<'a> {
    config: &'a ScrapeConfig,
}

impl FetchArticle for BrowserFetch<'_> {
    async fn fetch(&self, url: &Url) -> Result<ArticleContent, ScrapeError> {
        fetch_article_content(url, self.config).await
    }
}

/// Fetch every discovered link and assemble the records for one term.
///
/// A link whose fetch exhausts its retries is logged and skipped; it leaves
/// no placeholder row and does not affect the other links.
async fn assemble_records<F: FetchArticle>(
    fetcher: &F,
    links: &[ArticleLink],
    retry: &RetryPolicy,
    query_date: NaiveDate,
) -> Vec<ArticleRecord> {
    let mut records = Vec::new();
    for link in links {
        match fetch_with_retries(fetcher, &link.url, retry).await {
            Ok(content) => {
                let score = sentiment::score(&content.article);
                records.push(ArticleRecord::assemble(link, content, score, query_date));
            }
            Err(e) => {
                warn!(url = %link.url, error = %e, "Skipping article after exhausted retries");
            }
        }
    }
    records
}

/// Fetch one article with the configured retry policy: up to
/// `retry.attempts` attempts with randomized backoff in between.
pub(crate) async fn fetch_with_retries<F: FetchArticle>(
    fetcher: &F,
    url: &Url,
    retry: &RetryPolicy,
) -> Result<ArticleContent, ScrapeError> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match fetcher.fetch(url).await {
            Ok(content) => return Ok(content),
            Err(e) if attempt < retry.attempts => {
                warn!(
                    %url,
                    attempt,
                    max = retry.attempts,
                    error = %e,
                    "Fetch attempt failed; backing off"
                );
                retry.backoff.pause().await;
            }
            Err(e) => {
                error!(%url, attempts = attempt, error = %e, "Fetch exhausted retries");
                return Err(e);
            }
        }
    }
}

/// Fetch one article in a fresh browser session.
///
/// The session is closed on every exit path; on failure the page state is
/// snapshotted into the log before the error propagates to the retry
/// wrapper, which starts over with a new session.
#[instrument(level = "info", skip_all, fields(%url))]
async fn fetch_article_content(
    url: &Url,
    config: &ScrapeConfig,
) -> Result<ArticleContent, ScrapeError> {
    let session = BrowserSession::launch().await?;
    config.pacing.pause().await;

    let outcome = load_article(&session, url, config).await;
    session.close().await;

    match &outcome {
        Ok(content) => {
            info!(bytes = content.article.len(), "Fetched article content");
        }
        Err(e) => {
            error!(%url, error = %e, "Error fetching article content");
        }
    }
    outcome
}

async fn load_article(
    session: &BrowserSession,
    url: &Url,
    config: &ScrapeConfig,
) -> Result<ArticleContent, ScrapeError> {
    let page = session.open(url.as_str()).await?;

    if let Err(e) = wait_for_selector(&page, ARTICLE_CONTAINER, config.content_timeout).await {
        if let Ok(html) = page.content().await {
            error!(snapshot = %truncate_for_log(&html, 100), "Page source at the time of error");
        }
        return Err(e);
    }

    let html = page.content().await?;
    parse_article(&html)
}

/// Extract body, header, and tagline from a loaded article page.
fn parse_article(html: &str) -> Result<ArticleContent, ScrapeError> {
    let document = Html::parse_document(html);

    let article = document
        .select(&ARTICLE_SEL)
        .next()
        .map(|el| element_text(&el))
        .ok_or(ScrapeError::MissingElement(ARTICLE_CONTAINER))?;
    let header = document
        .select(&HEADER_SEL)
        .next()
        .map(|el| element_text(&el))
        .ok_or(ScrapeError::MissingElement("h1"))?;
    let tagline = document
        .select(&TAGLINE_SEL)
        .next()
        .map(|el| element_text(&el))
        .ok_or(ScrapeError::MissingElement("h2"))?;

    Ok(ArticleContent {
        article,
        header,
        tagline,
    })
}

fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
