//! Browser session lifecycle.
//!
//! A [`BrowserSession`] owns one headless browser instance plus the CDP
//! handler task that pumps its event stream. Sessions are launched per fetch
//! and must always be released through [`BrowserSession::close`], which is
//! safe to call after a partial failure.
//!
//! Launch fallback: if the default Chrome discovery fails (typically no
//! local browser binary), a managed binary is downloaded once via the
//! chromiumoxide fetcher and the launch is retried with it.

use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, instrument, warn};

use crate::config::BROWSER_ARGS;
use crate::scrapers::ScrapeError;

/// How often [`wait_for_selector`] re-probes the page.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// An exclusively-owned headless browser instance.
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    // Unique profile dir; removed when the session is dropped.
    _profile_dir: TempDir,
}

impl BrowserSession {
    /// Launch a session, falling back to a provisioned browser binary if the
    /// default discovery path fails.
    #[instrument(level = "debug")]
    pub async fn launch() -> Result<Self, ScrapeError> {
        match Self::launch_with(None).await {
            Ok(session) => Ok(session),
            Err(e) => {
                warn!(error = %e, "Browser launch failed; provisioning a managed binary");
                let executable = provision_browser().await?;
                info!(path = %executable.display(), "Provisioned browser binary");
                Self::launch_with(Some(executable)).await
            }
        }
    }

    async fn launch_with(executable: Option<PathBuf>) -> Result<Self, ScrapeError> {
        // Unique user-data dir per session avoids profile lock conflicts.
        let profile_dir = tempfile::Builder::new()
            .prefix("news-sentiments-profile-")
            .tempdir()?;

        let mut builder = BrowserConfig::builder()
            .window_size(1920, 1080)
            .user_data_dir(profile_dir.path())
            .args(BROWSER_ARGS.iter().copied());
        if let Some(path) = executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(ScrapeError::Launch)?;

        let (browser, mut handler) = Browser::launch(config).await?;

        // The handler stream must be polled for the browser to make progress.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "CDP handler event error");
                }
            }
        });

        debug!("Browser session launched");
        Ok(Self {
            browser,
            handler_task,
            _profile_dir: profile_dir,
        })
    }

    /// Open a new page and navigate it to `url`.
    pub async fn open(&self, url: &str) -> Result<Page, ScrapeError> {
        let page = self.browser.new_page(url).await?;
        Ok(page)
    }

    /// Close the browser and stop the handler task. Best-effort: close
    /// errors are logged, never propagated, so this is safe on every exit
    /// path including after a partially failed launch.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            debug!(error = %e, "Browser close error (ignored)");
        }
        let _ = self.browser.wait().await;
        self.handler_task.abort();
        debug!("Browser session closed");
    }
}

/// Wait for an element matching `selector` to appear, polling up to
/// `timeout`. Approximates an explicit visibility wait.
pub async fn wait_for_selector(
    page: &Page,
    selector: &str,
    timeout: Duration,
) -> Result<(), ScrapeError> {
    let deadline = Instant::now() + timeout;
    loop {
        if page.find_element(selector).await.is_ok() {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(ScrapeError::Timeout {
                selector: selector.to_string(),
                waited: timeout,
            });
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Download a browser binary into a cached location and return its path.
async fn provision_browser() -> Result<PathBuf, ScrapeError> {
    let download_dir = std::env::temp_dir().join("news-sentiments-browser");
    tokio::fs::create_dir_all(&download_dir).await?;

    let options = BrowserFetcherOptions::builder()
        .with_path(&download_dir)
        .build()
        .map_err(|e| ScrapeError::Provision(e.to_string()))?;
    let fetcher = BrowserFetcher::new(options);
    let info = fetcher
        .fetch()
        .await
        .map_err(|e| ScrapeError::Provision(e.to_string()))?;

    Ok(info.executable_path)
}
