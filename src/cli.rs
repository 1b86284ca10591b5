//! Command-line interface definitions.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! The website selector is validated by clap before any scraping begins, so
//! an unsupported source never reaches the pipeline.

use clap::{Parser, ValueEnum};

use crate::models::Website;

/// Command-line arguments for the scrape run.
///
/// # Examples
///
/// ```sh
/// # Scrape YourStory articles for a date into a local store
/// news_sentiments --date 2024-03-01 --storage-path ./articles.db --website yourstory
///
/// # Same run with verbose logging
/// news_sentiments --date 2024-03-01 --storage-path ./articles.db --website yourstory --log-level debug
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// The date for which to scrape data (format: YYYY-MM-DD)
    #[arg(long)]
    pub date: String,

    /// Path of the article store where scraped data will be merged
    #[arg(long)]
    pub storage_path: String,

    /// The website to scrape
    #[arg(long, value_enum)]
    pub website: Website,

    /// Log verbosity (overridden by RUST_LOG when set)
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

/// Standard log severities accepted by `--log-level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// The `EnvFilter` directive this level maps to.
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_directive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "news_sentiments",
            "--date",
            "2024-03-01",
            "--storage-path",
            "./articles.db",
            "--website",
            "yourstory",
        ]);

        assert_eq!(cli.date, "2024-03-01");
        assert_eq!(cli.storage_path, "./articles.db");
        assert_eq!(cli.website, Website::YourStory);
        assert_eq!(cli.log_level, LogLevel::Info);
    }

    #[test]
    fn test_cli_log_level_override() {
        let cli = Cli::parse_from([
            "news_sentiments",
            "--date",
            "2024-03-01",
            "--storage-path",
            "/tmp/articles.db",
            "--website",
            "finshots",
            "--log-level",
            "debug",
        ]);

        assert_eq!(cli.website, Website::Finshots);
        assert_eq!(cli.log_level, LogLevel::Debug);
        assert_eq!(cli.log_level.as_directive(), "debug");
    }

    #[test]
    fn test_cli_rejects_unknown_website() {
        let result = Cli::try_parse_from([
            "news_sentiments",
            "--date",
            "2024-03-01",
            "--storage-path",
            "./articles.db",
            "--website",
            "moneycontrol",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn test_cli_requires_date() {
        let result = Cli::try_parse_from([
            "news_sentiments",
            "--storage-path",
            "./articles.db",
            "--website",
            "yourstory",
        ]);

        assert!(result.is_err());
    }
}
