//! The on-disk article store.
//!
//! SQLite-backed table keyed by `unique_key` with a `website` partition
//! column. Upserts have replace semantics: the superseded version of a row
//! is archived into a history table before being overwritten, and
//! [`ArticleStore::vacuum`] later removes archived versions older than the
//! retention horizon.

use chrono::{Duration, Utc};
use sqlx::{
    Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
};
use std::path::Path;
use std::str::FromStr;
use tracing::{info, instrument};

use crate::models::{ArticleRecord, Website};

#[derive(Clone)]
pub struct ArticleStore {
    pool: Pool<Sqlite>,
}

impl ArticleStore {
    /// Open the store at `path`, creating the database file and schema if
    /// they do not exist yet.
    #[instrument(level = "info")]
    pub async fn open(path: &str) -> Result<Self, sqlx::Error> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
            }
        }

        let connect_options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options)
            .await?;

        let store = ArticleStore { pool };
        store.initialize_schema().await?;
        info!(path, "Article store opened");
        Ok(store)
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    async fn initialize_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS articles (
                unique_key TEXT PRIMARY KEY,
                website TEXT NOT NULL,
                date TEXT NOT NULL,
                url TEXT NOT NULL,
                article TEXT NOT NULL,
                header TEXT NOT NULL,
                tagline TEXT NOT NULL,
                sentiment_score REAL NOT NULL,
                scraping_timestamp TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_articles_website ON articles (website);

            -- Superseded row versions, kept until the retention horizon.
            CREATE TABLE IF NOT EXISTS articles_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                unique_key TEXT NOT NULL,
                website TEXT NOT NULL,
                date TEXT NOT NULL,
                url TEXT NOT NULL,
                article TEXT NOT NULL,
                header TEXT NOT NULL,
                tagline TEXT NOT NULL,
                sentiment_score REAL NOT NULL,
                scraping_timestamp TEXT NOT NULL,
                archived_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_history_archived_at ON articles_history (archived_at);
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Merge a batch into the store: rows whose `unique_key` matches an
    /// existing row fully replace it (the old version is archived first),
    /// unmatched rows are inserted. The whole batch commits as one
    /// transaction.
    #[instrument(level = "info", skip_all, fields(website = %website, rows = batch.len()))]
    pub async fn upsert(
        &self,
        website: Website,
        batch: &[ArticleRecord],
    ) -> Result<u64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let archived_at = Utc::now().to_rfc3339();

        for record in batch {
            sqlx::query(
                r#"
                INSERT INTO articles_history
                    (unique_key, website, date, url, article, header, tagline,
                     sentiment_score, scraping_timestamp, archived_at)
                SELECT unique_key, website, date, url, article, header, tagline,
                       sentiment_score, scraping_timestamp, ?1
                FROM articles WHERE unique_key = ?2
                "#,
            )
            .bind(&archived_at)
            .bind(&record.unique_key)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO articles
                    (unique_key, website, date, url, article, header, tagline,
                     sentiment_score, scraping_timestamp)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                ON CONFLICT(unique_key) DO UPDATE SET
                    website = excluded.website,
                    date = excluded.date,
                    url = excluded.url,
                    article = excluded.article,
                    header = excluded.header,
                    tagline = excluded.tagline,
                    sentiment_score = excluded.sentiment_score,
                    scraping_timestamp = excluded.scraping_timestamp
                "#,
            )
            .bind(&record.unique_key)
            .bind(website.as_str())
            .bind(record.date.to_string())
            .bind(&record.url)
            .bind(&record.article)
            .bind(&record.header)
            .bind(&record.tagline)
            .bind(record.sentiment_score)
            .bind(record.scraping_timestamp.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(rows = batch.len(), "Merged batch into article store");
        Ok(batch.len() as u64)
    }

    /// Remove archived row versions older than `retention_hours`. Returns
    /// the number of versions removed. Best-effort housekeeping: callers
    /// log failures as warnings and carry on.
    #[instrument(level = "info", skip(self))]
    pub async fn vacuum(&self, retention_hours: i64) -> Result<u64, sqlx::Error> {
        let cutoff = (Utc::now() - Duration::hours(retention_hours)).to_rfc3339();
        let result = sqlx::query("DELETE FROM articles_history WHERE archived_at < ?1")
            .bind(&cutoff)
            .execute(&self.pool)
            .await?;
        info!(
            retention_hours,
            removed = result.rows_affected(),
            "Vacuumed article store history"
        );
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn record(url: &str, header: &str, score: f64) -> ArticleRecord {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        ArticleRecord {
            date,
            url: url.to_string(),
            article: format!("body of {url}"),
            header: header.to_string(),
            tagline: "tagline".to_string(),
            sentiment_score: score,
            unique_key: crate::models::unique_key(url, date),
            scraping_timestamp: Utc::now(),
        }
    }

    async fn open_temp_store() -> (tempfile::TempDir, ArticleStore) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("articles.db");
        let store = ArticleStore::open(path.to_str().unwrap()).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_upsert_inserts_new_rows() {
        let (_dir, store) = open_temp_store().await;
        let batch = vec![
            record("https://yourstory.com/a", "A", 0.1),
            record("https://yourstory.com/b", "B", 0.2),
        ];

        let written = store.upsert(Website::YourStory, &batch).await.unwrap();
        assert_eq!(written, 2);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_upsert_replaces_matching_key() {
        let (_dir, store) = open_temp_store().await;
        let first = vec![record("https://yourstory.com/a", "old header", 0.1)];
        let second = vec![record("https://yourstory.com/a", "new header", 0.9)];

        store.upsert(Website::YourStory, &first).await.unwrap();
        store.upsert(Website::YourStory, &second).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);

        let (header, score): (String, f64) = sqlx::query_as(
            "SELECT header, sentiment_score FROM articles WHERE unique_key = ?1",
        )
        .bind(&second[0].unique_key)
        .fetch_one(store.pool())
        .await
        .unwrap();
        assert_eq!(header, "new header");
        assert_eq!(score, 0.9);
    }

    #[tokio::test]
    async fn test_upsert_archives_replaced_version() {
        let (_dir, store) = open_temp_store().await;
        let first = vec![record("https://yourstory.com/a", "old header", 0.1)];
        let second = vec![record("https://yourstory.com/a", "new header", 0.9)];

        store.upsert(Website::YourStory, &first).await.unwrap();
        store.upsert(Website::YourStory, &second).await.unwrap();

        let archived: Vec<(String,)> =
            sqlx::query_as("SELECT header FROM articles_history ORDER BY id")
                .fetch_all(store.pool())
                .await
                .unwrap();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].0, "old header");
    }

    #[tokio::test]
    async fn test_upsert_stamps_partition_column() {
        let (_dir, store) = open_temp_store().await;
        let batch = vec![record("https://yourstory.com/a", "A", 0.5)];

        store.upsert(Website::YourStory, &batch).await.unwrap();

        let website: String = sqlx::query_scalar("SELECT website FROM articles")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(website, "yourstory");
    }

    #[tokio::test]
    async fn test_upsert_empty_batch_is_a_noop() {
        let (_dir, store) = open_temp_store().await;

        let written = store.upsert(Website::YourStory, &[]).await.unwrap();
        assert_eq!(written, 0);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_vacuum_removes_old_versions_only() {
        let (_dir, store) = open_temp_store().await;
        let first = vec![record("https://yourstory.com/a", "old header", 0.1)];
        let second = vec![record("https://yourstory.com/a", "new header", 0.9)];
        store.upsert(Website::YourStory, &first).await.unwrap();
        store.upsert(Website::YourStory, &second).await.unwrap();

        // A week-long horizon keeps the fresh archive entry.
        let removed = store.vacuum(168).await.unwrap();
        assert_eq!(removed, 0);

        // A zero-hour horizon removes it; live rows are untouched.
        let removed = store.vacuum(0).await.unwrap();
        assert_eq!(removed, 1);

        let live: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(live, 1);
    }

    #[tokio::test]
    async fn test_open_twice_preserves_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("articles.db");
        let path = path.to_str().unwrap();

        let store = ArticleStore::open(path).await.unwrap();
        store
            .upsert(Website::YourStory, &[record("https://yourstory.com/a", "A", 0.5)])
            .await
            .unwrap();
        drop(store);

        let reopened = ArticleStore::open(path).await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(reopened.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
