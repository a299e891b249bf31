use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::str::FromStr;
use std::time::Duration;

use super::types::DatabaseError;

// ============================================================================
// Database
// ============================================================================

#[derive(Clone)]
pub struct Database {
    pub(crate) pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the SQLite file at `path` and bring its
    /// schema up to date.
    ///
    /// Lock contention at open or migration time maps to
    /// [`DatabaseError::InstanceLocked`] so callers can print something
    /// actionable instead of an sqlx error chain.
    pub async fn open(path: &str) -> Result<Self, DatabaseError> {
        let url = format!("sqlite:{}?mode=rwc", path);

        // busy_timeout=5000: SQLite waits up to 5 seconds for locks to release
        // before returning SQLITE_BUSY, which absorbs transient contention from
        // concurrent ingestion runs. foreign_keys must hold on every pooled
        // connection or ON DELETE CASCADE silently stops working, so both are
        // set through the connect options rather than one-off queries.
        let options = SqliteConnectOptions::from_str(&url)
            .map_err(DatabaseError::from_sqlx)?
            .foreign_keys(true)
            .pragma("busy_timeout", "5000");
        // SQLite is single-writer; 5 connections covers the API handlers plus
        // a few concurrent ingestion runs.
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(DatabaseError::from_sqlx)?;
        let db = Self { pool };
        db.migrate().await.map_err(|e| {
            // A held lock can also surface mid-migration.
            if DatabaseError::is_lock_message(&e.to_string()) {
                DatabaseError::InstanceLocked
            } else {
                DatabaseError::Migration(e.to_string())
            }
        })?;
        Ok(db)
    }

    /// Create the schema inside a single transaction.
    ///
    /// Every statement uses `IF NOT EXISTS`, so re-running against an
    /// existing file is a no-op, and a failure mid-way rolls the whole
    /// migration back instead of leaving half a schema.
    async fn migrate(&self) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS feeds (
                id INTEGER PRIMARY KEY,
                url TEXT NOT NULL UNIQUE
            )
        "#,
        )
        .execute(&mut *tx)
        .await?;

        // link is UNIQUE across the whole store, not per feed: the same URL
        // reachable from two feeds must still be stored once.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS articles (
                id INTEGER PRIMARY KEY,
                feed_id INTEGER NOT NULL REFERENCES feeds(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                link TEXT NOT NULL UNIQUE,
                summary TEXT NOT NULL DEFAULT '',
                published INTEGER NOT NULL
            )
        "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_articles_feed ON articles(feed_id)")
            .execute(&mut *tx)
            .await?;

        // Matches the listing order (published DESC, id DESC) exactly.
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_articles_published ON articles(published DESC, id DESC)",
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }
}
