use super::schema::Database;
use super::types::{DatabaseError, Feed};

impl Database {
    // ========================================================================
    // Feed Operations
    // ========================================================================

    /// Look up a feed by its source URL.
    pub async fn find_feed_by_url(&self, url: &str) -> Result<Option<Feed>, DatabaseError> {
        let feed = sqlx::query_as::<_, Feed>("SELECT id, url FROM feeds WHERE url = ?")
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(feed)
    }

    /// Create a feed for `url`, or return the existing one.
    ///
    /// The no-op `DO UPDATE` makes `RETURNING` yield the existing row on
    /// conflict, so two concurrent registrations of the same URL converge on
    /// a single feed id.
    pub async fn create_feed(&self, url: &str) -> Result<Feed, DatabaseError> {
        let feed = sqlx::query_as::<_, Feed>(
            r#"
            INSERT INTO feeds (url) VALUES (?)
            ON CONFLICT(url) DO UPDATE SET url = excluded.url
            RETURNING id, url
        "#,
        )
        .bind(url)
        .fetch_one(&self.pool)
        .await?;
        Ok(feed)
    }

    /// Delete a feed, cascading to its articles.
    ///
    /// Returns whether the feed existed. Deleting an unknown id is a no-op.
    pub async fn delete_feed(&self, feed_id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM feeds WHERE id = ?")
            .bind(feed_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All registered feeds, oldest first. Used by the refresh scheduler.
    pub async fn list_feeds(&self) -> Result<Vec<Feed>, DatabaseError> {
        let feeds = sqlx::query_as::<_, Feed>("SELECT id, url FROM feeds ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(feeds)
    }
}
