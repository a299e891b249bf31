use sqlx::QueryBuilder;

use super::schema::Database;
use super::types::{Article, CandidateArticle, DatabaseError};

// ============================================================================
// Limits
// ============================================================================

/// Hard cap on rows any listing query returns, whatever the caller asks for.
const MAX_ARTICLES: i64 = 2000;

/// Batch size for multi-row inserts. 5 columns * 50 rows stays well under
/// SQLite's 999 bind-parameter limit.
const BATCH_SIZE: usize = 50;

impl Database {
    // ========================================================================
    // Article Operations
    // ========================================================================

    /// Look up an article by its link URL, the store-wide dedup key.
    pub async fn find_article_by_link(
        &self,
        link: &str,
    ) -> Result<Option<Article>, DatabaseError> {
        let article = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, feed_id, title, link, summary, published
            FROM articles
            WHERE link = ?
        "#,
        )
        .bind(link)
        .fetch_optional(&self.pool)
        .await?;
        Ok(article)
    }

    /// Insert candidate articles for a feed in one transaction, returning the
    /// number of rows actually inserted.
    ///
    /// `ON CONFLICT(link) DO NOTHING` is the dedup authority: candidates whose
    /// link already exists (stored earlier, written by a concurrent run, or
    /// duplicated within this batch) are silently dropped rather than treated
    /// as errors. Inserted rows are counted per chunk via `changes()` instead
    /// of before/after table scans.
    pub async fn insert_articles(
        &self,
        feed_id: i64,
        articles: &[CandidateArticle],
    ) -> Result<usize, DatabaseError> {
        if articles.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut total_inserted: usize = 0;

        for chunk in articles.chunks(BATCH_SIZE) {
            let mut builder: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new(
                "INSERT INTO articles (feed_id, title, link, summary, published) ",
            );

            builder.push_values(chunk, |mut b, article| {
                b.push_bind(feed_id)
                    .push_bind(&article.title)
                    .push_bind(&article.link)
                    .push_bind(&article.summary)
                    .push_bind(article.published);
            });

            builder.push(" ON CONFLICT(link) DO NOTHING");

            builder.build().execute(&mut *tx).await?;

            let changes: (i64,) = sqlx::query_as("SELECT changes()")
                .fetch_one(&mut *tx)
                .await?;
            total_inserted += changes.0 as usize;
        }

        tx.commit().await?;
        Ok(total_inserted)
    }

    /// The most recent articles across all feeds, newest first.
    ///
    /// Ordered by published time descending with id descending as the
    /// tie-breaker, so same-timestamp articles list latest-inserted first.
    pub async fn list_recent_articles(&self, limit: i64) -> Result<Vec<Article>, DatabaseError> {
        let limit = limit.min(MAX_ARTICLES);
        let articles = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, feed_id, title, link, summary, published
            FROM articles
            ORDER BY published DESC, id DESC
            LIMIT ?
        "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::{CandidateArticle, Database};

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    fn candidate(link: &str, published: i64) -> CandidateArticle {
        CandidateArticle {
            title: format!("Article {}", link),
            link: link.to_string(),
            summary: "Test summary".to_string(),
            published,
        }
    }

    #[tokio::test]
    async fn test_insert_articles_counts_new_rows() {
        let db = test_db().await;
        let feed = db.create_feed("https://example.com/rss").await.unwrap();

        let inserted = db
            .insert_articles(
                feed.id,
                &[
                    candidate("https://example.com/a", 1704067200),
                    candidate("https://example.com/b", 1704067300),
                ],
            )
            .await
            .unwrap();
        assert_eq!(inserted, 2);
    }

    #[tokio::test]
    async fn test_insert_articles_empty_is_noop() {
        let db = test_db().await;
        let feed = db.create_feed("https://example.com/rss").await.unwrap();
        assert_eq!(db.insert_articles(feed.id, &[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_link_within_batch_inserted_once() {
        let db = test_db().await;
        let feed = db.create_feed("https://example.com/rss").await.unwrap();

        let inserted = db
            .insert_articles(
                feed.id,
                &[
                    candidate("https://example.com/a", 1704067200),
                    candidate("https://example.com/a", 1704067200),
                ],
            )
            .await
            .unwrap();
        assert_eq!(inserted, 1);
    }

    #[tokio::test]
    async fn test_duplicate_link_across_runs_ignored() {
        let db = test_db().await;
        let feed = db.create_feed("https://example.com/rss").await.unwrap();

        let batch = [candidate("https://example.com/a", 1704067200)];
        assert_eq!(db.insert_articles(feed.id, &batch).await.unwrap(), 1);
        assert_eq!(db.insert_articles(feed.id, &batch).await.unwrap(), 0);

        let stored = db.list_recent_articles(10).await.unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_link_across_feeds_keeps_first_owner() {
        let db = test_db().await;
        let feed_a = db.create_feed("https://a.example.com/rss").await.unwrap();
        let feed_b = db.create_feed("https://b.example.com/rss").await.unwrap();

        let batch = [candidate("https://example.com/shared", 1704067200)];
        assert_eq!(db.insert_articles(feed_a.id, &batch).await.unwrap(), 1);
        assert_eq!(db.insert_articles(feed_b.id, &batch).await.unwrap(), 0);

        let article = db
            .find_article_by_link("https://example.com/shared")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(article.feed_id, feed_a.id);
    }

    #[tokio::test]
    async fn test_insert_articles_chunking() {
        let db = test_db().await;
        let feed = db.create_feed("https://example.com/rss").await.unwrap();

        let batch: Vec<CandidateArticle> = (0..120)
            .map(|i| candidate(&format!("https://example.com/{}", i), 1704067200 + i))
            .collect();
        assert_eq!(db.insert_articles(feed.id, &batch).await.unwrap(), 120);
    }

    #[tokio::test]
    async fn test_find_article_by_link_roundtrip() {
        let db = test_db().await;
        let feed = db.create_feed("https://example.com/rss").await.unwrap();
        db.insert_articles(
            feed.id,
            &[CandidateArticle {
                title: "Launch".to_string(),
                link: "https://example.com/launch".to_string(),
                summary: "Big news".to_string(),
                published: 1704067200,
            }],
        )
        .await
        .unwrap();

        let article = db
            .find_article_by_link("https://example.com/launch")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(article.title, "Launch");
        assert_eq!(article.summary, "Big news");
        assert_eq!(article.published, 1704067200);

        assert!(db
            .find_article_by_link("https://example.com/missing")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_recent_articles_ordering() {
        let db = test_db().await;
        let feed = db.create_feed("https://example.com/rss").await.unwrap();

        // Two distinct timestamps plus a tie: the tie breaks by id descending.
        db.insert_articles(
            feed.id,
            &[
                candidate("https://example.com/old", 1704000000),
                candidate("https://example.com/tie-first", 1704067200),
                candidate("https://example.com/tie-second", 1704067200),
                candidate("https://example.com/new", 1704100000),
            ],
        )
        .await
        .unwrap();

        let links: Vec<String> = db
            .list_recent_articles(10)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.link)
            .collect();
        assert_eq!(
            links,
            vec![
                "https://example.com/new",
                "https://example.com/tie-second",
                "https://example.com/tie-first",
                "https://example.com/old"
            ]
        );
    }

    #[tokio::test]
    async fn test_list_recent_articles_respects_limit() {
        let db = test_db().await;
        let feed = db.create_feed("https://example.com/rss").await.unwrap();

        let batch: Vec<CandidateArticle> = (0..10)
            .map(|i| candidate(&format!("https://example.com/{}", i), 1704067200 + i))
            .collect();
        db.insert_articles(feed.id, &batch).await.unwrap();

        let articles = db.list_recent_articles(3).await.unwrap();
        assert_eq!(articles.len(), 3);
    }

    #[tokio::test]
    async fn test_delete_feed_cascades_to_articles() {
        let db = test_db().await;
        let feed = db.create_feed("https://example.com/rss").await.unwrap();
        db.insert_articles(
            feed.id,
            &[
                candidate("https://example.com/a", 1704067200),
                candidate("https://example.com/b", 1704067300),
            ],
        )
        .await
        .unwrap();

        assert!(db.delete_feed(feed.id).await.unwrap());

        assert!(db.list_recent_articles(10).await.unwrap().is_empty());
        assert!(db
            .find_article_by_link("https://example.com/a")
            .await
            .unwrap()
            .is_none());
    }
}
