//! Periodic background refresh of every registered feed.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::ingest;
use crate::ingest::scrape::ScraperRegistry;
use crate::storage::Database;

/// Upper bound on simultaneous feed refreshes within one cycle.
const MAX_CONCURRENT_REFRESHES: usize = 10;

/// Drive the refresh loop forever.
///
/// An interval of 0 disables periodic refresh and returns immediately; feeds
/// are then only ingested when (re-)registered through the API.
pub async fn run(
    db: Database,
    client: reqwest::Client,
    scrapers: Arc<ScraperRegistry>,
    interval_minutes: u64,
) {
    if interval_minutes == 0 {
        tracing::info!("Periodic refresh disabled");
        return;
    }

    let interval = Duration::from_secs(interval_minutes * 60);
    tracing::info!(minutes = interval_minutes, "Periodic refresh enabled");

    loop {
        tokio::time::sleep(interval).await;
        refresh_all(&db, &client, &scrapers).await;
    }
}

/// Run one ingestion cycle over every registered feed with bounded
/// concurrency. Per-feed failures are logged and never stop the cycle.
pub async fn refresh_all(db: &Database, client: &reqwest::Client, scrapers: &ScraperRegistry) {
    let feeds = match db.list_feeds().await {
        Ok(feeds) => feeds,
        Err(e) => {
            tracing::error!(error = %e, "Failed to list feeds for refresh");
            return;
        }
    };
    if feeds.is_empty() {
        return;
    }

    let total = feeds.len();
    let results: Vec<usize> = stream::iter(feeds)
        .map(|feed| async move {
            match ingest::run_feed(db, client, scrapers, feed.id, &feed.url).await {
                Ok(inserted) => inserted,
                Err(e) => {
                    tracing::warn!(feed_id = feed.id, url = %feed.url, error = %e, "Refresh failed");
                    0
                }
            }
        })
        .buffer_unordered(MAX_CONCURRENT_REFRESHES)
        .collect()
        .await;

    let inserted: usize = results.into_iter().sum();
    tracing::info!(feeds = total, inserted, "Refresh cycle complete");
}
