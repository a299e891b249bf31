//! Feed ingestion pipeline.
//!
//! One ingestion run drives a single feed through fetch, classify, parse,
//! and merge. Runs are independent of each other: each has its own failure
//! boundary, and a run that fails leaves storage exactly as it found it.

pub mod classify;
pub mod fetcher;
pub mod merge;
pub mod scrape;
pub mod syndication;

use std::sync::Arc;

use thiserror::Error;

use crate::storage::{Database, DatabaseError};
use classify::Format;
use fetcher::FetchError;
use scrape::ScraperRegistry;

/// Errors that abort an ingestion run.
///
/// An unsupported payload format is deliberately not represented here: it
/// ends the run as a logged no-op, not a failure.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Storage(#[from] DatabaseError),
}

/// Run one ingestion cycle for a feed: fetch the URL, classify the payload,
/// parse it into candidates, and merge them into storage.
///
/// Returns the number of newly stored articles. A fetch or storage failure
/// aborts the run with storage untouched; there is no retry within a run,
/// the next cycle simply starts fresh.
pub async fn run_feed(
    db: &Database,
    client: &reqwest::Client,
    scrapers: &ScraperRegistry,
    feed_id: i64,
    url: &str,
) -> Result<usize, IngestError> {
    let payload = fetcher::fetch(client, url).await?;

    let candidates = match classify::classify(url, &payload.content_type, scrapers) {
        Format::Syndication => syndication::parse(&payload.body),
        Format::SiteScraper(name) => match scrapers.get(name) {
            Some(scraper) => scraper.scrape(url, &payload.body),
            None => {
                tracing::warn!(scraper = name, url = %url, "No scraper registered under that name");
                return Ok(0);
            }
        },
        Format::Unsupported => {
            tracing::warn!(
                url = %url,
                content_type = %payload.content_type,
                "Unsupported feed format, skipping"
            );
            return Ok(0);
        }
    };

    let inserted = merge::merge(db, feed_id, candidates).await?;
    tracing::info!(feed_id, url = %url, inserted, "Ingestion run complete");
    Ok(inserted)
}

/// Kick off an ingestion run in the background and return immediately.
///
/// Fire-and-forget: the caller gets no handle. Failures are logged with feed
/// context and never surface to whatever triggered the run.
pub fn trigger_ingestion(
    db: Database,
    client: reqwest::Client,
    scrapers: Arc<ScraperRegistry>,
    feed_id: i64,
    url: String,
) {
    tokio::spawn(async move {
        if let Err(e) = run_feed(&db, &client, &scrapers, feed_id, &url).await {
            tracing::error!(feed_id, url = %url, error = %e, "Feed ingestion failed");
        }
    });
}
