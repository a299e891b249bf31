use chrono::Utc;
use feed_rs::parser;

use crate::storage::CandidateArticle;

/// Parse an RSS/Atom payload into candidate articles.
///
/// Parsing is lenient end to end. A payload that isn't recognizable as a
/// feed at all logs a warning and yields zero candidates, so the run ends as
/// a no-op rather than a failure. Per entry:
///
/// - no link: the entry is skipped (the link is the dedup identity)
/// - no title: "No Title"
/// - no summary: empty string
/// - no published time: the updated time, then the current time
pub fn parse(body: &str) -> Vec<CandidateArticle> {
    let feed = match parser::parse(body.as_bytes()) {
        Ok(feed) => feed,
        Err(e) => {
            tracing::warn!(error = %e, "Payload is not a recognizable feed, skipping");
            return Vec::new();
        }
    };

    feed.entries
        .into_iter()
        .filter_map(|entry| {
            let link = entry.links.first().map(|l| l.href.clone())?;
            let title = entry
                .title
                .map(|t| t.content)
                .unwrap_or_else(|| "No Title".to_string());
            let summary = entry.summary.map(|s| s.content).unwrap_or_default();
            let published = entry
                .published
                .or(entry.updated)
                .map(|dt| dt.timestamp())
                .unwrap_or_else(|| Utc::now().timestamp());

            Some(CandidateArticle {
                title,
                link,
                summary,
                published,
            })
        })
        .collect()
}
