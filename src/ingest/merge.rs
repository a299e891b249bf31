use crate::storage::{CandidateArticle, Database, DatabaseError};

/// Merge candidate articles for a feed into storage, returning the number of
/// rows actually inserted.
///
/// Candidates whose link is already stored (under any feed) are filtered out
/// first; that pre-check keeps steady-state runs cheap but is only an
/// optimization. The UNIQUE constraint on `articles.link` is what guarantees
/// dedup when two runs race on the same link, and a constraint hit during
/// insert means "already stored", never an error.
pub async fn merge(
    db: &Database,
    feed_id: i64,
    candidates: Vec<CandidateArticle>,
) -> Result<usize, DatabaseError> {
    let mut fresh = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if db.find_article_by_link(&candidate.link).await?.is_none() {
            fresh.push(candidate);
        }
    }

    if fresh.is_empty() {
        return Ok(0);
    }

    db.insert_articles(feed_id, &fresh).await
}
