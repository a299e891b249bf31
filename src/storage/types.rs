use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// SQLite error strings that mean some other process holds the database:
/// SQLITE_BUSY (5), SQLITE_LOCKED (6), SQLITE_CANTOPEN (14).
const LOCK_MESSAGES: [&str; 5] = [
    "database is locked",
    "database table is locked",
    "sqlite_busy",
    "sqlite_locked",
    "unable to open database file",
];

/// Storage-layer errors, with a friendly message for the lock case so the
/// binary can explain itself instead of dumping an sqlx error.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Another pressbox instance seems to be running. Close it and try again.")]
    InstanceLocked,

    #[error("Database migration failed: {0}")]
    Migration(String),

    #[error("Database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Whether an error message describes a held database lock. sqlx does
    /// not expose the SQLite result code uniformly, so this sniffs the text.
    pub(crate) fn is_lock_message(msg: &str) -> bool {
        let msg = msg.to_lowercase();
        LOCK_MESSAGES.iter().any(|needle| msg.contains(needle))
    }

    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        if Self::is_lock_message(&err.to_string()) {
            DatabaseError::InstanceLocked
        } else {
            DatabaseError::Other(err)
        }
    }
}

// ============================================================================
// Data Structures
// ============================================================================

/// A registered feed source.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Feed {
    pub id: i64,
    pub url: String,
}

/// A stored article. `link` is unique across the whole store and serves as
/// the dedup key; `published` is Unix epoch seconds (UTC).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Article {
    pub id: i64,
    pub feed_id: i64,
    pub title: String,
    pub link: String,
    pub summary: String,
    pub published: i64,
}

/// An article produced by a parser or scraper, not yet checked against
/// storage. Every field is already resolved to a concrete value: parsers
/// apply the "No Title"/empty-summary placeholders and the wall-clock
/// timestamp fallback before handing records over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateArticle {
    pub title: String,
    pub link: String,
    pub summary: String,
    pub published: i64,
}
