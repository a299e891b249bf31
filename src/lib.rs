//! pressbox: a press-release aggregation service.
//!
//! Registered feed URLs are fetched, classified as RSS/Atom syndication or
//! as a site with a bespoke HTML scraper, parsed into normalized article
//! records, and merged into SQLite with store-wide link dedup. A small HTTP
//! API registers feeds and lists the newest articles.

pub mod api;
pub mod config;
pub mod ingest;
pub mod scheduler;
pub mod storage;
pub mod util;
