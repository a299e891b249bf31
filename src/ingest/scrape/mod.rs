//! Site-specific HTML scrapers.
//!
//! Some press-release sources publish no syndication feed at all, only an
//! HTML listing page. Each such site gets a [`SiteScraper`] implementation
//! registered here; the classifier routes payloads to it by host name.

mod prtimes;

pub use prtimes::PrTimes;

use crate::storage::CandidateArticle;

/// Extracts candidate articles from one site's HTML listing markup.
///
/// Implementations must swallow per-element failures: a malformed entry on
/// the page is skipped, never an error, so one broken listing item can't
/// blank out the whole page.
pub trait SiteScraper: Send + Sync {
    /// Short stable name, used in classification results and logs.
    fn name(&self) -> &'static str;

    /// Domain this scraper is responsible for. Subdomains match too.
    fn domain(&self) -> &'static str;

    /// Extract candidates from a fetched HTML document. `base_url` is the
    /// URL the document was fetched from, for resolving relative links.
    fn scrape(&self, base_url: &str, html: &str) -> Vec<CandidateArticle>;
}

/// Registered site scrapers, looked up by host during classification and by
/// name during parsing.
pub struct ScraperRegistry {
    scrapers: Vec<Box<dyn SiteScraper>>,
}

impl ScraperRegistry {
    /// An empty registry; scrapers must be added with [`register`].
    ///
    /// [`register`]: ScraperRegistry::register
    pub fn new() -> Self {
        Self {
            scrapers: Vec::new(),
        }
    }

    /// The registry with every built-in scraper already registered.
    pub fn with_builtin_sites() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(PrTimes));
        registry
    }

    pub fn register(&mut self, scraper: Box<dyn SiteScraper>) {
        self.scrapers.push(scraper);
    }

    /// Look up the scraper responsible for `host`: an exact domain match or
    /// any subdomain of a registered domain.
    pub fn find_by_host(&self, host: &str) -> Option<&dyn SiteScraper> {
        self.scrapers.iter().map(|s| s.as_ref()).find(|s| {
            host == s.domain() || host.ends_with(&format!(".{}", s.domain()))
        })
    }

    /// Look up a scraper by its registered name.
    pub fn get(&self, name: &str) -> Option<&dyn SiteScraper> {
        self.scrapers
            .iter()
            .map(|s| s.as_ref())
            .find(|s| s.name() == name)
    }
}

impl Default for ScraperRegistry {
    fn default() -> Self {
        Self::new()
    }
}
