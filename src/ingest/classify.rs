use url::Url;

use super::scrape::ScraperRegistry;

/// Parsing strategy for a fetched payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// RSS/Atom XML, handled by the syndication parser.
    Syndication,
    /// Bespoke HTML, handled by the named registered site scraper.
    SiteScraper(&'static str),
    /// Nothing we know how to parse; the run ends as a logged no-op.
    Unsupported,
}

/// URL path suffixes that mark a syndication feed even when the server
/// declares no useful content type.
const SYNDICATION_SUFFIXES: [&str; 4] = [".xml", ".rdf", ".rss", ".atom"];

/// Decide which parser handles a payload. Rules apply in order:
///
/// 1. A content type mentioning xml/rss/atom wins outright.
/// 2. A feed-like URL path suffix also means syndication; servers routinely
///    mislabel feeds as `text/html` or send no content type at all.
/// 3. A host with a registered site scraper (exact domain or a subdomain)
///    goes to that scraper.
/// 4. Anything else is unsupported.
pub fn classify(url: &str, content_type: &str, scrapers: &ScraperRegistry) -> Format {
    let content_type = content_type.to_lowercase();
    if content_type.contains("xml")
        || content_type.contains("rss")
        || content_type.contains("atom")
    {
        return Format::Syndication;
    }

    let parsed = Url::parse(url).ok();

    // Suffix matching runs on the path so query strings don't defeat it; an
    // unparseable URL falls back to matching the raw string.
    let path = parsed
        .as_ref()
        .map(|u| u.path().to_lowercase())
        .unwrap_or_else(|| url.to_lowercase());
    if SYNDICATION_SUFFIXES
        .iter()
        .any(|suffix| path.ends_with(suffix))
    {
        return Format::Syndication;
    }

    if let Some(scraper) = parsed
        .as_ref()
        .and_then(|u| u.host_str())
        .and_then(|host| scrapers.find_by_host(host))
    {
        return Format::SiteScraper(scraper.name());
    }

    Format::Unsupported
}
