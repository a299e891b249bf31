use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use scraper::{Html, Selector};
use url::Url;

use super::SiteScraper;
use crate::storage::CandidateArticle;

/// Canonical origin for resolving release links. Listing pages can be
/// reached under several hosts, but article links must land here.
const ORIGIN: &str = "https://prtimes.jp";

/// Scraper for PR TIMES press-release listing pages.
///
/// The listing markup carries one `a.list-article__link` anchor per release,
/// with the headline in an `h3` descendant and the publication time in a
/// `time` element's `datetime` attribute.
pub struct PrTimes;

impl SiteScraper for PrTimes {
    fn name(&self) -> &'static str {
        "prtimes"
    }

    fn domain(&self) -> &'static str {
        "prtimes.jp"
    }

    fn scrape(&self, _base_url: &str, html: &str) -> Vec<CandidateArticle> {
        // Static selectors; parse failures here are programmer errors.
        let anchor = Selector::parse("a.list-article__link").unwrap();
        let heading = Selector::parse("h3").unwrap();
        let time = Selector::parse("time").unwrap();

        let document = Html::parse_document(html);
        let mut candidates = Vec::new();

        for element in document.select(&anchor) {
            let href = match element.value().attr("href") {
                Some(href) => href,
                None => continue,
            };
            let link = match Url::parse(ORIGIN).and_then(|origin| origin.join(href)) {
                Ok(resolved) => resolved.to_string(),
                Err(e) => {
                    tracing::debug!(href = %href, error = %e, "Skipping unresolvable release link");
                    continue;
                }
            };

            let title = element
                .select(&heading)
                .next()
                .map(|h| h.text().collect::<String>().trim().to_string())
                .unwrap_or_else(|| "No Title".to_string());

            let published = element
                .select(&time)
                .next()
                .and_then(|t| t.value().attr("datetime"))
                .and_then(parse_datetime)
                .unwrap_or_else(|| Utc::now().timestamp());

            candidates.push(CandidateArticle {
                title,
                link,
                // Listing pages carry no body text.
                summary: String::new(),
                published,
            });
        }

        candidates
    }
}

/// Parse an ISO-8601 `datetime` attribute into a Unix timestamp.
///
/// Accepts an explicit offset or trailing `Z`; values without a zone are
/// taken as UTC. Returns `None` on anything else so the caller can fall
/// back to the current time instead of dropping the element.
fn parse_datetime(value: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc().timestamp());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp())
}
