use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;

/// Identity header presented to remote sources. Some press-release sites
/// serve different markup (or nothing at all) to unknown agents.
const USER_AGENT: &str = "Mozilla/5.0";

/// Hard bound on one fetch, covering connect through body completion.
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Cap on one response body (10 MB). No real feed or listing page comes
/// close, so anything larger is garbage or abuse.
const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Errors that can occur while fetching a remote feed.
///
/// Any of these is terminal for the ingestion run that hit it; the run is
/// retried only when the caller schedules a new one.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure: connection refused, DNS, TLS, broken stream.
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The server answered outside the 2xx range.
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// No complete response within `FETCH_TIMEOUT`.
    #[error("Request timed out")]
    Timeout,
    /// The body exceeded `MAX_BODY_SIZE`, declared or streamed.
    #[error("Response too large")]
    ResponseTooLarge,
}

/// A fetched feed payload: the body decoded as text plus the content type the
/// server declared (empty string when the header is absent). The content type
/// feeds format classification; the body feeds whichever parser wins.
#[derive(Debug)]
pub struct FetchedPayload {
    pub body: String,
    pub content_type: String,
}

/// Build the shared HTTP client used for all feed fetches.
///
/// Redirects are followed (press-release URLs are frequently redirected
/// through tracking hosts) and every request carries the fixed identity
/// header. The builder-level timeout bounds the full request, body included.
pub fn build_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .timeout(FETCH_TIMEOUT)
        .build()
}

/// Fetch one feed URL.
///
/// # Errors
///
/// - [`FetchError::Timeout`] - no response within 15 seconds
/// - [`FetchError::HttpStatus`] - non-2xx response
/// - [`FetchError::Network`] - connection, DNS, or TLS failure
/// - [`FetchError::ResponseTooLarge`] - body exceeded 10MB
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
) -> Result<FetchedPayload, FetchError> {
    let response = tokio::time::timeout(FETCH_TIMEOUT, client.get(url).send())
        .await
        .map_err(|_| FetchError::Timeout)?
        .map_err(FetchError::Network)?;

    if !response.status().is_success() {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let bytes = read_limited_bytes(response, MAX_BODY_SIZE).await?;
    let body = String::from_utf8_lossy(&bytes).into_owned();

    Ok(FetchedPayload { body, content_type })
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Reject outright when the server declares an oversize body.
    if response.content_length().is_some_and(|len| len as usize > limit) {
        return Err(FetchError::ResponseTooLarge);
    }

    // Content-Length can be absent or wrong, so the cap also holds while
    // the body streams in.
    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
