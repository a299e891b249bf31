//! HTTP API for feed registration and article listing.
//!
//! Four routes: a liveness check, feed registration, the recent-article
//! listing, and feed deletion. Registration answers immediately and hands
//! the actual fetch to a background ingestion task.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::ingest;
use crate::ingest::scrape::ScraperRegistry;
use crate::storage::{Article, Database, DatabaseError};
use crate::util::{validate_url, UrlValidationError};

/// How many articles the listing endpoint returns.
const RECENT_ARTICLES_LIMIT: i64 = 50;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub client: reqwest::Client,
    pub scrapers: Arc<ScraperRegistry>,
}

/// Errors surfaced to API clients as a JSON body with a matching status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error(transparent)]
    InvalidUrl(#[from] UrlValidationError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterFeed {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub feed_id: i64,
    pub message: String,
    pub url: String,
}

/// One article in the listing response. `published_at` serializes as an
/// RFC 3339 timestamp.
#[derive(Debug, Serialize)]
pub struct ArticleResponse {
    pub id: i64,
    pub feed_id: i64,
    pub title: String,
    pub link: String,
    pub summary: String,
    pub published_at: DateTime<Utc>,
}

impl From<Article> for ArticleResponse {
    fn from(article: Article) -> Self {
        Self {
            id: article.id,
            feed_id: article.feed_id,
            title: article.title,
            link: article.link,
            summary: article.summary,
            published_at: DateTime::from_timestamp(article.published, 0).unwrap_or_default(),
        }
    }
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Press Release Feed API is running" }))
}

async fn list_articles(
    State(state): State<AppState>,
) -> Result<Json<Vec<ArticleResponse>>, ApiError> {
    let articles = state.db.list_recent_articles(RECENT_ARTICLES_LIMIT).await?;
    Ok(Json(articles.into_iter().map(ArticleResponse::from).collect()))
}

/// Register a feed URL and trigger a background ingestion run for it.
///
/// Registration is idempotent: a URL that is already registered answers with
/// its existing id. Either way an ingestion run is triggered, so re-posting
/// a feed is the way to refresh it on demand.
async fn register_feed(
    State(state): State<AppState>,
    Json(body): Json<RegisterFeed>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let url = validate_url(&body.url)?.to_string();

    let (feed, message) = match state.db.find_feed_by_url(&url).await? {
        Some(existing) => (existing, "Feed already registered"),
        None => {
            let created = state.db.create_feed(&url).await?;
            tracing::info!(feed_id = created.id, url = %url, "Registered feed");
            (created, "Feed registered successfully")
        }
    };

    ingest::trigger_ingestion(
        state.db.clone(),
        state.client.clone(),
        state.scrapers.clone(),
        feed.id,
        feed.url.clone(),
    );

    Ok(Json(RegisterResponse {
        feed_id: feed.id,
        message: message.to_string(),
        url: feed.url,
    }))
}

/// Delete a feed and, through the cascade, every article it owns.
async fn delete_feed(
    State(state): State<AppState>,
    Path(feed_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.db.delete_feed(feed_id).await? {
        return Err(ApiError::NotFound("Feed not found"));
    }
    tracing::info!(feed_id, "Deleted feed");
    Ok(Json(json!({
        "message": format!("Feed {} deleted successfully", feed_id)
    })))
}

/// Build the application router around shared state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/feed", get(list_articles).post(register_feed))
        .route("/feed/{feed_id}", delete(delete_feed))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve the API until Ctrl+C or SIGTERM.
pub async fn serve(state: AppState, addr: &str) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "API listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
