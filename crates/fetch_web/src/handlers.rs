use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fetch_core::{Article, BatchResult, Error, SaveOutcome};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::AppState;

pub const DEFAULT_LIST_LIMIT: usize = 20;
pub const MAX_LIST_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    pub url: String,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub urls: Vec<String>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ArticleList {
    pub articles: Vec<Article>,
    pub total: usize,
}

/// Maps the error taxonomy onto HTTP statuses.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::Fetch(_) => StatusCode::BAD_GATEWAY,
            Error::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(kind = self.0.kind(), error = %self.0, "Request failed");
        }
        let body = json!({ "error": self.0.kind(), "detail": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "service": "fetch-ingest",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn extract_article(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UrlRequest>,
) -> Result<Json<Article>, ApiError> {
    let article = state.manager.extract(&request.url, request.source.as_deref()).await?;
    Ok(Json(article))
}

pub async fn create_article(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UrlRequest>,
) -> Result<Json<SaveOutcome>, ApiError> {
    let outcome = state.manager.ingest(&request.url, request.source.as_deref()).await?;
    Ok(Json(outcome))
}

pub async fn create_batch(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchResult>, ApiError> {
    let batch = state.manager.run_batch(&request.urls, request.source.as_deref()).await?;
    Ok(Json(batch))
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ArticleList>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT);
    let articles = state.manager.list_recent(limit).await?;
    Ok(Json(ArticleList { total: articles.len(), articles }))
}
