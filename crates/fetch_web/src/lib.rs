use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/extract", post(handlers::extract_article))
        .route("/api/articles", get(handlers::list_articles).post(handlers::create_article))
        .route("/api/articles/batch", post(handlers::create_batch))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

pub async fn serve(state: AppState, bind: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind).await?;
    info!("🌐 Listening on {}", listener.local_addr()?);
    axum::serve(listener, create_app(state)).await
}

pub mod prelude {
    pub use fetch_core::{Article, Error, Result};
    pub use crate::{create_app, serve, AppState};
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use fetch_core::{ArticleStorage, HttpClient, HttpRequest, HttpResponse, IngestConfig};
    use fetch_extract::IngestManager;
    use fetch_storage::MemoryStorage;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct OnePage;

    #[async_trait]
    impl HttpClient for OnePage {
        async fn get(&self, request: HttpRequest) -> fetch_core::Result<HttpResponse> {
            if request.url.contains("broken") {
                return Ok(HttpResponse { status: 500, body: String::new(), content_type: None });
            }
            Ok(HttpResponse {
                status: 200,
                body: "<title>Hi</title><p>A.</p><p>B.</p>".to_string(),
                content_type: Some("text/html".to_string()),
            })
        }
    }

    fn app(with_store: bool) -> Router {
        let storage = with_store.then(|| Arc::new(MemoryStorage::new()) as Arc<dyn ArticleStorage>);
        let manager = IngestManager::with_client(Arc::new(OnePage), storage, IngestConfig::default());
        create_app(AppState::new(manager))
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(true), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_extract_returns_article() {
        let (status, body) = send(
            app(false),
            "POST",
            "/api/extract",
            Some(json!({ "url": "https://site.test/hi" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Hi");
        assert_eq!(body["content"], "A. B.");
        assert_eq!(body["source"], "web");
    }

    #[tokio::test]
    async fn test_create_article_then_duplicate() {
        let app = app(true);
        let request = json!({ "url": "https://site.test/hi", "source": "wire" });

        let (status, first) = send(app.clone(), "POST", "/api/articles", Some(request.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["status"], "stored");

        let (_, second) = send(app.clone(), "POST", "/api/articles", Some(request)).await;
        assert_eq!(second["status"], "duplicate");

        let (_, list) = send(app, "GET", "/api/articles?limit=5", None).await;
        assert_eq!(list["total"], 1);
        assert_eq!(list["articles"][0]["source"], "wire");
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let (status, body) = send(
            app(true),
            "POST",
            "/api/articles",
            Some(json!({ "url": "ftp://site.test/file" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_input");

        let (status, body) = send(
            app(true),
            "POST",
            "/api/extract",
            Some(json!({ "url": "https://site.test/broken" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "fetch_error");

        let (status, body) = send(
            app(false),
            "POST",
            "/api/articles",
            Some(json!({ "url": "https://site.test/hi" })),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "store_unavailable");
    }

    #[tokio::test]
    async fn test_batch_endpoint() {
        let urls = (1..=12).map(|i| format!("https://site.test/{}", i)).collect::<Vec<_>>();
        let (status, body) = send(
            app(true),
            "POST",
            "/api/articles/batch",
            Some(json!({ "urls": urls })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"].as_array().map(Vec::len), Some(10));
        assert_eq!(body["submitted"], 12);
        assert_eq!(body["truncated"], true);
    }
}
