// Shared fixtures for the ingestion integration tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fetch_core::{ArticleStorage, HttpClient, HttpRequest, HttpResponse, IngestConfig, Result};
use fetch_extract::IngestManager;
use fetch_storage::MemoryStorage;

pub const ARTICLE_PAGE: &str = r#"
<html>
  <head>
    <title>Library extends hours | Valley Post</title>
    <script type="application/ld+json">
      {"@type":"NewsArticle","headline":"Library extends weekend hours","author":{"@type":"Person","name":"Priya Natarajan"},"datePublished":"2025-10-02T08:00:00Z"}
    </script>
  </head>
  <body>
    <nav class="menu"><p>News, Sport, Culture, Opinion, Weather, Traffic and Local Services</p></nav>
    <article class="story-content">
      <p>The central library will stay open until nine on Saturdays and Sundays starting next month, the council said.</p>
      <p>Staff numbers were raised after a funding review, and the reading rooms will be renovated over the winter.</p>
    </article>
    <div class="related"><p>Read more: council approves new bike lanes along the river road.</p></div>
  </body>
</html>
"#;

pub const THIN_PAGE: &str = "<title>Hi</title><p>A.</p><p>B.</p>";

/// Canned pages keyed by URL; anything unknown is a 404.
#[derive(Default)]
pub struct FakeWeb {
    pages: HashMap<String, (u16, String)>,
    requests: Mutex<Vec<String>>,
}

impl FakeWeb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), (200, body.to_string()));
        self
    }

    pub fn status(mut self, url: &str, status: u16) -> Self {
        self.pages.insert(url.to_string(), (status, String::new()));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for FakeWeb {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.url.clone());
        let (status, body) = self.pages.get(&request.url).cloned().unwrap_or((404, String::new()));
        Ok(HttpResponse {
            status,
            body,
            content_type: Some("text/html".to_string()),
        })
    }
}

pub fn manager(web: Arc<FakeWeb>, storage: &MemoryStorage) -> IngestManager {
    let storage: Arc<dyn ArticleStorage> = Arc::new(storage.clone());
    IngestManager::with_client(web, Some(storage), IngestConfig::default())
}
