use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fetch_core::http::parse_absolute_url;
use fetch_core::{Error, HttpClient, HttpRequest, HttpResponse, IngestConfig, Result};
use reqwest::{header, redirect, Client};
use tracing::{debug, instrument};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8";

/// Retrieves raw HTML for a URL. One GET per call, no retries.
#[derive(Clone)]
pub struct Fetcher {
    client: Arc<dyn HttpClient>,
    user_agent: String,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(client: Arc<dyn HttpClient>, config: &IngestConfig) -> Self {
        Self {
            client,
            user_agent: config.user_agent.clone(),
            timeout: config.fetch_timeout(),
        }
    }

    #[instrument(level = "info", skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let parsed = parse_absolute_url(url)?;

        let request = HttpRequest {
            url: parsed.to_string(),
            headers: vec![
                (header::USER_AGENT.as_str().to_string(), self.user_agent.clone()),
                (header::ACCEPT.as_str().to_string(), ACCEPT_HTML.to_string()),
            ],
            timeout: self.timeout,
            follow_redirects: true,
        };
        let response = self.client.get(request).await?;

        if !response.is_success() {
            return Err(Error::Fetch(format!("{} returned HTTP {}", parsed, response.status)));
        }
        if !is_html_like(response.content_type.as_deref()) {
            return Err(Error::Fetch(format!(
                "{} returned non-HTML content type {}",
                parsed,
                response.content_type.unwrap_or_default()
            )));
        }

        debug!(bytes = response.body.len(), status = response.status, "Fetched page");
        Ok(response.body)
    }
}

/// A missing content type is given the benefit of the doubt.
pub fn is_html_like(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return true;
    };
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    media_type.is_empty() || media_type == "application/xhtml+xml" || media_type.starts_with("text/")
}

/// reqwest-backed network boundary.
pub struct ReqwestClient {
    following: Client,
    direct: Client,
}

impl ReqwestClient {
    pub fn new(max_redirects: usize) -> Result<Self> {
        let build = |policy: redirect::Policy| {
            Client::builder()
                .redirect(policy)
                .build()
                .map_err(|e| Error::Fetch(format!("Failed to build HTTP client: {}", e)))
        };
        Ok(Self {
            following: build(redirect::Policy::limited(max_redirects))?,
            direct: build(redirect::Policy::none())?,
        })
    }

    pub fn from_config(config: &IngestConfig) -> Result<Self> {
        Self::new(config.max_redirects)
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse> {
        let client = if request.follow_redirects { &self.following } else { &self.direct };

        let mut builder = client.get(&request.url).timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Fetch(format!("Request to {} timed out", request.url))
            } else {
                Error::Fetch(format!("Request to {} failed: {}", request.url, e))
            }
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .await
            .map_err(|e| Error::Fetch(format!("Failed to read body from {}: {}", request.url, e)))?;

        Ok(HttpResponse { status, body, content_type })
    }
}
