use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::{Error, Result};

/// A single GET as issued by the fetcher.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
    pub follow_redirects: bool,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
    pub content_type: Option<String>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network boundary. Implementations report transport failures (connect,
/// timeout, body decoding) as [`Error::Fetch`]; status handling is left to
/// the caller.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Parses an absolute http(s) URL with a host.
pub fn parse_absolute_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("URL is empty".to_string()));
    }
    let url = Url::parse(trimmed)
        .map_err(|e| Error::InvalidInput(format!("Failed to parse URL {}: {}", trimmed, e)))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(Error::InvalidInput(format!("Unsupported URL scheme: {}", other)));
        }
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(Error::InvalidInput(format!("URL has no host: {}", trimmed)));
    }
    Ok(url)
}
