use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fetch_core::{Article, ArticleStorage, Error, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::{StorageBackend, StoreConfig};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Row shape of the `articles` table as exposed by PostgREST.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ArticleRow {
    url: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
}

impl From<Article> for ArticleRow {
    fn from(article: Article) -> Self {
        Self {
            url: article.url,
            title: Some(article.title),
            summary: Some(article.summary),
            content: Some(article.content),
            source: Some(article.source),
            author: article.author,
            published_at: article.published_at,
        }
    }
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Self {
            url: row.url,
            title: row.title.unwrap_or_default(),
            summary: row.summary.unwrap_or_default(),
            content: row.content.unwrap_or_default(),
            source: row.source.unwrap_or_else(|| fetch_core::types::DEFAULT_SOURCE.to_string()),
            author: row.author,
            published_at: row.published_at,
        }
    }
}

/// Article store backed by a Supabase project's REST (PostgREST) API.
pub struct SupabaseStorage {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl SupabaseStorage {
    pub fn new(base_url: &str, api_key: &str, table: &str) -> Result<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| Error::InvalidInput(format!("Invalid Supabase URL {}: {}", base_url, e)))?;
        // Without a trailing slash, join would replace the last path segment.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base
            .join(&format!("rest/v1/{}", table))
            .map_err(|e| Error::InvalidInput(format!("Invalid Supabase table {}: {}", table, e)))?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Storage(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.to_string(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.endpoint.clone())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn read_rows(response: reqwest::Response, action: &str) -> Result<Vec<ArticleRow>> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Storage(format!("Failed to {}: {} {}", action, status, body)));
        }
        response
            .json::<Vec<ArticleRow>>()
            .await
            .map_err(|e| Error::Storage(format!("Failed to decode rows while trying to {}: {}", action, e)))
    }
}

impl StorageBackend for SupabaseStorage {
    fn get_error_message() -> &'static str {
        "Supabase storage needs SUPABASE_URL and SUPABASE_KEY"
    }

    fn from_config(config: &StoreConfig) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| Error::StoreUnavailable("Supabase URL is not configured".to_string()))?;
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| Error::StoreUnavailable("Supabase API key is not configured".to_string()))?;
        Self::new(url, api_key, &config.table)
    }
}

#[async_trait]
impl ArticleStorage for SupabaseStorage {
    fn name(&self) -> &str {
        "supabase"
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<Article>> {
        debug!(%url, "Looking up article in Supabase");
        let response = self
            .request(reqwest::Method::GET)
            .query(&[("select", "*".to_string()), ("url", format!("eq.{}", url)), ("limit", "1".to_string())])
            .send()
            .await
            .map_err(|e| Error::Storage(format!("Failed to query article: {}", e)))?;

        let rows = Self::read_rows(response, "query article").await?;
        Ok(rows.into_iter().next().map(Article::from))
    }

    async fn insert(&self, article: Article) -> Result<Article> {
        let url = article.url.clone();
        debug!(%url, "Inserting article into Supabase");
        let response = self
            .request(reqwest::Method::POST)
            .header("Prefer", "return=representation")
            .json(&[ArticleRow::from(article)])
            .send()
            .await
            .map_err(|e| Error::Storage(format!("Failed to insert article: {}", e)))?;

        // Unique constraint on `url`.
        if response.status() == StatusCode::CONFLICT {
            return Err(Error::Duplicate(url));
        }

        let rows = Self::read_rows(response, "insert article").await?;
        rows.into_iter()
            .next()
            .map(Article::from)
            .ok_or_else(|| Error::Storage(format!("Insert of {} returned no row", url)))
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Article>> {
        let response = self
            .request(reqwest::Method::GET)
            .query(&[
                ("select", "*".to_string()),
                ("order", "published_at.desc".to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await
            .map_err(|e| Error::Storage(format!("Failed to list articles: {}", e)))?;

        let rows = Self::read_rows(response, "list articles").await?;
        Ok(rows.into_iter().map(Article::from).collect())
    }
}
