use std::sync::Arc;

use fetch_core::{
    Article, ArticleStorage, BatchOutcome, BatchResult, HttpClient, IngestConfig, Result,
    SaveOutcome,
};
use fetch_storage::{create_storage, StoreConfig};
use futures::stream::{self, StreamExt};
use tracing::{info, instrument, warn};

use crate::cascade::ExtractionCascade;
use crate::fetcher::{Fetcher, ReqwestClient};
use crate::gateway::StoreGateway;

/// Entry point for single-URL and batch ingestion.
pub struct IngestManager {
    cascade: Arc<ExtractionCascade>,
    gateway: Arc<StoreGateway>,
    config: IngestConfig,
}

impl IngestManager {
    pub fn new(cascade: ExtractionCascade, gateway: StoreGateway, config: IngestConfig) -> Self {
        Self {
            cascade: Arc::new(cascade),
            gateway: Arc::new(gateway),
            config,
        }
    }

    /// Wires the real HTTP client and the configured store. A store that
    /// fails to build leaves the manager usable for extraction only.
    pub fn from_configs(config: IngestConfig, store: Option<&StoreConfig>) -> Result<Self> {
        let client: Arc<dyn HttpClient> = Arc::new(ReqwestClient::from_config(&config)?);
        let storage = match store {
            Some(store) => match create_storage(store) {
                Ok(storage) => Some(storage),
                Err(e) => {
                    warn!(error = %e, "Article store unavailable, continuing without it");
                    None
                }
            },
            None => None,
        };
        Ok(Self::with_client(client, storage, config))
    }

    pub fn with_client(
        client: Arc<dyn HttpClient>,
        storage: Option<Arc<dyn ArticleStorage>>,
        config: IngestConfig,
    ) -> Self {
        let cascade = ExtractionCascade::new(Fetcher::new(client, &config));
        Self::new(cascade, StoreGateway::from_option(storage), config)
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn gateway(&self) -> &StoreGateway {
        &self.gateway
    }

    fn source_or_default<'a>(&'a self, source: Option<&'a str>) -> &'a str {
        source
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(self.config.default_source.as_str())
    }

    /// Fetch and extract without storing.
    pub async fn extract(&self, url: &str, source: Option<&str>) -> Result<Article> {
        self.cascade.run(url, self.source_or_default(source)).await
    }

    /// Fetch, extract and store one URL.
    #[instrument(level = "info", skip(self))]
    pub async fn ingest(&self, url: &str, source: Option<&str>) -> Result<SaveOutcome> {
        // No point fetching what cannot be stored.
        self.gateway.ensure_available()?;
        let article = self.extract(url, source).await?;
        self.gateway.save(article).await
    }

    /// Ingests up to `batch_limit` URLs. Each URL succeeds or fails on its
    /// own; results come back in submission order.
    #[instrument(level = "info", skip(self, urls), fields(submitted = urls.len()))]
    pub async fn run_batch(&self, urls: &[String], source: Option<&str>) -> Result<BatchResult> {
        self.gateway.ensure_available()?;

        let limit = self.config.batch_limit;
        let truncated = urls.len() > limit;
        if truncated {
            warn!(submitted = urls.len(), limit, "Batch over limit, extra URLs dropped");
        }

        let results = stream::iter(urls.iter().take(limit).cloned())
            .map(|url: String| async move {
                match self.ingest(&url, source).await {
                    Ok(outcome) => BatchOutcome::saved(&url, &outcome),
                    Err(e) => {
                        warn!(%url, error = %e, "Batch entry failed");
                        BatchOutcome::failed(&url, &e)
                    }
                }
            })
            .buffered(self.config.batch_concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        let batch = BatchResult { results, submitted: urls.len(), truncated };
        info!(
            processed = batch.processed(),
            succeeded = batch.succeeded(),
            failed = batch.failed(),
            "Batch finished"
        );
        Ok(batch)
    }

    pub async fn list_recent(&self, limit: usize) -> Result<Vec<Article>> {
        self.gateway.list_recent(limit).await
    }
}
