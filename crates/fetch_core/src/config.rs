use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::DEFAULT_SOURCE;

/// Tunables for the fetch + extract + store pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
    pub max_redirects: usize,
    /// URLs past this many in one batch are dropped.
    pub batch_limit: usize,
    /// 1 keeps batches strictly sequential.
    pub batch_concurrency: usize,
    pub default_source: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 30,
            user_agent: concat!("fetch-ingest/", env!("CARGO_PKG_VERSION")).to_string(),
            max_redirects: 10,
            batch_limit: 10,
            batch_concurrency: 1,
            default_source: DEFAULT_SOURCE.to_string(),
        }
    }
}

impl IngestConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn with_batch_concurrency(mut self, concurrency: usize) -> Self {
        self.batch_concurrency = concurrency.max(1);
        self
    }
}
