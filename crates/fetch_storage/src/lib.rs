use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use fetch_core::{ArticleStorage, Error, Result};
use serde::{Deserialize, Serialize};

pub mod backends;

pub use backends::*;

pub const DEFAULT_TABLE: &str = "articles";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Memory,
    Supabase,
}

impl FromStr for StoreKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "supabase" => Ok(Self::Supabase),
            other => Err(Error::InvalidInput(format!("Unknown storage backend: {}", other))),
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Memory => f.write_str("memory"),
            StoreKind::Supabase => f.write_str("supabase"),
        }
    }
}

/// Connection settings for the article store, built once at startup and
/// handed to [`create_storage`].
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub kind: StoreKind,
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub table: String,
}

impl StoreConfig {
    pub fn memory() -> Self {
        Self {
            kind: StoreKind::Memory,
            url: None,
            api_key: None,
            table: DEFAULT_TABLE.to_string(),
        }
    }

    pub fn supabase(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            kind: StoreKind::Supabase,
            url: Some(url.into()),
            api_key: Some(api_key.into()),
            table: DEFAULT_TABLE.to_string(),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::memory()
    }
}

// Hand-written so the api key never reaches the logs.
impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("kind", &self.kind)
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("table", &self.table)
            .finish()
    }
}

pub trait StorageBackend: ArticleStorage + Sized {
    fn get_error_message() -> &'static str;
    fn from_config(config: &StoreConfig) -> Result<Self>;
}

/// Builds the configured backend. Misconfiguration surfaces as
/// [`Error::StoreUnavailable`].
pub fn create_storage(config: &StoreConfig) -> Result<Arc<dyn ArticleStorage>> {
    let storage: Arc<dyn ArticleStorage> = match config.kind {
        StoreKind::Memory => Arc::new(MemoryStorage::from_config(config)?),
        StoreKind::Supabase => Arc::new(SupabaseStorage::from_config(config).map_err(|e| {
            Error::StoreUnavailable(format!("{} ({})", SupabaseStorage::get_error_message(), e))
        })?),
    };
    tracing::info!(backend = storage.name(), "Storage backend created");
    Ok(storage)
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, StorageBackend, StoreConfig, StoreKind};
}
