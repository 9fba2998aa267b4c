pub mod config;
pub mod error;
pub mod http;
pub mod storage;
pub mod types;

pub use config::IngestConfig;
pub use error::{Error, Result};
pub use http::{HttpClient, HttpRequest, HttpResponse};
pub use storage::ArticleStorage;
pub use types::{
    summarize, Article, BatchOutcome, BatchResult, ExtractionResult, SaveOutcome, SaveStatus,
    Strategy,
};
