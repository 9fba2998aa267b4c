pub mod cascade;
pub mod cli;
pub mod extractors;
pub mod fetcher;
pub mod gateway;
pub mod ingest;
pub mod logging;

pub use cascade::ExtractionCascade;
pub use cli::{handle_command, IngestArgs, IngestCommands};
pub use extractors::{default_extractors, Extractor, FallbackExtractor, PrimaryExtractor};
pub use fetcher::{Fetcher, ReqwestClient};
pub use gateway::StoreGateway;
pub use ingest::IngestManager;
pub use logging::init_logging;

pub mod prelude {
    pub use super::{ExtractionCascade, Extractor, IngestManager, StoreGateway};
    pub use fetch_core::{Article, Error, Result};
}
