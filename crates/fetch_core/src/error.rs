use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Every extractor in the chain declined. The fallback tier is total, so
    /// seeing this means a cascade was built without one.
    #[error("Extraction exhausted: {0}")]
    ExtractionExhausted(String),

    /// A store rejected an insert because the URL is already present.
    #[error("Duplicate article: {0}")]
    Duplicate(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// Stable tag reported in batch outcomes and API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "invalid_input",
            Error::Fetch(_) => "fetch_error",
            Error::StoreUnavailable(_) => "store_unavailable",
            Error::ExtractionExhausted(_) => "extraction_exhausted",
            Error::Duplicate(_) => "duplicate",
            Error::Storage(_) => "storage_error",
            Error::Serialization(_) => "serialization_error",
            Error::External(_) => "external_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(Error::InvalidInput("x".into()).kind(), "invalid_input");
        assert_eq!(Error::Fetch("x".into()).kind(), "fetch_error");
        assert_eq!(Error::StoreUnavailable("x".into()).kind(), "store_unavailable");
        assert_eq!(Error::ExtractionExhausted("x".into()).kind(), "extraction_exhausted");
    }

    #[test]
    fn test_display_keeps_detail() {
        let err = Error::Fetch("upstream returned 404".to_string());
        assert_eq!(err.to_string(), "Fetch error: upstream returned 404");
    }
}
