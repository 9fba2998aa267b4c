use fetch_core::http::parse_absolute_url;
use fetch_core::{Article, Error, ExtractionResult, Result};
use scraper::Html;
use tracing::{debug, info, instrument};

use crate::extractors::{default_extractors, Extractor};
use crate::fetcher::Fetcher;

/// Fetcher followed by an ordered chain of extractors. The first extractor
/// that returns a result wins; later tiers are never consulted.
pub struct ExtractionCascade {
    fetcher: Fetcher,
    extractors: Vec<Box<dyn Extractor>>,
}

impl ExtractionCascade {
    pub fn new(fetcher: Fetcher) -> Self {
        Self::with_extractors(fetcher, default_extractors())
    }

    pub fn with_extractors(fetcher: Fetcher, extractors: Vec<Box<dyn Extractor>>) -> Self {
        Self { fetcher, extractors }
    }

    /// Runs the extractor chain over already-fetched HTML.
    pub fn extract_html(&self, raw_html: &str, url: &str) -> Result<ExtractionResult> {
        let document = Html::parse_document(raw_html);
        for extractor in &self.extractors {
            match extractor.try_extract(&document, url) {
                Some(result) => return Ok(result),
                None => debug!(%url, strategy = %extractor.strategy(), "Extractor declined"),
            }
        }
        Err(Error::ExtractionExhausted(format!("No extractor produced content for {}", url)))
    }

    /// Fetch, extract and normalize one URL. Fetch errors propagate as-is.
    #[instrument(level = "info", skip(self))]
    pub async fn run(&self, url: &str, source: &str) -> Result<Article> {
        let canonical = parse_absolute_url(url)?.to_string();
        let html = self.fetcher.fetch(&canonical).await?;

        let result = self.extract_html(&html, &canonical)?;
        info!(
            url = %canonical,
            strategy = %result.strategy_used,
            chars = result.content.chars().count(),
            "Extracted article"
        );
        Ok(result.into_article(&canonical, source))
    }
}
