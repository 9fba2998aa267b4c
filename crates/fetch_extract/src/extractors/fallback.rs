use fetch_core::{ExtractionResult, Strategy};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use super::utils::{element_text, first_text, selector, H1, PARAGRAPH, TITLE};
use super::Extractor;

pub const FALLBACK_TITLE: &str = "Untitled Article";
pub const MAX_PARAGRAPHS: usize = 10;

// One selector list so matches come back in document order.
static CLASSED_CONTAINER: Lazy<Selector> = Lazy::new(|| selector("article[class], main[class], div[class]"));

const CONTENT_WORDS: &[&str] = &["content", "contents", "article", "articles", "post", "posts"];
const CHROME_WORDS: &[&str] = &["nav", "menu", "footer", "sidebar", "comments", "header"];

/// True when a class token names the content itself: `post-body` and
/// `entry-content` qualify, `postal-address` and `content-nav` do not.
fn is_article_like(element: ElementRef) -> bool {
    let class = element.value().attr("class").unwrap_or_default().to_lowercase();
    let tokens = class
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>();
    tokens.iter().any(|t| CONTENT_WORDS.contains(t) || t.starts_with("article"))
        && !tokens.iter().any(|t| CHROME_WORDS.contains(t))
}

/// Last-resort heuristic tier. Never declines, never reports author or date.
#[derive(Debug, Clone, Default)]
pub struct FallbackExtractor;

impl FallbackExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, document: &Html) -> ExtractionResult {
        let title = first_text(document, &TITLE)
            .or_else(|| first_text(document, &H1))
            .unwrap_or_else(|| FALLBACK_TITLE.to_string());

        let content = document
            .select(&CLASSED_CONTAINER)
            .filter(|el| is_article_like(*el))
            .map(element_text)
            .find(|text| !text.is_empty())
            .unwrap_or_else(|| {
                document
                    .select(&PARAGRAPH)
                    .take(MAX_PARAGRAPHS)
                    .map(element_text)
                    .filter(|text| !text.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            });

        ExtractionResult::new(title, content, Strategy::Fallback)
    }
}

impl Extractor for FallbackExtractor {
    fn strategy(&self) -> Strategy {
        Strategy::Fallback
    }

    fn try_extract(&self, document: &Html, _url: &str) -> Option<ExtractionResult> {
        Some(self.extract(document))
    }
}

/// Fallback tier over raw HTML. Total: any string, however broken, yields
/// a result.
pub fn extract_fallback(raw_html: &str) -> ExtractionResult {
    let document = Html::parse_document(raw_html);
    FallbackExtractor::new().extract(&document)
}
