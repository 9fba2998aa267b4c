use fetch_core::{ExtractionResult, Strategy};
use scraper::Html;

pub mod fallback;
pub mod jsonld;
pub mod primary;

pub use fallback::{extract_fallback, FallbackExtractor};
pub use primary::{extract_primary, PrimaryExtractor};

/// One tier of the extraction cascade.
///
/// Returning `None` is not a failure: it tells the cascade to try the next
/// tier. Implementations must be pure functions of their input.
pub trait Extractor: Send + Sync {
    fn strategy(&self) -> Strategy;

    fn try_extract(&self, document: &Html, url: &str) -> Option<ExtractionResult>;
}

/// The default chain: strict primary first, total fallback last.
pub fn default_extractors() -> Vec<Box<dyn Extractor>> {
    vec![Box::new(PrimaryExtractor::new()), Box::new(FallbackExtractor::new())]
}

/// Common DOM text helpers shared by the extractors
pub(crate) mod utils {
    use once_cell::sync::Lazy;
    use scraper::{ElementRef, Html, Node, Selector};

    pub static TITLE: Lazy<Selector> = Lazy::new(|| selector("title"));
    pub static H1: Lazy<Selector> = Lazy::new(|| selector("h1"));
    pub static PARAGRAPH: Lazy<Selector> = Lazy::new(|| selector("p"));

    const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "svg"];
    const BLOCK_TAGS: &[&str] = &[
        "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
        "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main",
        "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
    ];

    pub fn selector(css: &'static str) -> Selector {
        Selector::parse(css).expect("static selector must parse")
    }

    /// Collapses every whitespace run to a single space and trims.
    pub fn collapse_whitespace(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Visible text of an element: script/style bodies are dropped and block
    /// boundaries become spaces, so `<p>A.</p><p>B.</p>` reads `A. B.`.
    pub fn element_text(element: ElementRef) -> String {
        let mut out = String::new();
        push_text(element, &mut out);
        collapse_whitespace(&out)
    }

    fn push_text(element: ElementRef, out: &mut String) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) => {
                    let name = el.name();
                    if SKIPPED_TAGS.contains(&name) {
                        continue;
                    }
                    let block = BLOCK_TAGS.contains(&name);
                    if block {
                        out.push(' ');
                    }
                    if let Some(child) = ElementRef::wrap(child) {
                        push_text(child, out);
                    }
                    if block {
                        out.push(' ');
                    }
                }
                _ => {}
            }
        }
    }

    /// Text of the first element matching `selector`, if non-empty.
    pub fn first_text(document: &Html, selector: &Selector) -> Option<String> {
        document
            .select(selector)
            .next()
            .map(element_text)
            .filter(|text| !text.is_empty())
    }

    /// `content` attribute of the first matching `<meta>`, if non-empty.
    pub fn meta_content(document: &Html, selector: &Selector) -> Option<String> {
        document
            .select(selector)
            .filter_map(|el| el.value().attr("content"))
            .map(collapse_whitespace)
            .find(|value| !value.is_empty())
    }

    /// Class and id attributes joined, lowercased, for hint matching.
    pub fn class_and_id(element: ElementRef) -> String {
        let el = element.value();
        format!("{} {}", el.attr("class").unwrap_or_default(), el.attr("id").unwrap_or_default())
            .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::utils;
    use super::*;

    #[test]
    fn test_element_text_skips_scripts() {
        let document = Html::parse_document(
            r#"<div id="x"><p>First <b>bold</b> line.</p><script>var x = 1;</script><p>Second.</p></div>"#,
        );
        let div = document.select(&utils::selector("#x")).next().unwrap();
        assert_eq!(utils::element_text(div), "First bold line. Second.");
    }

    #[test]
    fn test_first_text() {
        let html = r#"
            <div class="title">  Test
                Title </div>
            <div class="content">Test Content</div>
        "#;
        let document = Html::parse_document(html);

        assert_eq!(
            utils::first_text(&document, &utils::selector(".title")).as_deref(),
            Some("Test Title")
        );
        assert!(utils::first_text(&document, &utils::selector(".invalid")).is_none());
    }

    #[test]
    fn test_meta_content_skips_blank_values() {
        let document = Html::parse_document(
            r#"<meta name="author" content="  "><meta name="author" content="Jane Roe">"#,
        );
        let author = utils::meta_content(&document, &utils::selector("meta[name='author']"));
        assert_eq!(author.as_deref(), Some("Jane Roe"));
    }

    #[test]
    fn test_default_chain_order() {
        let strategies = default_extractors().iter().map(|e| e.strategy()).collect::<Vec<_>>();
        assert_eq!(strategies, vec![Strategy::Primary, Strategy::Fallback]);
    }
}
