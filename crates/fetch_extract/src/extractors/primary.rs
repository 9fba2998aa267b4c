//! Readability-style main-content extraction.
//!
//! Every paragraph long enough to look like prose scores its parent and,
//! at half weight, its grandparent. Containers whose class or id looks like
//! article body get a boost; anything inside navigation, comments, footers
//! and similar chrome is ignored. The best-scoring container becomes the
//! article body, provided it carries enough text.
//!
//! Author and publish date come only from structured metadata (JSON-LD,
//! meta tags, `<time datetime>` in the chosen container). Nothing here
//! reads the clock, so identical input always yields identical output.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use fetch_core::{ExtractionResult, Strategy};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::jsonld;
use super::utils::{class_and_id, collapse_whitespace, element_text, first_text, meta_content, selector, H1, PARAGRAPH, TITLE};
use super::Extractor;

/// Body text below this many chars is not trusted as an article.
pub const MIN_CONTENT_CHARS: usize = 140;
/// Paragraphs shorter than this do not vote for their container.
const MIN_PARAGRAPH_CHARS: usize = 25;

static POSITIVE_HINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"article|body|content|entry|main|post|story|text|blog").expect("static regex must compile")
});
// Hint words must start a class/id token, so `canvas` or `lead-story` stay clean.
static NEGATIVE_HINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:^|[\s_-])(?:comment|footer|nav|sidebar|menu|share|social|promo|related|header|banner|cookie|newsletter|advert)|(?:^|[\s_-])ads?(?:[\s_-]|$)",
    )
    .expect("static regex must compile")
});

static UNLIKELY_TAGS: &[&str] = &["nav", "footer", "aside", "header", "form", "menu"];

static OG_TITLE: Lazy<Selector> = Lazy::new(|| selector("meta[property='og:title'], meta[name='twitter:title']"));
static META_AUTHOR: Lazy<Selector> = Lazy::new(|| selector("meta[name='author'], meta[property='article:author']"));
static META_PUBLISHED: Lazy<Selector> = Lazy::new(|| {
    selector("meta[property='article:published_time'], meta[name='date'], meta[name='pubdate'], meta[name='publishdate']")
});
static TIME_DATETIME: Lazy<Selector> = Lazy::new(|| selector("time[datetime]"));

/// Structured extraction tuned for article-shaped pages.
#[derive(Debug, Clone, Default)]
pub struct PrimaryExtractor;

impl PrimaryExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for PrimaryExtractor {
    fn strategy(&self) -> Strategy {
        Strategy::Primary
    }

    fn try_extract(&self, document: &Html, _url: &str) -> Option<ExtractionResult> {
        let container = best_container(document)?;
        let content = container_paragraphs(container);
        if content.chars().count() < MIN_CONTENT_CHARS {
            return None;
        }

        let metadata = jsonld::extract_metadata(document);
        let title = metadata
            .headline
            .clone()
            .or_else(|| meta_content(document, &OG_TITLE))
            .or_else(|| container.select(&H1).next().map(element_text).filter(|t| !t.is_empty()))
            .or_else(|| first_text(document, &H1))
            .or_else(|| first_text(document, &TITLE))?;

        let author = metadata.author().or_else(|| {
            meta_content(document, &META_AUTHOR).filter(|a| !a.starts_with("http"))
        });
        let published_at = metadata
            .date_published
            .as_deref()
            .and_then(parse_published)
            .or_else(|| meta_content(document, &META_PUBLISHED).as_deref().and_then(parse_published))
            .or_else(|| {
                container
                    .select(&TIME_DATETIME)
                    .filter_map(|el| el.value().attr("datetime"))
                    .find_map(parse_published)
            });

        Some(
            ExtractionResult::new(title, content, Strategy::Primary)
                .with_author(author)
                .with_published_at(published_at),
        )
    }
}

/// Primary tier over raw HTML. `None` means "not confident", not an error.
pub fn extract_primary(raw_html: &str, url: &str) -> Option<ExtractionResult> {
    let document = Html::parse_document(raw_html);
    PrimaryExtractor::new().try_extract(&document, url)
}

fn is_unlikely(element: ElementRef) -> bool {
    UNLIKELY_TAGS.contains(&element.value().name()) || NEGATIVE_HINT.is_match(&class_and_id(element))
}

// Stops below `body`: page-level classes such as `has-sidebar` say nothing
// about the paragraph itself.
fn inside_unlikely(element: ElementRef) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .take_while(|el| !matches!(el.value().name(), "body" | "html"))
        .any(is_unlikely)
}

fn hint_weight(element: ElementRef) -> f64 {
    let mut weight = 1.0;
    let name = element.value().name();
    if name == "article" || name == "main" || element.value().attr("itemprop") == Some("articleBody") {
        weight += 0.25;
    }
    if POSITIVE_HINT.is_match(&class_and_id(element)) {
        weight += 0.25;
    }
    weight
}

fn paragraph_score(text: &str) -> f64 {
    let commas = text.matches(',').count() as f64;
    let length_bonus = (text.chars().count() / 100).min(3) as f64;
    1.0 + commas + length_bonus
}

/// Highest-scoring container in document order; ties keep the earlier one.
fn best_container(document: &Html) -> Option<ElementRef<'_>> {
    let mut scores: Vec<(ElementRef, f64)> = Vec::new();

    for paragraph in document.select(&PARAGRAPH) {
        if inside_unlikely(paragraph) {
            continue;
        }
        let text = element_text(paragraph);
        if text.chars().count() < MIN_PARAGRAPH_CHARS {
            continue;
        }
        let score = paragraph_score(&text);

        let parent = paragraph.parent().and_then(ElementRef::wrap);
        let grandparent = parent.and_then(|p| p.parent()).and_then(ElementRef::wrap);
        for (ancestor, share) in [(parent, 1.0), (grandparent, 0.5)] {
            let Some(ancestor) = ancestor else { continue };
            if matches!(ancestor.value().name(), "body" | "html") {
                continue;
            }
            match scores.iter_mut().find(|(el, _)| el.id() == ancestor.id()) {
                Some((_, total)) => *total += score * share,
                None => scores.push((ancestor, score * share)),
            }
        }
    }

    let mut best: Option<(ElementRef, f64)> = None;
    for (element, score) in scores {
        let weighted = score * hint_weight(element);
        if best.map_or(true, |(_, top)| weighted > top) {
            best = Some((element, weighted));
        }
    }
    best.map(|(element, _)| element)
}

fn container_paragraphs(container: ElementRef) -> String {
    container
        .select(&PARAGRAPH)
        .filter(|p| {
            !p.ancestors()
                .take_while(|node| node.id() != container.id())
                .filter_map(ElementRef::wrap)
                .any(is_unlikely)
        })
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// RFC 3339, `YYYY-MM-DDTHH:MM:SS±HHMM`, naive datetimes and bare dates
/// (taken as UTC).
pub fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let raw = collapse_whitespace(raw);
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
