use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::Value;

use super::utils::{collapse_whitespace, selector};

static LD_JSON: Lazy<Selector> = Lazy::new(|| selector("script[type='application/ld+json']"));

/// Article metadata found in JSON-LD blocks. First non-empty value wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonLdMetadata {
    pub headline: Option<String>,
    pub authors: Vec<String>,
    pub date_published: Option<String>,
}

impl JsonLdMetadata {
    pub fn author(&self) -> Option<String> {
        if self.authors.is_empty() {
            None
        } else {
            Some(self.authors.join(", "))
        }
    }
}

pub fn extract_metadata(document: &Html) -> JsonLdMetadata {
    let mut metadata = JsonLdMetadata::default();

    for script in document.select(&LD_JSON) {
        let raw = script.text().collect::<String>();
        let Ok(json) = serde_json::from_str::<Value>(raw.trim()) else {
            continue;
        };
        for node in candidate_nodes(&json) {
            merge_node(&mut metadata, node);
        }
    }

    metadata
}

/// Top-level objects, arrays of objects, and `@graph` members.
fn candidate_nodes(json: &Value) -> Vec<&Value> {
    let mut nodes = Vec::new();
    let roots: Vec<&Value> = match json {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    for root in roots {
        if let Some(graph) = root.get("@graph").and_then(Value::as_array) {
            nodes.extend(graph.iter());
        }
        nodes.push(root);
    }
    nodes
}

fn merge_node(metadata: &mut JsonLdMetadata, node: &Value) {
    if !node.is_object() {
        return;
    }

    if metadata.headline.is_none() {
        metadata.headline = non_empty_str(node.get("headline"));
    }
    if metadata.date_published.is_none() {
        metadata.date_published = non_empty_str(node.get("datePublished"));
    }
    if metadata.authors.is_empty() {
        if let Some(author) = node.get("author") {
            metadata.authors = author_names(author);
        }
    }
}

fn author_names(author: &Value) -> Vec<String> {
    let mut names = Vec::new();
    match author {
        Value::Array(arr) => {
            for author_obj in arr {
                names.extend(author_names(author_obj));
            }
        }
        Value::Object(obj) => {
            if let Some(name) = non_empty_str(obj.get("name")) {
                names.push(name);
            }
        }
        Value::String(s) => {
            let name = collapse_whitespace(s);
            if !name.is_empty() {
                names.push(name);
            }
        }
        _ => {}
    }
    names
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(collapse_whitespace)
        .filter(|s| !s.is_empty())
}
