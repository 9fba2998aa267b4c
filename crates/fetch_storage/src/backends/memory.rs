use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use fetch_core::{Article, ArticleStorage, Error, Result};
use tokio::sync::RwLock;

use crate::{StorageBackend, StoreConfig};

/// Articles in insertion order plus a URL index into them.
#[derive(Debug, Default)]
pub struct MemoryStore {
    articles: Vec<Article>,
    by_url: HashMap<String, usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn find_by_url(&self, url: &str) -> Option<&Article> {
        self.by_url.get(url).map(|&i| &self.articles[i])
    }

    pub fn insert(&mut self, article: Article) -> Result<Article> {
        if self.by_url.contains_key(&article.url) {
            return Err(Error::Duplicate(article.url));
        }
        self.by_url.insert(article.url.clone(), self.articles.len());
        self.articles.push(article.clone());
        Ok(article)
    }

    pub fn list_recent(&self, limit: usize) -> Vec<Article> {
        let mut articles = self.articles.iter().rev().cloned().collect::<Vec<_>>();
        // Stable sort keeps newest-inserted first among equal dates.
        articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        articles.into_iter().take(limit).collect()
    }
}

/// In-process store for tests and local runs. Cloning shares the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}

impl StorageBackend for MemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    fn from_config(_config: &StoreConfig) -> Result<Self> {
        Ok(Self::new())
    }
}

#[async_trait]
impl ArticleStorage for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<Article>> {
        let store = self.store.read().await;
        Ok(store.find_by_url(url).cloned())
    }

    async fn insert(&self, article: Article) -> Result<Article> {
        let mut store = self.store.write().await;
        store.insert(article)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Article>> {
        let store = self.store.read().await;
        Ok(store.list_recent(limit))
    }
}
