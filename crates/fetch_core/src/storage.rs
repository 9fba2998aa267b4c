use async_trait::async_trait;
use crate::types::Article;
use crate::Result;

/// Key-value-by-URL article store.
#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Human readable backend name, used in logs.
    fn name(&self) -> &str;

    /// Look up a stored article by exact URL match.
    async fn find_by_url(&self, url: &str) -> Result<Option<Article>>;

    /// Insert a new article and return the record as stored.
    async fn insert(&self, article: Article) -> Result<Article>;

    /// Most recently published articles first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<Article>>;
}
