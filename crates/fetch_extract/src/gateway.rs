use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use fetch_core::{Article, ArticleStorage, Error, Result, SaveOutcome, SaveStatus};
use tokio::sync::Mutex as TokioMutex;
use tracing::{info, instrument, warn};

/// Dedup-by-URL front of the article store.
///
/// Saves for the same URL are serialized through a per-URL lock, so two
/// concurrent requests can never both observe "absent" and both insert.
/// Backends still report conflicts as [`Error::Duplicate`], which covers
/// writers outside this process.
pub struct StoreGateway {
    storage: Option<Arc<dyn ArticleStorage>>,
    locks: Mutex<HashMap<String, Arc<TokioMutex<()>>>>,
}

impl StoreGateway {
    pub fn new(storage: Arc<dyn ArticleStorage>) -> Self {
        Self::from_option(Some(storage))
    }

    /// A gateway with no store behind it. Every operation reports
    /// [`Error::StoreUnavailable`].
    pub fn unavailable() -> Self {
        Self::from_option(None)
    }

    pub fn from_option(storage: Option<Arc<dyn ArticleStorage>>) -> Self {
        Self { storage, locks: Mutex::new(HashMap::new()) }
    }

    pub fn is_available(&self) -> bool {
        self.storage.is_some()
    }

    pub fn backend_name(&self) -> Option<&str> {
        self.storage.as_deref().map(|s| s.name())
    }

    pub fn ensure_available(&self) -> Result<&Arc<dyn ArticleStorage>> {
        self.storage
            .as_ref()
            .ok_or_else(|| Error::StoreUnavailable("no article store is configured".to_string()))
    }

    /// Stores `article` unless its URL is already present. A duplicate
    /// returns the existing record untouched.
    #[instrument(level = "debug", skip(self, article), fields(url = %article.url))]
    pub async fn save(&self, article: Article) -> Result<SaveOutcome> {
        let storage = self.ensure_available()?.clone();
        let url = article.url.clone();

        let lock = self.lock_for(&url);
        let result = {
            let _guard = lock.lock().await;
            save_locked(storage.as_ref(), article).await
        };
        self.release(&url, lock);

        match &result {
            Ok(outcome) if outcome.is_duplicate() => info!(%url, "Duplicate article, skipped"),
            Ok(_) => info!(%url, backend = storage.name(), "Article stored"),
            Err(e) => warn!(%url, error = %e, "Failed to store article"),
        }
        result
    }

    pub async fn list_recent(&self, limit: usize) -> Result<Vec<Article>> {
        self.ensure_available()?
            .list_recent(limit)
            .await
            .map_err(unavailable)
    }

    pub async fn find_by_url(&self, url: &str) -> Result<Option<Article>> {
        self.ensure_available()?.find_by_url(url).await.map_err(unavailable)
    }

    fn lock_for(&self, url: &str) -> Arc<TokioMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(url.to_string()).or_default().clone()
    }

    // Drops the map entry once nobody else holds or waits on it.
    fn release(&self, url: &str, lock: Arc<TokioMutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        if Arc::strong_count(&lock) == 2 {
            locks.remove(url);
        }
    }

    #[cfg(test)]
    fn tracked_locks(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

async fn save_locked(storage: &dyn ArticleStorage, mut article: Article) -> Result<SaveOutcome> {
    if let Some(existing) = storage.find_by_url(&article.url).await.map_err(unavailable)? {
        return Ok(SaveOutcome { status: SaveStatus::Duplicate, article: existing });
    }

    if article.published_at.is_none() {
        article.published_at = Some(Utc::now());
    }

    match storage.insert(article).await {
        Ok(stored) => Ok(SaveOutcome { status: SaveStatus::Stored, article: stored }),
        Err(Error::Duplicate(url)) => {
            // Another writer got there first.
            let existing = storage
                .find_by_url(&url)
                .await
                .map_err(unavailable)?
                .ok_or_else(|| {
                    Error::StoreUnavailable(format!("store reported {} as duplicate but has no record", url))
                })?;
            Ok(SaveOutcome { status: SaveStatus::Duplicate, article: existing })
        }
        Err(e) => Err(unavailable(e)),
    }
}

fn unavailable(error: Error) -> Error {
    match error {
        Error::StoreUnavailable(_) => error,
        other => Error::StoreUnavailable(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use fetch_storage::MemoryStorage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn article(url: &str, title: &str) -> Article {
        Article {
            url: url.to_string(),
            title: title.to_string(),
            summary: "s".to_string(),
            content: "c".to_string(),
            source: "web".to_string(),
            author: None,
            published_at: None,
        }
    }

    #[tokio::test]
    async fn test_second_save_is_duplicate_and_keeps_first_record() {
        let storage = MemoryStorage::new();
        let gateway = StoreGateway::new(Arc::new(storage.clone()));

        let first = gateway.save(article("https://x.test/a", "First")).await.unwrap();
        assert_eq!(first.status, SaveStatus::Stored);
        assert!(first.article.published_at.is_some());

        let second = gateway.save(article("https://x.test/a", "Second")).await.unwrap();
        assert!(second.is_duplicate());
        assert_eq!(second.article, first.article);
        assert_eq!(storage.len().await, 1);
    }

    #[tokio::test]
    async fn test_extracted_date_is_kept() {
        let gateway = StoreGateway::new(Arc::new(MemoryStorage::new()));
        let date = "2024-03-01T10:00:00Z".parse().unwrap();
        let mut dated = article("https://x.test/dated", "Dated");
        dated.published_at = Some(date);

        let outcome = gateway.save(dated).await.unwrap();
        assert_eq!(outcome.article.published_at, Some(date));
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let gateway = StoreGateway::unavailable();
        assert!(!gateway.is_available());
        let err = gateway.save(article("https://x.test/a", "A")).await.unwrap_err();
        assert!(matches!(err, Error::StoreUnavailable(_)));
        assert!(matches!(gateway.list_recent(5).await, Err(Error::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_concurrent_saves_store_once() {
        let storage = MemoryStorage::new();
        let gateway = Arc::new(StoreGateway::new(Arc::new(storage.clone())));

        let handles = (0..8)
            .map(|i| {
                let gateway = gateway.clone();
                tokio::spawn(async move {
                    gateway.save(article("https://x.test/race", &format!("T{}", i))).await
                })
            })
            .collect::<Vec<_>>();

        let mut stored = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().status == SaveStatus::Stored {
                stored += 1;
            }
        }
        assert_eq!(stored, 1);
        assert_eq!(storage.len().await, 1);
        assert_eq!(gateway.tracked_locks(), 0);
    }

    /// Misses on lookup, then loses the insert race to an outside writer.
    struct RacingStorage {
        inner: MemoryStorage,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl ArticleStorage for RacingStorage {
        fn name(&self) -> &str {
            "racing"
        }

        async fn find_by_url(&self, url: &str) -> Result<Option<Article>> {
            if self.lookups.fetch_add(1, Ordering::SeqCst) == 0 {
                self.inner.insert(article(url, "Outside")).await?;
                return Ok(None);
            }
            self.inner.find_by_url(url).await
        }

        async fn insert(&self, article: Article) -> Result<Article> {
            self.inner.insert(article).await
        }

        async fn list_recent(&self, limit: usize) -> Result<Vec<Article>> {
            self.inner.list_recent(limit).await
        }
    }

    #[tokio::test]
    async fn test_insert_conflict_reports_duplicate() {
        let storage = RacingStorage { inner: MemoryStorage::new(), lookups: AtomicUsize::new(0) };
        let gateway = StoreGateway::new(Arc::new(storage));

        let outcome = gateway.save(article("https://x.test/r", "Mine")).await.unwrap();
        assert!(outcome.is_duplicate());
        assert_eq!(outcome.article.title, "Outside");
    }

    struct BrokenStorage;

    #[async_trait]
    impl ArticleStorage for BrokenStorage {
        fn name(&self) -> &str {
            "broken"
        }

        async fn find_by_url(&self, _url: &str) -> Result<Option<Article>> {
            Err(Error::Storage("connection refused".to_string()))
        }

        async fn insert(&self, _article: Article) -> Result<Article> {
            Err(Error::Storage("connection refused".to_string()))
        }

        async fn list_recent(&self, _limit: usize) -> Result<Vec<Article>> {
            Err(Error::Storage("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_backend_failure_is_store_unavailable() {
        let gateway = StoreGateway::new(Arc::new(BrokenStorage));
        let err = gateway.save(article("https://x.test/a", "A")).await.unwrap_err();
        assert!(matches!(err, Error::StoreUnavailable(_)));
        assert_eq!(gateway.tracked_locks(), 0);
    }
}
