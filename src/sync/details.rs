use std::sync::Arc;

use tracing::{info, warn};

use crate::app::{NewsreelError, Result};
use crate::connectivity::ConnectivityMonitor;
use crate::domain::Article;
use crate::saver::ArticleSaver;
use crate::store::ArticleCache;

/// Detail view support: full-record lookups and the single-article save path.
///
/// Works straight against the cache and never touches [`SyncState`](crate::domain::SyncState).
pub struct ArticleDetails {
    cache: Arc<dyn ArticleCache>,
    saver: Option<Arc<dyn ArticleSaver>>,
    connectivity: Arc<dyn ConnectivityMonitor>,
}

impl ArticleDetails {
    pub fn new(
        cache: Arc<dyn ArticleCache>,
        saver: Option<Arc<dyn ArticleSaver>>,
        connectivity: Arc<dyn ConnectivityMonitor>,
    ) -> Self {
        Self {
            cache,
            saver,
            connectivity,
        }
    }

    pub fn open(&self, id: &str) -> Result<Article> {
        self.cache
            .read_by_id(id)?
            .ok_or_else(|| NewsreelError::NotFound(id.to_string()))
    }

    /// Store the article locally, then push it upstream.
    ///
    /// Returns `Ok(false)` when there is no save endpoint or the remote
    /// declined. The local copy is kept either way.
    pub async fn save(&self, article: &Article) -> Result<bool> {
        self.cache.upsert(std::slice::from_ref(article))?;

        let Some(saver) = &self.saver else {
            info!("No save endpoint configured, kept {} locally", article.id);
            return Ok(false);
        };

        if !self.connectivity.is_connected() {
            return Err(NewsreelError::Transient("offline".into()));
        }

        let saved = saver.save_article(article).await?;
        if !saved {
            warn!("Remote declined to save {}", article.id);
        }
        Ok(saved)
    }

    pub fn is_offline(&self) -> bool {
        !self.connectivity.is_connected()
    }

    pub fn can_save_remotely(&self) -> bool {
        self.saver.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::app::ErrorKind;
    use crate::connectivity::ManualMonitor;
    use crate::store::SqliteCache;

    struct RecordingSaver {
        saved: Mutex<Vec<String>>,
        accept: bool,
    }

    #[async_trait]
    impl ArticleSaver for RecordingSaver {
        async fn save_article(&self, article: &Article) -> Result<bool> {
            self.saved.lock().unwrap().push(article.url.clone());
            Ok(self.accept)
        }
    }

    fn article() -> Article {
        let mut article = Article::new(
            "https://news.example.com/story",
            "Story",
            "2024-03-01T10:00:00Z",
        );
        article.content = Some("Full text".into());
        article
    }

    fn fixture(
        saver: Option<Arc<dyn ArticleSaver>>,
        online: bool,
    ) -> (ArticleDetails, Arc<SqliteCache>) {
        let cache = Arc::new(SqliteCache::in_memory().unwrap());
        let details = ArticleDetails::new(
            cache.clone(),
            saver,
            Arc::new(ManualMonitor::new(online)),
        );
        (details, cache)
    }

    #[test]
    fn test_open_missing_is_not_found() {
        let (details, _) = fixture(None, true);
        let err = details.open("nope").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_open_returns_full_record() {
        let (details, cache) = fixture(None, true);
        let article = article();
        cache.upsert(&[article.clone()]).unwrap();

        assert_eq!(details.open(&article.id).unwrap(), article);
    }

    #[tokio::test]
    async fn test_save_upserts_and_sends() {
        let saver = Arc::new(RecordingSaver {
            saved: Mutex::new(Vec::new()),
            accept: true,
        });
        let (details, cache) = fixture(Some(saver.clone() as Arc<dyn ArticleSaver>), true);
        let article = article();

        assert!(details.save(&article).await.unwrap());
        assert_eq!(cache.count().unwrap(), 1);
        assert_eq!(*saver.saved.lock().unwrap(), vec![article.url.clone()]);
    }

    #[tokio::test]
    async fn test_save_without_endpoint_keeps_local_copy() {
        let (details, cache) = fixture(None, true);
        assert!(!details.can_save_remotely());
        assert!(!details.save(&article()).await.unwrap());
        assert_eq!(cache.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_save_offline_fails_but_keeps_local_copy() {
        let saver = Arc::new(RecordingSaver {
            saved: Mutex::new(Vec::new()),
            accept: true,
        });
        let (details, cache) = fixture(Some(saver.clone() as Arc<dyn ArticleSaver>), false);

        assert!(details.is_offline());
        let err = details.save(&article()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transient);
        assert_eq!(cache.count().unwrap(), 1);
        assert!(saver.saved.lock().unwrap().is_empty());
    }
}
