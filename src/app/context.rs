use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::app::error::{NewsreelError, Result};
use crate::config::Config;
use crate::connectivity::{ConnectivityMonitor, ManualMonitor, ProbeMonitor};
use crate::domain::FeedMode;
use crate::fetcher::{NewsApiClient, NewsSource};
use crate::saver::{ArticleSaver, HttpArticleSaver};
use crate::store::{ArticleCache, SqliteCache};
use crate::sync::{spawn_synchronizer, ArticleDetails, Effect, SyncHandle};

pub struct AppContext {
    pub config: Config,
    pub cache: Arc<SqliteCache>,
    pub source: Arc<dyn NewsSource>,
    pub saver: Option<Arc<dyn ArticleSaver>>,
    pub connectivity: Arc<dyn ConnectivityMonitor>,
}

impl AppContext {
    /// Wire up the real components. `offline` pins connectivity to
    /// disconnected instead of probing.
    pub async fn new(config: Config, db_path: Option<PathBuf>, offline: bool) -> Result<Self> {
        let db_path = match db_path {
            Some(p) => p,
            None => Self::default_db_path()?,
        };
        let cache = Arc::new(SqliteCache::new(&db_path)?);

        let connectivity: Arc<dyn ConnectivityMonitor> = if offline {
            Arc::new(ManualMonitor::new(false))
        } else {
            Arc::new(ProbeMonitor::start(&config.connectivity).await)
        };

        Self::assemble(config, cache, connectivity)
    }

    /// In-memory cache with caller-controlled connectivity.
    pub fn in_memory(config: Config, connectivity: Arc<dyn ConnectivityMonitor>) -> Result<Self> {
        let cache = Arc::new(SqliteCache::in_memory()?);
        Self::assemble(config, cache, connectivity)
    }

    fn assemble(
        config: Config,
        cache: Arc<SqliteCache>,
        connectivity: Arc<dyn ConnectivityMonitor>,
    ) -> Result<Self> {
        let source: Arc<dyn NewsSource> = Arc::new(NewsApiClient::new(&config.api)?);
        let saver = match &config.saver.endpoint {
            Some(endpoint) => {
                let timeout = Duration::from_secs(config.api.timeout_secs);
                Some(Arc::new(HttpArticleSaver::new(endpoint, timeout)?) as Arc<dyn ArticleSaver>)
            }
            None => None,
        };

        Ok(Self {
            config,
            cache,
            source,
            saver,
            connectivity,
        })
    }

    /// Start a feed synchronizer over this context's components.
    pub fn synchronizer(&self, mode: FeedMode) -> (SyncHandle, mpsc::UnboundedReceiver<Effect>) {
        spawn_synchronizer(
            mode,
            Arc::clone(&self.source),
            self.shared_cache(),
            Arc::clone(&self.connectivity),
        )
    }

    pub fn details(&self) -> ArticleDetails {
        ArticleDetails::new(
            self.shared_cache(),
            self.saver.clone(),
            Arc::clone(&self.connectivity),
        )
    }

    fn shared_cache(&self) -> Arc<dyn ArticleCache> {
        self.cache.clone()
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| NewsreelError::Config("Could not find data directory".into()))?;
        let newsreel_dir = data_dir.join("newsreel");
        std::fs::create_dir_all(&newsreel_dir)?;
        Ok(newsreel_dir.join("newsreel.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saver_disabled_without_endpoint() {
        let ctx =
            AppContext::in_memory(Config::default(), Arc::new(ManualMonitor::new(false))).unwrap();
        assert!(ctx.saver.is_none());
        assert!(!ctx.details().can_save_remotely());
    }

    #[test]
    fn test_saver_enabled_with_endpoint() {
        let mut config = Config::default();
        config.saver.endpoint = Some("http://127.0.0.1:9/save".into());
        let ctx = AppContext::in_memory(config, Arc::new(ManualMonitor::new(false))).unwrap();
        assert!(ctx.details().can_save_remotely());
    }

    #[tokio::test]
    async fn test_offline_context_never_probes() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = AppContext::new(Config::default(), Some(dir.path().join("test.db")), true)
            .await
            .unwrap();
        assert!(!ctx.connectivity.is_connected());

        let (handle, _effects) = ctx.synchronizer(FeedMode::TopHeadlines);
        let state = handle.settled().await.unwrap();
        assert!(state.is_offline);
        assert!(state.results.is_empty());
    }
}
