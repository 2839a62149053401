pub mod sqlite;

use crate::app::Result;
use crate::domain::{Article, ArticleSummary};

pub use sqlite::SqliteCache;

/// Durable keyed store of previously retrieved articles.
pub trait ArticleCache: Send + Sync {
    /// Clear the store and refill it in one transaction.
    fn replace_all(&self, articles: &[Article]) -> Result<()>;
    /// Insert or overwrite by id. Returns the number of rows written.
    fn upsert(&self, articles: &[Article]) -> Result<usize>;
    fn read_all(&self) -> Result<Vec<ArticleSummary>>;
    fn read_by_id(&self, id: &str) -> Result<Option<Article>>;
    fn clear(&self) -> Result<()>;
    fn count(&self) -> Result<usize>;
}
