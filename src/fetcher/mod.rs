pub mod newsapi;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::{Article, FeedMode};

pub use newsapi::NewsApiClient;

/// A paginated remote listing of articles.
///
/// Implementations classify failures as [`NewsreelError::QuotaExceeded`]
/// when the server wants paging to stop, and as a transient error otherwise.
/// They never retry.
///
/// [`NewsreelError::QuotaExceeded`]: crate::app::NewsreelError::QuotaExceeded
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Fetch one page (1-based). Returned articles carry their ids.
    async fn fetch_page(&self, page: u32, mode: FeedMode) -> Result<Vec<Article>>;
}
