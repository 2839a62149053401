pub mod article;
pub mod mode;
pub mod state;

pub use article::{canonical_url, readable_timestamp, Article, ArticleSummary};
pub use mode::FeedMode;
pub use state::SyncState;
