use serde::Serialize;

use crate::domain::{ArticleSummary, FeedMode};

/// Snapshot of the feed synchronizer, published after every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncState {
    pub current_page: u32,
    pub mode: FeedMode,
    pub can_load_more: bool,
    pub is_fetching: bool,
    pub is_refreshing: bool,
    pub is_offline: bool,
    pub results: Vec<ArticleSummary>,
}

impl SyncState {
    pub fn new(mode: FeedMode) -> Self {
        Self {
            current_page: 1,
            mode,
            can_load_more: true,
            is_fetching: false,
            is_refreshing: false,
            is_offline: false,
            results: Vec::new(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.is_fetching || self.is_refreshing
    }
}

impl Default for SyncState {
    fn default() -> Self {
        Self::new(FeedMode::default())
    }
}
