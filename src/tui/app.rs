use ratatui::widgets::ListState;

use crate::domain::{Article, ArticleSummary, SyncState};
use crate::sync::Effect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    List,
    Detail,
}

pub const PAGE_SIZE: usize = 10;

pub struct TuiApp {
    pub view: View,
    pub feed: SyncState,
    pub index: usize,
    pub list_state: ListState,
    /// Full record of the selected article, read from the cache
    pub preview: Option<Article>,
    /// Last id read from the cache for the preview, hit or miss
    looked_up: Option<String>,
    pub detail_scroll: u16,
    pub should_quit: bool,
    pub status_message: Option<String>,
}

impl TuiApp {
    pub fn new(feed: SyncState) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            view: View::List,
            feed,
            index: 0,
            list_state,
            preview: None,
            looked_up: None,
            detail_scroll: 0,
            should_quit: false,
            status_message: None,
        }
    }

    /// Take a new snapshot from the synchronizer, keeping the selection in range.
    pub fn apply_state(&mut self, feed: SyncState) {
        self.feed = feed;
        self.looked_up = None;
        let last = self.feed.results.len().saturating_sub(1);
        if self.index > last {
            self.select(last);
        }
    }

    pub fn apply_effect(&mut self, effect: &Effect) {
        match effect {
            Effect::ScrollToTop => {
                self.view = View::List;
                self.select(0);
            }
            notice => self.set_status(notice.to_string()),
        }
    }

    pub fn selected(&self) -> Option<&ArticleSummary> {
        self.feed.results.get(self.index)
    }

    /// Id of the selected article when the preview shows something else
    /// and that id has not been looked up since the last snapshot.
    pub fn stale_preview(&self) -> Option<&str> {
        let selected = self.selected()?;
        if self.looked_up.as_deref() == Some(selected.id.as_str()) {
            return None;
        }
        match &self.preview {
            Some(article) if article.id == selected.id => None,
            _ => Some(selected.id.as_str()),
        }
    }

    /// Store the result of reading `id` for the preview. A miss clears the
    /// pane and is not retried until the selection or the results change.
    pub fn set_preview(&mut self, id: String, article: Option<Article>) {
        self.preview = article;
        self.looked_up = Some(id);
    }

    fn select(&mut self, index: usize) {
        if index != self.index {
            self.detail_scroll = 0;
        }
        self.index = index;
        self.list_state.select(Some(index));
    }

    pub fn move_up(&mut self) {
        match self.view {
            View::List => {
                if self.index > 0 {
                    self.select(self.index - 1);
                }
            }
            View::Detail => self.detail_scroll = self.detail_scroll.saturating_sub(1),
        }
    }

    /// Move down one row. Returns true when the selection is already on the
    /// last loaded article, meaning the caller should ask for more.
    pub fn move_down(&mut self) -> bool {
        match self.view {
            View::List => {
                let len = self.feed.results.len();
                if self.index + 1 < len {
                    self.select(self.index + 1);
                    false
                } else {
                    len > 0
                }
            }
            View::Detail => {
                self.detail_scroll = self.detail_scroll.saturating_add(1);
                false
            }
        }
    }

    pub fn next_page(&mut self) {
        match self.view {
            View::List => {
                let max_index = self.feed.results.len().saturating_sub(1);
                self.select((self.index + PAGE_SIZE).min(max_index));
            }
            View::Detail => {
                self.detail_scroll = self.detail_scroll.saturating_add(PAGE_SIZE as u16)
            }
        }
    }

    pub fn prev_page(&mut self) {
        match self.view {
            View::List => self.select(self.index.saturating_sub(PAGE_SIZE)),
            View::Detail => {
                self.detail_scroll = self.detail_scroll.saturating_sub(PAGE_SIZE as u16)
            }
        }
    }

    pub fn open_detail(&mut self, article: Article) {
        self.preview = Some(article);
        self.detail_scroll = 0;
        self.view = View::Detail;
    }

    pub fn back(&mut self) {
        self.view = View::List;
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}

impl Default for TuiApp {
    fn default() -> Self {
        Self::new(SyncState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(n: usize) -> SyncState {
        let mut state = SyncState::default();
        state.results = (0..n)
            .map(|i| Article::new(&format!("https://a.example.com/{}", i), "T", "").summary())
            .collect();
        state
    }

    #[test]
    fn test_move_down_past_end_asks_for_more() {
        let mut app = TuiApp::new(state_with(2));
        assert!(!app.move_down());
        assert_eq!(app.index, 1);
        assert!(app.move_down());
        assert_eq!(app.index, 1);
    }

    #[test]
    fn test_empty_list_does_not_ask_for_more() {
        let mut app = TuiApp::default();
        assert!(!app.move_down());
    }

    #[test]
    fn test_apply_state_clamps_selection() {
        let mut app = TuiApp::new(state_with(30));
        app.next_page();
        app.next_page();
        assert_eq!(app.index, 20);

        app.apply_state(state_with(5));
        assert_eq!(app.index, 4);
        assert_eq!(app.list_state.selected(), Some(4));
    }

    #[test]
    fn test_scroll_to_top_resets_selection() {
        let mut app = TuiApp::new(state_with(5));
        app.move_down();
        app.move_down();
        app.view = View::Detail;

        app.apply_effect(&Effect::ScrollToTop);
        assert_eq!(app.index, 0);
        assert_eq!(app.view, View::List);
        assert!(app.status_message.is_none());
    }

    #[test]
    fn test_notice_sets_status() {
        let mut app = TuiApp::default();
        app.apply_effect(&Effect::QuotaExceeded);
        assert_eq!(app.status_message.as_deref(), Some("Free limit reached"));
    }

    #[test]
    fn test_stale_preview_tracks_selection() {
        let state = state_with(2);
        let first = Article::new("https://a.example.com/0", "T", "");
        let mut app = TuiApp::new(state);

        assert_eq!(app.stale_preview(), Some(first.id.as_str()));
        app.preview = Some(first);
        assert_eq!(app.stale_preview(), None);

        app.move_down();
        assert!(app.stale_preview().is_some());
    }

    #[test]
    fn test_missing_preview_is_looked_up_once() {
        let mut app = TuiApp::new(state_with(2));
        let first = app.selected().unwrap().id.clone();

        assert_eq!(app.stale_preview(), Some(first.as_str()));
        app.set_preview(first.clone(), None);
        assert_eq!(app.stale_preview(), None);
        assert!(app.preview.is_none());

        // Another row is a new lookup
        app.move_down();
        let second = app.selected().unwrap().id.clone();
        assert_eq!(app.stale_preview(), Some(second.as_str()));
        app.set_preview(second, None);
        assert_eq!(app.stale_preview(), None);

        // Fresh results retry the miss
        app.apply_state(state_with(2));
        assert!(app.stale_preview().is_some());
    }

    #[test]
    fn test_detail_view_scrolls_instead_of_moving() {
        let mut app = TuiApp::new(state_with(3));
        app.open_detail(Article::new("https://a.example.com/0", "T", ""));
        app.move_down();
        app.move_down();
        assert_eq!(app.detail_scroll, 2);
        assert_eq!(app.index, 0);

        app.back();
        assert_eq!(app.view, View::List);
    }
}
