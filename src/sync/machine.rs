use std::collections::HashSet;

use crate::app::{ErrorKind, NewsreelError};
use crate::domain::{ArticleSummary, FeedMode, SyncState};
use crate::sync::{Effect, Intent};

/// One load the machine has committed to. Carried through the fetch and
/// handed back to [`FeedSync::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub mode: FeedMode,
    pub is_refresh: bool,
    pub scroll_to_top: bool,
}

/// What the owner has to do after an intent.
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    Load(PageRequest),
    Notice(Effect),
    Ignored,
}

/// Result of a load as seen by the machine.
#[derive(Debug)]
pub enum Outcome {
    /// A page from the remote source, already written to the cache.
    Remote(Vec<ArticleSummary>),
    /// The full cache snapshot, used while offline.
    Cache(Vec<ArticleSummary>),
    Failed(NewsreelError),
}

/// Pagination and single-flight bookkeeping, free of any IO.
#[derive(Debug)]
pub struct FeedSync {
    state: SyncState,
}

impl FeedSync {
    pub fn new(mode: FeedMode) -> Self {
        Self {
            state: SyncState::new(mode),
        }
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn request(&mut self, intent: Intent) -> Step {
        if self.state.is_busy() {
            return Step::Ignored;
        }

        match intent {
            Intent::LoadPage { page, is_refresh } => self.begin(page.max(1), is_refresh, false),
            Intent::LoadNextPage => {
                if !self.state.can_load_more {
                    return Step::Notice(Effect::NoMoreResults);
                }
                self.begin(self.state.current_page + 1, false, false)
            }
            Intent::Refresh => self.begin(1, true, false),
            Intent::ToggleMode => {
                self.state.mode = self.state.mode.toggled();
                self.state.current_page = 1;
                self.state.can_load_more = true;
                self.state.results.clear();
                self.begin(1, true, true)
            }
        }
    }

    fn begin(&mut self, page: u32, is_refresh: bool, scroll_to_top: bool) -> Step {
        if is_refresh {
            self.state.is_refreshing = true;
        } else {
            self.state.is_fetching = true;
        }

        Step::Load(PageRequest {
            page,
            mode: self.state.mode,
            is_refresh,
            scroll_to_top,
        })
    }

    /// Apply the outcome of `request` and return the notices it produced.
    pub fn complete(&mut self, request: PageRequest, outcome: Outcome) -> Vec<Effect> {
        self.state.is_fetching = false;
        self.state.is_refreshing = false;

        let mut effects = Vec::new();
        match outcome {
            Outcome::Remote(page) => {
                self.state.can_load_more = !page.is_empty();
                if request.page == 1 {
                    self.state.results.clear();
                }
                merge_unique(&mut self.state.results, page);
                self.state.current_page = request.page;
            }
            Outcome::Cache(snapshot) => {
                self.state.results.clear();
                merge_unique(&mut self.state.results, snapshot);
                self.state.can_load_more = false;
                self.state.current_page = 1;
            }
            Outcome::Failed(err) => effects.push(match err.kind() {
                ErrorKind::QuotaExceeded => Effect::QuotaExceeded,
                ErrorKind::Cache => Effect::CacheFailure(err.to_string()),
                _ => Effect::LoadFailed(err.to_string()),
            }),
        }

        if request.scroll_to_top {
            effects.push(Effect::ScrollToTop);
        }
        effects
    }

    /// Record a connectivity transition. Returns whether anything changed.
    pub fn set_online(&mut self, online: bool) -> bool {
        let offline = !online;
        if self.state.is_offline == offline {
            return false;
        }
        self.state.is_offline = offline;
        true
    }
}

/// Append `incoming` in order, skipping ids already present. The first
/// occurrence keeps its position.
fn merge_unique(results: &mut Vec<ArticleSummary>, incoming: Vec<ArticleSummary>) {
    let mut seen: HashSet<String> = results.iter().map(|a| a.id.clone()).collect();
    for article in incoming {
        if seen.insert(article.id.clone()) {
            results.push(article);
        }
    }
}
