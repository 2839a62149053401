//! The feed synchronizer.
//!
//! [`FeedSync`] holds the pagination state and decides what each intent
//! means. [`FeedSynchronizer`] is the actor that owns it: intents, fetch
//! completions and connectivity transitions are handled one at a time on a
//! single task. Only the remote fetch runs elsewhere, and a load-producing
//! intent that arrives while one is outstanding is dropped rather than
//! queued.

pub mod details;
pub mod machine;

pub use details::ArticleDetails;
pub use machine::{FeedSync, Outcome, PageRequest, Step};

use std::fmt;
use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::app::{NewsreelError, Result};
use crate::connectivity::{ConnectivityMonitor, ConnectivityStream};
use crate::domain::{Article, ArticleSummary, FeedMode, SyncState};
use crate::fetcher::NewsSource;
use crate::store::ArticleCache;

/// Requests a consumer can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    LoadPage { page: u32, is_refresh: bool },
    LoadNextPage,
    Refresh,
    ToggleMode,
}

/// One-shot notices for the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    NoMoreResults,
    QuotaExceeded,
    LoadFailed(String),
    CacheFailure(String),
    /// A mode switch finished loading; the list starts over.
    ScrollToTop,
}

impl Effect {
    /// Whether the consumer should show this to the user.
    pub fn is_notice(&self) -> bool {
        !matches!(self, Effect::ScrollToTop)
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::NoMoreResults => write!(f, "There are no more articles"),
            Effect::QuotaExceeded => write!(f, "Free limit reached"),
            Effect::LoadFailed(msg) => write!(f, "Couldn't load articles: {}", msg),
            Effect::CacheFailure(msg) => write!(f, "Local storage error: {}", msg),
            Effect::ScrollToTop => write!(f, "Back to top"),
        }
    }
}

/// Message type for the synchronizer actor
#[derive(Debug)]
pub enum SyncMessage {
    /// Handle an intent, acknowledging once it has been accepted or dropped
    Intent(Intent, oneshot::Sender<()>),
    /// Stop the actor; an outstanding fetch is discarded
    Shutdown,
}

type Completion = (PageRequest, Result<Vec<Article>>);

/// Handle to talk to a running synchronizer
#[derive(Clone)]
pub struct SyncHandle {
    tx: mpsc::Sender<SyncMessage>,
    state: watch::Receiver<SyncState>,
}

impl SyncHandle {
    /// Submit an intent and wait until the actor has handled it. A load it
    /// starts may still be running when this returns.
    pub async fn send(&self, intent: Intent) -> Result<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(SyncMessage::Intent(intent, ack_tx))
            .await
            .map_err(|_| NewsreelError::Stopped)?;
        ack_rx.await.map_err(|_| NewsreelError::Stopped)
    }

    /// Submit an intent and wait for the resulting load to settle.
    pub async fn dispatch(&self, intent: Intent) -> Result<SyncState> {
        self.send(intent).await?;
        self.settled().await
    }

    /// Wait until no load is in flight.
    pub async fn settled(&self) -> Result<SyncState> {
        let mut rx = self.state.clone();
        let state = rx
            .wait_for(|state| !state.is_busy())
            .await
            .map_err(|_| NewsreelError::Stopped)?;
        Ok(state.clone())
    }

    /// Live snapshot stream.
    pub fn state(&self) -> watch::Receiver<SyncState> {
        self.state.clone()
    }

    pub fn snapshot(&self) -> SyncState {
        self.state.borrow().clone()
    }

    /// Shutdown the synchronizer
    pub async fn shutdown(&self) {
        let _ = self.tx.send(SyncMessage::Shutdown).await;
    }
}

/// Actor owning one [`FeedSync`].
pub struct FeedSynchronizer {
    machine: FeedSync,
    source: Arc<dyn NewsSource>,
    cache: Arc<dyn ArticleCache>,
    connectivity: Arc<dyn ConnectivityMonitor>,
    rx: mpsc::Receiver<SyncMessage>,
    state_tx: watch::Sender<SyncState>,
    effects: mpsc::UnboundedSender<Effect>,
    done_tx: mpsc::UnboundedSender<Completion>,
    done_rx: mpsc::UnboundedReceiver<Completion>,
}

impl FeedSynchronizer {
    /// Create a synchronizer and the handle and effect receiver that go with it
    fn new(
        mode: FeedMode,
        source: Arc<dyn NewsSource>,
        cache: Arc<dyn ArticleCache>,
        connectivity: Arc<dyn ConnectivityMonitor>,
    ) -> (Self, SyncHandle, mpsc::UnboundedReceiver<Effect>) {
        let machine = FeedSync::new(mode);
        let (tx, rx) = mpsc::channel(32);
        let (state_tx, state_rx) = watch::channel(machine.state().clone());
        let (effects, effects_rx) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = mpsc::unbounded_channel();

        let synchronizer = Self {
            machine,
            source,
            cache,
            connectivity,
            rx,
            state_tx,
            effects,
            done_tx,
            done_rx,
        };
        let handle = SyncHandle {
            tx,
            state: state_rx,
        };
        (synchronizer, handle, effects_rx)
    }

    /// Seed connectivity and start the first page load.
    fn initialize(&mut self) {
        self.machine.set_online(self.connectivity.is_connected());
        self.handle_intent(Intent::LoadPage {
            page: 1,
            is_refresh: true,
        });
    }

    /// Run the actor loop
    async fn run(mut self, mut updates: Option<ConnectivityStream>) {
        info!("Feed synchronizer started ({})", self.machine.state().mode);

        loop {
            tokio::select! {
                msg = self.rx.recv() => match msg {
                    Some(SyncMessage::Intent(intent, ack)) => {
                        self.handle_intent(intent);
                        let _ = ack.send(());
                    }
                    Some(SyncMessage::Shutdown) | None => break,
                },
                Some((request, result)) = self.done_rx.recv() => {
                    self.finish_fetch(request, result);
                }
                online = next_connectivity(&mut updates) => match online {
                    Some(online) => self.on_connectivity(online),
                    None => updates = None,
                },
            }
        }

        info!("Feed synchronizer shutting down");
    }

    fn handle_intent(&mut self, intent: Intent) {
        match self.machine.request(intent) {
            Step::Ignored => debug!("Ignoring {:?} while a load is in flight", intent),
            Step::Notice(effect) => self.emit(vec![effect]),
            Step::Load(request) => {
                self.publish();
                self.start_load(request);
            }
        }
    }

    fn start_load(&mut self, request: PageRequest) {
        if !self.connectivity.is_connected() {
            debug!("Offline, serving page {} from cache", request.page);
            let outcome = match self.cache.read_all() {
                Ok(snapshot) => Outcome::Cache(snapshot),
                Err(e) => Outcome::Failed(e),
            };
            self.apply(request, outcome);
            return;
        }

        if request.page == 1 {
            if let Err(e) = self.cache.clear() {
                self.apply(request, Outcome::Failed(e));
                return;
            }
        }

        debug!("Fetching page {} ({})", request.page, request.mode);
        let source = Arc::clone(&self.source);
        let done = self.done_tx.clone();
        tokio::spawn(async move {
            let result = source.fetch_page(request.page, request.mode).await;
            // The actor may be gone; the result is dropped with the channel.
            let _ = done.send((request, result));
        });
    }

    fn finish_fetch(&mut self, request: PageRequest, result: Result<Vec<Article>>) {
        let outcome = match result.and_then(|articles| self.store_page(&request, articles)) {
            Ok(page) => Outcome::Remote(page),
            Err(e) => Outcome::Failed(e),
        };
        self.apply(request, outcome);
    }

    fn store_page(
        &self,
        request: &PageRequest,
        articles: Vec<Article>,
    ) -> Result<Vec<ArticleSummary>> {
        if request.page == 1 {
            self.cache.replace_all(&articles)?;
        } else {
            self.cache.upsert(&articles)?;
        }
        Ok(articles.iter().map(ArticleSummary::from).collect())
    }

    fn apply(&mut self, request: PageRequest, outcome: Outcome) {
        match &outcome {
            Outcome::Remote(page) => info!(
                "Loaded page {} with {} articles ({})",
                request.page,
                page.len(),
                request.mode
            ),
            Outcome::Cache(snapshot) => info!("Loaded {} cached articles", snapshot.len()),
            Outcome::Failed(e) => warn!("Loading page {} failed: {}", request.page, e),
        }

        let effects = self.machine.complete(request, outcome);
        // Notices go out before the idle state so a settled waiter sees them.
        self.emit(effects);
        self.publish();
    }

    fn on_connectivity(&mut self, online: bool) {
        if self.machine.set_online(online) {
            info!("Connectivity changed: {}", if online { "online" } else { "offline" });
            self.publish();
        }
    }

    fn emit(&self, effects: Vec<Effect>) {
        for effect in effects {
            let _ = self.effects.send(effect);
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.machine.state().clone());
    }
}

async fn next_connectivity(updates: &mut Option<ConnectivityStream>) -> Option<bool> {
    match updates {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}

/// Start a synchronizer task. The first page load is already under way (or,
/// offline, already finished) when this returns.
pub fn spawn_synchronizer(
    mode: FeedMode,
    source: Arc<dyn NewsSource>,
    cache: Arc<dyn ArticleCache>,
    connectivity: Arc<dyn ConnectivityMonitor>,
) -> (SyncHandle, mpsc::UnboundedReceiver<Effect>) {
    let updates = connectivity.observe();
    let (mut synchronizer, handle, effects) =
        FeedSynchronizer::new(mode, source, cache, connectivity);
    synchronizer.initialize();

    tokio::spawn(async move {
        synchronizer.run(Some(updates)).await;
    });

    (handle, effects)
}
