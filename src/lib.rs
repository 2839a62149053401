//! # Newsreel
//!
//! A terminal-first, offline-first news reader.
//!
//! ## Architecture
//!
//! ```text
//! Connectivity ─┐
//! NewsSource ───┼─> FeedSynchronizer ──> SyncState / Effect ──> CLI, TUI
//! ArticleCache ─┘
//! ```
//!
//! Pages come from the remote API while the network is usable and from the
//! SQLite cache while it is not. The synchronizer owns the pagination
//! cursor and allows one load at a time.
//!
//! ## Quick Start
//!
//! ```bash
//! # First two pages of top headlines
//! newsreel headlines --pages 2
//!
//! # Search listing, served from the cache only
//! newsreel --offline headlines --mode everything
//!
//! # Launch TUI
//! newsreel tui
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the cache,
/// remote source, saver and connectivity monitor.
pub mod app;

/// Command-line interface using clap.
///
/// - `headlines [--mode] [--pages N]` - Load and print pages
/// - `show <id>` / `save <id>` - Detail view and remote save
/// - `clear` - Empty the cache
/// - `status` - Cache size and connectivity
/// - `tui` - Launch the TUI
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/newsreel/config.toml`: API settings, connectivity
/// probe, save endpoint, colors and keybindings.
pub mod config;

/// Network reachability: [`ConnectivityMonitor`](connectivity::ConnectivityMonitor)
/// with a TCP probe and a manually driven implementation.
pub mod connectivity;

/// Core domain models.
///
/// - [`Article`](domain::Article): Full record with a SHA256 id of its URL
/// - [`ArticleSummary`](domain::ArticleSummary): Listing projection
/// - [`FeedMode`](domain::FeedMode): Top headlines or everything
/// - [`SyncState`](domain::SyncState): Synchronizer snapshot
pub mod domain;

/// Remote page source.
///
/// - [`NewsSource`](fetcher::NewsSource): Async trait for page fetching
/// - [`NewsApiClient`](fetcher::NewsApiClient): reqwest-based implementation
pub mod fetcher;

/// Wire JSON to [`Article`](domain::Article) mapping.
pub mod normalizer;

/// Single-article save endpoint.
pub mod saver;

/// SQLite article cache.
///
/// - [`ArticleCache`](store::ArticleCache): Trait defining cache operations
/// - [`SqliteCache`](store::SqliteCache): SQLite implementation
pub mod store;

/// Feed synchronizer: pagination, source selection and single-flight loads.
pub mod sync;

/// Terminal user interface.
///
/// Article list beside a preview pane, a header with the current mode and
/// an offline banner, and a status bar for notices.
///
/// Keybindings: j/k navigate, n loads more, R refreshes, t switches mode,
/// Enter opens, Esc goes back, s saves, o opens in browser, q quits.
pub mod tui;
