pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::FeedMode;

#[derive(Parser)]
#[command(name = "newsreel")]
#[command(about = "An offline-first terminal news reader", long_about = None)]
pub struct Cli {
    /// Skip the connectivity probe and serve everything from the cache
    #[arg(long, global = true)]
    pub offline: bool,

    /// Path to the article cache database
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch and list headlines
    Headlines {
        /// Listing to page through (defaults to the configured mode)
        #[arg(short, long, value_enum)]
        mode: Option<FeedMode>,

        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
    },
    /// Show a cached article
    Show {
        /// Article id, or a unique prefix of one
        id: String,
    },
    /// Save a cached article to the configured endpoint
    Save {
        /// Article id, or a unique prefix of one
        id: String,
    },
    /// Remove every cached article
    Clear,
    /// Show cache and connectivity status
    Status,
    /// Launch the TUI
    Tui,
}
