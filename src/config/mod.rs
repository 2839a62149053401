//! Configuration management for newsreel.
//!
//! Configuration is read from `~/.config/newsreel/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.
//! `NEWSREEL_API_KEY` in the environment overrides `api.api_key`.

pub mod colors;
pub mod keybindings;

pub use colors::ColorConfig;
pub use keybindings::KeybindingConfig;

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::FeedMode;

pub const API_KEY_ENV: &str = "NEWSREEL_API_KEY";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub connectivity: ConnectivityConfig,
    pub saver: SaverConfig,
    pub colors: ColorConfig,
    pub keybindings: KeybindingConfig,
}

/// Remote news API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub page_size: u32,
    /// Region for the top headlines listing
    pub country: String,
    /// Search term for the everything listing
    pub query: String,
    pub default_mode: FeedMode,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://newsapi.org/v2/".to_string(),
            api_key: String::new(),
            page_size: 21,
            country: "us".to_string(),
            query: "USA".to_string(),
            default_mode: FeedMode::TopHeadlines,
            timeout_secs: 10,
        }
    }
}

/// Reachability probe settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectivityConfig {
    pub probe_host: String,
    pub probe_port: u16,
    pub interval_secs: u64,
    pub probe_timeout_ms: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            probe_host: "newsapi.org".to_string(),
            probe_port: 443,
            interval_secs: 5,
            probe_timeout_ms: 2000,
        }
    }
}

/// Where saved articles are pushed. Saving is disabled without an endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SaverConfig {
    pub endpoint: Option<String>,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, applying environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                config.api.api_key = key.trim().to_string();
            }
        }

        Ok(config)
    }

    /// Get the default config file path: `~/.config/newsreel/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("newsreel").join("config.toml"))
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> &'static str {
        r##"# newsreel configuration
#
# Colors can be specified as:
# - Named colors: Black, Red, Green, Yellow, Blue, Magenta, Cyan, Gray,
#   DarkGray, LightRed, LightGreen, LightYellow, LightBlue, LightMagenta,
#   LightCyan, White, Reset
# - Hex colors: "#RRGGBB" or "#RGB"
#
# Keybindings can be specified as:
# - Single characters: "a", "A", "1"
# - Special keys: Enter, Tab, BackTab, Backspace, Delete, Home, End,
#   PageUp, PageDown, Up, Down, Left, Right, Esc, Space, F1-F12
# - With modifiers: "Ctrl+c", "Shift+Tab", "Alt+Enter"

[api]
base_url = "https://newsapi.org/v2/"
# Leave empty and set NEWSREEL_API_KEY instead to keep the key out of this file
api_key = ""
page_size = 21
# Region used by the top headlines listing
country = "us"
# Search term used by the everything listing
query = "USA"
# "top_headlines" or "everything"
default_mode = "top_headlines"
timeout_secs = 10

[connectivity]
# Host probed with a TCP connect to decide whether we are online
probe_host = "newsapi.org"
probe_port = 443
interval_secs = 5
probe_timeout_ms = 2000

[saver]
# endpoint = "https://example.com/save-article"

[colors]
active_border = "Cyan"
inactive_border = "DarkGray"
selection_bg_active = "Cyan"
selection_fg_active = "Black"
selection_bg_inactive = "DarkGray"
selection_fg_inactive = "White"
title = "White"
metadata_source = "Green"
metadata_author = "Yellow"
metadata_date = "Yellow"
metadata_link = "Blue"
offline_fg = "White"
offline_bg = "Red"
status_fg = "White"
status_bg = "DarkGray"

[keybindings]
quit = ["q", "Ctrl+c"]
move_up = ["k", "Up"]
move_down = ["j", "Down"]
next_page = ["PageDown"]
prev_page = ["PageUp"]
load_more = ["n"]
refresh = ["R"]
toggle_mode = ["t"]
select = ["Enter"]
back = ["Esc"]
save = ["s"]
open_in_browser = ["o"]
"##
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
