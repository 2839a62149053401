use std::fmt;

use serde::{Deserialize, Serialize};

/// Which remote listing the feed pages through.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum FeedMode {
    #[default]
    TopHeadlines,
    Everything,
}

impl FeedMode {
    pub fn toggled(self) -> Self {
        match self {
            FeedMode::TopHeadlines => FeedMode::Everything,
            FeedMode::Everything => FeedMode::TopHeadlines,
        }
    }
}

impl fmt::Display for FeedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedMode::TopHeadlines => write!(f, "Top headlines"),
            FeedMode::Everything => write!(f, "Everything"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_round_trips() {
        assert_eq!(FeedMode::TopHeadlines.toggled(), FeedMode::Everything);
        assert_eq!(FeedMode::Everything.toggled(), FeedMode::TopHeadlines);
    }

    #[test]
    fn test_deserializes_snake_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: FeedMode,
        }
        let w: Wrapper = toml::from_str("mode = \"everything\"").unwrap();
        assert_eq!(w.mode, FeedMode::Everything);
    }
}
