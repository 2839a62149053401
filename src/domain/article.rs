use chrono::DateTime;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

/// A full article record, as stored in the cache and shown in the detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub source_name: String,
    pub title: String,
    pub thumbnail_url: String,
    /// ISO-8601 timestamp exactly as the remote sent it.
    pub published_at: String,
    pub url: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
}

/// The listing projection of an [`Article`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub id: String,
    pub source_name: String,
    pub title: String,
    pub thumbnail_url: String,
    pub published_at: String,
}

impl Article {
    pub fn new(url: &str, title: &str, published_at: &str) -> Self {
        Self {
            id: Self::generate_id(url),
            source_name: String::new(),
            title: title.to_string(),
            thumbnail_url: String::new(),
            published_at: published_at.to_string(),
            url: url.to_string(),
            author: None,
            description: None,
            content: None,
        }
    }

    /// Generate a deterministic ID from the article's canonical source URL
    pub fn generate_id(url: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(canonical_url(url).as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn summary(&self) -> ArticleSummary {
        ArticleSummary::from(self)
    }

    /// Get the best available body text for display
    pub fn display_content(&self) -> &str {
        self.content
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or("")
    }
}

impl From<&Article> for ArticleSummary {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id.clone(),
            source_name: article.source_name.clone(),
            title: article.title.clone(),
            thumbnail_url: article.thumbnail_url.clone(),
            published_at: article.published_at.clone(),
        }
    }
}

impl ArticleSummary {
    pub fn readable_published_at(&self) -> String {
        readable_timestamp(&self.published_at)
    }
}

/// Render an RFC 3339 timestamp as `dd-mm-YYYY, HH:MM`, keeping the input
/// untouched when it does not parse.
pub fn readable_timestamp(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.format("%d-%m-%Y, %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Normalize a source URL so that cosmetic differences hash the same.
///
/// Scheme and host are lowercased by the parser, default ports and
/// fragments are dropped. Anything that does not parse is used trimmed.
pub fn canonical_url(raw: &str) -> String {
    let raw = raw.trim();
    match Url::parse(raw) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => raw.to_string(),
    }
}
