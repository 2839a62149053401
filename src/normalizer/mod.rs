use html_escape::decode_html_entities;
use serde::Deserialize;

use crate::app::{NewsreelError, Result};
use crate::domain::Article;

/// Error codes the news API uses when a key has exhausted its allowance.
const QUOTA_CODES: &[&str] = &["rateLimited", "maximumResultsReached"];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    pub status: String,
    #[serde(default)]
    pub total_results: u32,
    #[serde(default)]
    pub articles: Vec<WireArticle>,
    pub code: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireArticle {
    pub source: Option<WireSource>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: String,
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub published_at: String,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireSource {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Decode a response body into articles with their ids assigned.
    pub fn normalize(&self, body: &[u8]) -> Result<Vec<Article>> {
        let response: NewsResponse = serde_json::from_slice(body)?;

        if response.status != "ok" {
            return Err(error_from_response(&response));
        }

        Ok(response.articles.into_iter().map(to_article).collect())
    }
}

/// Map an error payload to the right error class.
pub fn error_from_response(response: &NewsResponse) -> NewsreelError {
    match response.code.as_deref() {
        Some(code) if QUOTA_CODES.contains(&code) => NewsreelError::QuotaExceeded,
        code => NewsreelError::Transient(
            response
                .message
                .clone()
                .or_else(|| code.map(String::from))
                .unwrap_or_else(|| format!("status {}", response.status)),
        ),
    }
}

pub fn to_article(wire: WireArticle) -> Article {
    let decode = |s: String| decode_html_entities(&s).to_string();

    Article {
        id: Article::generate_id(&wire.url),
        source_name: wire.source.map(|s| s.name).unwrap_or_default(),
        title: wire.title.map(decode).unwrap_or_default(),
        thumbnail_url: wire.url_to_image.map(|u| fix_url(&u)).unwrap_or_default(),
        published_at: wire.published_at,
        url: wire.url,
        author: wire.author.filter(|a| !a.is_empty()),
        description: wire.description.map(decode),
        content: wire.content.map(decode),
    }
}

/// Replace literal `\uXXXX` escape sequences left in URLs by some sources.
pub fn fix_url(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let slashes = tail.chars().take_while(|c| *c == '\\').count();
        let after = &tail[slashes..];

        let decoded = after
            .strip_prefix('u')
            .and_then(|hex| hex.get(..4))
            .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(c) => {
                out.push(c);
                rest = &after[5..];
            }
            None => {
                out.push_str(&tail[..slashes]);
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
