use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app::{NewsreelError, Result};
use crate::domain::Article;

/// Secondary write path used by the detail view. Carries no paging state.
#[async_trait]
pub trait ArticleSaver: Send + Sync {
    /// Push one article upstream. `Ok(false)` means the server declined it.
    async fn save_article(&self, article: &Article) -> Result<bool>;
}

#[derive(Debug, Serialize)]
struct SaveRequest<'a> {
    title: &'a str,
    url: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct SaveResponse {
    success: bool,
}

pub struct HttpArticleSaver {
    client: Client,
    endpoint: String,
}

impl HttpArticleSaver {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("newsreel/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: url::Url::parse(endpoint)?.to_string(),
        })
    }
}

#[async_trait]
impl ArticleSaver for HttpArticleSaver {
    async fn save_article(&self, article: &Article) -> Result<bool> {
        let payload = SaveRequest {
            title: &article.title,
            url: &article.url,
            content: article.content.as_deref().unwrap_or(""),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(&payload)?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NewsreelError::Transient(format!("HTTP {}", status)));
        }

        let body = response.bytes().await?;
        let reply: SaveResponse = serde_json::from_slice(&body)?;
        info!("Saved article {} upstream: {}", article.id, reply.success);

        Ok(reply.success)
    }
}
