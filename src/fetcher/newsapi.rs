use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

use crate::app::{NewsreelError, Result};
use crate::config::ApiConfig;
use crate::domain::{Article, FeedMode};
use crate::fetcher::NewsSource;
use crate::normalizer::{error_from_response, NewsResponse, Normalizer};

const TOP_HEADLINES_PATH: &str = "top-headlines";
const EVERYTHING_PATH: &str = "everything";
const API_KEY_HEADER: &str = "X-Api-Key";

pub struct NewsApiClient {
    client: Client,
    base_url: Url,
    api_key: String,
    page_size: u32,
    country: String,
    query: String,
    normalizer: Normalizer,
}

impl NewsApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("newsreel/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Url::join drops the last segment unless the base ends with '/'
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Self {
            client,
            base_url: Url::parse(&base)?,
            api_key: config.api_key.clone(),
            page_size: config.page_size,
            country: config.country.clone(),
            query: config.query.clone(),
            normalizer: Normalizer::new(),
        })
    }

    /// Build the request URL for a page. The key travels in a header.
    pub fn page_url(&self, page: u32, mode: FeedMode) -> Result<Url> {
        let mut url = match mode {
            FeedMode::TopHeadlines => self.base_url.join(TOP_HEADLINES_PATH)?,
            FeedMode::Everything => self.base_url.join(EVERYTHING_PATH)?,
        };

        {
            let mut query = url.query_pairs_mut();
            match mode {
                FeedMode::TopHeadlines => query.append_pair("country", &self.country),
                FeedMode::Everything => query.append_pair("q", &self.query),
            };
            query
                .append_pair("pageSize", &self.page_size.to_string())
                .append_pair("page", &page.max(1).to_string());
        }

        Ok(url)
    }
}

/// Status codes the API uses to tell a client to stop paging.
pub fn is_quota_status(status: StatusCode) -> bool {
    status == StatusCode::UPGRADE_REQUIRED || status == StatusCode::TOO_MANY_REQUESTS
}

#[async_trait]
impl NewsSource for NewsApiClient {
    async fn fetch_page(&self, page: u32, mode: FeedMode) -> Result<Vec<Article>> {
        let url = self.page_url(page, mode)?;
        debug!("Fetching page {} ({}) from {}", page, mode, url);

        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if is_quota_status(status) {
            return Err(NewsreelError::QuotaExceeded);
        }

        let body = response.bytes().await?;

        if !status.is_success() {
            // Error bodies usually explain themselves; fall back to the status
            return Err(match serde_json::from_slice::<NewsResponse>(&body) {
                Ok(payload) => error_from_response(&payload),
                Err(_) => NewsreelError::Transient(format!("HTTP {}", status)),
            });
        }

        self.normalizer.normalize(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use crate::app::ErrorKind;

    fn config(base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            api_key: "secret".to_string(),
            ..ApiConfig::default()
        }
    }

    /// Serve exactly one canned HTTP response and hand back the raw request.
    async fn serve_once(status: &str, body: &str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/v2", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&buf[..n]).to_string()
        });

        (base, handle)
    }

    #[test]
    fn test_page_url_top_headlines() {
        let client = NewsApiClient::new(&config("https://newsapi.org/v2")).unwrap();
        let url = client.page_url(3, FeedMode::TopHeadlines).unwrap();
        assert_eq!(
            url.as_str(),
            "https://newsapi.org/v2/top-headlines?country=us&pageSize=21&page=3"
        );
    }

    #[test]
    fn test_page_url_everything() {
        let client = NewsApiClient::new(&config("https://newsapi.org/v2/")).unwrap();
        let url = client.page_url(1, FeedMode::Everything).unwrap();
        assert_eq!(
            url.as_str(),
            "https://newsapi.org/v2/everything?q=USA&pageSize=21&page=1"
        );
        assert!(!url.as_str().contains("secret"));
    }

    #[test]
    fn test_quota_statuses() {
        assert!(is_quota_status(StatusCode::UPGRADE_REQUIRED));
        assert!(is_quota_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_quota_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!is_quota_status(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn test_fetch_page_success() {
        let body = r#"{"status":"ok","totalResults":1,"articles":[{"source":{"id":null,"name":"Wire"},"author":null,"title":"Hello","description":null,"url":"https://example.com/hello","urlToImage":null,"publishedAt":"2024-01-01T00:00:00Z","content":null}]}"#;
        let (base, server) = serve_once("200 OK", body).await;

        let client = NewsApiClient::new(&config(&base)).unwrap();
        let articles = client.fetch_page(2, FeedMode::TopHeadlines).await.unwrap();

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].id, Article::generate_id("https://example.com/hello"));

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /v2/top-headlines?country=us&pageSize=21&page=2 "));
        assert!(request.to_lowercase().contains("x-api-key: secret"));
    }

    #[tokio::test]
    async fn test_fetch_page_upgrade_required() {
        let (base, _server) = serve_once("426 Upgrade Required", "{}").await;

        let client = NewsApiClient::new(&config(&base)).unwrap();
        let err = client.fetch_page(6, FeedMode::Everything).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::QuotaExceeded);
    }

    #[tokio::test]
    async fn test_fetch_page_server_error_is_transient() {
        let (base, _server) = serve_once("500 Internal Server Error", "oops").await;

        let client = NewsApiClient::new(&config(&base)).unwrap();
        let err = client.fetch_page(1, FeedMode::TopHeadlines).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transient);
    }

    #[tokio::test]
    async fn test_fetch_page_connection_refused_is_transient() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/v2", listener.local_addr().unwrap());
        drop(listener);

        let client = NewsApiClient::new(&config(&base)).unwrap();
        let err = client.fetch_page(1, FeedMode::TopHeadlines).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transient);
    }
}
