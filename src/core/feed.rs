//! Feed retrieval - fetches the raw catalog text from wherever it is hosted.
//!
//! Retrieval is kept apart from parsing so a transport failure can be told
//! apart from bad rows, and so the session can be driven by an in-memory
//! source in tests.

use crate::errors::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error, info};

/// Default bound on a single feed request.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can produce the complete body of the catalog feed.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Human readable location, used in logs and errors.
    fn location(&self) -> &str;

    /// Fetches the full feed body.
    ///
    /// # Errors
    /// Returns [`Error::Retrieval`] when the feed cannot be read.
    async fn fetch(&self) -> Result<String>;
}

/// Reads the feed with one HTTPS GET per ingestion pass.
pub struct HttpFeedSource {
    url: String,
    client: reqwest::Client,
}

impl HttpFeedSource {
    /// Builds a source for `url` whose requests give up after `timeout`.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the HTTP client cannot be constructed.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config {
                message: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    fn retrieval_error(&self, message: impl Into<String>) -> Error {
        Error::Retrieval {
            url: self.url.clone(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    fn location(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<String> {
        info!("Fetching catalog feed from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    self.retrieval_error("request timed out")
                } else {
                    self.retrieval_error(e.to_string())
                }
            })
            .inspect_err(|e| error!("{}", e))?;

        let status = response.status();
        if !status.is_success() {
            let err = self.retrieval_error(format!("server responded with {status}"));
            error!("{}", err);
            return Err(err);
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.retrieval_error(format!("failed to read body: {e}")))?;

        // An empty 200 is treated like an outage so the last good catalog survives.
        if body.trim().is_empty() {
            return Err(self.retrieval_error("feed body was empty"));
        }

        debug!("Fetched {} bytes of catalog feed", body.len());
        Ok(body)
    }
}

/// Serves a fixed body, or a fixed failure. Handy for demos and tests.
#[derive(Debug, Clone)]
pub struct StaticFeedSource {
    location: String,
    body: Option<String>,
}

impl StaticFeedSource {
    /// A source that always returns `body`.
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            location: "static".to_string(),
            body: Some(body.into()),
        }
    }

    /// A source whose every fetch fails.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            location: "static".to_string(),
            body: None,
        }
    }
}

#[async_trait]
impl FeedSource for StaticFeedSource {
    fn location(&self) -> &str {
        &self.location
    }

    async fn fetch(&self) -> Result<String> {
        self.body.clone().ok_or_else(|| Error::Retrieval {
            url: self.location.clone(),
            message: "feed unavailable".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::cache::CatalogStore;
    use crate::core::catalog::FeedDialect;
    use crate::test_utils::{SAMPLE_FEED, init_test_tracing};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answers a single HTTP request on loopback with `response` and returns the feed URL.
    async fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = [0_u8; 2048];
            assert!(stream.read(&mut request).await.unwrap() > 0);
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        });
        format!("http://{addr}/feed.csv")
    }

    fn http_response(status_line: &str, body: &str) -> String {
        let length = body.len();
        format!(
            "HTTP/1.1 {status_line}\r\n\
             Content-Type: text/csv\r\n\
             Content-Length: {length}\r\n\
             Connection: close\r\n\r\n{body}"
        )
    }

    #[tokio::test]
    async fn test_static_source_returns_body() -> Result<()> {
        let source = StaticFeedSource::new("name,description,price,imageUrl\n");
        assert_eq!(source.fetch().await?, "name,description,price,imageUrl\n");
        Ok(())
    }

    #[tokio::test]
    async fn test_unavailable_source_is_retrieval_error() {
        let err = StaticFeedSource::unavailable().fetch().await.unwrap_err();
        assert!(err.is_retrieval());
    }

    #[tokio::test]
    async fn test_http_source_reports_unreachable_host_as_retrieval_error() -> Result<()> {
        // port 9 on loopback is the discard service and is closed on test hosts
        let source = HttpFeedSource::new("http://127.0.0.1:9/feed.csv", Duration::from_secs(2))?;
        assert_eq!(source.location(), "http://127.0.0.1:9/feed.csv");

        let err = source.fetch().await.unwrap_err();
        assert!(err.is_retrieval());
        Ok(())
    }

    #[tokio::test]
    async fn test_http_source_returns_feed_body() -> Result<()> {
        let url = serve_once(http_response("200 OK", SAMPLE_FEED)).await;
        let source = HttpFeedSource::new(url, Duration::from_secs(5))?;
        assert_eq!(source.fetch().await?, SAMPLE_FEED);
        Ok(())
    }

    #[tokio::test]
    async fn test_http_source_treats_error_status_as_retrieval_error() -> Result<()> {
        init_test_tracing();
        let url = serve_once(http_response("503 Service Unavailable", "")).await;
        let source = HttpFeedSource::new(url.clone(), Duration::from_secs(5))?;

        let err = source.fetch().await.unwrap_err();
        match err {
            Error::Retrieval {
                url: failed,
                message,
            } => {
                assert_eq!(failed, url);
                assert!(message.contains("503"), "unexpected message: {message}");
            }
            other => panic!("expected a retrieval error, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_http_source_empty_body_keeps_loaded_catalog() -> Result<()> {
        init_test_tracing();
        let store = CatalogStore::new();
        let loaded = store
            .refresh(&StaticFeedSource::new(SAMPLE_FEED), FeedDialect::Simple)
            .await?;

        let url = serve_once(http_response("200 OK", "")).await;
        let source = HttpFeedSource::new(url, Duration::from_secs(5))?;
        let err = store.refresh(&source, FeedDialect::Simple).await.unwrap_err();
        assert!(matches!(
            &err,
            Error::Retrieval { message, .. } if message == "feed body was empty"
        ));

        let current = store.current().await.unwrap();
        assert!(Arc::ptr_eq(&current, &loaded));
        assert_eq!(current.products().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_http_source_rejects_malformed_url() -> Result<()> {
        let source = HttpFeedSource::new("not a url", DEFAULT_FETCH_TIMEOUT)?;
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, Error::Retrieval { .. }));
        Ok(())
    }
}
