//! The fetch collaborator and its HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use thiserror::Error;
use tokio::runtime::Handle;

use crate::config::FetchConfig;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Request to '{url}' failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to '{url}' returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{0}")]
    Other(String),
}

/// Asynchronous retrieval of a document by URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetches over HTTP with reqwest, running every request on the `io`
/// runtime so the UI thread only awaits the result.
pub struct HttpFetcher {
    client: Client,
    io: Handle,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig, io: Handle) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, io })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let target = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let client = self.client.clone();
        let url = url.to_string();

        let request = self.io.spawn(async move {
            tracing::debug!(url = %url, "Fetching");
            let response = client
                .get(target)
                .send()
                .await
                .map_err(|source| FetchError::Http {
                    url: url.clone(),
                    source,
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    url,
                    status: status.as_u16(),
                });
            }

            response
                .text()
                .await
                .map_err(|source| FetchError::Http { url, source })
        });

        request
            .await
            .map_err(|e| FetchError::Other(format!("Fetch task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn malformed_url_is_rejected_before_any_request() {
        let fetcher = HttpFetcher::new(&FetchConfig::default(), Handle::current()).unwrap();

        let err = fetcher.fetch("foo").await.unwrap_err();

        assert!(matches!(err, FetchError::InvalidUrl { .. }));
        assert!(err.to_string().starts_with("Invalid URL 'foo'"));
    }

    #[test]
    fn status_error_names_url_and_code() {
        let err = FetchError::Status {
            url: "https://example.com".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "Request to 'https://example.com' returned HTTP 404"
        );
    }
}
