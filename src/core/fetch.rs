//! Downloading artifacts over HTTP.
//!
//! The runner only depends on the [`Fetch`] trait, so tests can count and
//! script downloads without touching the network.

use crate::core::error::{Error, Result};
use std::future::Future;
use std::time::Duration;

/// Why a download failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    /// HTTP status, when the server answered.
    pub status: Option<u16>,
    /// Description of the failure.
    pub message: String,
}

impl FetchFailure {
    /// The server answered with a non-success status.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// The request never produced a response (DNS, connect, timeout, body).
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

/// Source of remote artifact contents.
pub trait Fetch {
    /// Downloads `url` and returns the body as text.
    fn fetch(&self, url: &str) -> impl Future<Output = std::result::Result<String, FetchFailure>>;
}

/// [`Fetch`] implementation backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("run-checks/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Internal {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchFailure> {
        tracing::debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchFailure::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::status(status.as_u16(), format!("HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| FetchFailure::transport(format!("Failed to read body: {e}")))
    }
}
