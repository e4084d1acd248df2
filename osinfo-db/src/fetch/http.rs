//! HTTP client abstraction for testability

use std::time::Duration;

use super::error::{FetchError, FetchResult};

/// Trait for HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    /// * `timeout` - Upper bound for the whole request, body included
    ///
    /// # Returns
    ///
    /// The response body as bytes or an error. Non-2xx responses are errors.
    fn get(&self, url: &str, timeout: Duration) -> FetchResult<Vec<u8>>;
}

/// Real HTTP client implementation using reqwest.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient sending the given user agent.
    ///
    /// Timeouts are applied per request.
    pub fn new(user_agent: &str) -> FetchResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(None)
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str, timeout: Duration) -> FetchResult<Vec<u8>> {
        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                    timeout_secs: timeout.as_secs(),
                }
            } else {
                FetchError::Request {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        };

        tracing::debug!(url, timeout_secs = timeout.as_secs(), "HTTP GET");
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .map_err(map_err)?;

        // Check HTTP status
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Read response body
        response.bytes().map(|b| b.to_vec()).map_err(map_err)
    }
}
