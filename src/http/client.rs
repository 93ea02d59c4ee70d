//! HTTP client used by remote sources.

use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::status::HttpError;

/// Thin wrapper over a shared reqwest client that reports failures as
/// [`HttpError`].
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Performs a GET request and returns the body.
    #[tracing::instrument(skip(self))]
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        debug!("GET {}...", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HttpError::from_transport(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::from_status(url, status));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| HttpError::from_transport(url, &e))?;
        debug!("Received {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }

    /// Performs a GET request and deserializes the JSON response.
    #[tracing::instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        let bytes = self.get_bytes(url).await?;
        serde_json::from_slice(&bytes).map_err(|e| HttpError::Transport {
            url: url.to_string(),
            reason: format!("Failed to parse JSON response: {}", e),
        })
    }
}
