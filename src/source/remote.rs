//! HTTP package source.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;

use super::{IndexEntry, Source, SourceKind};
use crate::error::FetchError;
use crate::http::HttpClient;
use crate::package::Candidate;

const INDEX_PATH: &str = "specs.json";
const ARTIFACT_DIR: &str = "gems";

/// Remote source serving `specs.json` and `gems/<full_name>.gem`.
pub struct RemoteSource {
    http_client: HttpClient,
    base_url: String,
}

impl RemoteSource {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self::from_http_client(HttpClient::new(client), base_url)
    }

    /// Create from an existing HttpClient.
    pub fn from_http_client(http_client: HttpClient, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn index_url(&self) -> String {
        format!("{}/{}", self.base_url, INDEX_PATH)
    }

    fn artifact_url(&self, candidate: &Candidate) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            ARTIFACT_DIR,
            candidate.file_name()
        )
    }
}

#[async_trait]
impl Source for RemoteSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Remote
    }

    fn location(&self) -> &str {
        &self.base_url
    }

    #[tracing::instrument(skip(self), fields(source = %self.base_url))]
    async fn build_index(&self) -> Result<Vec<IndexEntry>> {
        let url = self.index_url();
        debug!("Fetching index from {}...", url);
        let raw: Vec<serde_json::Value> = self
            .http_client
            .get_json(&url)
            .await
            .with_context(|| format!("Failed to fetch index of {}", self.base_url))?;

        let mut entries = Vec::with_capacity(raw.len());
        for value in raw {
            match serde_json::from_value::<IndexEntry>(value) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("Skipping malformed index entry from {}: {}", self.base_url, e),
            }
        }
        debug!("Indexed {} entries from {}", entries.len(), self.base_url);
        Ok(entries)
    }

    #[tracing::instrument(skip(self, candidate), fields(candidate = %candidate.full_name()))]
    async fn fetch_bytes(&self, candidate: &Candidate) -> Result<Vec<u8>, FetchError> {
        let url = self.artifact_url(candidate);
        self.http_client
            .get_bytes(&url)
            .await
            .map_err(|e| e.into_fetch_error(&self.base_url, &candidate.file_name()))
    }
}
