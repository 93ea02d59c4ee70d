//! Classification of HTTP failures.
//!
//! Source requests are never retried within a run, so every failure is
//! mapped once to an [`HttpError`] and handed to the caller.

use reqwest::StatusCode;
use thiserror::Error;

use crate::error::FetchError;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Not found: {url}")]
    NotFound { url: String },

    #[error("Authentication failed for {url}. Check your RGI_TOKEN.")]
    AuthenticationFailed { url: String },

    #[error("Access forbidden: {url}. You may need authentication.")]
    Forbidden { url: String },

    #[error("Rate limit exceeded for {url}. Try again later.")]
    RateLimitExceeded { url: String },

    #[error("HTTP {status} error from {url}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
}

impl HttpError {
    /// Map a non-success status code to an error.
    pub fn from_status(url: &str, status: StatusCode) -> Self {
        let url = url.to_string();
        match status {
            StatusCode::NOT_FOUND => HttpError::NotFound { url },
            StatusCode::UNAUTHORIZED => HttpError::AuthenticationFailed { url },
            StatusCode::FORBIDDEN => HttpError::Forbidden { url },
            StatusCode::TOO_MANY_REQUESTS => HttpError::RateLimitExceeded { url },
            s => HttpError::Status {
                url,
                status: s.as_u16(),
            },
        }
    }

    /// Map a transport-level reqwest error (connection refused, DNS, timeout,
    /// undecodable body).
    pub fn from_transport(url: &str, error: &reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            return Self::from_status(url, status);
        }
        HttpError::Transport {
            url: url.to_string(),
            reason: error.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, HttpError::NotFound { .. })
    }

    /// Translate into the fetch taxonomy for a file requested from `location`.
    pub fn into_fetch_error(self, location: &str, file: &str) -> FetchError {
        if self.is_not_found() {
            FetchError::NotFoundAtSource {
                location: location.to_string(),
                file: file.to_string(),
            }
        } else {
            FetchError::Unreachable {
                location: location.to_string(),
                reason: self.to_string(),
            }
        }
    }
}
