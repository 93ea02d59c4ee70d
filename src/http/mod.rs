//! HTTP client module with error classification.

mod client;
mod status;

pub use client::HttpClient;
pub use status::HttpError;
