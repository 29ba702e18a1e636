use crate::config::ConfigError;
use crate::normalizer::NormalizeError;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Timeline API returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Response body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Failed to parse result record {index}: {source}")]
    Record {
        index: usize,
        #[source]
        source: NormalizeError,
    },
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
