use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContribError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication failed for {url}. Set JIRA_API_TOKEN or JIRA_TOKEN")]
    Unauthorized { url: String },

    #[error("Still rate limited after retrying {url}")]
    RateLimited { url: String },

    #[error("Request limiter closed: {0}")]
    LimiterClosed(#[from] tokio::sync::AcquireError),

    #[error("Invalid date {value:?}, expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("Start date {start} is after end date {end}")]
    InvertedWindow { start: String, end: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid ticket key pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Failed to read config file at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read PR data from {path}: {source}")]
    PrDataRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse PR data from {path}: {source}")]
    PrDataParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, ContribError>;
