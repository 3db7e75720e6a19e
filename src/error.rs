/// Error types for photo search
///
/// Gateway errors travel inside iced messages, so they are `Clone`
/// and carry their causes as strings.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a remote photo-search call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Photo service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response from photo service: {0}")]
    Decode(String),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

impl GatewayError {
    /// Classify a reqwest failure
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

/// A per-page value outside the allowed set {5, 10, 20, 30}
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Invalid per-page value {0}; allowed values are 5, 10, 20 and 30")]
pub struct InvalidPerPage(pub u32);

/// Failure while resolving the application configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No Unsplash access key configured; set UNSPLASH_ACCESS_KEY or add \"access_key\" to {0}")]
    MissingAccessKey(String),

    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid API base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error(transparent)]
    PerPage(#[from] InvalidPerPage),

    #[error("Invalid value '{value}' for {name}")]
    InvalidEnv { name: &'static str, value: String },
}

/// Top-level error returned from `main`
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("UI error: {0}")]
    Ui(#[from] iced::Error),
}
