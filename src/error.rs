use thiserror::Error;

/// Rejections raised while ingesting a candidate image
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("not an image file (type: {mime_type})")]
    InvalidType { mime_type: String },

    #[error("image is too large ({size_bytes} bytes, limit {limit_bytes} bytes)")]
    TooLarge { size_bytes: u64, limit_bytes: u64 },

    #[error("failed to read image file: {0}")]
    Unreadable(String),
}

/// Failures of a single provider call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdapterError {
    #[error("missing API key for {provider}")]
    MissingCredential { provider: &'static str },

    #[error("provider request failed with status {0}")]
    RemoteError(u16),

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("{provider} is not configured: {detail}")]
    NotConfigured {
        provider: &'static str,
        detail: String,
    },
}

impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::MalformedResponse(err.to_string());
        }
        match err.status() {
            Some(status) => Self::RemoteError(status.as_u16()),
            None => Self::NetworkError(err.to_string()),
        }
    }
}

/// Errors surfaced by the analysis session
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error("cannot {action} while session is {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("an analysis is already in progress")]
    Busy,

    #[error("analysis result discarded: session was reset")]
    Superseded,
}

/// Settings persistence failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to determine config directory")]
    NoConfigDir,

    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}
