use thiserror::Error;

/// Errors that can occur while fetching or rendering report results.
#[derive(Error, Debug)]
pub enum ReportError {
    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error for a malformed report base.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// A fetch reached a responder and came back with an error status.
    #[error("Cannot get json from: {url} (status {status})")]
    Transport { url: String, status: u16 },

    /// A fetch was aborted before any status was received (status 0).
    #[error("Request aborted: {url}")]
    Aborted { url: String },

    /// A background fetch was started outside a tokio runtime.
    #[error("No async runtime: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    /// Invalid command-line or configuration value.
    #[error("{0}")]
    InvalidArgs(String),
}

impl ReportError {
    /// True for the status-zero outcome that callers swallow silently.
    pub fn is_silent(&self) -> bool {
        matches!(self, ReportError::Aborted { .. })
    }
}

/// Convenience result type for resultview operations.
pub type Result<T> = std::result::Result<T, ReportError>;
