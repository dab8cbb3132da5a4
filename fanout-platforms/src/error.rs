use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("access token rejected: {0}")]
    AuthExpired(String),

    #[error("upstream call timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected upstream response: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("repository error: {0}")]
    Repository(String),
}

impl PlatformError {
    /// Errors worth retrying for idempotent reads.
    pub fn is_transient(&self) -> bool {
        match self {
            PlatformError::Timeout | PlatformError::Transport(_) => true,
            PlatformError::Upstream { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for PlatformError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            PlatformError::Timeout
        } else if e.is_decode() {
            PlatformError::Decode(e.to_string())
        } else {
            PlatformError::Transport(e.to_string())
        }
    }
}

impl From<url::ParseError> for PlatformError {
    fn from(e: url::ParseError) -> Self {
        PlatformError::InvalidRequest(e.to_string())
    }
}
