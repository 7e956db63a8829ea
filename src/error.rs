//! Error types for yt-points

use thiserror::Error;

/// Failure of a single HTTP request against the Pendle API
#[derive(Debug, Error)]
pub enum HttpError {
    /// Connection, DNS or TLS failure
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    /// Request exceeded its timeout
    #[error("request timed out")]
    Timeout,
    /// Server answered with a non-2xx status
    #[error("HTTP {status} from {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },
    /// Body was not the JSON shape we expected
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HttpError::Timeout
        } else if err.is_decode() {
            HttpError::Decode(err.to_string())
        } else {
            HttpError::Transport(err)
        }
    }
}

/// Error raised by a simulation run
#[derive(Debug, Error)]
pub enum PendleError {
    /// Bad address, unsupported network or unparseable expiry
    #[error("{0}")]
    InvalidInput(String),
    /// No matching YT asset or market
    #[error("{0}")]
    NotFound(String),
    /// Network failure, wrapped with what we were doing at the time
    #[error("Network error while {context}: {source}")]
    Network {
        context: &'static str,
        #[source]
        source: HttpError,
    },
}

/// Coarse classification of [`PendleError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Network,
}

impl PendleError {
    /// Wrap an HTTP failure with the operation it interrupted
    pub fn network(context: &'static str, source: HttpError) -> Self {
        PendleError::Network { context, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PendleError::InvalidInput(_) => ErrorKind::InvalidInput,
            PendleError::NotFound(_) => ErrorKind::NotFound,
            PendleError::Network { .. } => ErrorKind::Network,
        }
    }
}

pub type Result<T> = std::result::Result<T, PendleError>;
