//! Transport error types

use thiserror::Error;

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that prevent an HTTP status from being obtained at all.
///
/// A response carrying any status code, including 4xx and 5xx, is not a
/// transport error.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection could not be established (refused, reset, DNS failure)
    #[error("Connection error: {0}")]
    Connection(String),

    /// The request or connect timeout elapsed
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Redirect chain exceeded the configured limit
    #[error("Too many redirects: {0}")]
    Redirect(String),

    /// The request could not be built (bad method, malformed URL)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Any other failure while sending or reading the response
    #[error("HTTP error: {0}")]
    Http(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else if err.is_redirect() {
            Self::Redirect(err.to_string())
        } else if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}
