//! Error types for tidarr-send.

use thiserror::Error;

/// Everything that can go wrong while sending one item to Tidarr.
///
/// Each variant is terminal for the current attempt; nothing is retried
/// automatically. A multi-item send keeps going past individual failures.
#[derive(Debug, Error)]
pub enum SendError {
    /// Server URL missing or not an absolute http(s) URL. No call was made.
    #[error("configuration error: {0}")]
    Config(String),

    /// `/api/auth` failed or granted no token. `/api/save` was never called.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// `/api/save` answered with a body we do not recognize as success.
    /// The raw body is kept for diagnostics.
    #[error("unexpected response from Tidarr: {body}")]
    Server { body: String },

    /// The request exceeded the client timeout.
    #[error("request to Tidarr timed out")]
    Timeout,

    /// Any other transport failure (DNS, connection refused, TLS, ...).
    #[error("network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for SendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SendError::Timeout
        } else {
            SendError::Network(err.to_string())
        }
    }
}
