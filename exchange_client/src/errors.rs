use thiserror::Error;

use crate::config::ConfigError;

/// The unified error type for the `exchange_client` crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Credentials rejected by the exchange (bad key, bad signature, expired).
    #[error("Authentication failed (code {code:?}): {message}")]
    Authentication { code: Option<i64>, message: String },

    /// The exchange answered with a non-success status.
    #[error("Exchange returned HTTP {status} (code {code:?}): {message}")]
    RemoteService {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    /// Connectivity failure (connect, timeout). Retried with backoff
    /// before being surfaced.
    #[error("Transient network failure")]
    TransientNetwork(#[source] reqwest::Error),

    /// A 2xx body that did not decode into the expected shape.
    #[error("Malformed response body ({context}): {reason}")]
    MalformedResponse {
        context: &'static str,
        reason: String,
    },

    /// Request parameters rejected before any I/O.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// An error related to configuration.
    #[error("Configuration error")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Maps a transport-level failure from `reqwest`.
    ///
    /// Connect and timeout failures are the retriable class; anything else
    /// that surfaces from `send()` (e.g. a malformed redirect) is treated
    /// the same way since no response was received.
    pub(crate) fn transport(source: reqwest::Error) -> Self {
        Error::TransientNetwork(source)
    }

    pub(crate) fn malformed(context: &'static str, reason: impl ToString) -> Self {
        Error::MalformedResponse {
            context,
            reason: reason.to_string(),
        }
    }

    /// Whether the retry loop may re-attempt the operation.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::TransientNetwork(_))
    }
}
