//! Error types for the DBOps client.

use thiserror::Error;

/// Errors surfaced by [`crate::DbOpsClient`] calls.
///
/// Transport failures and backend rejections are distinct kinds so callers
/// can decide per-operation whether a 404 is a soft miss or a real failure.
#[derive(Debug, Error)]
pub enum DbOpsError {
    /// Connect failure, DNS failure, or a timeout before a response arrived.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("backend returned {status}: {body}")]
    Backend { status: u16, body: String },

    /// The response body was not valid JSON.
    #[error("invalid response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The client was shut down; no further calls are possible.
    #[error("client is shut down")]
    Closed,
}

impl DbOpsError {
    /// HTTP status of a backend rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the backend answered 404.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
