//! Error types for stencil-remote.

use thiserror::Error;

/// Transport-class failures. None of them are fatal to a session: callers
/// recover locally (refresh, delete, or degrade to an empty snapshot).
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The backend answered with a non-success status.
    #[error("{method} {url} returned HTTP {status}: {body}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    /// DNS, connect, TLS or timeout failure before a response arrived.
    #[error("{method} {url} failed: {message}")]
    Transport {
        method: &'static str,
        url: String,
        message: String,
    },

    /// The response body was not the JSON shape we expected.
    #[error("{method} {url} returned an undecodable body: {source}")]
    Decode {
        method: &'static str,
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// The provisioning response did not designate a primary record.
    #[error("provisioning {path} returned no primary record id")]
    MissingPrimary { path: String },
}

impl RemoteError {
    /// HTTP status, when the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
