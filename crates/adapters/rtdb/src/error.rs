//! Errors raised by the REST backend.

use relayhub_domain::error::RelayHubError;

#[derive(Debug, thiserror::Error)]
pub enum RtdbError {
    /// Transport failure, timeout or undecodable body.
    #[error("realtime database request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The database answered with a non-success status.
    #[error("realtime database returned {status} for `{path}`")]
    Status { path: String, status: u16 },

    /// A stored value had an unexpected shape.
    #[error("malformed value at `{path}`: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<RtdbError> for RelayHubError {
    fn from(err: RtdbError) -> Self {
        Self::Storage(Box::new(err))
    }
}
