//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`RelayHubError`] via `#[from]` / `From` impls.

/// Base error shared by every port and service.
#[derive(Debug, thiserror::Error)]
pub enum RelayHubError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    NotFound(#[from] NotFoundError),

    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A domain invariant was violated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Timer durations must be strictly positive.
    #[error("timer duration must be greater than zero")]
    NonPositiveDuration,

    /// The text does not name one of the four relays.
    #[error("unknown device `{0}`")]
    UnknownDevice(String),

    /// Chat input was blank after trimming.
    #[error("message must not be empty")]
    EmptyMessage,

    /// A settings field is outside its accepted range.
    #[error("setting `{field}` is out of range")]
    SettingOutOfRange { field: &'static str },
}

/// A record looked up by key does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} `{id}` not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
