//! Error types for the Ushahidi client.

use thiserror::Error;

/// Everything that can go wrong while talking to an Ushahidi server.
#[derive(Debug, Error)]
pub enum UshahidiError {
    /// A required incident field was missing or could not be parsed.
    #[error("malformed incident: {0}")]
    Parse(String),

    /// The server could not be reached, timed out, or answered with a
    /// non-success HTTP status.
    #[error("could not connect to {server} because {reason}")]
    Connection { server: String, reason: String },

    /// The response did not carry a well-formed `error` envelope.
    #[error("{0}")]
    Protocol(String),

    /// The server reported a non-zero application error code.
    #[error("server reported error {code}: {message}")]
    Server { code: i64, message: String },

    /// No unread incidents remain, locally or on the server.
    #[error("no incidents remain")]
    Exhausted,

    /// An incident is missing a field required for submission.
    #[error("cannot submit an incident without a valid {field}")]
    Validation { field: &'static str },

    /// A custom field lookup found nothing.
    #[error("no custom field named {0:?}")]
    NotFound(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, UshahidiError>;
