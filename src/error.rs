// Error type shared by every component of the uploader.
// Library code returns these values up to the orchestrator; only the binary
// decides how a failure ends the process.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a status the operation does not accept.
    #[error("{operation} for {path} returned {status}: {body}")]
    Status {
        operation: &'static str,
        path: String,
        status: u16,
        body: String,
    },

    /// A success response without the field the next step needs.
    #[error("{operation} for {path}: response has no `{field}`")]
    MissingField {
        operation: &'static str,
        path: String,
        field: &'static str,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An operation kept failing until its attempt budget ran out.
    #[error("{operation} failed after {attempts} attempts: {last}")]
    Exhausted {
        operation: String,
        attempts: u32,
        #[source]
        last: Box<Error>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("run aborted by operator")]
    Aborted,
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
