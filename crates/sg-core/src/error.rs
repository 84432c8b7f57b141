//! Error types for sg-core

use thiserror::Error;

use crate::classify::ClassifiedError;

/// Main error type for sg-core
#[derive(Error, Debug)]
pub enum Error {
    /// A remote failure that has already been classified.
    ///
    /// Outer layers pass this through untouched so the kind decided at the
    /// origin survives every re-wrap.
    #[error(transparent)]
    Domain(#[from] ClassifiedError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid tool input: {0}")]
    InvalidInput(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// The classified error carried by this error, if any
    pub fn as_domain(&self) -> Option<&ClassifiedError> {
        match self {
            Error::Domain(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type alias for sg-core
pub type Result<T> = std::result::Result<T, Error>;
