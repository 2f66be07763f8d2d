//! Error types for contenthash.

use thiserror::Error;

/// Errors that can occur while looking up, pooling, or running content hashers.
#[derive(Debug, Error)]
pub enum HashError {
    /// A hash type identifier that is not registered.
    ///
    /// The identifier set is closed, so this indicates a programming or
    /// configuration defect rather than bad input data.
    #[error("unknown hash type: {0}")]
    UnknownHashType(String),

    /// A hasher was used in a state that does not permit the operation,
    /// e.g. updated or finalized again after finalization.
    #[error("invalid hasher state: {0}")]
    InvalidState(&'static str),

    /// Allocation failed while growing hasher or chunker state.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Invalid configuration parameter.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// A serialized or textual content hash could not be parsed.
    #[error("invalid content hash: {0}")]
    InvalidContentHash(String),

    /// An I/O error occurred while reading input data.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<std::collections::TryReserveError> for HashError {
    fn from(e: std::collections::TryReserveError) -> Self {
        HashError::ResourceExhausted(e.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = HashError> = std::result::Result<T, E>;
