use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by the distributed tier.
pub enum L2Error {
    /// Backend unreachable (connection refused, timeout, failover in progress).
    #[error("distributed cache unavailable: {reason}")]
    Unavailable {
        /// Error message.
        reason: String,
    },

    /// Backend rejected the command.
    #[error("distributed cache command failed: {reason}")]
    Backend {
        /// Error message.
        reason: String,
    },

    /// Key or channel pattern is not a valid glob.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Stored value or message could not be encoded/decoded.
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The backend was closed by `destroy`.
    #[error("distributed cache connection closed")]
    Closed,
}

/// Convenience result type for L2 operations.
pub type L2Result<T> = Result<T, L2Error>;
