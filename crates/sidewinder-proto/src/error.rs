//! Protocol errors.

/// Errors that can occur while handling protocol requests.
#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    /// The request line is not valid JSON or not a known message.
    #[error("malformed request: {source}")]
    Malformed {
        /// The underlying parse error.
        #[from]
        source: serde_json::Error,
    },

    /// The request parsed but describes a structurally invalid board.
    #[error("invalid board: {source}")]
    InvalidBoard {
        /// The underlying validation error.
        #[from]
        source: sidewinder_core::BoardError,
    },

    /// An I/O error occurred on the request stream.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
