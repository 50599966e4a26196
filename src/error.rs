//! Error types for the Huffman codec.

use thiserror::Error;

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, HuffError>;

/// Everything that can go wrong while packing or unpacking an artifact.
#[derive(Debug, Error)]
pub enum HuffError {
    /// Encode was called with zero symbols. Nothing was written.
    #[error("nothing to compress: input is empty")]
    EmptyInput,

    /// A value other than 0 or 1 reached the bit packer.
    #[error("invalid bit value {0}: must be 0 or 1")]
    InvalidBit(u8),

    /// Header missing or inconsistent, or the declared symbol count can not be reached.
    #[error("malformed artifact: {0}")]
    MalformedArtifact(String),

    /// The payload ran out of bits before the declared symbol count was decoded.
    #[error("truncated artifact: decoded {decoded} of {expected} symbols")]
    TruncatedArtifact { expected: u64, decoded: u64 },

    /// Failure of the underlying byte source or sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HuffError {
    /// Create a malformed artifact error.
    pub fn malformed(message: impl Into<String>) -> Self {
        HuffError::MalformedArtifact(message.into())
    }
}
