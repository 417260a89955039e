use crate::oid::Oid;

/// Errors from the object store core.
///
/// All malformations are detected eagerly at the point of parsing and
/// propagated without partial results. None are transient, so nothing here
/// is retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Object framing is absent or unparsable: no NUL separator, an unknown
    /// kind token, a non-decimal length, or a declared length that does not
    /// match the payload.
    #[error("malformed object: {0}")]
    MalformedObject(String),

    /// A binary tree payload ended in the middle of an entry.
    #[error("truncated tree payload: {0}")]
    TruncatedTree(String),

    /// An object id that is not exactly 40 hex characters.
    #[error("invalid digest {0:?}")]
    InvalidDigest(String),

    /// No object file exists at the path derived from the digest.
    #[error("object not found: {0}")]
    ObjectNotFound(Oid),

    /// A tree entry mode outside the recognized set.
    #[error("unsupported tree entry mode {0:?}")]
    UnsupportedMode(String),

    /// I/O error from the underlying filesystem or compressor.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;
