use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid pid: {0}")]
    InvalidPid(String),

    #[error("unknown pid qualifier: {0}")]
    UnknownQualifier(String),

    #[error("uri {uri} is not within repository base {base}")]
    OutsideRepository { uri: String, base: String },

    #[error("unknown digest algorithm: {0}")]
    UnknownDigestAlgorithm(String),

    #[error("invalid digest value: {0}")]
    InvalidDigest(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias for type operations.
pub type TypeResult<T> = Result<T, TypeError>;
