/// Errors from remote store and query service operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No resource exists at the URI.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The resource existed and has been removed.
    #[error("resource gone: {0}")]
    Gone(String),

    /// The store rejected uploaded content because a supplied digest did not
    /// match what it computed.
    #[error("checksum mismatch for {uri}: {detail}")]
    ChecksumMismatch { uri: String, detail: String },

    /// Any other conflict reported by the store.
    #[error("conflict at {uri}: {detail}")]
    Conflict { uri: String, detail: String },

    /// The requested byte range lies outside the content.
    #[error("range not satisfiable for {uri}: start {start}, length {length}")]
    RangeNotSatisfiable { uri: String, start: u64, length: u64 },

    #[error("unexpected status {status} from {uri}")]
    UnexpectedStatus { uri: String, status: u16 },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
