use arbor_store::StoreError;
use arbor_types::{DatastreamType, Pid, TypeError};

/// Errors surfaced by the repository object layer.
///
/// None of these are retried or absorbed here; callers decide whether a
/// failure is terminal for their operation.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The object's declared types do not satisfy the requested kind.
    #[error("type mismatch for {pid}: expected {expected}, found {found}")]
    TypeMismatch {
        pid: Pid,
        expected: String,
        found: String,
    },

    /// None of the object's declared types belong to the known kinds.
    #[error("unable to resolve the type of {pid} from declared types {types:?}")]
    UnresolvedType { pid: Pid, types: Vec<String> },

    /// No parent relation exists for an object that requires one.
    #[error("object {0} has no parent")]
    Orphaned(Pid),

    /// The ancestor walk exceeded its safety bound.
    #[error("ancestor walk from {pid} exceeded {max_depth} hops; cycle or over-nesting suspected")]
    HierarchyCycle { pid: Pid, max_depth: usize },

    /// The store rejected uploaded content because a digest did not match.
    #[error("checksum mismatch storing {pid}: {detail}")]
    ChecksumMismatch { pid: Pid, detail: String },

    #[error("invalid relationship on {pid}: {reason}")]
    InvalidRelationship { pid: Pid, reason: String },

    #[error("datastream {datastream} is not supported here for {pid}")]
    UnsupportedDatastream { pid: Pid, datastream: DatastreamType },

    /// The object existed and has since been removed.
    #[error("object {0} has been removed")]
    TombstoneFound(Pid),

    #[error("object not found: {0}")]
    NotFound(Pid),

    #[error("object already exists: {0}")]
    AlreadyExists(Pid),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("repository access failure: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ModelError {
    /// Translate a store failure observed while working on `pid`.
    pub fn from_store(pid: &Pid, err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => Self::NotFound(pid.clone()),
            StoreError::Gone(_) => Self::TombstoneFound(pid.clone()),
            StoreError::ChecksumMismatch { detail, .. } => Self::ChecksumMismatch {
                pid: pid.clone(),
                detail,
            },
            other => Self::Store(other),
        }
    }

    /// A container refused a candidate member.
    pub(crate) fn member_rejected(
        container: &Pid,
        container_kind: &str,
        allowed: &str,
        member: &crate::objects::RepositoryObject,
    ) -> Self {
        Self::TypeMismatch {
            pid: container.clone(),
            expected: format!("member of {container_kind} ({allowed})"),
            found: format!("{} {}", member.resource_type(), member.pid()),
        }
    }

    /// Whether this is either kind of type mismatch.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. } | Self::UnresolvedType { .. })
    }
}

/// Result alias for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
