//! Remote object store and graph query interfaces for arbor.
//!
//! The repository's objects live in a remote linked-data store reached only
//! through a narrow HTTP interface, with relationships answered by a
//! separate graph query service. This crate defines both collaborators as
//! traits and provides two backends.
//!
//! # Traits
//!
//! - [`ObjectStore`]: HEAD/GET/PUT/POST/PATCH over resources and binaries
//! - [`QueryService`]: pattern queries over the aggregate graph
//!
//! # Backends
//!
//! - [`InMemoryObjectStore`]: implements both traits; for tests and embedding
//! - [`HttpObjectStore`] / [`HttpQueryService`]: blocking HTTP clients
//!
//! # Rules
//!
//! 1. Every call is blocking; the per-client timeout is the only cancellation.
//! 2. Version tokens are returned exactly as the store sent them.
//! 3. A rejected upload checksum is always [`StoreError::ChecksumMismatch`],
//!    never a generic conflict.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod http;
pub mod link;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use http::{HttpObjectStore, HttpQueryService, GRAPH_MEDIA_TYPE, GRAPH_UPDATE_MEDIA_TYPE};
pub use link::{parse_link_header, LinkValue};
pub use memory::{InMemoryObjectStore, RequestCounts};
pub use traits::{
    BinaryContent, BinaryStream, BinaryUpload, ByteRange, GraphResponse, ObjectStore,
    QueryService, ResourceHead, ResourceKind,
};
