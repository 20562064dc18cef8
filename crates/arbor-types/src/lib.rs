//! Foundation types for arbor.
//!
//! Every other arbor crate depends on `arbor-types`. It defines how objects
//! are named, where they live in the remote store, and how their
//! descriptions are represented.
//!
//! # Key Types
//!
//! - [`Pid`]: persistent identifier, optionally addressing a sub-resource
//! - [`RepositoryPaths`]: pid ↔ store URI mapping
//! - [`Graph`]: the statement graph describing a resource
//! - [`ResourceType`]: the closed set of object kinds, with resolution order
//! - [`DatastreamType`]: binaries an object carries
//! - [`Digest`]: content checksums

pub mod datastream;
pub mod digest;
pub mod error;
pub mod graph;
pub mod paths;
pub mod pid;
pub mod resource_type;
pub mod vocab;

pub use datastream::{DatastreamType, StoragePolicy};
pub use digest::{Digest, DigestAlgorithm};
pub use error::{TypeError, TypeResult};
pub use graph::{Graph, GraphUpdate, Statement, Term, TriplePattern};
pub use paths::{RepositoryPaths, DESCRIPTION_SUFFIX};
pub use pid::{Pid, PidQualifier, CONTENT_ROOT_ID};
pub use resource_type::ResourceType;
