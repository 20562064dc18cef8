//! Typed repository object graph for arbor.
//!
//! Objects of a digital repository live in a remote linked-data store. This
//! crate gives them identity and type in process: a single cache hands out
//! shared handles per pid, a driver loads their statement graphs lazily, a
//! factory performs every write, and a resolver walks the containment
//! hierarchy upward.
//!
//! # Object Kinds
//!
//! - [`ContentRootObject`] → [`AdminUnit`] → [`CollectionObject`]
//! - [`CollectionObject`] / [`FolderObject`] → [`FolderObject`] | [`WorkObject`]
//! - [`WorkObject`] → [`FileObject`] → [`BinaryObject`]
//! - [`DepositRecord`] and [`Tombstone`] stand outside the hierarchy
//!
//! # Services
//!
//! - [`ObjectCache`] -- one load per pid, TTL plus LRU bound
//! - [`ObjectDriver`] -- graph loading, version checks, parent lookup
//! - [`ObjectFactory`] -- creation and relationship writes
//! - [`AncestorPathResolver`] -- root-first ancestor paths
//! - [`MembershipService`] / [`DerivativeService`] -- listings and derivatives
//! - [`Repository`] -- wires all of the above from an [`ArborConfig`]
//!
//! # Design Rules
//!
//! 1. Two reads of one pid yield the same instance until it is invalidated.
//! 2. Every write invalidates what it touched; the next read reloads.
//! 3. Containment rules are enforced by each container's `add_member`.
//! 4. Inside a write transaction version tokens are never trusted.
//! 5. Errors propagate; nothing is retried here.

pub mod ancestors;
pub mod cache;
pub mod config;
pub mod context;
pub mod derivatives;
pub mod driver;
pub mod error;
pub mod event_log;
pub mod factory;
pub mod membership;
pub mod object;
pub mod objects;
pub mod repository;

pub use ancestors::AncestorPathResolver;
pub use cache::{CacheStats, ObjectCache};
pub use config::{AncestorConfig, ArborConfig, CacheConfig, DerivativeConfig, StoreConfig};
pub use context::TxContext;
pub use derivatives::{Derivative, DerivativeService};
pub use driver::ObjectDriver;
pub use error::{ModelError, ModelResult};
pub use event_log::{EventLog, PremisEvent};
pub use factory::ObjectFactory;
pub use membership::MembershipService;
pub use object::ObjectCore;
pub use objects::{
    AdminUnit, BinaryObject, CollectionObject, ContentRootObject, DepositRecord, FileObject,
    FolderObject, RepositoryObject, Tombstone, TypedObject, WorkObject,
};
pub use repository::Repository;
