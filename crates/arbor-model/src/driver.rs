//! Loads object state from the store and answers parent lookups.

use std::sync::Arc;

use tracing::{debug, trace};

use arbor_store::{BinaryStream, ByteRange, ObjectStore, QueryService};
use arbor_types::{vocab, Graph, Pid, RepositoryPaths, ResourceType, Term};

use crate::context::TxContext;
use crate::error::{ModelError, ModelResult};
use crate::object::{strip_etag, ObjectCore};
use crate::objects::{BinaryObject, RepositoryObject};

/// Stateless bridge between object handles and the remote store.
pub struct ObjectDriver {
    store: Arc<dyn ObjectStore>,
    query: Arc<dyn QueryService>,
    paths: RepositoryPaths,
}

impl ObjectDriver {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        query: Arc<dyn QueryService>,
        paths: RepositoryPaths,
    ) -> Self {
        Self {
            store,
            query,
            paths,
        }
    }

    pub fn paths(&self) -> &RepositoryPaths {
        &self.paths
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    pub fn query(&self) -> &Arc<dyn QueryService> {
        &self.query
    }

    /// Make sure `obj` holds a graph that is current enough.
    ///
    /// The held graph is reused when no refresh is pending and either
    /// `check_for_updates` is false, or the store's version token still
    /// matches and no write transaction is open. Otherwise the graph is
    /// fetched again.
    pub fn load_model(
        &self,
        obj: &ObjectCore,
        check_for_updates: bool,
        ctx: &TxContext,
    ) -> ModelResult<Arc<Graph>> {
        if let Some(graph) = obj.cached_graph() {
            if !check_for_updates {
                return Ok(graph);
            }
            if !ctx.in_write_transaction() {
                if let (Some(held), Some(current)) = (obj.etag(), self.get_etag(obj)?) {
                    if held == current {
                        trace!(pid = %obj.pid(), "graph unmodified");
                        return Ok(graph);
                    }
                }
            }
        }
        self.fetch_model(obj)
    }

    fn fetch_model(&self, obj: &ObjectCore) -> ModelResult<Arc<Graph>> {
        let response = self
            .store
            .get_graph(obj.metadata_uri())
            .map_err(|e| ModelError::from_store(obj.pid(), e))?;
        debug!(pid = %obj.pid(), statements = response.graph.len(), "fetched graph");
        Ok(obj.replace_model(response.graph, response.etag))
    }

    /// Declared types of `obj`, loading its graph if none is held.
    pub fn load_types(&self, obj: &ObjectCore) -> ModelResult<Arc<Vec<String>>> {
        if let Some(types) = obj.cached_types() {
            return Ok(types);
        }
        self.load_model(obj, false, &TxContext::none())?;
        Ok(obj.derive_types())
    }

    /// Current version token of the resource holding `obj`'s graph.
    pub fn get_etag(&self, obj: &ObjectCore) -> ModelResult<Option<String>> {
        let head = self
            .store
            .head(obj.metadata_uri())
            .map_err(|e| ModelError::from_store(obj.pid(), e))?;
        Ok(head.etag.map(|e| strip_etag(&e)))
    }

    /// Pid of the object containing `obj`.
    ///
    /// Binaries are found through the has-file or manifest relation of the
    /// object that owns them; everything else carries its own member-of.
    pub fn get_parent_pid(&self, obj: &RepositoryObject) -> ModelResult<Pid> {
        match obj {
            RepositoryObject::Binary(binary) => self.owner_of_binary(binary),
            RepositoryObject::ContentRoot(_)
            | RepositoryObject::DepositRecord(_)
            | RepositoryObject::Tombstone(_) => Err(ModelError::TypeMismatch {
                pid: obj.pid().clone(),
                expected: "object with a parent".into(),
                found: obj.resource_type().to_string(),
            }),
            other => {
                let graph = other.core().graph()?;
                match graph.iris(other.uri(), vocab::pcdm::MEMBER_OF).first() {
                    Some(parent) => Ok(self.paths.pid_for(parent)?),
                    None => Err(ModelError::Orphaned(other.pid().clone())),
                }
            }
        }
    }

    fn owner_of_binary(&self, binary: &BinaryObject) -> ModelResult<Pid> {
        let target = Term::iri(binary.uri());
        for predicate in [vocab::pcdm::HAS_FILE, vocab::arbor::HAS_MANIFEST] {
            let owners = self.query.subjects_with(predicate, &target)?;
            if let Some(owner) = owners.first() {
                return Ok(self.paths.pid_for(owner)?);
            }
        }
        Err(ModelError::Orphaned(binary.pid().clone()))
    }

    /// Open the content of `binary`, optionally limited to `range`.
    pub fn get_binary_stream(
        &self,
        binary: &BinaryObject,
        range: Option<ByteRange>,
    ) -> ModelResult<BinaryStream> {
        debug!(pid = %binary.pid(), ?range, "opening binary");
        self.store
            .open_binary(binary.uri(), range)
            .map_err(|e| ModelError::from_store(binary.pid(), e))
    }

    /// Resolve the declared types of a loaded resource to its kind.
    pub(crate) fn resolve_kind(&self, obj: &ObjectCore) -> ModelResult<ResourceType> {
        let types = self.load_types(obj)?;
        match ResourceType::resolve(types.as_slice()) {
            Some(kind) if kind != ResourceType::Binary => Ok(kind),
            _ => Err(ModelError::UnresolvedType {
                pid: obj.pid().clone(),
                types: types.to_vec(),
            }),
        }
    }
}

impl std::fmt::Debug for ObjectDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectDriver")
            .field("base_uri", &self.paths.base_uri())
            .finish()
    }
}
