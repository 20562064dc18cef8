//! Creation of objects and all writes to their relationships.
//!
//! Every mutation is followed by invalidation of the touched objects, so a
//! caller observes its own writes on the next read.

use std::sync::Arc;

use tracing::{debug, info};

use arbor_store::{BinaryUpload, ObjectStore, StoreError};
use arbor_types::{
    vocab, Graph, GraphUpdate, Pid, PidQualifier, ResourceType, Statement, Term,
};

use crate::ancestors::AncestorPathResolver;
use crate::cache::ObjectCache;
use crate::driver::ObjectDriver;
use crate::error::{ModelError, ModelResult};
use crate::objects::{
    AdminUnit, BinaryObject, CollectionObject, ContentRootObject, DepositRecord, FileObject,
    FolderObject, RepositoryObject, TypedObject, WorkObject,
};

/// Auxiliary containers provisioned under a new object.
fn containers_for(kind: ResourceType) -> &'static [&'static str] {
    match kind {
        ResourceType::FileObject => &["md", "datafs"],
        ResourceType::DepositRecord => &["manifest"],
        ResourceType::Binary | ResourceType::Tombstone => &[],
        _ => &["md"],
    }
}

pub struct ObjectFactory {
    driver: Arc<ObjectDriver>,
    cache: Arc<ObjectCache>,
    ancestors: Arc<AncestorPathResolver>,
}

impl ObjectFactory {
    pub fn new(
        driver: Arc<ObjectDriver>,
        cache: Arc<ObjectCache>,
        ancestors: Arc<AncestorPathResolver>,
    ) -> Self {
        Self {
            driver,
            cache,
            ancestors,
        }
    }

    pub fn cache(&self) -> &Arc<ObjectCache> {
        &self.cache
    }

    fn store(&self) -> &Arc<dyn ObjectStore> {
        self.driver.store()
    }

    pub fn create_content_root(&self, graph: Option<Graph>) -> ModelResult<ContentRootObject> {
        self.create_object(Pid::content_root(), graph)
    }

    pub fn create_admin_unit(&self, pid: Option<Pid>, graph: Option<Graph>) -> ModelResult<AdminUnit> {
        self.create_object(content_pid(pid), graph)
    }

    pub fn create_collection(
        &self,
        pid: Option<Pid>,
        graph: Option<Graph>,
    ) -> ModelResult<CollectionObject> {
        self.create_object(content_pid(pid), graph)
    }

    pub fn create_folder(&self, pid: Option<Pid>, graph: Option<Graph>) -> ModelResult<FolderObject> {
        self.create_object(content_pid(pid), graph)
    }

    pub fn create_work(&self, pid: Option<Pid>, graph: Option<Graph>) -> ModelResult<WorkObject> {
        self.create_object(content_pid(pid), graph)
    }

    pub fn create_file_object(&self, pid: Option<Pid>, graph: Option<Graph>) -> ModelResult<FileObject> {
        self.create_object(content_pid(pid), graph)
    }

    pub fn create_deposit_record(
        &self,
        pid: Option<Pid>,
        graph: Option<Graph>,
    ) -> ModelResult<DepositRecord> {
        let pid = pid.unwrap_or_else(|| Pid::mint(PidQualifier::Deposit));
        self.create_object(pid, graph)
    }

    /// Write a new object of kind `T` at `pid`.
    ///
    /// Statements about the empty subject `""` are rebased onto the new
    /// object's URI, and the kind's types are added.
    fn create_object<T: TypedObject>(&self, pid: Pid, graph: Option<Graph>) -> ModelResult<T> {
        let kind = T::RESOURCE_TYPE;
        if pid.is_component() {
            return Err(ModelError::InvalidRelationship {
                pid,
                reason: format!("a {kind} cannot be created at a component path"),
            });
        }
        let uri = self.driver.paths().uri_for(&pid);
        if self.store().exists(&uri)? {
            return Err(ModelError::AlreadyExists(pid));
        }

        let mut graph = graph.unwrap_or_default();
        graph.rebase("", &uri);
        graph.add(&uri, vocab::rdf::TYPE, Term::iri(kind.type_uri()));
        if let Some(model_type) = kind.model_type_uri() {
            graph.add(&uri, vocab::rdf::TYPE, Term::iri(model_type));
        }
        self.store()
            .put_graph(&uri, &graph)
            .map_err(|e| ModelError::from_store(&pid, e))?;

        self.provision_into(&pid, &uri, kind)?;

        info!(%pid, %kind, "created object");
        self.cache.invalidate(&pid);
        self.cache.get_typed(&pid)
    }

    /// Create whichever auxiliary containers `object` is missing.
    ///
    /// Creation writes the object before its containers, so a failure in
    /// between leaves it without some of them; calling this completes it.
    pub fn provision_containers(&self, object: &RepositoryObject) -> ModelResult<()> {
        self.provision_into(object.pid(), object.uri(), object.resource_type())
    }

    fn provision_into(&self, pid: &Pid, uri: &str, kind: ResourceType) -> ModelResult<()> {
        for container in containers_for(kind) {
            let mut body = Graph::new();
            body.add("", vocab::rdf::TYPE, Term::iri(vocab::ldp::BASIC_CONTAINER));
            match self.store().post(uri, Some(container), &body) {
                Ok(_) | Err(StoreError::Conflict { .. }) => {}
                Err(e) => return Err(ModelError::from_store(pid, e)),
            }
        }
        Ok(())
    }

    /// Make `child` a member of `parent`, replacing any previous parent.
    ///
    /// Type rules are enforced by the containers' own `add_member`.
    pub fn add_member(&self, parent: &RepositoryObject, child: &RepositoryObject) -> ModelResult<()> {
        self.create_exclusive_relationship(child, vocab::pcdm::MEMBER_OF, Term::iri(parent.uri()))?;
        self.ancestors.invalidate(child.pid());
        self.touched(parent);
        debug!(parent = %parent.pid(), child = %child.pid(), "added member");
        Ok(())
    }

    /// Add a statement about `subject`.
    pub fn create_relationship(
        &self,
        subject: &RepositoryObject,
        property: &str,
        value: Term,
    ) -> ModelResult<()> {
        let update = GraphUpdate::new().insert(Statement::new(subject.uri(), property, value));
        self.apply(subject, &update)
    }

    /// Replace every value of `property` on `subject` with `value`.
    ///
    /// The current values are read fresh from the store and then replaced
    /// in one update; concurrent writers to the same property can still
    /// race between the read and the write.
    pub fn create_exclusive_relationship(
        &self,
        subject: &RepositoryObject,
        property: &str,
        value: Term,
    ) -> ModelResult<()> {
        let current = self.current_values(subject, property)?;
        let update = GraphUpdate::new()
            .delete_all(current)
            .insert(Statement::new(subject.uri(), property, value));
        self.apply(subject, &update)
    }

    /// Remove every value of `property` on `subject`.
    pub fn delete_property(&self, subject: &RepositoryObject, property: &str) -> ModelResult<()> {
        let current = self.current_values(subject, property)?;
        if current.is_empty() {
            return Ok(());
        }
        self.apply(subject, &GraphUpdate::new().delete_all(current))
    }

    fn current_values(&self, subject: &RepositoryObject, property: &str) -> ModelResult<Vec<Statement>> {
        let response = self
            .store()
            .get_graph(subject.core().metadata_uri())
            .map_err(|e| ModelError::from_store(subject.pid(), e))?;
        Ok(response.graph.property_statements(subject.uri(), property))
    }

    fn apply(&self, subject: &RepositoryObject, update: &GraphUpdate) -> ModelResult<()> {
        self.store()
            .patch(subject.core().metadata_uri(), update)
            .map_err(|e| ModelError::from_store(subject.pid(), e))?;
        self.touched(subject);
        Ok(())
    }

    /// Mark `object` stale and drop it from the caches.
    fn touched(&self, object: &RepositoryObject) {
        object.core().mark_for_refresh();
        self.cache.invalidate(object.pid());
    }

    /// Create a binary at `pid`. Fails if one already exists.
    pub fn create_binary(&self, pid: &Pid, upload: BinaryUpload) -> ModelResult<BinaryObject> {
        let uri = self.driver.paths().uri_for(pid);
        if self.store().exists(&uri)? {
            return Err(ModelError::AlreadyExists(pid.clone()));
        }
        self.write_binary(pid, &uri, &upload)
    }

    /// Replace the content of the existing binary at `pid`.
    pub fn update_binary(&self, pid: &Pid, upload: BinaryUpload) -> ModelResult<BinaryObject> {
        let uri = self.driver.paths().uri_for(pid);
        if !self.store().exists(&uri)? {
            return Err(ModelError::NotFound(pid.clone()));
        }
        self.write_binary(pid, &uri, &upload)
    }

    pub fn create_or_update_binary(&self, pid: &Pid, upload: BinaryUpload) -> ModelResult<BinaryObject> {
        let uri = self.driver.paths().uri_for(pid);
        self.write_binary(pid, &uri, &upload)
    }

    fn write_binary(&self, pid: &Pid, uri: &str, upload: &BinaryUpload) -> ModelResult<BinaryObject> {
        match self.store().put_binary(uri, upload) {
            Ok(_) => {}
            Err(StoreError::ChecksumMismatch { detail, .. }) => {
                return Err(ModelError::ChecksumMismatch {
                    pid: pid.clone(),
                    detail,
                })
            }
            Err(e) => return Err(ModelError::from_store(pid, e)),
        }
        info!(%pid, "stored binary");
        self.cache.invalidate(pid);
        self.ancestors.invalidate(pid);
        self.cache.get_binary(pid)
    }
}

impl std::fmt::Debug for ObjectFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectFactory").finish_non_exhaustive()
    }
}

fn content_pid(pid: Option<Pid>) -> Pid {
    pid.unwrap_or_else(|| Pid::mint(PidQualifier::Content))
}
