//! Wiring of the object layer over a store and query service.

use std::sync::Arc;

use tracing::info;

use arbor_store::{HttpObjectStore, HttpQueryService, InMemoryObjectStore, ObjectStore, QueryService};
use arbor_types::{Pid, RepositoryPaths};

use crate::ancestors::AncestorPathResolver;
use crate::cache::ObjectCache;
use crate::config::ArborConfig;
use crate::derivatives::DerivativeService;
use crate::driver::ObjectDriver;
use crate::error::{ModelError, ModelResult};
use crate::factory::ObjectFactory;
use crate::membership::MembershipService;
use crate::objects::{ContentRootObject, RepositoryObject};

/// One shared instance of every service, built from an [`ArborConfig`].
pub struct Repository {
    config: ArborConfig,
    driver: Arc<ObjectDriver>,
    cache: Arc<ObjectCache>,
    ancestors: Arc<AncestorPathResolver>,
    factory: ObjectFactory,
    membership: MembershipService,
    derivatives: DerivativeService,
}

impl Repository {
    pub fn new(
        config: ArborConfig,
        store: Arc<dyn ObjectStore>,
        query: Arc<dyn QueryService>,
    ) -> Self {
        let paths = config.store.paths();
        let driver = Arc::new(ObjectDriver::new(store, query.clone(), paths.clone()));
        let cache = Arc::new(ObjectCache::new(driver.clone(), config.cache.clone()));
        let ancestors = Arc::new(AncestorPathResolver::new(
            query.clone(),
            paths.clone(),
            config.ancestors.clone(),
        ));
        let factory = ObjectFactory::new(driver.clone(), cache.clone(), ancestors.clone());
        let membership = MembershipService::new(query, paths);
        let derivatives = DerivativeService::new(config.derivatives.root.clone());
        Self {
            config,
            driver,
            cache,
            ancestors,
            factory,
            membership,
            derivatives,
        }
    }

    /// Backed by an [`InMemoryObjectStore`], which is also returned.
    pub fn in_memory(config: ArborConfig) -> (Self, Arc<InMemoryObjectStore>) {
        let store = Arc::new(InMemoryObjectStore::new());
        let repo = Self::new(config, store.clone(), store.clone());
        (repo, store)
    }

    /// Backed by the HTTP store and query endpoint named in `config`.
    pub fn connect(config: ArborConfig) -> ModelResult<Self> {
        config.validate()?;
        let timeout = config.store.request_timeout();
        let store = Arc::new(HttpObjectStore::new(timeout)?);
        let query = Arc::new(HttpQueryService::new(&config.store.query_endpoint, timeout)?);
        info!(base_uri = %config.store.base_uri, "connected to repository");
        Ok(Self::new(config, store, query))
    }

    pub fn config(&self) -> &ArborConfig {
        &self.config
    }

    pub fn paths(&self) -> &RepositoryPaths {
        self.driver.paths()
    }

    pub fn driver(&self) -> &Arc<ObjectDriver> {
        &self.driver
    }

    pub fn cache(&self) -> &Arc<ObjectCache> {
        &self.cache
    }

    pub fn ancestors(&self) -> &Arc<AncestorPathResolver> {
        &self.ancestors
    }

    pub fn factory(&self) -> &ObjectFactory {
        &self.factory
    }

    pub fn membership(&self) -> &MembershipService {
        &self.membership
    }

    pub fn derivatives(&self) -> &DerivativeService {
        &self.derivatives
    }

    pub fn get(&self, pid: &Pid) -> ModelResult<RepositoryObject> {
        self.cache.get(pid)
    }

    /// The content root, created on first use.
    pub fn content_root(&self) -> ModelResult<ContentRootObject> {
        let pid = Pid::content_root();
        match self.cache.get_content_root(&pid) {
            Err(ModelError::NotFound(_)) => self.factory.create_content_root(None),
            other => other,
        }
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("base_uri", &self.config.store.base_uri)
            .field("cache", &self.cache)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    use arbor_store::{BinaryUpload, ByteRange};
    use arbor_types::{vocab, Digest, DigestAlgorithm, Graph, ResourceType, Term};

    use crate::context::TxContext;
    use crate::event_log::PremisEvent;
    use crate::objects::{AdminUnit, CollectionObject, FolderObject, WorkObject};

    fn repo() -> (Repository, Arc<InMemoryObjectStore>) {
        Repository::in_memory(ArborConfig::default())
    }

    struct Tree {
        root: ContentRootObject,
        unit: AdminUnit,
        collection: CollectionObject,
        folder: FolderObject,
        work: WorkObject,
    }

    fn tree(repo: &Repository) -> Tree {
        let f = repo.factory();
        let root = repo.content_root().unwrap();
        let unit = f.create_admin_unit(None, None).unwrap();
        root.add_member(f, &unit.to_object()).unwrap();
        let collection = f.create_collection(None, None).unwrap();
        unit.add_member(f, &collection.to_object()).unwrap();
        let folder = f.create_folder(None, None).unwrap();
        collection.add_member(f, &folder.to_object()).unwrap();
        let work = f.create_work(None, None).unwrap();
        folder.add_member(f, &work.to_object()).unwrap();
        Tree {
            root,
            unit,
            collection,
            folder,
            work,
        }
    }

    #[test]
    fn content_root_is_created_once() {
        let (repo, _store) = repo();
        let a = repo.content_root().unwrap();
        let b = repo.content_root().unwrap();
        assert!(a.to_object().same_instance(&b.to_object()));
        assert!(a.pid().is_content_root());
    }

    #[test]
    fn containment_rules_are_enforced() {
        let (repo, _store) = repo();
        let f = repo.factory();
        let t = tree(&repo);

        let work = f.create_work(None, None).unwrap();
        let err = t.unit.add_member(f, &work.to_object()).unwrap_err();
        match err {
            ModelError::TypeMismatch { pid, found, .. } => {
                assert_eq!(&pid, t.unit.pid());
                assert!(found.contains("Work"));
            }
            other => panic!("unexpected error {other:?}"),
        }

        let collection = f.create_collection(None, None).unwrap();
        assert!(t.root.add_member(f, &collection.to_object()).unwrap_err().is_type_mismatch());
        assert!(t.work.add_member(f, &work.to_object()).unwrap_err().is_type_mismatch());
        let nested = f.create_folder(None, None).unwrap();
        assert!(t.folder.add_member(f, &nested.to_object()).is_ok());

        let file = f.create_file_object(None, None).unwrap();
        assert!(t.unit.add_member(f, &file.to_object()).unwrap_err().is_type_mismatch());
        assert!(t.folder.add_member(f, &file.to_object()).unwrap_err().is_type_mismatch());
        assert!(matches!(
            repo.cache().get_parent(&file.to_object()),
            Err(ModelError::Orphaned(_))
        ));

        let loose = f.create_work(None, None).unwrap();
        assert!(t.folder.add_member(f, &loose.to_object()).is_ok());
        loose.add_member(f, &file.to_object()).unwrap();
        let parent = repo.cache().get_parent(&file.to_object()).unwrap();
        assert_eq!(parent.pid(), loose.pid());
    }

    #[test]
    fn ancestors_follow_the_tree() {
        let (repo, _store) = repo();
        let t = tree(&repo);
        let path = repo.ancestors().get_ancestor_pids(t.work.pid()).unwrap();
        assert_eq!(
            path,
            vec![
                t.root.pid().clone(),
                t.unit.pid().clone(),
                t.collection.pid().clone(),
                t.folder.pid().clone(),
            ]
        );
    }

    #[test]
    fn add_member_moves_between_containers() {
        let (repo, _store) = repo();
        let f = repo.factory();
        let t = tree(&repo);
        repo.ancestors().get_ancestor_pids(t.work.pid()).unwrap();

        let other = f.create_folder(None, None).unwrap();
        t.collection.add_member(f, &other.to_object()).unwrap();
        other.add_member(f, &t.work.to_object()).unwrap();

        let parent = repo.cache().get_parent(&t.work.to_object()).unwrap();
        assert_eq!(parent.pid(), other.pid());
        assert!(repo.membership().list_members(t.folder.pid()).unwrap().is_empty());
        let path = repo.ancestors().get_ancestor_pids(t.work.pid()).unwrap();
        assert_eq!(path.last(), Some(other.pid()));
    }

    #[test]
    fn work_primary_object_scenario() {
        let (repo, _store) = repo();
        let f = repo.factory();
        let t = tree(&repo);

        let file = f.create_file_object(None, None).unwrap();
        t.work.add_member(f, &file.to_object()).unwrap();
        t.work.set_primary_object(f, file.pid()).unwrap();

        let work = repo.cache().get_work(t.work.pid()).unwrap();
        let primary = work.primary_object(repo.cache()).unwrap().unwrap();
        assert_eq!(primary.pid(), file.pid());
        assert_eq!(primary.parent_work(repo.cache()).unwrap().pid(), work.pid());

        let stranger = f.create_file_object(None, None).unwrap();
        let err = work.set_primary_object(f, stranger.pid()).unwrap_err();
        assert!(matches!(err, ModelError::InvalidRelationship { .. }));

        let second = f.create_file_object(None, None).unwrap();
        work.add_member(f, &second.to_object()).unwrap();
        work.set_primary_object(f, second.pid()).unwrap();
        let g = work.core().graph().unwrap();
        assert_eq!(g.iris(work.uri(), vocab::arbor::PRIMARY_OBJECT), vec![second.uri()]);

        work.clear_primary_object(f).unwrap();
        assert!(work.primary_object(repo.cache()).unwrap().is_none());
    }

    #[test]
    fn member_order_drives_ordered_members() {
        let (repo, _store) = repo();
        let f = repo.factory();
        let t = tree(&repo);
        let files: Vec<_> = (0..3)
            .map(|_| {
                let file = f.create_file_object(None, None).unwrap();
                t.work.add_member(f, &file.to_object()).unwrap();
                file.pid().clone()
            })
            .collect();

        assert!(t.work.member_order().unwrap().is_empty());
        t.work
            .set_member_order(f, &[files[2].clone(), files[0].clone()])
            .unwrap();
        assert_eq!(t.work.member_order().unwrap(), vec![files[2].clone(), files[0].clone()]);

        let ordered = repo.membership().ordered_members(&t.work).unwrap();
        assert_eq!(ordered[..2], [files[2].clone(), files[0].clone()]);
        assert_eq!(ordered[2], files[1]);
        assert_eq!(repo.membership().count_members(t.work.pid()).unwrap(), 3);
    }

    #[test]
    fn data_file_round_trip() {
        let (repo, _store) = repo();
        let f = repo.factory();
        let t = tree(&repo);
        let content = b"0123456789";
        let upload = BinaryUpload::inline(&content[..])
            .with_filename("digits.txt")
            .with_mimetype("text/plain")
            .with_digest(Digest::compute(DigestAlgorithm::Sha256, content));

        let file = t.work.add_data_file(f, upload).unwrap();
        let original = file.original_file(repo.cache()).unwrap().unwrap();
        assert_eq!(original.filename().unwrap().as_deref(), Some("digits.txt"));
        assert_eq!(original.mimetype().unwrap().as_deref(), Some("text/plain"));
        assert_eq!(original.size().unwrap(), Some(10));
        assert!(original
            .digests()
            .unwrap()
            .contains(&Digest::compute(DigestAlgorithm::Sha256, content)));
        assert_eq!(original.read_to_vec().unwrap(), content);

        let mut partial = String::new();
        original
            .open_stream(Some(ByteRange::new(2, Some(4))))
            .unwrap()
            .read_to_string(&mut partial)
            .unwrap();
        assert_eq!(partial, "234");

        let parent = repo.cache().get_parent(&original.to_object()).unwrap();
        assert_eq!(parent.pid(), file.pid());
        assert_eq!(file.binary_objects(repo.cache()).unwrap().len(), 1);

        let path = repo.ancestors().get_ancestor_pids(original.pid()).unwrap();
        assert_eq!(path.last(), Some(file.pid()));
        assert_eq!(path.first(), Some(t.root.pid()));
    }

    #[test]
    fn bad_checksum_leaves_nothing_behind() {
        let (repo, _store) = repo();
        let f = repo.factory();
        let file = f.create_file_object(None, None).unwrap();
        let upload = BinaryUpload::inline(&b"data"[..])
            .with_digest(Digest::compute(DigestAlgorithm::Sha256, b"not the data"));
        let err = file.add_original_file(f, upload).unwrap_err();
        assert!(matches!(err, ModelError::ChecksumMismatch { .. }));
        assert!(file.original_file(repo.cache()).unwrap().is_none());
    }

    #[test]
    fn derivative_datastreams_are_not_stored_in_the_repository() {
        let (repo, _store) = repo();
        let f = repo.factory();
        let file = f.create_file_object(None, None).unwrap();
        let err = file
            .add_binary(f, arbor_types::DatastreamType::ThumbnailSmall, BinaryUpload::inline(&b"x"[..]))
            .unwrap_err();
        assert!(matches!(err, ModelError::UnsupportedDatastream { .. }));
    }

    #[test]
    fn deposit_record_manifests() {
        let (repo, _store) = repo();
        let f = repo.factory();
        let record = f.create_deposit_record(None, None).unwrap();
        let manifest = record
            .add_manifest(f, "mets.xml", BinaryUpload::inline(&b"<mets/>"[..]))
            .unwrap();

        let manifests = record.manifests(repo.cache()).unwrap();
        assert_eq!(manifests.len(), 1);
        assert_eq!(manifests[0].pid(), manifest.pid());
        let parent = repo.cache().get_parent(&manifest.to_object()).unwrap();
        assert_eq!(parent.resource_type(), ResourceType::DepositRecord);
        assert!(repo
            .cache()
            .get_parent(&record.to_object())
            .unwrap_err()
            .is_type_mismatch());
    }

    #[test]
    fn unparented_file_is_orphaned() {
        let (repo, _store) = repo();
        let file = repo.factory().create_file_object(None, None).unwrap();
        assert!(matches!(
            file.parent_work(repo.cache()),
            Err(ModelError::Orphaned(_))
        ));
    }

    #[test]
    fn tombstones_are_reported_by_typed_access() {
        let (repo, store) = repo();
        let work = repo.factory().create_work(None, None).unwrap();
        let uri = work.uri().to_string();

        let mut g = Graph::new();
        g.add(&uri, vocab::rdf::TYPE, Term::iri(vocab::arbor::TOMBSTONE));
        g.add(&uri, vocab::arbor::ORIGINAL_TYPE, Term::iri(vocab::arbor::WORK));
        store.put_graph(&uri, &g).unwrap();
        repo.cache().invalidate(work.pid());

        let object = repo.get(work.pid()).unwrap();
        let RepositoryObject::Tombstone(tombstone) = object else {
            panic!("expected a tombstone");
        };
        assert_eq!(tombstone.original_types().unwrap(), vec![vocab::arbor::WORK.to_string()]);
        assert!(matches!(
            repo.cache().get_work(work.pid()),
            Err(ModelError::TombstoneFound(_))
        ));
    }

    #[test]
    fn checked_graph_sees_external_writes() {
        let (repo, store) = repo();
        let work = repo.factory().create_work(None, None).unwrap();
        let cached = repo.get(work.pid()).unwrap();
        cached.core().graph().unwrap();

        let uri = work.uri().to_string();
        let mut g = (*cached.core().graph().unwrap()).clone();
        g.add(&uri, vocab::arbor::TITLE, Term::literal("edited elsewhere"));
        store.put_graph(&uri, &g).unwrap();

        assert!(cached.core().graph().unwrap().literal(&uri, vocab::arbor::TITLE).is_none());
        let fresh = cached.core().graph_checked(&TxContext::none()).unwrap();
        assert_eq!(fresh.literal(&uri, vocab::arbor::TITLE), Some("edited elsewhere"));
    }

    #[test]
    fn event_log_is_per_object() {
        let (repo, _store) = repo();
        let work = repo.factory().create_work(None, None).unwrap();
        work.core()
            .event_log()
            .record(&PremisEvent::new("creation").with_agent("tester"))
            .unwrap();
        let events = repo.get(work.pid()).unwrap().core().event_log().events().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "creation");
    }

    #[test]
    fn connect_builds_http_clients() {
        let repo = Repository::connect(ArborConfig::default()).unwrap();
        assert_eq!(repo.paths().base_uri(), "http://localhost:8080/rest");
    }
}
