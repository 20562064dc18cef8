//! In-memory stand-in for the remote object store and query service.
//!
//! [`InMemoryObjectStore`] keeps every resource in a `HashMap` behind a
//! `RwLock` and behaves like the remote store where it matters to callers:
//! version tokens change on every write, server-managed timestamps are
//! maintained, binaries get a description resource, uploads are checksum
//! verified, and the aggregate of all graphs answers pattern queries.
//! Request counters, an availability switch and an artificial latency make
//! it usable as a test double for caching and failure behavior.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use bytes::Bytes;
use chrono::{SecondsFormat, Utc};
use tracing::debug;

use arbor_types::{
    vocab, Digest, Graph, GraphUpdate, Statement, Term, TriplePattern, DESCRIPTION_SUFFIX,
};

use crate::error::{StoreError, StoreResult};
use crate::traits::{
    BinaryContent, BinaryStream, BinaryUpload, ByteRange, GraphResponse, ObjectStore,
    QueryService, ResourceHead, ResourceKind,
};

enum StoredResource {
    Rdf {
        graph: Graph,
        etag: String,
    },
    Binary {
        content: BinaryContent,
        length: u64,
        description: Graph,
        etag: String,
    },
}

/// Snapshot of how many requests of each kind the store has served.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequestCounts {
    pub head: u64,
    pub get: u64,
    pub put: u64,
    pub post: u64,
    pub patch: u64,
    pub open: u64,
    pub query: u64,
}

#[derive(Default)]
struct Counters {
    head: AtomicU64,
    get: AtomicU64,
    put: AtomicU64,
    post: AtomicU64,
    patch: AtomicU64,
    open: AtomicU64,
    query: AtomicU64,
}

/// In-memory object store and query service.
pub struct InMemoryObjectStore {
    resources: RwLock<HashMap<String, StoredResource>>,
    revision: AtomicU64,
    counters: Counters,
    available: AtomicBool,
    latency_ms: AtomicU64,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self {
            resources: RwLock::new(HashMap::new()),
            revision: AtomicU64::new(0),
            counters: Counters::default(),
            available: AtomicBool::new(true),
            latency_ms: AtomicU64::new(0),
        }
    }

    /// Number of resources held, not counting binary descriptions.
    pub fn len(&self) -> usize {
        self.resources.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Simulate the store going down (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Delay every request by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn request_counts(&self) -> RequestCounts {
        let c = &self.counters;
        RequestCounts {
            head: c.head.load(Ordering::SeqCst),
            get: c.get.load(Ordering::SeqCst),
            put: c.put.load(Ordering::SeqCst),
            post: c.post.load(Ordering::SeqCst),
            patch: c.patch.load(Ordering::SeqCst),
            open: c.open.load(Ordering::SeqCst),
            query: c.query.load(Ordering::SeqCst),
        }
    }

    /// Drop a resource outright, as an external process might.
    pub fn remove(&self, uri: &str) -> bool {
        self.resources
            .write()
            .expect("lock poisoned")
            .remove(uri)
            .is_some()
    }

    fn enter(&self, counter: &AtomicU64) -> StoreResult<()> {
        counter.fetch_add(1, Ordering::SeqCst);
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            std::thread::sleep(Duration::from_millis(latency));
        }
        if !self.available.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store switched off".into()));
        }
        Ok(())
    }

    fn next_etag(&self, uri: &str) -> String {
        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
        let mut hasher = blake3::Hasher::new();
        hasher.update(uri.as_bytes());
        hasher.update(&revision.to_be_bytes());
        let hex = hasher.finalize().to_hex();
        format!("\"{}\"", &hex.as_str()[..16])
    }

    /// Replace server-managed statements: keep `created`, bump `lastModified`.
    fn stamp(graph: &mut Graph, subject: &str, created: Option<Term>) {
        let now = Term::typed_literal(
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            vocab::xsd::DATE_TIME,
        );
        graph.remove_property(subject, vocab::fedora::CREATED);
        graph.remove_property(subject, vocab::fedora::LAST_MODIFIED);
        graph.add(subject, vocab::fedora::CREATED, created.unwrap_or_else(|| now.clone()));
        graph.add(subject, vocab::fedora::LAST_MODIFIED, now);
    }

    fn read_external(uri: &str) -> StoreResult<Vec<u8>> {
        let path = uri.strip_prefix("file://").ok_or_else(|| {
            StoreError::InvalidRequest(format!("unsupported external content uri {uri}"))
        })?;
        Ok(std::fs::read(path)?)
    }

    fn binary_uri(uri: &str) -> Option<&str> {
        uri.strip_suffix(DESCRIPTION_SUFFIX)
            .and_then(|u| u.strip_suffix('/'))
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn head(&self, uri: &str) -> StoreResult<ResourceHead> {
        self.enter(&self.counters.head)?;
        let map = self.resources.read().expect("lock poisoned");
        if let Some(binary_uri) = Self::binary_uri(uri) {
            if let Some(StoredResource::Binary { etag, .. }) = map.get(binary_uri) {
                return Ok(ResourceHead {
                    uri: uri.to_string(),
                    kind: ResourceKind::Rdf,
                    etag: Some(etag.clone()),
                    described_by: None,
                    content_location: None,
                    content_length: None,
                });
            }
        }
        match map.get(uri) {
            Some(StoredResource::Rdf { etag, .. }) => Ok(ResourceHead {
                uri: uri.to_string(),
                kind: ResourceKind::Rdf,
                etag: Some(etag.clone()),
                described_by: None,
                content_location: None,
                content_length: None,
            }),
            Some(StoredResource::Binary {
                content,
                length,
                etag,
                ..
            }) => Ok(ResourceHead {
                uri: uri.to_string(),
                kind: ResourceKind::Binary,
                etag: Some(etag.clone()),
                described_by: Some(format!("{uri}/{DESCRIPTION_SUFFIX}")),
                content_location: match content {
                    BinaryContent::External(location) => Some(location.clone()),
                    BinaryContent::Inline(_) => None,
                },
                content_length: Some(*length),
            }),
            None => Err(StoreError::NotFound(uri.to_string())),
        }
    }

    fn get_graph(&self, uri: &str) -> StoreResult<GraphResponse> {
        self.enter(&self.counters.get)?;
        let map = self.resources.read().expect("lock poisoned");
        if let Some(binary_uri) = Self::binary_uri(uri) {
            if let Some(StoredResource::Binary {
                description, etag, ..
            }) = map.get(binary_uri)
            {
                return Ok(GraphResponse {
                    graph: description.clone(),
                    etag: Some(etag.clone()),
                });
            }
        }
        match map.get(uri) {
            Some(StoredResource::Rdf { graph, etag }) => Ok(GraphResponse {
                graph: graph.clone(),
                etag: Some(etag.clone()),
            }),
            Some(StoredResource::Binary { .. }) => Err(StoreError::InvalidRequest(format!(
                "{uri} is a binary; request its description instead"
            ))),
            None => Err(StoreError::NotFound(uri.to_string())),
        }
    }

    fn put_graph(&self, uri: &str, graph: &Graph) -> StoreResult<ResourceHead> {
        self.enter(&self.counters.put)?;
        let etag = self.next_etag(uri);
        let mut map = self.resources.write().expect("lock poisoned");
        let created = match map.get(uri) {
            Some(StoredResource::Rdf { graph, .. }) => {
                graph.first_object(uri, vocab::fedora::CREATED).cloned()
            }
            Some(StoredResource::Binary { .. }) => {
                return Err(StoreError::Conflict {
                    uri: uri.to_string(),
                    detail: "cannot replace a binary with an RDF resource".into(),
                })
            }
            None => None,
        };
        let mut graph = graph.clone();
        graph.add(uri, vocab::rdf::TYPE, Term::iri(vocab::ldp::RDF_SOURCE));
        Self::stamp(&mut graph, uri, created);
        debug!(uri, statements = graph.len(), "stored graph");
        map.insert(
            uri.to_string(),
            StoredResource::Rdf {
                graph,
                etag: etag.clone(),
            },
        );
        Ok(ResourceHead {
            uri: uri.to_string(),
            kind: ResourceKind::Rdf,
            etag: Some(etag),
            described_by: None,
            content_location: None,
            content_length: None,
        })
    }

    fn post(&self, container: &str, slug: Option<&str>, graph: &Graph) -> StoreResult<String> {
        self.enter(&self.counters.post)?;
        let container = container.trim_end_matches('/');
        let name = match slug {
            Some(slug) => slug.to_string(),
            None => uuid::Uuid::new_v4().to_string(),
        };
        let uri = format!("{container}/{name}");
        // Statements about the empty subject describe the new resource.
        let mut graph = graph.clone();
        graph.rebase("", &uri);
        let etag = self.next_etag(&uri);
        Self::stamp(&mut graph, &uri, None);
        graph.add(&uri, vocab::rdf::TYPE, Term::iri(vocab::ldp::RDF_SOURCE));

        let mut map = self.resources.write().expect("lock poisoned");
        if map.contains_key(&uri) {
            return Err(StoreError::Conflict {
                uri,
                detail: "resource already exists".into(),
            });
        }
        map.insert(uri.clone(), StoredResource::Rdf { graph, etag });
        Ok(uri)
    }

    fn patch(&self, uri: &str, update: &GraphUpdate) -> StoreResult<()> {
        self.enter(&self.counters.patch)?;
        let new_etag = self.next_etag(uri);
        let mut map = self.resources.write().expect("lock poisoned");
        if let Some(binary_uri) = Self::binary_uri(uri) {
            if let Some(StoredResource::Binary {
                description, etag, ..
            }) = map.get_mut(binary_uri)
            {
                description.apply(update);
                *etag = new_etag;
                return Ok(());
            }
        }
        match map.get_mut(uri) {
            Some(StoredResource::Rdf { graph, etag }) => {
                let created = graph.first_object(uri, vocab::fedora::CREATED).cloned();
                graph.apply(update);
                Self::stamp(graph, uri, created);
                *etag = new_etag;
                debug!(
                    uri,
                    deleted = update.delete.len(),
                    inserted = update.insert.len(),
                    "patched graph"
                );
                Ok(())
            }
            Some(StoredResource::Binary { .. }) => Err(StoreError::InvalidRequest(format!(
                "{uri} is a binary; patch its description instead"
            ))),
            None => Err(StoreError::NotFound(uri.to_string())),
        }
    }

    fn put_binary(&self, uri: &str, upload: &BinaryUpload) -> StoreResult<ResourceHead> {
        self.enter(&self.counters.put)?;
        let data: Bytes = match &upload.content {
            BinaryContent::Inline(bytes) => bytes.clone(),
            BinaryContent::External(location) => Bytes::from(Self::read_external(location)?),
        };
        for digest in &upload.digests {
            if !digest.verify(&data) {
                let actual = Digest::compute(digest.algorithm, &data);
                return Err(StoreError::ChecksumMismatch {
                    uri: uri.to_string(),
                    detail: format!("expected {}, computed {}", digest, actual),
                });
            }
        }

        let etag = self.next_etag(uri);
        let mut map = self.resources.write().expect("lock poisoned");
        let created = match map.get(uri) {
            Some(StoredResource::Binary { description, .. }) => {
                description.first_object(uri, vocab::fedora::CREATED).cloned()
            }
            Some(StoredResource::Rdf { .. }) => {
                return Err(StoreError::Conflict {
                    uri: uri.to_string(),
                    detail: "cannot replace an RDF resource with a binary".into(),
                })
            }
            None => None,
        };

        let length = data.len() as u64;
        let mut description = Graph::new();
        description.add(uri, vocab::rdf::TYPE, Term::iri(vocab::fedora::BINARY));
        description.add(uri, vocab::rdf::TYPE, Term::iri(vocab::ldp::NON_RDF_SOURCE));
        description.add(
            uri,
            vocab::premis::HAS_SIZE,
            Term::typed_literal(length.to_string(), vocab::xsd::LONG),
        );
        if let Some(filename) = &upload.filename {
            description.add(uri, vocab::ebucore::FILENAME, Term::literal(filename));
        }
        let mimetype = upload
            .mimetype
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());
        description.add(uri, vocab::ebucore::MIME_TYPE, Term::literal(mimetype));
        // The store records a sha256 for every binary, plus whatever was supplied.
        let mut digests = upload.digests.clone();
        if !digests
            .iter()
            .any(|d| d.algorithm == arbor_types::DigestAlgorithm::Sha256)
        {
            digests.push(Digest::compute(arbor_types::DigestAlgorithm::Sha256, &data));
        }
        for digest in digests {
            description.add(uri, vocab::premis::HAS_MESSAGE_DIGEST, Term::iri(digest.to_urn()));
        }
        Self::stamp(&mut description, uri, created);

        let content = match &upload.content {
            BinaryContent::Inline(_) => BinaryContent::Inline(data),
            external @ BinaryContent::External(_) => external.clone(),
        };
        let content_location = match &content {
            BinaryContent::External(location) => Some(location.clone()),
            BinaryContent::Inline(_) => None,
        };
        debug!(uri, length, "stored binary");
        map.insert(
            uri.to_string(),
            StoredResource::Binary {
                content,
                length,
                description,
                etag: etag.clone(),
            },
        );
        Ok(ResourceHead {
            uri: uri.to_string(),
            kind: ResourceKind::Binary,
            etag: Some(etag),
            described_by: Some(format!("{uri}/{DESCRIPTION_SUFFIX}")),
            content_location,
            content_length: Some(length),
        })
    }

    fn open_binary(&self, uri: &str, range: Option<ByteRange>) -> StoreResult<BinaryStream> {
        self.enter(&self.counters.open)?;
        let map = self.resources.read().expect("lock poisoned");
        let (content, length) = match map.get(uri) {
            Some(StoredResource::Binary {
                content, length, ..
            }) => (content.clone(), *length),
            Some(StoredResource::Rdf { .. }) => {
                return Err(StoreError::InvalidRequest(format!("{uri} is not a binary")))
            }
            None => return Err(StoreError::NotFound(uri.to_string())),
        };
        drop(map);

        let (start, span) = match range {
            Some(r) if r.start > 0 && r.start >= length => {
                return Err(StoreError::RangeNotSatisfiable {
                    uri: uri.to_string(),
                    start: r.start,
                    length,
                })
            }
            Some(r) => (r.start, r.span(length)),
            None => (0, length),
        };

        match content {
            BinaryContent::Inline(bytes) => {
                let slice = bytes.slice(start as usize..(start + span) as usize);
                Ok(Box::new(Cursor::new(slice)))
            }
            BinaryContent::External(location) => {
                let path = location.strip_prefix("file://").ok_or_else(|| {
                    StoreError::InvalidRequest(format!("unsupported external content uri {location}"))
                })?;
                let mut file = File::open(path)?;
                file.seek(SeekFrom::Start(start))?;
                Ok(Box::new(file.take(span)))
            }
        }
    }
}

impl QueryService for InMemoryObjectStore {
    fn find(&self, pattern: &TriplePattern) -> StoreResult<Vec<Statement>> {
        self.enter(&self.counters.query)?;
        let map = self.resources.read().expect("lock poisoned");
        let mut found: Vec<Statement> = map
            .values()
            .flat_map(|resource| {
                let graph = match resource {
                    StoredResource::Rdf { graph, .. } => graph,
                    StoredResource::Binary { description, .. } => description,
                };
                graph.matching(pattern).cloned().collect::<Vec<_>>()
            })
            .collect();
        found.sort();
        Ok(found)
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("resource_count", &self.len())
            .field("available", &self.available.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_types::DigestAlgorithm;
    use std::io::Write;

    const URI: &str = "http://repo/content/a";

    fn typed_graph(subject: &str, type_uri: &str) -> Graph {
        let mut g = Graph::new();
        g.add(subject, vocab::rdf::TYPE, Term::iri(type_uri));
        g
    }

    fn read_all(mut stream: BinaryStream) -> Vec<u8> {
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).unwrap();
        buf
    }

    #[test]
    fn put_then_head_and_get() {
        let store = InMemoryObjectStore::new();
        let head = store.put_graph(URI, &typed_graph(URI, vocab::arbor::WORK)).unwrap();
        assert_eq!(head.kind, ResourceKind::Rdf);

        let probed = store.head(URI).unwrap();
        assert_eq!(probed.etag, head.etag);
        let response = store.get_graph(URI).unwrap();
        assert!(response.graph.has_type(URI, vocab::arbor::WORK));
        assert!(response.graph.first_object(URI, vocab::fedora::CREATED).is_some());
    }

    #[test]
    fn etag_is_quoted_and_changes_on_write() {
        let store = InMemoryObjectStore::new();
        let first = store.put_graph(URI, &Graph::new()).unwrap().etag.unwrap();
        assert!(first.starts_with('"') && first.ends_with('"'));
        store
            .patch(
                URI,
                &GraphUpdate::new().insert(Statement::new(URI, vocab::arbor::TITLE, Term::literal("t"))),
            )
            .unwrap();
        let second = store.head(URI).unwrap().etag.unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn replace_keeps_created() {
        let store = InMemoryObjectStore::new();
        store.put_graph(URI, &Graph::new()).unwrap();
        let created = store
            .get_graph(URI)
            .unwrap()
            .graph
            .first_object(URI, vocab::fedora::CREATED)
            .cloned();
        store.put_graph(URI, &typed_graph(URI, vocab::arbor::FOLDER)).unwrap();
        let after = store.get_graph(URI).unwrap().graph;
        assert_eq!(after.first_object(URI, vocab::fedora::CREATED).cloned(), created);
    }

    #[test]
    fn missing_resource_is_not_found() {
        let store = InMemoryObjectStore::new();
        assert!(store.head(URI).unwrap_err().is_not_found());
        assert!(!store.exists(URI).unwrap());
    }

    #[test]
    fn post_with_slug_and_minted_name() {
        let store = InMemoryObjectStore::new();
        let mut g = Graph::new();
        g.add("", vocab::rdf::TYPE, Term::iri(vocab::ldp::BASIC_CONTAINER));
        let uri = store.post(URI, Some("md"), &g).unwrap();
        assert_eq!(uri, format!("{URI}/md"));
        assert!(store.get_graph(&uri).unwrap().graph.has_type(&uri, vocab::ldp::BASIC_CONTAINER));

        let minted = store.post(URI, None, &Graph::new()).unwrap();
        assert!(minted.starts_with(URI));
        assert!(matches!(
            store.post(URI, Some("md"), &Graph::new()),
            Err(StoreError::Conflict { .. })
        ));
    }

    #[test]
    fn binary_has_description() {
        let store = InMemoryObjectStore::new();
        let bin = format!("{URI}/datafs/original_file");
        let head = store
            .put_binary(
                &bin,
                &BinaryUpload::inline(&b"hello"[..])
                    .with_filename("hello.txt")
                    .with_mimetype("text/plain"),
            )
            .unwrap();
        assert_eq!(head.kind, ResourceKind::Binary);
        let desc_uri = head.described_by.unwrap();

        let probed = store.head(&bin).unwrap();
        assert_eq!(probed.kind, ResourceKind::Binary);
        assert_eq!(probed.content_length, Some(5));

        let desc = store.get_graph(&desc_uri).unwrap().graph;
        assert_eq!(desc.literal(&bin, vocab::ebucore::FILENAME), Some("hello.txt"));
        assert!(desc.has_type(&bin, vocab::fedora::BINARY));
        assert_eq!(desc.iris(&bin, vocab::premis::HAS_MESSAGE_DIGEST).len(), 1);
    }

    #[test]
    fn checksum_mismatch_is_distinguished() {
        let store = InMemoryObjectStore::new();
        let wrong = Digest::compute(DigestAlgorithm::Sha256, b"other");
        let err = store
            .put_binary(URI, &BinaryUpload::inline(&b"data"[..]).with_digest(wrong))
            .unwrap_err();
        assert!(matches!(err, StoreError::ChecksumMismatch { .. }));
        assert!(!store.exists(URI).unwrap());
    }

    #[test]
    fn matching_checksum_is_accepted() {
        let store = InMemoryObjectStore::new();
        let right = Digest::compute(DigestAlgorithm::Blake3, b"data");
        store
            .put_binary(URI, &BinaryUpload::inline(&b"data"[..]).with_digest(right))
            .unwrap();
        assert!(store.exists(URI).unwrap());
    }

    #[test]
    fn range_reads() {
        let store = InMemoryObjectStore::new();
        store
            .put_binary(URI, &BinaryUpload::inline(&b"0123456789"[..]))
            .unwrap();
        assert_eq!(read_all(store.open_binary(URI, None).unwrap()), b"0123456789");
        assert_eq!(
            read_all(store.open_binary(URI, Some(ByteRange::new(2, Some(4)))).unwrap()),
            b"234"
        );
        assert_eq!(
            read_all(store.open_binary(URI, Some(ByteRange::new(7, None))).unwrap()),
            b"789"
        );
        assert!(matches!(
            store.open_binary(URI, Some(ByteRange::new(10, None))),
            Err(StoreError::RangeNotSatisfiable { .. })
        ));
        assert_eq!(
            read_all(store.open_binary(URI, Some(ByteRange::new(0, Some(u64::MAX)))).unwrap()),
            b"0123456789"
        );
    }

    #[test]
    fn empty_binary_ranges() {
        let store = InMemoryObjectStore::new();
        store.put_binary(URI, &BinaryUpload::inline(&b""[..])).unwrap();
        assert!(read_all(store.open_binary(URI, None).unwrap()).is_empty());
        assert!(read_all(store.open_binary(URI, Some(ByteRange::new(0, None))).unwrap()).is_empty());
        assert!(matches!(
            store.open_binary(URI, Some(ByteRange::new(3, None))),
            Err(StoreError::RangeNotSatisfiable { start: 3, length: 0, .. })
        ));
    }

    #[test]
    fn external_content_is_verified_and_streamed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"external bytes").unwrap();
        let location = format!("file://{}", file.path().display());

        let store = InMemoryObjectStore::new();
        let digest = Digest::compute(DigestAlgorithm::Sha256, b"external bytes");
        let head = store
            .put_binary(URI, &BinaryUpload::external(&location).with_digest(digest))
            .unwrap();
        assert_eq!(head.content_location.as_deref(), Some(location.as_str()));
        assert_eq!(
            read_all(store.open_binary(URI, Some(ByteRange::new(9, None))).unwrap()),
            b"bytes"
        );
    }

    #[test]
    fn patch_description_of_binary() {
        let store = InMemoryObjectStore::new();
        store.put_binary(URI, &BinaryUpload::inline(&b"x"[..])).unwrap();
        let desc = format!("{URI}/{DESCRIPTION_SUFFIX}");
        store
            .patch(
                &desc,
                &GraphUpdate::new().insert(Statement::new(
                    URI,
                    vocab::ebucore::FILENAME,
                    Term::literal("renamed.bin"),
                )),
            )
            .unwrap();
        let graph = store.get_graph(&desc).unwrap().graph;
        assert_eq!(graph.literal(URI, vocab::ebucore::FILENAME), Some("renamed.bin"));
    }

    #[test]
    fn query_spans_all_graphs() {
        let store = InMemoryObjectStore::new();
        let parent = "http://repo/content/p";
        for child in ["http://repo/content/c1", "http://repo/content/c2"] {
            let mut g = Graph::new();
            g.add(child, vocab::pcdm::MEMBER_OF, Term::iri(parent));
            store.put_graph(child, &g).unwrap();
        }
        let members = store
            .subjects_with(vocab::pcdm::MEMBER_OF, &Term::iri(parent))
            .unwrap();
        assert_eq!(members, vec!["http://repo/content/c1", "http://repo/content/c2"]);
        assert_eq!(
            store.objects_of("http://repo/content/c1", vocab::pcdm::MEMBER_OF).unwrap(),
            vec![Term::iri(parent)]
        );
    }

    #[test]
    fn unavailable_store_fails_every_call() {
        let store = InMemoryObjectStore::new();
        store.put_graph(URI, &Graph::new()).unwrap();
        store.set_available(false);
        assert!(matches!(store.head(URI), Err(StoreError::Unavailable(_))));
        assert!(matches!(store.find(&TriplePattern::default()), Err(StoreError::Unavailable(_))));
        store.set_available(true);
        assert!(store.head(URI).is_ok());
    }

    #[test]
    fn counters_track_requests() {
        let store = InMemoryObjectStore::new();
        store.put_graph(URI, &Graph::new()).unwrap();
        store.head(URI).unwrap();
        store.get_graph(URI).unwrap();
        store.get_graph(URI).unwrap();
        let counts = store.request_counts();
        assert_eq!(counts.put, 1);
        assert_eq!(counts.head, 1);
        assert_eq!(counts.get, 2);
    }
}
