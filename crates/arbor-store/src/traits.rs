use std::io::Read;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use arbor_types::{Digest, Graph, GraphUpdate, Statement, Term, TriplePattern};

use crate::error::{StoreError, StoreResult};

/// How the store classifies a resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    /// A resource whose content is its own statement graph.
    Rdf,
    /// Opaque bytes with a separate description resource.
    Binary,
}

/// What a lightweight probe reveals about a resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceHead {
    pub uri: String,
    pub kind: ResourceKind,
    /// Version token exactly as the store sent it (possibly quoted).
    pub etag: Option<String>,
    /// Description resource of a binary.
    pub described_by: Option<String>,
    /// Location of out-of-band content for externally stored binaries.
    pub content_location: Option<String>,
    pub content_length: Option<u64>,
}

/// A statement graph and the version token it was read at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphResponse {
    pub graph: Graph,
    pub etag: Option<String>,
}

/// Where the bytes of an upload come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BinaryContent {
    /// Bytes sent in the request body.
    Inline(Bytes),
    /// URI of content stored out of band, e.g. `file:///staging/a.tif`.
    External(String),
}

/// A binary create/replace request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryUpload {
    pub content: BinaryContent,
    pub filename: Option<String>,
    pub mimetype: Option<String>,
    /// Digests the store must verify before accepting the content.
    pub digests: Vec<Digest>,
}

impl BinaryUpload {
    pub fn inline(data: impl Into<Bytes>) -> Self {
        Self {
            content: BinaryContent::Inline(data.into()),
            filename: None,
            mimetype: None,
            digests: Vec::new(),
        }
    }

    pub fn external(uri: impl Into<String>) -> Self {
        Self {
            content: BinaryContent::External(uri.into()),
            filename: None,
            mimetype: None,
            digests: Vec::new(),
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = Some(mimetype.into());
        self
    }

    pub fn with_digest(mut self, digest: Digest) -> Self {
        self.digests.push(digest);
        self
    }
}

/// Inclusive byte range of a content read. An open `end` reads to the end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: Option<u64>,
}

impl ByteRange {
    pub fn new(start: u64, end: Option<u64>) -> Self {
        Self { start, end }
    }

    /// `bytes=start-end` header form.
    pub fn to_header_value(&self) -> String {
        match self.end {
            Some(end) => format!("bytes={}-{}", self.start, end),
            None => format!("bytes={}-", self.start),
        }
    }

    /// Number of bytes covered within content of `length` bytes.
    pub fn span(&self, length: u64) -> u64 {
        let end = self.end.map_or(length, |e| e.saturating_add(1).min(length));
        end.saturating_sub(self.start)
    }
}

/// A streaming content read.
pub type BinaryStream = Box<dyn Read + Send>;

/// The remote object store.
///
/// Every call is a blocking network round-trip. Implementations must be
/// thread-safe; the store is the sole source of truth for version tokens
/// and server-managed timestamps.
pub trait ObjectStore: Send + Sync {
    /// Lightweight existence and classification probe (HEAD).
    fn head(&self, uri: &str) -> StoreResult<ResourceHead>;

    /// Fetch the statement graph of an RDF resource or binary description.
    fn get_graph(&self, uri: &str) -> StoreResult<GraphResponse>;

    /// Create or replace an RDF resource.
    fn put_graph(&self, uri: &str, graph: &Graph) -> StoreResult<ResourceHead>;

    /// Create a child of `container`, returning the new resource's URI.
    fn post(&self, container: &str, slug: Option<&str>, graph: &Graph) -> StoreResult<String>;

    /// Apply a partial update to an RDF resource or binary description.
    fn patch(&self, uri: &str, update: &GraphUpdate) -> StoreResult<()>;

    /// Create or replace a binary. Supplied digests are verified by the store.
    fn put_binary(&self, uri: &str, upload: &BinaryUpload) -> StoreResult<ResourceHead>;

    /// Open a streaming read of binary content.
    fn open_binary(&self, uri: &str, range: Option<ByteRange>) -> StoreResult<BinaryStream>;

    /// Whether a resource exists at `uri`.
    fn exists(&self, uri: &str) -> StoreResult<bool> {
        match self.head(uri) {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Pattern queries over the aggregate relationship graph.
pub trait QueryService: Send + Sync {
    /// All statements matching `pattern`.
    fn find(&self, pattern: &TriplePattern) -> StoreResult<Vec<Statement>>;

    /// Subjects holding `predicate` pointing at `object`.
    fn subjects_with(&self, predicate: &str, object: &Term) -> StoreResult<Vec<String>> {
        let pattern = TriplePattern::pointing_at(predicate, object.clone());
        let mut subjects: Vec<String> = self
            .find(&pattern)?
            .into_iter()
            .map(|s| s.subject)
            .collect();
        subjects.sort();
        subjects.dedup();
        Ok(subjects)
    }

    /// Objects of `(subject, predicate, ?)`.
    fn objects_of(&self, subject: &str, predicate: &str) -> StoreResult<Vec<Term>> {
        let pattern = TriplePattern::values_of(subject, predicate);
        Ok(self.find(&pattern)?.into_iter().map(|s| s.object).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_header_forms() {
        assert_eq!(ByteRange::new(0, Some(9)).to_header_value(), "bytes=0-9");
        assert_eq!(ByteRange::new(5, None).to_header_value(), "bytes=5-");
    }

    #[test]
    fn range_span_is_clamped() {
        assert_eq!(ByteRange::new(2, Some(4)).span(10), 3);
        assert_eq!(ByteRange::new(2, None).span(10), 8);
        assert_eq!(ByteRange::new(8, Some(100)).span(10), 2);
        assert_eq!(ByteRange::new(20, None).span(10), 0);
        assert_eq!(ByteRange::new(0, Some(u64::MAX)).span(10), 10);
    }

    #[test]
    fn upload_builder() {
        let upload = BinaryUpload::inline(&b"abc"[..])
            .with_filename("a.txt")
            .with_mimetype("text/plain");
        assert_eq!(upload.filename.as_deref(), Some("a.txt"));
        assert_eq!(upload.content, BinaryContent::Inline(Bytes::from_static(b"abc")));
    }
}
