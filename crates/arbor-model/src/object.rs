//! Shared state behind every repository object handle.

use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;

use arbor_types::{vocab, Graph, Pid};

use crate::context::TxContext;
use crate::driver::ObjectDriver;
use crate::error::ModelResult;
use crate::event_log::EventLog;

/// Mutable, lazily populated view of the remote resource.
///
/// `graph` and `types` are replaced together: whenever a new graph is
/// installed the derived type list is discarded.
#[derive(Default)]
struct ObjectState {
    graph: Option<Arc<Graph>>,
    types: Option<Arc<Vec<String>>>,
    etag: Option<String>,
    last_modified: Option<DateTime<Utc>>,
    created: Option<DateTime<Utc>>,
    should_refresh: bool,
}

/// Identity plus cached description of one remote resource.
///
/// One `ObjectCore` is shared by every handle the cache hands out for the
/// same pid, so [`Arc::ptr_eq`] on the core is the identity test.
pub struct ObjectCore {
    pid: Pid,
    uri: String,
    /// Separate description resource, present for binaries.
    description_uri: Option<String>,
    /// Out-of-band content location for externally stored binaries.
    content_location: Option<String>,
    content_length: Option<u64>,
    driver: Arc<ObjectDriver>,
    state: RwLock<ObjectState>,
    event_log: OnceCell<EventLog>,
}

impl ObjectCore {
    pub(crate) fn new(pid: Pid, uri: String, driver: Arc<ObjectDriver>) -> Self {
        Self {
            pid,
            uri,
            description_uri: None,
            content_location: None,
            content_length: None,
            driver,
            state: RwLock::new(ObjectState::default()),
            event_log: OnceCell::new(),
        }
    }

    pub(crate) fn binary(
        pid: Pid,
        uri: String,
        description_uri: String,
        content_location: Option<String>,
        content_length: Option<u64>,
        driver: Arc<ObjectDriver>,
    ) -> Self {
        Self {
            description_uri: Some(description_uri),
            content_location,
            content_length,
            ..Self::new(pid, uri, driver)
        }
    }

    pub fn pid(&self) -> &Pid {
        &self.pid
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn description_uri(&self) -> Option<&str> {
        self.description_uri.as_deref()
    }

    /// Resource holding this object's statement graph.
    pub fn metadata_uri(&self) -> &str {
        self.description_uri.as_deref().unwrap_or(&self.uri)
    }

    pub fn content_location(&self) -> Option<&str> {
        self.content_location.as_deref()
    }

    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    pub fn driver(&self) -> &Arc<ObjectDriver> {
        &self.driver
    }

    /// The statement graph, fetched on first access.
    pub fn graph(&self) -> ModelResult<Arc<Graph>> {
        self.driver.load_model(self, false, &TxContext::none())
    }

    /// The statement graph, revalidated against the store's version token.
    pub fn graph_checked(&self, ctx: &TxContext) -> ModelResult<Arc<Graph>> {
        self.driver.load_model(self, true, ctx)
    }

    /// Declared type IRIs.
    pub fn types(&self) -> ModelResult<Arc<Vec<String>>> {
        self.driver.load_types(self)
    }

    /// Version token of the currently held graph, without quotes.
    pub fn etag(&self) -> Option<String> {
        self.read().etag.clone()
    }

    pub fn last_modified(&self) -> ModelResult<Option<DateTime<Utc>>> {
        self.graph()?;
        Ok(self.read().last_modified)
    }

    pub fn created(&self) -> ModelResult<Option<DateTime<Utc>>> {
        self.graph()?;
        Ok(self.read().created)
    }

    pub fn should_refresh(&self) -> bool {
        self.read().should_refresh
    }

    /// Force the next read of the graph to go to the store.
    pub fn mark_for_refresh(&self) {
        self.write().should_refresh = true;
    }

    /// PREMIS event log attached to this object.
    pub fn event_log(&self) -> &EventLog {
        self.event_log
            .get_or_init(|| EventLog::new(self.pid.clone(), &self.uri, self.driver.clone()))
    }

    /// Held graph, unless none was loaded yet or a refresh is pending.
    pub(crate) fn cached_graph(&self) -> Option<Arc<Graph>> {
        let state = self.read();
        if state.should_refresh {
            return None;
        }
        state.graph.clone()
    }

    pub(crate) fn cached_types(&self) -> Option<Arc<Vec<String>>> {
        let state = self.read();
        if state.should_refresh {
            return None;
        }
        state.types.clone()
    }

    /// Install a freshly fetched graph and clear the refresh flag.
    pub(crate) fn replace_model(&self, graph: Graph, etag: Option<String>) -> Arc<Graph> {
        let last_modified = timestamp(&graph, &self.uri, vocab::fedora::LAST_MODIFIED);
        let created = timestamp(&graph, &self.uri, vocab::fedora::CREATED);
        let graph = Arc::new(graph);
        let mut state = self.write();
        state.graph = Some(graph.clone());
        state.types = None;
        state.etag = etag.map(|e| strip_etag(&e));
        state.last_modified = last_modified;
        state.created = created;
        state.should_refresh = false;
        graph
    }

    /// Derive and memoize the type list from the held graph.
    pub(crate) fn derive_types(&self) -> Arc<Vec<String>> {
        let mut state = self.write();
        if let Some(types) = &state.types {
            return types.clone();
        }
        let types = Arc::new(
            state
                .graph
                .as_ref()
                .map(|g| g.types(&self.uri))
                .unwrap_or_default(),
        );
        state.types = Some(types.clone());
        types
    }

    pub(crate) fn set_etag(&self, etag: Option<String>) {
        self.write().etag = etag.map(|e| strip_etag(&e));
    }

    fn read(&self) -> RwLockReadGuard<'_, ObjectState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ObjectState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl fmt::Debug for ObjectCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectCore")
            .field("pid", &self.pid)
            .field("uri", &self.uri)
            .field("etag", &self.etag())
            .field("should_refresh", &self.should_refresh())
            .finish()
    }
}

/// Strip the surrounding quotes and weak prefix from a version token.
pub fn strip_etag(etag: &str) -> String {
    etag.trim()
        .trim_start_matches("W/")
        .trim_matches('"')
        .to_string()
}

fn timestamp(graph: &Graph, subject: &str, predicate: &str) -> Option<DateTime<Utc>> {
    graph
        .literal(subject, predicate)
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|d| d.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn etag_quotes_are_stripped() {
        assert_eq!(strip_etag("\"abc\""), "abc");
        assert_eq!(strip_etag("W/\"abc\""), "abc");
        assert_eq!(strip_etag("abc"), "abc");
    }

    #[test]
    fn timestamps_parse_from_literals() {
        let mut g = Graph::new();
        g.add(
            "http://r/a",
            vocab::fedora::CREATED,
            arbor_types::Term::typed_literal("2024-03-01T10:00:00.000Z", vocab::xsd::DATE_TIME),
        );
        let ts = timestamp(&g, "http://r/a", vocab::fedora::CREATED).unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-01T10:00:00+00:00");
        assert!(timestamp(&g, "http://r/a", vocab::fedora::LAST_MODIFIED).is_none());
    }
}
