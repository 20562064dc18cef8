//! Root-first ancestor paths through the containment hierarchy.

use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use tracing::{debug, warn};

use arbor_store::QueryService;
use arbor_types::{vocab, Pid, RepositoryPaths, Term};

use crate::config::AncestorConfig;
use crate::error::{ModelError, ModelResult};

#[derive(Clone)]
struct Hop {
    parent: Option<Pid>,
    fetched_at: Instant,
}

/// Walks parent relations upward with a TTL cache of single hops.
///
/// Only the query service is consulted, so no object needs to be loaded to
/// resolve its ancestry.
pub struct AncestorPathResolver {
    query: Arc<dyn QueryService>,
    paths: RepositoryPaths,
    config: AncestorConfig,
    hops: DashMap<Pid, Hop>,
}

impl AncestorPathResolver {
    pub fn new(query: Arc<dyn QueryService>, paths: RepositoryPaths, config: AncestorConfig) -> Self {
        Self {
            query,
            paths,
            config,
            hops: DashMap::new(),
        }
    }

    /// Ancestors of `pid`, root first, excluding `pid` itself.
    ///
    /// The walk stops at the content root or at the first object without a
    /// parent. More than `max_depth` hops is reported as a cycle.
    pub fn get_ancestor_pids(&self, pid: &Pid) -> ModelResult<Vec<Pid>> {
        let mut path = Vec::new();
        let mut current = pid.clone();
        while !current.is_content_root() {
            if path.len() >= self.config.max_depth {
                warn!(%pid, max_depth = self.config.max_depth, "ancestor walk exceeded bound");
                return Err(ModelError::HierarchyCycle {
                    pid: pid.clone(),
                    max_depth: self.config.max_depth,
                });
            }
            match self.parent_of(&current)? {
                Some(parent) => {
                    path.push(parent.clone());
                    current = parent;
                }
                None => break,
            }
        }
        path.reverse();
        Ok(path)
    }

    /// Direct container of `pid`, from the hop cache or the query service.
    pub fn parent_of(&self, pid: &Pid) -> ModelResult<Option<Pid>> {
        if let Some(hop) = self.hops.get(pid) {
            if hop.fetched_at.elapsed() < self.config.ttl() {
                return Ok(hop.parent.clone());
            }
        }
        let parent = self.query_parent(pid)?;
        debug!(%pid, parent = ?parent, "resolved parent hop");
        self.hops.insert(
            pid.clone(),
            Hop {
                parent: parent.clone(),
                fetched_at: Instant::now(),
            },
        );
        self.enforce_bound();
        Ok(parent)
    }

    fn query_parent(&self, pid: &Pid) -> ModelResult<Option<Pid>> {
        let uri = self.paths.uri_for(pid);
        let member_of = self.query.objects_of(&uri, vocab::pcdm::MEMBER_OF)?;
        if let Some(parent) = member_of.iter().find_map(Term::as_iri) {
            return Ok(Some(self.paths.pid_for(parent)?));
        }
        // Binaries name no parent themselves; their owner links to them.
        let target = Term::iri(&uri);
        for predicate in [vocab::pcdm::HAS_FILE, vocab::arbor::HAS_MANIFEST] {
            if let Some(owner) = self.query.subjects_with(predicate, &target)?.first() {
                return Ok(Some(self.paths.pid_for(owner)?));
            }
        }
        Ok(None)
    }

    /// Forget the cached hop of `pid`.
    pub fn invalidate(&self, pid: &Pid) {
        self.hops.remove(pid);
    }

    pub fn invalidate_all(&self) {
        self.hops.clear();
    }

    pub fn cached_hops(&self) -> usize {
        self.hops.len()
    }

    /// Drop expired hops, then the oldest, until within `max_entries`.
    fn enforce_bound(&self) {
        if self.hops.len() <= self.config.max_entries {
            return;
        }
        let ttl = self.config.ttl();
        self.hops.retain(|_, hop| hop.fetched_at.elapsed() < ttl);
        let excess = self.hops.len().saturating_sub(self.config.max_entries);
        if excess == 0 {
            return;
        }
        let mut oldest: Vec<(Pid, Instant)> = self
            .hops
            .iter()
            .map(|e| (e.key().clone(), e.value().fetched_at))
            .collect();
        oldest.sort_by_key(|(_, at)| *at);
        for (pid, _) in oldest.into_iter().take(excess) {
            self.hops.remove(&pid);
        }
    }
}

impl std::fmt::Debug for AncestorPathResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AncestorPathResolver")
            .field("cached_hops", &self.hops.len())
            .field("max_depth", &self.config.max_depth)
            .finish()
    }
}
