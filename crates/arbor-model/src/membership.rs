//! Member listings answered by the query service.

use std::collections::BTreeSet;
use std::sync::Arc;

use arbor_store::QueryService;
use arbor_types::{vocab, Pid, RepositoryPaths, Term};

use crate::error::ModelResult;
use crate::objects::WorkObject;

pub struct MembershipService {
    query: Arc<dyn QueryService>,
    paths: RepositoryPaths,
}

impl MembershipService {
    pub fn new(query: Arc<dyn QueryService>, paths: RepositoryPaths) -> Self {
        Self { query, paths }
    }

    /// Direct members of `pid`, sorted by pid.
    pub fn list_members(&self, pid: &Pid) -> ModelResult<Vec<Pid>> {
        let target = Term::iri(self.paths.uri_for(pid));
        let mut members = self
            .query
            .subjects_with(vocab::pcdm::MEMBER_OF, &target)?
            .iter()
            .map(|uri| self.paths.pid_for(uri))
            .collect::<Result<Vec<_>, _>>()?;
        members.sort();
        Ok(members)
    }

    pub fn count_members(&self, pid: &Pid) -> ModelResult<usize> {
        Ok(self.list_members(pid)?.len())
    }

    /// Members of `work` in declared order.
    ///
    /// Ordered ids that are no longer members are dropped; members missing
    /// from the declared order follow in pid order.
    pub fn ordered_members(&self, work: &WorkObject) -> ModelResult<Vec<Pid>> {
        let members = self.list_members(work.pid())?;
        let mut remaining: BTreeSet<Pid> = members.into_iter().collect();
        let mut ordered = Vec::with_capacity(remaining.len());
        for pid in work.member_order()? {
            if remaining.remove(&pid) {
                ordered.push(pid);
            }
        }
        ordered.extend(remaining);
        Ok(ordered)
    }
}

impl std::fmt::Debug for MembershipService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MembershipService")
            .field("base_uri", &self.paths.base_uri())
            .finish()
    }
}
