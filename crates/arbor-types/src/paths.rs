use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::pid::Pid;

/// Path segment under which a binary's description resource lives.
pub const DESCRIPTION_SUFFIX: &str = "fcr:metadata";

/// Maps pids to URIs in the remote store and back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryPaths {
    base_uri: String,
}

impl RepositoryPaths {
    pub fn new(base_uri: impl Into<String>) -> Self {
        let base_uri = base_uri.into().trim_end_matches('/').to_string();
        Self { base_uri }
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Store URI of the resource a pid denotes.
    pub fn uri_for(&self, pid: &Pid) -> String {
        format!("{}/{}", self.base_uri, pid.repository_path())
    }

    /// URI of the description resource of a binary.
    pub fn description_uri_for(&self, pid: &Pid) -> String {
        format!("{}/{}", self.uri_for(pid), DESCRIPTION_SUFFIX)
    }

    /// Recover the pid from a store URI.
    ///
    /// Fragments, query strings and a trailing description suffix are
    /// ignored.
    pub fn pid_for(&self, uri: &str) -> Result<Pid, TypeError> {
        let outside = || TypeError::OutsideRepository {
            uri: uri.to_string(),
            base: self.base_uri.clone(),
        };
        let rest = uri.strip_prefix(&self.base_uri).ok_or_else(outside)?;
        if !rest.starts_with('/') {
            return Err(outside());
        }
        let rest = rest.split(['#', '?']).next().unwrap_or_default();
        let rest = rest
            .trim_end_matches('/')
            .strip_suffix(DESCRIPTION_SUFFIX)
            .unwrap_or(rest);
        Pid::from_repository_path(rest)
    }

    /// Whether `uri` belongs to this repository.
    pub fn contains(&self, uri: &str) -> bool {
        uri.strip_prefix(&self.base_uri)
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl Default for RepositoryPaths {
    fn default() -> Self {
        Self::new("http://localhost:8080/rest")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> RepositoryPaths {
        RepositoryPaths::new("http://fcrepo:8080/rest/")
    }

    #[test]
    fn trailing_slash_is_normalized() {
        assert_eq!(paths().base_uri(), "http://fcrepo:8080/rest");
    }

    #[test]
    fn uri_round_trip() {
        let pid = Pid::content("0f1e2d3c4b5a").unwrap();
        let uri = paths().uri_for(&pid);
        assert_eq!(uri, "http://fcrepo:8080/rest/content/0f/1e/2d/3c/0f1e2d3c4b5a");
        assert_eq!(paths().pid_for(&uri).unwrap(), pid);
    }

    #[test]
    fn description_suffix_is_stripped() {
        let pid = Pid::content("0f1e2d3c4b5a")
            .unwrap()
            .with_component("datafs/original_file")
            .unwrap();
        let uri = paths().description_uri_for(&pid);
        assert!(uri.ends_with("/fcr:metadata"));
        assert_eq!(paths().pid_for(&uri).unwrap(), pid);
    }

    #[test]
    fn fragment_is_ignored() {
        let pid = Pid::content("a").unwrap();
        let uri = format!("{}#event1", paths().uri_for(&pid));
        assert_eq!(paths().pid_for(&uri).unwrap(), pid);
    }

    #[test]
    fn foreign_uri_is_rejected() {
        let err = paths().pid_for("http://elsewhere/content/a").unwrap_err();
        assert!(matches!(err, TypeError::OutsideRepository { .. }));
        assert!(!paths().contains("http://fcrepo:8080/restricted/content/a"));
    }
}
