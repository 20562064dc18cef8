use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Reserved id of the repository's content root.
pub const CONTENT_ROOT_ID: &str = "collections";

/// Number of two-character pairtree levels placed above an id.
const PAIRTREE_DEPTH: usize = 4;

/// Namespace an identifier is minted in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PidQualifier {
    /// Content objects: the containment hierarchy and its binaries.
    Content,
    /// Deposit records and their manifests.
    Deposit,
}

impl PidQualifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Deposit => "deposit",
        }
    }
}

impl fmt::Display for PidQualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PidQualifier {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "content" => Ok(Self::Content),
            "deposit" => Ok(Self::Deposit),
            other => Err(TypeError::UnknownQualifier(other.to_string())),
        }
    }
}

/// Persistent identifier for one logical repository object.
///
/// A `Pid` is a qualifier, an opaque id, and an optional component path
/// addressing a sub-resource of the object (for example the original file
/// binary under a file object: `datafs/original_file`). Two pids with the
/// same parts denote the same object.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pid {
    qualifier: PidQualifier,
    id: String,
    component: Option<String>,
}

impl Pid {
    /// Create a pid from a qualifier and id.
    pub fn new(qualifier: PidQualifier, id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        validate_id(&id)?;
        Ok(Self {
            qualifier,
            id,
            component: None,
        })
    }

    /// Create a content pid.
    pub fn content(id: impl Into<String>) -> Result<Self, TypeError> {
        Self::new(PidQualifier::Content, id)
    }

    /// Create a deposit record pid.
    pub fn deposit(id: impl Into<String>) -> Result<Self, TypeError> {
        Self::new(PidQualifier::Deposit, id)
    }

    /// Mint a fresh random pid in the given namespace.
    pub fn mint(qualifier: PidQualifier) -> Self {
        Self {
            qualifier,
            id: uuid::Uuid::new_v4().to_string(),
            component: None,
        }
    }

    /// The pid of the repository content root.
    pub fn content_root() -> Self {
        Self {
            qualifier: PidQualifier::Content,
            id: CONTENT_ROOT_ID.to_string(),
            component: None,
        }
    }

    /// Address a sub-resource of this object.
    ///
    /// Any component already present is replaced.
    pub fn with_component(&self, component: &str) -> Result<Self, TypeError> {
        let component = component.trim_matches('/');
        if component.is_empty() || component.split('/').any(|seg| validate_id(seg).is_err()) {
            return Err(TypeError::InvalidPid(format!(
                "invalid component path '{component}'"
            )));
        }
        Ok(Self {
            qualifier: self.qualifier,
            id: self.id.clone(),
            component: Some(component.to_string()),
        })
    }

    /// This pid without its component path.
    pub fn base(&self) -> Self {
        Self {
            qualifier: self.qualifier,
            id: self.id.clone(),
            component: None,
        }
    }

    pub fn qualifier(&self) -> PidQualifier {
        self.qualifier
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn component(&self) -> Option<&str> {
        self.component.as_deref()
    }

    pub fn is_component(&self) -> bool {
        self.component.is_some()
    }

    pub fn is_content_root(&self) -> bool {
        self.qualifier == PidQualifier::Content
            && self.id == CONTENT_ROOT_ID
            && self.component.is_none()
    }

    /// `qualifier/id`, without the component.
    pub fn qualified_id(&self) -> String {
        format!("{}/{}", self.qualifier, self.id)
    }

    /// Path of this object relative to the repository base.
    ///
    /// Ids starting with at least eight alphanumeric characters are spread
    /// into a four-level pairtree so no single container grows unbounded.
    pub fn repository_path(&self) -> String {
        let mut path = String::from(self.qualifier.as_str());
        if let Some(pairs) = pairtree(&self.id) {
            for pair in pairs {
                path.push('/');
                path.push_str(pair);
            }
        }
        path.push('/');
        path.push_str(&self.id);
        if let Some(component) = &self.component {
            path.push('/');
            path.push_str(component);
        }
        path
    }

    /// Parse a path produced by [`Pid::repository_path`].
    pub fn from_repository_path(path: &str) -> Result<Self, TypeError> {
        let mut segments = path.trim_matches('/').split('/');
        let qualifier: PidQualifier = segments
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| TypeError::InvalidPid(path.to_string()))?
            .parse()?;
        let rest: Vec<&str> = segments.collect();
        if rest.is_empty() {
            return Err(TypeError::InvalidPid(path.to_string()));
        }

        let id_index = if rest.len() > PAIRTREE_DEPTH
            && rest[..PAIRTREE_DEPTH].iter().all(|s| s.len() == 2)
            && rest[PAIRTREE_DEPTH].starts_with(&rest[..PAIRTREE_DEPTH].concat())
        {
            PAIRTREE_DEPTH
        } else {
            0
        };

        let pid = Self::new(qualifier, rest[id_index])?;
        let component = &rest[id_index + 1..];
        if component.is_empty() {
            Ok(pid)
        } else {
            pid.with_component(&component.join("/"))
        }
    }
}

fn validate_id(id: &str) -> Result<(), TypeError> {
    if id.is_empty() {
        return Err(TypeError::InvalidPid("empty id".into()));
    }
    if let Some(bad) = id
        .chars()
        .find(|c| c.is_whitespace() || matches!(c, '/' | '#' | '?' | '<' | '>' | '"'))
    {
        return Err(TypeError::InvalidPid(format!(
            "id '{id}' contains illegal character {bad:?}"
        )));
    }
    Ok(())
}

fn pairtree(id: &str) -> Option<[&str; PAIRTREE_DEPTH]> {
    let width = PAIRTREE_DEPTH * 2;
    if id == CONTENT_ROOT_ID || id.len() < width {
        return None;
    }
    let head = id.get(..width)?;
    if !head.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some([&head[0..2], &head[2..4], &head[4..6], &head[6..8]])
}

impl fmt::Debug for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pid({self})")
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.qualifier, self.id)?;
        if let Some(component) = &self.component {
            write!(f, "/{component}")?;
        }
        Ok(())
    }
}

impl FromStr for Pid {
    type Err = TypeError;

    /// Accepts `qualifier/id[/component]`, or a bare `id[/component]`
    /// which is taken to be a content pid.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_matches('/');
        let (qualifier, rest) = match s.split_once('/') {
            Some((head, rest)) => match head.parse::<PidQualifier>() {
                Ok(q) => (q, rest),
                Err(_) => (PidQualifier::Content, s),
            },
            None => (PidQualifier::Content, s),
        };
        let (id, component) = match rest.split_once('/') {
            Some((id, component)) => (id, Some(component)),
            None => (rest, None),
        };
        let pid = Self::new(qualifier, id)?;
        match component {
            Some(c) => pid.with_component(c),
            None => Ok(pid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn equal_parts_are_equal_pids() {
        let a = Pid::content("abc").unwrap();
        let b = Pid::content("abc").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, Pid::deposit("abc").unwrap());
    }

    #[test]
    fn minted_pids_are_unique() {
        let a = Pid::mint(PidQualifier::Content);
        let b = Pid::mint(PidQualifier::Content);
        assert_ne!(a, b);
        assert_eq!(a.qualifier(), PidQualifier::Content);
    }

    #[test]
    fn empty_and_slashed_ids_are_rejected() {
        assert!(Pid::content("").is_err());
        assert!(Pid::content("a/b").is_err());
        assert!(Pid::content("has space").is_err());
    }

    #[test]
    fn uuid_ids_use_pairtree() {
        let pid = Pid::content("f277bb38-272c-471c-a28a-9887a1328a1f").unwrap();
        assert_eq!(
            pid.repository_path(),
            "content/f2/77/bb/38/f277bb38-272c-471c-a28a-9887a1328a1f"
        );
    }

    #[test]
    fn short_and_reserved_ids_skip_pairtree() {
        assert_eq!(Pid::content("a").unwrap().repository_path(), "content/a");
        assert_eq!(Pid::content_root().repository_path(), "content/collections");
    }

    #[test]
    fn component_path_is_appended() {
        let pid = Pid::content("0123456789")
            .unwrap()
            .with_component("datafs/original_file")
            .unwrap();
        assert_eq!(
            pid.repository_path(),
            "content/01/23/45/67/0123456789/datafs/original_file"
        );
        assert_eq!(pid.base(), Pid::content("0123456789").unwrap());
        assert!(pid.is_component());
    }

    #[test]
    fn parses_repository_path_with_component() {
        let pid = Pid::from_repository_path("deposit/ab/cd/ef/gh/abcdefghij/manifest/m1").unwrap();
        assert_eq!(pid.qualifier(), PidQualifier::Deposit);
        assert_eq!(pid.id(), "abcdefghij");
        assert_eq!(pid.component(), Some("manifest/m1"));
    }

    #[test]
    fn unknown_qualifier_in_path_is_rejected() {
        assert_eq!(
            Pid::from_repository_path("agents/x"),
            Err(TypeError::UnknownQualifier("agents".into()))
        );
    }

    #[test]
    fn bare_id_parses_as_content() {
        let pid: Pid = "abc".parse().unwrap();
        assert_eq!(pid, Pid::content("abc").unwrap());
        let pid: Pid = "abc/md/descriptive".parse().unwrap();
        assert_eq!(pid.component(), Some("md/descriptive"));
    }

    #[test]
    fn display_round_trips_through_from_str() {
        let pid = Pid::deposit("xyz").unwrap().with_component("manifest").unwrap();
        assert_eq!(pid.to_string(), "deposit/xyz/manifest");
        assert_eq!(pid.to_string().parse::<Pid>().unwrap(), pid);
    }

    #[test]
    fn content_root_is_recognized() {
        assert!(Pid::content_root().is_content_root());
        assert!(!Pid::content("other").unwrap().is_content_root());
    }

    proptest! {
        #[test]
        fn repository_path_round_trips(id in "[a-z0-9][a-z0-9-]{0,40}", deposit in any::<bool>()) {
            let qualifier = if deposit { PidQualifier::Deposit } else { PidQualifier::Content };
            let pid = Pid::new(qualifier, id).unwrap();
            let parsed = Pid::from_repository_path(&pid.repository_path()).unwrap();
            prop_assert_eq!(parsed, pid);
        }
    }
}
