use std::fmt;

use serde::{Deserialize, Serialize};

use crate::vocab;

/// The closed set of repository object kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceType {
    ContentRoot,
    AdminUnit,
    Collection,
    Folder,
    Work,
    FileObject,
    Binary,
    DepositRecord,
    Tombstone,
}

impl ResourceType {
    /// Order in which declared types are tested when resolving a resource.
    ///
    /// Tombstone comes first: a removed object keeps whatever else it
    /// declared and must still resolve as removed.
    pub const RESOLUTION_ORDER: [ResourceType; 9] = [
        Self::Tombstone,
        Self::ContentRoot,
        Self::AdminUnit,
        Self::Collection,
        Self::Folder,
        Self::Work,
        Self::FileObject,
        Self::DepositRecord,
        Self::Binary,
    ];

    /// The `rdf:type` IRI declaring this kind.
    pub fn type_uri(&self) -> &'static str {
        match self {
            Self::ContentRoot => vocab::arbor::CONTENT_ROOT,
            Self::AdminUnit => vocab::arbor::ADMIN_UNIT,
            Self::Collection => vocab::arbor::COLLECTION,
            Self::Folder => vocab::arbor::FOLDER,
            Self::Work => vocab::arbor::WORK,
            Self::FileObject => vocab::arbor::FILE_OBJECT,
            Self::Binary => vocab::fedora::BINARY,
            Self::DepositRecord => vocab::arbor::DEPOSIT_RECORD,
            Self::Tombstone => vocab::arbor::TOMBSTONE,
        }
    }

    /// Supplementary model type written alongside the kind's own type.
    pub fn model_type_uri(&self) -> Option<&'static str> {
        match self {
            Self::ContentRoot | Self::AdminUnit | Self::Collection => {
                Some(vocab::pcdm::COLLECTION)
            }
            Self::Folder | Self::Work | Self::FileObject => Some(vocab::pcdm::OBJECT),
            Self::Binary => Some(vocab::pcdm::FILE),
            Self::DepositRecord | Self::Tombstone => None,
        }
    }

    /// Resolve the kind of a resource from its declared types.
    ///
    /// Returns `None` when no declared type belongs to the closed set.
    pub fn resolve<S: AsRef<str>>(types: &[S]) -> Option<Self> {
        Self::RESOLUTION_ORDER
            .into_iter()
            .find(|candidate| types.iter().any(|t| t.as_ref() == candidate.type_uri()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ContentRoot => "ContentRoot",
            Self::AdminUnit => "AdminUnit",
            Self::Collection => "Collection",
            Self::Folder => "Folder",
            Self::Work => "Work",
            Self::FileObject => "FileObject",
            Self::Binary => "Binary",
            Self::DepositRecord => "DepositRecord",
            Self::Tombstone => "Tombstone",
        }
    }

    /// Whether objects of this kind are part of the containment hierarchy.
    pub fn is_content(&self) -> bool {
        !matches!(self, Self::DepositRecord | Self::Tombstone)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_single_type() {
        assert_eq!(
            ResourceType::resolve(&[vocab::arbor::WORK]),
            Some(ResourceType::Work)
        );
    }

    #[test]
    fn tombstone_wins_over_other_types() {
        let types = [vocab::arbor::WORK, vocab::arbor::TOMBSTONE, vocab::pcdm::OBJECT];
        assert_eq!(ResourceType::resolve(&types), Some(ResourceType::Tombstone));
    }

    #[test]
    fn unrelated_types_do_not_resolve() {
        let types = vec![vocab::pcdm::OBJECT.to_string(), vocab::ldp::RDF_SOURCE.to_string()];
        assert_eq!(ResourceType::resolve(&types), None);
        assert_eq!(ResourceType::resolve::<&str>(&[]), None);
    }

    #[test]
    fn every_kind_resolves_from_its_own_type() {
        for kind in ResourceType::RESOLUTION_ORDER {
            assert_eq!(ResourceType::resolve(&[kind.type_uri()]), Some(kind));
        }
    }

    #[test]
    fn deposit_records_and_tombstones_are_not_content() {
        assert!(!ResourceType::DepositRecord.is_content());
        assert!(!ResourceType::Tombstone.is_content());
        assert!(ResourceType::Binary.is_content());
    }
}
