use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Where the bytes of a datastream live.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoragePolicy {
    /// Stored as a binary in the remote object store.
    Repository,
    /// Generated and kept on the local derivative filesystem.
    Derivative,
}

/// Binaries a content object can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatastreamType {
    OriginalFile,
    TechnicalMetadata,
    DescriptiveMetadata,
    Manifest,
    AccessCopy,
    FulltextExtraction,
    ThumbnailSmall,
    ThumbnailLarge,
}

impl DatastreamType {
    pub const ALL: [DatastreamType; 8] = [
        Self::OriginalFile,
        Self::TechnicalMetadata,
        Self::DescriptiveMetadata,
        Self::Manifest,
        Self::AccessCopy,
        Self::FulltextExtraction,
        Self::ThumbnailSmall,
        Self::ThumbnailLarge,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Self::OriginalFile => "original_file",
            Self::TechnicalMetadata => "techmd_fits",
            Self::DescriptiveMetadata => "md_descriptive",
            Self::Manifest => "manifest",
            Self::AccessCopy => "jp2",
            Self::FulltextExtraction => "fulltext",
            Self::ThumbnailSmall => "thumbnail_small",
            Self::ThumbnailLarge => "thumbnail_large",
        }
    }

    pub fn storage(&self) -> StoragePolicy {
        match self {
            Self::OriginalFile
            | Self::TechnicalMetadata
            | Self::DescriptiveMetadata
            | Self::Manifest => StoragePolicy::Repository,
            Self::AccessCopy
            | Self::FulltextExtraction
            | Self::ThumbnailSmall
            | Self::ThumbnailLarge => StoragePolicy::Derivative,
        }
    }

    pub fn is_derivative(&self) -> bool {
        self.storage() == StoragePolicy::Derivative
    }

    /// Container under the owning object that holds this datastream.
    pub fn container(&self) -> &'static str {
        match self {
            Self::DescriptiveMetadata => "md",
            Self::Manifest => "manifest",
            _ => "datafs",
        }
    }

    /// Component path of a repository-stored datastream under its object.
    ///
    /// Returns `None` for derivatives, which never live in the store.
    pub fn component_path(&self) -> Option<String> {
        match self.storage() {
            StoragePolicy::Repository if *self == Self::DescriptiveMetadata => {
                Some("md/descriptive".to_string())
            }
            StoragePolicy::Repository => Some(format!("{}/{}", self.container(), self.id())),
            StoragePolicy::Derivative => None,
        }
    }

    pub fn mimetype(&self) -> &'static str {
        match self {
            Self::OriginalFile => "application/octet-stream",
            Self::TechnicalMetadata | Self::DescriptiveMetadata | Self::Manifest => "text/xml",
            Self::AccessCopy => "image/jp2",
            Self::FulltextExtraction => "text/plain",
            Self::ThumbnailSmall | Self::ThumbnailLarge => "image/png",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::OriginalFile => "bin",
            Self::TechnicalMetadata | Self::DescriptiveMetadata | Self::Manifest => "xml",
            Self::AccessCopy => "jp2",
            Self::FulltextExtraction => "txt",
            Self::ThumbnailSmall | Self::ThumbnailLarge => "png",
        }
    }
}

impl fmt::Display for DatastreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for DatastreamType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ds| ds.id() == s)
            .ok_or_else(|| TypeError::Serialization(format!("unknown datastream '{s}'")))
    }
}
