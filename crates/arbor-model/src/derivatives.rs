//! Lookup of derivatives kept on the local filesystem.
//!
//! Layout: `<root>/<datastream id>/<pairtree of the id>/<id>.<extension>`.

use std::path::{Path, PathBuf};

use arbor_types::{DatastreamType, Pid};

use crate::error::{ModelError, ModelResult};

/// A derivative file present on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Derivative {
    pub pid: Pid,
    pub datastream: DatastreamType,
    pub path: PathBuf,
    pub size: u64,
}

#[derive(Clone, Debug)]
pub struct DerivativeService {
    root: PathBuf,
}

impl DerivativeService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the `datastream` derivative of `pid` lives.
    pub fn path_for(&self, pid: &Pid, datastream: DatastreamType) -> ModelResult<PathBuf> {
        if !datastream.is_derivative() {
            return Err(ModelError::UnsupportedDatastream {
                pid: pid.clone(),
                datastream,
            });
        }
        let base = pid.base();
        let relative = base.repository_path();
        // Drop the qualifier segment; the datastream directory replaces it.
        let relative = relative
            .split_once('/')
            .map_or(relative.as_str(), |(_, rest)| rest);
        let mut path = self.root.join(datastream.id()).join(relative);
        path.set_file_name(format!("{}.{}", base.id(), datastream.extension()));
        Ok(path)
    }

    /// The derivative, if it has been generated.
    pub fn get(&self, pid: &Pid, datastream: DatastreamType) -> ModelResult<Option<Derivative>> {
        let path = self.path_for(pid, datastream)?;
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => Ok(Some(Derivative {
                pid: pid.base(),
                datastream,
                path,
                size: meta.len(),
            })),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Every generated derivative of `pid`.
    pub fn list(&self, pid: &Pid) -> ModelResult<Vec<Derivative>> {
        let mut found = Vec::new();
        for datastream in DatastreamType::ALL.into_iter().filter(|d| d.is_derivative()) {
            if let Some(derivative) = self.get(pid, datastream)? {
                found.push(derivative);
            }
        }
        Ok(found)
    }
}
