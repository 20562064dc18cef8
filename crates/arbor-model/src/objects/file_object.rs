use arbor_store::BinaryUpload;
use arbor_types::{vocab, DatastreamType, Term};

use crate::cache::ObjectCache;
use crate::error::{ModelError, ModelResult};
use crate::factory::ObjectFactory;
use crate::objects::{BinaryObject, WorkObject};

typed_object!(
    /// A single logical file inside a work, with its binaries.
    FileObject,
    FileObject
);

impl FileObject {
    pub fn add_original_file(
        &self,
        factory: &ObjectFactory,
        upload: BinaryUpload,
    ) -> ModelResult<BinaryObject> {
        self.add_binary(factory, DatastreamType::OriginalFile, upload)
    }

    /// Create or replace the binary for `datastream` and link it.
    pub fn add_binary(
        &self,
        factory: &ObjectFactory,
        datastream: DatastreamType,
        upload: BinaryUpload,
    ) -> ModelResult<BinaryObject> {
        let path = datastream
            .component_path()
            .ok_or_else(|| ModelError::UnsupportedDatastream {
                pid: self.pid().clone(),
                datastream,
            })?;
        let pid = self.pid().with_component(&path)?;
        let binary = factory.create_or_update_binary(&pid, upload)?;
        let graph = self.core.graph()?;
        if !graph
            .iris(self.uri(), vocab::pcdm::HAS_FILE)
            .contains(&binary.uri())
        {
            factory.create_relationship(
                &self.to_object(),
                vocab::pcdm::HAS_FILE,
                Term::iri(binary.uri()),
            )?;
        }
        Ok(binary)
    }

    pub fn original_file(&self, cache: &ObjectCache) -> ModelResult<Option<BinaryObject>> {
        self.binary(cache, DatastreamType::OriginalFile)
    }

    /// The linked binary for `datastream`, if present.
    pub fn binary(
        &self,
        cache: &ObjectCache,
        datastream: DatastreamType,
    ) -> ModelResult<Option<BinaryObject>> {
        let Some(path) = datastream.component_path() else {
            return Ok(None);
        };
        let pid = self.pid().with_component(&path)?;
        let uri = self.core.driver().paths().uri_for(&pid);
        let graph = self.core.graph()?;
        if !graph.iris(self.uri(), vocab::pcdm::HAS_FILE).contains(&uri.as_str()) {
            return Ok(None);
        }
        cache.get_binary(&pid).map(Some)
    }

    /// Every linked binary.
    pub fn binary_objects(&self, cache: &ObjectCache) -> ModelResult<Vec<BinaryObject>> {
        let graph = self.core.graph()?;
        let paths = self.core.driver().paths();
        graph
            .iris(self.uri(), vocab::pcdm::HAS_FILE)
            .into_iter()
            .map(|uri| cache.get_binary(&paths.pid_for(uri)?))
            .collect()
    }

    /// The work containing this file. Unparented files are an error.
    pub fn parent_work(&self, cache: &ObjectCache) -> ModelResult<WorkObject> {
        let parent = self.core.driver().get_parent_pid(&self.to_object())?;
        cache.get_work(&parent)
    }
}
