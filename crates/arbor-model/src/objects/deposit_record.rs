use arbor_store::BinaryUpload;
use arbor_types::{vocab, Term};

use crate::cache::ObjectCache;
use crate::error::ModelResult;
use crate::factory::ObjectFactory;
use crate::objects::BinaryObject;

typed_object!(
    /// Record of an ingest, living outside the content hierarchy.
    DepositRecord,
    DepositRecord
);

impl DepositRecord {
    /// Store a manifest binary under this record's manifest container.
    pub fn add_manifest(
        &self,
        factory: &ObjectFactory,
        name: &str,
        upload: BinaryUpload,
    ) -> ModelResult<BinaryObject> {
        let pid = self.pid().with_component(&format!("manifest/{name}"))?;
        let manifest = factory.create_or_update_binary(&pid, upload)?;
        let graph = self.core.graph()?;
        if !graph
            .iris(self.uri(), vocab::arbor::HAS_MANIFEST)
            .contains(&manifest.uri())
        {
            factory.create_relationship(
                &self.to_object(),
                vocab::arbor::HAS_MANIFEST,
                Term::iri(manifest.uri()),
            )?;
        }
        Ok(manifest)
    }

    pub fn manifests(&self, cache: &ObjectCache) -> ModelResult<Vec<BinaryObject>> {
        let graph = self.core.graph()?;
        let paths = self.core.driver().paths();
        graph
            .iris(self.uri(), vocab::arbor::HAS_MANIFEST)
            .into_iter()
            .map(|uri| cache.get_binary(&paths.pid_for(uri)?))
            .collect()
    }
}
