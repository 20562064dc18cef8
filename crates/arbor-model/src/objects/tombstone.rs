use arbor_types::vocab;

use crate::error::ModelResult;

typed_object!(
    /// Marker left behind by a removed object.
    Tombstone,
    Tombstone
);

impl Tombstone {
    /// Types the object declared before removal.
    pub fn original_types(&self) -> ModelResult<Vec<String>> {
        let graph = self.core.graph()?;
        Ok(graph
            .iris(self.uri(), vocab::arbor::ORIGINAL_TYPE)
            .into_iter()
            .map(str::to_string)
            .collect())
    }
}
