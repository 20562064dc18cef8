use arbor_types::ResourceType;

use crate::error::ModelResult;
use crate::factory::ObjectFactory;
use crate::objects::{admit_member, RepositoryObject};

typed_object!(CollectionObject, Collection);

impl CollectionObject {
    pub fn add_member(&self, factory: &ObjectFactory, member: &RepositoryObject) -> ModelResult<()> {
        admit_member(
            factory,
            &self.to_object(),
            &[ResourceType::Folder, ResourceType::Work],
            member,
        )
    }
}
