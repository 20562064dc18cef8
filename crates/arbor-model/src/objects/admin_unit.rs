use arbor_types::ResourceType;

use crate::error::ModelResult;
use crate::factory::ObjectFactory;
use crate::objects::{admit_member, RepositoryObject};

typed_object!(
    /// Top-level administrative grouping under the content root.
    AdminUnit,
    AdminUnit
);

impl AdminUnit {
    /// Collections are the only permitted members.
    pub fn add_member(&self, factory: &ObjectFactory, member: &RepositoryObject) -> ModelResult<()> {
        admit_member(
            factory,
            &self.to_object(),
            &[ResourceType::Collection],
            member,
        )
    }
}
