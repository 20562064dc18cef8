use std::str::FromStr;

use arbor_store::BinaryUpload;
use arbor_types::{vocab, Pid, ResourceType, Term};

use crate::cache::ObjectCache;
use crate::error::{ModelError, ModelResult};
use crate::factory::ObjectFactory;
use crate::objects::{admit_member, FileObject, RepositoryObject};

/// Separator of ids in the stored member order.
const MEMBER_ORDER_SEPARATOR: &str = "|";

typed_object!(
    /// An intellectual entity made of one or more files.
    WorkObject,
    Work
);

impl WorkObject {
    /// File objects are the only permitted members.
    pub fn add_member(&self, factory: &ObjectFactory, member: &RepositoryObject) -> ModelResult<()> {
        admit_member(
            factory,
            &self.to_object(),
            &[ResourceType::FileObject],
            member,
        )
    }

    /// Designate one of this work's files as its primary object.
    ///
    /// The file must already be a direct member of this work.
    pub fn set_primary_object(&self, factory: &ObjectFactory, file_pid: &Pid) -> ModelResult<()> {
        let file = factory.cache().get_file_object(file_pid)?;
        match self.core.driver().get_parent_pid(&file.to_object()) {
            Ok(parent) if &parent == self.pid() => {}
            Ok(_) | Err(ModelError::Orphaned(_)) => {
                return Err(ModelError::InvalidRelationship {
                    pid: self.pid().clone(),
                    reason: format!("{file_pid} is not a member of this work"),
                })
            }
            Err(e) => return Err(e),
        }
        factory.create_exclusive_relationship(
            &self.to_object(),
            vocab::arbor::PRIMARY_OBJECT,
            Term::iri(file.uri()),
        )
    }

    pub fn primary_object(&self, cache: &ObjectCache) -> ModelResult<Option<FileObject>> {
        let graph = self.core.graph()?;
        match graph.iris(self.uri(), vocab::arbor::PRIMARY_OBJECT).first() {
            Some(uri) => {
                let pid = self.core.driver().paths().pid_for(uri)?;
                cache.get_file_object(&pid).map(Some)
            }
            None => Ok(None),
        }
    }

    pub fn clear_primary_object(&self, factory: &ObjectFactory) -> ModelResult<()> {
        factory.delete_property(&self.to_object(), vocab::arbor::PRIMARY_OBJECT)
    }

    /// Declared ordering of members. Empty when none is stored.
    pub fn member_order(&self) -> ModelResult<Vec<Pid>> {
        let graph = self.core.graph()?;
        match graph.literal(self.uri(), vocab::arbor::MEMBER_ORDER) {
            Some(order) => parse_member_order(order),
            None => Ok(Vec::new()),
        }
    }

    /// Replace the declared ordering of members.
    pub fn set_member_order(&self, factory: &ObjectFactory, order: &[Pid]) -> ModelResult<()> {
        if order.is_empty() {
            return factory.delete_property(&self.to_object(), vocab::arbor::MEMBER_ORDER);
        }
        let joined = order
            .iter()
            .map(Pid::id)
            .collect::<Vec<_>>()
            .join(MEMBER_ORDER_SEPARATOR);
        factory.create_exclusive_relationship(
            &self.to_object(),
            vocab::arbor::MEMBER_ORDER,
            Term::literal(joined),
        )
    }

    /// Create a file object holding `upload` as its original file and add
    /// it to this work.
    pub fn add_data_file(
        &self,
        factory: &ObjectFactory,
        upload: BinaryUpload,
    ) -> ModelResult<FileObject> {
        let file = factory.create_file_object(None, None)?;
        self.add_member(factory, &file.to_object())?;
        file.add_original_file(factory, upload)?;
        factory.cache().get_file_object(file.pid())
    }
}

/// Parse a stored member order: content ids separated by `|`.
///
/// Empty segments are skipped, so an empty string yields no members.
pub fn parse_member_order(order: &str) -> ModelResult<Vec<Pid>> {
    order
        .split(MEMBER_ORDER_SEPARATOR)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| Pid::from_str(id).map_err(ModelError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_order_has_no_members() {
        assert!(parse_member_order("").unwrap().is_empty());
        assert!(parse_member_order("||").unwrap().is_empty());
    }

    #[test]
    fn order_is_preserved() {
        let order = parse_member_order("c|a|b").unwrap();
        let ids: Vec<&str> = order.iter().map(Pid::id).collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    proptest! {
        #[test]
        fn joined_ids_parse_back(ids in proptest::collection::vec("[a-z0-9]{1,12}", 0..8)) {
            let parsed = parse_member_order(&ids.join("|")).unwrap();
            let back: Vec<String> = parsed.iter().map(|p| p.id().to_string()).collect();
            prop_assert_eq!(back, ids);
        }
    }
}
