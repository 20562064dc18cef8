//! The closed set of repository object variants.
//!
//! Each variant is a cheap handle over a shared [`ObjectCore`]; cloning a
//! handle never copies object state.

use std::fmt;
use std::sync::Arc;

use arbor_types::{Pid, ResourceType};

use crate::error::{ModelError, ModelResult};
use crate::factory::ObjectFactory;
use crate::object::ObjectCore;

/// Conversion between a typed handle and [`RepositoryObject`].
pub trait TypedObject: Sized + Clone {
    const RESOURCE_TYPE: ResourceType;

    /// The typed handle, if `object` is of this kind.
    fn from_object(object: RepositoryObject) -> Option<Self>;

    fn into_object(self) -> RepositoryObject;
}

macro_rules! typed_object {
    ($(#[$meta:meta])* $name:ident, $variant:ident) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name {
            pub(crate) core: ::std::sync::Arc<$crate::object::ObjectCore>,
        }

        impl $name {
            pub(crate) fn new(core: ::std::sync::Arc<$crate::object::ObjectCore>) -> Self {
                Self { core }
            }

            pub fn pid(&self) -> &::arbor_types::Pid {
                self.core.pid()
            }

            pub fn uri(&self) -> &str {
                self.core.uri()
            }

            pub fn core(&self) -> &$crate::object::ObjectCore {
                &self.core
            }

            pub fn to_object(&self) -> $crate::objects::RepositoryObject {
                $crate::objects::RepositoryObject::$variant(self.clone())
            }
        }

        impl $crate::objects::TypedObject for $name {
            const RESOURCE_TYPE: ::arbor_types::ResourceType =
                ::arbor_types::ResourceType::$variant;

            fn from_object(object: $crate::objects::RepositoryObject) -> Option<Self> {
                match object {
                    $crate::objects::RepositoryObject::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn into_object(self) -> $crate::objects::RepositoryObject {
                $crate::objects::RepositoryObject::$variant(self)
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_tuple(stringify!($name)).field(self.pid()).finish()
            }
        }
    };
}

mod admin_unit;
mod binary;
mod collection;
mod content_root;
mod deposit_record;
mod file_object;
mod folder;
mod tombstone;
mod work;

pub use admin_unit::AdminUnit;
pub use binary::BinaryObject;
pub use collection::CollectionObject;
pub use content_root::ContentRootObject;
pub use deposit_record::DepositRecord;
pub use file_object::FileObject;
pub use folder::FolderObject;
pub use tombstone::Tombstone;
pub use work::{parse_member_order, WorkObject};

/// Any repository object.
#[derive(Clone)]
pub enum RepositoryObject {
    ContentRoot(ContentRootObject),
    AdminUnit(AdminUnit),
    Collection(CollectionObject),
    Folder(FolderObject),
    Work(WorkObject),
    FileObject(FileObject),
    Binary(BinaryObject),
    DepositRecord(DepositRecord),
    Tombstone(Tombstone),
}

impl RepositoryObject {
    pub(crate) fn from_core(core: Arc<ObjectCore>, kind: ResourceType) -> Self {
        match kind {
            ResourceType::ContentRoot => Self::ContentRoot(ContentRootObject::new(core)),
            ResourceType::AdminUnit => Self::AdminUnit(AdminUnit::new(core)),
            ResourceType::Collection => Self::Collection(CollectionObject::new(core)),
            ResourceType::Folder => Self::Folder(FolderObject::new(core)),
            ResourceType::Work => Self::Work(WorkObject::new(core)),
            ResourceType::FileObject => Self::FileObject(FileObject::new(core)),
            ResourceType::Binary => Self::Binary(BinaryObject::new(core)),
            ResourceType::DepositRecord => Self::DepositRecord(DepositRecord::new(core)),
            ResourceType::Tombstone => Self::Tombstone(Tombstone::new(core)),
        }
    }

    pub fn resource_type(&self) -> ResourceType {
        match self {
            Self::ContentRoot(_) => ResourceType::ContentRoot,
            Self::AdminUnit(_) => ResourceType::AdminUnit,
            Self::Collection(_) => ResourceType::Collection,
            Self::Folder(_) => ResourceType::Folder,
            Self::Work(_) => ResourceType::Work,
            Self::FileObject(_) => ResourceType::FileObject,
            Self::Binary(_) => ResourceType::Binary,
            Self::DepositRecord(_) => ResourceType::DepositRecord,
            Self::Tombstone(_) => ResourceType::Tombstone,
        }
    }

    fn shared_core(&self) -> &Arc<ObjectCore> {
        match self {
            Self::ContentRoot(o) => &o.core,
            Self::AdminUnit(o) => &o.core,
            Self::Collection(o) => &o.core,
            Self::Folder(o) => &o.core,
            Self::Work(o) => &o.core,
            Self::FileObject(o) => &o.core,
            Self::Binary(o) => &o.core,
            Self::DepositRecord(o) => &o.core,
            Self::Tombstone(o) => &o.core,
        }
    }

    pub fn core(&self) -> &ObjectCore {
        self.shared_core()
    }

    pub fn pid(&self) -> &Pid {
        self.core().pid()
    }

    pub fn uri(&self) -> &str {
        self.core().uri()
    }

    /// Whether both handles share one underlying object.
    pub fn same_instance(&self, other: &RepositoryObject) -> bool {
        Arc::ptr_eq(self.shared_core(), other.shared_core())
    }

    pub fn is_tombstone(&self) -> bool {
        matches!(self, Self::Tombstone(_))
    }

    /// Convert into the typed handle `T`, if this object is of that kind.
    pub fn into_typed<T: TypedObject>(self) -> Option<T> {
        T::from_object(self)
    }
}

/// Add `member` to `container` if its kind is one of `allowed`.
pub(crate) fn admit_member(
    factory: &ObjectFactory,
    container: &RepositoryObject,
    allowed: &[ResourceType],
    member: &RepositoryObject,
) -> ModelResult<()> {
    if !allowed.contains(&member.resource_type()) {
        let allowed: Vec<&str> = allowed.iter().map(|k| k.name()).collect();
        return Err(ModelError::member_rejected(
            container.pid(),
            container.resource_type().name(),
            &allowed.join(", "),
            member,
        ));
    }
    factory.add_member(container, member)
}

impl fmt::Debug for RepositoryObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.resource_type(), self.pid())
    }
}
