use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

use crate::domain::requirements::bit_set::{BitSet, ResourceSet};
use crate::domain::requirements::category::{
    AccessMode, CategoryTag, ChunkFields, ConstSharedFields, ExternalServices, Fields, ResourceCategory, SharedFields, Tags,
};
use crate::error::ConversionError;

/// Read and write sets of one resource category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResourceAccess<C: CategoryTag> {
    pub read: BitSet<C>,
    pub write: BitSet<C>,
}

impl<C: CategoryTag> ResourceAccess<C> {
    pub fn is_empty(&self) -> bool {
        self.read.is_empty() && self.write.is_empty()
    }

    pub fn count(&self) -> usize {
        self.read.count() + self.write.count()
    }

    pub fn append(&mut self, other: &Self) {
        self.read.union_with(&other.read);
        self.write.union_with(&other.write);
    }

    pub fn get(&self, mode: AccessMode) -> &BitSet<C> {
        match mode {
            AccessMode::Read => &self.read,
            AccessMode::Write => &self.write,
        }
    }
}

/// Which tag filter a tag bit participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagRequirement {
    All,
    Any,
    None,
}

impl FromStr for TagRequirement {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" | "All" => Ok(TagRequirement::All),
            "any" | "Any" => Ok(TagRequirement::Any),
            "none" | "None" => Ok(TagRequirement::None),
            _ => Err(ConversionError::UnknownTagRequirement(s.to_string())),
        }
    }
}

/// A category that carries both a read and a write set.
///
/// Constant shared fields are read-only and tags carry no access at all, so neither implements this.
pub trait AccessCategory: CategoryTag + Sized {
    fn access(requirements: &ResourceRequirements) -> &ResourceAccess<Self>;

    fn access_mut(requirements: &mut ResourceRequirements) -> &mut ResourceAccess<Self>;
}

macro_rules! access_category {
    ($tag:ty, $field:ident) => {
        impl AccessCategory for $tag {
            fn access(requirements: &ResourceRequirements) -> &ResourceAccess<Self> {
                &requirements.$field
            }

            fn access_mut(requirements: &mut ResourceRequirements) -> &mut ResourceAccess<Self> {
                &mut requirements.$field
            }
        }
    };
}

access_category!(Fields, fields);
access_category!(ChunkFields, chunk_fields);
access_category!(SharedFields, shared_fields);
access_category!(ExternalServices, external_services);

/// Everything a processing unit declares it touches.
#[derive(Debug, Clone, Default)]
pub struct ResourceRequirements {
    fields: ResourceAccess<Fields>,
    chunk_fields: ResourceAccess<ChunkFields>,
    shared_fields: ResourceAccess<SharedFields>,
    const_shared_fields: BitSet<ConstSharedFields>,
    external_services: ResourceAccess<ExternalServices>,
    require_all_tags: BitSet<Tags>,
    require_any_tags: BitSet<Tags>,
    require_none_tags: BitSet<Tags>,

    /// Cached `resources_used_count`, reset on every mutation.
    resources_used: OnceLock<usize>,
}

impl ResourceRequirements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn access<C: AccessCategory>(&self) -> &ResourceAccess<C> {
        C::access(self)
    }

    pub fn add_read<C: AccessCategory>(&mut self, bit: usize) -> &mut Self {
        C::access_mut(self).read.insert(bit);
        self.invalidate();
        self
    }

    pub fn add_write<C: AccessCategory>(&mut self, bit: usize) -> &mut Self {
        C::access_mut(self).write.insert(bit);
        self.invalidate();
        self
    }

    pub fn add_const_shared(&mut self, bit: usize) -> &mut Self {
        self.const_shared_fields.insert(bit);
        self.invalidate();
        self
    }

    pub fn add_tag(&mut self, requirement: TagRequirement, bit: usize) -> &mut Self {
        match requirement {
            TagRequirement::All => self.require_all_tags.insert(bit),
            TagRequirement::Any => self.require_any_tags.insert(bit),
            TagRequirement::None => self.require_none_tags.insert(bit),
        }
        self.invalidate();
        self
    }

    /// Runtime dispatch over `add_read`/`add_write`, used when requirements come from declarations.
    ///
    /// # Returns
    /// `ConversionError::IllegalAccess` for write access to constant shared fields and for tags,
    /// which have to go through `add_tag`.
    pub fn add_access(&mut self, category: ResourceCategory, mode: AccessMode, bit: usize) -> Result<(), ConversionError> {
        match (category, mode) {
            (ResourceCategory::Fields, AccessMode::Read) => self.add_read::<Fields>(bit),
            (ResourceCategory::Fields, AccessMode::Write) => self.add_write::<Fields>(bit),
            (ResourceCategory::ChunkFields, AccessMode::Read) => self.add_read::<ChunkFields>(bit),
            (ResourceCategory::ChunkFields, AccessMode::Write) => self.add_write::<ChunkFields>(bit),
            (ResourceCategory::SharedFields, AccessMode::Read) => self.add_read::<SharedFields>(bit),
            (ResourceCategory::SharedFields, AccessMode::Write) => self.add_write::<SharedFields>(bit),
            (ResourceCategory::ExternalServices, AccessMode::Read) => self.add_read::<ExternalServices>(bit),
            (ResourceCategory::ExternalServices, AccessMode::Write) => self.add_write::<ExternalServices>(bit),
            (ResourceCategory::ConstSharedFields, AccessMode::Read) => self.add_const_shared(bit),
            (category, mode) => return Err(ConversionError::IllegalAccess(category, mode)),
        };
        Ok(())
    }

    pub fn const_shared_fields(&self) -> &BitSet<ConstSharedFields> {
        &self.const_shared_fields
    }

    pub fn tags(&self, requirement: TagRequirement) -> &BitSet<Tags> {
        match requirement {
            TagRequirement::All => &self.require_all_tags,
            TagRequirement::Any => &self.require_any_tags,
            TagRequirement::None => &self.require_none_tags,
        }
    }

    /// Merges `other` into `self`. Union per member set, so the operation is associative and commutative.
    pub fn append(&mut self, other: &ResourceRequirements) -> &mut Self {
        self.fields.append(&other.fields);
        self.chunk_fields.append(&other.chunk_fields);
        self.shared_fields.append(&other.shared_fields);
        self.const_shared_fields.union_with(&other.const_shared_fields);
        self.external_services.append(&other.external_services);
        self.require_all_tags.union_with(&other.require_all_tags);
        self.require_any_tags.union_with(&other.require_any_tags);
        self.require_none_tags.union_with(&other.require_none_tags);
        self.invalidate();
        self
    }

    /// Drops the given services from both access sets.
    pub fn remove_external_services(&mut self, services: &BitSet<ExternalServices>) {
        if services.is_empty() {
            return;
        }
        self.external_services.read.subtract(services);
        self.external_services.write.subtract(services);
        self.invalidate();
    }

    /// Total number of bits set across all categories and tag filters.
    pub fn resources_used_count(&self) -> usize {
        *self.resources_used.get_or_init(|| {
            self.fields.count()
                + self.chunk_fields.count()
                + self.shared_fields.count()
                + self.const_shared_fields.count()
                + self.external_services.count()
                + self.require_all_tags.count()
                + self.require_any_tags.count()
                + self.require_none_tags.count()
        })
    }

    pub fn is_empty(&self) -> bool {
        self.resources_used_count() == 0
    }

    /// Whether any category whose conflicts are tracked has a bit set.
    pub fn has_tracked_access(&self) -> bool {
        !(self.fields.is_empty() && self.chunk_fields.is_empty() && self.shared_fields.is_empty() && self.external_services.is_empty())
    }

    fn invalidate(&mut self) {
        self.resources_used.take();
    }
}

impl PartialEq for ResourceRequirements {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
            && self.chunk_fields == other.chunk_fields
            && self.shared_fields == other.shared_fields
            && self.const_shared_fields == other.const_shared_fields
            && self.external_services == other.external_services
            && self.require_all_tags == other.require_all_tags
            && self.require_any_tags == other.require_any_tags
            && self.require_none_tags == other.require_none_tags
    }
}

impl Eq for ResourceRequirements {}

impl Hash for ResourceRequirements {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fields.hash(state);
        self.chunk_fields.hash(state);
        self.shared_fields.hash(state);
        self.const_shared_fields.hash(state);
        self.external_services.hash(state);
        self.require_all_tags.hash(state);
        self.require_any_tags.hash(state);
        self.require_none_tags.hash(state);
    }
}
