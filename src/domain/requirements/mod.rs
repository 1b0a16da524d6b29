pub mod bit_set;
pub mod catalog;
pub mod category;
pub mod requirements;

pub use bit_set::{BitSet, ResourceSet};
pub use catalog::ResourceCatalog;
pub use category::{AccessMode, CategoryTag, ChunkFields, ConstSharedFields, ExternalServices, Fields, ResourceCategory, SharedFields, Tags};
pub use requirements::{AccessCategory, ResourceAccess, ResourceRequirements, TagRequirement};
