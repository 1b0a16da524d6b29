use std::fmt;
use std::str::FromStr;

use crate::error::ConversionError;

/// The independent axes along which two units can conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceCategory {
    /// Per-entity data fields.
    Fields,
    /// Records stored once per chunk.
    ChunkFields,
    /// Records shared between entities, mutable.
    SharedFields,
    /// Records shared between entities, read-only by construction.
    ConstSharedFields,
    /// Services living outside of the entity data.
    ExternalServices,
    /// Zero-sized markers used for filtering only.
    Tags,
}

impl ResourceCategory {
    pub const ALL: [ResourceCategory; 6] = [
        ResourceCategory::Fields,
        ResourceCategory::ChunkFields,
        ResourceCategory::SharedFields,
        ResourceCategory::ConstSharedFields,
        ResourceCategory::ExternalServices,
        ResourceCategory::Tags,
    ];

    /// Whether read/write conflicts are tracked for this category at all.
    pub fn is_tracked(&self) -> bool {
        !matches!(self, ResourceCategory::ConstSharedFields | ResourceCategory::Tags)
    }

    /// Whether conflicts in this category can be relaxed through disjoint data sets.
    pub fn tracks_data_sets(&self) -> bool {
        matches!(self, ResourceCategory::Fields | ResourceCategory::ChunkFields | ResourceCategory::SharedFields)
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceCategory::Fields => "fields",
            ResourceCategory::ChunkFields => "chunkFields",
            ResourceCategory::SharedFields => "sharedFields",
            ResourceCategory::ConstSharedFields => "constSharedFields",
            ResourceCategory::ExternalServices => "externalServices",
            ResourceCategory::Tags => "tags",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ResourceCategory {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fields" | "Fields" => Ok(ResourceCategory::Fields),
            "chunkFields" | "ChunkFields" => Ok(ResourceCategory::ChunkFields),
            "sharedFields" | "SharedFields" => Ok(ResourceCategory::SharedFields),
            "constSharedFields" | "ConstSharedFields" => Ok(ResourceCategory::ConstSharedFields),
            "externalServices" | "ExternalServices" => Ok(ResourceCategory::ExternalServices),
            "tags" | "Tags" => Ok(ResourceCategory::Tags),
            _ => Err(ConversionError::UnknownResourceCategory(s.to_string())),
        }
    }
}

/// Read or write access to a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    Read,
    Write,
}

impl FromStr for AccessMode {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" | "Read" | "readOnly" | "ReadOnly" => Ok(AccessMode::Read),
            "write" | "Write" | "readWrite" | "ReadWrite" => Ok(AccessMode::Write),
            _ => Err(ConversionError::UnknownAccessMode(s.to_string())),
        }
    }
}

/// Compile time marker binding a bit set to one `ResourceCategory`.
pub trait CategoryTag {
    const CATEGORY: ResourceCategory;
}

macro_rules! category_tag {
    ($name:ident, $category:expr) => {
        #[derive(Debug, Default, PartialEq, Eq, Hash, Clone, Copy)]
        pub struct $name;

        impl CategoryTag for $name {
            const CATEGORY: ResourceCategory = $category;
        }
    };
}

category_tag!(Fields, ResourceCategory::Fields);
category_tag!(ChunkFields, ResourceCategory::ChunkFields);
category_tag!(SharedFields, ResourceCategory::SharedFields);
category_tag!(ConstSharedFields, ResourceCategory::ConstSharedFields);
category_tag!(ExternalServices, ResourceCategory::ExternalServices);
category_tag!(Tags, ResourceCategory::Tags);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_both_spellings() {
        for category in ResourceCategory::ALL {
            assert_eq!(category.to_string().parse::<ResourceCategory>(), Ok(category));
        }
        assert_eq!("ExternalServices".parse::<ResourceCategory>(), Ok(ResourceCategory::ExternalServices));
        assert_eq!("readWrite".parse::<AccessMode>(), Ok(AccessMode::Write));
        assert_eq!("components".parse::<ResourceCategory>(), Err(ConversionError::UnknownResourceCategory("components".to_string())));
    }

    #[test]
    fn test_tracking_flags() {
        let tracked: Vec<ResourceCategory> = ResourceCategory::ALL.into_iter().filter(ResourceCategory::is_tracked).collect();
        let relaxable: Vec<ResourceCategory> = ResourceCategory::ALL.into_iter().filter(ResourceCategory::tracks_data_sets).collect();

        assert_eq!(tracked.len(), 4);
        assert!(!tracked.contains(&ResourceCategory::Tags));
        assert_eq!(relaxable, vec![ResourceCategory::Fields, ResourceCategory::ChunkFields, ResourceCategory::SharedFields]);
    }
}
