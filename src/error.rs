use thiserror::Error;

use crate::domain::requirements::{AccessMode, ResourceCategory};

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse pipeline JSON: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Invalid processing unit declaration: {0}")]
    InvalidDeclaration(String),

    #[error("Failed to convert pipeline declaration: {0}")]
    Conversion(#[from] ConversionError),
}

/// Failures turning declared strings into domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("Unknown resource category '{0}'")]
    UnknownResourceCategory(String),

    #[error("Unknown access mode '{0}'")]
    UnknownAccessMode(String),

    #[error("{1:?} access is not supported for {0}")]
    IllegalAccess(ResourceCategory, AccessMode),

    #[error("Unknown tag requirement '{0}'")]
    UnknownTagRequirement(String),
}

pub type Result<T> = std::result::Result<T, Error>;
