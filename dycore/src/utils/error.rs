use std::fmt;

use strum::EnumIs;
use thiserror::Error;

use crate::{decl::AccessorKind, scan::ImageError};

/// A slot of the inventory that may hold at most one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    ClassConstructor,
    DirectMetadata,
    LazyCacheVariable,
    Metaclass,
    NominalTypeDescriptor,
    /// One mangled name within an overload set.
    Overload,
    Accessor(AccessorKind),
    AccessorDescriptor(AccessorKind),
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::ClassConstructor => f.write_str("type metadata accessor"),
            Slot::DirectMetadata => f.write_str("direct metadata"),
            Slot::LazyCacheVariable => f.write_str("lazy cache variable"),
            Slot::Metaclass => f.write_str("metaclass"),
            Slot::NominalTypeDescriptor => f.write_str("nominal type descriptor"),
            Slot::Overload => f.write_str("overload"),
            Slot::Accessor(kind) => write!(f, "{} accessor", kind),
            Slot::AccessorDescriptor(kind) => write!(f, "{} descriptor", kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, EnumIs, Error)]
pub enum InventoryError {
    /// A single-entry slot received a second entry.
    #[error(
        "Duplicate {slot} in `{owner}`{}. Each slot of a type may only be defined once per image.",
        .member.as_ref().map(|m| format!(" for member `{}`", m)).unwrap_or_default()
    )]
    DuplicateDefinition {
        slot: Slot,
        owner: String,
        member: Option<String>,
    },
}

impl InventoryError {
    pub(crate) fn duplicate(slot: Slot, owner: impl Into<String>, member: Option<&str>) -> Self {
        InventoryError::DuplicateDefinition {
            slot,
            owner: owner.into(),
            member: member.map(str::to_string),
        }
    }

    pub fn slot(&self) -> Slot {
        match self {
            InventoryError::DuplicateDefinition { slot, .. } => *slot,
        }
    }
}

#[derive(Debug, Error)]
pub enum DyError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration file '{file}': {source}")]
    ConfigParseError {
        source: toml::de::Error,
        file: String,
    },

    #[error("Failed to serialize configuration for '{file}': {source}")]
    ConfigSerializeError {
        source: toml::ser::Error,
        file: String,
    },

    #[error("Unable to retrieve symbols from '{image}': {source}")]
    ImageReadError { source: ImageError, image: String },

    #[error("Error dispensing declaration decoded from `{symbol}`: {source}")]
    InventoryError {
        source: InventoryError,
        symbol: String,
    },
}

pub type DyResult<T> = Result<T, DyError>;
