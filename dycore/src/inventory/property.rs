use std::collections::BTreeMap;

use enum_map::EnumMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    decl::{AccessorKind, FunctionDecl, PropertySignature},
    utils::error::{InventoryError, Slot},
};

/// The accessors of one property, keyed by accessor kind.
///
/// Accessors reached through a method descriptor are kept apart from the
/// accessor functions themselves. Each slot of either table is written once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyRecord {
    owner: String,
    name: String,
    accessors: EnumMap<AccessorKind, Option<FunctionDecl>>,
    descriptors: EnumMap<AccessorKind, Option<FunctionDecl>>,
}

impl PropertyRecord {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            accessors: EnumMap::default(),
            descriptors: EnumMap::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// File `func` as the `accessor` of this property. `is_descriptor` selects
    /// the method-descriptor table.
    pub fn add(
        &mut self,
        func: FunctionDecl,
        accessor: AccessorKind,
        is_descriptor: bool,
    ) -> Result<(), InventoryError> {
        let (table, slot) = if is_descriptor {
            (&mut self.descriptors, Slot::AccessorDescriptor(accessor))
        } else {
            (&mut self.accessors, Slot::Accessor(accessor))
        };

        let entry = &mut table[accessor];
        if entry.is_some() {
            return Err(InventoryError::duplicate(slot, &self.owner, Some(&self.name)));
        }
        debug!("{} `{}` of `{}`: {}", slot, self.name, self.owner, func.mangled_name);
        *entry = Some(func);
        Ok(())
    }

    pub fn accessor(&self, kind: AccessorKind) -> Option<&FunctionDecl> {
        self.accessors[kind].as_ref()
    }

    pub fn descriptor(&self, kind: AccessorKind) -> Option<&FunctionDecl> {
        self.descriptors[kind].as_ref()
    }

    /// Decoded signature of the accessor of the given kind.
    pub fn accessor_signature(&self, kind: AccessorKind) -> Option<&PropertySignature> {
        self.accessor(kind)?.signature.as_property()
    }

    pub fn getter(&self) -> Option<&FunctionDecl> {
        self.accessor(AccessorKind::Getter)
    }

    pub fn setter(&self) -> Option<&FunctionDecl> {
        self.accessor(AccessorKind::Setter)
    }

    pub fn materializer(&self) -> Option<&FunctionDecl> {
        self.accessor(AccessorKind::Materializer)
    }

    pub fn will_set(&self) -> Option<&FunctionDecl> {
        self.accessor(AccessorKind::WillSet)
    }

    pub fn did_set(&self) -> Option<&FunctionDecl> {
        self.accessor(AccessorKind::DidSet)
    }

    pub fn modify_accessor(&self) -> Option<&FunctionDecl> {
        self.accessor(AccessorKind::ModifyAccessor)
    }

    /// Every filed accessor with its kind.
    pub fn accessors(&self) -> impl Iterator<Item = (AccessorKind, &FunctionDecl)> {
        self.accessors
            .iter()
            .filter_map(|(kind, func)| func.as_ref().map(|func| (kind, func)))
    }

    pub fn descriptors(&self) -> impl Iterator<Item = (AccessorKind, &FunctionDecl)> {
        self.descriptors
            .iter()
            .filter_map(|(kind, func)| func.as_ref().map(|func| (kind, func)))
    }

    /// Type of the property value as seen by the getter, else by any other
    /// accessor.
    pub fn property_type(&self) -> Option<&dyspec::types::TypeSpec> {
        self.accessor_signature(AccessorKind::Getter)
            .or_else(|| {
                self.accessors()
                    .find_map(|(_, func)| func.signature.as_property())
            })
            .map(|sig| &sig.of_type)
    }
}

/// Property records of one bucket of a type, keyed by property name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyInventory {
    records: BTreeMap<String, PropertyRecord>,
}

impl PropertyInventory {
    pub fn add(
        &mut self,
        func: FunctionDecl,
        accessor: AccessorKind,
        is_descriptor: bool,
    ) -> Result<(), InventoryError> {
        let owner = func.owner_name();
        self.records
            .entry(func.name.clone())
            .or_insert_with(|| PropertyRecord::new(owner, func.name.clone()))
            .add(func, accessor, is_descriptor)
    }

    pub fn get(&self, name: &str) -> Option<&PropertyRecord> {
        self.records.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn records(&self) -> impl Iterator<Item = &PropertyRecord> {
        self.records.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
