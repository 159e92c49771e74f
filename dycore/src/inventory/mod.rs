//! Inventory module
//!
//! The inventory is the queryable model of an image's public API. It is a
//! tree with a single owner at every level:
//!
//! - [`ModuleInventory`]: modules by name, the entry point fed one
//!   declaration at a time,
//! - [`ModuleContents`]: nominal types by fully qualified name plus free
//!   functions and variables,
//! - [`TypeContents`]: the members of one nominal type, filed by kind,
//! - [`FunctionInventory`] / [`PropertyInventory`] / [`WitnessInventory`] /
//!   [`VariableInventory`]: per-kind collections.
//!
//! Construction is single threaded. Once built, the tree is only read.
use std::collections::BTreeMap;

use either::Either;
use serde::{Deserialize, Serialize};

use crate::{
    decl::{Declaration, NominalKind},
    scan::Architecture,
    utils::error::InventoryError,
};

pub mod contents;
pub mod function;
pub mod module;
pub mod property;
pub mod variable;
pub mod witness;

pub use contents::{Destination, PropertyBucket, TypeContents};
pub use function::{FunctionInventory, OverloadSet};
pub use module::ModuleContents;
pub use property::{PropertyInventory, PropertyRecord};
pub use variable::VariableInventory;
pub use witness::WitnessInventory;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleInventory {
    architecture: Architecture,
    modules: BTreeMap<String, ModuleContents>,
}

impl ModuleInventory {
    pub fn new(architecture: Architecture) -> Self {
        Self {
            architecture,
            modules: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, decl: Declaration) -> Result<(), InventoryError> {
        self.modules
            .entry(decl.module().to_string())
            .or_insert_with_key(|name| ModuleContents::new(name.as_str()))
            .add(decl)
    }

    pub fn architecture(&self) -> Architecture {
        self.architecture
    }

    pub(crate) fn set_architecture(&mut self, architecture: Architecture) {
        self.architecture = architecture;
    }

    /// Size of a machine pointer on the image's architecture, in bytes.
    pub fn pointer_size(&self) -> usize {
        self.architecture.pointer_size()
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn module(&self, name: &str) -> Option<&ModuleContents> {
        self.modules.get(name)
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModuleContents> {
        self.modules.values()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Classes, structs and enums of every module.
    pub fn classes(&self) -> impl Iterator<Item = &TypeContents> {
        self.modules.values().flat_map(ModuleContents::classes)
    }

    /// Classes, structs and enums of module `name`. Empty for an unknown
    /// module.
    pub fn classes_for_module(&self, name: &str) -> impl Iterator<Item = &TypeContents> {
        match self.modules.get(name) {
            Some(module) => Either::Left(module.classes()),
            None => Either::Right(std::iter::empty()),
        }
    }

    /// Protocols of module `name`. Empty for an unknown module.
    pub fn protocols_for_module(&self, name: &str) -> impl Iterator<Item = &TypeContents> {
        match self.modules.get(name) {
            Some(module) => Either::Left(module.protocols()),
            None => Either::Right(std::iter::empty()),
        }
    }

    /// Types of module `name` whose kind is `kind`.
    pub fn classes_of_kind(
        &self,
        name: &str,
        kind: NominalKind,
    ) -> impl Iterator<Item = &TypeContents> {
        self.classes_for_module(name)
            .filter(move |contents| contents.name().kind == kind)
    }

    pub fn find_class(&self, fully_qualified_name: &str) -> Option<&TypeContents> {
        let (module, _) = fully_qualified_name.split_once('.')?;
        self.modules.get(module)?.class(fully_qualified_name)
    }

    pub fn find_protocol(&self, fully_qualified_name: &str) -> Option<&TypeContents> {
        let (module, _) = fully_qualified_name.split_once('.')?;
        self.modules.get(module)?.protocol(fully_qualified_name)
    }
}
