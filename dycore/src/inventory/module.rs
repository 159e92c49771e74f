use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    decl::{Declaration, NominalKind},
    inventory::{contents::TypeContents, function::FunctionInventory, variable::VariableInventory},
    utils::error::InventoryError,
};

/// Everything the image exports for one module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleContents {
    name: String,
    /// Classes, structs and enums keyed by fully qualified name.
    classes: BTreeMap<String, TypeContents>,
    /// Protocols keyed by fully qualified name.
    protocols: BTreeMap<String, TypeContents>,
    functions: FunctionInventory,
    variables: VariableInventory,
    definitions_of_unknown_destination: Vec<Declaration>,
}

impl ModuleContents {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            classes: BTreeMap::new(),
            protocols: BTreeMap::new(),
            functions: FunctionInventory::default(),
            variables: VariableInventory::default(),
            definitions_of_unknown_destination: Vec::new(),
        }
    }

    /// Route `decl` to its owning type, creating it on first use. Free
    /// functions and variables stay at module level.
    pub fn add(&mut self, decl: Declaration) -> Result<(), InventoryError> {
        if let Some(owner) = decl.owner() {
            let types = match owner.kind {
                NominalKind::Protocol => &mut self.protocols,
                _ => &mut self.classes,
            };
            let contents = types
                .entry(owner.fully_qualified_name())
                .or_insert_with_key(|key| {
                    debug!("new {} `{}` in module `{}`", owner.kind, key, self.name);
                    TypeContents::new(owner.clone())
                });
            return contents.add(decl);
        }

        match decl {
            Declaration::Function(func) => self.functions.add(func),
            Declaration::Variable(var) => {
                self.variables.add(var);
                Ok(())
            }
            other => {
                debug!(
                    "`{}` has no owner in module `{}`",
                    other.mangled_name(),
                    self.name
                );
                self.definitions_of_unknown_destination.push(other);
                Ok(())
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn classes(&self) -> impl Iterator<Item = &TypeContents> {
        self.classes.values()
    }

    pub fn protocols(&self) -> impl Iterator<Item = &TypeContents> {
        self.protocols.values()
    }

    pub fn class(&self, fully_qualified_name: &str) -> Option<&TypeContents> {
        self.classes.get(fully_qualified_name)
    }

    pub fn protocol(&self, fully_qualified_name: &str) -> Option<&TypeContents> {
        self.protocols.get(fully_qualified_name)
    }

    /// Top-level functions.
    pub fn functions(&self) -> &FunctionInventory {
        &self.functions
    }

    /// Top-level variables.
    pub fn variables(&self) -> &VariableInventory {
        &self.variables
    }

    pub fn definitions_of_unknown_destination(&self) -> &[Declaration] {
        &self.definitions_of_unknown_destination
    }
}
