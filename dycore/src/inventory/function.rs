use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    decl::{
        FunctionDecl,
        signature::{ALLOCATING_CONSTRUCTOR_NAME, DEALLOCATING_DESTRUCTOR_NAME},
    },
    utils::error::{InventoryError, Slot},
};

/// All function declarations sharing one unqualified name, in insertion
/// order. No two entries share a mangled name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverloadSet {
    name: String,
    functions: Vec<FunctionDecl>,
}

impl OverloadSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn functions(&self) -> &[FunctionDecl] {
        &self.functions
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn add(&mut self, func: FunctionDecl) -> Result<(), InventoryError> {
        if self.find(&func.mangled_name).is_some() {
            return Err(InventoryError::duplicate(
                Slot::Overload,
                func.owner_name(),
                Some(&func.mangled_name),
            ));
        }
        self.functions.push(func);
        Ok(())
    }

    pub fn find(&self, mangled_name: &str) -> Option<&FunctionDecl> {
        self.functions.iter().find(|f| f.mangled_name == mangled_name)
    }

    fn find_mut(&mut self, mangled_name: &str) -> Option<&mut FunctionDecl> {
        self.functions
            .iter_mut()
            .find(|f| f.mangled_name == mangled_name)
    }
}

/// Function declarations grouped into overload sets by unqualified name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionInventory {
    overloads: BTreeMap<String, OverloadSet>,
}

impl FunctionInventory {
    pub fn add(&mut self, func: FunctionDecl) -> Result<(), InventoryError> {
        debug!("filing `{}` under overload `{}`", func.mangled_name, func.name);
        self.overloads
            .entry(func.name.clone())
            .or_insert_with(|| OverloadSet::new(func.name.clone()))
            .add(func)
    }

    pub fn get(&self, name: &str) -> Option<&OverloadSet> {
        self.overloads.get(name)
    }

    pub fn overloads(&self) -> impl Iterator<Item = &OverloadSet> {
        self.overloads.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.overloads.keys().map(String::as_str)
    }

    /// Number of overload sets.
    pub fn len(&self) -> usize {
        self.overloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overloads.is_empty()
    }

    /// Number of function declarations across all overload sets.
    pub fn function_count(&self) -> usize {
        self.overloads.values().map(OverloadSet::len).sum()
    }

    /// Every `(name, declaration)` pair. Constructors and destructors live in
    /// their own inventories and never show up here for a method inventory.
    pub fn all_methods_no_cdtor(&self) -> impl Iterator<Item = (&str, &FunctionDecl)> {
        self.overloads.iter().flat_map(|(name, set)| {
            set.functions()
                .iter()
                .map(move |func| (name.as_str(), func))
        })
    }

    pub fn methods_with_name(&self, name: &str) -> Vec<&FunctionDecl> {
        self.overloads
            .get(name)
            .map(|set| set.functions().iter().collect())
            .unwrap_or_default()
    }

    pub fn allocating_constructors(&self) -> Vec<&FunctionDecl> {
        self.methods_with_name(ALLOCATING_CONSTRUCTOR_NAME)
    }

    pub fn deallocating_destructors(&self) -> Vec<&FunctionDecl> {
        self.methods_with_name(DEALLOCATING_DESTRUCTOR_NAME)
    }

    /// Find a declaration `func` is equivalent to (see
    /// [`FunctionDecl::is_equivalent_to`]).
    pub fn contains_equivalent_function(&self, func: &FunctionDecl) -> Option<&FunctionDecl> {
        self.overloads
            .get(&func.name)?
            .functions()
            .iter()
            .find(|existing| existing.is_equivalent_to(func))
    }

    /// Replace the declaration with `old_mangled_name` by `new`, keeping its
    /// position. Returns the replaced declaration, or gives `new` back if
    /// nothing matched.
    pub fn replace_function(
        &mut self,
        old_mangled_name: &str,
        new: FunctionDecl,
    ) -> Result<FunctionDecl, FunctionDecl> {
        match self
            .overloads
            .get_mut(&new.name)
            .and_then(|set| set.find_mut(old_mangled_name))
        {
            Some(slot) => Ok(std::mem::replace(slot, new)),
            None => Err(new),
        }
    }

    pub(crate) fn function_mut(
        &mut self,
        name: &str,
        mangled_name: &str,
    ) -> Option<&mut FunctionDecl> {
        self.overloads.get_mut(name)?.find_mut(mangled_name)
    }
}
