use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::decl::VariableDecl;

/// Variables grouped by name. A name may be shared by a stored variable and
/// its static counterpart, so each group is a list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariableInventory {
    variables: BTreeMap<String, Vec<VariableDecl>>,
}

impl VariableInventory {
    pub fn add(&mut self, var: VariableDecl) {
        self.variables.entry(var.name.clone()).or_default().push(var);
    }

    pub fn get(&self, name: &str) -> &[VariableDecl] {
        self.variables
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    pub fn variables(&self) -> impl Iterator<Item = &VariableDecl> {
        self.variables.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.variables.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
