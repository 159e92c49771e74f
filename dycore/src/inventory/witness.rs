use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::decl::{FunctionDecl, Signature, WitnessKind};

/// Witness-table symbols of a type, grouped by kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WitnessInventory {
    entries: BTreeMap<WitnessKind, Vec<FunctionDecl>>,
}

impl WitnessInventory {
    /// File a witness-table declaration. Returns it back if its signature is
    /// not a witness table.
    pub fn add(&mut self, func: FunctionDecl) -> Result<(), FunctionDecl> {
        let kind = match &func.signature {
            Signature::WitnessTable { kind, .. } => *kind,
            _ => return Err(func),
        };
        self.entries.entry(kind).or_default().push(func);
        Ok(())
    }

    pub fn of_kind(&self, kind: WitnessKind) -> &[FunctionDecl] {
        self.entries.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn entries(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.entries.values().flatten()
    }

    pub fn mangled_names(&self) -> impl Iterator<Item = &str> {
        self.entries().map(|func| func.mangled_name.as_str())
    }

    /// The value witness table, if the image exports one for this type.
    pub fn value_witness_table(&self) -> Option<&FunctionDecl> {
        self.of_kind(WitnessKind::Value).first()
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
