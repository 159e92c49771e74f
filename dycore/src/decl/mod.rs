//! Decoded declarations
//!
//! A [`Declaration`] is what the symbol decoder hands back for one exported
//! symbol. Every declaration carries the module it belongs to, its mangled
//! name (its identity) and its offset in the image. Most declarations also
//! name the nominal type that owns them; the inventory uses that owner to
//! route the declaration to the right [`TypeContents`](crate::inventory::TypeContents).
use std::fmt;

use dyspec::types::TypeSpec;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIs};

pub mod signature;

pub use signature::{
    AccessorKind, InitializerKind, PropertySignature, Signature, StaticFunctionSignature, Thunk,
    WitnessKind,
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIs, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum NominalKind {
    Class,
    Struct,
    Enum,
    Protocol,
}

/// Name of a nominal type: its module, its (possibly nested) path inside the
/// module and its kind.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NominalName {
    pub module: String,
    pub path: Vec<String>,
    pub kind: NominalKind,
}

impl NominalName {
    pub fn new(
        module: impl Into<String>,
        path: impl IntoIterator<Item = impl Into<String>>,
        kind: NominalKind,
    ) -> Self {
        Self {
            module: module.into(),
            path: path.into_iter().map(Into::into).collect(),
            kind,
        }
    }

    pub fn class(
        module: impl Into<String>,
        path: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::new(module, path, NominalKind::Class)
    }

    pub fn protocol(
        module: impl Into<String>,
        path: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::new(module, path, NominalKind::Protocol)
    }

    /// `Module.Outer.Inner`
    pub fn fully_qualified_name(&self) -> String {
        let mut name = self.module.clone();
        for part in &self.path {
            name.push('.');
            name.push_str(part);
        }
        name
    }

    /// Innermost path component, or the module name for an empty path.
    pub fn name(&self) -> &str {
        self.path.last().unwrap_or(&self.module)
    }

    /// The type expression naming this type.
    pub fn as_type_spec(&self) -> TypeSpec {
        TypeSpec::named(self.fully_qualified_name())
    }
}

impl fmt::Display for NominalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.module)?;
        for part in &self.path {
            write!(f, ".{}", part)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub module: String,
    pub owner: Option<NominalName>,
    /// Unqualified member name.
    pub name: String,
    pub mangled_name: String,
    pub offset: u64,
    pub signature: Signature,
}

impl FunctionDecl {
    /// Qualified name of the owner, or the module for free functions.
    pub fn owner_name(&self) -> String {
        match &self.owner {
            Some(owner) => owner.fully_qualified_name(),
            None => self.module.clone(),
        }
    }

    pub fn is_thunk(&self) -> bool {
        self.signature
            .as_static_function()
            .is_some_and(|sig| sig.is_thunk)
    }

    /// Returns `true` if both declarations are a static function and its
    /// thunk, in either role, on the same owner and under the same name.
    pub fn is_equivalent_to(&self, other: &FunctionDecl) -> bool {
        match (
            self.signature.as_static_function(),
            other.signature.as_static_function(),
        ) {
            (Some(ours), Some(theirs)) => {
                self.owner == other.owner
                    && self.name == other.name
                    && ours.is_thunk_pair_of(theirs)
            }
            _ => false,
        }
    }

    /// Symbol names that contain `...` are privatized by the compiler and do
    /// not describe public API.
    pub fn is_privatized(&self) -> bool {
        self.name.contains("...")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDecl {
    pub module: String,
    pub owner: Option<NominalName>,
    pub name: String,
    pub mangled_name: String,
    pub offset: u64,
    pub of_type: TypeSpec,
    pub is_static: bool,
}

/// A metadata-like record attached to exactly one nominal type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRecord {
    pub module: String,
    pub owner: NominalName,
    pub mangled_name: String,
    pub offset: u64,
}

/// Descriptor of the conformance of `owner` to `protocol`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConformanceDecl {
    pub module: String,
    pub owner: NominalName,
    pub protocol: NominalName,
    pub mangled_name: String,
    pub offset: u64,
}

#[derive(Debug, Clone, PartialEq, EnumIs, Serialize, Deserialize)]
pub enum Declaration {
    Function(FunctionDecl),
    Variable(VariableDecl),
    DirectMetadata(TypeRecord),
    LazyCacheVariable(TypeRecord),
    Metaclass(TypeRecord),
    NominalTypeDescriptor(TypeRecord),
    ProtocolConformanceDescriptor(ConformanceDecl),
    PropertyDescriptor(VariableDecl),
    MethodDescriptor(FunctionDecl),
}

impl Declaration {
    pub fn module(&self) -> &str {
        match self {
            Declaration::Function(f) | Declaration::MethodDescriptor(f) => &f.module,
            Declaration::Variable(v) | Declaration::PropertyDescriptor(v) => &v.module,
            Declaration::DirectMetadata(r)
            | Declaration::LazyCacheVariable(r)
            | Declaration::Metaclass(r)
            | Declaration::NominalTypeDescriptor(r) => &r.module,
            Declaration::ProtocolConformanceDescriptor(c) => &c.module,
        }
    }

    pub fn mangled_name(&self) -> &str {
        match self {
            Declaration::Function(f) | Declaration::MethodDescriptor(f) => &f.mangled_name,
            Declaration::Variable(v) | Declaration::PropertyDescriptor(v) => &v.mangled_name,
            Declaration::DirectMetadata(r)
            | Declaration::LazyCacheVariable(r)
            | Declaration::Metaclass(r)
            | Declaration::NominalTypeDescriptor(r) => &r.mangled_name,
            Declaration::ProtocolConformanceDescriptor(c) => &c.mangled_name,
        }
    }

    pub fn offset(&self) -> u64 {
        match self {
            Declaration::Function(f) | Declaration::MethodDescriptor(f) => f.offset,
            Declaration::Variable(v) | Declaration::PropertyDescriptor(v) => v.offset,
            Declaration::DirectMetadata(r)
            | Declaration::LazyCacheVariable(r)
            | Declaration::Metaclass(r)
            | Declaration::NominalTypeDescriptor(r) => r.offset,
            Declaration::ProtocolConformanceDescriptor(c) => c.offset,
        }
    }

    /// The nominal type this declaration belongs to, if any.
    pub fn owner(&self) -> Option<&NominalName> {
        match self {
            Declaration::Function(f) | Declaration::MethodDescriptor(f) => f.owner.as_ref(),
            Declaration::Variable(v) | Declaration::PropertyDescriptor(v) => v.owner.as_ref(),
            Declaration::DirectMetadata(r)
            | Declaration::LazyCacheVariable(r)
            | Declaration::Metaclass(r)
            | Declaration::NominalTypeDescriptor(r) => Some(&r.owner),
            Declaration::ProtocolConformanceDescriptor(c) => Some(&c.owner),
        }
    }

    /// Unqualified member name for functions and variables.
    pub fn member_name(&self) -> Option<&str> {
        match self {
            Declaration::Function(f) | Declaration::MethodDescriptor(f) => Some(&f.name),
            Declaration::Variable(v) | Declaration::PropertyDescriptor(v) => Some(&v.name),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionDecl> {
        match self {
            Declaration::Function(f) | Declaration::MethodDescriptor(f) => Some(f),
            _ => None,
        }
    }
}
