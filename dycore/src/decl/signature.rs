//! Signatures of decoded function-like symbols.
use dyspec::types::TypeSpec;
use enum_map::Enum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIs, EnumIter};

use crate::decl::NominalName;

/// Member name of an allocating constructor.
pub const ALLOCATING_CONSTRUCTOR_NAME: &str = "__allocating_init";

/// Member name of a non-allocating constructor.
pub const NON_ALLOCATING_CONSTRUCTOR_NAME: &str = "init";

/// Member name of a deallocating destructor.
pub const DEALLOCATING_DESTRUCTOR_NAME: &str = "__deallocating_deinit";

/// Member name of a non-deallocating destructor.
pub const NON_DEALLOCATING_DESTRUCTOR_NAME: &str = "deinit";

pub fn is_constructor_name(name: &str) -> bool {
    name == ALLOCATING_CONSTRUCTOR_NAME || name == NON_ALLOCATING_CONSTRUCTOR_NAME
}

pub fn is_destructor_name(name: &str) -> bool {
    name == DEALLOCATING_DESTRUCTOR_NAME || name == NON_DEALLOCATING_DESTRUCTOR_NAME
}

/// The role a property accessor plays.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, Enum, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum AccessorKind {
    Getter,
    Setter,
    Materializer,
    #[strum(to_string = "willSet")]
    WillSet,
    #[strum(to_string = "didSet")]
    DidSet,
    #[strum(to_string = "modify")]
    ModifyAccessor,
}

/// Kind of a witness-table related symbol.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, Serialize,
    Deserialize,
)]
pub enum WitnessKind {
    /// Value witness table of a nominal type.
    Value,
    /// Protocol witness table for one conformance.
    Protocol,
    /// Accessor function returning a protocol witness table.
    ProtocolAccessor,
    /// Lazy accessor for a protocol witness table.
    LazyProtocolAccessor,
    /// Cache variable backing a lazy protocol witness table accessor.
    LazyProtocolCacheVariable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum InitializerKind {
    /// Initializer expression of a global or static variable.
    Variable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySignature {
    pub accessor: AccessorKind,
    /// Type of the property value.
    pub of_type: TypeSpec,
    /// Index parameters. Empty unless `is_subscript` is set.
    pub subscript_parameters: Vec<TypeSpec>,
    pub is_subscript: bool,
    pub is_static: bool,
    pub is_private: bool,
}

impl PropertySignature {
    pub fn new(accessor: AccessorKind, of_type: TypeSpec) -> Self {
        Self {
            accessor,
            of_type,
            subscript_parameters: Vec::new(),
            is_subscript: false,
            is_static: false,
            is_private: false,
        }
    }

    pub fn subscript(mut self, parameters: impl IntoIterator<Item = TypeSpec>) -> Self {
        self.is_subscript = true;
        self.subscript_parameters = parameters.into_iter().collect();
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_private(mut self, is_private: bool) -> Self {
        self.is_private = is_private;
        self
    }
}

/// The thunk linked to a canonical static function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thunk {
    pub mangled_name: String,
    pub offset: u64,
    pub signature: StaticFunctionSignature,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticFunctionSignature {
    pub parameters: TypeSpec,
    pub returns: TypeSpec,
    pub throws: bool,
    /// Set when this symbol is itself a thunk wrapping the canonical function.
    pub is_thunk: bool,
    pub thunk: Option<Box<Thunk>>,
}

impl StaticFunctionSignature {
    pub fn new(parameters: TypeSpec, returns: TypeSpec, throws: bool) -> Self {
        Self {
            parameters,
            returns,
            throws,
            is_thunk: false,
            thunk: None,
        }
    }

    pub fn as_thunk(mut self) -> Self {
        self.is_thunk = true;
        self
    }

    /// Two static signatures describe the same callable when they agree on
    /// parameters, return type and `throws` and exactly one of them is a
    /// thunk.
    pub fn is_thunk_pair_of(&self, other: &StaticFunctionSignature) -> bool {
        self.is_thunk != other.is_thunk
            && self.throws == other.throws
            && self.parameters == other.parameters
            && self.returns == other.returns
    }
}

/// Decoded signature of a function-like symbol.
#[derive(Debug, Clone, PartialEq, EnumIs, Serialize, Deserialize)]
pub enum Signature {
    Constructor {
        name: String,
        parameters: TypeSpec,
        returns: TypeSpec,
        throws: bool,
    },
    /// Type metadata accessor.
    ClassConstructor { returns: TypeSpec },
    Destructor { name: String },
    Property(PropertySignature),
    /// A method uncurried over an instance of `instance`.
    UncurriedFunction {
        instance: TypeSpec,
        parameters: TypeSpec,
        returns: TypeSpec,
        throws: bool,
    },
    StaticFunction(StaticFunctionSignature),
    WitnessTable {
        kind: WitnessKind,
        protocol: Option<NominalName>,
    },
    Initializer { kind: InitializerKind, of_type: TypeSpec },
}

impl Signature {
    pub fn as_property(&self) -> Option<&PropertySignature> {
        match self {
            Signature::Property(prop) => Some(prop),
            _ => None,
        }
    }

    pub fn as_static_function(&self) -> Option<&StaticFunctionSignature> {
        match self {
            Signature::StaticFunction(sig) => Some(sig),
            _ => None,
        }
    }

    pub fn as_static_function_mut(&mut self) -> Option<&mut StaticFunctionSignature> {
        match self {
            Signature::StaticFunction(sig) => Some(sig),
            _ => None,
        }
    }

    /// Returns `true` for a method uncurried over an instance of `owner`.
    pub fn is_method_on(&self, owner: &NominalName) -> bool {
        match self {
            Signature::UncurriedFunction { instance, .. } => instance
                .as_named()
                .is_some_and(|named| named.name() == owner.fully_qualified_name()),
            _ => false,
        }
    }
}
