//! Declaration builders and in-memory scan collaborators for tests.
use std::collections::HashMap;

use dyspec::types::TypeSpec;

use crate::{
    decl::{
        AccessorKind, Declaration, FunctionDecl, NominalName, PropertySignature, Signature,
        StaticFunctionSignature, TypeRecord, WitnessKind,
    },
    scan::{
        Architecture, DecodeError, ImageError, ImageReader, SymbolDecoder, SymbolEntry, SymbolImage,
    },
};

fn function(
    module: &str,
    ty: &str,
    name: &str,
    mangled: &str,
    signature: Signature,
) -> FunctionDecl {
    FunctionDecl {
        module: module.to_string(),
        owner: Some(NominalName::class(module, [ty])),
        name: name.to_string(),
        mangled_name: mangled.to_string(),
        offset: 0,
        signature,
    }
}

fn self_type(module: &str, ty: &str) -> TypeSpec {
    TypeSpec::named(format!("{}.{}", module, ty))
}

/// Constructor of class `module.ty` named `name` taking no argument.
pub fn constructor(module: &str, ty: &str, name: &str, mangled: &str) -> FunctionDecl {
    let signature = Signature::Constructor {
        name: name.to_string(),
        parameters: TypeSpec::empty_tuple(),
        returns: self_type(module, ty),
        throws: false,
    };
    function(module, ty, name, mangled, signature)
}

/// Type metadata accessor of class `module.ty`.
pub fn class_constructor(module: &str, ty: &str, mangled: &str) -> FunctionDecl {
    let signature = Signature::ClassConstructor {
        returns: TypeSpec::named("Swift.AnyObject"),
    };
    function(module, ty, "metadata accessor", mangled, signature)
}

/// `() -> ()` method of class `module.ty`.
pub fn method(module: &str, ty: &str, name: &str, mangled: &str) -> FunctionDecl {
    let signature = Signature::UncurriedFunction {
        instance: self_type(module, ty),
        parameters: TypeSpec::empty_tuple(),
        returns: TypeSpec::empty_tuple(),
        throws: false,
    };
    function(module, ty, name, mangled, signature)
}

/// `() -> ()` static function of class `module.ty`, thunk-shaped if `is_thunk`.
pub fn static_function(
    module: &str,
    ty: &str,
    name: &str,
    mangled: &str,
    is_thunk: bool,
) -> FunctionDecl {
    let mut sig =
        StaticFunctionSignature::new(TypeSpec::empty_tuple(), TypeSpec::empty_tuple(), false);
    if is_thunk {
        sig = sig.as_thunk();
    }
    function(module, ty, name, mangled, Signature::StaticFunction(sig))
}

/// `Swift.Int` instance property accessor of class `module.ty`.
pub fn property_accessor(
    module: &str,
    ty: &str,
    name: &str,
    mangled: &str,
    kind: AccessorKind,
) -> FunctionDecl {
    let signature = Signature::Property(PropertySignature::new(kind, TypeSpec::named("Swift.Int")));
    function(module, ty, name, mangled, signature)
}

/// Protocol witness table of class `module.ty`.
pub fn witness_table(module: &str, ty: &str, mangled: &str) -> FunctionDecl {
    let signature = Signature::WitnessTable {
        kind: WitnessKind::Protocol,
        protocol: None,
    };
    function(module, ty, "protocol witness table", mangled, signature)
}

pub fn type_record(module: &str, ty: &str, mangled: &str) -> TypeRecord {
    TypeRecord {
        module: module.to_string(),
        owner: NominalName::class(module, [ty]),
        mangled_name: mangled.to_string(),
        offset: 0,
    }
}

/// Image reader ignoring its input and returning a fixed symbol table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryImageReader {
    image: SymbolImage,
}

impl InMemoryImageReader {
    pub fn new<'a>(
        architecture: Architecture,
        symbols: impl IntoIterator<Item = (&'a str, u64)>,
    ) -> Self {
        Self {
            image: SymbolImage {
                architecture,
                symbols: symbols
                    .into_iter()
                    .map(|(name, offset)| SymbolEntry::new(name, offset))
                    .collect(),
            },
        }
    }
}

impl ImageReader for InMemoryImageReader {
    fn read(&self, _bytes: &[u8]) -> Result<SymbolImage, ImageError> {
        Ok(self.image.clone())
    }
}

/// Decoder answering from a table keyed by mangled name. Unknown names are
/// malformed.
#[derive(Debug, Clone, Default)]
pub struct TableDecoder {
    table: HashMap<String, Result<Declaration, DecodeError>>,
}

impl TableDecoder {
    pub fn with(mut self, mangled: &str, result: Result<Declaration, DecodeError>) -> Self {
        self.table.insert(mangled.to_string(), result);
        self
    }

    /// Shorthand for a function declaration decoded from its own mangled name.
    pub fn with_function(self, func: FunctionDecl) -> Self {
        let mangled = func.mangled_name.clone();
        self.with(&mangled, Ok(Declaration::Function(func)))
    }
}

impl SymbolDecoder for TableDecoder {
    fn decode(
        &self,
        mangled: &str,
        _old_mangling: bool,
        offset: u64,
    ) -> Result<Declaration, DecodeError> {
        match self.table.get(mangled) {
            Some(Ok(decl)) => {
                let mut decl = decl.clone();
                set_offset(&mut decl, offset);
                Ok(decl)
            }
            Some(Err(err)) => Err(err.clone()),
            None => Err(DecodeError::Malformed {
                reason: format!("no entry for `{}`", mangled),
            }),
        }
    }
}

fn set_offset(decl: &mut Declaration, offset: u64) {
    match decl {
        Declaration::Function(f) | Declaration::MethodDescriptor(f) => f.offset = offset,
        Declaration::Variable(v) | Declaration::PropertyDescriptor(v) => v.offset = offset,
        Declaration::DirectMetadata(r)
        | Declaration::LazyCacheVariable(r)
        | Declaration::Metaclass(r)
        | Declaration::NominalTypeDescriptor(r) => r.offset = offset,
        Declaration::ProtocolConformanceDescriptor(c) => c.offset = offset,
    }
}
