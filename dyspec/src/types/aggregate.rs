//! Aggregate types
//!
//! This file provides the composite shapes of the type model:
//! - `TupleTypeSpec`: an ordered list of (optionally labeled) element types.
//! - `ClosureTypeSpec`: a function type from an argument type to a return type.
//! - `ProtocolListTypeSpec`: a protocol composition with set semantics.
use std::{fmt, slice};

use either::Either;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::{NamedTypeSpec, TypeSpec, list_matches};

/// Tuple type. Element labels are carried by the elements themselves.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TupleTypeSpec {
    elements: Vec<TypeSpec>,
}

impl TupleTypeSpec {
    pub fn new(elements: impl IntoIterator<Item = TypeSpec>) -> Self {
        Self {
            elements: elements.into_iter().collect(),
        }
    }

    pub fn elements(&self) -> &[TypeSpec] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub(crate) fn matches(&self, other: &TupleTypeSpec, partial: bool) -> bool {
        list_matches(&self.elements, &other.elements, partial)
    }

    pub(crate) fn render(&self, f: &mut fmt::Formatter<'_>, use_full_names: bool) -> fmt::Result {
        f.write_str("(")?;
        for (i, elem) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            elem.render(f, use_full_names)?;
        }
        f.write_str(")")
    }
}

/// Closure (function) type.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClosureTypeSpec {
    arguments: Box<TypeSpec>,
    returns: Box<TypeSpec>,
    throws: bool,
}

impl ClosureTypeSpec {
    pub fn new(arguments: TypeSpec, returns: TypeSpec, throws: bool) -> Self {
        Self {
            arguments: Box::new(arguments),
            returns: Box::new(returns),
            throws,
        }
    }

    /// The closure `() -> ()`.
    pub fn void_void() -> Self {
        Self::new(TypeSpec::empty_tuple(), TypeSpec::empty_tuple(), false)
    }

    pub fn arguments(&self) -> &TypeSpec {
        &self.arguments
    }

    pub fn returns(&self) -> &TypeSpec {
        &self.returns
    }

    pub fn throws(&self) -> bool {
        self.throws
    }

    pub fn has_return(&self) -> bool {
        !self.returns.is_empty_tuple()
    }

    pub fn has_arguments(&self) -> bool {
        !self.arguments.is_empty_tuple()
    }

    pub fn argument_count(&self) -> usize {
        self.argument_list().len()
    }

    /// Iterate over the individual arguments. A non-tuple argument type is a
    /// single argument.
    pub fn each_argument(&self) -> impl Iterator<Item = &TypeSpec> {
        match self.arguments.as_tuple() {
            Some(tuple) => Either::Left(tuple.elements().iter()),
            None => Either::Right(std::iter::once(self.arguments.as_ref())),
        }
    }

    fn argument_list(&self) -> &[TypeSpec] {
        match self.arguments.as_tuple() {
            Some(tuple) => tuple.elements(),
            None => slice::from_ref(self.arguments.as_ref()),
        }
    }

    /// Closure attributes live on the enclosing [`TypeSpec`], so these
    /// checks take it as a parameter.
    pub fn is_escaping(spec: &TypeSpec) -> bool {
        spec.is_closure() && spec.has_attribute("escaping")
    }

    pub fn is_autoclosure(spec: &TypeSpec) -> bool {
        spec.is_closure() && spec.has_attribute("autoclosure")
    }

    fn needs_argument_parentheses(&self) -> bool {
        let arguments = self.arguments.as_ref();
        !arguments.is_tuple()
            && (arguments.is_closure()
                || arguments.is_inout()
                || arguments.label().is_some()
                || arguments.has_attributes())
    }

    // `T -> U` and `(T) -> U` denote the same closure.
    pub(crate) fn matches(&self, other: &ClosureTypeSpec, partial: bool) -> bool {
        self.throws == other.throws
            && list_matches(self.argument_list(), other.argument_list(), partial)
            && self.returns.matches(&other.returns, partial)
    }

    pub(crate) fn render(&self, f: &mut fmt::Formatter<'_>, use_full_names: bool) -> fmt::Result {
        // A bare argument carrying a modifier or a closure is parenthesized so
        // that it reparses as the argument rather than as the whole closure.
        if self.needs_argument_parentheses() {
            f.write_str("(")?;
            self.arguments.render(f, use_full_names)?;
            f.write_str(")")?;
        } else {
            self.arguments.render(f, use_full_names)?;
        }
        if self.throws {
            f.write_str(" throws -> ")?;
        } else {
            f.write_str(" -> ")?;
        }
        self.returns.render(f, use_full_names)
    }
}

/// Protocol composition (`A & B & C`).
///
/// Constituents are kept sorted by their rendered, fully qualified name and
/// duplicates are dropped, so two lists built from permutations of the same
/// protocols are equal.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProtocolListTypeSpec {
    protocols: Vec<NamedTypeSpec>,
}

impl ProtocolListTypeSpec {
    pub fn new(protocols: impl IntoIterator<Item = NamedTypeSpec>) -> Self {
        let mut keyed: Vec<(String, NamedTypeSpec)> = protocols
            .into_iter()
            .map(|proto| (proto.to_string(), proto))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| a.cmp(b));
        keyed.dedup_by(|(a, _), (b, _)| a == b);

        Self {
            protocols: keyed.into_iter().map(|(_, proto)| proto).collect(),
        }
    }

    pub fn protocols(&self) -> &[NamedTypeSpec] {
        &self.protocols
    }

    pub fn len(&self) -> usize {
        self.protocols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.protocols.is_empty()
    }

    pub(crate) fn matches(&self, other: &ProtocolListTypeSpec, partial: bool) -> bool {
        if self.protocols.len() != other.protocols.len() {
            return false;
        }

        if partial {
            // Stripping modules may reorder the constituents.
            let mut ours: Vec<&NamedTypeSpec> = self.protocols.iter().collect();
            let mut theirs: Vec<&NamedTypeSpec> = other.protocols.iter().collect();
            ours.sort_by(|a, b| a.name_without_module().cmp(b.name_without_module()));
            theirs.sort_by(|a, b| a.name_without_module().cmp(b.name_without_module()));
            ours.iter().zip(&theirs).all(|(a, b)| a.matches(b, true))
        } else {
            self.protocols
                .iter()
                .zip(&other.protocols)
                .all(|(a, b)| a.matches(b, false))
        }
    }

    pub(crate) fn render(&self, f: &mut fmt::Formatter<'_>, use_full_names: bool) -> fmt::Result {
        for (i, proto) in self.protocols.iter().enumerate() {
            if i > 0 {
                f.write_str(" & ")?;
            }
            proto.render_name(f, use_full_names)?;
            proto.render_inner(f, use_full_names)?;
        }
        Ok(())
    }
}
