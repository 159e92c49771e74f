//! Types module
//!
//! This module contains the structural representation of type expressions as
//! they appear in decoded signatures of a reflected library. The model is a
//! small recursive algebra made of four shapes:
//!
//! - Named types, optionally generic and optionally carrying an inner type
//!   (see `named.rs`).
//! - Tuples, closures and protocol compositions (see `aggregate.rs`).
//!
//! Every node additionally carries an attribute list, an in-out flag and an
//! optional label. Nodes are immutable once built: the `with_*` builders
//! consume and return a new value.
//!
//! Two equality semantics are provided. [`PartialEq`] compares fully
//! qualified names, while [`TypeSpec::eq_partial`] strips the module qualifier
//! of named types so that declarations whose module is not resolved yet can
//! still be matched.
use std::fmt::{self, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumDiscriminants, EnumIs, EnumTryAs};

use crate::generics::GenericContext;

pub mod aggregate;
pub mod builtin;
pub mod named;

pub use aggregate::{ClosureTypeSpec, ProtocolListTypeSpec, TupleTypeSpec};
pub use named::NamedTypeSpec;

/// An attribute attached to a type expression, e.g. `@escaping` or
/// `@convention(thin)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TypeSpecAttribute {
    pub name: String,
    pub parameters: Vec<String>,
}

impl TypeSpecAttribute {
    /// Create an attribute without parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
        }
    }

    /// Create an attribute with the given parameter list.
    pub fn with_parameters(
        name: impl Into<String>,
        parameters: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            parameters: parameters.into_iter().map(Into::into).collect(),
        }
    }
}

impl Display for TypeSpecAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)?;
        if !self.parameters.is_empty() {
            write!(f, "({})", self.parameters.join(", "))?;
        }
        Ok(())
    }
}

/// The kind-specific payload of a [`TypeSpec`].
#[derive(Debug, Clone, EnumIs, EnumTryAs, EnumDiscriminants)]
#[strum_discriminants(name(TypeSpecKind), derive(Hash, strum::Display))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TypeSpecShape {
    /// A nominal type reference such as `Swift.Int` or `Swift.Array<T>.Index`.
    Named(NamedTypeSpec),

    /// An ordered, possibly labeled, list of element types. The empty tuple is
    /// the unit type.
    Tuple(TupleTypeSpec),

    /// A function type `arguments -> returns`.
    Closure(ClosureTypeSpec),

    /// A protocol composition `A & B`, kept sorted by name.
    ProtocolList(ProtocolListTypeSpec),
}

impl TypeSpecShape {
    fn matches(&self, other: &TypeSpecShape, partial: bool) -> bool {
        match (self, other) {
            (TypeSpecShape::Named(a), TypeSpecShape::Named(b)) => a.matches(b, partial),
            (TypeSpecShape::Tuple(a), TypeSpecShape::Tuple(b)) => a.matches(b, partial),
            (TypeSpecShape::Closure(a), TypeSpecShape::Closure(b)) => a.matches(b, partial),
            (TypeSpecShape::ProtocolList(a), TypeSpecShape::ProtocolList(b)) => {
                a.matches(b, partial)
            }
            _ => false,
        }
    }
}

/// A type expression.
///
/// Example:
/// ```rust
/// # use dyspec::types::TypeSpec;
/// let array = TypeSpec::named_generic("Swift.Array", [TypeSpec::named("Swift.Int")]);
/// assert_eq!(array.to_string(), "Swift.Array<Swift.Int>");
/// assert!(array.is_array());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TypeSpec {
    shape: TypeSpecShape,
    generic_parameters: Vec<TypeSpec>,
    attributes: Vec<TypeSpecAttribute>,
    is_inout: bool,
    label: Option<String>,
}

impl TypeSpec {
    fn from_shape(shape: TypeSpecShape) -> Self {
        Self {
            shape,
            generic_parameters: Vec::new(),
            attributes: Vec::new(),
            is_inout: false,
            label: None,
        }
    }

    /// A named type without generic parameters. `Any` and `AnyObject` are
    /// canonicalized, see [`NamedTypeSpec::new`].
    pub fn named(name: impl Into<String>) -> Self {
        NamedTypeSpec::new(name).into()
    }

    /// A named type specialized with the given generic parameters.
    pub fn named_generic(
        name: impl Into<String>,
        generic_parameters: impl IntoIterator<Item = TypeSpec>,
    ) -> Self {
        Self::named(name).with_generic_parameters(generic_parameters)
    }

    /// A tuple of the given elements, in order.
    pub fn tuple(elements: impl IntoIterator<Item = TypeSpec>) -> Self {
        TupleTypeSpec::new(elements).into()
    }

    /// The empty tuple `()`.
    pub fn empty_tuple() -> Self {
        TupleTypeSpec::default().into()
    }

    /// A closure type `arguments -> returns`.
    pub fn closure(arguments: TypeSpec, returns: TypeSpec, throws: bool) -> Self {
        ClosureTypeSpec::new(arguments, returns, throws).into()
    }

    /// A protocol composition. Duplicates are dropped and constituents are
    /// sorted by their rendered name.
    pub fn protocol_list(protocols: impl IntoIterator<Item = NamedTypeSpec>) -> Self {
        ProtocolListTypeSpec::new(protocols).into()
    }

    /// Replace the generic parameter list.
    pub fn with_generic_parameters(
        mut self,
        generic_parameters: impl IntoIterator<Item = TypeSpec>,
    ) -> Self {
        self.generic_parameters = generic_parameters.into_iter().collect();
        self
    }

    /// Select `inner` as an inner type of this named type.
    ///
    /// The inner type is only kept as a separate node after generic
    /// arguments (`Swift.Dictionary<K, V>.Index`). Without generic arguments
    /// the names are joined instead, so `Swift.Dictionary` and `Index` give
    /// the named type `Swift.Dictionary.Index` with `inner`'s generic
    /// parameters. A type that is not named is returned unchanged.
    ///
    /// ```rust
    /// # use dyspec::types::TypeSpec;
    /// let index = TypeSpec::named("Swift.Dictionary").with_inner_type(TypeSpec::named("Index"));
    /// assert_eq!(index, TypeSpec::named("Swift.Dictionary.Index"));
    /// ```
    pub fn with_inner_type(mut self, inner: TypeSpec) -> Self {
        let TypeSpecShape::Named(named) = &mut self.shape else {
            return self;
        };

        if let Some(current) = named.take_inner_type() {
            named.set_inner_type(current.with_inner_type(inner));
        } else if self.generic_parameters.is_empty() {
            match inner.shape {
                TypeSpecShape::Named(inner_named) => {
                    named.join_name(inner_named);
                    self.generic_parameters = inner.generic_parameters;
                }
                shape => named.set_inner_type(TypeSpec { shape, ..inner }),
            }
        } else {
            named.set_inner_type(inner);
        }
        self
    }

    /// Append an attribute. Attributes render in insertion order.
    pub fn with_attribute(mut self, attribute: TypeSpecAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub(crate) fn prepend_attributes(mut self, mut attributes: Vec<TypeSpecAttribute>) -> Self {
        if !attributes.is_empty() {
            attributes.append(&mut self.attributes);
            self.attributes = attributes;
        }
        self
    }

    /// Set the label used when this type is a tuple element.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the in-out flag.
    pub fn with_inout(mut self, is_inout: bool) -> Self {
        self.is_inout = is_inout;
        self
    }

    /// Return a copy of this type with the in-out flag set.
    pub fn with_inout_set(&self) -> Self {
        self.clone().with_inout(true)
    }

    pub fn shape(&self) -> &TypeSpecShape {
        &self.shape
    }

    pub fn kind(&self) -> TypeSpecKind {
        TypeSpecKind::from(&self.shape)
    }

    pub fn generic_parameters(&self) -> &[TypeSpec] {
        &self.generic_parameters
    }

    pub fn contains_generic_parameters(&self) -> bool {
        !self.generic_parameters.is_empty()
    }

    pub fn attributes(&self) -> &[TypeSpecAttribute] {
        &self.attributes
    }

    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }

    /// Returns `true` if an attribute with the given name is attached.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|attr| attr.name == name)
    }

    pub fn is_inout(&self) -> bool {
        self.is_inout
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn is_named(&self) -> bool {
        self.shape.is_named()
    }

    pub fn is_tuple(&self) -> bool {
        self.shape.is_tuple()
    }

    pub fn is_closure(&self) -> bool {
        self.shape.is_closure()
    }

    pub fn is_protocol_list(&self) -> bool {
        self.shape.is_protocol_list()
    }

    pub fn as_named(&self) -> Option<&NamedTypeSpec> {
        match &self.shape {
            TypeSpecShape::Named(named) => Some(named),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&TupleTypeSpec> {
        match &self.shape {
            TypeSpecShape::Tuple(tuple) => Some(tuple),
            _ => None,
        }
    }

    pub fn as_closure(&self) -> Option<&ClosureTypeSpec> {
        match &self.shape {
            TypeSpecShape::Closure(closure) => Some(closure),
            _ => None,
        }
    }

    pub fn as_protocol_list(&self) -> Option<&ProtocolListTypeSpec> {
        match &self.shape {
            TypeSpecShape::ProtocolList(list) => Some(list),
            _ => None,
        }
    }

    /// Returns `true` for the empty tuple `()`.
    pub fn is_empty_tuple(&self) -> bool {
        self.as_tuple().is_some_and(TupleTypeSpec::is_empty)
    }

    /// Returns `true` for `Swift.Array`, whatever its element type.
    pub fn is_array(&self) -> bool {
        self.as_named().is_some_and(|named| named.name() == "Swift.Array")
    }

    pub(crate) fn matches(&self, other: &TypeSpec, partial: bool) -> bool {
        self.kind() == other.kind()
            && self.is_inout == other.is_inout
            && list_matches(&self.generic_parameters, &other.generic_parameters, partial)
            && self.shape.matches(&other.shape, partial)
    }

    /// Module-agnostic equality: named types are compared by their name with
    /// the module qualifier stripped.
    ///
    /// ```rust
    /// # use dyspec::types::TypeSpec;
    /// let qualified = TypeSpec::named("Foundation.Data");
    /// let bare = TypeSpec::named("Data");
    /// assert_ne!(qualified, bare);
    /// assert!(qualified.eq_partial(&bare));
    /// ```
    pub fn eq_partial(&self, other: &TypeSpec) -> bool {
        self.matches(other, true)
    }

    /// Returns `true` if a closure appears anywhere below the root of this
    /// expression (as a generic argument or tuple element, recursively).
    pub fn contains_bound_generic_closure(&self) -> bool {
        self.contains_closure_at_depth(0)
    }

    fn contains_closure_at_depth(&self, depth: usize) -> bool {
        match &self.shape {
            TypeSpecShape::Named(_) => self
                .generic_parameters
                .iter()
                .any(|param| param.contains_closure_at_depth(depth + 1)),
            TypeSpecShape::Tuple(tuple) => tuple
                .elements()
                .iter()
                .any(|elem| elem.contains_closure_at_depth(depth + 1)),
            TypeSpecShape::Closure(_) => depth > 0,
            TypeSpecShape::ProtocolList(_) => false,
        }
    }

    /// Returns `true` if some part of this expression refers to a generic
    /// parameter that is in scope for `context`.
    pub fn is_unbound_generic<C: GenericContext + ?Sized>(&self, context: &C) -> bool {
        match &self.shape {
            TypeSpecShape::Named(named) => {
                context.is_generic_parameter(named.name())
                    || self
                        .generic_parameters
                        .iter()
                        .any(|param| param.is_unbound_generic(context))
            }
            TypeSpecShape::Tuple(tuple) => tuple
                .elements()
                .iter()
                .any(|elem| elem.is_unbound_generic(context)),
            TypeSpecShape::Closure(closure) => {
                closure.arguments().is_unbound_generic(context)
                    || closure.returns().is_unbound_generic(context)
            }
            TypeSpecShape::ProtocolList(_) => false,
        }
    }

    /// Returns `true` if no generic parameter of this expression, however
    /// deeply nested, is an unbound reference to one of `context`'s
    /// in-scope generic parameters.
    ///
    /// ```rust
    /// # use dyspec::{generics::GenericScope, types::TypeSpec};
    /// let scope = GenericScope::new(["T"]);
    /// assert!(TypeSpec::named_generic("Swift.Array", [TypeSpec::named("Swift.Int")]).is_bound_generic(&scope));
    /// assert!(!TypeSpec::named_generic("Swift.Array", [TypeSpec::named("T")]).is_bound_generic(&scope));
    /// ```
    pub fn is_bound_generic<C: GenericContext + ?Sized>(&self, context: &C) -> bool {
        !self.is_unbound_generic(context)
    }

    /// Build a formatting helper that renders this type either with fully
    /// qualified names or with module qualifiers stripped.
    pub fn fmt_names(&self, use_full_names: bool) -> impl Display + '_ {
        struct TypeSpecFmt<'a> {
            ty: &'a TypeSpec,
            use_full_names: bool,
        }

        impl Display for TypeSpecFmt<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.ty.render(f, self.use_full_names)
            }
        }

        TypeSpecFmt {
            ty: self,
            use_full_names,
        }
    }

    pub(crate) fn render(&self, f: &mut fmt::Formatter<'_>, use_full_names: bool) -> fmt::Result {
        for attr in &self.attributes {
            write!(f, "{} ", attr)?;
        }
        if self.is_inout {
            f.write_str("inout ")?;
        }
        if let Some(label) = &self.label {
            write!(f, "{}: ", label)?;
        }

        match &self.shape {
            TypeSpecShape::Named(named) => named.render_name(f, use_full_names)?,
            TypeSpecShape::Tuple(tuple) => tuple.render(f, use_full_names)?,
            TypeSpecShape::Closure(closure) => closure.render(f, use_full_names)?,
            TypeSpecShape::ProtocolList(list) => list.render(f, use_full_names)?,
        }

        if !self.generic_parameters.is_empty() {
            f.write_str("<")?;
            for (i, param) in self.generic_parameters.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                param.render(f, use_full_names)?;
            }
            f.write_str(">")?;
        }

        if let TypeSpecShape::Named(named) = &self.shape {
            named.render_inner(f, use_full_names)?;
        }
        Ok(())
    }
}

impl PartialEq for TypeSpec {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other, false)
    }
}

impl Eq for TypeSpec {}

impl Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, true)
    }
}

macro_rules! type_spec_from {
    ($typ:ty, $lbl:ident) => {
        impl From<$typ> for TypeSpec {
            fn from(value: $typ) -> Self {
                TypeSpec::from_shape(TypeSpecShape::$lbl(value))
            }
        }
    };
}

type_spec_from! { NamedTypeSpec, Named }
type_spec_from! { TupleTypeSpec, Tuple }
type_spec_from! { ClosureTypeSpec, Closure }
type_spec_from! { ProtocolListTypeSpec, ProtocolList }

pub(crate) fn list_matches(one: &[TypeSpec], two: &[TypeSpec], partial: bool) -> bool {
    one.len() == two.len() && one.iter().zip(two).all(|(a, b)| a.matches(b, partial))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inout_participates_in_equality() {
        let plain = TypeSpec::named("Swift.Int");
        let inout = plain.with_inout_set();
        assert_ne!(plain, inout);
        assert_eq!(inout.to_string(), "inout Swift.Int");
    }

    #[test]
    fn labels_and_attributes_render_before_core() {
        let spec = TypeSpec::named("Swift.Int")
            .with_attribute(TypeSpecAttribute::with_parameters("convention", ["thin"]))
            .with_label("x");
        assert_eq!(spec.to_string(), "@convention(thin) x: Swift.Int");
        assert_eq!(spec, TypeSpec::named("Swift.Int"), "labels do not affect equality");
    }

    #[test]
    fn closure_depth_detection() {
        let closure = TypeSpec::closure(TypeSpec::empty_tuple(), TypeSpec::empty_tuple(), false);
        assert!(!closure.contains_bound_generic_closure());

        let optional = TypeSpec::named_generic("Swift.Optional", [closure.clone()]);
        assert!(optional.contains_bound_generic_closure());

        let tuple = TypeSpec::tuple([TypeSpec::named("Swift.Int"), closure]);
        assert!(tuple.contains_bound_generic_closure());
    }

    #[test]
    fn generic_parameter_lists_compare_pairwise() {
        let a = TypeSpec::named_generic(
            "Swift.Dictionary",
            [TypeSpec::named("Swift.Int"), TypeSpec::named("Swift.String")],
        );
        let b = TypeSpec::named_generic(
            "Swift.Dictionary",
            [TypeSpec::named("Swift.String"), TypeSpec::named("Swift.Int")],
        );
        assert_ne!(a, b);
        assert_eq!(a.kind(), TypeSpecKind::Named);
    }

    #[test]
    fn inner_type_after_generics_stays_nested() {
        let generics = [TypeSpec::named("K"), TypeSpec::named("V")];
        let index = TypeSpec::named_generic("Swift.Dictionary", generics)
            .with_inner_type(TypeSpec::named("Index"))
            .with_inner_type(TypeSpec::named("Raw"));
        let named = index.as_named().unwrap();
        assert_eq!(named.name(), "Swift.Dictionary");
        assert_eq!(named.inner_type(), Some(&TypeSpec::named("Index.Raw")));
        assert_eq!(index.to_string(), "Swift.Dictionary<K, V>.Index.Raw");
    }

    #[test]
    fn inner_type_without_generics_joins_names() {
        let keys = TypeSpec::named("Swift.Dictionary")
            .with_inner_type(TypeSpec::named_generic("Keys", [TypeSpec::named("T")]));
        assert_eq!(keys.as_named().map(NamedTypeSpec::name), Some("Swift.Dictionary.Keys"));
        assert!(keys.as_named().and_then(NamedTypeSpec::inner_type).is_none());
        assert_eq!(keys.generic_parameters(), [TypeSpec::named("T")]);
        assert_eq!(keys.to_string(), "Swift.Dictionary.Keys<T>");

        let tuple = TypeSpec::empty_tuple().with_inner_type(TypeSpec::named("Index"));
        assert!(tuple.is_empty_tuple());
    }

    #[test]
    fn short_names_rendering() {
        let spec = TypeSpec::named_generic("Swift.Array", [TypeSpec::named("Foundation.Data")]);
        assert_eq!(spec.fmt_names(false).to_string(), "Array<Data>");
    }
}
