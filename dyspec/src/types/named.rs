use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::TypeSpec;

/// Fully qualified spelling of `Any`.
pub const SWIFT_ANY: &str = "Swift.Any";

/// Fully qualified spelling of `AnyObject`.
pub const SWIFT_ANY_OBJECT: &str = "Swift.AnyObject";

/// A reference to a nominal type by name.
///
/// The name is either bare (`T`) or qualified by its module
/// (`Swift.Int`). A named type may select an inner type after its generic
/// arguments, as in `Swift.Dictionary<Swift.String, T>.Index`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NamedTypeSpec {
    name: String,
    inner_type: Option<Box<TypeSpec>>,
}

impl NamedTypeSpec {
    /// Create a named type.
    ///
    /// The demangler prints `Any` and `AnyObject` as members of the `Swift`
    /// module when asked for fully qualified names, so the bare spellings are
    /// rewritten to `Swift.Any` and `Swift.AnyObject` here. No other name is
    /// touched.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let name = match name.as_str() {
            "Any" => SWIFT_ANY.to_string(),
            "AnyObject" => SWIFT_ANY_OBJECT.to_string(),
            _ => name,
        };

        Self {
            name,
            inner_type: None,
        }
    }

    pub(crate) fn set_inner_type(&mut self, inner: TypeSpec) {
        self.inner_type = Some(Box::new(inner));
    }

    pub(crate) fn take_inner_type(&mut self) -> Option<TypeSpec> {
        self.inner_type.take().map(|inner| *inner)
    }

    /// `Swift.Dictionary` joined with `Index` becomes `Swift.Dictionary.Index`.
    /// The inner chain of `inner` is kept.
    pub(crate) fn join_name(&mut self, inner: NamedTypeSpec) {
        self.name.push('.');
        self.name.push_str(&inner.name);
        self.inner_type = inner.inner_type;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inner_type(&self) -> Option<&TypeSpec> {
        self.inner_type.as_deref()
    }

    pub fn has_module(&self) -> bool {
        self.name.contains('.')
    }

    /// The module qualifier, if any.
    pub fn module(&self) -> Option<&str> {
        self.name.split_once('.').map(|(module, _)| module)
    }

    pub fn name_without_module(&self) -> &str {
        match self.name.split_once('.') {
            Some((_, rest)) => rest,
            None => &self.name,
        }
    }

    pub(crate) fn matches(&self, other: &NamedTypeSpec, partial: bool) -> bool {
        let names_match = if partial {
            self.name_without_module() == other.name_without_module()
        } else {
            self.name == other.name
        };

        names_match
            && match (&self.inner_type, &other.inner_type) {
                (None, None) => true,
                (Some(a), Some(b)) => a.matches(b, partial),
                _ => false,
            }
    }

    pub(crate) fn render_name(
        &self,
        f: &mut fmt::Formatter<'_>,
        use_full_names: bool,
    ) -> fmt::Result {
        if use_full_names {
            f.write_str(&self.name)
        } else {
            f.write_str(self.name_without_module())
        }
    }

    pub(crate) fn render_inner(
        &self,
        f: &mut fmt::Formatter<'_>,
        use_full_names: bool,
    ) -> fmt::Result {
        match &self.inner_type {
            Some(inner) => {
                f.write_str(".")?;
                inner.render(f, use_full_names)
            }
            None => Ok(()),
        }
    }
}

impl fmt::Display for NamedTypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render_name(f, true)?;
        self.render_inner(f, true)
    }
}
