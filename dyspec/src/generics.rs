//! Generic parameter scopes used to decide whether a type expression is
//! fully bound.

/// Anything that can answer "is this name one of my generic parameters?".
///
/// Declarations nest, so implementations are expected to consult enclosing
/// scopes as well.
pub trait GenericContext {
    fn is_generic_parameter(&self, name: &str) -> bool;
}

impl<T: AsRef<str>> GenericContext for [T] {
    fn is_generic_parameter(&self, name: &str) -> bool {
        self.iter().any(|param| param.as_ref() == name)
    }
}

/// A lexical scope of generic parameter names with an optional parent.
///
/// ```rust
/// # use dyspec::generics::{GenericContext, GenericScope};
/// let outer = GenericScope::new(["Key", "Value"]);
/// let inner = GenericScope::nested(["T"], &outer);
/// assert!(inner.is_generic_parameter("T"));
/// assert!(inner.is_generic_parameter("Value"));
/// assert!(!outer.is_generic_parameter("T"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct GenericScope<'a> {
    parameters: Vec<String>,
    parent: Option<&'a GenericScope<'a>>,
}

impl<'a> GenericScope<'a> {
    pub fn new(parameters: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            parameters: parameters.into_iter().map(Into::into).collect(),
            parent: None,
        }
    }

    pub fn nested(
        parameters: impl IntoIterator<Item = impl Into<String>>,
        parent: &'a GenericScope<'a>,
    ) -> Self {
        Self {
            parameters: parameters.into_iter().map(Into::into).collect(),
            parent: Some(parent),
        }
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }
}

impl GenericContext for GenericScope<'_> {
    fn is_generic_parameter(&self, name: &str) -> bool {
        self.parameters.iter().any(|param| param == name)
            || self
                .parent
                .is_some_and(|parent| parent.is_generic_parameter(name))
    }
}
