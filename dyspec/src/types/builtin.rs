//! Closed sets of built-in value type names.
use phf::{Set, phf_set};

use crate::types::TypeSpec;

static INTEGRAL_NAMES: Set<&'static str> = phf_set! {
    "Swift.Int", "Swift.UInt", "Swift.Int8", "Swift.UInt8",
    "Swift.Int16", "Swift.UInt16", "Swift.Int32", "Swift.UInt32",
    "Swift.Int64", "Swift.UInt64", "Swift.Char",
};

static FLOATING_POINT_NAMES: Set<&'static str> = phf_set! {
    "Swift.Float", "Swift.Double", "CoreGraphics.CGFloat",
};

static BOOLEAN_NAMES: Set<&'static str> = phf_set! {
    "Swift.Bool",
};

fn named_in(spec: &TypeSpec, set: &Set<&'static str>) -> bool {
    spec.as_named()
        .is_some_and(|named| set.contains(named.name()))
}

impl TypeSpec {
    pub fn is_integral(&self) -> bool {
        named_in(self, &INTEGRAL_NAMES)
    }

    pub fn is_floating_point(&self) -> bool {
        named_in(self, &FLOATING_POINT_NAMES)
    }

    pub fn is_boolean(&self) -> bool {
        named_in(self, &BOOLEAN_NAMES)
    }

    pub fn is_builtin_value_type(&self) -> bool {
        self.is_integral() || self.is_floating_point() || self.is_boolean()
    }
}
