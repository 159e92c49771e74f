//! Classification of the exported symbols of a dylib into a queryable model.
//!
//! Symbols are read from an image and decoded by external collaborators (see
//! [`scan`]); every decoded [`decl::Declaration`] is then filed into a
//! [`inventory::ModuleInventory`], the tree of modules, nominal types and
//! their members that downstream emitters walk.

pub mod decl;
pub mod inventory;
pub mod magic;
pub mod scan;
#[cfg(any(test, feature = "test-utils"))]
pub mod tests_utils;
pub mod utils;

pub extern crate dyspec;
