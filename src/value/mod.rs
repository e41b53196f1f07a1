//! Value module - In-memory representation of JSON/YAML content trees.
//!
//! Maps keep insertion order so that canonicalization is observable;
//! see [`canonicalize`] for the order-independent form.

mod canonical;
mod value;

#[cfg(test)]
pub(crate) mod strategy;

pub use canonical::*;
pub use value::*;
