//! Content module - The five content kinds and their identities.
//!
//! Every kind-specific decision (identity, grouping, which tree is diffed)
//! is made by a single `match` over [`ContentItem`] or [`IdentityKey`].

mod identity;
mod item;

pub use identity::*;
pub use item::*;
