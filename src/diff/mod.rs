//! Diff module - Field-level differences between two content trees.
//!
//! [`diff`] walks both trees and reports every differing leaf as a
//! [`PathDiff`]; [`summarize`] reduces the result to an [`ItemStatus`].

mod diffs;
mod engine;
mod path;
mod status;

#[cfg(test)]
mod diff_test;

pub use diffs::*;
pub use engine::*;
pub use path::*;
pub use status::*;
