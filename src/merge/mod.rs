//! Merge module - Maps an operator decision onto the tree to persist.
//!
//! [`Action::Both`] performs a recursive merge where incoming values win
//! every non-map collision.

mod resolver;


pub use resolver::*;
