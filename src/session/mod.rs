//! Session module - Preview a payload, then commit decisions for it.
//!
//! A [`ReconciliationSession`] moves from empty to previewed to committed.
//! Preview compares each incoming item with the store and groups the
//! differences by container and locale; commit resolves each decision with
//! the merge module and writes through the repository.

mod decision;
mod result;
mod session;


pub use decision::*;
pub use result::*;
pub use session::*;
