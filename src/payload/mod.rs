//! Payload module - The portable export document.
//!
//! Covers the JSON layout, the optional HMAC integrity tag and the file
//! transport used by the CLI.

mod file;
mod integrity;
mod payload;

pub use file::*;
pub use integrity::*;
pub use payload::*;
