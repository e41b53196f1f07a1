//! Export module - Produces payload files from live content.

mod exporter;

pub use exporter::*;
