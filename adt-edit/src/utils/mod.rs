//! Shared utilities for the adt-edit CLI

pub mod table;

use humansize::{DECIMAL, format_size};

pub use table::*;

/// Format file size in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}
