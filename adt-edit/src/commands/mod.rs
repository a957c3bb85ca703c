//! Command implementations

pub mod info;
pub mod layers;
pub mod rewrite;
pub mod textures;

use anyhow::{Context, Result};
use wow_adt_edit::{AdtDocument, DocumentOptions};

/// Load `file`, naming it in the error.
pub fn load(file: &str, options: DocumentOptions) -> Result<AdtDocument> {
    AdtDocument::from_path(file, options).with_context(|| format!("Failed to parse ADT file: {file}"))
}

/// Write `doc` to `file`, naming it in the error.
pub fn save(doc: &AdtDocument, file: &str) -> Result<()> {
    doc.save(file)
        .with_context(|| format!("Failed to write ADT file: {file}"))
}
