//! Where tile bytes come from.
//!
//! Game files are named with backslash-separated, case-insensitive paths
//! (`World\Maps\Azeroth\Azeroth_32_48.adt`). [`AssetSource`] resolves such a
//! name to bytes; archive readers implement it elsewhere, and
//! [`DirectorySource`] serves an extracted client data directory.
//!
//! ```no_run
//! use wow_adt_edit::{AdtDocument, DirectorySource, DocumentOptions};
//!
//! # fn main() -> wow_adt_edit::Result<()> {
//! let source = DirectorySource::new("/data/extracted");
//! let doc = AdtDocument::load(
//!     &source,
//!     "World\\Maps\\Azeroth\\Azeroth_32_48.adt",
//!     DocumentOptions::default(),
//! )?;
//! println!("{} textures", doc.textures().len());
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::trace;

use crate::error::{AdtError, Result};

/// Resolves asset identifiers to file contents.
pub trait AssetSource {
    /// Contents of `id`.
    fn read(&self, id: &str) -> Result<Vec<u8>>;

    /// Whether `id` can be read.
    fn has(&self, id: &str) -> bool;
}

/// An extracted data directory.
///
/// Identifiers may use either separator. When the exact path does not exist,
/// each component is matched case-insensitively, as the client does.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory identifiers are resolved against.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// On-disk path for `id`, if it exists.
    #[must_use]
    pub fn resolve(&self, id: &str) -> Option<PathBuf> {
        let components: Vec<&str> = id
            .split(['\\', '/'])
            .filter(|part| !part.is_empty())
            .collect();
        if components.is_empty() || components.iter().any(|part| *part == "..") {
            return None;
        }

        let exact = components
            .iter()
            .fold(self.root.clone(), |path, part| path.join(part));
        if exact.is_file() {
            return Some(exact);
        }

        let mut path = self.root.clone();
        for part in components {
            path = find_entry(&path, part)?;
        }
        trace!("resolved {id} to {}", path.display());
        path.is_file().then_some(path)
    }
}

/// Entry of `dir` named `name`, ignoring ASCII case.
fn find_entry(dir: &Path, name: &str) -> Option<PathBuf> {
    let exact = dir.join(name);
    if exact.exists() {
        return Some(exact);
    }
    fs::read_dir(dir)
        .ok()?
        .flatten()
        .find(|entry| entry.file_name().to_string_lossy().eq_ignore_ascii_case(name))
        .map(|entry| entry.path())
}

impl AssetSource for DirectorySource {
    fn read(&self, id: &str) -> Result<Vec<u8>> {
        let path = self.resolve(id).ok_or_else(|| {
            AdtError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{id} not found under {}", self.root.display()),
            ))
        })?;
        Ok(fs::read(path)?)
    }

    fn has(&self, id: &str) -> bool {
        self.resolve(id).is_some()
    }
}
