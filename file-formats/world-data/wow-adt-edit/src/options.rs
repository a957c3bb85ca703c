//! Settings for reading and writing documents.

use crate::version::AdtVersion;

/// How a document is read and how its masks are encoded.
///
/// ```
/// use wow_adt_edit::{AdtVersion, DocumentOptions};
///
/// let options = DocumentOptions::default()
///     .with_version(AdtVersion::WotLK)
///     .with_high_res_alpha(false);
/// assert_eq!(options.version, Some(AdtVersion::WotLK));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DocumentOptions {
    /// Layout to assume; `None` detects it from the root chunks present.
    pub version: Option<AdtVersion>,
    /// Whether alpha maps are 8-bit (the WDT "big alpha" flag) or 4-bit.
    pub high_res_alpha: bool,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            version: None,
            high_res_alpha: true,
        }
    }
}

impl DocumentOptions {
    /// Force a version instead of detecting it.
    #[must_use]
    pub fn with_version(mut self, version: AdtVersion) -> Self {
        self.version = Some(version);
        self
    }

    /// Select 8-bit or 4-bit alpha maps.
    #[must_use]
    pub fn with_high_res_alpha(mut self, high_res_alpha: bool) -> Self {
        self.high_res_alpha = high_res_alpha;
        self
    }
}

/// Extra work done by [`AdtDocument::write_with`](crate::AdtDocument::write_with).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WriteOptions {
    /// Prune unused layers and filenames before writing.
    pub optimize: bool,
}

impl WriteOptions {
    #[must_use]
    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }
}
