//! Error types for ADT reading, writing and editing.
//!
//! Reading is fail-fast: the first malformed chunk aborts the read and no
//! partial document is returned. Editing validates every argument before the
//! document is touched, so an `Err` from a mutation means nothing changed.
//!
//! # Error Categories
//!
//! - **Format** - unsupported version, bad magic, truncated chunk, offsets
//!   outside the file, malformed alpha streams ([`ErrorKind::Format`])
//! - **Index** - a mutation addressed a cell, layer, record or name that does
//!   not exist, or passed an unusable argument ([`ErrorKind::Index`])
//! - **Capacity** - a cell already carries the maximum of four texture layers
//!   ([`ErrorKind::Capacity`])
//! - **Layout** - a serialized offset no longer fits its field
//!   ([`ErrorKind::Layout`])
//! - **Io** - the underlying reader or writer failed ([`ErrorKind::Io`])
//!
//! Broken relocation bookkeeping is not an error value: it is a defect in the
//! editing code and panics through an assertion.
//!
//! # Examples
//!
//! ```
//! use wow_adt_edit::error::{AdtError, ErrorKind, Result};
//! use wow_adt_edit::ChunkId;
//!
//! fn validate_magic(magic: [u8; 4], expected: ChunkId, offset: u64) -> Result<()> {
//!     let found = ChunkId(magic);
//!     if found != expected {
//!         return Err(AdtError::InvalidMagic {
//!             expected,
//!             found,
//!             offset,
//!         });
//!     }
//!     Ok(())
//! }
//!
//! let err = validate_magic(*b"XXXX", ChunkId::MVER, 0).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Format);
//! ```

use thiserror::Error;

use crate::ChunkId;

/// Result type alias using [`AdtError`] as the error type.
pub type Result<T> = std::result::Result<T, AdtError>;

/// Coarse classification of an [`AdtError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The input bytes are not a valid ADT file.
    Format,
    /// A mutation addressed something that does not exist.
    Index,
    /// A per-cell hard limit would be exceeded.
    Capacity,
    /// The in-memory layout cannot be serialized.
    Layout,
    /// Reading or writing the underlying storage failed.
    Io,
}

/// Errors that can occur while reading, editing or writing ADT files.
#[derive(Error, Debug)]
pub enum AdtError {
    /// Underlying I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The version chunk holds a value other than 18.
    #[error("Unsupported ADT version {0}, expected 18")]
    UnsupportedVersion(u32),

    /// Chunk magic bytes don't match the chunk expected at this position.
    ///
    /// ```text
    /// Expected MCNK chunk at offset 0x1000, but found MCLQ instead.
    /// ```
    #[error("Invalid magic bytes: expected {expected}, found {found} at offset {offset}")]
    InvalidMagic {
        /// Expected chunk identifier.
        expected: ChunkId,
        /// Actual chunk identifier found in file.
        found: ChunkId,
        /// File offset where invalid magic was encountered.
        offset: u64,
    },

    /// Required chunk is missing (its header offset is zero).
    #[error("Missing required chunk: {0}")]
    MissingRequiredChunk(ChunkId),

    /// An offset field points outside the file.
    ///
    /// ```text
    /// MCIN entry references MCNK at offset 0x50000, but file is only 0x40000 bytes.
    /// ```
    #[error("Offset out of bounds for chunk {chunk}: offset {offset} at file position {file_position}")]
    OffsetOutOfBounds {
        /// Chunk being addressed.
        chunk: ChunkId,
        /// Offset value that exceeds bounds.
        offset: u32,
        /// File position of the offset field.
        file_position: u64,
    },

    /// Fixed-size chunk has the wrong size.
    ///
    /// ```text
    /// MVER chunk must be exactly 4 bytes, found 8 bytes instead.
    /// ```
    #[error("Invalid chunk size for {chunk}: expected {expected}, got {actual}")]
    InvalidChunkSize {
        /// Chunk with invalid size.
        chunk: ChunkId,
        /// Expected size in bytes.
        expected: usize,
        /// Actual size in bytes.
        actual: usize,
    },

    /// Subchunk offset points outside the parent MCNK.
    #[error("Invalid subchunk offset for {parent}: offset {offset} exceeds chunk size {chunk_size}")]
    InvalidSubchunkOffset {
        /// Parent chunk containing the subchunk.
        parent: ChunkId,
        /// Subchunk offset that exceeds bounds.
        offset: u32,
        /// Total size of parent chunk.
        chunk_size: u32,
    },

    /// A chunk declares more data than its container holds.
    #[error("Truncated chunk {chunk} at offset {offset}: declares {declared} bytes, {available} available")]
    TruncatedChunk {
        /// Chunk that is cut short.
        chunk: ChunkId,
        /// File offset of the chunk header.
        offset: u64,
        /// Data size from the chunk header.
        declared: u32,
        /// Bytes actually available.
        available: u64,
    },

    /// Ran out of bytes while decoding a fixed structure.
    #[error("Unexpected end of data")]
    UnexpectedEof,

    /// Generic chunk parsing failure with context.
    ///
    /// ```text
    /// Failed to parse MCAL chunk at offset 0x3000: alpha map runs past chunk end.
    /// ```
    #[error("Chunk parse error for {chunk} at offset {offset}: {details}")]
    ChunkParseError {
        /// Chunk that failed to parse.
        chunk: ChunkId,
        /// File offset where error occurred.
        offset: u64,
        /// Detailed error description.
        details: String,
    },

    /// Binary parsing library error.
    #[error("binrw error: {0}")]
    BinrwError(String),

    /// Cell coordinates outside the 16x16 grid.
    #[error("Cell ({row}, {col}) is outside the 16x16 grid")]
    CellOutOfRange {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
    },

    /// Index past the end of a table.
    #[error("{table} index {index} out of range (length {len})")]
    IndexOutOfRange {
        /// Human-readable table name.
        table: &'static str,
        /// Requested index.
        index: usize,
        /// Current table length.
        len: usize,
    },

    /// Texture index exceeds the MTEX entry count.
    #[error("Invalid texture reference: index {index} exceeds texture count {count}")]
    InvalidTextureReference {
        /// Invalid texture index.
        index: u32,
        /// Total number of available textures.
        count: u32,
    },

    /// Model or WMO name index exceeds the name table.
    #[error("Invalid model reference: index {index} exceeds model count {count}")]
    InvalidModelReference {
        /// Invalid model index.
        index: u32,
        /// Total number of available names.
        count: u32,
    },

    /// The addressed layer has no alpha map (it is the base layer, or was
    /// stored without the alpha flag).
    #[error("Texture layer {layer} has no alpha map")]
    LayerWithoutAlpha {
        /// Layer index within its cell.
        layer: usize,
    },

    /// A name table entry is not matched by the same entry in its offset
    /// table, so it cannot be edited by ordinal.
    #[error("{chunk} entry {index} is not paired with its offset table entry")]
    UnpairedNameTable {
        /// The string table chunk.
        chunk: ChunkId,
        /// Entry index.
        index: usize,
    },

    /// Filenames must be non-empty and NUL-free.
    #[error("Invalid filename {0:?}")]
    InvalidName(String),

    /// Replacing a filename would store it twice.
    #[error("Filename {0:?} is already present")]
    DuplicateName(String),

    /// A cell already carries the maximum number of texture layers.
    #[error("Cell ({row}, {col}) already has the maximum of {max} texture layers")]
    TooManyLayers {
        /// Cell row.
        row: usize,
        /// Cell column.
        col: usize,
        /// Layer limit.
        max: usize,
    },

    /// A relative offset no longer fits in its 32-bit field.
    #[error("Offset at file position {field} cannot encode value {value}")]
    OffsetOverflow {
        /// Address of the offset field.
        field: u64,
        /// Relative value that does not fit.
        value: i64,
    },

    /// Two regions claim the same bytes while serializing.
    #[error("Layout conflict: {chunk} at {address} overlaps previously written data")]
    LayoutConflict {
        /// Chunk being written.
        chunk: ChunkId,
        /// Its tracked address.
        address: u64,
    },
}

impl AdtError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::UnsupportedVersion(_)
            | Self::InvalidMagic { .. }
            | Self::MissingRequiredChunk(_)
            | Self::OffsetOutOfBounds { .. }
            | Self::InvalidChunkSize { .. }
            | Self::InvalidSubchunkOffset { .. }
            | Self::TruncatedChunk { .. }
            | Self::UnexpectedEof
            | Self::ChunkParseError { .. }
            | Self::BinrwError(_) => ErrorKind::Format,
            Self::CellOutOfRange { .. }
            | Self::IndexOutOfRange { .. }
            | Self::InvalidTextureReference { .. }
            | Self::InvalidModelReference { .. }
            | Self::LayerWithoutAlpha { .. }
            | Self::UnpairedNameTable { .. }
            | Self::InvalidName(_)
            | Self::DuplicateName(_) => ErrorKind::Index,
            Self::TooManyLayers { .. } => ErrorKind::Capacity,
            Self::OffsetOverflow { .. } | Self::LayoutConflict { .. } => ErrorKind::Layout,
        }
    }
}

impl From<binrw::Error> for AdtError {
    fn from(err: binrw::Error) -> Self {
        match err {
            binrw::Error::Io(io) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
                Self::UnexpectedEof
            }
            other => Self::BinrwError(format!("{other}")),
        }
    }
}
