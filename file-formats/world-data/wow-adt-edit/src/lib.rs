//! In-place editing of World of Warcraft ADT terrain files
//!
//! An ADT file is a tree of chunks addressed by absolute and relative byte
//! offsets: MHDR points at the root tables, MCIN at the 256 terrain cells,
//! each MCNK header at its subchunks, MMID/MWID into the filename tables and
//! every texture layer into its cell's alpha maps. Changing the length of any
//! chunk moves everything after it.
//!
//! [`AdtDocument`] reads a tile into typed tables while tracking where every
//! chunk starts and every offset field points. Structural edits (adding a
//! texture, placing a model, adding a layer) update the tables and relocate
//! the tracked addresses, so [`AdtDocument::write`] emits a file whose offsets
//! are all consistent. Bytes this crate does not interpret (unknown chunks,
//! MH2O, padding) are carried through unchanged.
//!
//! ## Supported Versions
//!
//! Monolithic (single file) tiles, version 18:
//!
//! - Vanilla (1.x)
//! - The Burning Crusade (2.x)
//! - Wrath of the Lich King (3.x)
//! - Cataclysm (4.x) and Mists of Pandaria (5.x) root layouts
//!
//! ## Example
//!
//! ```no_run
//! use wow_adt_edit::{AdtDocument, CellCoord, DocumentOptions, MclyFlags};
//!
//! # fn main() -> wow_adt_edit::Result<()> {
//! let mut doc = AdtDocument::from_path("Azeroth_32_48.adt", DocumentOptions::default())?;
//! println!("ADT version: {}", doc.version());
//!
//! let grass = doc.add_texture_filename("Tileset\\Elwynn\\ElwynnGrass01.blp")?;
//! let cell = CellCoord::new(4, 7);
//! if doc.cell(cell)?.layers().len() < 4 {
//!     doc.add_texture_layer(cell, grass as u32, MclyFlags::default(), 0, None)?;
//! }
//!
//! doc.save("Azeroth_32_48.adt")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## References
//!
//! Based on information from:
//! - <https://wowdev.wiki/ADT>
//! - <https://wowdev.wiki/ADT/v18>

pub mod alpha;
mod builder;
pub mod cell;
pub mod chunk_header;
pub mod chunk_id;
pub mod chunks;
pub mod document;
pub mod error;
pub mod io_helpers;
mod layout;
mod mutation;
mod names;
pub mod optimize;
pub mod options;
pub mod record;
pub mod relocation;
pub mod source;
pub mod version;

pub use alpha::{AlphaEncoding, AlphaGrid, AlphaMap};
pub use cell::{Cell, CellCoord, GRID_SIZE, TextureLayer};
pub use chunk_header::ChunkHeader;
pub use chunk_id::ChunkId;
pub use chunks::{
    CellField, DoodadPlacement, HeaderSlot, MclyFlags, McnkFlags, McnkHeader, MfboChunk,
    StringTable, WmoPlacement,
};
pub use document::{AdtDocument, OffsetSite};
pub use error::{AdtError, ErrorKind, Result};
pub use optimize::OptimizeReport;
pub use options::{DocumentOptions, WriteOptions};
pub use record::{FixedRecord, RecordTable};
pub use source::{AssetSource, DirectorySource};
pub use version::AdtVersion;
