//! ADT chunk structure definitions.
//!
//! ## Organization
//!
//! - [`simple`] - Fixed-layout root chunks (MVER, MHDR, MCIN entries, MFBO)
//! - [`strings`] - String table chunks (MTEX, MMDX, MWMO)
//! - [`placement`] - Object placement records (MDDF, MODF)
//! - [`mcnk`] - Terrain cell header and subchunks (MCVT, MCNR, MCLY, MCRF, ...)
//!
//! Alpha maps (MCAL) live in [`crate::alpha`]; the chunks that hold offsets
//! (MHDR, MCIN, MMID, MWID, the MCNK header and MCLY) are rewritten from
//! tracked handles when a document is written.

pub mod mcnk;
pub mod placement;
pub mod simple;
pub mod strings;

pub use simple::{CELL_COUNT, HeaderSlot, McinEntry, MfboChunk, MhdrChunk, MverChunk};

pub use strings::StringTable;

pub use placement::{DoodadPlacement, WmoPlacement};

pub use mcnk::{
    CellField, LiquidChunk, MclyFlags, MclyLayer, McnkFlags, McnkHeader, McnrChunk, McrfChunk,
    McseChunk, McshChunk, McvtChunk, SoundEmitter, VertexColor, VertexColors, VertexNormal,
};
