//! MCNK terrain cell header and subchunks.
//!
//! Each of the 256 MCNK chunks of a tile covers a 33.33×33.33 yard cell and
//! nests its own subchunks for vertex data, normals, texture layers and so on.

pub mod header;
pub mod mccv;
pub mod mcly;
pub mod mcnr;
pub mod mcrf;
pub mod mcse;
pub mod mcsh;
pub mod mcvt;

pub use header::{CellField, McnkFlags, McnkHeader};
pub use mccv::{VertexColor, VertexColors};
pub use mcly::{MAX_LAYERS, MclyFlags, MclyLayer};
pub use mcnr::{McnrChunk, VertexNormal};
pub use mcrf::McrfChunk;
pub use mcse::{McseChunk, SoundEmitter};
pub use mcsh::{LiquidChunk, McshChunk};
pub use mcvt::{McvtChunk, VERTEX_COUNT};
