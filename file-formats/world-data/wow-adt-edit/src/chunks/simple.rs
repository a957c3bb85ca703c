//! Fixed-layout root chunks: MVER, MHDR, MCIN entries and MFBO.

use binrw::{BinRead, BinWrite};

use crate::chunk_id::ChunkId;
use crate::record::FixedRecord;

/// MVER - Version chunk (always 18 for ADT files, Vanilla+)
///
/// All ADT versions from Vanilla through MoP use version 18.
/// Version detection uses chunk presence analysis instead.
///
/// Reference: <https://wowdev.wiki/ADT/v18#MVER_chunk>
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct MverChunk {
    /// Version number (always 18)
    pub version: u32,
}

impl Default for MverChunk {
    fn default() -> Self {
        Self {
            version: crate::version::ADT_MVER,
        }
    }
}

impl FixedRecord for MverChunk {
    const SIZE: usize = 4;
}

/// One of the eleven offset fields in MHDR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeaderSlot {
    /// Cell index
    Mcin,
    /// Texture filenames
    Mtex,
    /// Model filenames
    Mmdx,
    /// Model filename offsets
    Mmid,
    /// WMO filenames
    Mwmo,
    /// WMO filename offsets
    Mwid,
    /// Model placements
    Mddf,
    /// WMO placements
    Modf,
    /// Flight bounds (TBC+)
    Mfbo,
    /// Liquids (WotLK+)
    Mh2o,
    /// Texture flags
    Mtxf,
}

impl HeaderSlot {
    /// All slots in header order.
    pub const ALL: [HeaderSlot; 11] = [
        HeaderSlot::Mcin,
        HeaderSlot::Mtex,
        HeaderSlot::Mmdx,
        HeaderSlot::Mmid,
        HeaderSlot::Mwmo,
        HeaderSlot::Mwid,
        HeaderSlot::Mddf,
        HeaderSlot::Modf,
        HeaderSlot::Mfbo,
        HeaderSlot::Mh2o,
        HeaderSlot::Mtxf,
    ];

    /// Position of the slot in [`MhdrChunk::offsets`].
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Chunk the slot points at.
    #[must_use]
    pub fn chunk_id(self) -> ChunkId {
        match self {
            HeaderSlot::Mcin => ChunkId::MCIN,
            HeaderSlot::Mtex => ChunkId::MTEX,
            HeaderSlot::Mmdx => ChunkId::MMDX,
            HeaderSlot::Mmid => ChunkId::MMID,
            HeaderSlot::Mwmo => ChunkId::MWMO,
            HeaderSlot::Mwid => ChunkId::MWID,
            HeaderSlot::Mddf => ChunkId::MDDF,
            HeaderSlot::Modf => ChunkId::MODF,
            HeaderSlot::Mfbo => ChunkId::MFBO,
            HeaderSlot::Mh2o => ChunkId::MH2O,
            HeaderSlot::Mtxf => ChunkId::MTXF,
        }
    }

    /// Whether a file without this chunk is malformed.
    #[must_use]
    pub fn is_required(self) -> bool {
        !matches!(self, HeaderSlot::Mfbo | HeaderSlot::Mh2o | HeaderSlot::Mtxf)
    }

    /// Distance of the field from the start of the MHDR data.
    #[must_use]
    pub fn field_offset(self) -> u64 {
        4 + 4 * self.index() as u64
    }
}

/// MHDR - Header chunk with offsets to all major chunks (64 bytes, Vanilla+)
///
/// ```text
/// Offset | Size | Field
/// -------|------|------------------------------------------
/// 0x00   |  4   | flags
/// 0x04   | 44   | offsets, one per HeaderSlot
/// 0x30   | 16   | unused, kept verbatim
/// ```
///
/// Offsets are relative to the start of the MHDR data (file offset 0x14).
/// A value of 0 means the chunk is not present.
///
/// Reference: <https://wowdev.wiki/ADT/v18#MHDR_chunk>
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct MhdrChunk {
    /// Flags indicating optional features
    /// - 0x01: MFBO present (flight bounds)
    /// - 0x02: Northrend tile
    pub flags: u32,

    /// Chunk offsets in [`HeaderSlot`] order
    pub offsets: [u32; 11],

    /// Unused trailing bytes
    pub trailing: [u8; 16],
}

impl MhdrChunk {
    /// Flag bit: the MFBO offset is valid.
    pub const FLAG_MFBO: u32 = 0x1;
    /// Flag bit: the tile belongs to Northrend.
    pub const FLAG_NORTHREND: u32 = 0x2;

    /// Stored offset for `slot`.
    #[must_use]
    pub fn offset(&self, slot: HeaderSlot) -> u32 {
        self.offsets[slot.index()]
    }

    /// Whether the MFBO offset should be followed.
    #[must_use]
    pub fn has_mfbo(&self) -> bool {
        self.flags & Self::FLAG_MFBO != 0
    }
}

impl FixedRecord for MhdrChunk {
    const SIZE: usize = 64;
}

/// Number of cells in a tile, and of MCIN entries.
pub const CELL_COUNT: usize = 256;

/// MCIN - MCNK chunk index entry (16 bytes per entry, Vanilla+)
///
/// Each entry provides location and metadata for one MCNK terrain chunk.
/// MCIN contains exactly 256 entries (16x16 grid).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct McinEntry {
    /// Absolute file offset to MCNK chunk
    pub offset: u32,

    /// Size of MCNK chunk in bytes
    pub size: u32,

    /// Flags (rarely used, usually 0)
    pub flags: u32,

    /// Async object ID (used by client for loading)
    pub async_id: u32,
}

impl FixedRecord for McinEntry {
    const SIZE: usize = 16;
}

/// MFBO - Flight boundaries for flying mounts (TBC+, 36 bytes)
///
/// Defines maximum and minimum height planes for flying mount restrictions.
/// Each plane has 9 vertices arranged in a 3x3 grid covering the ADT tile.
///
/// Reference: <https://wowdev.wiki/ADT/v18#MFBO_chunk>
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MfboChunk {
    /// Maximum height plane (9 i16 values in 3x3 grid)
    pub max_plane: [i16; 9],
    /// Minimum height plane (9 i16 values in 3x3 grid)
    pub min_plane: [i16; 9],
}

impl FixedRecord for MfboChunk {
    const SIZE: usize = 36;
}
