//! MCNK chunk header structure.
//!
//! The MCNK header is 128 bytes and contains metadata for a single terrain cell
//! including its grid position, texture layer count, and offsets to subchunks.
//!
//! **Critical:** Subchunk offsets are relative to the beginning of the MCNK chunk
//! (including the 8-byte chunk header), NOT relative to the MCNK chunk data.

use binrw::{BinRead, BinWrite};

use crate::chunk_id::ChunkId;
use crate::record::FixedRecord;

/// MCNK chunk flags (32-bit bitfield).
///
/// Reference: <https://wowdev.wiki/ADT/v18#MCNK_header>
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct McnkFlags {
    /// Raw flags value
    pub value: u32,
}

impl McnkFlags {
    /// Shadow map (MCSH) present
    pub const HAS_MCSH: u32 = 0x01;
    /// Terrain is impassable
    pub const IMPASSABLE: u32 = 0x02;
    /// Contains river liquid
    pub const RIVER: u32 = 0x04;
    /// Contains ocean liquid
    pub const OCEAN: u32 = 0x08;
    /// Contains magma liquid
    pub const MAGMA: u32 = 0x10;
    /// Contains slime liquid
    pub const SLIME: u32 = 0x20;
    /// Vertex colors (MCCV) present
    pub const HAS_MCCV: u32 = 0x40;
    /// Alpha maps are stored as full 64x64 grids
    pub const DO_NOT_FIX_ALPHA_MAP: u32 = 0x8000;
    /// 64-bit hole mask replaces the height/normal offsets (MoP)
    pub const HIGH_RES_HOLES: u32 = 0x10000;

    /// Shadow map (MCSH) present
    pub fn has_mcsh(&self) -> bool {
        self.value & Self::HAS_MCSH != 0
    }

    /// Terrain is impassable
    pub fn impassable(&self) -> bool {
        self.value & Self::IMPASSABLE != 0
    }

    /// Any legacy liquid type is present
    pub fn has_liquid(&self) -> bool {
        self.value & (Self::RIVER | Self::OCEAN | Self::MAGMA | Self::SLIME) != 0
    }

    /// Vertex colors (MCCV) present (WotLK+)
    pub fn has_mccv(&self) -> bool {
        self.value & Self::HAS_MCCV != 0
    }

    /// Do not fix alpha map (use full 64×64 instead of 63×63)
    pub fn do_not_fix_alpha_map(&self) -> bool {
        self.value & Self::DO_NOT_FIX_ALPHA_MAP != 0
    }

    /// High-resolution holes (64-bit hole map, MoP)
    pub fn high_res_holes(&self) -> bool {
        self.value & Self::HIGH_RES_HOLES != 0
    }
}

/// MCNK chunk header - 128 bytes of terrain metadata.
///
/// ```text
/// Offset | Size | Field              | Description
/// -------|------|--------------------|---------------------------------
/// 0x00   |  4   | flags              | McnkFlags bitfield
/// 0x04   |  4   | index_x            | Cell X coordinate (0-15)
/// 0x08   |  4   | index_y            | Cell Y coordinate (0-15)
/// 0x0C   |  4   | n_layers           | Texture layer count (max 4)
/// 0x10   |  4   | n_doodad_refs      | M2 model reference count
/// 0x14   |  4   | ofs_height         | MCVT offset (vertex heights)
/// 0x18   |  4   | ofs_normal         | MCNR offset (vertex normals)
/// 0x1C   |  4   | ofs_layer          | MCLY offset (texture layers)
/// 0x20   |  4   | ofs_refs           | MCRF offset (object refs)
/// 0x24   |  4   | ofs_alpha          | MCAL offset (alpha maps)
/// 0x28   |  4   | size_alpha         | MCAL size in bytes
/// 0x2C   |  4   | ofs_shadow         | MCSH offset (shadow map)
/// 0x30   |  4   | size_shadow        | MCSH size in bytes
/// 0x34   |  4   | area_id            | Area ID from AreaTable.dbc
/// 0x38   |  4   | n_map_obj_refs     | WMO reference count
/// 0x3C   |  2   | holes              | Low-res hole map (16-bit)
/// 0x3E   |  2   | unknown            | Unknown
/// 0x40   | 16   | pred_tex           | Low quality texture map
/// 0x50   |  8   | no_effect_doodad   | Effect flag (1-bit/cell)
/// 0x58   |  4   | ofs_snd_emitters   | MCSE offset
/// 0x5C   |  4   | n_snd_emitters     | MCSE entry count
/// 0x60   |  4   | ofs_liquid         | MCLQ offset (legacy)
/// 0x64   |  4   | size_liquid        | MCLQ size in bytes
/// 0x68   | 12   | position           | World position [X, Y, Z]
/// 0x74   |  4   | ofs_mccv           | MCCV offset (WotLK+)
/// 0x78   |  4   | ofs_mclv           | MCLV offset (Cata+)
/// 0x7C   |  4   | unused             | Padding
/// ```
///
/// With [`McnkFlags::HIGH_RES_HOLES`] on MoP tiles, 0x14-0x1B hold a 64-bit
/// hole mask instead of the height and normal offsets.
///
/// Offset, size and count fields are recomputed when a document is written;
/// the values here are the ones read from the file.
///
/// Reference: <https://wowdev.wiki/ADT/v18#MCNK_header>
#[derive(Debug, Clone, Copy, Default, PartialEq, BinRead, BinWrite)]
#[brw(little)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct McnkHeader {
    /// Chunk flags
    pub flags: McnkFlags,
    /// Cell column
    pub index_x: u32,
    /// Cell row
    pub index_y: u32,
    /// Number of texture layers
    pub n_layers: u32,
    /// Number of doodad references in MCRF
    pub n_doodad_refs: u32,
    /// MCVT offset
    pub ofs_height: u32,
    /// MCNR offset
    pub ofs_normal: u32,
    /// MCLY offset
    pub ofs_layer: u32,
    /// MCRF offset
    pub ofs_refs: u32,
    /// MCAL offset
    pub ofs_alpha: u32,
    /// MCAL size
    pub size_alpha: u32,
    /// MCSH offset
    pub ofs_shadow: u32,
    /// MCSH size
    pub size_shadow: u32,
    /// Area ID
    pub area_id: u32,
    /// Number of object references in MCRF
    pub n_map_obj_refs: u32,
    /// Low resolution hole mask
    pub holes: u16,
    /// Unknown, usually 0 or 1
    pub unknown: u16,
    /// Low quality texture map (2 bits per 8x8 sub-cell)
    pub pred_tex: [u8; 16],
    /// Disable ground effect doodads (1 bit per 8x8 sub-cell)
    pub no_effect_doodad: [u8; 8],
    /// MCSE offset
    pub ofs_snd_emitters: u32,
    /// Number of sound emitters
    pub n_snd_emitters: u32,
    /// MCLQ offset
    pub ofs_liquid: u32,
    /// MCLQ size
    pub size_liquid: u32,
    /// World position of the cell corner
    pub position: [f32; 3],
    /// MCCV offset
    pub ofs_mccv: u32,
    /// MCLV offset
    pub ofs_mclv: u32,
    /// Unused
    pub unused: u32,
}

impl FixedRecord for McnkHeader {
    const SIZE: usize = 128;
}

/// A subchunk offset field of the MCNK header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellField {
    /// `ofs_height` (MCVT)
    Heights,
    /// `ofs_normal` (MCNR)
    Normals,
    /// `ofs_layer` (MCLY)
    Layers,
    /// `ofs_refs` (MCRF)
    References,
    /// `ofs_alpha` (MCAL)
    AlphaMaps,
    /// `ofs_shadow` (MCSH)
    Shadow,
    /// `ofs_snd_emitters` (MCSE)
    SoundEmitters,
    /// `ofs_liquid` (MCLQ)
    Liquid,
    /// `ofs_mccv` (MCCV)
    VertexColors,
    /// `ofs_mclv` (MCLV)
    VertexLighting,
}

impl CellField {
    /// All offset fields in header order.
    pub const ALL: [CellField; 10] = [
        CellField::Heights,
        CellField::Normals,
        CellField::Layers,
        CellField::References,
        CellField::AlphaMaps,
        CellField::Shadow,
        CellField::SoundEmitters,
        CellField::Liquid,
        CellField::VertexColors,
        CellField::VertexLighting,
    ];

    /// Position in [`CellField::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Offset of the field within the 128-byte header.
    #[must_use]
    pub fn header_offset(self) -> u64 {
        match self {
            CellField::Heights => 0x14,
            CellField::Normals => 0x18,
            CellField::Layers => 0x1C,
            CellField::References => 0x20,
            CellField::AlphaMaps => 0x24,
            CellField::Shadow => 0x2C,
            CellField::SoundEmitters => 0x58,
            CellField::Liquid => 0x60,
            CellField::VertexColors => 0x74,
            CellField::VertexLighting => 0x78,
        }
    }

    /// Subchunk the field points at.
    #[must_use]
    pub fn chunk_id(self) -> ChunkId {
        match self {
            CellField::Heights => ChunkId::MCVT,
            CellField::Normals => ChunkId::MCNR,
            CellField::Layers => ChunkId::MCLY,
            CellField::References => ChunkId::MCRF,
            CellField::AlphaMaps => ChunkId::MCAL,
            CellField::Shadow => ChunkId::MCSH,
            CellField::SoundEmitters => ChunkId::MCSE,
            CellField::Liquid => ChunkId::MCLQ,
            CellField::VertexColors => ChunkId::MCCV,
            CellField::VertexLighting => ChunkId::MCLV,
        }
    }

    /// Stored value of this field in `header`.
    #[must_use]
    pub fn read(self, header: &McnkHeader) -> u32 {
        match self {
            CellField::Heights => header.ofs_height,
            CellField::Normals => header.ofs_normal,
            CellField::Layers => header.ofs_layer,
            CellField::References => header.ofs_refs,
            CellField::AlphaMaps => header.ofs_alpha,
            CellField::Shadow => header.ofs_shadow,
            CellField::SoundEmitters => header.ofs_snd_emitters,
            CellField::Liquid => header.ofs_liquid,
            CellField::VertexColors => header.ofs_mccv,
            CellField::VertexLighting => header.ofs_mclv,
        }
    }

    /// Store `value` in this field of `header`.
    pub fn write(self, header: &mut McnkHeader, value: u32) {
        let slot = match self {
            CellField::Heights => &mut header.ofs_height,
            CellField::Normals => &mut header.ofs_normal,
            CellField::Layers => &mut header.ofs_layer,
            CellField::References => &mut header.ofs_refs,
            CellField::AlphaMaps => &mut header.ofs_alpha,
            CellField::Shadow => &mut header.ofs_shadow,
            CellField::SoundEmitters => &mut header.ofs_snd_emitters,
            CellField::Liquid => &mut header.ofs_liquid,
            CellField::VertexColors => &mut header.ofs_mccv,
            CellField::VertexLighting => &mut header.ofs_mclv,
        };
        *slot = value;
    }
}
