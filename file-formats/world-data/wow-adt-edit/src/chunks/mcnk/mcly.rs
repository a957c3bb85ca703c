use binrw::{BinRead, BinWrite};

use crate::record::FixedRecord;

/// Texture layer flags (32-bit bitfield).
///
/// Controls animation, alpha blending, and reflection effects.
///
/// # Bit Layout
///
/// ```text
/// Bits  | Mask   | Description
/// ------|--------|------------------------------------------
/// 0-2   | 0x007  | Animation rotation (0-7)
/// 3-5   | 0x038  | Animation speed (0-7)
/// 6     | 0x040  | Animation enabled
/// 7     | 0x080  | Overbright (layer rendered brighter)
/// 8     | 0x100  | Use alpha map for blending
/// 9     | 0x200  | Alpha map compressed (4096 RLE)
/// 10    | 0x400  | Use cube map reflection (environment)
/// 11-31 | ---    | Unused/reserved
/// ```
///
/// Reference: <https://wowdev.wiki/ADT/v18#MCLY_sub-chunk>
#[derive(Debug, Clone, Copy, Default, BinRead, BinWrite, PartialEq, Eq, Hash)]
#[brw(little)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MclyFlags {
    /// Raw flags value
    pub value: u32,
}

impl MclyFlags {
    /// Layer blends through an alpha map
    pub const USE_ALPHA_MAP: u32 = 0x100;
    /// Alpha map is run-length compressed
    pub const ALPHA_MAP_COMPRESSED: u32 = 0x200;

    /// Wrap a raw value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self { value }
    }

    /// Get animation rotation speed (0-7).
    pub fn animation_rotation(&self) -> u8 {
        (self.value & 0x007) as u8
    }

    /// Get animation speed (0-7).
    pub fn animation_speed(&self) -> u8 {
        ((self.value & 0x038) >> 3) as u8
    }

    /// Animation enabled (texture scrolling).
    pub fn animation_enabled(&self) -> bool {
        self.value & 0x040 != 0
    }

    /// Overbright blending enabled.
    pub fn overbright(&self) -> bool {
        self.value & 0x080 != 0
    }

    /// Use alpha map for blending (all layers except first).
    pub fn use_alpha_map(&self) -> bool {
        self.value & Self::USE_ALPHA_MAP != 0
    }

    /// Alpha map is compressed (RLE format).
    pub fn alpha_map_compressed(&self) -> bool {
        self.value & Self::ALPHA_MAP_COMPRESSED != 0
    }

    /// Use cube map reflection (skybox reflection).
    pub fn use_cube_map_reflection(&self) -> bool {
        self.value & 0x400 != 0
    }

    /// The same flags with the alpha map bits cleared.
    #[must_use]
    pub fn without_alpha(self) -> Self {
        Self::new(self.value & !(Self::USE_ALPHA_MAP | Self::ALPHA_MAP_COMPRESSED))
    }
}

/// Single texture layer entry (16 bytes).
///
/// # Binary Layout
///
/// ```text
/// Offset | Size | Field           | Description
/// -------|------|-----------------|----------------------------------
/// 0x00   |  4   | texture_id      | Index into MTEX chunk
/// 0x04   |  4   | flags           | MclyFlags bitfield
/// 0x08   |  4   | offset_in_mcal  | Byte offset into MCAL chunk data
/// 0x0C   |  4   | effect_id       | Ground effect/doodad ID
/// ```
#[derive(Debug, Clone, Copy, Default, BinRead, BinWrite, PartialEq, Eq)]
#[brw(little)]
pub struct MclyLayer {
    /// Texture ID (index into MTEX chunk)
    pub texture_id: u32,

    /// Layer flags
    pub flags: MclyFlags,

    /// Offset into MCAL chunk data for alpha map data
    pub offset_in_mcal: u32,

    /// Effect ID for ground effects/doodads
    pub effect_id: u32,
}

impl MclyLayer {
    /// Position of `offset_in_mcal` within the record.
    pub const OFFSET_FIELD: u64 = 8;
}

impl FixedRecord for MclyLayer {
    const SIZE: usize = 16;
}

/// Maximum number of texture layers per cell.
pub const MAX_LAYERS: usize = 4;
