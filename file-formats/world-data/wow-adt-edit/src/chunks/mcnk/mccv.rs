use binrw::{BinRead, BinWrite};

use super::mcvt::VERTEX_COUNT;
use crate::chunk_id::ChunkId;
use crate::error::{AdtError, Result};
use crate::record::{FixedRecord, RecordTable};

/// Single vertex color (4 bytes BGRA).
///
/// 0x7F represents neutral (1.0 multiplier); values below darken the terrain,
/// values above brighten it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexColor {
    /// Blue channel (0x00-0xFF)
    pub b: u8,

    /// Green channel (0x00-0xFF)
    pub g: u8,

    /// Red channel (0x00-0xFF)
    pub r: u8,

    /// Alpha channel (0x00-0xFF)
    pub a: u8,
}

impl Default for VertexColor {
    fn default() -> Self {
        Self::neutral()
    }
}

impl VertexColor {
    /// Create neutral color (no tinting).
    pub const fn neutral() -> Self {
        Self {
            b: 0x7F,
            g: 0x7F,
            r: 0x7F,
            a: 0xFF,
        }
    }

    /// Create from RGB values (alpha = 0xFF).
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { b, g, r, a: 0xFF }
    }
}

impl FixedRecord for VertexColor {
    const SIZE: usize = 4;
}

/// MCCV (vertex shading, WotLK+) and MCLV (vertex lighting, Cataclysm+).
///
/// Both chunks hold one BGRA color per vertex in MCVT order.
///
/// Reference: <https://wowdev.wiki/ADT/v18#MCCV_sub-chunk>
#[derive(Debug, Clone, PartialEq)]
pub struct VertexColors {
    colors: RecordTable<VertexColor>,
}

impl VertexColors {
    /// Every vertex neutral.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            colors: RecordTable::from_records(vec![VertexColor::neutral(); VERTEX_COUNT]),
        }
    }

    /// Decode chunk data for `chunk` (MCCV or MCLV).
    pub fn decode(chunk: ChunkId, data: &[u8]) -> Result<Self> {
        let colors = RecordTable::decode_count(data, VERTEX_COUNT).map_err(|_| {
            AdtError::InvalidChunkSize {
                chunk,
                expected: VERTEX_COUNT * VertexColor::SIZE,
                actual: data.len(),
            }
        })?;
        Ok(Self { colors })
    }

    /// Serialized chunk data.
    pub fn encode(&self) -> Result<Vec<u8>> {
        self.colors.encode()
    }

    /// Serialized size in bytes.
    #[must_use]
    pub fn encoded_len(&self) -> u64 {
        self.colors.encoded_len()
    }

    /// Colors in vertex order.
    #[must_use]
    pub fn colors(&self) -> &[VertexColor] {
        self.colors.as_slice()
    }

    /// Mutable colors in vertex order.
    pub fn colors_mut(&mut self) -> &mut [VertexColor] {
        self.colors.as_mut_slice()
    }
}
