use binrw::{BinRead, BinWrite};

use super::mcvt::VERTEX_COUNT;
use crate::chunk_id::ChunkId;
use crate::error::{AdtError, Result};
use crate::record::{FixedRecord, RecordTable};
use crate::version::NormalPaddingLayout;

/// Bytes that follow the 145 normals in every cell.
pub const NORMAL_PADDING: usize = 13;

/// Single vertex normal (3 bytes compressed).
///
/// Normals are stored as signed bytes in X, Z, Y order.
/// To convert to floating point: `component / 127.0`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexNormal {
    /// X component (-127 to 127)
    pub x: i8,

    /// Z component (-127 to 127)
    pub z: i8,

    /// Y component (-127 to 127)
    pub y: i8,
}

impl VertexNormal {
    /// Straight up.
    pub const UP: Self = Self { x: 0, z: 0, y: 127 };

    /// Convert to normalized floating point vector [X, Y, Z].
    #[must_use]
    pub fn to_normalized(&self) -> [f32; 3] {
        [
            f32::from(self.x) / 127.0,
            f32::from(self.y) / 127.0,
            f32::from(self.z) / 127.0,
        ]
    }
}

impl FixedRecord for VertexNormal {
    const SIZE: usize = 3;
}

/// MCNR chunk - Vertex normals (145 entries, Vanilla+)
///
/// Every cell stores 13 bytes of padding after the normals. Up to WotLK the
/// declared size is 435 and the padding sits outside the chunk; from
/// Cataclysm the declared size is 448 and includes it. Padding outside the
/// chunk is carried as uninterpreted cell bytes, so this type only holds what
/// the declared size covers.
///
/// Reference: <https://wowdev.wiki/ADT/v18#MCNR_sub-chunk>
#[derive(Debug, Clone, PartialEq)]
pub struct McnrChunk {
    normals: RecordTable<VertexNormal>,
}

impl McnrChunk {
    /// All normals pointing up, laid out for `padding`.
    #[must_use]
    pub fn flat(padding: NormalPaddingLayout) -> Self {
        let trailing = match padding {
            NormalPaddingLayout::Inside => vec![0; NORMAL_PADDING],
            NormalPaddingLayout::Outside => Vec::new(),
        };
        Self {
            normals: RecordTable::from_records(vec![VertexNormal::UP; VERTEX_COUNT])
                .with_trailing(trailing),
        }
    }

    /// Decode chunk data.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let normals = RecordTable::decode_count(data, VERTEX_COUNT).map_err(|_| {
            AdtError::InvalidChunkSize {
                chunk: ChunkId::MCNR,
                expected: VERTEX_COUNT * VertexNormal::SIZE,
                actual: data.len(),
            }
        })?;
        Ok(Self { normals })
    }

    /// Serialized chunk data.
    pub fn encode(&self) -> Result<Vec<u8>> {
        self.normals.encode()
    }

    /// Serialized size in bytes.
    #[must_use]
    pub fn encoded_len(&self) -> u64 {
        self.normals.encoded_len()
    }

    /// Where this chunk keeps its padding.
    #[must_use]
    pub fn padding(&self) -> NormalPaddingLayout {
        if self.normals.trailing().is_empty() {
            NormalPaddingLayout::Outside
        } else {
            NormalPaddingLayout::Inside
        }
    }

    /// All normals in file order.
    #[must_use]
    pub fn normals(&self) -> &[VertexNormal] {
        self.normals.as_slice()
    }

    /// Mutable normals in file order.
    pub fn normals_mut(&mut self) -> &mut [VertexNormal] {
        self.normals.as_mut_slice()
    }
}
