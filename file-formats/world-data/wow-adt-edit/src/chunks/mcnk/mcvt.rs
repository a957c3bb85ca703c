use crate::chunk_id::ChunkId;
use crate::error::{AdtError, Result};
use crate::record::RecordTable;

/// Number of vertices in a cell: 9×9 outer plus 8×8 inner.
pub const VERTEX_COUNT: usize = 145;

/// MCVT chunk - Vertex height map (145 values, Vanilla+)
///
/// Heights are relative to the cell position stored in the MCNK header and
/// are laid out in 17 interleaved rows of 9 (outer) and 8 (inner) vertices.
///
/// ```text
/// Row  0: 9 values (outer vertices 0-8)
/// Row  1: 8 values (inner vertices 0-7, offset by half a unit in X)
/// Row  2: 9 values (outer vertices 9-17)
/// ...
/// Row 16: 9 values (outer vertices 72-80)
/// ```
///
/// Reference: <https://wowdev.wiki/ADT/v18#MCVT_sub-chunk>
#[derive(Debug, Clone, PartialEq)]
pub struct McvtChunk {
    heights: RecordTable<f32>,
}

impl Default for McvtChunk {
    fn default() -> Self {
        Self::flat(0.0)
    }
}

impl McvtChunk {
    /// A grid with every vertex at `height`.
    #[must_use]
    pub fn flat(height: f32) -> Self {
        Self {
            heights: RecordTable::from_records(vec![height; VERTEX_COUNT]),
        }
    }

    /// Decode chunk data; bytes after the 145 heights are preserved.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let heights = RecordTable::decode_count(data, VERTEX_COUNT).map_err(|_| {
            AdtError::InvalidChunkSize {
                chunk: ChunkId::MCVT,
                expected: VERTEX_COUNT * 4,
                actual: data.len(),
            }
        })?;
        Ok(Self { heights })
    }

    /// Serialized chunk data.
    pub fn encode(&self) -> Result<Vec<u8>> {
        self.heights.encode()
    }

    /// Serialized size in bytes.
    #[must_use]
    pub fn encoded_len(&self) -> u64 {
        self.heights.encoded_len()
    }

    /// All heights in file order.
    #[must_use]
    pub fn heights(&self) -> &[f32] {
        self.heights.as_slice()
    }

    /// Mutable heights in file order.
    pub fn heights_mut(&mut self) -> &mut [f32] {
        self.heights.as_mut_slice()
    }

    /// Height at outer grid position (0-8, 0-8).
    #[must_use]
    pub fn outer_height(&self, x: usize, y: usize) -> Option<f32> {
        if x >= 9 || y >= 9 {
            return None;
        }
        self.heights().get(y * 17 + x).copied()
    }

    /// Height at inner grid position (0-7, 0-7).
    #[must_use]
    pub fn inner_height(&self, x: usize, y: usize) -> Option<f32> {
        if x >= 8 || y >= 8 {
            return None;
        }
        self.heights().get(y * 17 + 9 + x).copied()
    }
}
