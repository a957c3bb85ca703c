use binrw::{BinRead, BinWrite};

use crate::chunk_id::ChunkId;
use crate::error::{AdtError, Result};
use crate::record::{FixedRecord, RecordTable};

/// Sound emitter entry (28 bytes).
///
/// Defines a positioned ambient sound source within the terrain cell.
///
/// # Binary Layout
///
/// ```text
/// Offset | Size | Field          | Description
/// -------|------|----------------|-----------------------------------
/// 0x00   |  4   | sound_entry_id | SoundEntries.dbc reference
/// 0x04   | 12   | position       | World position [X, Y, Z]
/// 0x10   | 12   | size_min       | Minimum size bounds [X, Y, Z]
/// ```
///
/// Reference: <https://wowdev.wiki/ADT/v18#MCSE_sub-chunk>
#[derive(Debug, Clone, Copy, Default, PartialEq, BinRead, BinWrite)]
#[brw(little)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SoundEmitter {
    /// Sound ID from SoundEntries.dbc
    pub sound_entry_id: u32,

    /// World position [X, Y, Z]
    pub position: [f32; 3],

    /// Minimum size bounds [X, Y, Z]
    pub size_min: [f32; 3],
}

impl FixedRecord for SoundEmitter {
    const SIZE: usize = 28;
}

/// MCSE chunk - Sound emitters (Vanilla+)
pub type McseChunk = RecordTable<SoundEmitter>;

/// Decode MCSE data holding `count` emitters.
pub fn decode_emitters(data: &[u8], count: usize) -> Result<McseChunk> {
    RecordTable::decode_count(data, count).map_err(|_| AdtError::InvalidChunkSize {
        chunk: ChunkId::MCSE,
        expected: count * SoundEmitter::SIZE,
        actual: data.len(),
    })
}
