//! MCSH and MCLQ: cell chunks carried as bytes.

/// Size of a standard shadow map.
pub const SHADOW_MAP_BYTES: usize = 512;

/// MCSH chunk - Shadow map (64×64 1-bit map, Vanilla+).
///
/// 64 rows of 8 bytes, LSB-first within each byte, bit set = shadowed texel.
/// The data is kept as stored so that maps of non-standard size round-trip.
///
/// Reference: <https://wowdev.wiki/ADT/v18#MCSH_sub-chunk>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McshChunk {
    data: Vec<u8>,
}

impl McshChunk {
    /// Wrap chunk data.
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Raw shadow bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutable shadow bytes; the length cannot change.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Whether texel (`x`, `y`) is shadowed.
    #[must_use]
    pub fn is_shadowed(&self, x: usize, y: usize) -> bool {
        if x >= 64 || y >= 64 {
            return false;
        }
        self.data
            .get(y * 8 + x / 8)
            .is_some_and(|byte| byte & (1 << (x % 8)) != 0)
    }

    /// Serialized size in bytes.
    #[must_use]
    pub fn encoded_len(&self) -> u64 {
        self.data.len() as u64
    }
}

/// MCLQ chunk - Legacy liquid (Vanilla/TBC), kept opaque.
///
/// The extent of the chunk is given by `size_liquid` in the MCNK header
/// rather than by its own chunk header, so the bytes are kept whole,
/// header included.
///
/// Reference: <https://wowdev.wiki/ADT/v18#MCLQ_sub-chunk>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidChunk {
    bytes: Vec<u8>,
}

impl LiquidChunk {
    /// Wrap the whole chunk, header included.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// The chunk as stored, header included.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Height range of the liquid surface, when present.
    #[must_use]
    pub fn height_range(&self) -> Option<(f32, f32)> {
        let raw = self.bytes.get(8..16)?;
        let min = f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
        let max = f32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]);
        Some((min, max))
    }
}
