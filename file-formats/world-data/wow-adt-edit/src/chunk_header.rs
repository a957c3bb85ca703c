//! ADT chunk header codec
//!
//! Every ADT chunk starts with an 8-byte header: a 4-byte reversed magic and a
//! little-endian `u32` data size that excludes the header itself.

use binrw::{BinRead, BinWrite};
use std::io::Cursor;

use crate::chunk_id::ChunkId;
use crate::error::{AdtError, Result};

/// Standard ADT chunk header (8 bytes)
///
/// # Binary Layout
///
/// ```text
/// Offset | Size | Field | Description
/// -------|------|-------|------------------------------------------
/// 0x00   |  4   | id    | Chunk magic identifier (reversed)
/// 0x04   |  4   | size  | Data size in bytes (excludes header)
/// ```
///
/// # Example
///
/// ```text
/// File bytes: [0x52, 0x45, 0x56, 0x4D] [0x04, 0x00, 0x00, 0x00] [0x12, 0x00, 0x00, 0x00]
///             └────── "REVM" ────────┘ └──── size: 4 ────────┘ └─── version data ──┘
///             (displays as "MVER")
/// ```
///
/// If size = 100 the chunk data occupies bytes `[8..108]` relative to the chunk
/// start and the next chunk starts 108 bytes later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct ChunkHeader {
    /// Chunk magic identifier (4 bytes, reversed)
    pub id: ChunkId,

    /// Size of chunk data in bytes (excludes 8-byte header)
    pub size: u32,
}

impl ChunkHeader {
    /// Encoded size of a chunk header.
    pub const SIZE: u64 = 8;

    /// Create a header for `size` bytes of chunk data.
    #[must_use]
    pub const fn new(id: ChunkId, size: u32) -> Self {
        Self { id, size }
    }

    /// Total size including header (size + 8)
    #[must_use]
    pub const fn total_size(&self) -> u64 {
        self.size as u64 + Self::SIZE
    }

    /// Check if chunk ID matches expected value
    #[must_use]
    pub fn is_chunk(&self, expected: ChunkId) -> bool {
        self.id.0 == expected.0
    }

    /// Decode the header stored at `offset` in `bytes`.
    ///
    /// Fails with [`AdtError::UnexpectedEof`] when fewer than eight bytes remain.
    pub fn read_at(bytes: &[u8], offset: u64) -> Result<Self> {
        let start = usize::try_from(offset).map_err(|_| AdtError::UnexpectedEof)?;
        let end = start
            .checked_add(Self::SIZE as usize)
            .ok_or(AdtError::UnexpectedEof)?;
        let raw = bytes.get(start..end).ok_or(AdtError::UnexpectedEof)?;
        Ok(Self::read(&mut Cursor::new(raw))?)
    }

    /// Decode the header at `offset` and require its magic to be `expected`.
    ///
    /// The chunk data must also fit inside `bytes`.
    pub fn expect_at(bytes: &[u8], offset: u64, expected: ChunkId) -> Result<Self> {
        let header = Self::read_at(bytes, offset)?;
        if !header.is_chunk(expected) {
            return Err(AdtError::InvalidMagic {
                expected,
                found: header.id,
                offset,
            });
        }
        if offset + header.total_size() > bytes.len() as u64 {
            return Err(AdtError::TruncatedChunk {
                chunk: expected,
                offset,
                declared: header.size,
                available: (bytes.len() as u64).saturating_sub(offset + Self::SIZE),
            });
        }
        Ok(header)
    }

    /// Encode the header as it appears on disk.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 8] {
        let mut out = [0u8; 8];
        out[..4].copy_from_slice(&self.id.0);
        out[4..].copy_from_slice(&self.size.to_le_bytes());
        out
    }
}
