use binrw::{BinRead, BinWrite};

/// 4-byte chunk identifier (magic bytes).
///
/// ADT files store magic bytes reversed. When documentation refers to a chunk
/// as "MVER", the bytes stored in the file are `[0x52, 0x45, 0x56, 0x4D]`
/// ("REVM" in ASCII), because the tag is written as a little-endian `u32`.
///
/// # Usage
///
/// ```rust
/// use wow_adt_edit::chunk_id::ChunkId;
///
/// let mver = ChunkId::MVER;
/// assert_eq!(mver.as_str(), "MVER");
///
/// let mcnk = ChunkId::from_str("MCNK").unwrap();
/// assert_eq!(mcnk, ChunkId::MCNK);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, BinRead, BinWrite)]
pub struct ChunkId(pub [u8; 4]);

impl ChunkId {
    // Root-level chunks

    /// Version chunk - stores the ADT format version number (always 18)
    pub const MVER: Self = Self([b'R', b'E', b'V', b'M']);

    /// Header chunk - offsets to the other root chunks
    pub const MHDR: Self = Self([b'R', b'D', b'H', b'M']);

    /// Chunk index - absolute MCNK offsets
    pub const MCIN: Self = Self([b'N', b'I', b'C', b'M']);

    /// Texture filenames
    pub const MTEX: Self = Self([b'X', b'E', b'T', b'M']);

    /// Model (doodad) filenames
    pub const MMDX: Self = Self([b'X', b'D', b'M', b'M']);

    /// Model filename offsets into MMDX
    pub const MMID: Self = Self([b'D', b'I', b'M', b'M']);

    /// WMO filenames
    pub const MWMO: Self = Self([b'O', b'M', b'W', b'M']);

    /// WMO filename offsets into MWMO
    pub const MWID: Self = Self([b'D', b'I', b'W', b'M']);

    /// Doodad placements
    pub const MDDF: Self = Self([b'F', b'D', b'D', b'M']);

    /// WMO placements
    pub const MODF: Self = Self([b'F', b'D', b'O', b'M']);

    /// Terrain cell (16x16 grid)
    pub const MCNK: Self = Self([b'K', b'N', b'C', b'M']);

    /// Flight bounds (TBC+)
    pub const MFBO: Self = Self([b'O', b'B', b'F', b'M']);

    /// Liquid data (WotLK+), carried opaquely
    pub const MH2O: Self = Self([b'O', b'2', b'H', b'M']);

    /// Per-texture flags (WotLK+)
    pub const MTXF: Self = Self([b'F', b'X', b'T', b'M']);

    // MCNK subchunks

    /// Height map - 9x9 + 8x8 vertices
    pub const MCVT: Self = Self([b'T', b'V', b'C', b'M']);

    /// Vertex normals
    pub const MCNR: Self = Self([b'R', b'N', b'C', b'M']);

    /// Texture layers (up to 4)
    pub const MCLY: Self = Self([b'Y', b'L', b'C', b'M']);

    /// Alpha maps
    pub const MCAL: Self = Self([b'L', b'A', b'C', b'M']);

    /// Baked shadow map
    pub const MCSH: Self = Self([b'H', b'S', b'C', b'M']);

    /// Doodad and WMO references
    pub const MCRF: Self = Self([b'F', b'R', b'C', b'M']);

    /// Legacy liquid (pre-WotLK), carried opaquely
    pub const MCLQ: Self = Self([b'Q', b'L', b'C', b'M']);

    /// Vertex colors (WotLK+)
    pub const MCCV: Self = Self([b'V', b'C', b'C', b'M']);

    /// Vertex lighting (Cataclysm+)
    pub const MCLV: Self = Self([b'V', b'L', b'C', b'M']);

    /// Sound emitters
    pub const MCSE: Self = Self([b'E', b'S', b'C', b'M']);

    /// Label for regions that are not chunks (padding, unparsed bytes)
    pub const RAW: Self = Self([0, 0, 0, 0]);

    /// Convert to the human-readable name.
    ///
    /// ```rust
    /// use wow_adt_edit::chunk_id::ChunkId;
    ///
    /// assert_eq!(ChunkId::MVER.as_str(), "MVER");
    /// ```
    #[must_use]
    pub fn as_str(&self) -> String {
        let reversed = [self.0[3], self.0[2], self.0[1], self.0[0]];
        String::from_utf8_lossy(&reversed).to_string()
    }

    /// Create from a human-readable name (reverses bytes for file storage).
    ///
    /// Returns `None` unless the string is exactly 4 bytes long.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() == 4 {
            Some(Self([bytes[3], bytes[2], bytes[1], bytes[0]]))
        } else {
            None
        }
    }

    /// Read an identifier from the first four bytes of `bytes`.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let tag: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
        Some(Self(tag))
    }
}

impl std::fmt::Display for ChunkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if *self == Self::RAW {
            return write!(f, "<raw>");
        }
        write!(f, "{}", self.as_str())
    }
}
