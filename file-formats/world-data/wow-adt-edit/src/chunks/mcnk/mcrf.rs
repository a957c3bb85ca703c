use crate::chunk_id::ChunkId;
use crate::error::{AdtError, Result};
use crate::io_helpers::{read_u32_array, write_u32_array};

/// MCRF chunk - Object references (Vanilla-WotLK)
///
/// Indices into MDDF for the doodads that overlap this cell, followed by
/// indices into MODF for the WMOs. The split is given by `n_doodad_refs` and
/// `n_map_obj_refs` in the MCNK header.
///
/// Reference: <https://wowdev.wiki/ADT/v18#MCRF_sub-chunk>
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct McrfChunk {
    /// MDDF indices
    pub(crate) doodad_refs: Vec<u32>,
    /// MODF indices
    pub(crate) object_refs: Vec<u32>,
    trailing: Vec<u8>,
}

impl McrfChunk {
    /// Decode chunk data holding `doodads` then `objects` references.
    pub fn decode(data: &[u8], doodads: usize, objects: usize) -> Result<Self> {
        let count = doodads + objects;
        let refs = read_u32_array(data, count).map_err(|_| AdtError::InvalidChunkSize {
            chunk: ChunkId::MCRF,
            expected: count * 4,
            actual: data.len(),
        })?;
        let (doodad_refs, object_refs) = refs.split_at(doodads);
        Ok(Self {
            doodad_refs: doodad_refs.to_vec(),
            object_refs: object_refs.to_vec(),
            trailing: data[count * 4..].to_vec(),
        })
    }

    /// Serialized chunk data.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len() as usize);
        write_u32_array(&mut out, self.doodad_refs.iter().copied());
        write_u32_array(&mut out, self.object_refs.iter().copied());
        out.extend_from_slice(&self.trailing);
        out
    }

    /// Serialized size in bytes.
    #[must_use]
    pub fn encoded_len(&self) -> u64 {
        ((self.doodad_refs.len() + self.object_refs.len()) * 4 + self.trailing.len()) as u64
    }

    /// MDDF indices referenced by the cell.
    #[must_use]
    pub fn doodad_refs(&self) -> &[u32] {
        &self.doodad_refs
    }

    /// MODF indices referenced by the cell.
    #[must_use]
    pub fn object_refs(&self) -> &[u32] {
        &self.object_refs
    }

    /// Byte offset of doodad reference `index` within the chunk data.
    #[must_use]
    pub fn doodad_offset(&self, index: usize) -> u64 {
        index as u64 * 4
    }

    /// Byte offset of object reference `index` within the chunk data.
    #[must_use]
    pub fn object_offset(&self, index: usize) -> u64 {
        (self.doodad_refs.len() + index) as u64 * 4
    }
}
