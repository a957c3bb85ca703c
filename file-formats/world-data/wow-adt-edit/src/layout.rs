//! In-memory layout primitives shared by the root chunks and the cells.

use crate::chunk_header::ChunkHeader;
use crate::chunk_id::ChunkId;
use crate::error::{AdtError, Result};
use crate::io_helpers::{slice_at, to_index};
use crate::relocation::{ChunkKey, OffsetKey, Origin, Relocator};

/// A parsed chunk and the mobile region it occupies.
#[derive(Debug, Clone)]
pub(crate) struct Part<T> {
    pub(crate) key: ChunkKey,
    pub(crate) data: T,
}

impl<T> Part<T> {
    pub(crate) fn new(key: ChunkKey, data: T) -> Self {
        Self { key, data }
    }
}

/// An offset field as the document holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Link {
    /// Stored as zero.
    Absent,
    /// Tracked through the relocator.
    Handle(OffsetKey),
    /// Written back unchanged: the value does not address anything this
    /// crate can follow.
    Raw(u32),
}

impl Link {
    /// Value to store in the field.
    pub(crate) fn render(self, reloc: &Relocator) -> Result<u32> {
        match self {
            Link::Absent => Ok(0),
            Link::Handle(key) => reloc.encode_relative(key),
            Link::Raw(value) => Ok(value),
        }
    }

    pub(crate) fn key(self) -> Option<OffsetKey> {
        match self {
            Link::Handle(key) => Some(key),
            _ => None,
        }
    }

    /// Release the handle, if any, and leave the link absent.
    pub(crate) fn clear(&mut self, reloc: &mut Relocator) {
        if let Link::Handle(key) = *self {
            reloc.release_offset(key);
        }
        *self = Link::Absent;
    }

    /// Point the field at `target`, replacing whatever it held.
    pub(crate) fn retarget(&mut self, reloc: &mut Relocator, field: u64, origin: Origin, target: u64) {
        self.clear(reloc);
        *self = Link::Handle(reloc.register_offset(field, origin, target));
    }
}

/// A size field that mirrors the length of another chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SizeField {
    /// Recomputed from the chunk length on write.
    Derived {
        /// Whether the 8-byte chunk header is counted.
        includes_header: bool,
    },
    /// Did not match the chunk when read; kept as is.
    Raw(u32),
}

impl SizeField {
    /// Classify a stored size against the chunk's data length.
    pub(crate) fn detect(stored: u32, data_len: u64) -> Self {
        if u64::from(stored) == data_len + ChunkHeader::SIZE {
            SizeField::Derived {
                includes_header: true,
            }
        } else if u64::from(stored) == data_len {
            SizeField::Derived {
                includes_header: false,
            }
        } else {
            SizeField::Raw(stored)
        }
    }

    /// Value for a chunk whose full length (header included) is `total`.
    pub(crate) fn render(self, total: u64) -> u32 {
        match self {
            SizeField::Derived {
                includes_header: true,
            } => total as u32,
            SizeField::Derived {
                includes_header: false,
            } => total.saturating_sub(ChunkHeader::SIZE) as u32,
            SizeField::Raw(value) => value,
        }
    }
}

/// Bytes this crate does not interpret, carried through verbatim.
#[derive(Debug, Clone)]
pub(crate) struct RawRegion {
    pub(crate) key: ChunkKey,
    pub(crate) bytes: Vec<u8>,
}

/// Register every uncovered stretch of `[start, end)` as a raw region.
///
/// `claimed` lists the `(address, len, id)` of the parsed regions inside the
/// range; they must not overlap.
pub(crate) fn fill_gaps(
    reloc: &mut Relocator,
    bytes: &[u8],
    start: u64,
    end: u64,
    claimed: &mut [(u64, u64, ChunkId)],
    parent: Option<ChunkKey>,
) -> Result<Vec<RawRegion>> {
    claimed.sort_unstable_by_key(|(address, _, _)| *address);

    let mut gaps = Vec::new();
    let mut cursor = start;
    for &(address, len, id) in claimed.iter() {
        if address < cursor {
            return Err(AdtError::ChunkParseError {
                chunk: id,
                offset: address,
                details: format!("overlaps the previous chunk, which ends at {cursor:#x}"),
            });
        }
        if address > cursor {
            gaps.push(raw_region(reloc, bytes, cursor, address - cursor, parent)?);
        }
        cursor = address + len;
    }
    if cursor < end {
        gaps.push(raw_region(reloc, bytes, cursor, end - cursor, parent)?);
    }
    Ok(gaps)
}

fn raw_region(
    reloc: &mut Relocator,
    bytes: &[u8],
    address: u64,
    len: u64,
    parent: Option<ChunkKey>,
) -> Result<RawRegion> {
    log::debug!("keeping {len} uninterpreted bytes at {address:#x}");
    let data = slice_at(bytes, address, len)?.to_vec();
    Ok(RawRegion {
        key: reloc.register_chunk(ChunkId::RAW, address, len, parent),
        bytes: data,
    })
}

/// Output buffer that places every region at its tracked address.
pub(crate) struct Canvas {
    buf: Vec<u8>,
    spans: Vec<(u64, u64, ChunkId)>,
}

impl Canvas {
    pub(crate) fn new(len: u64) -> Result<Self> {
        Ok(Self {
            buf: vec![0; to_index(len)?],
            spans: Vec::new(),
        })
    }

    /// Copy `data` to `address`.
    pub(crate) fn put(&mut self, id: ChunkId, address: u64, data: &[u8]) -> Result<()> {
        let start = to_index(address)?;
        let target = start
            .checked_add(data.len())
            .and_then(|end| self.buf.get_mut(start..end))
            .ok_or(AdtError::LayoutConflict {
                chunk: id,
                address,
            })?;
        target.copy_from_slice(data);
        if !data.is_empty() {
            self.spans.push((address, data.len() as u64, id));
        }
        Ok(())
    }

    /// Write a chunk header followed by `data` at `address`.
    pub(crate) fn put_chunk(&mut self, id: ChunkId, address: u64, data: &[u8]) -> Result<()> {
        let mut out = Vec::with_capacity(data.len() + ChunkHeader::SIZE as usize);
        out.extend_from_slice(&ChunkHeader::new(id, data.len() as u32).to_bytes());
        out.extend_from_slice(data);
        self.put(id, address, &out)
    }

    /// Write a leaf chunk at the address of its tracked region.
    pub(crate) fn put_part(
        &mut self,
        reloc: &Relocator,
        id: ChunkId,
        key: ChunkKey,
        data: &[u8],
    ) -> Result<()> {
        debug_assert_eq!(
            data.len() as u64 + ChunkHeader::SIZE,
            reloc.chunk(key).len,
            "{id} content and tracked length disagree"
        );
        self.put_chunk(id, reloc.address(key), data)
    }

    /// Write the header of a container chunk sized by its tracked region.
    pub(crate) fn put_container(
        &mut self,
        reloc: &Relocator,
        id: ChunkId,
        key: ChunkKey,
        body: &[u8],
    ) -> Result<()> {
        let region = reloc.chunk(key);
        let size = u32::try_from(region.len - ChunkHeader::SIZE).map_err(|_| {
            AdtError::LayoutConflict {
                chunk: id,
                address: region.address,
            }
        })?;
        let mut out = Vec::with_capacity(body.len() + ChunkHeader::SIZE as usize);
        out.extend_from_slice(&ChunkHeader::new(id, size).to_bytes());
        out.extend_from_slice(body);
        self.put(id, region.address, &out)
    }

    /// Write carried-through bytes.
    pub(crate) fn put_raw(&mut self, reloc: &Relocator, regions: &[RawRegion]) -> Result<()> {
        for region in regions {
            self.put(ChunkId::RAW, reloc.address(region.key), &region.bytes)?;
        }
        Ok(())
    }

    /// Check that no two writes overlapped and hand out the bytes.
    pub(crate) fn finish(mut self) -> Result<Vec<u8>> {
        self.spans.sort_unstable_by_key(|(address, _, _)| *address);
        let mut end = 0;
        for &(address, len, id) in &self.spans {
            if address < end {
                return Err(AdtError::LayoutConflict { chunk: id, address });
            }
            end = address + len;
        }
        Ok(self.buf)
    }
}
