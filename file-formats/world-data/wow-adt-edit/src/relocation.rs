//! Address bookkeeping for in-place structural edits.
//!
//! An ADT file is full of offsets: MHDR points at the root chunks, MCIN at
//! every cell, MMID/MWID into the filename blocks, each MCNK header at its
//! subchunks and each texture layer into MCAL. Growing or shrinking any chunk
//! moves everything stored after it, so every such offset has to be repaired.
//!
//! [`Relocator`] is the registry that makes this mechanical. It owns two
//! arenas keyed by small integers:
//!
//! - [`MobileChunk`]: a region of the file that knows its current absolute
//!   address and length, and optionally the chunk that encloses it.
//! - [`OffsetHandle`]: an offset field. It records where the field itself is
//!   stored, the [`Origin`] the stored distance is measured from, and the
//!   absolute address it resolves to.
//!
//! When bytes are inserted or removed the editing code calls
//! [`Relocator::notify_size_changed`] once per edit site. Every address
//! strictly after the edit point moves by the delta: chunk starts, handle
//! fields and handle targets alike. The stored relative value of a handle is
//! never cached; it is derived as `target - origin_base` when the file is
//! written. A pointer whose origin and target lie on the same side of the edit
//! therefore keeps its relative value, while one that straddles the edit is
//! rewritten, and the resolved address always matches the data it names.
//!
//! ```text
//!         at
//!          v
//! [origin]-+---[+delta bytes]---[target]      relative grows by delta
//!          +---[+delta bytes]---[origin]--[target]   relative unchanged
//! ```
//!
//! The registry never touches file content. Calls that do not describe a real
//! insertion or removal are programming errors and panic.

use log::{debug, trace, warn};

use crate::chunk_header::ChunkHeader;
use crate::chunk_id::ChunkId;
use crate::error::{AdtError, Result};

/// Stable key of a registered [`MobileChunk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey(u32);

/// Stable key of a registered [`OffsetHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OffsetKey(u32);

/// A region of the file that tracks its own address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MobileChunk {
    /// Chunk magic, or [`ChunkId::RAW`] for headerless regions
    pub id: ChunkId,
    /// Absolute start address
    pub address: u64,
    /// Total length including the chunk header
    pub len: u64,
    /// Enclosing chunk, whose length changes with this one
    pub parent: Option<ChunkKey>,
}

impl MobileChunk {
    /// Address one past the last byte.
    #[must_use]
    pub fn end(&self) -> u64 {
        self.address + self.len
    }

    /// Address of the first data byte after the chunk header.
    #[must_use]
    pub fn data_start(&self) -> u64 {
        self.address + ChunkHeader::SIZE
    }
}

/// What an offset field is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Absolute file offset (MCIN)
    FileStart,
    /// `bias` bytes after the start of a mobile chunk
    Chunk {
        /// Chunk whose address anchors the offset
        key: ChunkKey,
        /// Distance from the chunk start
        bias: u64,
    },
}

impl Origin {
    /// Measured from the first data byte of `key` (MHDR, MMID, MCLY offsets).
    #[must_use]
    pub const fn data_of(key: ChunkKey) -> Self {
        Self::Chunk {
            key,
            bias: ChunkHeader::SIZE,
        }
    }

    /// Measured from the chunk header of `key` (MCNK subchunk offsets).
    #[must_use]
    pub const fn start_of(key: ChunkKey) -> Self {
        Self::Chunk { key, bias: 0 }
    }
}

/// An offset field and the address it currently resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetHandle {
    /// Absolute address of the field itself
    pub field: u64,
    /// Base the stored distance is measured from
    pub origin: Origin,
    /// Absolute address the field resolves to
    pub target: u64,
}

/// Registry of mobile chunks and offset handles for one document.
#[derive(Debug, Clone, Default)]
pub struct Relocator {
    chunks: Vec<Option<MobileChunk>>,
    offsets: Vec<Option<OffsetHandle>>,
}

fn shift(address: u64, delta: i64) -> u64 {
    match address.checked_add_signed(delta) {
        Some(moved) => moved,
        None => panic!("relocating address {address:#x} by {delta} underflows"),
    }
}

impl Relocator {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a region and return its key.
    pub fn register_chunk(
        &mut self,
        id: ChunkId,
        address: u64,
        len: u64,
        parent: Option<ChunkKey>,
    ) -> ChunkKey {
        let key = ChunkKey(self.chunks.len() as u32);
        trace!("register {id} at {address:#x} (+{len}) as {key:?}");
        self.chunks.push(Some(MobileChunk {
            id,
            address,
            len,
            parent,
        }));
        key
    }

    /// Forget a region whose bytes are being removed.
    pub fn release_chunk(&mut self, key: ChunkKey) -> MobileChunk {
        match self.chunks.get_mut(key.0 as usize).and_then(Option::take) {
            Some(chunk) => chunk,
            None => panic!("releasing unknown chunk {key:?}"),
        }
    }

    /// Look up a live region.
    #[must_use]
    pub fn chunk(&self, key: ChunkKey) -> &MobileChunk {
        match self.chunks.get(key.0 as usize).and_then(Option::as_ref) {
            Some(chunk) => chunk,
            None => panic!("stale chunk key {key:?}"),
        }
    }

    /// Current start address of a region.
    #[must_use]
    pub fn address(&self, key: ChunkKey) -> u64 {
        self.chunk(key).address
    }

    /// First data byte of a chunk (after its 8-byte header).
    #[must_use]
    pub fn data_start(&self, key: ChunkKey) -> u64 {
        self.chunk(key).data_start()
    }

    /// One past the last byte of a region.
    #[must_use]
    pub fn end(&self, key: ChunkKey) -> u64 {
        self.chunk(key).end()
    }

    /// Register an offset field and return its key.
    pub fn register_offset(&mut self, field: u64, origin: Origin, target: u64) -> OffsetKey {
        let key = OffsetKey(self.offsets.len() as u32);
        trace!("register offset at {field:#x} -> {target:#x} as {key:?}");
        self.offsets.push(Some(OffsetHandle {
            field,
            origin,
            target,
        }));
        key
    }

    /// Forget an offset field whose owning record is being removed.
    pub fn release_offset(&mut self, key: OffsetKey) -> OffsetHandle {
        match self.offsets.get_mut(key.0 as usize).and_then(Option::take) {
            Some(handle) => handle,
            None => panic!("releasing unknown offset {key:?}"),
        }
    }

    /// Look up a live offset handle.
    #[must_use]
    pub fn offset(&self, key: OffsetKey) -> &OffsetHandle {
        match self.offsets.get(key.0 as usize).and_then(Option::as_ref) {
            Some(handle) => handle,
            None => panic!("stale offset key {key:?}"),
        }
    }

    /// Absolute address an offset field resolves to.
    #[must_use]
    pub fn target(&self, key: OffsetKey) -> u64 {
        self.offset(key).target
    }

    /// Absolute address of the base an origin measures from.
    #[must_use]
    pub fn origin_base(&self, origin: Origin) -> u64 {
        match origin {
            Origin::FileStart => 0,
            Origin::Chunk { key, bias } => self.address(key) + bias,
        }
    }

    /// Relative value the field stores on disk.
    #[must_use]
    pub fn relative(&self, key: OffsetKey) -> i64 {
        let handle = self.offset(key);
        handle.target as i64 - self.origin_base(handle.origin) as i64
    }

    /// Relative value checked to fit the 32-bit field.
    pub fn encode_relative(&self, key: OffsetKey) -> Result<u32> {
        let value = self.relative(key);
        u32::try_from(value).map_err(|_| AdtError::OffsetOverflow {
            field: self.offset(key).field,
            value,
        })
    }

    /// Number of live regions.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.iter().flatten().count()
    }

    /// Number of live offset handles.
    #[must_use]
    pub fn offset_count(&self) -> usize {
        self.offsets.iter().flatten().count()
    }

    /// End of the furthest top-level region, i.e. the serialized file size.
    #[must_use]
    pub fn extent(&self) -> u64 {
        self.chunks
            .iter()
            .flatten()
            .filter(|c| c.parent.is_none())
            .map(MobileChunk::end)
            .max()
            .unwrap_or(0)
    }

    /// Shift every tracked address strictly after `at` by `delta`.
    pub fn notify_size_changed(&mut self, delta: i64, at: u64) {
        assert!(delta != 0, "relocation at {at:#x} with zero delta");
        debug!("relocating {delta:+} bytes after {at:#x}");

        for chunk in self.chunks.iter_mut().flatten() {
            if chunk.address > at {
                chunk.address = shift(chunk.address, delta);
            }
        }

        for handle in self.offsets.iter_mut().flatten() {
            if handle.field > at {
                handle.field = shift(handle.field, delta);
            }
            if handle.target > at {
                handle.target = shift(handle.target, delta);
            }
        }
    }

    /// `len` bytes were inserted so that the new bytes start at `position`.
    ///
    /// Whatever used to start at `position` now follows the new bytes.
    pub fn notify_inserted(&mut self, position: u64, len: u64) {
        assert!(position > 0, "insertion before the version chunk");
        assert!(len > 0, "empty insertion at {position:#x}");
        self.notify_size_changed(len as i64, position - 1);
    }

    /// The bytes `[position, position + len)` were removed.
    ///
    /// Regions and offset fields inside the span must have been released
    /// first. Offsets that pointed into the span collapse onto `position`.
    pub fn notify_removed(&mut self, position: u64, len: u64) {
        assert!(len > 0, "empty removal at {position:#x}");
        let span = position..position + len;

        for (index, chunk) in self.chunks.iter().enumerate() {
            if let Some(chunk) = chunk {
                assert!(
                    !span.contains(&chunk.address),
                    "live chunk {index} ({}) at {:#x} inside removed span {span:x?}",
                    chunk.id,
                    chunk.address
                );
            }
        }

        for (index, handle) in self.offsets.iter_mut().enumerate() {
            if let Some(handle) = handle {
                assert!(
                    !span.contains(&handle.field),
                    "live offset field {index} at {:#x} inside removed span {span:x?}",
                    handle.field
                );
                if handle.target > position && handle.target < span.end {
                    warn!(
                        "offset at {:#x} pointed into removed bytes at {:#x}",
                        handle.field, handle.target
                    );
                    handle.target = position;
                }
            }
        }

        self.notify_size_changed(-(len as i64), position);
    }

    /// Change the recorded length of `key` and of every enclosing region.
    pub fn resize(&mut self, key: ChunkKey, delta: i64) {
        let mut current = Some(key);
        while let Some(key) = current {
            let chunk = match self.chunks.get_mut(key.0 as usize).and_then(Option::as_mut) {
                Some(chunk) => chunk,
                None => panic!("resizing stale chunk {key:?}"),
            };
            chunk.len = shift(chunk.len, delta);
            current = chunk.parent;
        }
    }

    /// Insert `len` bytes at `position` inside `owner`.
    pub fn grow(&mut self, owner: ChunkKey, position: u64, len: u64) {
        debug_assert!(
            position >= self.data_start(owner).min(self.address(owner))
                && position <= self.end(owner),
            "insertion at {position:#x} outside its owner"
        );
        self.notify_inserted(position, len);
        self.resize(owner, len as i64);
    }

    /// Remove `[position, position + len)` from inside `owner`.
    pub fn shrink(&mut self, owner: ChunkKey, position: u64, len: u64) {
        debug_assert!(
            position + len <= self.end(owner),
            "removal at {position:#x} runs past its owner"
        );
        self.notify_removed(position, len);
        self.resize(owner, -(len as i64));
    }
}
