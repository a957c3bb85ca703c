//! Filename tables addressed through an offset table (MMDX/MMID, MWMO/MWID).
//!
//! Placements refer to a model by its index in MMID, and MMID stores where the
//! name starts in MMDX. Writers normally keep the two tables paired (entry `i`
//! of MMID points at string `i`), but files exist where several offsets share
//! a string or skip some. Lookups always go through the offsets; edits that
//! renumber entries require the tables to be paired.

use std::borrow::Cow;

use log::{debug, warn};

use crate::chunk_id::ChunkId;
use crate::chunks::strings::StringTable;
use crate::error::{AdtError, Result};
use crate::io_helpers::write_u32_array;
use crate::layout::{Link, Part};
use crate::record::RecordTable;
use crate::relocation::{ChunkKey, Origin, Relocator};

/// Parsed MMID or MWID.
#[derive(Debug, Clone, Default)]
pub(crate) struct NameOffsets {
    pub(crate) links: Vec<Link>,
    pub(crate) trailing: Vec<u8>,
}

impl NameOffsets {
    /// Turn raw offsets into handles into the string table at `names`.
    pub(crate) fn link(
        reloc: &mut Relocator,
        table: RecordTable<u32>,
        key: ChunkKey,
        names: &Part<StringTable>,
    ) -> Self {
        let base = reloc.data_start(names.key);
        let names_len = names.data.encoded_len();
        let fields = reloc.data_start(key);
        let links = table
            .iter()
            .enumerate()
            .map(|(index, &value)| {
                if u64::from(value) >= names_len {
                    warn!(
                        "name offset {index} ({value:#x}) lies outside its {} byte table",
                        names_len
                    );
                    return Link::Raw(value);
                }
                Link::Handle(reloc.register_offset(
                    fields + table.offset_of(index),
                    Origin::data_of(names.key),
                    base + u64::from(value),
                ))
            })
            .collect();
        Self {
            links,
            trailing: table.trailing().to_vec(),
        }
    }

    pub(crate) fn encode(&self, reloc: &Relocator) -> Result<Vec<u8>> {
        let values = self
            .links
            .iter()
            .map(|link| link.render(reloc))
            .collect::<Result<Vec<u32>>>()?;
        let mut out = Vec::with_capacity(values.len() * 4 + self.trailing.len());
        write_u32_array(&mut out, values);
        out.extend_from_slice(&self.trailing);
        Ok(out)
    }

    pub(crate) fn len(&self) -> usize {
        self.links.len()
    }
}

/// Which placement kind a name table serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NameKind {
    /// M2 models (MMDX/MMID, MDDF)
    Model,
    /// WMOs (MWMO/MWID, MODF)
    Object,
}

impl NameKind {
    pub(crate) fn chunk_id(self) -> ChunkId {
        match self {
            NameKind::Model => ChunkId::MMDX,
            NameKind::Object => ChunkId::MWMO,
        }
    }

    pub(crate) fn table(self) -> &'static str {
        match self {
            NameKind::Model => "MMID",
            NameKind::Object => "MWID",
        }
    }
}

/// A name table, its offset table and the registry, borrowed together.
pub(crate) struct NameTables<'a> {
    pub(crate) kind: NameKind,
    pub(crate) names: &'a mut Part<StringTable>,
    pub(crate) offsets: &'a mut Part<NameOffsets>,
    pub(crate) reloc: &'a mut Relocator,
}

impl NameTables<'_> {
    pub(crate) fn resolve(&self, index: usize) -> Option<usize> {
        resolve(&*self.reloc, &*self.names, &*self.offsets, index)
    }

    /// Name offset entry `index` resolves to.
    pub(crate) fn name(&self, index: usize) -> Option<Cow<'_, str>> {
        self.names.data.get(self.resolve(index)?)
    }

    /// First entry at which the tables stop being paired.
    pub(crate) fn unpaired(&self) -> Option<usize> {
        let len = self.names.data.len().max(self.offsets.data.len());
        (0..len).find(|&index| self.resolve(index) != Some(index))
    }

    pub(crate) fn require_paired(&self, index: usize) -> Result<()> {
        match self.unpaired() {
            Some(_) => Err(AdtError::UnpairedNameTable {
                chunk: self.kind.chunk_id(),
                index,
            }),
            None => Ok(()),
        }
    }

    pub(crate) fn check_index(&self, index: usize) -> Result<()> {
        let len = self.offsets.data.len();
        if index >= len {
            return Err(AdtError::IndexOutOfRange {
                table: self.kind.table(),
                index,
                len,
            });
        }
        Ok(())
    }

    /// Offset entry naming `name`, if any.
    pub(crate) fn find(&self, name: &str) -> Option<usize> {
        (0..self.offsets.data.len()).find(|&index| {
            self.resolve(index)
                .and_then(|string| self.names.data.get_bytes(string))
                == Some(name.as_bytes())
        })
    }

    /// Append `name` and an offset entry pointing at it.
    pub(crate) fn push(&mut self, name: &str) -> usize {
        let reloc = &mut *self.reloc;
        let string_at = reloc.data_start(self.names.key) + self.names.data.entries_len();
        let string = self.names.data.push(name);
        reloc.grow(self.names.key, string_at, name.len() as u64 + 1);

        let index = self.offsets.data.links.len();
        let field = reloc.data_start(self.offsets.key) + 4 * index as u64;
        reloc.grow(self.offsets.key, field, 4);

        let target = reloc.data_start(self.names.key) + self.names.data.offset_of(string);
        let field = reloc.data_start(self.offsets.key) + 4 * index as u64;
        let handle = reloc.register_offset(field, Origin::data_of(self.names.key), target);
        self.offsets.data.links.push(Link::Handle(handle));
        debug!("{} entry {index} added for {name}", self.kind.table());
        index
    }

    /// Remove entry `index` of both tables; the tables must be paired.
    pub(crate) fn remove(&mut self, index: usize) {
        let reloc = &mut *self.reloc;
        let mut link = self.offsets.data.links.remove(index);
        link.clear(reloc);
        let field = reloc.data_start(self.offsets.key) + 4 * index as u64;
        reloc.shrink(self.offsets.key, field, 4);

        let string_at = reloc.data_start(self.names.key) + self.names.data.offset_of(index);
        let len = self.names.data.entry_len(index);
        self.names.data.remove(index);
        reloc.shrink(self.names.key, string_at, len);
    }

    /// Replace string `index` in place; the tables must be paired.
    pub(crate) fn replace(&mut self, index: usize, name: &str) {
        let start = self.reloc.data_start(self.names.key) + self.names.data.offset_of(index);
        let old_len = self.names.data.entry_len(index);
        self.names.data.replace(index, name);
        resize_entry(&mut *self.reloc, self.names.key, start, old_len, name.len() as u64 + 1);
    }
}

/// String index that offset entry `index` points at.
pub(crate) fn resolve(
    reloc: &Relocator,
    names: &Part<StringTable>,
    offsets: &Part<NameOffsets>,
    index: usize,
) -> Option<usize> {
    let key = offsets.data.links.get(index)?.key()?;
    let relative = reloc.target(key).checked_sub(reloc.data_start(names.key))?;
    names.data.index_at(relative)
}

/// Grow or shrink an entry starting at `start` from `old_len` to `new_len` bytes.
pub(crate) fn resize_entry(
    reloc: &mut Relocator,
    owner: ChunkKey,
    start: u64,
    old_len: u64,
    new_len: u64,
) {
    if new_len > old_len {
        reloc.grow(owner, start + old_len, new_len - old_len);
    } else if new_len < old_len {
        reloc.shrink(owner, start + new_len, old_len - new_len);
    }
}
