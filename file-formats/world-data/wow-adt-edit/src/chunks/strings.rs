//! String table chunks (MTEX, MMDX, MWMO).
//!
//! Filenames are stored as consecutive NUL-terminated strings with no padding
//! between entries. The ordinal position of an entry is its index; MMID and
//! MWID additionally address MMDX/MWMO entries by byte offset.
//!
//! Entries are kept as raw bytes so that files with non-ASCII names survive a
//! round trip; accessors convert lossily to UTF-8 for display.

use std::borrow::Cow;

use crate::error::{AdtError, Result};

/// An ordered table of NUL-terminated strings.
///
/// Bytes after the last terminator (an unterminated final name, or junk) are
/// kept as a tail and written back after the entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTable {
    entries: Vec<Vec<u8>>,
    tail: Vec<u8>,
}

impl StringTable {
    /// Split chunk data into entries.
    #[must_use]
    pub fn decode(data: &[u8]) -> Self {
        let mut entries = Vec::new();
        let mut rest = data;
        while let Some(nul) = memchr::memchr(0, rest) {
            entries.push(rest[..nul].to_vec());
            rest = &rest[nul + 1..];
        }
        Self {
            entries,
            tail: rest.to_vec(),
        }
    }

    /// Build a table from names.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut table = Self::default();
        for name in names {
            validate_name(name)?;
            table.entries.push(name.as_bytes().to_vec());
        }
        Ok(table)
    }

    /// Serialized chunk data.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len() as usize);
        for entry in &self.entries {
            out.extend_from_slice(entry);
            out.push(0);
        }
        out.extend_from_slice(&self.tail);
        out
    }

    /// Serialized size in bytes.
    #[must_use]
    pub fn encoded_len(&self) -> u64 {
        self.entries_len() + self.tail.len() as u64
    }

    /// Size of the terminated entries, excluding the tail.
    #[must_use]
    pub fn entries_len(&self) -> u64 {
        self.entries.iter().map(|e| e.len() as u64 + 1).sum()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry `index` as text.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Cow<'_, str>> {
        self.entries.get(index).map(|e| String::from_utf8_lossy(e))
    }

    /// Entry `index` as stored.
    #[must_use]
    pub fn get_bytes(&self, index: usize) -> Option<&[u8]> {
        self.entries.get(index).map(Vec::as_slice)
    }

    /// Iterate over the entries as text.
    pub fn iter(&self) -> impl Iterator<Item = Cow<'_, str>> + '_ {
        self.entries.iter().map(|e| String::from_utf8_lossy(e))
    }

    /// Index of the first entry equal to `name`.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e == name.as_bytes())
    }

    /// Byte offset of entry `index` within the chunk data.
    #[must_use]
    pub fn offset_of(&self, index: usize) -> u64 {
        self.entries[..index].iter().map(|e| e.len() as u64 + 1).sum()
    }

    /// Index of the entry starting exactly at byte `offset`.
    #[must_use]
    pub fn index_at(&self, offset: u64) -> Option<usize> {
        let mut cursor = 0;
        for (index, entry) in self.entries.iter().enumerate() {
            if cursor == offset {
                return Some(index);
            }
            cursor += entry.len() as u64 + 1;
        }
        None
    }

    /// Stored size of entry `index`, terminator included.
    #[must_use]
    pub fn entry_len(&self, index: usize) -> u64 {
        self.entries[index].len() as u64 + 1
    }

    pub(crate) fn push(&mut self, name: &str) -> usize {
        self.entries.push(name.as_bytes().to_vec());
        self.entries.len() - 1
    }

    pub(crate) fn remove(&mut self, index: usize) -> Vec<u8> {
        self.entries.remove(index)
    }

    pub(crate) fn replace(&mut self, index: usize, name: &str) -> Vec<u8> {
        std::mem::replace(&mut self.entries[index], name.as_bytes().to_vec())
    }
}

/// Filenames must be non-empty and must not contain the terminator.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.as_bytes().contains(&0) {
        return Err(AdtError::InvalidName(name.to_string()));
    }
    Ok(())
}
