//! Fixed-size records and the tables built from them.
//!
//! Most ADT chunks are either one fixed record (MVER, MFBO) or a packed array
//! of them (MDDF, MODF, MTXF, MCLY, MCSE). [`FixedRecord`] describes the record
//! and [`RecordTable`] the array, including any bytes after the last whole
//! record so that odd-sized chunks survive a round trip.

use binrw::{BinRead, BinWrite};
use std::io::Cursor;

use crate::error::Result;

/// A record with a constant on-disk size, encoded through binrw.
pub trait FixedRecord:
    Sized + for<'a> BinRead<Args<'a> = ()> + for<'a> BinWrite<Args<'a> = ()>
{
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Decode one record from the start of `bytes`.
    fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(Self::read_le(&mut Cursor::new(bytes))?)
    }

    /// Append the encoded record to `out`.
    fn encode_into(&self, out: &mut Vec<u8>) -> Result<()> {
        let mut cursor = Cursor::new(Vec::with_capacity(Self::SIZE));
        self.write_le(&mut cursor)?;
        out.extend_from_slice(&cursor.into_inner());
        Ok(())
    }
}

impl FixedRecord for u32 {
    const SIZE: usize = 4;
}

impl FixedRecord for f32 {
    const SIZE: usize = 4;
}

/// A packed array of `T`, plus any trailing bytes too short for another record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordTable<T> {
    records: Vec<T>,
    trailing: Vec<u8>,
}

impl<T> Default for RecordTable<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            trailing: Vec::new(),
        }
    }
}

impl<T: FixedRecord> RecordTable<T> {
    /// Decode as many whole records as `data` holds.
    pub fn decode(data: &[u8]) -> Result<Self> {
        Self::decode_count(data, data.len() / T::SIZE)
    }

    /// Decode exactly `count` records; the remainder is kept as trailing bytes.
    pub fn decode_count(data: &[u8], count: usize) -> Result<Self> {
        let body = count * T::SIZE;
        let records = data
            .get(..body)
            .ok_or(crate::error::AdtError::UnexpectedEof)?
            .chunks_exact(T::SIZE)
            .map(T::decode)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            records,
            trailing: data[body..].to_vec(),
        })
    }

    /// Encode the records followed by the trailing bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.encoded_len() as usize);
        for record in &self.records {
            record.encode_into(&mut out)?;
        }
        out.extend_from_slice(&self.trailing);
        Ok(out)
    }

    /// Encoded size in bytes.
    pub fn encoded_len(&self) -> u64 {
        (self.records.len() * T::SIZE + self.trailing.len()) as u64
    }

    /// Byte offset of record `index` within the encoded table.
    pub fn offset_of(&self, index: usize) -> u64 {
        (index * T::SIZE) as u64
    }
}

impl<T> RecordTable<T> {
    /// Build a table from records.
    pub fn from_records(records: Vec<T>) -> Self {
        Self {
            records,
            trailing: Vec::new(),
        }
    }

    /// Replace the bytes kept after the last record.
    #[must_use]
    pub fn with_trailing(mut self, trailing: Vec<u8>) -> Self {
        self.trailing = trailing;
        self
    }

    /// Bytes after the last whole record.
    pub fn trailing(&self) -> &[u8] {
        &self.trailing
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.records.get(index)
    }

    /// Mutable record at `index`; the record count cannot change through it.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.records.get_mut(index)
    }

    /// Iterate over the records.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.records.iter()
    }

    /// Iterate mutably over the records.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.records.iter_mut()
    }

    /// Records as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.records
    }

    /// Records as a mutable slice; the record count cannot change through it.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.records
    }

    pub(crate) fn push(&mut self, record: T) {
        self.records.push(record);
    }

    pub(crate) fn remove(&mut self, index: usize) -> T {
        self.records.remove(index)
    }
}
