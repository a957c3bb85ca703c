// io_helpers.rs - Little-endian scalar codec shared by the chunk modules

use crate::error::{AdtError, Result};
use std::io::{Read, Write};

/// Extension trait for reading little-endian values
pub trait ReadLittleEndian: Read {
    fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0; 1];
        self.read_exact(&mut buf)
            .map_err(|_| AdtError::UnexpectedEof)?;
        Ok(buf[0])
    }

    fn read_u16_le(&mut self) -> Result<u16> {
        let mut buf = [0; 2];
        self.read_exact(&mut buf)
            .map_err(|_| AdtError::UnexpectedEof)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn read_u32_le(&mut self) -> Result<u32> {
        let mut buf = [0; 4];
        self.read_exact(&mut buf)
            .map_err(|_| AdtError::UnexpectedEof)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn read_f32_le(&mut self) -> Result<f32> {
        let mut buf = [0; 4];
        self.read_exact(&mut buf)
            .map_err(|_| AdtError::UnexpectedEof)?;
        Ok(f32::from_le_bytes(buf))
    }

    fn read_vec3_le(&mut self) -> Result<[f32; 3]> {
        Ok([self.read_f32_le()?, self.read_f32_le()?, self.read_f32_le()?])
    }
}

/// Extension trait for writing little-endian values
pub trait WriteLittleEndian: Write {
    fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write_all(&[value]).map_err(AdtError::Io)
    }

    fn write_u16_le(&mut self, value: u16) -> Result<()> {
        self.write_all(&value.to_le_bytes()).map_err(AdtError::Io)
    }

    fn write_u32_le(&mut self, value: u32) -> Result<()> {
        self.write_all(&value.to_le_bytes()).map_err(AdtError::Io)
    }

    fn write_f32_le(&mut self, value: f32) -> Result<()> {
        self.write_all(&value.to_le_bytes()).map_err(AdtError::Io)
    }

    fn write_vec3_le(&mut self, value: [f32; 3]) -> Result<()> {
        for component in value {
            self.write_f32_le(component)?;
        }
        Ok(())
    }
}

// Implement for all types that implement Read/Write
impl<R: Read + ?Sized> ReadLittleEndian for R {}
impl<W: Write + ?Sized> WriteLittleEndian for W {}

/// Read `count` consecutive `u32` values from the start of `data`.
pub fn read_u32_array(data: &[u8], count: usize) -> Result<Vec<u32>> {
    let needed = count.checked_mul(4).ok_or(AdtError::UnexpectedEof)?;
    let raw = data.get(..needed).ok_or(AdtError::UnexpectedEof)?;
    Ok(raw
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Append `values` to `out` as little-endian `u32`s.
pub fn write_u32_array(out: &mut Vec<u8>, values: impl IntoIterator<Item = u32>) {
    for value in values {
        out.extend_from_slice(&value.to_le_bytes());
    }
}

/// Convert a file address to a slice index.
pub fn to_index(address: u64) -> Result<usize> {
    usize::try_from(address).map_err(|_| AdtError::UnexpectedEof)
}

/// Borrow `len` bytes of `bytes` starting at `address`.
pub fn slice_at(bytes: &[u8], address: u64, len: u64) -> Result<&[u8]> {
    let start = to_index(address)?;
    let end = start
        .checked_add(to_index(len)?)
        .ok_or(AdtError::UnexpectedEof)?;
    bytes.get(start..end).ok_or(AdtError::UnexpectedEof)
}
