//! Blank tile generation.
//!
//! Writes a flat tile in two passes: every chunk is written with placeholder
//! offsets while its position is recorded, then MHDR and MCIN are patched.
//!
//! ```text
//! MVER, MHDR, MCIN, MTEX, MMDX, MMID, MWMO, MWID, MDDF, MODF, [MTXF]
//! MCNK x 256: header, MCVT, MCNR, MCLY, MCRF, MCAL
//! ```

use std::io::{Cursor, Seek, SeekFrom, Write};

use crate::cell::{CellCoord, GRID_SIZE};
use crate::chunk_header::ChunkHeader;
use crate::chunk_id::ChunkId;
use crate::chunks::mcnk::mcnr::NORMAL_PADDING;
use crate::chunks::mcnk::{McnkFlags, McnkHeader, McnrChunk, McvtChunk};
use crate::chunks::simple::{CELL_COUNT, HeaderSlot, McinEntry, MhdrChunk, MverChunk};
use crate::error::Result;
use crate::io_helpers::WriteLittleEndian;
use crate::record::FixedRecord;
use crate::version::{AdtVersion, NormalPaddingLayout};

/// Edge length of a tile in yards.
const TILE_SIZE: f32 = 533.333_3;

/// Serialize an empty tile laid out for `version`.
pub(crate) fn blank_tile(version: AdtVersion) -> Result<Vec<u8>> {
    let mut writer = Cursor::new(Vec::new());

    write_record(&mut writer, ChunkId::MVER, &MverChunk::default())?;
    let mhdr_data = writer.stream_position()? + ChunkHeader::SIZE;
    let mut mhdr = MhdrChunk::default();
    write_record(&mut writer, ChunkId::MHDR, &mhdr)?;

    let mut slots = Vec::with_capacity(HeaderSlot::ALL.len());
    let mcin_address = writer.stream_position()?;
    slots.push((HeaderSlot::Mcin, mcin_address));
    write_chunk(&mut writer, ChunkId::MCIN, &[0; CELL_COUNT * McinEntry::SIZE])?;

    let mut empty = vec![
        HeaderSlot::Mtex,
        HeaderSlot::Mmdx,
        HeaderSlot::Mmid,
        HeaderSlot::Mwmo,
        HeaderSlot::Mwid,
        HeaderSlot::Mddf,
        HeaderSlot::Modf,
    ];
    if version >= AdtVersion::WotLK {
        empty.push(HeaderSlot::Mtxf);
    }
    for slot in empty {
        slots.push((slot, writer.stream_position()?));
        write_chunk(&mut writer, slot.chunk_id(), &[])?;
    }

    let mut index = Vec::with_capacity(CELL_COUNT);
    for coord in CellCoord::all() {
        let address = writer.stream_position()?;
        write_cell(&mut writer, coord, version)?;
        index.push(McinEntry {
            offset: address as u32,
            size: (writer.stream_position()? - address) as u32,
            flags: 0,
            async_id: 0,
        });
    }

    // Pass 2: patch the offset tables.
    for (slot, address) in slots {
        mhdr.offsets[slot.index()] = (address - mhdr_data) as u32;
    }
    let mut patch = Vec::with_capacity(MhdrChunk::SIZE);
    mhdr.encode_into(&mut patch)?;
    writer.seek(SeekFrom::Start(mhdr_data))?;
    writer.write_all(&patch)?;

    let mut patch = Vec::with_capacity(CELL_COUNT * McinEntry::SIZE);
    for entry in &index {
        entry.encode_into(&mut patch)?;
    }
    writer.seek(SeekFrom::Start(mcin_address + ChunkHeader::SIZE))?;
    writer.write_all(&patch)?;

    Ok(writer.into_inner())
}

/// Write one flat cell with an empty texture stack.
fn write_cell<W: Write + Seek>(writer: &mut W, coord: CellCoord, version: AdtVersion) -> Result<()> {
    let start = writer.stream_position()?;
    writer.write_all(&[0; ChunkHeader::SIZE as usize + McnkHeader::SIZE])?;

    let ofs_height = (writer.stream_position()? - start) as u32;
    write_chunk(writer, ChunkId::MCVT, &McvtChunk::flat(0.0).encode()?)?;

    let ofs_normal = (writer.stream_position()? - start) as u32;
    let normals = McnrChunk::flat(version.normal_padding());
    write_chunk(writer, ChunkId::MCNR, &normals.encode()?)?;
    if normals.padding() == NormalPaddingLayout::Outside {
        writer.write_all(&[0; NORMAL_PADDING])?;
    }

    let ofs_layer = (writer.stream_position()? - start) as u32;
    write_chunk(writer, ChunkId::MCLY, &[])?;
    let ofs_refs = (writer.stream_position()? - start) as u32;
    write_chunk(writer, ChunkId::MCRF, &[])?;
    let ofs_alpha = (writer.stream_position()? - start) as u32;
    write_chunk(writer, ChunkId::MCAL, &[])?;
    let end = writer.stream_position()?;

    let cell_size = TILE_SIZE / GRID_SIZE as f32;
    let header = McnkHeader {
        flags: McnkFlags {
            value: McnkFlags::DO_NOT_FIX_ALPHA_MAP,
        },
        index_x: coord.col as u32,
        index_y: coord.row as u32,
        ofs_height,
        ofs_normal,
        ofs_layer,
        ofs_refs,
        ofs_alpha,
        size_alpha: ChunkHeader::SIZE as u32,
        position: [coord.col as f32 * cell_size, coord.row as f32 * cell_size, 0.0],
        ..McnkHeader::default()
    };
    let mut body = Vec::with_capacity(McnkHeader::SIZE);
    header.encode_into(&mut body)?;

    writer.seek(SeekFrom::Start(start))?;
    writer.write_all(&ChunkId::MCNK.0)?;
    writer.write_u32_le((end - start - ChunkHeader::SIZE) as u32)?;
    writer.write_all(&body)?;
    writer.seek(SeekFrom::Start(end))?;
    Ok(())
}

fn write_record<W: Write, T: FixedRecord>(writer: &mut W, id: ChunkId, record: &T) -> Result<()> {
    let mut data = Vec::with_capacity(T::SIZE);
    record.encode_into(&mut data)?;
    write_chunk(writer, id, &data)
}

fn write_chunk<W: Write>(writer: &mut W, id: ChunkId, data: &[u8]) -> Result<()> {
    writer.write_all(&id.0)?;
    writer.write_u32_le(data.len() as u32)?;
    writer.write_all(data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io_helpers::ReadLittleEndian;
    use pretty_assertions::assert_eq;

    /// Header, MCVT, MCNR with its padding, then empty MCLY, MCRF and MCAL.
    const CELL_LEN: u64 = 136 + 588 + 456 + 8 + 8 + 8;

    #[test]
    fn header_points_at_every_required_chunk() {
        let bytes = blank_tile(AdtVersion::WotLK).unwrap();
        let mut cursor = Cursor::new(&bytes[20..]);
        let flags = cursor.read_u32_le().unwrap();
        assert_eq!(flags, 0);
        let offsets: Vec<u32> = (0..HeaderSlot::ALL.len())
            .map(|_| cursor.read_u32_le().unwrap())
            .collect();
        for slot in HeaderSlot::ALL {
            let value = offsets[slot.index()];
            if slot == HeaderSlot::Mfbo || slot == HeaderSlot::Mh2o {
                assert_eq!(value, 0, "{slot:?}");
                continue;
            }
            let at = 20 + value as usize;
            assert_eq!(&bytes[at..at + 4], &slot.chunk_id().0, "{slot:?}");
        }
        assert_eq!(offsets[HeaderSlot::Mcin.index()], 64);
    }

    #[test]
    fn vanilla_tiles_have_no_texture_flags() {
        let bytes = blank_tile(AdtVersion::Vanilla).unwrap();
        let mtxf = u32::from_le_bytes(bytes[20 + 44..20 + 48].try_into().unwrap());
        assert_eq!(mtxf, 0);
    }

    #[test]
    fn cells_are_indexed_in_row_major_order() {
        let bytes = blank_tile(AdtVersion::WotLK).unwrap();
        let mcin = 84 + 8;
        let entry = |i: usize| {
            let at = mcin + i * 16;
            let mut cursor = Cursor::new(&bytes[at..at + 8]);
            (
                cursor.read_u32_le().unwrap() as usize,
                cursor.read_u32_le().unwrap() as u64,
            )
        };

        let (first, size) = entry(0);
        assert_eq!(size, CELL_LEN);
        let (second, _) = entry(1);
        assert_eq!(second - first, size as usize);
        let (last, _) = entry(CELL_COUNT - 1);
        assert_eq!(last as u64 + size, bytes.len() as u64);

        // index_x and index_y of cell 17 (row 1, column 1)
        let (cell, _) = entry(17);
        let mut cursor = Cursor::new(&bytes[cell + 12..cell + 20]);
        assert_eq!(cursor.read_u32_le().unwrap(), 1);
        assert_eq!(cursor.read_u32_le().unwrap(), 1);
    }

    #[test]
    fn cataclysm_cells_keep_normal_padding_inside() {
        let wotlk = blank_tile(AdtVersion::WotLK).unwrap();
        let cata = blank_tile(AdtVersion::Cataclysm).unwrap();
        assert_eq!(wotlk.len(), cata.len());

        let mcnr = |bytes: &[u8]| {
            let cell = u32::from_le_bytes(bytes[92..96].try_into().unwrap()) as usize;
            let at = cell + 136 + 8 + 580;
            assert_eq!(&bytes[at..at + 4], &ChunkId::MCNR.0);
            u32::from_le_bytes(bytes[at + 4..at + 8].try_into().unwrap())
        };
        assert_eq!(mcnr(&wotlk), 435);
        assert_eq!(mcnr(&cata), 448);
    }
}
