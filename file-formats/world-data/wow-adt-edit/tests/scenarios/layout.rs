//! Tiles laid out differently from the ones this crate writes.

use pretty_assertions::assert_eq;
use wow_adt_edit::{
    AdtDocument, AlphaEncoding, AlphaGrid, CellCoord, CellField, DocumentOptions,
    DoodadPlacement, HeaderSlot, MclyFlags, McnkFlags, OffsetSite, WmoPlacement,
};

use crate::common::{assert_offsets_match_reparse, reread};

/// MVER is 12 bytes, so MHDR data starts here.
const MHDR_DATA: usize = 20;

fn u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
}

fn put_u32(bytes: &mut [u8], at: usize, value: u32) {
    bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

fn header_field(slot: HeaderSlot) -> usize {
    MHDR_DATA + slot.field_offset() as usize
}

fn mcin_entry(bytes: &[u8], index: usize) -> usize {
    MHDR_DATA + u32_at(bytes, header_field(HeaderSlot::Mcin)) as usize + 8 + 16 * index
}

/// Move the MTEX chunk to the end of the file, after every cell.
fn mtex_after_cells(mut bytes: Vec<u8>) -> Vec<u8> {
    let mtex = MHDR_DATA + u32_at(&bytes, header_field(HeaderSlot::Mtex)) as usize;
    let len = 8 + u32_at(&bytes, mtex + 4) as usize;
    let chunk: Vec<u8> = bytes.drain(mtex..mtex + len).collect();

    for slot in HeaderSlot::ALL {
        let field = header_field(slot);
        let value = u32_at(&bytes, field);
        if value != 0 && MHDR_DATA + value as usize > mtex {
            put_u32(&mut bytes, field, value - len as u32);
        }
    }
    for index in 0..256 {
        let entry = mcin_entry(&bytes, index);
        let offset = u32_at(&bytes, entry);
        if offset as usize > mtex {
            put_u32(&mut bytes, entry, offset - len as u32);
        }
    }

    let moved = (bytes.len() - MHDR_DATA) as u32;
    put_u32(&mut bytes, header_field(HeaderSlot::Mtex), moved);
    bytes.extend(chunk);
    bytes
}

/// Clear the MCRF and MCAL offsets of the given cells.
fn without_refs_and_alpha(bytes: &mut [u8], cells: &[usize]) {
    for &index in cells {
        let header = u32_at(bytes, mcin_entry(bytes, index)) as usize + 8;
        put_u32(bytes, header + 0x20, 0);
        put_u32(bytes, header + 0x24, 0);
        put_u32(bytes, header + 0x28, 0);
    }
}

fn site(doc: &AdtDocument, wanted: OffsetSite) -> u64 {
    doc.offset_sites()
        .into_iter()
        .find(|(site, _)| *site == wanted)
        .map(|(_, at)| at)
        .unwrap()
}

#[test]
fn textures_stored_after_the_cells() {
    let mut doc = AdtDocument::new(DocumentOptions::default()).unwrap();
    doc.add_texture_filename("Tileset\\Barrens\\BarrensGrass.blp")
        .unwrap();
    doc.add_texture_filename("Tileset\\Barrens\\BarrensRock.blp")
        .unwrap();
    let bytes = mtex_after_cells(doc.write().unwrap());

    let mut doc = AdtDocument::read(&bytes, DocumentOptions::default()).unwrap();
    assert_eq!(doc.write().unwrap(), bytes);
    assert_eq!(doc.textures().len(), 2);
    let mtex = site(&doc, OffsetSite::Header(HeaderSlot::Mtex));
    let last_cell = site(&doc, OffsetSite::CellIndex(255));
    assert!(mtex > last_cell);

    // cell growth pushes MTEX along
    let len = doc.encoded_len();
    let cell = CellCoord::new(8, 8);
    doc.add_texture_layer(cell, 0, MclyFlags::default(), 0, None)
        .unwrap();
    doc.add_texture_layer(cell, 1, MclyFlags::default(), 0, Some(AlphaGrid::filled(68)))
        .unwrap();
    assert_eq!(
        site(&doc, OffsetSite::Header(HeaderSlot::Mtex)),
        mtex + (doc.encoded_len() - len)
    );
    assert_offsets_match_reparse(&doc);

    // MTEX growth moves nothing else
    let cells = site(&doc, OffsetSite::CellIndex(0));
    doc.add_texture_filename("Tileset\\Barrens\\BarrensSand.blp")
        .unwrap();
    assert_eq!(site(&doc, OffsetSite::CellIndex(0)), cells);
    assert_offsets_match_reparse(&doc);

    doc.remove_texture_filename(0).unwrap();
    assert_offsets_match_reparse(&doc);

    let again = reread(&doc);
    assert_eq!(again.textures().get(0).unwrap(), "Tileset\\Barrens\\BarrensRock.blp");
    let ids: Vec<u32> = again
        .cell(cell)
        .unwrap()
        .layers()
        .iter()
        .map(|layer| layer.texture_id())
        .collect();
    assert_eq!(ids, vec![0, 0]);
    assert!(
        site(&again, OffsetSite::Header(HeaderSlot::Mtex))
            > site(&again, OffsetSite::CellIndex(255))
    );
}

#[test]
fn cells_without_references_or_alpha_gain_them_on_demand() {
    let mut bytes = AdtDocument::new(DocumentOptions::default())
        .unwrap()
        .write()
        .unwrap();
    without_refs_and_alpha(&mut bytes, &[0, 17, 255]);

    let mut doc = AdtDocument::read(&bytes, DocumentOptions::default()).unwrap();
    assert_eq!(doc.write().unwrap(), bytes);
    let bare = [0, 17, 255].map(CellCoord::from_index);
    for coord in bare {
        let cell = doc.cell(coord).unwrap();
        assert!(!cell.has_subchunk(CellField::References), "{coord}");
        assert!(!cell.has_subchunk(CellField::AlphaMaps), "{coord}");
        assert!(cell.has_subchunk(CellField::Layers), "{coord}");
    }

    doc.add_texture_filename("Tileset\\Durotar\\DurotarDirt.blp")
        .unwrap();
    doc.add_model_filename("World\\Kalimdor\\Durotar\\Cactus01.m2")
        .unwrap();
    doc.add_object_filename("World\\wmo\\Kalimdor\\Orgrimmar\\Gate.wmo")
        .unwrap();

    doc.add_model_instance(&bare[..2], DoodadPlacement::new(0, 7, [10.0, 5.0, 20.0]))
        .unwrap();
    assert_offsets_match_reparse(&doc);
    doc.add_object_instance(&bare[2..], WmoPlacement::new(0, 8, [500.0, 5.0, 500.0]))
        .unwrap();
    assert_offsets_match_reparse(&doc);

    let mut mask = AlphaGrid::default();
    mask.set(31, 31, 200);
    doc.add_texture_layer(bare[2], 0, MclyFlags::default(), 0, None)
        .unwrap();
    doc.add_texture_layer(bare[2], 0, MclyFlags::default(), 0, Some(mask.clone()))
        .unwrap();
    assert_offsets_match_reparse(&doc);

    let again = reread(&doc);
    assert_eq!(again.cell(bare[0]).unwrap().doodad_refs(), &[0]);
    assert_eq!(again.cell(bare[1]).unwrap().doodad_refs(), &[0]);
    assert_eq!(again.cell(bare[2]).unwrap().object_refs(), &[0]);
    let last = again.cell(bare[2]).unwrap();
    assert!(last.has_subchunk(CellField::AlphaMaps));
    assert_eq!(last.layers()[1].alpha_map().unwrap().grid(), &mask);
    assert_eq!(again.write().unwrap(), doc.write().unwrap());
}

#[test]
fn legacy_low_res_masks_survive_a_round_trip() {
    let options = DocumentOptions::default().with_high_res_alpha(false);
    let mut doc = AdtDocument::new(options).unwrap();
    doc.add_texture_filename("Tileset\\Tanaris\\TanarisSand.blp")
        .unwrap();
    doc.add_texture_filename("Tileset\\Tanaris\\TanarisCrackedDirt.blp")
        .unwrap();

    let cell = CellCoord::new(3, 9);
    let flags = doc.cell(cell).unwrap().flags();
    doc.set_cell_flags(
        cell,
        McnkFlags {
            value: flags.value & !McnkFlags::DO_NOT_FIX_ALPHA_MAP,
        },
    )
    .unwrap();

    // 4-bit samples with the last row and column already duplicated
    let mut grid = AlphaGrid::default();
    for y in 0..64 {
        for x in 0..64 {
            grid.set(x, y, (((x.min(62) + y.min(62)) % 16) * 17) as u8);
        }
    }
    doc.add_texture_layer(cell, 0, MclyFlags::default(), 0, None)
        .unwrap();
    doc.add_texture_layer(cell, 1, MclyFlags::default(), 0, Some(grid.clone()))
        .unwrap();
    let map = doc.cell(cell).unwrap().layers()[1].alpha_map().unwrap();
    assert_eq!(map.encoding(), AlphaEncoding::LowResBroken);
    assert_eq!(map.encoded_len(), 2048);
    assert_offsets_match_reparse(&doc);

    let bytes = doc.write().unwrap();
    let again = AdtDocument::read(&bytes, options).unwrap();
    let map = again.cell(cell).unwrap().layers()[1].alpha_map().unwrap();
    assert_eq!(map.encoding(), AlphaEncoding::LowResBroken);
    assert_eq!(map.grid(), &grid);
    assert_eq!(again.write().unwrap(), bytes);

    // the stored last column is replaced by its neighbour when read back
    let mut edge = AlphaGrid::default();
    for y in 0..64 {
        edge.set(63, y, 255);
    }
    doc.set_alpha_map(cell, 1, edge).unwrap();
    let again = reread(&doc);
    let read_back = again.cell(cell).unwrap().layers()[1].alpha_map().unwrap().grid();
    assert_eq!(read_back.get(63, 10), 0);
    assert_eq!(read_back.get(63, 63), 0);

    // restoring the flag switches to the plain encoding at the same size
    let len = doc.encoded_len();
    doc.set_cell_flags(cell, flags).unwrap();
    let map = doc.cell(cell).unwrap().layers()[1].alpha_map().unwrap();
    assert_eq!(map.encoding(), AlphaEncoding::LowRes);
    assert_eq!(doc.encoded_len(), len);
    assert_offsets_match_reparse(&doc);
}
