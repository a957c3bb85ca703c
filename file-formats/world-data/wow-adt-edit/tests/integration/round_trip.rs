//! Read/write idempotence.

use pretty_assertions::assert_eq;
use wow_adt_edit::{AdtDocument, AdtVersion, AlphaGrid, CellCoord, DocumentOptions};

use crate::common::{populated, reread};

#[test]
fn edited_document_round_trips_byte_for_byte() {
    let doc = populated();
    let bytes = doc.write().unwrap();
    let reread = AdtDocument::read(&bytes, DocumentOptions::default()).unwrap();
    assert_eq!(reread.write().unwrap(), bytes);
}

#[test]
fn content_survives_a_reload() {
    let doc = reread(&populated());

    assert_eq!(doc.version(), AdtVersion::WotLK);
    assert_eq!(doc.textures().len(), 3);
    assert_eq!(doc.texture_flags().unwrap().len(), 3);
    assert_eq!(doc.model_count(), 2);
    assert_eq!(doc.model_name(1).unwrap(), "World\\Generic\\Bush02.m2");
    assert_eq!(doc.object_count(), 1);

    let cell = doc.cell(CellCoord::new(4, 7)).unwrap();
    assert_eq!(cell.layers().len(), 3);
    assert_eq!(cell.doodad_refs(), &[0]);
    assert_eq!(cell.object_refs(), &[0]);
    let mask = cell.layers()[1].alpha_map().unwrap().grid();
    assert_eq!(mask.get(10, 0), 40);
    assert_eq!(mask.get(63, 63), 252);
    assert_eq!(
        cell.layers()[2].alpha_map().unwrap().grid(),
        &AlphaGrid::filled(255)
    );

    assert_eq!(doc.doodads()[0].unique_id, 100);
    assert_eq!(doc.doodads()[0].position, [10.0, 20.0, 30.0]);
    assert_eq!(doc.wmos()[0].unique_id, 200);
}

#[test]
fn untouched_cells_keep_their_bytes() {
    let blank = AdtDocument::new(DocumentOptions::default()).unwrap();
    let doc = populated();
    let coord = CellCoord::new(9, 9);
    assert_eq!(
        doc.cell(coord).unwrap().heights(),
        blank.cell(coord).unwrap().heights()
    );
    assert_eq!(
        doc.cell(coord).unwrap().position(),
        blank.cell(coord).unwrap().position()
    );
}

#[test]
fn in_place_record_edits_round_trip() {
    let mut doc = populated();
    doc.doodads_mut()[1].scale = 2048;
    doc.wmos_mut()[0].doodad_set = 3;
    let cell = doc.cell_mut(CellCoord::new(2, 3)).unwrap();
    cell.set_area_id(12);
    cell.set_holes(0x0101);
    if let Some(heights) = cell.heights_mut() {
        heights.heights_mut()[0] = 42.5;
    }

    let doc = reread(&doc);
    assert_eq!(doc.doodads()[1].scale, 2048);
    assert_eq!(doc.wmos()[0].doodad_set, 3);
    let cell = doc.cell(CellCoord::new(2, 3)).unwrap();
    assert_eq!(cell.area_id(), 12);
    assert_eq!(cell.holes(), 0x0101);
    assert_eq!(cell.heights().unwrap().heights()[0], 42.5);
}

#[test]
fn files_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Test_30_30.adt");
    let doc = populated();
    doc.save(&path).unwrap();

    let loaded = AdtDocument::from_path(&path, DocumentOptions::default()).unwrap();
    assert_eq!(loaded.write().unwrap(), doc.write().unwrap());
}
