//! Shared fixtures.

use wow_adt_edit::{
    AdtDocument, AlphaGrid, CellCoord, DocumentOptions, DoodadPlacement, MclyFlags,
    WmoPlacement,
};

/// Reload a document from its own output.
pub fn reread(doc: &AdtDocument) -> AdtDocument {
    AdtDocument::read(&doc.write().unwrap(), doc.options()).unwrap()
}

/// Addresses of every tracked offset, as the document sees them and as a
/// fresh parse of its output sees them.
pub fn assert_offsets_match_reparse(doc: &AdtDocument) {
    let bytes = doc.write().unwrap();
    assert_eq!(bytes.len() as u64, doc.encoded_len());
    let fresh = AdtDocument::read(&bytes, doc.options()).unwrap();
    pretty_assertions::assert_eq!(doc.offset_sites(), fresh.offset_sites());
}

/// A tile with textures, layers, masks and placements in a few cells.
pub fn populated() -> AdtDocument {
    let mut doc = AdtDocument::new(DocumentOptions::default()).unwrap();
    for name in [
        "Tileset\\Elwynn\\ElwynnGrass01.blp",
        "Tileset\\Elwynn\\ElwynnDirtBase.blp",
        "Tileset\\Elwynn\\ElwynnRock01.blp",
    ] {
        doc.add_texture_filename(name).unwrap();
    }
    for name in ["World\\Azeroth\\Elwynn\\Tree01.m2", "World\\Generic\\Bush02.m2"] {
        doc.add_model_filename(name).unwrap();
    }
    doc.add_object_filename("World\\wmo\\Azeroth\\Buildings\\Farm.wmo")
        .unwrap();

    let mut gradient = AlphaGrid::default();
    for y in 0..64 {
        for x in 0..64 {
            gradient.set(x, y, (x * 4) as u8);
        }
    }
    for (row, col) in [(0, 0), (4, 7), (15, 15)] {
        let cell = CellCoord::new(row, col);
        doc.add_texture_layer(cell, 0, MclyFlags::default(), 0, None)
            .unwrap();
        doc.add_texture_layer(cell, 1, MclyFlags::default(), 0, Some(gradient.clone()))
            .unwrap();
        doc.add_texture_layer(
            cell,
            2,
            MclyFlags::new(MclyFlags::ALPHA_MAP_COMPRESSED),
            0,
            Some(AlphaGrid::filled(255)),
        )
        .unwrap();
    }

    doc.add_model_instance(
        &[CellCoord::new(4, 7), CellCoord::new(4, 8)],
        DoodadPlacement::new(0, 100, [10.0, 20.0, 30.0]),
    )
    .unwrap();
    doc.add_model_instance(&[CellCoord::new(0, 0)], DoodadPlacement::new(1, 101, [1.0, 2.0, 3.0]))
        .unwrap();
    doc.add_object_instance(&[CellCoord::new(4, 7)], WmoPlacement::new(0, 200, [5.0, 5.0, 5.0]))
        .unwrap();
    doc
}
