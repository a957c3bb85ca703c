//! Layout differences between client generations.

use pretty_assertions::assert_eq;
use wow_adt_edit::{
    AdtDocument, AdtVersion, AlphaGrid, CellCoord, CellField, DocumentOptions, MclyFlags,
};

use crate::common::assert_offsets_match_reparse;

fn blank(version: AdtVersion) -> AdtDocument {
    AdtDocument::new(DocumentOptions::default().with_version(version)).unwrap()
}

#[test]
fn blank_tiles_round_trip_for_every_version() {
    for version in [
        AdtVersion::Vanilla,
        AdtVersion::TBC,
        AdtVersion::WotLK,
        AdtVersion::Cataclysm,
        AdtVersion::MoP,
    ] {
        let doc = blank(version);
        assert_eq!(doc.version(), version);
        let bytes = doc.write().unwrap();
        let reread = AdtDocument::read(&bytes, doc.options()).unwrap();
        assert_eq!(reread.write().unwrap(), bytes, "{version}");
        assert!(reread.cells().iter().all(|cell| {
            [
                CellField::Heights,
                CellField::Normals,
                CellField::Layers,
                CellField::References,
                CellField::AlphaMaps,
            ]
            .into_iter()
            .all(|field| cell.has_subchunk(field))
        }));
    }
}

#[test]
fn version_is_detected_from_root_chunks() {
    let vanilla = blank(AdtVersion::Vanilla).write().unwrap();
    let wotlk = blank(AdtVersion::WotLK).write().unwrap();
    assert_eq!(
        AdtDocument::read(&vanilla, DocumentOptions::default())
            .unwrap()
            .version(),
        AdtVersion::Vanilla
    );
    assert_eq!(
        AdtDocument::read(&wotlk, DocumentOptions::default())
            .unwrap()
            .version(),
        AdtVersion::WotLK
    );
}

#[test]
fn texture_flags_follow_textures_only_where_present() {
    let mut vanilla = blank(AdtVersion::Vanilla);
    vanilla.add_texture_filename("a.blp").unwrap();
    assert!(vanilla.texture_flags().is_none());
    assert_offsets_match_reparse(&vanilla);

    let mut wotlk = blank(AdtVersion::WotLK);
    wotlk.add_texture_filename("a.blp").unwrap();
    wotlk.add_texture_filename("b.blp").unwrap();
    if let Some(flags) = wotlk.texture_flags_mut() {
        flags[1] = 0x1;
    }
    wotlk.remove_texture_filename(0).unwrap();
    assert_eq!(wotlk.texture_flags().unwrap(), &[0x1]);
    assert_offsets_match_reparse(&wotlk);
}

#[test]
fn cataclysm_cells_edit_like_older_ones() {
    let mut doc = blank(AdtVersion::Cataclysm);
    doc.add_texture_filename("a.blp").unwrap();
    let cell = CellCoord::new(6, 2);
    doc.add_texture_layer(cell, 0, MclyFlags::default(), 0, None)
        .unwrap();
    doc.add_texture_layer(cell, 0, MclyFlags::default(), 0, Some(AlphaGrid::filled(17)))
        .unwrap();
    assert_offsets_match_reparse(&doc);

    let bytes = doc.write().unwrap();
    let reread = AdtDocument::read(&bytes, doc.options()).unwrap();
    let normals = reread.cell(cell).unwrap().normals().unwrap();
    assert_eq!(
        normals.padding(),
        AdtVersion::Cataclysm.normal_padding()
    );
}
