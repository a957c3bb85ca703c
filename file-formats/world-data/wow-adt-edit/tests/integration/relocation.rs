//! Every tracked offset agrees with a fresh parse after each edit.

use proptest::prelude::*;
use wow_adt_edit::{
    AdtDocument, AdtVersion, AlphaGrid, CellCoord, DocumentOptions, DoodadPlacement, HeaderSlot,
    MclyFlags, OffsetSite, WmoPlacement,
};

use crate::common::{assert_offsets_match_reparse, populated};

#[test]
fn growing_an_early_table_moves_every_cell() {
    // no MTXF before WotLK, so only MTEX grows
    let options = DocumentOptions::default().with_version(AdtVersion::Vanilla);
    let mut doc = AdtDocument::new(options).unwrap();
    let before = doc.offset_sites();
    let name = "Tileset\\Durotar\\DurotarSand.blp";
    doc.add_texture_filename(name).unwrap();
    let shift = name.len() as u64 + 1;

    for ((site, old), (same, new)) in before.iter().zip(doc.offset_sites()) {
        assert_eq!(*site, same);
        match site {
            OffsetSite::Header(slot) if slot.index() <= 1 => assert_eq!(new, *old, "{site:?}"),
            _ => assert_eq!(new, old + shift, "{site:?}"),
        }
    }
    assert_offsets_match_reparse(&doc);
}

#[test]
fn texture_flags_grow_with_the_texture_table() {
    let mut doc = AdtDocument::new(DocumentOptions::default()).unwrap();
    assert_eq!(doc.version(), AdtVersion::WotLK);
    let before = doc.offset_sites();
    let len_before = doc.encoded_len();
    let name = "Tileset\\Durotar\\DurotarSand.blp";
    doc.add_texture_filename(name).unwrap();
    let shift = name.len() as u64 + 1;
    let flags = 4;

    assert_eq!(doc.texture_flags().unwrap(), &[0]);
    assert_eq!(doc.encoded_len(), len_before + shift + flags);

    for ((site, old), (same, new)) in before.iter().zip(doc.offset_sites()) {
        assert_eq!(*site, same);
        match site {
            OffsetSite::Header(HeaderSlot::Mcin | HeaderSlot::Mtex) => {
                assert_eq!(new, *old, "{site:?}");
            }
            // MTXF starts after MTEX and grows at its own end
            OffsetSite::Header(_) => assert_eq!(new, old + shift, "{site:?}"),
            _ => assert_eq!(new, old + shift + flags, "{site:?}"),
        }
    }
    assert_offsets_match_reparse(&doc);
}

#[test]
fn mask_edits_only_move_the_rest_of_the_cell() {
    let mut doc = populated();
    let cell = CellCoord::new(4, 7);
    let neighbour = CellCoord::new(4, 6);
    let mask_of = |doc: &AdtDocument, layer: usize| {
        doc.offset_sites()
            .into_iter()
            .find(|(site, _)| *site == OffsetSite::LayerMask { cell, layer })
            .map(|(_, at)| at)
    };
    let cell_at = |doc: &AdtDocument, coord: CellCoord| {
        doc.offset_sites()
            .into_iter()
            .find(|(site, _)| *site == OffsetSite::CellIndex(coord.index()))
            .map(|(_, at)| at)
    };

    let second = mask_of(&doc, 2).unwrap();
    let next_cell = cell_at(&doc, CellCoord::new(4, 8)).unwrap();
    let earlier_cell = cell_at(&doc, neighbour).unwrap();

    // 8-bit uncompressed to RLE shrinks the first mask
    let mut grid = AlphaGrid::default();
    grid.set(0, 0, 255);
    doc.set_alpha_map(cell, 1, grid).unwrap();
    doc.set_layer_flags(cell, 1, MclyFlags::new(MclyFlags::ALPHA_MAP_COMPRESSED))
        .unwrap();

    let moved = second - mask_of(&doc, 2).unwrap();
    assert!(moved > 0);
    assert_eq!(cell_at(&doc, CellCoord::new(4, 8)).unwrap(), next_cell - moved);
    assert_eq!(cell_at(&doc, neighbour).unwrap(), earlier_cell);
    assert_offsets_match_reparse(&doc);
}

#[test]
fn every_mutation_keeps_offsets_consistent() {
    let mut doc = populated();
    let cell = CellCoord::new(4, 7);

    doc.add_texture_filename("new.blp").unwrap();
    assert_offsets_match_reparse(&doc);
    doc.replace_texture_filename(0, "a.blp").unwrap();
    assert_offsets_match_reparse(&doc);
    doc.add_model_filename("World\\Generic\\Barrel.m2").unwrap();
    assert_offsets_match_reparse(&doc);
    doc.replace_model_filename(0, "short.m2").unwrap();
    assert_offsets_match_reparse(&doc);
    doc.remove_model_filename(1).unwrap();
    assert_offsets_match_reparse(&doc);
    doc.add_object_instance(&[CellCoord::new(10, 10)], WmoPlacement::new(0, 9, [0.0; 3]))
        .unwrap();
    assert_offsets_match_reparse(&doc);
    doc.remove_object_instance(0).unwrap();
    assert_offsets_match_reparse(&doc);
    doc.remove_model_instance(0).unwrap();
    assert_offsets_match_reparse(&doc);
    doc.remove_texture_layer(cell, 1).unwrap();
    assert_offsets_match_reparse(&doc);
    doc.remove_texture_layer(cell, 0).unwrap();
    assert_offsets_match_reparse(&doc);
    doc.remove_texture_filename(1).unwrap();
    assert_offsets_match_reparse(&doc);
    doc.remove_object_filename(0).unwrap();
    assert_offsets_match_reparse(&doc);
    doc.set_high_res_alpha(false);
    assert_offsets_match_reparse(&doc);
}

#[derive(Debug, Clone)]
enum Edit {
    AddTexture(u8),
    RemoveTexture(usize),
    ReplaceTexture(usize, u8),
    AddModel(u8),
    RemoveModel(usize),
    AddObject(u8),
    RemoveObject(usize),
    PlaceModel(usize, u32),
    RemoveModelInstance(usize),
    PlaceObject(usize, u32),
    RemoveObjectInstance(usize),
    AddLayer(usize, u32, u8),
    RemoveLayer(usize, usize),
    SetMask(usize, usize, u8),
    HighRes(bool),
}

/// A few cells so edits collide; the last one is the final cell of the tile.
fn cell(pick: usize) -> CellCoord {
    [CellCoord::new(0, 0), CellCoord::new(0, 1), CellCoord::new(7, 3), CellCoord::new(15, 15)]
        [pick % 4]
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        3 => (0u8..6).prop_map(Edit::AddTexture),
        1 => (0usize..6).prop_map(Edit::RemoveTexture),
        1 => (0usize..6, 0u8..6).prop_map(|(i, n)| Edit::ReplaceTexture(i, n)),
        2 => (0u8..6).prop_map(Edit::AddModel),
        1 => (0usize..6).prop_map(Edit::RemoveModel),
        2 => (0u8..6).prop_map(Edit::AddObject),
        1 => (0usize..6).prop_map(Edit::RemoveObject),
        2 => (0usize..4, 0u32..4).prop_map(|(c, n)| Edit::PlaceModel(c, n)),
        1 => (0usize..6).prop_map(Edit::RemoveModelInstance),
        2 => (0usize..4, 0u32..4).prop_map(|(c, n)| Edit::PlaceObject(c, n)),
        1 => (0usize..6).prop_map(Edit::RemoveObjectInstance),
        3 => (0usize..4, 0u32..4, any::<u8>()).prop_map(|(c, t, a)| Edit::AddLayer(c, t, a)),
        1 => (0usize..4, 0usize..4).prop_map(|(c, i)| Edit::RemoveLayer(c, i)),
        1 => (0usize..4, 0usize..4, any::<u8>()).prop_map(|(c, i, a)| Edit::SetMask(c, i, a)),
        1 => any::<bool>().prop_map(Edit::HighRes),
    ]
}

/// Apply `edit`; rejected edits must leave the output untouched.
fn apply(doc: &mut AdtDocument, edit: &Edit) {
    let before = doc.write().unwrap();
    let result = match *edit {
        Edit::AddTexture(n) => doc.add_texture_filename(&format!("t{n}.blp")).map(drop),
        Edit::RemoveTexture(i) => doc.remove_texture_filename(i),
        Edit::ReplaceTexture(i, n) => doc.replace_texture_filename(i, &format!("texture_{n}.blp")),
        Edit::AddModel(n) => doc.add_model_filename(&format!("m{n}.m2")).map(drop),
        Edit::RemoveModel(i) => doc.remove_model_filename(i),
        Edit::AddObject(n) => doc.add_object_filename(&format!("o{n}.wmo")).map(drop),
        Edit::RemoveObject(i) => doc.remove_object_filename(i),
        Edit::PlaceModel(c, n) => doc
            .add_model_instance(&[cell(c)], DoodadPlacement::new(n, 1, [0.0; 3]))
            .map(drop),
        Edit::RemoveModelInstance(i) => doc.remove_model_instance(i),
        Edit::PlaceObject(c, n) => doc
            .add_object_instance(&[cell(c), cell(c + 1)], WmoPlacement::new(n, 2, [0.0; 3]))
            .map(drop),
        Edit::RemoveObjectInstance(i) => doc.remove_object_instance(i),
        Edit::AddLayer(c, t, a) => {
            let first = doc.cell(cell(c)).unwrap().layers().is_empty();
            let alpha = (!first).then(|| AlphaGrid::filled(a));
            doc.add_texture_layer(cell(c), t, MclyFlags::default(), 0, alpha)
                .map(drop)
        }
        Edit::RemoveLayer(c, i) => doc.remove_texture_layer(cell(c), i),
        Edit::SetMask(c, i, a) => doc.set_alpha_map(cell(c), i, AlphaGrid::filled(a)),
        Edit::HighRes(on) => {
            doc.set_high_res_alpha(on);
            Ok(())
        }
    };
    if result.is_err() {
        assert_eq!(doc.write().unwrap(), before, "{edit:?} failed but changed the file");
    }
}

fn assert_layers_have_masks(doc: &AdtDocument) {
    for cell in doc.cells() {
        let layers = cell.layers();
        if let Some((base, rest)) = layers.split_first() {
            assert!(base.alpha_map().is_none());
            assert!(!base.flags().use_alpha_map());
            assert!(rest.iter().all(|layer| layer.alpha_map().is_some()));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn random_edit_sequences_keep_offsets_consistent(
        edits in prop::collection::vec(edit(), 1..24)
    ) {
        let mut doc = AdtDocument::new(DocumentOptions::default()).unwrap();
        for edit in &edits {
            apply(&mut doc, edit);
            assert_layers_have_masks(&doc);
        }
        assert_offsets_match_reparse(&doc);

        let bytes = doc.write().unwrap();
        let reread = AdtDocument::read(&bytes, doc.options()).unwrap();
        prop_assert_eq!(reread.write().unwrap(), bytes);
    }
}
