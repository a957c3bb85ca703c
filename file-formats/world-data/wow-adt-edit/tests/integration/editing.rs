//! Load, edit, save workflows through the mutation API.

use pretty_assertions::assert_eq;
use wow_adt_edit::{
    AdtDocument, AlphaGrid, CellCoord, DocumentOptions, DoodadPlacement, MclyFlags, McnkFlags,
    WmoPlacement,
};

use crate::common::{assert_offsets_match_reparse, populated, reread};

#[test]
fn filenames_are_stored_once() {
    let mut doc = populated();
    let len = doc.encoded_len();
    assert_eq!(
        doc.add_texture_filename("Tileset\\Elwynn\\ElwynnRock01.blp")
            .unwrap(),
        2
    );
    assert_eq!(
        doc.add_model_filename("World\\Generic\\Bush02.m2").unwrap(),
        1
    );
    assert_eq!(
        doc.add_object_filename("World\\wmo\\Azeroth\\Buildings\\Farm.wmo")
            .unwrap(),
        0
    );
    assert_eq!(doc.encoded_len(), len);
}

#[test]
fn model_removal_renumbers_later_placements() {
    let mut doc = populated();
    doc.add_model_filename("World\\Generic\\Barrel.m2").unwrap();
    doc.add_model_instance(&[CellCoord::new(1, 1)], DoodadPlacement::new(2, 102, [0.0; 3]))
        .unwrap();

    doc.remove_model_filename(1).unwrap();
    let doc = reread(&doc);
    let ids: Vec<u32> = doc.doodads().iter().map(|d| d.name_id).collect();
    // the placement of the removed model keeps its key
    assert_eq!(ids, [0, 1, 1]);
    assert_eq!(doc.model_name(1).unwrap(), "World\\Generic\\Barrel.m2");
}

#[test]
fn instance_removal_renumbers_cell_references() {
    let mut doc = populated();
    let shared = CellCoord::new(4, 7);
    doc.add_model_instance(&[shared], DoodadPlacement::new(1, 103, [0.0; 3]))
        .unwrap();
    doc.add_object_instance(&[shared, CellCoord::new(0, 0)], WmoPlacement::new(0, 201, [0.0; 3]))
        .unwrap();
    assert_eq!(doc.cell(shared).unwrap().doodad_refs(), &[0, 2]);
    assert_eq!(doc.cell(shared).unwrap().object_refs(), &[0, 1]);

    doc.remove_model_instance(1).unwrap();
    doc.remove_object_instance(0).unwrap();
    assert_offsets_match_reparse(&doc);

    let doc = reread(&doc);
    assert_eq!(doc.cell(shared).unwrap().doodad_refs(), &[0, 1]);
    assert_eq!(doc.cell(shared).unwrap().object_refs(), &[0]);
    assert!(doc.cell(CellCoord::new(0, 0)).unwrap().doodad_refs().is_empty());
    assert_eq!(doc.cell(CellCoord::new(0, 0)).unwrap().object_refs(), &[0]);
    assert_eq!(doc.wmos()[0].unique_id, 201);
}

#[test]
fn removing_the_base_layer_promotes_the_next_without_a_mask() {
    let mut doc = populated();
    let cell = CellCoord::new(15, 15);
    doc.remove_texture_layer(cell, 0).unwrap();

    let doc = reread(&doc);
    let layers = doc.cell(cell).unwrap().layers();
    assert_eq!(layers.len(), 2);
    assert_eq!(layers[0].texture_id(), 1);
    assert!(!layers[0].flags().use_alpha_map());
    assert!(!layers[0].flags().alpha_map_compressed());
    assert!(layers[0].alpha_map().is_none());
    assert_eq!(
        layers[1].alpha_map().unwrap().grid(),
        &AlphaGrid::filled(255)
    );
}

#[test]
fn a_fifth_layer_leaves_the_cell_unchanged() {
    let mut doc = populated();
    let cell = CellCoord::new(0, 0);
    doc.add_texture_layer(cell, 2, MclyFlags::default(), 0, None)
        .unwrap();
    let before = doc.write().unwrap();

    let err = doc
        .add_texture_layer(cell, 0, MclyFlags::default(), 0, None)
        .unwrap_err();
    assert_eq!(err.kind(), wow_adt_edit::ErrorKind::Capacity);
    assert_eq!(doc.cell(cell).unwrap().layers().len(), 4);
    assert_eq!(doc.write().unwrap(), before);
}

#[test]
fn texture_removal_shifts_layer_ids() {
    let mut doc = populated();
    doc.remove_texture_filename(0).unwrap();
    let doc = reread(&doc);
    let ids: Vec<u32> = doc
        .cell(CellCoord::new(4, 7))
        .unwrap()
        .layers()
        .iter()
        .map(|layer| layer.texture_id())
        .collect();
    assert_eq!(ids, [0, 0, 1]);
    assert_eq!(doc.textures().len(), 2);
}

#[test]
fn cell_flags_keep_masks_decodable() {
    let mut doc = AdtDocument::new(DocumentOptions::default().with_high_res_alpha(false)).unwrap();
    doc.add_texture_filename("a.blp").unwrap();
    let cell = CellCoord::new(3, 3);
    doc.add_texture_layer(cell, 0, MclyFlags::default(), 0, None)
        .unwrap();
    doc.add_texture_layer(cell, 0, MclyFlags::default(), 0, Some(AlphaGrid::filled(0x88)))
        .unwrap();

    doc.set_cell_flags(cell, McnkFlags { value: 0 }).unwrap();
    assert!(!doc.cell(cell).unwrap().flags().do_not_fix_alpha_map());
    assert_offsets_match_reparse(&doc);

    let doc = reread(&doc);
    let map = doc.cell(cell).unwrap().layers()[1].alpha_map().unwrap();
    assert_eq!(map.encoded_len(), 2048);
    assert_eq!(map.grid().get(20, 20), 0x88);
}

#[test]
fn layer_texture_and_effect_can_change() {
    let mut doc = populated();
    let cell = CellCoord::new(0, 0);
    doc.set_layer_texture(cell, 1, 2).unwrap();
    if let Some(layer) = doc.cell_mut(cell).unwrap().layers_mut().get_mut(2) {
        layer.set_effect_id(77);
    }
    let doc = reread(&doc);
    let layers = doc.cell(cell).unwrap().layers();
    assert_eq!(layers[1].texture_id(), 2);
    assert_eq!(layers[2].effect_id(), 77);
}
