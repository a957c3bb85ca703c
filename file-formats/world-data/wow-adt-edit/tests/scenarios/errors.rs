//! Rejected edits and malformed input.

use pretty_assertions::assert_eq;
use wow_adt_edit::{
    AdtDocument, AdtError, AlphaGrid, CellCoord, DocumentOptions, DoodadPlacement, ErrorKind,
    MclyFlags, WmoPlacement,
};

use crate::common::populated;

#[test]
fn rejected_edits_leave_the_document_unchanged() {
    let mut doc = populated();
    let cell = CellCoord::new(4, 7);
    doc.add_texture_layer(cell, 0, MclyFlags::default(), 0, None)
        .unwrap();
    let before = doc.write().unwrap();
    let outside = CellCoord::new(3, 16);

    let failures: Vec<(AdtError, ErrorKind)> = vec![
        (doc.remove_texture_filename(3).unwrap_err(), ErrorKind::Index),
        (
            doc.replace_texture_filename(0, "Tileset\\Elwynn\\ElwynnRock01.blp")
                .unwrap_err(),
            ErrorKind::Index,
        ),
        (doc.add_texture_filename("bad\0name.blp").unwrap_err(), ErrorKind::Index),
        (doc.remove_model_filename(2).unwrap_err(), ErrorKind::Index),
        (doc.replace_object_filename(1, "x.wmo").unwrap_err(), ErrorKind::Index),
        (doc.add_model_filename("").unwrap_err(), ErrorKind::Index),
        (
            doc.add_model_instance(&[cell], DoodadPlacement::new(2, 1, [0.0; 3]))
                .unwrap_err(),
            ErrorKind::Index,
        ),
        (
            doc.add_object_instance(&[cell, outside], WmoPlacement::new(0, 1, [0.0; 3]))
                .unwrap_err(),
            ErrorKind::Index,
        ),
        (doc.remove_model_instance(2).unwrap_err(), ErrorKind::Index),
        (doc.remove_object_instance(1).unwrap_err(), ErrorKind::Index),
        (
            doc.add_texture_layer(cell, 0, MclyFlags::default(), 0, None)
                .unwrap_err(),
            ErrorKind::Capacity,
        ),
        (
            doc.add_texture_layer(CellCoord::new(1, 1), 9, MclyFlags::default(), 0, None)
                .unwrap_err(),
            ErrorKind::Index,
        ),
        (doc.remove_texture_layer(cell, 4).unwrap_err(), ErrorKind::Index),
        (doc.remove_texture_layer(outside, 0).unwrap_err(), ErrorKind::Index),
        (
            doc.set_alpha_map(cell, 0, AlphaGrid::filled(1)).unwrap_err(),
            ErrorKind::Index,
        ),
        (doc.set_layer_texture(cell, 1, 3).unwrap_err(), ErrorKind::Index),
    ];

    for (err, kind) in failures {
        assert_eq!(err.kind(), kind, "{err}");
    }
    assert_eq!(doc.write().unwrap(), before);
}

#[test]
fn unsupported_version_is_a_format_error() {
    let mut bytes = populated().write().unwrap();
    bytes[8] = 17;
    let err = AdtDocument::read(&bytes, DocumentOptions::default()).unwrap_err();
    assert!(matches!(err, AdtError::UnsupportedVersion(17)));
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn truncated_files_are_rejected() {
    let bytes = populated().write().unwrap();
    for len in [0, 6, 12, 100, bytes.len() / 2, bytes.len() - 1] {
        let err = AdtDocument::read(&bytes[..len], DocumentOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format, "length {len}: {err}");
    }
}

#[test]
fn bad_magic_is_reported_with_its_offset() {
    let mut bytes = populated().write().unwrap();
    bytes[12..16].copy_from_slice(b"XXXX");
    match AdtDocument::read(&bytes, DocumentOptions::default()) {
        Err(AdtError::InvalidMagic { offset, .. }) => assert_eq!(offset, 12),
        other => panic!("expected bad magic, got {other:?}"),
    }
}
