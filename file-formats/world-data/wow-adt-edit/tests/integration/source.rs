//! Loading tiles from an extracted data directory.

use std::fs;

use pretty_assertions::assert_eq;
use wow_adt_edit::{AdtDocument, AssetSource, DirectorySource, DocumentOptions, ErrorKind};

use crate::common::populated;

#[test]
fn loads_tiles_by_client_path() {
    let dir = tempfile::tempdir().unwrap();
    let maps = dir.path().join("World").join("Maps").join("Azeroth");
    fs::create_dir_all(&maps).unwrap();
    let doc = populated();
    doc.save(maps.join("Azeroth_32_48.adt")).unwrap();

    let source = DirectorySource::new(dir.path());
    let id = "world\\maps\\azeroth\\AZEROTH_32_48.ADT";
    assert!(source.has(id));
    let loaded = AdtDocument::load(&source, id, DocumentOptions::default()).unwrap();
    assert_eq!(loaded.write().unwrap(), doc.write().unwrap());
}

#[test]
fn missing_tiles_are_io_errors() {
    let dir = tempfile::tempdir().unwrap();
    let source = DirectorySource::new(dir.path());
    let err = AdtDocument::load(&source, "World\\Maps\\Nowhere_0_0.adt", DocumentOptions::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

/// In-memory source, as an archive reader would provide.
struct Single(Vec<u8>);

impl AssetSource for Single {
    fn read(&self, _id: &str) -> wow_adt_edit::Result<Vec<u8>> {
        Ok(self.0.clone())
    }

    fn has(&self, _id: &str) -> bool {
        true
    }
}

#[test]
fn any_source_can_serve_tiles() {
    let bytes = populated().write().unwrap();
    let source: Box<dyn AssetSource> = Box::new(Single(bytes.clone()));
    let doc = AdtDocument::load(source.as_ref(), "tile.adt", DocumentOptions::default()).unwrap();
    assert_eq!(doc.write().unwrap(), bytes);
}
