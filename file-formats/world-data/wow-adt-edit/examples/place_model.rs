//! Example: Place a doodad in a new tile
//!
//! Builds a blank WotLK tile, places one model referenced from the cells it
//! overlaps, and prints where each root table ended up.

use wow_adt_edit::{AdtDocument, CellCoord, DocumentOptions, DoodadPlacement, OffsetSite};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = AdtDocument::new(DocumentOptions::default())?;

    let model = doc.add_model_filename("World\\Azeroth\\Elwynn\\PassiveDoodads\\Trees\\ElwynnTree01.m2")?;
    let mut placement = DoodadPlacement::new(model as u32, 1, [16_800.0, 120.0, 16_900.0]);
    placement.scale = 1536;
    let index = doc.add_model_instance(&[CellCoord::new(3, 4), CellCoord::new(3, 5)], placement)?;
    println!("Placed doodad {index} at scale {:.2}", doc.doodads()[index].scale_factor());

    for (site, address) in doc.offset_sites() {
        if let OffsetSite::Header(slot) = site {
            println!("  {:<6} at {address:#08x}", format!("{slot:?}"));
        }
    }

    let bytes = doc.write()?;
    println!("Tile is {} bytes", bytes.len());
    Ok(())
}
