//! `info`: summary of a tile

use anyhow::Result;
use wow_adt_edit::{DocumentOptions, OffsetSite};

use crate::utils::{add_table_row, create_table, format_bytes};

pub fn execute(file: &str, detailed: bool, options: DocumentOptions) -> Result<()> {
    let doc = super::load(file, options)?;

    println!("ADT File Information");
    println!("====================");
    println!();
    println!("File: {file}");
    println!("Version: {}", doc.version());
    println!(
        "Size: {} ({} bytes)",
        format_bytes(doc.encoded_len()),
        doc.encoded_len()
    );
    println!("Header flags: {:#x}", doc.header_flags());

    let cells = doc.cells();
    let layers: usize = cells.iter().map(|cell| cell.layers().len()).sum();
    let masks = cells
        .iter()
        .flat_map(|cell| cell.layers())
        .filter(|layer| layer.alpha_map().is_some())
        .count();
    let painted = cells.iter().filter(|cell| !cell.layers().is_empty()).count();

    println!();
    println!("Terrain:");
    println!("  Cells: {}/256 ({painted} textured)", cells.len());
    println!("  Layers: {layers} ({masks} alpha maps)");

    println!();
    println!("Filenames:");
    println!("  Textures: {}", doc.textures().len());
    println!("  Models: {}", doc.model_count());
    println!("  WMOs: {}", doc.object_count());

    println!();
    println!("Placements:");
    println!("  Doodads (MDDF): {}", doc.doodads().len());
    println!("  WMOs (MODF): {}", doc.wmos().len());

    if doc.flight_bounds().is_some() {
        println!("  Flight bounds (MFBO): present");
    }
    if let Some(liquids) = doc.liquids() {
        println!("  Water (MH2O): {}", format_bytes(liquids.len() as u64));
    }

    if detailed {
        let mut table = create_table(vec!["Field", "Target"]);
        for (site, address) in doc.offset_sites() {
            let name = match site {
                OffsetSite::Header(slot) => format!("MHDR {slot:?}"),
                OffsetSite::CellIndex(index) => format!("MCIN {index}"),
                OffsetSite::ModelName(index) => format!("MMID {index}"),
                OffsetSite::ObjectName(index) => format!("MWID {index}"),
                OffsetSite::CellField { cell, field } => format!("MCNK {cell} {field:?}"),
                OffsetSite::LayerMask { cell, layer } => format!("MCLY {cell} layer {layer}"),
            };
            add_table_row(&mut table, vec![name, format!("{address:#x}")]);
        }
        println!();
        println!("Offsets:");
        table.printstd();
    }

    Ok(())
}
