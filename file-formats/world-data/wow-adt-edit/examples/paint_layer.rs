//! Example: Paint a texture layer onto one cell of an ADT
//!
//! Adds the texture filename if the tile does not have it yet, appends a
//! layer to the chosen cell with a circular brush mask, and writes the result
//! next to the input. Every offset after the cell moves; the output stays
//! loadable by the client.

use std::env;
use std::path::Path;
use wow_adt_edit::{AdtDocument, AlphaGrid, CellCoord, DocumentOptions, MclyFlags};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 5 {
        eprintln!("Usage: {} <adt_file> <row> <col> <texture>", args[0]);
        eprintln!();
        eprintln!("Example:");
        eprintln!(
            "  {} Azeroth_32_48.adt 4 7 Tileset\\\\Elwynn\\\\ElwynnRock01.blp",
            args[0]
        );
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);
    let cell = CellCoord::new(args[2].parse()?, args[3].parse()?);
    let texture = &args[4];

    let mut doc = AdtDocument::from_path(path, DocumentOptions::default())?;
    println!("Loaded {} ({})", path.display(), doc.version());

    let texture_id = doc.add_texture_filename(texture)? as u32;
    // the first layer of a cell is the opaque base and takes no mask
    let mask = if doc.cell(cell)?.layers().is_empty() {
        None
    } else {
        let mut grid = AlphaGrid::default();
        for y in 0..64 {
            for x in 0..64 {
                let (dx, dy) = (x as f32 - 31.5, y as f32 - 31.5);
                let falloff = 1.0 - (dx * dx + dy * dy).sqrt() / 32.0;
                grid.set(x, y, (falloff.clamp(0.0, 1.0) * 255.0) as u8);
            }
        }
        Some(grid)
    };

    let layer = doc.add_texture_layer(cell, texture_id, MclyFlags::default(), 0, mask)?;
    println!("Cell {cell}: layer {layer} now uses texture {texture_id} ({texture})");

    let output = path.with_extension("painted.adt");
    doc.save(&output)?;
    println!("Wrote {} ({} bytes)", output.display(), doc.encoded_len());
    Ok(())
}
