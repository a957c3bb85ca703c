//! `layers`: texture stack of one cell

use anyhow::Result;
use wow_adt_edit::{CellCoord, DocumentOptions};

use crate::utils::{add_table_row, create_table};

pub fn execute(file: &str, row: usize, col: usize, options: DocumentOptions) -> Result<()> {
    let doc = super::load(file, options)?;
    let coord = CellCoord::new(row, col);
    let cell = doc.cell(coord)?;

    println!("Cell {coord}, area {}, flags {:#x}", cell.area_id(), cell.flags().value);
    if cell.layers().is_empty() {
        println!("No texture layers");
        return Ok(());
    }

    let mut table = create_table(vec![
        "Layer", "Texture", "Filename", "Flags", "Effect", "Alpha map", "Coverage",
    ]);
    for (index, layer) in cell.layers().iter().enumerate() {
        let name = doc
            .textures()
            .get(layer.texture_id() as usize)
            .map_or_else(|| "<missing>".to_string(), |name| name.into_owned());
        let (mask, coverage) = match layer.alpha_map() {
            Some(map) => {
                let samples = map.grid().samples();
                let sum: u64 = samples.iter().map(|&s| u64::from(s)).sum();
                let coverage = sum as f64 / (samples.len() as f64 * 255.0) * 100.0;
                (
                    format!("{:?}, {} bytes", map.encoding(), map.encoded_len()),
                    format!("{coverage:.1}%"),
                )
            }
            None => ("-".to_string(), "base".to_string()),
        };
        add_table_row(
            &mut table,
            vec![
                index.to_string(),
                layer.texture_id().to_string(),
                name,
                format!("{:#x}", layer.flags().value),
                layer.effect_id().to_string(),
                mask,
                coverage,
            ],
        );
    }
    table.printstd();
    Ok(())
}
