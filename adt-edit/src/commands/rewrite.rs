//! `rewrite`: read a tile and write it back

use anyhow::Result;
use log::info;
use wow_adt_edit::DocumentOptions;

use crate::utils::format_bytes;

pub fn execute(
    input: &str,
    output: Option<&str>,
    optimize: bool,
    options: DocumentOptions,
) -> Result<()> {
    let mut doc = super::load(input, options)?;
    let before = doc.encoded_len();

    if optimize {
        let report = doc.optimize()?;
        println!("Optimized: {report}");
    }

    let target = output.unwrap_or(input);
    super::save(&doc, target)?;
    info!("wrote {} bytes to {target}", doc.encoded_len());

    println!(
        "Wrote {target}: {} -> {}",
        format_bytes(before),
        format_bytes(doc.encoded_len())
    );
    Ok(())
}
