//! `textures`: list and edit the MTEX filename table

use anyhow::{Result, bail};
use clap::Subcommand;
use wow_adt_edit::DocumentOptions;

use crate::utils::{add_table_row, create_table};

#[derive(Subcommand)]
pub enum TextureCommands {
    /// List texture filenames and how many layers use each
    List {
        /// Path to the ADT file
        file: String,
    },

    /// Add texture filenames (existing names are kept once)
    Add {
        /// Path to the ADT file
        file: String,

        /// Texture paths, e.g. Tileset\Elwynn\ElwynnGrass01.blp
        #[arg(required = true)]
        names: Vec<String>,

        /// Write to this file instead of the input
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Remove a texture filename by index
    Remove {
        /// Path to the ADT file
        file: String,

        /// Texture index
        index: usize,

        /// Remove even if layers still use the texture
        #[arg(short, long)]
        force: bool,

        /// Write to this file instead of the input
        #[arg(short, long)]
        output: Option<String>,
    },
}

pub fn execute(command: TextureCommands, options: DocumentOptions) -> Result<()> {
    match command {
        TextureCommands::List { file } => execute_list(&file, options),
        TextureCommands::Add {
            file,
            names,
            output,
        } => execute_add(&file, &names, output.as_deref(), options),
        TextureCommands::Remove {
            file,
            index,
            force,
            output,
        } => execute_remove(&file, index, force, output.as_deref(), options),
    }
}

/// Number of layers using each texture.
fn usage(doc: &wow_adt_edit::AdtDocument) -> Vec<usize> {
    let mut counts = vec![0; doc.textures().len()];
    for layer in doc.cells().iter().flat_map(|cell| cell.layers()) {
        if let Some(count) = counts.get_mut(layer.texture_id() as usize) {
            *count += 1;
        }
    }
    counts
}

fn execute_list(file: &str, options: DocumentOptions) -> Result<()> {
    let doc = super::load(file, options)?;
    let counts = usage(&doc);
    let flags = doc.texture_flags();

    let mut table = create_table(vec!["Index", "Filename", "Layers", "Flags"]);
    for (index, name) in doc.textures().iter().enumerate() {
        let flag = flags
            .and_then(|flags| flags.get(index))
            .map_or_else(|| "-".to_string(), |value| format!("{value:#x}"));
        add_table_row(
            &mut table,
            vec![
                index.to_string(),
                name.into_owned(),
                counts[index].to_string(),
                flag,
            ],
        );
    }
    table.printstd();
    println!("{} textures", doc.textures().len());
    Ok(())
}

fn execute_add(
    file: &str,
    names: &[String],
    output: Option<&str>,
    options: DocumentOptions,
) -> Result<()> {
    let mut doc = super::load(file, options)?;
    for name in names {
        let before = doc.textures().len();
        let index = doc.add_texture_filename(name)?;
        if doc.textures().len() > before {
            println!("Added {name} as texture {index}");
        } else {
            println!("{name} is already texture {index}");
        }
    }
    super::save(&doc, output.unwrap_or(file))
}

fn execute_remove(
    file: &str,
    index: usize,
    force: bool,
    output: Option<&str>,
    options: DocumentOptions,
) -> Result<()> {
    let mut doc = super::load(file, options)?;
    let used = usage(&doc).get(index).copied().unwrap_or(0);
    if used > 0 && !force {
        bail!("Texture {index} is used by {used} layer(s); pass --force to remove it anyway");
    }
    let name = doc
        .textures()
        .get(index)
        .map(|name| name.into_owned())
        .unwrap_or_default();
    doc.remove_texture_filename(index)?;
    println!("Removed texture {index} ({name})");
    super::save(&doc, output.unwrap_or(file))
}
