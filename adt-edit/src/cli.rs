//! Root CLI structure for adt-edit

use clap::{Parser, Subcommand};
use wow_adt_edit::{AdtVersion, DocumentOptions};

#[derive(Parser)]
#[command(name = "adt-edit")]
#[command(about = "Inspect and edit World of Warcraft ADT terrain tiles", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Interpret the tile as this version instead of detecting it
    /// (vanilla, tbc, wotlk, cataclysm, mop)
    #[arg(long, global = true, value_parser = parse_version)]
    pub as_version: Option<AdtVersion>,

    /// Alpha maps are 4-bit (the map's WDT lacks the big alpha flag)
    #[arg(long, global = true)]
    pub low_res_alpha: bool,
}

impl Cli {
    /// Read options from the global flags.
    pub fn document_options(&self) -> DocumentOptions {
        let options = DocumentOptions::default().with_high_res_alpha(!self.low_res_alpha);
        match self.as_version {
            Some(version) => options.with_version(version),
            None => options,
        }
    }
}

fn parse_version(value: &str) -> Result<AdtVersion, String> {
    AdtVersion::parse(value).ok_or_else(|| {
        format!("unknown version '{value}', expected one of: vanilla, tbc, wotlk, cataclysm, mop")
    })
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show information about an ADT file
    Info {
        /// Path to the ADT file
        file: String,

        /// List every tracked offset field
        #[arg(short, long)]
        detailed: bool,
    },

    /// Read and write a tile, recomputing every offset and size
    Rewrite {
        /// Input ADT file
        input: String,

        /// Output file (defaults to rewriting the input in place)
        #[arg(short, long)]
        output: Option<String>,

        /// Drop transparent layers and unused filenames before writing
        #[arg(long)]
        optimize: bool,
    },

    /// Texture filename operations
    Textures {
        #[command(subcommand)]
        command: crate::commands::textures::TextureCommands,
    },

    /// Show the texture layers of one cell
    Layers {
        /// Path to the ADT file
        file: String,

        /// Cell row (0-15)
        row: usize,

        /// Cell column (0-15)
        col: usize,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
