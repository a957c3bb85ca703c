//! Main entry point for the adt-edit CLI

mod cli;
mod commands;
mod utils;

use anyhow::Result;
use clap::CommandFactory;
use clap::Parser;
use clap_complete::{Generator, generate};
use std::io;

use crate::cli::{Cli, Commands};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if cli.verbose > 0 {
        log::set_max_level(match cli.verbose {
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        });
    } else if cli.quiet {
        log::set_max_level(log::LevelFilter::Error);
    }

    let options = cli.document_options();
    match cli.command {
        Commands::Info { file, detailed } => commands::info::execute(&file, detailed, options),
        Commands::Rewrite {
            input,
            output,
            optimize,
        } => commands::rewrite::execute(&input, output.as_deref(), optimize, options),
        Commands::Textures { command } => commands::textures::execute(command, options),
        Commands::Layers { file, row, col } => commands::layers::execute(&file, row, col, options),
        Commands::Completions { shell } => {
            print_completions(shell, &mut Cli::command());
            Ok(())
        }
    }
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}
