//! mergedown CLI — merge many markdown documents into one artifact.
//!
//! Discovers input files, runs the transform pipeline, and writes a single
//! combined output with metadata annotations and a table of contents.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
