//! CLI argument definitions for the idmap binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::output::OutputFormat;

/// Output format flag
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    /// Aligned tables for reading in a terminal
    Human,
    /// One JSON document per command
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Human => OutputFormat::Human,
            Format::Json => OutputFormat::Json,
        }
    }
}

/// Inspect content-addressed maps saved in an idmap store file
#[derive(Parser, Debug)]
#[command(name = "idmap")]
#[command(about = "idmap: inspect content-addressed maps in a store file")]
#[command(version)]
pub struct Cli {
    /// Store file written by `MemoryStore::save_to_file`
    #[arg(short, long, global = true, default_value = "idmap.json", env = "IDMAP_STORE")]
    pub store: PathBuf,

    /// Output format
    #[arg(short, long, global = true, default_value = "human")]
    pub format: Format,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Count the maps and values held by the store
    Info,
    /// List stored maps with their field counts
    List,
    /// Show the fields of one stored map
    Show(ShowArgs),
}

/// Arguments for the show command
#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Id of the map (40 hex characters)
    pub id: String,

    /// Read every field value from the store
    #[arg(short, long)]
    pub eval: bool,
}
