use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "docstep",
    about = "Recreate the edit steps between two rich text documents",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Recreate the steps turning one document into another
    Diff(DiffArgs),
    /// Apply a JSON array of steps to a document
    Apply(ApplyArgs),
    /// Print the built-in schema
    Schema,
}

#[derive(Args)]
pub struct DiffArgs {
    /// Document JSON to start from
    pub from: PathBuf,
    /// Document JSON to end at
    pub to: PathBuf,
    /// TOML file with reconstruction options
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// One replace step per divergence
    #[arg(long)]
    pub simple: bool,
    /// Diff text by words instead of characters
    #[arg(long)]
    pub words: bool,
    /// Keep steps as recreated, without merging
    #[arg(long)]
    pub no_simplify: bool,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Document JSON
    pub doc: PathBuf,
    /// JSON array of steps
    pub steps: PathBuf,
}
