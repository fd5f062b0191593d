pub mod commands;

use crate::core::config::{default_config, load_config, Config};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "seqserver",
    version,
    about = "Parse and annotate BLAST+ search results",
    long_about = "Turns the XML and HTML output of a finished BLAST+ search into a typed \
                  per-query report and a hyperlinked results document, and retrieves hit \
                  sequences from the searched databases."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (TOML)
    #[arg(long, value_name = "FILE", global = true, env = "SEQSERVER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of threads to use (0 = all available)
    #[arg(short = 'j', long, default_value = "0", global = true)]
    pub threads: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarise one or more BLAST XML reports
    Report(commands::report::ReportArgs),

    /// Hyperlink a BLAST HTML report
    Annotate(commands::annotate::AnnotateArgs),

    /// Fetch sequences from the configured databases
    Retrieve(commands::retrieve::RetrieveArgs),
}

/// The configuration at `path`, or the defaults when no file was given.
pub fn resolve_config(path: Option<&Path>) -> crate::Result<Config> {
    match path {
        Some(path) => load_config(path),
        None => Ok(default_config()),
    }
}
