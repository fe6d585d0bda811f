use clap::{ArgAction, Args, Parser, Subcommand};
use inpxer_indexer::Options;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "inpxer", version, about)]
pub struct Cli {
    /// Configuration file (toml, yaml or json). Defaults to ./inpxer.toml,
    /// then inpxer.toml in the user configuration directory.
    #[arg(long, short, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// More log output: -v for debug, -vv for trace. RUST_LOG takes precedence.
    #[arg(long, short, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import an INPX archive into the index.
    Import(ImportArgs),
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Index deleted records too.
    #[arg(long)]
    pub keep_deleted: bool,
    /// Update the existing index in place instead of rebuilding it.
    #[arg(long)]
    pub partial: bool,
    /// Path to the .inpx archive.
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,
}

impl ImportArgs {
    pub fn options(&self) -> Options {
        Options {
            keep_deleted: self.keep_deleted,
            partial: self.partial,
        }
    }
}

impl Cli {
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
