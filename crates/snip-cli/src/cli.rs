use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use snip_store::Backend;

#[derive(Parser)]
#[command(name = "snip", about = "snip — store and fetch snippets by id", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured backend (memory, fs)
    #[arg(long, global = true)]
    pub backend: Option<Backend>,

    /// Override the filesystem store root
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store a snippet
    Put(PutArgs),
    /// Fetch a snippet
    Get(GetArgs),
    /// Print the effective configuration
    Config,
}

#[derive(Args)]
pub struct PutArgs {
    /// Id to store under; derived from the content when omitted
    pub id: Option<String>,
    /// Read the body from a file
    #[arg(short, long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
    /// Use this text as the body
    #[arg(short, long)]
    pub data: Option<String>,
}

#[derive(Args)]
pub struct GetArgs {
    pub id: String,
    /// Write the body to a file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}
