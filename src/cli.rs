//! CLI argument parsing for the enrichment commands.
//!
//! The CLI stays thin: each command maps onto one workflow function and no
//! pass policy lives here.
use crate::config::Backend;
use crate::passes::PassKind;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "vocab",
    version,
    about = "Resumable enrichment for vocabulary datasets",
    after_help = "Examples:\n  vocab ingest --data-dir data --words data/words_raw.json\n  vocab fill --data-dir data\n  vocab enrich --data-dir data --pass examples\n  vocab enrich --data-dir data --pass passages --backend command --lm 'llm -m haiku'\n  vocab status --data-dir data --json\n  vocab reset --data-dir data --pass passage-repair",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Data directory holding the dataset, ledgers, and optional enrich.json
    #[arg(long, value_name = "DIR", global = true, default_value = ".")]
    pub data_dir: PathBuf,

    /// Config file to use instead of <DIR>/enrich.json
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Ingest(IngestArgs),
    /// Write placeholder definitions and examples where fields are empty
    Fill,
    Enrich(EnrichArgs),
    Status(StatusArgs),
    Reset(ResetArgs),
}

#[derive(Parser, Debug)]
#[command(about = "Look up new words and append them to the dataset")]
pub struct IngestArgs {
    /// JSON array of raw words
    #[arg(long, value_name = "FILE")]
    pub words: PathBuf,
}

#[derive(Parser, Debug)]
#[command(about = "Run one enrichment pass over pending records")]
pub struct EnrichArgs {
    #[arg(long, value_enum)]
    pub pass: PassKind,

    /// Resolve at most N pending records this run
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Generation backend (defaults to the config value)
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,

    /// LM command for the command backend (prompt on stdin, text on stdout)
    #[arg(long, value_name = "CMD")]
    pub lm: Option<String>,

    /// List pending records without calling the generator
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Summarize ledger and pending counts per pass")]
pub struct StatusArgs {
    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Forget one pass's progress so every record is reconsidered")]
pub struct ResetArgs {
    #[arg(long, value_enum)]
    pub pass: PassKind,
}
