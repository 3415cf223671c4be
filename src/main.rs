use anyhow::Result;
use clap::Parser;

mod cli;
mod config;
mod dictionary;
mod generate;
mod heuristics;
mod history;
mod ledger;
mod passes;
mod paths;
mod pipeline;
mod record;
mod response;
mod util;
mod validate;
mod workflow;

use cli::{Command, RootArgs};
use workflow::DataContext;

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    let ctx = DataContext::load(&args.data_dir, args.config.as_deref())?;
    match &args.command {
        Command::Ingest(ingest) => workflow::run_ingest(&ctx, ingest),
        Command::Fill => workflow::run_fill(&ctx),
        Command::Enrich(enrich) => workflow::run_enrich(&ctx, enrich),
        Command::Status(status) => workflow::run_status(&ctx, status),
        Command::Reset(reset) => workflow::run_reset(&ctx, reset),
    }
}

/// Logs go to stderr so stdout stays the progress and report stream.
fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match verbose {
        0 => "vocab=info",
        1 => "vocab=debug",
        _ => "vocab=trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
