use clap::Parser;
use colored::*;
use seqserver::cli::{resolve_config, Cli, Commands};
use seqserver::SeqServerError;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins, then SEQSERVER_LOG, then -v
    let fallback = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let log_level = std::env::var("SEQSERVER_LOG").unwrap_or_else(|_| fallback.to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);

        let exit_code = match e.downcast_ref::<SeqServerError>() {
            Some(SeqServerError::Config(_)) => 2,
            Some(SeqServerError::Io(_)) => 3,
            Some(SeqServerError::Parse(_)) | Some(SeqServerError::Schema(_)) => 4,
            Some(SeqServerError::Database(_)) => 5,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()?;
    }

    let config = resolve_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Report(args) => seqserver::cli::commands::report::run(args, &config),
        Commands::Annotate(args) => seqserver::cli::commands::annotate::run(args, &config),
        Commands::Retrieve(args) => seqserver::cli::commands::retrieve::run(args, &config),
    }
}
