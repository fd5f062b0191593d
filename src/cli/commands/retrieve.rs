use crate::core::config::Config;
use crate::core::database::load_databases;
use crate::SeqServerError;
use clap::Args;
use colored::*;

#[derive(Args)]
pub struct RetrieveArgs {
    /// Comma separated accessions, each optionally followed by :start-stop
    #[arg(long, value_name = "ID[,ID...]")]
    pub ids: String,

    /// Only search these databases (repeatable)
    #[arg(long = "db", value_name = "NAME")]
    pub databases: Vec<String>,
}

pub fn run(args: RetrieveArgs, config: &Config) -> anyhow::Result<()> {
    if config.databases.is_empty() {
        return Err(SeqServerError::Config("No databases configured".to_string()).into());
    }

    let (all, source) = load_databases(&config.databases)?;
    let databases = if args.databases.is_empty() {
        all
    } else {
        all.select(&args.databases)?
    };

    let result = databases.retrieve(&args.ids, &source)?;
    println!("{}", result.fasta);

    if let Some(note) = result.discrepancy() {
        eprintln!("{} {}", "Warning:".yellow().bold(), note);
    }

    Ok(())
}
