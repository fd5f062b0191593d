use crate::annotate::{resolver_from_config, LineAnnotator};
use crate::core::config::Config;
use crate::utils::url::SiteUrl;
use crate::SeqServerError;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct AnnotateArgs {
    /// HTML report written by BLAST+ with -html
    #[arg(value_name = "HTML")]
    pub input: PathBuf,

    /// Database searched (repeatable; defaults to the configured databases)
    #[arg(long = "db", value_name = "NAME")]
    pub databases: Vec<String>,

    /// Write the document here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub fn run(args: AnnotateArgs, config: &Config) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.input).map_err(SeqServerError::from)?;

    let databases = if args.databases.is_empty() {
        config.database_names()
    } else {
        args.databases
    };

    let urls = SiteUrl::new(&config.server.base_url)?;
    let resolver = resolver_from_config(urls, &config.links);
    let document = LineAnnotator::new(&resolver).annotate(&text, &databases);

    info!(
        "{} retrievable hit(s) in {}",
        document.retrievable_count(),
        args.input.display()
    );

    match args.output {
        Some(path) => std::fs::write(&path, &document.html).map_err(SeqServerError::from)?,
        None => println!("{}", document.html),
    }

    Ok(())
}
