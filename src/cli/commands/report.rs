use crate::blast::{parse_report, Report};
use crate::core::config::Config;
use crate::report::{Format, ReportGenerator, ReportOptions};
use crate::SeqServerError;
use anyhow::Context;
use clap::Args;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Args)]
pub struct ReportArgs {
    /// BLAST XML (-outfmt 5) files
    #[arg(required = true, value_name = "XML")]
    pub inputs: Vec<PathBuf>,

    /// Database searched (repeatable; defaults to the names in the report)
    #[arg(long = "db", value_name = "NAME")]
    pub databases: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: Format,

    /// List every HSP with its statistics
    #[arg(long)]
    pub detailed: bool,

    /// Hits shown per query (0 = all)
    #[arg(long, default_value = "10")]
    pub max_hits: usize,
}

fn load(path: &Path, databases: &[String]) -> anyhow::Result<Report> {
    let xml = std::fs::read_to_string(path).map_err(SeqServerError::from)?;
    let report = parse_report(&xml, databases)
        .with_context(|| format!("Failed to read report {}", path.display()))?;
    Ok(report)
}

pub fn run(args: ReportArgs, _config: &Config) -> anyhow::Result<()> {
    let reports: Vec<Report> = args
        .inputs
        .par_iter()
        .map(|path| load(path, &args.databases))
        .collect::<anyhow::Result<_>>()?;

    let generator = ReportGenerator::new(ReportOptions {
        format: args.format,
        include_details: args.detailed,
        max_hits: args.max_hits,
    });

    for (path, report) in args.inputs.iter().zip(&reports) {
        info!(
            "{}: {} queries, {} hits",
            path.display(),
            report.queries.len(),
            report.hit_count()
        );
        print!("{}", generator.generate(report)?);
    }

    Ok(())
}
