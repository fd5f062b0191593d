use crate::blast::stats::{hsp_stats, pretty_evalue};
use crate::blast::Report;
use crate::report::ReportOptions;
use anyhow::Result;
use std::fmt::Write;

pub fn generate_text_report(report: &Report, options: &ReportOptions) -> Result<String> {
    let mut output = String::new();

    // Header
    writeln!(&mut output, "{} Report", report.program.to_uppercase())?;
    writeln!(&mut output, "{}", "=".repeat(report.program.len() + 7))?;
    writeln!(&mut output)?;
    writeln!(&mut output, "Version:   {}", report.version)?;
    writeln!(&mut output, "Databases: {}", report.databases.join(", "))?;
    if let Some(expect) = report.parameters.get("expect") {
        writeln!(&mut output, "Expect:    {}", expect)?;
    }
    writeln!(&mut output, "Queries:   {}", report.queries.len())?;
    writeln!(&mut output, "Hits:      {}", report.hit_count())?;
    writeln!(&mut output)?;

    let program = report.program_kind();

    for query in &report.queries {
        writeln!(&mut output, "Query {}: {} (length: {})", query.number, query.id, query.length)?;
        if !query.meta.is_empty() {
            writeln!(&mut output, "  {}", query.meta)?;
        }

        if !query.has_hits() {
            writeln!(&mut output, "  No hits found")?;
            writeln!(&mut output)?;
            continue;
        }

        let shown = if options.max_hits == 0 {
            query.hits.len()
        } else {
            options.max_hits.min(query.hits.len())
        };

        for hit in query.hits.iter().take(shown) {
            writeln!(
                &mut output,
                "  {:<30} {:>10.1} {:>12}  {}",
                hit.id,
                hit.score(),
                format!("{:.2e}", hit.evalue()),
                hit.definition
            )?;

            if options.include_details {
                for hsp in &hit.hsps {
                    writeln!(
                        &mut output,
                        "    HSP {}: query {}-{}, subject {}-{}",
                        hsp.number, hsp.query_start, hsp.query_end, hsp.subject_start, hsp.subject_end
                    )?;
                    match program {
                        Some(program) => {
                            for (label, value) in hsp_stats(program, hsp) {
                                let value = value.replace("<sup>", "^").replace("</sup>", "");
                                writeln!(&mut output, "      {:<12} {}", label, value)?;
                            }
                        }
                        None => {
                            writeln!(&mut output, "      Expect       {}", pretty_evalue(hsp.evalue))?;
                        }
                    }
                }
            }
        }

        if query.hits.len() > shown {
            writeln!(&mut output, "  ... and {} more", query.hits.len() - shown)?;
        }

        if query.stats.is_populated() {
            let stats: Vec<String> = query
                .stats
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect();
            writeln!(&mut output, "  Statistics: {}", stats.join(" "))?;
        }
        writeln!(&mut output)?;
    }

    Ok(output)
}
