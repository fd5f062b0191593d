use crate::blast::Report;
use crate::report::ReportOptions;
use anyhow::Result;
use serde_json::json;

pub fn generate_json_report(report: &Report, options: &ReportOptions) -> Result<String> {
    let queries: Vec<_> = report
        .queries
        .iter()
        .map(|query| -> Result<serde_json::Value> {
            let hits: Vec<_> = query
                .hits
                .iter()
                .map(|hit| -> Result<serde_json::Value> {
                    let mut value = serde_json::to_value(hit)?;
                    value["evalue"] = json!(hit.evalue());
                    value["score"] = json!(hit.score());
                    if !options.include_details {
                        if let Some(object) = value.as_object_mut() {
                            object.remove("hsps");
                        }
                    }
                    Ok(value)
                })
                .collect::<Result<_>>()?;

            Ok(json!({
                "number": query.number,
                "id": query.id,
                "meta": query.meta,
                "length": query.length,
                "stats": query.stats,
                "hits": hits,
            }))
        })
        .collect::<Result<_>>()?;

    let output = json!({
        "program": report.program,
        "version": report.version,
        "databases": report.databases,
        "parameters": report.parameters,
        "queries": queries,
    });

    Ok(serde_json::to_string_pretty(&output)?)
}
