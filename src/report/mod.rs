use crate::blast::Report;
use anyhow::Result;

pub mod json;
pub mod text;

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub format: Format,
    /// List every HSP under its hit
    pub include_details: bool,
    /// Hits shown per query (0 = all)
    pub max_hits: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Text,
    Json,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            format: Format::Text,
            include_details: false,
            max_hits: 10,
        }
    }
}

pub struct ReportGenerator {
    options: ReportOptions,
}

impl ReportGenerator {
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    pub fn generate(&self, report: &Report) -> Result<String> {
        match self.options.format {
            Format::Text => text::generate_text_report(report, &self.options),
            Format::Json => json::generate_json_report(report, &self.options),
        }
    }
}
