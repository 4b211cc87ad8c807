pub mod json;
pub mod text;

use crate::error::Result;
use crate::types::report::KwaliteeReport;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

pub fn render(report: &KwaliteeReport, format: OutputFormat, verbose: bool) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::to_text(report, verbose)),
        OutputFormat::Json => Ok(json::to_json(report)?),
    }
}
