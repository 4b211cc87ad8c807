use crate::types::report::KwaliteeReport;

pub fn to_json(report: &KwaliteeReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
