use crate::scan::StructuralError;
use crate::types::index::IndexNode;
use crate::types::scoring::CoverageSummary;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Everything one run produced, ready to render.
#[derive(Debug, Clone, Serialize)]
pub struct KwaliteeReport {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub root: PathBuf,
    pub absolute: i64,
    pub relative: i64,
    pub max_value: i64,
    pub index: IndexNode,
    pub coverage: CoverageSummary,
    pub structural_errors: Vec<StructuralError>,
    pub source_digest: String,
}
