use crate::types::entity::MarkupStyle;
use serde::Serialize;
use std::collections::BTreeMap;

/// Documentation counts over the eligible entities of one forest.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageSummary {
    pub eligible: usize,
    pub documented: usize,
    pub formatted: usize,
    pub by_style: BTreeMap<MarkupStyle, usize>,
    pub doctests: usize,
}

impl CoverageSummary {
    pub fn documented_ratio(&self) -> f64 {
        ratio(self.documented, self.eligible)
    }

    pub fn formatted_ratio(&self) -> f64 {
        ratio(self.formatted, self.eligible)
    }
}

fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}
