use crate::types::config::{DocstringCurve, FormattingCurve};
use crate::types::entity::{walk_forest, DocumentableEntity};
use crate::types::index::IndexNode;
use crate::types::scoring::CoverageSummary;

pub const DOCSTRINGS_LABEL: &str = "docstrings";
pub const FORMATTED_LABEL: &str = "formatted_docstrings";

/// Count eligible, documented and formatted entities. Ineligible entities are
/// skipped but their children are still visited.
pub fn summarize(forest: &[DocumentableEntity], doctests: usize) -> CoverageSummary {
    let mut summary = CoverageSummary {
        doctests,
        ..CoverageSummary::default()
    };
    for entity in walk_forest(forest).filter(|entity| entity.eligible) {
        summary.eligible += 1;
        if !entity.has_documentation {
            continue;
        }
        summary.documented += 1;
        if let Some(style) = entity.markup_style {
            summary.formatted += 1;
            *summary.by_style.entry(style).or_insert(0) += 1;
        }
    }
    summary
}

/// Linear curve: `ceil(documented * max / eligible)`.
pub fn docstring_points(summary: &CoverageSummary, curve: &DocstringCurve) -> i64 {
    if summary.eligible == 0 {
        return 0;
    }
    let documented = summary.documented as i128;
    let eligible = summary.eligible as i128;
    let points = (documented * i128::from(curve.max_points) + eligible - 1) / eligible;
    // documented <= eligible keeps the result within max_points
    i64::try_from(points).unwrap_or(curve.max_points)
}

/// Banded curve: points of the highest band the formatted ratio reaches.
pub fn formatting_points(summary: &CoverageSummary, curve: &FormattingCurve) -> i64 {
    if summary.eligible == 0 {
        return 0;
    }
    curve
        .band_for(summary.formatted_ratio())
        .map(|band| band.points)
        .unwrap_or(0)
}

fn percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

pub fn docstrings_leaf(
    summary: &CoverageSummary,
    curve: &DocstringCurve,
    nothing_parsed: bool,
) -> IndexNode {
    let justification = if nothing_parsed {
        "no module could be parsed".to_string()
    } else {
        format!(
            "found {}/{}={} objects with docstrings",
            summary.documented,
            summary.eligible,
            percent(summary.documented_ratio())
        )
    };
    IndexNode::leaf(
        DOCSTRINGS_LABEL,
        docstring_points(summary, curve),
        curve.max_points,
        justification,
    )
}

pub fn formatted_docstrings_leaf(
    summary: &CoverageSummary,
    curve: &FormattingCurve,
    nothing_parsed: bool,
) -> IndexNode {
    let ratio = summary.formatted_ratio();
    let points = formatting_points(summary, curve);

    let info = match curve.band_for(ratio).filter(|_| summary.eligible > 0) {
        Some(band) => format!(
            "{} formatted docstrings found, which is >= {} and is worth {}p.",
            percent(ratio),
            percent(band.threshold),
            band.points
        ),
        None => {
            let lowest = curve
                .bands
                .iter()
                .map(|band| band.threshold)
                .fold(f64::INFINITY, f64::min);
            if lowest.is_finite() {
                format!(
                    "{} formatted docstrings found, which is < {}, no points given.",
                    percent(ratio),
                    percent(lowest)
                )
            } else {
                format!("{} formatted docstrings found, no bands configured.", percent(ratio))
            }
        }
    };
    let mut info = vec![info];
    for (style, count) in &summary.by_style {
        info.push(format!("{count} docstrings use {style}"));
    }

    let justification = if nothing_parsed {
        "no module could be parsed".to_string()
    } else {
        format!(
            "found {}/{}={} objects with formatted docstrings",
            summary.formatted,
            summary.eligible,
            percent(ratio)
        )
    };
    IndexNode::leaf(FORMATTED_LABEL, points, curve.max_points(), justification).with_info(info)
}
