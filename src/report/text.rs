use crate::types::entity::{DocumentableEntity, EntityKind};
use crate::types::index::IndexNode;
use crate::types::report::KwaliteeReport;
use crate::types::scoring::CoverageSummary;
use std::fmt::Write;

pub const PAD_TEXT: usize = 40;
pub const PAD_VALUE: usize = 4;

/// Label, a space, dots up to `PAD_TEXT` columns, then the value right-aligned
/// in `PAD_VALUE` columns.
pub fn pad_msg(msg: &str, value: i64) -> String {
    let dots = PAD_TEXT.saturating_sub(msg.chars().count() + 1);
    format!("{msg} {}{value:>width$}", ".".repeat(dots), width = PAD_VALUE)
}

pub fn pad_line(ch: char) -> String {
    ch.to_string().repeat(PAD_TEXT + PAD_VALUE + 1)
}

fn push_summary(out: &mut String, name: &str, absolute: i64, relative: i64, max_value: i64) {
    let _ = writeln!(out, "{}", pad_msg(&format!("{name} INDEX (ABSOLUTE)"), absolute));
    let _ = writeln!(
        out,
        "{}  ({absolute} out of a maximum of {max_value} points is {relative}%)",
        pad_msg(&format!("{name} INDEX (RELATIVE)"), relative)
    );
}

fn push_entry(out: &mut String, node: &IndexNode, verbose: bool) {
    if verbose {
        for line in &node.info {
            let _ = writeln!(out, "[{}] {line}", node.label);
        }
    }
    let _ = writeln!(
        out,
        "{}  ({})",
        pad_msg(&node.label, node.raw_value),
        node.justification
    );
}

/// The canonical dot-padded report. Categories with a zero maximum print
/// their entries without a summary.
pub fn to_text(report: &KwaliteeReport, verbose: bool) -> String {
    let mut out = String::new();
    for category in &report.index.children {
        for entry in &category.children {
            push_entry(&mut out, entry, verbose);
        }
        if category.max_value == 0 {
            continue;
        }
        let _ = writeln!(out, "{}", pad_line('-'));
        push_summary(
            &mut out,
            &category.label,
            category.raw_value,
            category.relative,
            category.max_value,
        );
        out.push('\n');
    }

    if !report.structural_errors.is_empty() {
        let _ = writeln!(
            out,
            "Skipped {} module(s) that could not be parsed:",
            report.structural_errors.len()
        );
        for error in &report.structural_errors {
            let _ = writeln!(out, "  {}: {}", error.path.display(), error.message);
        }
        out.push('\n');
    }

    let _ = writeln!(out, "{}", pad_line('='));
    push_summary(
        &mut out,
        &format!("OVERALL {}", report.index.label),
        report.absolute,
        report.relative,
        report.max_value,
    );
    out
}

pub fn summary_line(report: &KwaliteeReport) -> String {
    format!(
        "Kwalitee index: {} ({} / {})",
        report.relative, report.absolute, report.max_value
    )
}

fn push_entity(out: &mut String, entity: &DocumentableEntity, depth: usize) {
    let status = if entity.has_documentation {
        "documented"
    } else {
        "undocumented"
    };
    let style = entity
        .markup_style
        .map(|style| format!(", {style}"))
        .unwrap_or_default();
    let excluded = if entity.eligible { "" } else { " [excluded]" };
    let _ = writeln!(
        out,
        "{}{} {} (line {}): {status}{style}{excluded}",
        "  ".repeat(depth),
        entity.kind.as_str(),
        entity.qualified_name,
        entity.line
    );
    for child in &entity.children {
        push_entity(out, child, depth + 1);
    }
}

fn percent(count: usize, total: usize) -> String {
    if total == 0 {
        return "0.00%".to_string();
    }
    format!("{:.2}%", count as f64 * 100.0 / total as f64)
}

/// One line per discovered entity followed by the coverage totals.
pub fn entities_to_text(forest: &[DocumentableEntity], coverage: &CoverageSummary) -> String {
    let mut out = String::new();
    for module in forest {
        push_entity(&mut out, module, 0);
    }
    if !forest.is_empty() {
        out.push('\n');
    }

    let _ = writeln!(out, "eligible objects: {}", coverage.eligible);
    let _ = writeln!(
        out,
        "with docstrings: {} ({})",
        coverage.documented,
        percent(coverage.documented, coverage.eligible)
    );
    let _ = writeln!(
        out,
        "with formatted docstrings: {} ({})",
        coverage.formatted,
        percent(coverage.formatted, coverage.eligible)
    );
    for (style, count) in &coverage.by_style {
        let _ = writeln!(out, "  {style}: {count}");
    }
    let _ = writeln!(out, "docstrings with doctests: {}", coverage.doctests);
    out
}

/// Entity kind counts, used in the verbose log line of the docstrings command.
pub fn kind_counts(forest: &[DocumentableEntity]) -> [(EntityKind, usize); 4] {
    let mut counts = [
        (EntityKind::Module, 0),
        (EntityKind::Class, 0),
        (EntityKind::Function, 0),
        (EntityKind::Method, 0),
    ];
    for entity in crate::types::entity::walk_forest(forest) {
        if let Some(slot) = counts.iter_mut().find(|(kind, _)| *kind == entity.kind) {
            slot.1 += 1;
        }
    }
    counts
}
