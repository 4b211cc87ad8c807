use crate::scan::filesystem::{is_empty, FileKind};
use crate::scan::SourceModel;
use crate::types::config::{FileRule, RequiredConfig, WeightTable};
use crate::types::index::{GroupMode, IndexNode};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub const REQUIRED_FILES_LABEL: &str = "required_files";
pub const SETUP_PY_LABEL: &str = "setup.py";
pub const GENERATED_FILES_LABEL: &str = "generated_files";

fn basenames(root: &Path, paths: &[PathBuf]) -> BTreeSet<String> {
    paths
        .iter()
        .filter(|path| !is_empty(&root.join(path)))
        .filter_map(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect()
}

fn case_variants(name: &str) -> [String; 3] {
    let lower = name.to_lowercase();
    let mut chars = lower.chars();
    let capitalized = chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default();
    [lower, name.to_uppercase(), capitalized]
}

fn name_matches(candidate: &str, rule_name: &str, extensions: &[String]) -> bool {
    case_variants(rule_name).iter().any(|stem| {
        candidate == stem
            || extensions.iter().any(|ext| {
                candidate
                    .strip_prefix(stem.as_str())
                    .and_then(|rest| rest.strip_prefix('.'))
                    .map(|rest| rest.eq_ignore_ascii_case(ext))
                    .unwrap_or(false)
            })
    })
}

fn importance(points: i64) -> &'static str {
    match points {
        30 => " critical",
        20 => " important",
        _ => "",
    }
}

/// One pick-best-of group per rule. Returns the group and whether any
/// alternative was present.
fn rule_group(
    rule: &FileRule,
    present: &BTreeSet<String>,
    extensions: &[String],
) -> (IndexNode, bool) {
    let mut found = false;
    let alternatives = rule
        .names
        .iter()
        .map(|name| {
            let hit = present
                .iter()
                .find(|candidate| name_matches(candidate, name, extensions));
            if let Some(hit) = hit {
                tracing::debug!(rule = %rule.display_name(), file = %hit, "required entry found");
                found = true;
                IndexNode::leaf(name.clone(), rule.points, rule.points, format!("{hit} found"))
            } else {
                IndexNode::leaf(name.clone(), 0, rule.points, "not found")
            }
        })
        .collect();
    (
        IndexNode::group(rule.display_name(), GroupMode::PickBestOf, alternatives),
        found,
    )
}

/// Presence of well-known documentation files and directories.
pub fn required_files(model: &SourceModel, config: &RequiredConfig) -> IndexNode {
    let files = basenames(&model.root, &model.files);
    let dirs = basenames(&model.root, &model.dirs);

    let mut groups = Vec::new();
    let mut info = Vec::new();
    let mut counts = [0usize; 2];

    for (slot, (what, rules, present, extensions)) in [
        ("file", &config.files, &files, config.extensions.as_slice()),
        ("directory", &config.dirs, &dirs, &[][..]),
    ]
    .into_iter()
    .enumerate()
    {
        for rule in rules {
            let (group, found) = rule_group(rule, present, extensions);
            let verb = if found { "has" } else { "doesn't have" };
            info.push(format!(
                "Package {verb}{} {what}: {}.",
                importance(rule.points),
                rule.display_name()
            ));
            if found {
                counts[slot] += 1;
            }
            groups.push(group);
        }
    }

    IndexNode::group(REQUIRED_FILES_LABEL, GroupMode::SumAll, groups)
        .with_justification(format!(
            "{} files and {} required directories found",
            counts[0], counts[1]
        ))
        .with_info(info)
}

pub fn setup_py(model: &SourceModel, weights: &WeightTable) -> IndexNode {
    let found = model
        .files
        .iter()
        .filter(|path| path.file_name().and_then(|name| name.to_str()) == Some(SETUP_PY_LABEL))
        .any(|path| !is_empty(&model.root.join(path)));
    if found {
        IndexNode::leaf(SETUP_PY_LABEL, weights.setup_py, weights.setup_py, "setup.py found")
    } else {
        IndexNode::leaf(SETUP_PY_LABEL, 0, weights.setup_py, "setup.py not found")
    }
}

/// Penalty for compiled bytecode shipped with the sources.
pub fn generated_files(model: &SourceModel, weights: &WeightTable) -> IndexNode {
    let pyc = model.files_of(FileKind::Pyc).count();
    let pyo = model.files_of(FileKind::Pyo).count();
    let value = if pyc + pyo > 0 {
        weights.generated_files_penalty
    } else {
        0
    };
    IndexNode::penalty(
        GENERATED_FILES_LABEL,
        value,
        format!("{pyc} .pyc and {pyo} .pyo files found"),
    )
}
