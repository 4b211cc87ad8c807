pub mod aggregate;
pub mod classify;
pub mod coverage;
pub mod external;
pub mod files;
pub mod unit_tested;

use crate::error::Result;
use crate::scan::SourceModel;
use crate::types::config::KwaliteeConfig;
use crate::types::index::{Category, ExternalScore, GroupMode, IndexNode};
use crate::types::report::KwaliteeReport;
use crate::types::scoring::CoverageSummary;
use classify::Classifier;

pub const ROOT_LABEL: &str = "KWALITEE";

/// Results handed in by collaborators that run outside the engine.
#[derive(Debug, Clone, Default)]
pub struct ExternalInputs {
    pub scores: Vec<ExternalScore>,
    pub lint_rating: Option<f64>,
    /// Style-check error and warning type counts.
    pub style_counts: Option<(u32, u32)>,
}

/// Classify the forest in place and reduce it to coverage counts.
pub fn classify_and_reduce(
    model: &mut SourceModel,
    config: &KwaliteeConfig,
) -> Result<CoverageSummary> {
    let classifier = Classifier::new(&config.dialects)?;
    classifier.classify_forest(&mut model.forest);
    let doctests = classifier.count_doctests(&model.forest);
    Ok(coverage::summarize(&model.forest, doctests))
}

/// Insert external leaves into a category. A leaf whose label matches a
/// built-in one, or an earlier external one, replaces it; installability
/// leaves otherwise come first since they describe the steps run before any
/// scan.
fn merge_external(
    category: Category,
    mut builtin: Vec<IndexNode>,
    external: &[ExternalScore],
    config: &KwaliteeConfig,
) -> Result<Vec<IndexNode>> {
    let mut leading: Vec<IndexNode> = Vec::new();
    for score in external.iter().filter(|score| score.category == category) {
        external::validate(score)?;
        let leaf = external::to_leaf(&external::rescale(score.clone(), &config.external)?);
        let existing = leading
            .iter_mut()
            .chain(builtin.iter_mut())
            .find(|node| node.label == leaf.label);
        match existing {
            Some(slot) => {
                tracing::debug!(label = %leaf.label, "external score replaces earlier leaf");
                *slot = leaf;
            }
            None if category == Category::Installability => leading.push(leaf),
            None => builtin.push(leaf),
        }
    }
    leading.extend(builtin);
    Ok(leading)
}

/// Assemble the default index tree from scan results and external inputs.
pub fn build_index(
    model: &SourceModel,
    coverage: &CoverageSummary,
    inputs: &ExternalInputs,
    config: &KwaliteeConfig,
) -> Result<IndexNode> {
    let weights = &config.weights;
    let nothing_parsed = model.nothing_parsed();

    let installability = vec![
        files::setup_py(model, weights),
        files::generated_files(model, weights),
    ];

    let documentation = vec![
        files::required_files(model, &config.required),
        coverage::docstrings_leaf(coverage, &config.docstrings, nothing_parsed),
        coverage::formatted_docstrings_leaf(coverage, &config.formatting, nothing_parsed),
    ];

    let mut code_kwalitee = vec![unit_tested::unit_tested(model, coverage, weights.unit_tested)];
    if let Some(rating) = inputs.lint_rating {
        code_kwalitee.push(external::lint_leaf(rating, weights)?);
    }
    if let Some((errors, warnings)) = inputs.style_counts {
        code_kwalitee.push(external::style_leaf(errors, warnings, weights)?);
    }

    let mut categories = Vec::new();
    for (category, builtin) in [
        (Category::Installability, installability),
        (Category::Documentation, documentation),
        (Category::CodeKwalitee, code_kwalitee),
    ] {
        let children = merge_external(category, builtin, &inputs.scores, config)?;
        if !children.is_empty() {
            categories.push(IndexNode::group(category.label(), GroupMode::SumAll, children));
        }
    }

    Ok(IndexNode::group(ROOT_LABEL, GroupMode::SumAll, categories))
}

pub fn analyze(
    model: &mut SourceModel,
    inputs: &ExternalInputs,
    config: &KwaliteeConfig,
) -> Result<KwaliteeReport> {
    let coverage = classify_and_reduce(model, config)?;
    let mut index = build_index(model, &coverage, inputs, config)?;
    let (absolute, relative) = aggregate::aggregate(&mut index)?;

    for category in &index.children {
        tracing::debug!(
            category = %category.label,
            absolute = category.raw_value,
            relative = category.relative,
            "category reduced"
        );
    }
    if let Some(docstrings) = index.find(&format!(
        "{}/{}",
        Category::Documentation.label(),
        coverage::DOCSTRINGS_LABEL
    )) {
        tracing::info!(points = docstrings.raw_value, "{}", docstrings.justification);
    }
    tracing::info!(
        absolute,
        relative,
        max = index.max_value,
        "kwalitee index computed"
    );

    Ok(KwaliteeReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        generated_at: chrono::Utc::now(),
        root: model.root.clone(),
        absolute,
        relative,
        max_value: index.max_value,
        index,
        coverage,
        structural_errors: model.structural_errors.clone(),
        source_digest: model.source_digest.clone(),
    })
}
