//! Leaves computed outside the engine: caller-supplied scores plus the lint
//! rating and style-check counts.

use crate::error::{KwaliteeError, Result};
use crate::types::config::WeightTable;
use crate::types::index::{Category, ExternalScore, IndexNode};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

pub const LINT_LABEL: &str = "lint";
pub const STYLE_LABEL: &str = "style";

/// `CATEGORY/LABEL=RAW/MAX[:JUSTIFICATION]`
impl FromStr for ExternalScore {
    type Err = KwaliteeError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| {
            KwaliteeError::InvalidScore(format!(
                "{s:?}: {reason} (expected CATEGORY/LABEL=RAW/MAX[:JUSTIFICATION])"
            ))
        };

        let (target, value) = s.split_once('=').ok_or_else(|| invalid("missing '='"))?;
        let (category, label) = target
            .split_once('/')
            .ok_or_else(|| invalid("missing '/' between category and label"))?;
        let category = Category::from_str(category).map_err(|e| invalid(&e))?;
        let label = label.trim();
        if label.is_empty() {
            return Err(invalid("empty label"));
        }

        let (points, justification) = match value.split_once(':') {
            Some((points, justification)) => (points, justification.trim()),
            None => (value, ""),
        };
        let (raw, max) = points
            .split_once('/')
            .ok_or_else(|| invalid("missing '/' between raw and max value"))?;
        let raw_value = raw
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid("raw value is not an integer"))?;
        let max_value = max
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid("max value is not an integer"))?;

        Ok(ExternalScore {
            category,
            label: label.to_string(),
            raw_value,
            max_value,
            justification: justification.to_string(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct ScoresFile {
    #[serde(default)]
    score: Vec<ExternalScore>,
}

/// Read `[[score]]` tables from a TOML file.
pub fn load_scores(path: &Path) -> Result<Vec<ExternalScore>> {
    let content = std::fs::read_to_string(path)?;
    let file: ScoresFile = toml::from_str(&content)
        .map_err(|e| KwaliteeError::InvalidScore(format!("{}: {}", path.display(), e)))?;
    Ok(file.score)
}

pub fn validate(score: &ExternalScore) -> Result<()> {
    let name = format!("{}/{}", score.category, score.label);
    if score.max_value < 0 {
        return Err(KwaliteeError::InvalidScore(format!(
            "{name}: max value must not be negative"
        )));
    }
    if score.max_value == 0 && score.raw_value > 0 {
        return Err(KwaliteeError::InvalidScore(format!(
            "{name}: a penalty (max 0) cannot award {} points",
            score.raw_value
        )));
    }
    if score.raw_value > score.max_value {
        return Err(KwaliteeError::InvalidScore(format!(
            "{name}: raw value {} exceeds max value {}",
            score.raw_value, score.max_value
        )));
    }
    Ok(())
}

fn ceil_div(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    if numerator % denominator > 0 {
        quotient + 1
    } else {
        quotient
    }
}

/// Rescale a score to the weight configured for its label, keeping its ratio.
pub fn rescale(mut score: ExternalScore, weights: &BTreeMap<String, i64>) -> Result<ExternalScore> {
    let Some(&weight) = weights.get(&score.label) else {
        return Ok(score);
    };
    if score.max_value > 0 {
        let scaled = ceil_div(
            i128::from(score.raw_value) * i128::from(weight),
            i128::from(score.max_value),
        );
        score.raw_value = i64::try_from(scaled).map_err(|_| {
            KwaliteeError::InvalidScore(format!(
                "{}/{}: {} rescaled to weight {weight} is out of range",
                score.category, score.label, score.raw_value
            ))
        })?;
        score.max_value = weight;
    } else if weight == 0 {
        score.raw_value = 0;
    }
    Ok(score)
}

pub fn to_leaf(score: &ExternalScore) -> IndexNode {
    IndexNode::leaf(
        score.label.clone(),
        score.raw_value,
        score.max_value,
        score.justification.clone(),
    )
}

/// Lint rating on a 0-10 scale, scaled to `weights.lint`. Ratings below zero
/// score nothing.
pub fn lint_leaf(rating: f64, weights: &WeightTable) -> Result<IndexNode> {
    if !rating.is_finite() || rating > 10.0 {
        return Err(KwaliteeError::InvalidScore(format!(
            "lint rating must be a number up to 10 (found {rating})"
        )));
    }
    let value = ((rating / 10.0) * weights.lint as f64).ceil().max(0.0) as i64;
    Ok(IndexNode::leaf(
        LINT_LABEL,
        value,
        weights.lint,
        format!("lint rating {rating:.2}/10"),
    )
    .with_info(vec![format!(
        "Score is {rating:.2}/10, which is {}% of maximum {} points = {value}.",
        (rating * 10.0) as i64,
        weights.lint
    )]))
}

/// Style-check result: full points minus a fixed amount per error type and
/// per warning type found.
pub fn style_leaf(error_types: u32, warning_types: u32, weights: &WeightTable) -> Result<IndexNode> {
    let out_of_range = || {
        KwaliteeError::InvalidScore(format!(
            "style score for {error_types} error types and {warning_types} warning types is out of range"
        ))
    };
    let error_score = weights
        .style_error
        .checked_mul(i64::from(error_types))
        .ok_or_else(out_of_range)?;
    let warning_score = weights
        .style_warning
        .checked_mul(i64::from(warning_types))
        .ok_or_else(out_of_range)?;
    let deducted = error_score
        .checked_add(warning_score)
        .ok_or_else(out_of_range)?;
    let value = weights.style.checked_add(deducted).ok_or_else(out_of_range)?;
    Ok(IndexNode::leaf(
        STYLE_LABEL,
        value,
        weights.style,
        format!("style check: {error_types} error types, {warning_types} warning types"),
    )
    .with_info(vec![
        format!(
            "found {error_types} error types; scoring {} per error type",
            weights.style_error
        ),
        format!("Error score: {error_score}"),
        format!(
            "found {warning_types} warning types; scoring {} per warning type",
            weights.style_warning
        ),
        format!("Warning score: {warning_score}"),
        format!(
            "Total style score: {} - {} = {value}",
            weights.style,
            deducted.unsigned_abs()
        ),
    ]))
}
