//! Bottom-up reduction of the score tree.

use crate::error::{KwaliteeError, Result};
use crate::types::index::{GroupMode, IndexNode};

/// `round(100 * absolute / max)`, rounding half away from zero. Zero when
/// `max` is not positive. Not clamped: a negative absolute gives a negative
/// percentage. `None` when the percentage does not fit in an `i64`.
pub fn relative(absolute: i64, max_value: i64) -> Option<i64> {
    if max_value <= 0 {
        return Some(0);
    }
    let absolute = i128::from(absolute);
    let max_value = i128::from(max_value);
    let magnitude = (200 * absolute.abs() + max_value) / (2 * max_value);
    i64::try_from(if absolute < 0 { -magnitude } else { magnitude }).ok()
}

fn relative_at(node: &IndexNode, path: &str) -> Result<i64> {
    relative(node.raw_value, node.max_value).ok_or_else(|| {
        KwaliteeError::InvalidIndex(format!(
            "{path}: relative value of {}/{} is out of range",
            node.raw_value, node.max_value
        ))
    })
}

fn checked_total(mut values: impl Iterator<Item = i64>, path: &str, what: &str) -> Result<i64> {
    values
        .try_fold(0i64, i64::checked_add)
        .ok_or_else(|| KwaliteeError::InvalidIndex(format!("{path}: {what} overflows")))
}

/// Fill `raw_value`, `max_value`, `relative` and `chosen` on every internal
/// node and `relative` on every leaf. Returns the root's absolute and relative
/// values.
pub fn aggregate(root: &mut IndexNode) -> Result<(i64, i64)> {
    let path = root.label.clone();
    reduce(root, &path)?;
    Ok((root.raw_value, root.relative))
}

fn reduce(node: &mut IndexNode, path: &str) -> Result<()> {
    if node.children.is_empty() {
        if node.group_mode == GroupMode::PickBestOf {
            return Err(KwaliteeError::InvalidIndex(format!(
                "{path}: pick-best-of group has no alternatives"
            )));
        }
        validate_leaf(node, path)?;
        node.chosen = None;
        node.relative = relative_at(node, path)?;
        return Ok(());
    }

    for child in &mut node.children {
        let child_path = format!("{path}/{}", child.label);
        reduce(child, &child_path)?;
    }

    match node.group_mode {
        GroupMode::SumAll => {
            let raws = node.children.iter().map(|child| child.raw_value);
            node.raw_value = checked_total(raws, path, "sum of raw values")?;
            let maxes = node.children.iter().map(|child| child.max_value);
            node.max_value = checked_total(maxes, path, "sum of max values")?;
            node.chosen = None;
        }
        GroupMode::PickBestOf => {
            let mut best = 0;
            for (index, child) in node.children.iter().enumerate() {
                if child.raw_value > node.children[best].raw_value {
                    best = index;
                }
            }
            node.raw_value = node.children[best].raw_value;
            node.max_value = node
                .children
                .iter()
                .map(|child| child.max_value)
                .max()
                .unwrap_or(0);
            node.chosen = Some(best);
        }
    }
    node.relative = relative_at(node, path)?;
    Ok(())
}

fn validate_leaf(node: &IndexNode, path: &str) -> Result<()> {
    if node.max_value < 0 {
        return Err(KwaliteeError::InvalidIndex(format!(
            "{path}: max_value must not be negative (found {})",
            node.max_value
        )));
    }
    if node.max_value == 0 && node.raw_value > 0 {
        return Err(KwaliteeError::InvalidIndex(format!(
            "{path}: penalty leaf must not score positive points (found {})",
            node.raw_value
        )));
    }
    if node.raw_value > node.max_value {
        return Err(KwaliteeError::InvalidIndex(format!(
            "{path}: raw_value {} exceeds max_value {}",
            node.raw_value, node.max_value
        )));
    }
    Ok(())
}
