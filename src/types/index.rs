use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupMode {
    SumAll,
    PickBestOf,
}

/// One node of the score tree.
///
/// Leaves carry their measured `raw_value`/`max_value`; internal nodes get
/// theirs from `analyze::aggregate`. A penalty leaf has `max_value == 0` and a
/// non-positive `raw_value`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexNode {
    pub label: String,
    pub raw_value: i64,
    pub max_value: i64,
    pub relative: i64,
    pub group_mode: GroupMode,
    pub justification: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub info: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chosen: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<IndexNode>,
}

impl IndexNode {
    pub fn leaf(
        label: impl Into<String>,
        raw_value: i64,
        max_value: i64,
        justification: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            raw_value,
            max_value,
            relative: 0,
            group_mode: GroupMode::SumAll,
            justification: justification.into(),
            info: Vec::new(),
            chosen: None,
            children: Vec::new(),
        }
    }

    pub fn penalty(label: impl Into<String>, raw_value: i64, justification: impl Into<String>) -> Self {
        Self::leaf(label, raw_value, 0, justification)
    }

    pub fn group(label: impl Into<String>, group_mode: GroupMode, children: Vec<IndexNode>) -> Self {
        Self {
            group_mode,
            children,
            ..Self::leaf(label, 0, 0, "")
        }
    }

    pub fn with_info(mut self, info: Vec<String>) -> Self {
        self.info = info;
        self
    }

    pub fn with_justification(mut self, justification: impl Into<String>) -> Self {
        self.justification = justification.into();
        self
    }

    pub fn child(&self, label: &str) -> Option<&IndexNode> {
        self.children.iter().find(|child| child.label == label)
    }

    /// Resolve a `/`-separated label path below this node.
    pub fn find(&self, path: &str) -> Option<&IndexNode> {
        path.split('/')
            .try_fold(self, |node, label| node.child(label))
    }
}

/// Top-level score categories below the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Installability,
    Documentation,
    CodeKwalitee,
}

impl Category {
    pub const ALL: [Category; 3] = [Self::Installability, Self::Documentation, Self::CodeKwalitee];

    pub fn label(self) -> &'static str {
        match self {
            Self::Installability => "INSTALLABILITY",
            Self::Documentation => "DOCUMENTATION",
            Self::CodeKwalitee => "CODE KWALITEE",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Installability => "installability",
            Self::Documentation => "documentation",
            Self::CodeKwalitee => "code_kwalitee",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        Category::ALL
            .into_iter()
            .find(|category| category.key() == normalized)
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

/// A leaf computed outside the engine (download, install, lint runs, ...).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExternalScore {
    pub category: Category,
    pub label: String,
    pub raw_value: i64,
    pub max_value: i64,
    #[serde(default)]
    pub justification: String,
}
