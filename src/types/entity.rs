use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Module,
    Class,
    Function,
    Method,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Class => "class",
            Self::Function => "function",
            Self::Method => "method",
        }
    }
}

/// Documentation markup dialects recognised by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkupStyle {
    ReStructuredText,
    Epytext,
    Javadoc,
}

impl MarkupStyle {
    pub const ALL: [MarkupStyle; 3] = [Self::ReStructuredText, Self::Epytext, Self::Javadoc];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReStructuredText => "restructuredtext",
            Self::Epytext => "epytext",
            Self::Javadoc => "javadoc",
        }
    }
}

impl fmt::Display for MarkupStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A module, class, function or method found in the scanned tree.
///
/// Composite entities own their children: a module owns its top-level classes
/// and functions, a class owns its methods and nested classes. Ineligible
/// entities stay in the tree so traversal still reaches their children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentableEntity {
    pub kind: EntityKind,
    pub name: String,
    pub qualified_name: String,
    pub line: u32,
    pub has_documentation: bool,
    pub documentation_text: Option<String>,
    pub markup_style: Option<MarkupStyle>,
    pub eligible: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bases: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DocumentableEntity>,
}

impl DocumentableEntity {
    pub fn new(
        kind: EntityKind,
        name: impl Into<String>,
        qualified_name: impl Into<String>,
        line: u32,
        documentation_text: Option<String>,
    ) -> Self {
        let has_documentation = documentation_text
            .as_deref()
            .map(|text| !text.trim().is_empty())
            .unwrap_or(false);
        Self {
            kind,
            name: name.into(),
            qualified_name: qualified_name.into(),
            line,
            has_documentation,
            documentation_text,
            markup_style: None,
            eligible: true,
            bases: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Depth-first, pre-order walk over this entity and all descendants.
    pub fn walk(&self) -> EntityWalk<'_> {
        EntityWalk { stack: vec![self] }
    }

    pub fn walk_mut(&mut self, visit: &mut dyn FnMut(&mut DocumentableEntity)) {
        visit(self);
        for child in &mut self.children {
            child.walk_mut(visit);
        }
    }
}

pub struct EntityWalk<'a> {
    stack: Vec<&'a DocumentableEntity>,
}

impl<'a> Iterator for EntityWalk<'a> {
    type Item = &'a DocumentableEntity;

    fn next(&mut self) -> Option<Self::Item> {
        let entity = self.stack.pop()?;
        self.stack.extend(entity.children.iter().rev());
        Some(entity)
    }
}

/// Every module discovered in one run, in lexical path order.
pub type Forest = Vec<DocumentableEntity>;

pub fn walk_forest(forest: &[DocumentableEntity]) -> impl Iterator<Item = &DocumentableEntity> {
    forest.iter().flat_map(DocumentableEntity::walk)
}
