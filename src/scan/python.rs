//! Entity discovery for Python sources.
//!
//! Walks a tree-sitter syntax tree and builds the module → class → method
//! forest with the docstring attached to every definition.

use crate::error::{KwaliteeError, Result};
use crate::types::config::NamingConvention;
use crate::types::entity::{DocumentableEntity, EntityKind};
use std::collections::HashMap;
use tree_sitter::{Node, Parser};

/// Statements whose bodies still belong to the enclosing scope.
const SCOPE_TRANSPARENT: [&str; 13] = [
    "block",
    "if_statement",
    "elif_clause",
    "else_clause",
    "try_statement",
    "except_clause",
    "except_group_clause",
    "finally_clause",
    "with_statement",
    "for_statement",
    "while_statement",
    "match_statement",
    "case_clause",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Module,
    Class,
}

pub struct EntityDiscoverer {
    parser: Parser,
    naming: NamingConvention,
}

impl EntityDiscoverer {
    pub fn new(naming: &NamingConvention) -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| KwaliteeError::Parser(e.to_string()))?;
        Ok(Self {
            parser,
            naming: naming.clone(),
        })
    }

    /// Parse one module. The error string describes a structural failure; the
    /// caller records it and moves on.
    pub fn discover_module(
        &mut self,
        source: &str,
        module_name: &str,
    ) -> std::result::Result<DocumentableEntity, String> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| "parser produced no syntax tree".to_string())?;
        let root = tree.root_node();
        if root.has_error() {
            let line = first_error(root)
                .map(|node| node.start_position().row + 1)
                .unwrap_or(1);
            return Err(format!("syntax error near line {line}"));
        }

        let bytes = source.as_bytes();
        let short_name = module_name.rsplit('.').next().unwrap_or(module_name);
        let mut module = DocumentableEntity::new(
            EntityKind::Module,
            short_name,
            module_name,
            1,
            docstring(root, bytes),
        );
        module.eligible = !self.naming.is_private(short_name);

        let mut seen = HashMap::new();
        self.collect(root, bytes, Scope::Module, &mut module, &mut seen);
        Ok(module)
    }

    fn collect(
        &self,
        container: Node,
        source: &[u8],
        scope: Scope,
        parent: &mut DocumentableEntity,
        seen: &mut HashMap<String, usize>,
    ) {
        let mut cursor = container.walk();
        let children = container.named_children(&mut cursor).collect::<Vec<_>>();
        for child in children {
            match child.kind() {
                "function_definition" => {
                    if let Some(entity) = self.function(child, source, scope, parent, seen) {
                        parent.children.push(entity);
                    }
                }
                "class_definition" => {
                    if let Some(entity) = self.class(child, source, parent, seen) {
                        parent.children.push(entity);
                    }
                }
                "decorated_definition" => {
                    if let Some(definition) = child.child_by_field_name("definition") {
                        let entity = match definition.kind() {
                            "function_definition" => {
                                self.function(definition, source, scope, parent, seen)
                            }
                            "class_definition" => self.class(definition, source, parent, seen),
                            _ => None,
                        };
                        if let Some(entity) = entity {
                            parent.children.push(entity);
                        }
                    }
                }
                kind if SCOPE_TRANSPARENT.contains(&kind) => {
                    self.collect(child, source, scope, parent, seen);
                }
                _ => {}
            }
        }
    }

    fn function(
        &self,
        node: Node,
        source: &[u8],
        scope: Scope,
        parent: &DocumentableEntity,
        seen: &mut HashMap<String, usize>,
    ) -> Option<DocumentableEntity> {
        let name = field_text(node, "name", source)?;
        let kind = match scope {
            Scope::Module => EntityKind::Function,
            Scope::Class => EntityKind::Method,
        };
        let body = node.child_by_field_name("body");
        let mut entity = DocumentableEntity::new(
            kind,
            name.clone(),
            unique_name(&parent.qualified_name, &name, seen),
            line_of(node),
            body.and_then(|body| docstring(body, source)),
        );
        entity.eligible = match kind {
            EntityKind::Function if self.naming.exempt_module_functions => true,
            _ => !self.naming.is_private(&name),
        };
        Some(entity)
    }

    fn class(
        &self,
        node: Node,
        source: &[u8],
        parent: &DocumentableEntity,
        seen: &mut HashMap<String, usize>,
    ) -> Option<DocumentableEntity> {
        let name = field_text(node, "name", source)?;
        let body = node.child_by_field_name("body");
        let mut entity = DocumentableEntity::new(
            EntityKind::Class,
            name.clone(),
            unique_name(&parent.qualified_name, &name, seen),
            line_of(node),
            body.and_then(|body| docstring(body, source)),
        );
        entity.eligible = !self.naming.is_private(&name);
        entity.bases = bases(node, source);

        if let Some(body) = body {
            let mut class_seen = HashMap::new();
            self.collect(body, source, Scope::Class, &mut entity, &mut class_seen);
        }
        Some(entity)
    }
}

fn unique_name(prefix: &str, name: &str, seen: &mut HashMap<String, usize>) -> String {
    let count = seen.entry(name.to_string()).or_insert(0);
    let qualified = if *count == 0 {
        format!("{prefix}.{name}")
    } else {
        tracing::debug!(name = %format!("{prefix}.{name}"), "duplicate definition");
        format!("{prefix}.{name} {count}")
    };
    *count += 1;
    qualified
}

fn line_of(node: Node) -> u32 {
    node.start_position().row as u32 + 1
}

fn field_text(node: Node, field: &str, source: &[u8]) -> Option<String> {
    node.child_by_field_name(field)?
        .utf8_text(source)
        .ok()
        .map(ToString::to_string)
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children = node.children(&mut cursor).collect::<Vec<_>>();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error)
}

fn bases(class_node: Node, source: &[u8]) -> Vec<String> {
    let Some(arguments) = class_node.child_by_field_name("superclasses") else {
        return Vec::new();
    };
    let mut cursor = arguments.walk();
    let children = arguments.named_children(&mut cursor).collect::<Vec<_>>();
    children
        .into_iter()
        .filter(|arg| matches!(arg.kind(), "identifier" | "attribute"))
        .filter_map(|arg| arg.utf8_text(source).ok().map(ToString::to_string))
        .collect()
}

/// The text of the string literal opening `body`, if its first statement is one.
fn docstring(body: Node, source: &[u8]) -> Option<String> {
    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment")?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let literal = first.named_child(0)?;
    match literal.kind() {
        "string" => literal.utf8_text(source).ok().and_then(literal_text),
        "concatenated_string" => {
            let mut parts_cursor = literal.walk();
            let parts = literal
                .named_children(&mut parts_cursor)
                .filter(|part| part.kind() == "string")
                .map(|part| part.utf8_text(source).ok().and_then(literal_text))
                .collect::<Option<Vec<_>>>()?;
            Some(parts.concat())
        }
        _ => None,
    }
}

/// Strip the prefix letters and quotes from a Python string literal. Byte
/// strings and f-strings never become docstrings.
fn literal_text(raw: &str) -> Option<String> {
    let unprefixed = raw.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    let prefix = &raw[..raw.len() - unprefixed.len()];
    if prefix.contains(['f', 'F', 'b', 'B']) {
        return None;
    }
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if unprefixed.len() >= quote.len() * 2
            && unprefixed.starts_with(quote)
            && unprefixed.ends_with(quote)
        {
            return Some(unprefixed[quote.len()..unprefixed.len() - quote.len()].to_string());
        }
    }
    Some(unprefixed.to_string())
}
