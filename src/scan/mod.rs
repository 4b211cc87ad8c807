pub mod filesystem;
pub mod python;

use crate::error::{KwaliteeError, Result};
use crate::types::config::KwaliteeConfig;
use crate::types::entity::{DocumentableEntity, Forest};
use filesystem::{classify, list_tree, FileKind};
use python::EntityDiscoverer;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A source file that could not be read or parsed. Non-fatal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuralError {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct SourceModel {
    pub root: PathBuf,
    pub files: Vec<PathBuf>,
    pub dirs: Vec<PathBuf>,
    pub classified: Vec<(PathBuf, FileKind)>,
    pub forest: Forest,
    /// Number of files classified as modules, parsed or not.
    pub module_count: usize,
    pub structural_errors: Vec<StructuralError>,
    pub source_digest: String,
}

impl SourceModel {
    pub fn files_of(&self, kind: FileKind) -> impl Iterator<Item = &Path> {
        self.classified
            .iter()
            .filter(move |(_, file_kind)| *file_kind == kind)
            .map(|(path, _)| path.as_path())
    }

    /// True when there were modules to parse and every one of them failed.
    pub fn nothing_parsed(&self) -> bool {
        self.module_count > 0 && self.forest.is_empty()
    }
}

pub fn discover(root: &Path, config: &KwaliteeConfig) -> Result<SourceModel> {
    if !root.exists() {
        return Err(KwaliteeError::PathNotFound(root.display().to_string()));
    }
    if !root.is_dir() {
        return Err(KwaliteeError::NotADirectory(root.display().to_string()));
    }

    let listing = list_tree(root);
    let classified = listing
        .files
        .iter()
        .map(|path| (path.clone(), classify(path)))
        .collect::<Vec<_>>();

    let mut discoverer = EntityDiscoverer::new(&config.naming)?;
    let mut forest = Forest::new();
    let mut structural_errors = Vec::new();
    let mut hasher = Sha256::new();
    let mut module_count = 0;
    let mut taken = HashSet::new();

    for (relative, _) in classified.iter().filter(|(_, kind)| *kind == FileKind::Module) {
        module_count += 1;
        tracing::debug!(path = %relative.display(), "inspecting module");
        let source = match std::fs::read_to_string(root.join(relative)) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!(path = %relative.display(), error = %e, "unreadable module");
                structural_errors.push(StructuralError {
                    path: relative.clone(),
                    message: e.to_string(),
                });
                continue;
            }
        };

        let name = module_name(root, relative);
        match discoverer.discover_module(&source, &name) {
            Ok(mut module) => {
                claim_names(&mut module, &mut taken);
                hasher.update(display_path(relative).as_bytes());
                hasher.update([0]);
                hasher.update(source.as_bytes());
                hasher.update([0]);
                forest.push(module);
            }
            Err(message) => {
                tracing::warn!(path = %relative.display(), %message, "structural error");
                structural_errors.push(StructuralError {
                    path: relative.clone(),
                    message,
                });
            }
        }
    }

    tracing::info!(
        files = listing.files.len(),
        modules = forest.len(),
        errors = structural_errors.len(),
        "scan complete"
    );

    Ok(SourceModel {
        root: root.to_path_buf(),
        files: listing.files,
        dirs: listing.dirs,
        classified,
        forest,
        module_count,
        structural_errors,
        source_digest: format!("{:x}", hasher.finalize()),
    })
}

/// Suffix a module's name, and with it every name below it, until none of
/// them is already used elsewhere in the forest. `pkg.py` and
/// `pkg/__init__.py` both map to `pkg`, as do `a.b.py` and `a/b.py`.
fn claim_names(module: &mut DocumentableEntity, taken: &mut HashSet<String>) {
    let base = module.qualified_name.clone();
    let mut suffix = 0;
    while module.walk().any(|entity| taken.contains(&entity.qualified_name)) {
        suffix += 1;
        let renamed = format!("{base} {suffix}");
        tracing::debug!(module = %base, %renamed, "module name already taken");
        requalify(module, &renamed);
    }
    taken.extend(module.walk().map(|entity| entity.qualified_name.clone()));
}

fn requalify(module: &mut DocumentableEntity, renamed: &str) {
    let old = module.qualified_name.clone();
    module.walk_mut(&mut |entity| {
        let qualified = entity
            .qualified_name
            .strip_prefix(old.as_str())
            .map(|rest| format!("{renamed}{rest}"));
        if let Some(qualified) = qualified {
            entity.qualified_name = qualified;
        }
    });
}

/// `/`-separated form of a relative path, independent of platform.
pub fn display_path(relative: &Path) -> String {
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Dotted module name for a file below `root`. A package's `__init__.py` takes
/// the package name.
pub fn module_name(root: &Path, relative: &Path) -> String {
    let mut parts = relative
        .with_extension("")
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    if parts.last().map(String::as_str) == Some("__init__") {
        parts.pop();
    }
    if parts.is_empty() {
        return root
            .canonicalize()
            .ok()
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "__init__".to_string());
    }
    parts.join(".")
}
