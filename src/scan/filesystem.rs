use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Module,
    Test,
    Demo,
    Special,
    Pyc,
    Pyo,
    Other,
}

const SPECIAL_FILES: [&str; 3] = ["setup.py", "ez_setup.py", "__pkginfo__.py"];
const TEST_DIRS: [&str; 2] = ["test", "tests"];
const DEMO_DIRS: [&str; 5] = ["doc", "docs", "demo", "example", "examples"];

/// Files and directories below `root`, relative to it, in lexical order.
#[derive(Debug, Clone, Default)]
pub struct TreeListing {
    pub files: Vec<PathBuf>,
    pub dirs: Vec<PathBuf>,
}

pub fn list_tree(root: &Path) -> TreeListing {
    let mut listing = TreeListing::default();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
    {
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        if entry.file_type().is_dir() {
            listing.dirs.push(relative.to_path_buf());
        } else if entry.file_type().is_file() {
            listing.files.push(relative.to_path_buf());
        }
    }
    listing
}

/// True for zero-length files and directories without entries.
pub fn is_empty(path: &Path) -> bool {
    if path.is_file() {
        return std::fs::metadata(path)
            .map(|metadata| metadata.len() == 0)
            .unwrap_or(true);
    }
    if path.is_dir() {
        return std::fs::read_dir(path)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(true);
    }
    false
}

fn has_extension(name: &str, ext: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

/// Classify a path by its file name and the names of its parent directories.
/// The filesystem is never touched.
pub fn classify(relative: &Path) -> FileKind {
    let name = relative
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or_default();

    if SPECIAL_FILES.contains(&name) {
        return FileKind::Special;
    }
    if has_extension(name, "pyc") {
        return FileKind::Pyc;
    }
    if has_extension(name, "pyo") {
        return FileKind::Pyo;
    }
    if !has_extension(name, "py") {
        return FileKind::Other;
    }

    let parents = relative
        .parent()
        .map(|parent| {
            parent
                .components()
                .filter_map(|component| component.as_os_str().to_str())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    for dir in parents {
        if TEST_DIRS.contains(&dir) {
            return FileKind::Test;
        }
        if DEMO_DIRS.contains(&dir) {
            return FileKind::Demo;
        }
    }

    let stem = Path::new(name)
        .file_stem()
        .and_then(|value| value.to_str())
        .unwrap_or_default()
        .to_lowercase();
    if stem.starts_with("test_") || stem.ends_with("_test") {
        return FileKind::Test;
    }
    FileKind::Module
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn classify_follows_name_and_directory_rules() {
        let cases = [
            ("module.py", FileKind::Module),
            ("./setup.py", FileKind::Special),
            ("some/directory/junk.pyc", FileKind::Pyc),
            ("optimized.pyo", FileKind::Pyo),
            ("examples/readme.txt", FileKind::Other),
            ("examples/runthis.py", FileKind::Demo),
            ("ut/test_this_and_that.py", FileKind::Test),
            ("another_test.py", FileKind::Test),
            ("TEST_MY_MODULE.PY", FileKind::Test),
            ("tests/helpers.py", FileKind::Test),
            ("this_is_not_a_test_really.py", FileKind::Module),
        ];
        for (path, expected) in cases {
            assert_eq!(classify(Path::new(path)), expected, "{path}");
        }
    }

    #[test]
    fn list_tree_is_relative_and_sorted() {
        let dir = TempDir::new().expect("temp dir should be created");
        fs::create_dir_all(dir.path().join("pkg/sub")).expect("pkg dirs should create");
        fs::write(dir.path().join("pkg/b.py"), "x = 1").expect("b should write");
        fs::write(dir.path().join("pkg/a.py"), "x = 1").expect("a should write");
        fs::write(dir.path().join("README"), "hello").expect("readme should write");

        let listing = list_tree(dir.path());
        assert_eq!(
            listing.files,
            vec![
                PathBuf::from("README"),
                PathBuf::from("pkg/a.py"),
                PathBuf::from("pkg/b.py"),
            ]
        );
        assert_eq!(
            listing.dirs,
            vec![PathBuf::from("pkg"), PathBuf::from("pkg/sub")]
        );
    }

    #[test]
    fn is_empty_detects_blank_files_and_dirs() {
        let dir = TempDir::new().expect("temp dir should be created");
        fs::write(dir.path().join("empty"), "").expect("empty file should write");
        fs::write(dir.path().join("full"), "x").expect("file should write");
        fs::create_dir_all(dir.path().join("hollow")).expect("dir should create");

        assert!(is_empty(&dir.path().join("empty")));
        assert!(!is_empty(&dir.path().join("full")));
        assert!(is_empty(&dir.path().join("hollow")));
        assert!(!is_empty(dir.path()));
    }
}
