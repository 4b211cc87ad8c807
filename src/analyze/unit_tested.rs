use crate::scan::filesystem::FileKind;
use crate::scan::SourceModel;
use crate::types::entity::{walk_forest, EntityKind};
use crate::types::index::IndexNode;
use crate::types::scoring::CoverageSummary;

pub const UNIT_TESTED_LABEL: &str = "unit_tested";

const FIXTURE_METHODS: [&str; 12] = [
    "setup",
    "setup_package",
    "setup_module",
    "setUp",
    "setUpPackage",
    "setUpModule",
    "teardown",
    "teardown_package",
    "teardown_module",
    "tearDown",
    "tearDownModule",
    "tearDownPackage",
];

const TEST_CASE_BASES: [&str; 2] = ["TestCase", "unittest.TestCase"];

/// Full points when any sign of a test suite is present.
pub fn unit_tested(model: &SourceModel, coverage: &CoverageSummary, max_points: i64) -> IndexNode {
    let mut info = Vec::new();

    if coverage.doctests > 0 {
        info.push("Package includes doctest tests.".to_string());
    }
    if walk_forest(&model.forest).any(|entity| {
        entity.kind == EntityKind::Class
            && entity
                .bases
                .iter()
                .any(|base| TEST_CASE_BASES.contains(&base.as_str()))
    }) {
        info.push("Package has tests that inherit from unittest.TestCase.".to_string());
    }
    if model.files_of(FileKind::Test).next().is_some() {
        info.push(
            "Package has filenames which probably contain tests (in format test_* or *_test)."
                .to_string(),
        );
    }
    if walk_forest(&model.forest).any(|entity| {
        entity.kind == EntityKind::Method
            && FIXTURE_METHODS
                .iter()
                .any(|fixture| entity.name.ends_with(fixture))
    }) {
        info.push(
            "Some classes have setUp/tearDown methods which are commonly used in unit tests."
                .to_string(),
        );
    }

    if info.is_empty() {
        IndexNode::leaf(UNIT_TESTED_LABEL, 0, max_points, "doesn't have unit tests")
    } else {
        IndexNode::leaf(UNIT_TESTED_LABEL, max_points, max_points, "has unit tests").with_info(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::classify::Classifier;
    use crate::scan::discover;
    use crate::types::config::KwaliteeConfig;
    use std::fs;
    use tempfile::TempDir;

    fn leaf_for(files: &[(&str, &str)]) -> IndexNode {
        let dir = TempDir::new().expect("temp dir should be created");
        for (path, content) in files {
            let full = dir.path().join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).expect("parent should create");
            }
            fs::write(full, content).expect("file should write");
        }
        let config = KwaliteeConfig::default();
        let model = discover(dir.path(), &config).expect("discover should work");
        let classifier = Classifier::new(&config.dialects).expect("classifier should build");
        let coverage = CoverageSummary {
            doctests: classifier.count_doctests(&model.forest),
            ..CoverageSummary::default()
        };
        unit_tested(&model, &coverage, 30)
    }

    #[test]
    fn untested_package_scores_zero() {
        let leaf = leaf_for(&[("pkg/core.py", "def run():\n    \"\"\"Run.\"\"\"\n")]);
        assert_eq!((leaf.raw_value, leaf.max_value), (0, 30));
        assert_eq!(leaf.justification, "doesn't have unit tests");
        assert!(leaf.info.is_empty());
    }

    #[test]
    fn each_signal_alone_earns_full_points() {
        let cases = [
            (
                "pkg/calc.py",
                "def add(a, b):\n    \"\"\"Add.\n\n    >>> add(1, 2)\n    3\n    \"\"\"\n",
                "doctest",
            ),
            (
                "pkg/checks.py",
                "import unittest\n\nclass Checks(unittest.TestCase):\n    pass\n",
                "unittest.TestCase",
            ),
            ("pkg/calc_test.py", "x = 1\n", "test_* or *_test"),
            (
                "pkg/helpers.py",
                "class WidgetTests:\n    def setUp(self):\n        pass\n",
                "setUp/tearDown",
            ),
        ];
        for (path, content, signal) in cases {
            let leaf = leaf_for(&[(path, content)]);
            assert_eq!(leaf.raw_value, 30, "{signal}");
            assert_eq!(leaf.justification, "has unit tests");
            assert!(
                leaf.info.iter().any(|line| line.contains(signal)),
                "{signal}: {:?}",
                leaf.info
            );
        }
    }
}
