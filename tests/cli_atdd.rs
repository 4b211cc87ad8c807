#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const MODULE1: &str = r#""""
Docstring for module1

@summary: Code used inside the discovery tests.
"""

class Class1:
    """
    Docstring for Class1

    @see how.Tests#are(performed)
    """

    def __init__(self):
        """
        Dunder methods are excluded
        """
        pass

    def __another_method__(self):
        """Excluded as well"""
        pass

    def method1(self):
        """Docstring for method1"""
        pass

    def method2(self):
        "Docstring for method2"
        pass

    def method3(self):
        """
        Docstring for method3
        """
        pass

    def method4(self):
        # No docstring
        pass

class Class2:

    """
    Docstring one line apart from Class2
    """
    pass


def func1():
    """Docstring for func1"""
    return

def func2():
    "Docstring for func2"
    return

def func3():
    """
    Docstring for func3
    """
    return

def func4():
    # No docstring
    return

def __func5__(self):
    """
    Module-level dunder functions stay eligible
    """
    return
"#;

struct Workspace {
    package: TempDir,
    home: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let package = TempDir::new().expect("package dir should be created");
        let home = TempDir::new().expect("home dir should be created");
        let root = package.path();
        fs::create_dir_all(root.join("nifty")).expect("package dir should create");
        fs::create_dir_all(root.join("tests")).expect("tests dir should create");
        fs::write(root.join("nifty/module1.py"), MODULE1).expect("module should write");
        fs::write(root.join("tests/test_module1.py"), "def test_it():\n    pass\n")
            .expect("test should write");
        fs::write(root.join("README"), "Nifty package.").expect("readme should write");
        fs::write(root.join("setup.py"), "from setuptools import setup\n")
            .expect("setup should write");
        Self { package, home }
    }

    fn root(&self) -> &Path {
        self.package.path()
    }

    fn kwalitee(&self) -> Command {
        let mut cmd = Command::cargo_bin("kwalitee").expect("binary should compile");
        cmd.env("HOME", self.home.path()).env_remove("RUST_LOG");
        cmd
    }
}

#[test]
fn score_prints_dot_padded_report() {
    let ws = Workspace::new();
    ws.kwalitee()
        .arg("score")
        .arg(ws.root())
        .assert()
        .code(0)
        .stdout(predicate::str::contains(
            "docstrings .............................  84  (found 10/12=83.33% objects with docstrings)",
        ))
        .stdout(predicate::str::contains(
            "setup.py ...............................  25  (setup.py found)",
        ))
        .stdout(predicate::str::contains("DOCUMENTATION INDEX (ABSOLUTE)"))
        .stdout(predicate::str::contains(
            "(199 out of a maximum of 405 points is 49%)",
        ));
}

#[test]
fn quiet_score_prints_summary_line_only() {
    let ws = Workspace::new();
    ws.kwalitee()
        .arg("-q")
        .arg("score")
        .arg(ws.root())
        .assert()
        .code(0)
        .stdout("Kwalitee index: 49 (199 / 405)\n");
}

#[test]
fn verbose_score_prints_info_lines() {
    let ws = Workspace::new();
    ws.kwalitee()
        .arg("-v")
        .arg("score")
        .arg(ws.root())
        .assert()
        .code(0)
        .stdout(predicate::str::contains(
            "[required_files] Package has critical file: readme.",
        ))
        .stdout(predicate::str::contains(
            "[unit_tested] Package has filenames which probably contain tests",
        ));
}

#[test]
fn json_report_carries_tree_and_coverage() {
    let ws = Workspace::new();
    let output = ws
        .kwalitee()
        .args(["score", "--format", "json"])
        .arg(ws.root())
        .output()
        .expect("score should run");
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be json");
    assert_eq!(value["absolute"], 199);
    assert_eq!(value["relative"], 49);
    assert_eq!(value["max_value"], 405);
    assert_eq!(value["coverage"]["eligible"], 12);
    assert_eq!(value["coverage"]["documented"], 10);
    assert_eq!(value["index"]["label"], "KWALITEE");
    assert_eq!(
        value["source_digest"].as_str().map(str::len),
        Some(64),
        "digest should be sha256 hex"
    );
}

#[test]
fn external_scores_and_tool_results_join_the_index() {
    let ws = Workspace::new();
    let scores = ws.home.path().join("scores.toml");
    fs::write(
        &scores,
        r#"
[[score]]
category = "installability"
label = "unpack"
raw_value = 25
max_value = 25
justification = "package unpacked"
"#,
    )
    .expect("scores should write");

    ws.kwalitee()
        .arg("score")
        .arg(ws.root())
        .arg("--scores")
        .arg(&scores)
        .args(["--score", "installability/install=50/50:package installed"])
        .args(["--lint-rating", "8", "--style-errors", "1", "--style-warnings", "1"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains(
            "unpack .................................  25  (package unpacked)",
        ))
        .stdout(predicate::str::contains(
            "install ................................  50  (package installed)",
        ))
        .stdout(predicate::str::contains(
            "lint ...................................  40  (lint rating 8.00/10)",
        ))
        .stdout(predicate::str::contains(
            "style ..................................  31  (style check: 1 error types, 1 warning types)",
        ));
}

#[test]
fn malformed_score_flag_is_a_runtime_failure() {
    let ws = Workspace::new();
    ws.kwalitee()
        .arg("score")
        .arg(ws.root())
        .args(["--score", "install=50"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("invalid score"));
}

#[test]
fn fail_under_threshold_exits_with_code_2() {
    let ws = Workspace::new();
    ws.kwalitee()
        .arg("score")
        .arg(ws.root())
        .args(["--fail-under", "90"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("below the required 90%"));
}

#[test]
fn structural_errors_exit_with_code_1() {
    let ws = Workspace::new();
    fs::write(ws.root().join("nifty/broken.py"), "def broken(:\n    pass\n")
        .expect("broken module should write");
    ws.kwalitee()
        .arg("score")
        .arg(ws.root())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("nifty/broken.py: syntax error"));
}

#[test]
fn missing_path_exits_with_code_3() {
    let ws = Workspace::new();
    ws.kwalitee()
        .arg("score")
        .arg(ws.root().join("absent"))
        .assert()
        .code(3)
        .stderr(predicate::str::contains("path does not exist"));
}

#[test]
fn invalid_repo_config_is_rejected_before_scanning() {
    let ws = Workspace::new();
    fs::write(
        ws.root().join("kwalitee.toml"),
        "[formatting]\nbands = [{ threshold = 2.0, points = 10 }]\n",
    )
    .expect("config should write");
    ws.kwalitee()
        .arg("score")
        .arg(ws.root())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("config parse error"));
}

#[test]
fn repo_config_changes_weights() {
    let ws = Workspace::new();
    fs::write(
        ws.root().join("kwalitee.toml"),
        "[weights]\nsetup_py = 40\n",
    )
    .expect("config should write");
    ws.kwalitee()
        .arg("score")
        .arg(ws.root())
        .assert()
        .code(0)
        .stdout(predicate::str::contains(
            "setup.py ...............................  40  (setup.py found)",
        ));
}

#[test]
fn docstrings_lists_entities_and_exclusions() {
    let ws = Workspace::new();
    ws.kwalitee()
        .arg("docstrings")
        .arg(ws.root())
        .assert()
        .code(0)
        .stdout(predicate::str::contains(
            "module nifty.module1 (line 1): documented, epytext",
        ))
        .stdout(predicate::str::contains(
            "    method nifty.module1.Class1.__init__ (line 14): documented [excluded]",
        ))
        .stdout(predicate::str::contains(
            "  function nifty.module1.__func5__ (line 68): documented",
        ))
        .stdout(predicate::str::contains("eligible objects: 12"))
        .stdout(predicate::str::contains("with docstrings: 10 (83.33%)"));
}

#[test]
fn quiet_docstrings_prints_totals_only() {
    let ws = Workspace::new();
    ws.kwalitee()
        .args(["-q", "docstrings"])
        .arg(ws.root())
        .assert()
        .code(0)
        .stdout(predicate::str::contains("eligible objects: 12"))
        .stdout(predicate::str::contains("Class1").not());
}
