use crate::error::KwaliteeError;
use crate::types::entity::MarkupStyle;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KwaliteeConfig {
    pub weights: WeightTable,
    pub docstrings: DocstringCurve,
    pub formatting: FormattingCurve,
    pub naming: NamingConvention,
    pub dialects: DialectConfig,
    pub required: RequiredConfig,
    /// Target weight per external leaf label; matching leaves are rescaled.
    pub external: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WeightTable {
    pub setup_py: i64,
    pub generated_files_penalty: i64,
    pub unit_tested: i64,
    pub lint: i64,
    pub style: i64,
    pub style_error: i64,
    pub style_warning: i64,
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            setup_py: 25,
            generated_files_penalty: -20,
            unit_tested: 30,
            lint: 50,
            style: 34,
            style_error: -2,
            style_warning: -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DocstringCurve {
    pub max_points: i64,
}

impl Default for DocstringCurve {
    fn default() -> Self {
        Self { max_points: 100 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Band {
    pub threshold: f64,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FormattingCurve {
    pub bands: Vec<Band>,
}

impl Default for FormattingCurve {
    fn default() -> Self {
        Self {
            bands: vec![
                Band {
                    threshold: 0.25,
                    points: 10,
                },
                Band {
                    threshold: 0.50,
                    points: 20,
                },
                Band {
                    threshold: 0.75,
                    points: 30,
                },
            ],
        }
    }
}

impl FormattingCurve {
    pub fn max_points(&self) -> i64 {
        self.bands.iter().map(|band| band.points).max().unwrap_or(0)
    }

    /// Band reached by `ratio`: the satisfied band with the highest threshold.
    pub fn band_for(&self, ratio: f64) -> Option<&Band> {
        self.bands
            .iter()
            .filter(|band| ratio >= band.threshold)
            .max_by(|a, b| a.threshold.total_cmp(&b.threshold))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NamingConvention {
    pub private_prefix: String,
    pub private_suffix: String,
    /// Module-level functions stay eligible even when they match the convention.
    pub exempt_module_functions: bool,
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self {
            private_prefix: "__".to_string(),
            private_suffix: "__".to_string(),
            exempt_module_functions: true,
        }
    }
}

impl NamingConvention {
    pub fn is_private(&self, name: &str) -> bool {
        name.len() > self.private_prefix.len() + self.private_suffix.len()
            && name.starts_with(&self.private_prefix)
            && name.ends_with(&self.private_suffix)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DialectConfig {
    pub precedence: Vec<MarkupStyle>,
    /// Extra signature patterns per dialect name, appended to the built-in ones.
    pub signatures: BTreeMap<String, Vec<String>>,
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self {
            precedence: MarkupStyle::ALL.to_vec(),
            signatures: BTreeMap::new(),
        }
    }
}

impl DialectConfig {
    pub fn extra_signatures(&self, style: MarkupStyle) -> &[String] {
        self.signatures
            .get(style.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileRule {
    pub names: Vec<String>,
    pub points: i64,
}

impl FileRule {
    fn new(names: &[&str], points: i64) -> Self {
        Self {
            names: names.iter().map(ToString::to_string).collect(),
            points,
        }
    }

    pub fn display_name(&self) -> String {
        self.names.join("/")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RequiredConfig {
    /// Optional extensions accepted after a required file name.
    pub extensions: Vec<String>,
    pub files: Vec<FileRule>,
    pub dirs: Vec<FileRule>,
}

impl Default for RequiredConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["html".to_string(), "txt".to_string(), "rst".to_string()],
            files: vec![
                FileRule::new(&["readme"], 30),
                FileRule::new(&["license", "copying"], 30),
                FileRule::new(&["announce", "changelog", "changes"], 20),
                FileRule::new(&["install"], 20),
                FileRule::new(&["authors"], 10),
                FileRule::new(&["faq"], 10),
                FileRule::new(&["news"], 10),
                FileRule::new(&["thanks"], 10),
                FileRule::new(&["todo"], 10),
            ],
            dirs: vec![
                FileRule::new(&["doc", "docs"], 30),
                FileRule::new(&["test", "tests"], 30),
                FileRule::new(&["demo", "example", "examples"], 10),
            ],
        }
    }
}

impl KwaliteeConfig {
    pub fn validate(&self) -> Result<(), KwaliteeError> {
        let weights = &self.weights;
        for (key, value) in [
            ("setup_py", weights.setup_py),
            ("unit_tested", weights.unit_tested),
            ("lint", weights.lint),
            ("style", weights.style),
        ] {
            if value < 0 {
                return Err(KwaliteeError::ConfigParse(format!(
                    "weights.{key} must not be negative (found {value})"
                )));
            }
        }
        for (key, value) in [
            ("generated_files_penalty", weights.generated_files_penalty),
            ("style_error", weights.style_error),
            ("style_warning", weights.style_warning),
        ] {
            if value > 0 {
                return Err(KwaliteeError::ConfigParse(format!(
                    "weights.{key} is a penalty and must not be positive (found {value})"
                )));
            }
        }

        if self.docstrings.max_points < 0 {
            return Err(KwaliteeError::ConfigParse(
                "docstrings.max_points must not be negative".to_string(),
            ));
        }

        for band in &self.formatting.bands {
            if !(0.0..=1.0).contains(&band.threshold) {
                return Err(KwaliteeError::ConfigParse(format!(
                    "formatting.bands threshold must be between 0.0 and 1.0 (found {})",
                    band.threshold
                )));
            }
            if band.points < 0 {
                return Err(KwaliteeError::ConfigParse(format!(
                    "formatting.bands points must not be negative (found {})",
                    band.points
                )));
            }
        }

        if self.naming.private_prefix.is_empty() || self.naming.private_suffix.is_empty() {
            return Err(KwaliteeError::ConfigParse(
                "naming.private_prefix and naming.private_suffix must be non-empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for style in &self.dialects.precedence {
            if !seen.insert(*style) {
                return Err(KwaliteeError::ConfigParse(format!(
                    "dialects.precedence lists {style} more than once"
                )));
            }
        }
        for (dialect, patterns) in &self.dialects.signatures {
            if !MarkupStyle::ALL
                .iter()
                .any(|style| style.as_str() == dialect.as_str())
            {
                return Err(KwaliteeError::ConfigParse(format!(
                    "dialects.signatures contains unknown dialect: {dialect}"
                )));
            }
            for pattern in patterns {
                regex::Regex::new(pattern).map_err(|e| {
                    KwaliteeError::ConfigParse(format!(
                        "dialects.signatures.{dialect} pattern {pattern:?} is invalid: {e}"
                    ))
                })?;
            }
        }

        for (section, rules) in [
            ("required.files", &self.required.files),
            ("required.dirs", &self.required.dirs),
        ] {
            for rule in rules {
                if rule.names.is_empty() || rule.names.iter().any(|name| name.trim().is_empty()) {
                    return Err(KwaliteeError::ConfigParse(format!(
                        "{section} entries must list non-empty names"
                    )));
                }
                if rule.points < 0 {
                    return Err(KwaliteeError::ConfigParse(format!(
                        "{section} rule {} must not have negative points",
                        rule.display_name()
                    )));
                }
            }
        }

        let negative = self
            .external
            .iter()
            .filter(|(_, weight)| **weight < 0)
            .map(|(label, _)| label.clone())
            .collect::<Vec<_>>();
        if !negative.is_empty() {
            return Err(KwaliteeError::ConfigParse(format!(
                "external weights must not be negative: {}",
                negative.join(", ")
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg: KwaliteeConfig = toml::from_str("").expect("empty config should parse");
        assert_eq!(cfg.docstrings.max_points, 100);
        assert_eq!(cfg.formatting.max_points(), 30);
        assert_eq!(cfg.weights, WeightTable::default());
        assert_eq!(cfg.dialects.precedence, MarkupStyle::ALL.to_vec());
        assert_eq!(cfg.required.files.len(), 9);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
[weights]
setup_py = 10
generated_files_penalty = -5

[docstrings]
max_points = 60

[formatting]
bands = [{ threshold = 0.5, points = 15 }]

[naming]
exempt_module_functions = false

[dialects]
precedence = ["javadoc", "epytext", "restructuredtext"]

[dialects.signatures]
epytext = ['@todo:']

[[required.files]]
names = ["readme"]
points = 40

[external]
install = 20
"#;
        let cfg: KwaliteeConfig = toml::from_str(toml_str).expect("full config should parse");
        assert_eq!(cfg.weights.setup_py, 10);
        assert_eq!(cfg.weights.unit_tested, 30);
        assert_eq!(cfg.docstrings.max_points, 60);
        assert_eq!(cfg.formatting.max_points(), 15);
        assert!(!cfg.naming.exempt_module_functions);
        assert_eq!(cfg.dialects.precedence[0], MarkupStyle::Javadoc);
        assert_eq!(
            cfg.dialects.extra_signatures(MarkupStyle::Epytext),
            &["@todo:".to_string()]
        );
        assert_eq!(cfg.required.files.len(), 1);
        assert_eq!(cfg.required.dirs.len(), 3);
        assert_eq!(cfg.external.get("install"), Some(&20));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn band_for_picks_highest_satisfied_threshold() {
        let curve = FormattingCurve::default();
        assert!(curve.band_for(0.10).is_none());
        assert_eq!(curve.band_for(0.25).map(|band| band.points), Some(10));
        assert_eq!(curve.band_for(0.74).map(|band| band.points), Some(20));
        assert_eq!(curve.band_for(1.0).map(|band| band.points), Some(30));
    }

    #[test]
    fn naming_convention_matches_dunder_names_only() {
        let naming = NamingConvention::default();
        assert!(naming.is_private("__init__"));
        assert!(naming.is_private("__another_method__"));
        assert!(!naming.is_private("_private"));
        assert!(!naming.is_private("__mangled"));
        assert!(!naming.is_private("____"));
    }

    #[test]
    fn validate_rejects_positive_penalty() {
        let cfg: KwaliteeConfig = toml::from_str(
            r#"
[weights]
generated_files_penalty = 20
"#,
        )
        .expect("config should parse");
        let err = cfg.validate().expect_err("validation should fail");
        assert!(err.to_string().contains("generated_files_penalty"));
    }

    #[test]
    fn validate_rejects_out_of_range_band() {
        let cfg: KwaliteeConfig = toml::from_str(
            r#"
[formatting]
bands = [{ threshold = 1.5, points = 10 }]
"#,
        )
        .expect("config should parse");
        let err = cfg.validate().expect_err("validation should fail");
        assert!(err.to_string().contains("between 0.0 and 1.0"));
    }

    #[test]
    fn validate_rejects_duplicate_precedence() {
        let cfg: KwaliteeConfig = toml::from_str(
            r#"
[dialects]
precedence = ["epytext", "epytext"]
"#,
        )
        .expect("config should parse");
        let err = cfg.validate().expect_err("validation should fail");
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn validate_rejects_unknown_dialect_and_bad_pattern() {
        let cfg: KwaliteeConfig = toml::from_str(
            r#"
[dialects.signatures]
markdown = ['^#']
"#,
        )
        .expect("config should parse");
        let err = cfg.validate().expect_err("validation should fail");
        assert!(err.to_string().contains("unknown dialect: markdown"));

        let cfg: KwaliteeConfig = toml::from_str(
            r#"
[dialects.signatures]
javadoc = ['@(unclosed']
"#,
        )
        .expect("config should parse");
        let err = cfg.validate().expect_err("validation should fail");
        assert!(err.to_string().contains("is invalid"));
    }

    #[test]
    fn validate_rejects_blank_rule_names() {
        let cfg: KwaliteeConfig = toml::from_str(
            r#"
[[required.dirs]]
names = [" "]
points = 10
"#,
        )
        .expect("config should parse");
        let err = cfg.validate().expect_err("validation should fail");
        assert!(err.to_string().contains("required.dirs"));
    }
}
