//! Docstring markup classification.
//!
//! Each dialect is recognised by a handful of signature patterns. Matchers are
//! tried in precedence order and the first one with a matching signature wins.

use crate::error::{KwaliteeError, Result};
use crate::types::config::DialectConfig;
use crate::types::entity::{DocumentableEntity, MarkupStyle};
use regex::Regex;

const ALPHA: &str = r"[-.,?!\w]";
const WORD: &str = r"[-.,?!\s\w]";
const START: &str = r"(?:^|\s)";
const END: &str = r"(?:[.,?!\s]|$)";
const LINE_START: &str = r"(?:\n|^)[ \t]*";

/// Inline markup delimited by `start` and `end`, surrounded by whitespace or
/// punctuation and enclosing at least one word character.
fn inline_with(start: &str, end: &str, alpha: &str, word: &str) -> String {
    format!(
        "{START}{start}{alpha}{end}{END}|{START}{start}{alpha}{word}*{alpha}{end}{END}"
    )
}

fn inline(start: &str, end: &str) -> String {
    inline_with(start, end, ALPHA, WORD)
}

/// A marker at the beginning of a line followed by text.
fn line(marker: &str) -> String {
    format!("{LINE_START}{marker}{WORD}")
}

fn builtin_signatures(style: MarkupStyle) -> Vec<String> {
    match style {
        MarkupStyle::ReStructuredText => vec![
            inline(r"\*", r"\*"),
            inline(r"\*\*", r"\*\*"),
            inline("``", "``"),
            inline_with(r"\(", r"_\)", r"\w", r"[-.\w]"),
            inline(r"\(`", r"`_\)"),
            format!("{LINE_START}:{WORD}+:"),
            line("[*+-]"),
            line(r"(?:\d+|[a-zA-Z]+[.)])"),
            line(r"\((?:\d+|[a-zA-Z]+)\)"),
            r":param [a-zA-Z_]+:".to_string(),
            r":[a-z]+:`".to_string(),
            r"\.\. [a-z]+::".to_string(),
        ],
        MarkupStyle::Epytext => vec![
            r"[BCEGILMSUX]\{.*\}".to_string(),
            line(r"@[a-z]+(?:[ \t][a-zA-Z]+)?:"),
            line("-"),
            line(r"\d+(?:\.\d+)*"),
        ],
        MarkupStyle::Javadoc => vec![
            r"<[a-zA-Z]+[^>]*>".to_string(),
            line(r"@[a-z][a-zA-Z]*\s"),
            r"\{@(?:docRoot|inheritDoc|link|linkplain|value)[^}]*\}".to_string(),
        ],
    }
}

fn compile(style: MarkupStyle, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        KwaliteeError::ConfigParse(format!("{style} signature {pattern:?} is invalid: {e}"))
    })
}

/// Signature patterns for a single dialect.
#[derive(Debug, Clone)]
pub struct DialectMatcher {
    pub style: MarkupStyle,
    signatures: Vec<Regex>,
}

impl DialectMatcher {
    pub fn new(style: MarkupStyle, extra: &[String]) -> Result<Self> {
        let signatures = builtin_signatures(style)
            .iter()
            .chain(extra)
            .map(|pattern| compile(style, pattern))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { style, signatures })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.signatures.iter().any(|signature| signature.is_match(text))
    }
}

#[derive(Debug, Clone)]
pub struct Classifier {
    matchers: Vec<DialectMatcher>,
    doctest: Regex,
}

impl Classifier {
    /// Build matchers in the configured precedence. Dialects missing from the
    /// precedence list follow in their default order.
    pub fn new(config: &DialectConfig) -> Result<Self> {
        let mut order = config.precedence.clone();
        for style in MarkupStyle::ALL {
            if !order.contains(&style) {
                order.push(style);
            }
        }
        let matchers = order
            .into_iter()
            .map(|style| DialectMatcher::new(style, config.extra_signatures(style)))
            .collect::<Result<Vec<_>>>()?;
        let doctest = Regex::new(r"(?m)^\s*>>>(?:\s|$)")
            .map_err(|e| KwaliteeError::ConfigParse(e.to_string()))?;
        Ok(Self { matchers, doctest })
    }

    pub fn classify(&self, text: &str) -> Option<MarkupStyle> {
        self.matchers
            .iter()
            .find(|matcher| matcher.matches(text))
            .map(|matcher| matcher.style)
    }

    /// Every dialect whose signatures occur in `text`, in precedence order.
    pub fn matching_styles(&self, text: &str) -> Vec<MarkupStyle> {
        self.matchers
            .iter()
            .filter(|matcher| matcher.matches(text))
            .map(|matcher| matcher.style)
            .collect()
    }

    pub fn has_doctest(&self, text: &str) -> bool {
        self.doctest.is_match(text)
    }

    /// Set `markup_style` on every documented entity of the forest.
    pub fn classify_forest(&self, forest: &mut [DocumentableEntity]) {
        for module in forest {
            module.walk_mut(&mut |entity| {
                entity.markup_style = None;
                if !entity.has_documentation {
                    return;
                }
                let Some(text) = entity.documentation_text.as_deref() else {
                    return;
                };
                entity.markup_style = self.classify(text);
                if tracing::enabled!(tracing::Level::DEBUG) {
                    let styles = self.matching_styles(text);
                    if styles.len() > 1 {
                        tracing::debug!(
                            entity = %entity.qualified_name,
                            ?styles,
                            "several dialects match, taking the first"
                        );
                    }
                }
                if entity.markup_style.is_none() {
                    tracing::debug!(entity = %entity.qualified_name, "unformatted docstring");
                }
            });
        }
    }

    /// Number of documented entities whose docstring contains doctest examples.
    pub fn count_doctests(&self, forest: &[DocumentableEntity]) -> usize {
        crate::types::entity::walk_forest(forest)
            .filter(|entity| entity.has_documentation)
            .filter_map(|entity| entity.documentation_text.as_deref())
            .filter(|text| self.has_doctest(text))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::config::NamingConvention;

    fn classifier() -> Classifier {
        Classifier::new(&DialectConfig::default()).expect("default signatures should compile")
    }

    fn assert_dialect(style: MarkupStyle, valid: &[&str], invalid: &[&str]) {
        let matcher = DialectMatcher::new(style, &[]).expect("signatures should compile");
        for text in valid {
            assert!(matcher.matches(text), "{style} should accept {text:?}");
        }
        for text in invalid {
            assert!(!matcher.matches(text), "{style} should reject {text:?}");
        }
    }

    #[test]
    fn restructuredtext_signatures() {
        assert_dialect(
            MarkupStyle::ReStructuredText,
            &[
                "String with *emphasis*.",
                "*Multi-word emphasis.*",
                "How about testing **strong string**?",
                "Some *noisy!* punctuation",
                "**characters?**, in the way.",
                "Don't forget ``inline literals``.",
                "This is reST (hyperlink_).",
                "This is (`quite long hyperlink`_).",
                "* Bullet\n* List\n",
                "+ Another\n+ Bullet\n+ List\n",
                "1. Ordered\n2. List\n",
                "  a) Another\n  b) ordered\n  c) list\n",
                " (a) one\n (b) more",
                ":Field: list\n:indeed: it is\n",
                "Start the job.\n\n:param retries: how often to try\n",
                "See :class:`Scheduler` for details.",
                "Setup.\n\n.. note:: Runs once.",
            ],
            &[
                "Plain string.",
                "Do some math: 2 * 2a* 2 = 8a",
                "Not*really*strong.",
                "Interpreted `text` is widely used as quotes, so exclude it.",
                "Not a :field:.",
            ],
        );
    }

    #[test]
    fn epytext_signatures() {
        assert_dialect(
            MarkupStyle::Epytext,
            &[
                "- Bullet\n- List\n",
                "1. Ordered\n2. List\n",
                "1.1 Few points\n1.2 To remember\n",
                "Some I{italics} here.",
                "And a small bit of C{code}.",
                "@param self: You know what it means.",
                "@return: Return a long\ndescription.",
            ],
            &[
                "Aha - This is not an unordered list.",
                "email@example.com",
                "Short Python dictionary: {0: 'zero', 1: 'one'}.",
                "@ not a field: at all",
            ],
        );
    }

    #[test]
    fn javadoc_signatures() {
        assert_dialect(
            MarkupStyle::Javadoc,
            &[
                "Inline <a href=\"{@docRoot}/html/documents/\">are ugly</a>!",
                "Call {@link #test_javadoc(object) test_javadoc} method.",
                "@see Why#java(sucks)",
            ],
            &[
                "Normal text.",
                "mail.address@example.com",
                "Mathematical: a < b < c while x > y.",
                "@it: is not javadoc, but epytext!",
            ],
        );
    }

    #[test]
    fn ambiguous_text_resolves_by_precedence() {
        let text = "Run it.\n\n@param argument: epytext or javadoc, both match.";
        assert_eq!(
            classifier().matching_styles(text),
            vec![MarkupStyle::Epytext, MarkupStyle::Javadoc]
        );
        assert_eq!(classifier().classify(text), Some(MarkupStyle::Epytext));

        let reordered = Classifier::new(&DialectConfig {
            precedence: vec![MarkupStyle::Javadoc],
            ..DialectConfig::default()
        })
        .expect("reordered classifier should build");
        assert_eq!(reordered.classify(text), Some(MarkupStyle::Javadoc));
        assert_eq!(
            reordered.classify("Time to get *a bit* of reST."),
            Some(MarkupStyle::ReStructuredText)
        );
    }

    #[test]
    fn extra_signatures_extend_a_dialect() {
        let mut config = DialectConfig::default();
        config
            .signatures
            .insert("epytext".to_string(), vec![r"(?m)^TODO:".to_string()]);
        let classifier = Classifier::new(&config).expect("classifier should build");
        assert_eq!(classifier.classify("TODO: write me"), Some(MarkupStyle::Epytext));
        assert_eq!(self::classifier().classify("TODO: write me"), None);
    }

    #[test]
    fn classify_forest_marks_documented_entities_only() {
        let source = r#""""
Docstring for module1

@summary: Module summary.
"""

class Class1:
    """
    Docstring for Class1

    @see how.Tests#are(performed)
    """

    def method5(self):
        """Method with few definitions.

        :Word: And its definition.
        """

def func1():
    """Docstring for func1"""

def func6():
    """
    """

def func7():
    "Time to get *a bit* of reST."

def func8(argument):
    """This is test function for the epytext parser.

    @param argument: And you really can't say if this is
        epytext or javadoc! We count both.
    """

class Class3(object):
    """
    New-style class with epytext link: U{http://pycheesecake.org}.
    """
"#;
        let mut discoverer = crate::scan::python::EntityDiscoverer::new(
            &NamingConvention::default(),
        )
        .expect("grammar should load");
        let module = discoverer
            .discover_module(source, "module1")
            .expect("source should parse");
        let mut forest = vec![module];
        classifier().classify_forest(&mut forest);

        let style_of = |name: &str| {
            crate::types::entity::walk_forest(&forest)
                .find(|entity| entity.qualified_name == name)
                .and_then(|entity| entity.markup_style)
        };
        assert_eq!(style_of("module1"), Some(MarkupStyle::Epytext));
        assert_eq!(style_of("module1.Class1"), Some(MarkupStyle::Javadoc));
        assert_eq!(style_of("module1.Class1.method5"), Some(MarkupStyle::ReStructuredText));
        assert_eq!(style_of("module1.func1"), None);
        assert_eq!(style_of("module1.func6"), None);
        assert_eq!(style_of("module1.func7"), Some(MarkupStyle::ReStructuredText));
        assert_eq!(style_of("module1.func8"), Some(MarkupStyle::Epytext));
        assert_eq!(style_of("module1.Class3"), Some(MarkupStyle::Epytext));
    }

    #[test]
    fn doctest_prompts_are_detected() {
        let classifier = classifier();
        assert!(classifier.has_doctest("Add numbers.\n\n    >>> add(1, 2)\n    3\n"));
        assert!(classifier.has_doctest(">>> x"));
        assert!(!classifier.has_doctest("Compare a >>> b inline."));
        assert!(!classifier.has_doctest(">>>x"));
    }
}
