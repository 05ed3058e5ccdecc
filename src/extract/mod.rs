//! Feature extraction entry points.
//!
//! Syntax-aware extraction runs whenever the registry holds a grammar for
//! the requested language. Every other case (no language, no grammar, a
//! parser that refuses to configure or produce a tree) degrades to the
//! pattern fallback. Extraction itself never fails.

mod docs;
mod languages;
mod registry;
mod rules;
#[cfg(feature = "tree-sitter")]
mod walker;

pub use docs::{has_line_prefix, join_lines, strip_block, strip_line, strip_string_doc};
pub use registry::{init_grammars, GrammarRegistry};
pub use rules::{rule_set, RuleSet};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::fallback;
use crate::features::CodeFeatures;
use crate::language::Language;

/// Which path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    Syntax,
    Fallback,
}

/// Extraction output together with the path that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub features: CodeFeatures,
    pub method: ExtractionMethod,
}

/// Reasons the syntax path was not taken.
#[derive(Debug, Error)]
pub enum SyntaxUnavailable {
    #[error("no language given")]
    NoLanguage,
    #[error("no grammar loaded for {0}")]
    NoGrammar(Language),
    #[error("parser produced no tree for {0}")]
    ParseFailed(Language),
}

/// Extractor bound to a grammar registry.
#[derive(Clone, Copy)]
pub struct Extractor<'r> {
    registry: &'r GrammarRegistry,
}

impl Default for Extractor<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor<'static> {
    /// Extractor over the shared process-wide registry.
    pub fn new() -> Self {
        Self {
            registry: init_grammars(),
        }
    }
}

impl<'r> Extractor<'r> {
    pub fn with_registry(registry: &'r GrammarRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r GrammarRegistry {
        self.registry
    }

    /// Extract normalised features from `source`.
    pub fn extract(
        &self,
        source: &str,
        language: Option<Language>,
        file_path: Option<&str>,
    ) -> CodeFeatures {
        self.extract_with_method(source, language, file_path).features
    }

    /// Extract normalised features and report which path produced them.
    pub fn extract_with_method(
        &self,
        source: &str,
        language: Option<Language>,
        file_path: Option<&str>,
    ) -> Extraction {
        match self.extract_syntax(source, language, file_path) {
            Ok(features) => Extraction {
                features: features.normalized(),
                method: ExtractionMethod::Syntax,
            },
            Err(reason) => {
                debug!(
                    file = file_path.unwrap_or("<buffer>"),
                    %reason,
                    "using pattern fallback"
                );
                let language = language.unwrap_or(Language::Unknown);
                Extraction {
                    features: fallback::extract(source, language, file_path),
                    method: ExtractionMethod::Fallback,
                }
            }
        }
    }

    #[cfg(feature = "tree-sitter")]
    fn extract_syntax(
        &self,
        source: &str,
        language: Option<Language>,
        file_path: Option<&str>,
    ) -> Result<CodeFeatures, SyntaxUnavailable> {
        let language = language.ok_or(SyntaxUnavailable::NoLanguage)?;
        let mut parser = self
            .registry
            .parser(language)
            .ok_or(SyntaxUnavailable::NoGrammar(language))?;
        let tree = parser
            .parse(source, None)
            .ok_or(SyntaxUnavailable::ParseFailed(language))?;

        let mut features = CodeFeatures::empty(language, file_path);
        walker::walk(&tree, source, rule_set(language), &mut features);
        Ok(features)
    }

    #[cfg(not(feature = "tree-sitter"))]
    fn extract_syntax(
        &self,
        _source: &str,
        language: Option<Language>,
        _file_path: Option<&str>,
    ) -> Result<CodeFeatures, SyntaxUnavailable> {
        let language = language.ok_or(SyntaxUnavailable::NoLanguage)?;
        Err(SyntaxUnavailable::NoGrammar(language))
    }
}

/// Extract features with the shared registry.
///
/// `language = None` or a language without a grammar selects the pattern
/// fallback; the result is tagged `unknown` when no language was given.
pub fn extract(source: &str, language: Option<Language>, file_path: Option<&str>) -> CodeFeatures {
    Extractor::new().extract(source, language, file_path)
}

/// Like [`extract`], also reporting which path produced the result.
pub fn extract_with_method(
    source: &str,
    language: Option<Language>,
    file_path: Option<&str>,
) -> Extraction {
    Extractor::new().extract_with_method(source, language, file_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_language_uses_fallback() {
        let result = extract_with_method("x = 1", None, Some("data.xyz"));
        assert_eq!(result.method, ExtractionMethod::Fallback);
        assert_eq!(result.features.language, Language::Unknown);
        assert_eq!(result.features.file_path.as_deref(), Some("data.xyz"));
    }

    #[test]
    fn test_empty_registry_falls_back() {
        let registry = GrammarRegistry::empty();
        let extractor = Extractor::with_registry(&registry);
        let result =
            extractor.extract_with_method("def run():\n    pass\n", Some(Language::Python), None);
        assert_eq!(result.method, ExtractionMethod::Fallback);
        assert_eq!(result.features.language, Language::Python);
        assert_eq!(result.features.function_names, vec!["run"]);
    }

    #[test]
    fn test_empty_source_every_language() {
        for lang in Language::DETECTABLE {
            let f = extract("", Some(*lang), None);
            assert!(f.is_empty(), "{} produced features from empty input", lang);
            assert_eq!(f.language, *lang);
        }
    }

    #[cfg(feature = "tree-sitter")]
    #[test]
    fn test_grammar_languages_use_syntax_path() {
        for lang in Language::DETECTABLE {
            let result = extract_with_method("", Some(*lang), None);
            assert_eq!(result.method, ExtractionMethod::Syntax, "{}", lang);
        }
    }

    #[cfg(feature = "tree-sitter")]
    #[test]
    fn test_malformed_source_still_extracts() {
        let f = extract(
            "def broken(:\n    pass\n\ndef healthy():\n    return 'partial result'\n",
            Some(Language::Python),
            None,
        );
        assert_eq!(f.language, Language::Python);
        assert!(f.function_names.contains(&"healthy".to_string()));
    }

    #[cfg(feature = "tree-sitter")]
    #[test]
    fn test_extraction_is_idempotent_and_deterministic() {
        let source = "// helper for tests only\nfunction alpha() { return \"alpha value\"; }\n";
        let first = extract(source, Some(Language::JavaScript), None);
        let second = extract(source, Some(Language::JavaScript), None);
        assert_eq!(first, second);
        assert_eq!(first.clone().normalized(), first);
    }

    #[cfg(feature = "tree-sitter")]
    #[test]
    fn test_deep_nesting_does_not_overflow() {
        let mut source = String::from("x = ");
        for _ in 0..2000 {
            source.push('[');
        }
        for _ in 0..2000 {
            source.push(']');
        }
        source.push('\n');
        let f = extract(&source, Some(Language::Python), None);
        assert_eq!(f.variable_names, vec!["x"]);
    }
}
