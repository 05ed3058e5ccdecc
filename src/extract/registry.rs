//! Process-wide grammar registry.
//!
//! Grammars are loaded once and shared read-only. Parsers are not shared:
//! `parser` hands out a fresh one per call, so concurrent extractions never
//! contend on parser state.

use std::collections::BTreeMap;

use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::language::Language;

static REGISTRY: OnceCell<GrammarRegistry> = OnceCell::new();

/// Initialise the shared registry. Idempotent; later calls return the
/// instance built by the first.
pub fn init_grammars() -> &'static GrammarRegistry {
    REGISTRY.get_or_init(GrammarRegistry::load)
}

/// Languages with a loaded grammar, mapped to that grammar.
#[derive(Default)]
pub struct GrammarRegistry {
    #[cfg(feature = "tree-sitter")]
    grammars: BTreeMap<Language, tree_sitter::Language>,
    #[cfg(not(feature = "tree-sitter"))]
    grammars: BTreeMap<Language, ()>,
}

impl GrammarRegistry {
    /// A registry with no grammars; every language uses the fallback.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load every bundled grammar. A grammar the runtime rejects is logged
    /// and left out.
    pub fn load() -> Self {
        Self::load_only(Language::DETECTABLE)
    }

    /// Load grammars for the listed languages only.
    #[cfg(feature = "tree-sitter")]
    pub fn load_only(languages: &[Language]) -> Self {
        let mut grammars = BTreeMap::new();
        for &language in languages {
            let Some(grammar) = bundled_grammar(language) else {
                continue;
            };
            let mut parser = tree_sitter::Parser::new();
            match parser.set_language(&grammar) {
                Ok(()) => {
                    grammars.insert(language, grammar);
                }
                Err(e) => warn!(%language, error = %e, "grammar rejected, language disabled"),
            }
        }
        debug!(count = grammars.len(), "grammar registry loaded");
        Self { grammars }
    }

    #[cfg(not(feature = "tree-sitter"))]
    pub fn load_only(_languages: &[Language]) -> Self {
        debug!("built without tree-sitter, grammar registry is empty");
        Self::default()
    }

    pub fn has_grammar(&self, language: Language) -> bool {
        self.grammars.contains_key(&language)
    }

    /// Languages with a loaded grammar, in stable order.
    pub fn languages(&self) -> Vec<Language> {
        self.grammars.keys().copied().collect()
    }

    /// A fresh parser configured for `language`.
    #[cfg(feature = "tree-sitter")]
    pub fn parser(&self, language: Language) -> Option<tree_sitter::Parser> {
        let grammar = self.grammars.get(&language)?;
        let mut parser = tree_sitter::Parser::new();
        match parser.set_language(grammar) {
            Ok(()) => Some(parser),
            Err(e) => {
                warn!(%language, error = %e, "failed to configure parser");
                None
            }
        }
    }
}

#[cfg(feature = "tree-sitter")]
fn bundled_grammar(language: Language) -> Option<tree_sitter::Language> {
    let grammar = match language {
        Language::Python => tree_sitter_python::LANGUAGE.into(),
        Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        Language::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        Language::Java => tree_sitter_java::LANGUAGE.into(),
        Language::C => tree_sitter_c::LANGUAGE.into(),
        Language::Cpp => tree_sitter_cpp::LANGUAGE.into(),
        Language::Go => tree_sitter_go::LANGUAGE.into(),
        Language::Rust => tree_sitter_rust::LANGUAGE.into(),
        Language::Ruby => tree_sitter_ruby::LANGUAGE.into(),
        Language::Php => tree_sitter_php::LANGUAGE_PHP.into(),
        Language::Scala => tree_sitter_scala::LANGUAGE.into(),
        Language::Swift => tree_sitter_swift::LANGUAGE.into(),
        Language::Unknown => return None,
    };
    Some(grammar)
}
