//! Fallback rules for languages with a grammar but no bespoke table.
//!
//! Matches on node-kind substrings, which is coarse but works across most
//! grammars: anything whose kind mentions `string` or `comment`, and plain
//! identifiers as variables.

use crate::extract::rules::{Capture, Context, NodeRule, RuleSet};
use crate::features::Slot;

pub static RULES: RuleSet = RuleSet {
    name: "generic",
    rules: &[
        // Outermost literal only; nested fragments would duplicate it.
        NodeRule::containing("string", Slot::String, Capture::Text)
            .within(Context::ParentLacks("string")),
        NodeRule::containing("comment", Slot::Comment, Capture::Text),
        NodeRule::any_of(
            &["identifier", "simple_identifier"],
            Slot::Variable,
            Capture::TextLongerThan(3),
        ),
    ],
    docs: &[],
};

#[cfg(all(test, feature = "tree-sitter"))]
mod tests {
    use crate::extract::extract;
    use crate::language::Language;

    #[test]
    fn test_scala_generic() {
        let source = "// entry point for the job\nobject Main {\n  val greeting = \"hello there\"\n  val id = 1\n}\n";
        let f = extract(source, Some(Language::Scala), Some("Main.scala"));
        assert_eq!(f.comments, vec!["// entry point for the job"]);
        assert_eq!(f.strings, vec!["hello there"]);
        assert!(f.variable_names.contains(&"greeting".to_string()));
        assert!(!f.variable_names.contains(&"id".to_string()));
        assert!(f.docstrings.is_empty());
    }

    #[test]
    fn test_swift_generic() {
        let source = "// starts the app quickly\nlet message = \"launching now\"\n";
        let f = extract(source, Some(Language::Swift), None);
        assert_eq!(f.comments, vec!["// starts the app quickly"]);
        assert!(f.variable_names.contains(&"message".to_string()));
    }
}
