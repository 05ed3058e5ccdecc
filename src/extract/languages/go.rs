//! Go extraction rules.
//!
//! Go documents declarations with plain `//` comments placed directly above
//! them, so doc runs are only recognised when a declaration follows.

use crate::extract::rules::{Capture, DocStyle, NodeRule, RuleSet};
use crate::features::Slot;

pub static RULES: RuleSet = RuleSet {
    name: "go",
    rules: &[
        NodeRule::any_of(
            &["interpreted_string_literal", "raw_string_literal"],
            Slot::String,
            Capture::Text,
        ),
        NodeRule::new("function_declaration", Slot::Function, Capture::Field("name")),
        NodeRule::new("method_declaration", Slot::Method, Capture::Field("name")),
        NodeRule::any_of(&["type_spec", "type_alias"], Slot::Class, Capture::Field("name")),
        NodeRule::any_of(&["var_spec", "const_spec"], Slot::Variable, Capture::Field("name")),
        NodeRule::new(
            "short_var_declaration",
            Slot::Variable,
            Capture::EachInField {
                field: "left",
                kind: "identifier",
            },
        ),
        NodeRule::new("import_declaration", Slot::Import, Capture::Text),
        NodeRule::new("comment", Slot::Comment, Capture::Text),
    ],
    docs: &[DocStyle::LineRun {
        prefix: "//",
        before: Some(&[
            "function_declaration",
            "method_declaration",
            "type_declaration",
            "const_declaration",
            "var_declaration",
        ]),
    }],
};

#[cfg(all(test, feature = "tree-sitter"))]
mod tests {
    use crate::extract::extract;
    use crate::language::Language;

    #[test]
    fn test_go_declarations() {
        let source = r#"package store

import "fmt"

// Store keeps records in memory
// until they are flushed.
type Store struct {
	items []string
}

// Add appends one record to the store.
func (s *Store) Add(item string) {
	s.items = append(s.items, item)
}

func NewStore() *Store {
	// allocate the backing slice
	count, total := 0, 0
	fmt.Println("creating store", count, total)
	return &Store{}
}
"#;
        let f = extract(source, Some(Language::Go), Some("store.go"));
        assert_eq!(f.imports, vec!["import \"fmt\""]);
        assert_eq!(f.class_names, vec!["Store"]);
        assert_eq!(f.method_names, vec!["Add"]);
        assert_eq!(f.function_names, vec!["NewStore"]);
        assert_eq!(f.variable_names, vec!["count", "total"]);
        assert_eq!(
            f.docstrings,
            vec![
                "Store keeps records in memory\nuntil they are flushed.",
                "Add appends one record to the store."
            ]
        );
        assert_eq!(f.comments, vec!["// allocate the backing slice"]);
        assert_eq!(f.strings, vec!["fmt", "creating store"]);
    }
}
