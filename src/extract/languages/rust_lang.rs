//! Rust extraction rules.

use crate::extract::rules::{Capture, Context, DocStyle, NodeRule, RuleSet};
use crate::features::Slot;

pub static RULES: RuleSet = RuleSet {
    name: "rust",
    rules: &[
        NodeRule::any_of(
            &["string_literal", "raw_string_literal"],
            Slot::String,
            Capture::Text,
        ),
        // Items inside `impl` and `trait` bodies.
        NodeRule::any_of(
            &["function_item", "function_signature_item"],
            Slot::Method,
            Capture::Field("name"),
        )
        .within(Context::ParentIs("declaration_list")),
        NodeRule::new("function_item", Slot::Function, Capture::Field("name")),
        NodeRule::any_of(
            &[
                "struct_item",
                "enum_item",
                "union_item",
                "trait_item",
                "type_item",
            ],
            Slot::Class,
            Capture::Field("name"),
        ),
        NodeRule::new(
            "let_declaration",
            Slot::Variable,
            Capture::FieldOfKind("pattern", &["identifier"]),
        ),
        NodeRule::any_of(&["const_item", "static_item"], Slot::Variable, Capture::Field("name")),
        NodeRule::any_of(
            &["use_declaration", "extern_crate_declaration"],
            Slot::Import,
            Capture::Text,
        ),
        NodeRule::any_of(&["line_comment", "block_comment"], Slot::Comment, Capture::Text),
    ],
    docs: &[
        DocStyle::LineRun {
            prefix: "///",
            before: None,
        },
        DocStyle::LineRun {
            prefix: "//!",
            before: None,
        },
        DocStyle::Block {
            open: "/**",
            close: "*/",
        },
        DocStyle::Block {
            open: "/*!",
            close: "*/",
        },
    ],
};

#[cfg(all(test, feature = "tree-sitter"))]
mod tests {
    use crate::extract::extract;
    use crate::language::Language;

    #[test]
    fn test_rust_items() {
        let source = r##"//! Connection pooling for the storage layer.

use std::collections::HashMap;

const MAX_CONNECTIONS: usize = 16;

/// A pool of reusable connections
/// keyed by their endpoint.
pub struct Pool {
    conns: HashMap<String, u32>,
}

impl Pool {
    pub fn checkout(&mut self) -> Option<u32> {
        // fast path first
        let endpoint = r#"primary-db"#;
        None
    }
}

fn main() {
    let (a, b) = (1, 2);
}
"##;
        let f = extract(source, Some(Language::Rust), Some("pool.rs"));
        assert_eq!(f.imports, vec!["use std::collections::HashMap;"]);
        assert_eq!(f.class_names, vec!["Pool"]);
        assert_eq!(f.method_names, vec!["checkout"]);
        assert_eq!(f.function_names, vec!["main"]);
        assert_eq!(f.variable_names, vec!["MAX_CONNECTIONS", "endpoint"]);
        assert_eq!(
            f.docstrings,
            vec![
                "Connection pooling for the storage layer.",
                "A pool of reusable connections\nkeyed by their endpoint."
            ]
        );
        assert_eq!(f.comments, vec!["// fast path first"]);
        assert_eq!(f.strings, vec!["primary-db"]);
    }

    #[test]
    fn test_four_slash_line_ends_doc_run() {
        let source = "/// Pool of connections kept open.\n//// separator line here\nstruct Pool;\n";
        let f = extract(source, Some(Language::Rust), None);
        assert_eq!(f.docstrings, vec!["Pool of connections kept open."]);
        assert!(f
            .comments
            .iter()
            .any(|c| c.trim() == "//// separator line here"));
    }

    #[test]
    fn test_trait_signatures_are_methods() {
        let source = "trait Render { fn draw(&self); }\n";
        let f = extract(source, Some(Language::Rust), None);
        assert_eq!(f.class_names, vec!["Render"]);
        assert_eq!(f.method_names, vec!["draw"]);
    }
}
