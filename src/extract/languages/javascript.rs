//! JavaScript, TypeScript and TSX extraction rules.
//!
//! The TypeScript grammars are supersets of the JavaScript one, so a single
//! table serves all three. Kinds that only exist in TypeScript
//! (`interface_declaration`, `abstract_class_declaration`) never match in
//! plain JavaScript trees.

use crate::extract::rules::{Capture, DocStyle, NodeRule, RuleSet};
use crate::features::Slot;

pub static RULES: RuleSet = RuleSet {
    name: "javascript",
    rules: &[
        NodeRule::any_of(&["string", "template_string"], Slot::String, Capture::Text),
        NodeRule::any_of(
            &[
                "function_declaration",
                "function_expression",
                "generator_function_declaration",
            ],
            Slot::Function,
            Capture::Field("name"),
        ),
        // `const handler = () => {}` names the arrow function after its binding.
        NodeRule::new(
            "arrow_function",
            Slot::Function,
            Capture::ParentField {
                parent: "variable_declarator",
                field: "name",
            },
        ),
        NodeRule::any_of(
            &[
                "class_declaration",
                "abstract_class_declaration",
                "interface_declaration",
                "class",
            ],
            Slot::Class,
            Capture::Field("name"),
        ),
        NodeRule::new("method_definition", Slot::Method, Capture::Field("name")),
        NodeRule::new(
            "variable_declarator",
            Slot::Variable,
            Capture::FieldOfKind("name", &["identifier"]),
        ),
        NodeRule::new("import_statement", Slot::Import, Capture::Text),
        NodeRule::new("comment", Slot::Comment, Capture::Text),
    ],
    docs: &[DocStyle::Block {
        open: "/**",
        close: "*/",
    }],
};
