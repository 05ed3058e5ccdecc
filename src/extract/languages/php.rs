//! PHP extraction rules.

use crate::extract::rules::{Capture, DocStyle, NodeRule, RuleSet};
use crate::features::Slot;

pub static RULES: RuleSet = RuleSet {
    name: "php",
    rules: &[
        NodeRule::any_of(&["string", "encapsed_string"], Slot::String, Capture::Text),
        NodeRule::new("function_definition", Slot::Function, Capture::Field("name")),
        NodeRule::new("method_declaration", Slot::Method, Capture::Field("name")),
        NodeRule::any_of(
            &[
                "class_declaration",
                "interface_declaration",
                "trait_declaration",
                "enum_declaration",
            ],
            Slot::Class,
            Capture::Field("name"),
        ),
        NodeRule::new(
            "assignment_expression",
            Slot::Variable,
            Capture::FieldOfKind("left", &["variable_name"]),
        ),
        NodeRule::any_of(
            &[
                "include_expression",
                "include_once_expression",
                "require_expression",
                "require_once_expression",
                "namespace_use_declaration",
            ],
            Slot::Import,
            Capture::Text,
        ),
        NodeRule::new("comment", Slot::Comment, Capture::Text),
    ],
    docs: &[
        DocStyle::Block {
            open: "/**",
            close: "*/",
        },
        DocStyle::TaggedBlock {
            tags: &["@param", "@return", "@throws", "@var", "@author"],
        },
    ],
};
