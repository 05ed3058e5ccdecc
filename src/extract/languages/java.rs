//! Java extraction rules.

use crate::extract::rules::{Capture, DocStyle, NodeRule, RuleSet};
use crate::features::Slot;

pub static RULES: RuleSet = RuleSet {
    name: "java",
    rules: &[
        NodeRule::any_of(&["string_literal", "text_block"], Slot::String, Capture::Text),
        NodeRule::any_of(
            &["method_declaration", "constructor_declaration"],
            Slot::Method,
            Capture::Field("name"),
        ),
        NodeRule::any_of(
            &[
                "class_declaration",
                "interface_declaration",
                "enum_declaration",
                "record_declaration",
                "annotation_type_declaration",
            ],
            Slot::Class,
            Capture::Field("name"),
        ),
        NodeRule::new("variable_declarator", Slot::Variable, Capture::Field("name")),
        NodeRule::new("import_declaration", Slot::Import, Capture::Text),
        NodeRule::any_of(&["line_comment", "block_comment"], Slot::Comment, Capture::Text),
    ],
    docs: &[DocStyle::Block {
        open: "/**",
        close: "*/",
    }],
};
