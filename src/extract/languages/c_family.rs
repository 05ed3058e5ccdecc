//! C and C++ extraction rules.
//!
//! Function names hide behind declarators (`*name(...)`, `&name(...)`), so
//! they are resolved with `Capture::FunctionDeclarator`. A definition inside
//! a class body counts as a method.

use crate::extract::rules::{Capture, Context, DocStyle, NodeRule, RuleSet};
use crate::features::Slot;

pub static RULES: RuleSet = RuleSet {
    name: "c_family",
    rules: &[
        NodeRule::any_of(
            &["string_literal", "raw_string_literal"],
            Slot::String,
            Capture::Text,
        ),
        NodeRule::new("function_definition", Slot::Method, Capture::FunctionDeclarator)
            .within(Context::ParentIs("field_declaration_list")),
        NodeRule::new("function_definition", Slot::Function, Capture::FunctionDeclarator),
        NodeRule::any_of(
            &[
                "class_specifier",
                "struct_specifier",
                "union_specifier",
                "enum_specifier",
            ],
            Slot::Class,
            Capture::Field("name"),
        ),
        NodeRule::new(
            "type_definition",
            Slot::Class,
            Capture::FieldOfKind("declarator", &["type_identifier"]),
        ),
        NodeRule::new(
            "declaration",
            Slot::Variable,
            Capture::EachChild {
                kind: "init_declarator",
                field: "declarator",
                of_kind: Some("identifier"),
            },
        ),
        NodeRule::any_of(
            &["preproc_include", "using_declaration"],
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
        DocStyle::Block {
            open: "/*!",
            close: "*/",
        },
        DocStyle::LineRun {
            prefix: "///",
            before: None,
        },
        DocStyle::LineRun {
            prefix: "//!",
            before: None,
        },
    ],
};
