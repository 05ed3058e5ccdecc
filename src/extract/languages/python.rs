//! Python extraction rules.
//!
//! Docstrings are the leading string statement of a function, class, or
//! module body. A decorated definition still owns its body block, so the
//! decorator does not hide the docstring.

use crate::extract::rules::{Capture, DocStyle, NodeRule, RuleSet};
use crate::features::Slot;

pub static RULES: RuleSet = RuleSet {
    name: "python",
    rules: &[
        NodeRule::new("string", Slot::String, Capture::Text),
        NodeRule::new("function_definition", Slot::Function, Capture::Field("name")),
        NodeRule::new("class_definition", Slot::Class, Capture::Field("name")),
        NodeRule::new(
            "assignment",
            Slot::Variable,
            Capture::FieldOfKind("left", &["identifier"]),
        ),
        NodeRule::any_of(
            &[
                "import_statement",
                "import_from_statement",
                "future_import_statement",
            ],
            Slot::Import,
            Capture::Text,
        ),
        NodeRule::new("comment", Slot::Comment, Capture::Text),
    ],
    docs: &[DocStyle::LeadingString {
        definitions: &["function_definition", "class_definition"],
    }],
};
