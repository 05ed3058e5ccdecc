//! Ruby extraction rules.
//!
//! Ruby has no import statement; `require`-style calls stand in for one.

use crate::extract::rules::{Capture, DocStyle, NodeRule, RuleSet};
use crate::features::Slot;

pub static RULES: RuleSet = RuleSet {
    name: "ruby",
    rules: &[
        NodeRule::new("string", Slot::String, Capture::Text),
        NodeRule::any_of(&["method", "singleton_method"], Slot::Method, Capture::Field("name")),
        NodeRule::any_of(&["class", "module"], Slot::Class, Capture::Field("name")),
        NodeRule::new(
            "assignment",
            Slot::Variable,
            Capture::FieldOfKind("left", &["identifier", "constant", "instance_variable"]),
        ),
        NodeRule::new(
            "call",
            Slot::Import,
            Capture::CallTo(&["require", "require_relative", "load"]),
        ),
        NodeRule::new("comment", Slot::Comment, Capture::Text),
    ],
    docs: &[DocStyle::LineRun {
        prefix: "#",
        before: Some(&["method", "singleton_method", "class", "module"]),
    }],
};
