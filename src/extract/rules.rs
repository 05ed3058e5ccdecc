//! Data model for per-language extraction rules.
//!
//! A `RuleSet` is a static table: each syntax node is matched against the
//! rules in order and the first rule that accepts it decides which slot the
//! node feeds and what part of it is captured. Documentation conventions are
//! listed separately and only consulted for nodes routed to the string or
//! comment slot.

use crate::features::Slot;
use crate::language::Language;

/// How a rule matches a node kind.
#[derive(Debug, Clone, Copy)]
pub enum KindMatch {
    /// Exact node kind.
    Is(&'static str),
    /// Any of the listed kinds.
    OneOf(&'static [&'static str]),
    /// Node kind contains the substring.
    Contains(&'static str),
}

impl KindMatch {
    pub fn matches(&self, kind: &str) -> bool {
        match self {
            KindMatch::Is(k) => *k == kind,
            KindMatch::OneOf(kinds) => kinds.contains(&kind),
            KindMatch::Contains(part) => kind.contains(part),
        }
    }
}

/// Structural condition on a node's parent.
#[derive(Debug, Clone, Copy)]
pub enum Context {
    Any,
    ParentIs(&'static str),
    ParentIsNot(&'static str),
    /// Parent kind does not contain the substring.
    ParentLacks(&'static str),
}

impl Context {
    pub fn accepts(&self, parent_kind: Option<&str>) -> bool {
        match self {
            Context::Any => true,
            Context::ParentIs(k) => parent_kind == Some(*k),
            Context::ParentIsNot(k) => parent_kind != Some(*k),
            Context::ParentLacks(part) => !parent_kind.is_some_and(|p| p.contains(part)),
        }
    }
}

/// What to capture from a matched node.
#[derive(Debug, Clone, Copy)]
pub enum Capture {
    /// The node's full source text.
    Text,
    /// Full text, only when longer than the given number of characters.
    TextLongerThan(usize),
    /// A named field of the node.
    Field(&'static str),
    /// A named field, only when the child has one of the given kinds.
    FieldOfKind(&'static str, &'static [&'static str]),
    /// C-style declarators: follow `declarator` fields through pointer and
    /// reference wrappers down to a function declarator, then take its name.
    FunctionDeclarator,
    /// For each direct child of `kind`, take its field `field` when that
    /// child has kind `of_kind` (or any kind if `None`).
    EachChild {
        kind: &'static str,
        field: &'static str,
        of_kind: Option<&'static str>,
    },
    /// For each child of the node in field `field` with kind `kind`.
    EachInField {
        field: &'static str,
        kind: &'static str,
    },
    /// The field of the node's parent, when the parent has kind `parent`.
    ParentField {
        parent: &'static str,
        field: &'static str,
    },
    /// Full text of a call whose `method` field is one of the names.
    CallTo(&'static [&'static str]),
}

/// One row of a rule table.
#[derive(Debug, Clone, Copy)]
pub struct NodeRule {
    pub kind: KindMatch,
    pub context: Context,
    pub slot: Slot,
    pub capture: Capture,
}

impl NodeRule {
    pub const fn new(kind: &'static str, slot: Slot, capture: Capture) -> Self {
        Self {
            kind: KindMatch::Is(kind),
            context: Context::Any,
            slot,
            capture,
        }
    }

    pub const fn any_of(kinds: &'static [&'static str], slot: Slot, capture: Capture) -> Self {
        Self {
            kind: KindMatch::OneOf(kinds),
            context: Context::Any,
            slot,
            capture,
        }
    }

    pub const fn containing(part: &'static str, slot: Slot, capture: Capture) -> Self {
        Self {
            kind: KindMatch::Contains(part),
            context: Context::Any,
            slot,
            capture,
        }
    }

    pub const fn within(self, context: Context) -> Self {
        Self { context, ..self }
    }
}

/// A language's documentation convention.
#[derive(Debug, Clone, Copy)]
pub enum DocStyle {
    /// A string literal forming the first statement of one of the listed
    /// definition bodies, or of the module itself.
    LeadingString { definitions: &'static [&'static str] },
    /// A block comment delimited by `open` and `close`.
    Block {
        open: &'static str,
        close: &'static str,
    },
    /// A `/* */` block comment that carries one of the listed tag markers.
    TaggedBlock { tags: &'static [&'static str] },
    /// A run of line comments on consecutive lines sharing `prefix`.
    /// When `before` is set, the run must sit directly above a node of one
    /// of those kinds.
    LineRun {
        prefix: &'static str,
        before: Option<&'static [&'static str]>,
    },
}

/// Static extraction rules for one language.
#[derive(Debug)]
pub struct RuleSet {
    pub name: &'static str,
    pub rules: &'static [NodeRule],
    pub docs: &'static [DocStyle],
}

impl RuleSet {
    /// The first rule accepting a node of `kind` under `parent_kind`.
    pub fn rule_for(&self, kind: &str, parent_kind: Option<&str>) -> Option<&NodeRule> {
        self.rules
            .iter()
            .find(|r| r.kind.matches(kind) && r.context.accepts(parent_kind))
    }
}

/// Look up the rule set for a language.
///
/// Languages with a grammar but no bespoke rules get the generic set.
pub fn rule_set(language: Language) -> &'static RuleSet {
    use super::languages::*;

    match language {
        Language::Python => &python::RULES,
        Language::JavaScript | Language::TypeScript | Language::Tsx => &javascript::RULES,
        Language::Java => &java::RULES,
        Language::C | Language::Cpp => &c_family::RULES,
        Language::Go => &go::RULES,
        Language::Rust => &rust_lang::RULES,
        Language::Ruby => &ruby::RULES,
        Language::Php => &php::RULES,
        Language::Scala | Language::Swift | Language::Unknown => &generic::RULES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SAMPLE: RuleSet = RuleSet {
        name: "sample",
        rules: &[
            NodeRule::new("function_item", Slot::Method, Capture::Field("name"))
                .within(Context::ParentIs("declaration_list")),
            NodeRule::new("function_item", Slot::Function, Capture::Field("name")),
            NodeRule::containing("string", Slot::String, Capture::Text)
                .within(Context::ParentLacks("string")),
        ],
        docs: &[],
    };

    #[test]
    fn test_first_matching_rule_wins() {
        let rule = SAMPLE
            .rule_for("function_item", Some("declaration_list"))
            .unwrap();
        assert_eq!(rule.slot, Slot::Method);

        let rule = SAMPLE.rule_for("function_item", Some("source_file")).unwrap();
        assert_eq!(rule.slot, Slot::Function);
    }

    #[test]
    fn test_parent_lacks() {
        assert!(SAMPLE.rule_for("string_literal", Some("call")).is_some());
        assert!(SAMPLE
            .rule_for("string_content", Some("string_literal"))
            .is_none());
        assert!(SAMPLE.rule_for("string", None).is_some());
    }

    #[test]
    fn test_kind_match() {
        assert!(KindMatch::OneOf(&["a", "b"]).matches("b"));
        assert!(!KindMatch::Is("a").matches("ab"));
        assert!(KindMatch::Contains("comment").matches("line_comment"));
    }

    #[test]
    fn test_every_language_has_rules() {
        for lang in Language::DETECTABLE {
            assert!(!rule_set(*lang).rules.is_empty(), "{} has no rules", lang);
        }
        assert_eq!(rule_set(Language::Swift).name, "generic");
        assert_eq!(rule_set(Language::Tsx).name, "javascript");
    }
}
