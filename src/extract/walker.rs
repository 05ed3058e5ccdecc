//! Syntax tree traversal and rule dispatch.
//!
//! The tree is walked iteratively with a `TreeCursor`, so deeply nested
//! sources cannot exhaust the stack. Every node is visited exactly once and
//! routed through the language's rule table.

use tree_sitter::{Node, Tree};

use super::docs;
use super::rules::{Capture, DocStyle, RuleSet};
use crate::features::{char_len, CodeFeatures, Slot, MIN_DOCSTRING_LEN};

/// Depth limit when unwrapping C declarators.
const MAX_DECLARATOR_DEPTH: usize = 8;

/// Walk `tree` and append every captured value to `features`.
pub fn walk(tree: &Tree, source: &str, rules: &RuleSet, features: &mut CodeFeatures) {
    let source = source.as_bytes();
    let mut cursor = tree.walk();
    let mut ancestors: Vec<&'static str> = Vec::new();

    loop {
        let node = cursor.node();
        visit(node, ancestors.last().copied(), source, rules, features);

        if cursor.goto_first_child() {
            ancestors.push(node.kind());
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
            ancestors.pop();
        }
    }
}

fn visit(
    node: Node,
    parent_kind: Option<&str>,
    source: &[u8],
    rules: &RuleSet,
    features: &mut CodeFeatures,
) {
    // Anonymous tokens share kinds with named nodes, e.g. the `string` type
    // keyword in TypeScript and PHP.
    if !node.is_named() {
        return;
    }
    let Some(rule) = rules.rule_for(node.kind(), parent_kind) else {
        return;
    };

    if matches!(rule.slot, Slot::String | Slot::Comment) {
        match recognize_doc(node, source, rules.docs) {
            DocMatch::Doc(text) => {
                features.push(Slot::Docstring, text);
                return;
            }
            // Already emitted with the head of its run.
            DocMatch::RunMember => return,
            DocMatch::NotDoc => {}
        }
    }

    capture(node, source, rule.slot, &rule.capture, features);
}

fn capture(node: Node, source: &[u8], slot: Slot, capture: &Capture, features: &mut CodeFeatures) {
    let mut emit = |n: Node| push_text(n, source, slot, features);

    match *capture {
        Capture::Text => emit(node),
        Capture::TextLongerThan(min) => {
            if char_len(text(node, source)) > min {
                emit(node);
            }
        }
        Capture::Field(field) => {
            if let Some(child) = node.child_by_field_name(field) {
                emit(child);
            }
        }
        Capture::FieldOfKind(field, kinds) => {
            if let Some(child) = node.child_by_field_name(field) {
                if kinds.contains(&child.kind()) {
                    emit(child);
                }
            }
        }
        Capture::FunctionDeclarator => {
            if let Some(name) = function_declarator_name(node) {
                emit(name);
            }
        }
        Capture::EachChild {
            kind,
            field,
            of_kind,
        } => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                if child.kind() != kind {
                    continue;
                }
                if let Some(target) = child.child_by_field_name(field) {
                    if of_kind.map_or(true, |k| target.kind() == k) {
                        emit(target);
                    }
                }
            }
        }
        Capture::EachInField { field, kind } => {
            let Some(container) = node.child_by_field_name(field) else {
                return;
            };
            if container.kind() == kind {
                emit(container);
                return;
            }
            let mut cursor = container.walk();
            for child in container.named_children(&mut cursor) {
                if child.kind() == kind {
                    emit(child);
                }
            }
        }
        Capture::ParentField { parent, field } => {
            if let Some(target) = node
                .parent()
                .filter(|p| p.kind() == parent)
                .and_then(|p| p.child_by_field_name(field))
            {
                emit(target);
            }
        }
        Capture::CallTo(names) => {
            let called = node
                .child_by_field_name("method")
                .map(|m| text(m, source));
            if called.is_some_and(|name| names.contains(&name)) {
                emit(node);
            }
        }
    }
}

fn push_text(node: Node, source: &[u8], slot: Slot, features: &mut CodeFeatures) {
    let raw = text(node, source);
    let value = match slot {
        Slot::String => literal_text(raw),
        Slot::Import => raw.trim(),
        _ => raw,
    };
    features.push(slot, value);
}

/// Follow `declarator` fields through pointer, reference and parenthesised
/// wrappers until a function declarator yields its name.
fn function_declarator_name(node: Node) -> Option<Node> {
    let mut current = node.child_by_field_name("declarator")?;
    for _ in 0..MAX_DECLARATOR_DEPTH {
        match current.kind() {
            "function_declarator" => return current.child_by_field_name("declarator"),
            "pointer_declarator" | "reference_declarator" | "parenthesized_declarator" => {
                current = current
                    .child_by_field_name("declarator")
                    .or_else(|| current.named_child(0))?;
            }
            _ => return None,
        }
    }
    None
}

fn text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// Drop a literal prefix such as `f`, `rb`, `r#`, `L` or `u8`, and the
/// matching trailing hashes of a raw string.
fn literal_text(raw: &str) -> &str {
    let Some(open) = raw.find(|c: char| matches!(c, '"' | '\'' | '`')) else {
        return raw;
    };
    let prefix = &raw[..open];
    if prefix.is_empty()
        || prefix.len() > 4
        || !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '#')
    {
        return raw;
    }

    let hashes = prefix.chars().filter(|c| *c == '#').count();
    let mut body = &raw[open..];
    for _ in 0..hashes {
        body = body.strip_suffix('#').unwrap_or(body);
    }
    body
}

enum DocMatch {
    Doc(String),
    RunMember,
    NotDoc,
}

fn recognize_doc(node: Node, source: &[u8], styles: &[DocStyle]) -> DocMatch {
    let raw = text(node, source);
    let trimmed = raw.trim();

    for style in styles {
        match *style {
            DocStyle::LeadingString { definitions } => {
                if is_leading_string(node, definitions) {
                    let doc = docs::strip_string_doc(raw);
                    if long_enough(&doc) {
                        return DocMatch::Doc(doc);
                    }
                }
            }
            DocStyle::Block { open, close } => {
                if trimmed.len() >= open.len() + close.len()
                    && trimmed.starts_with(open)
                    && trimmed.ends_with(close)
                {
                    let doc = docs::strip_block(trimmed, open, close);
                    if long_enough(&doc) {
                        return DocMatch::Doc(doc);
                    }
                }
            }
            DocStyle::TaggedBlock { tags } => {
                if trimmed.len() >= 4
                    && trimmed.starts_with("/*")
                    && trimmed.ends_with("*/")
                    && tags.iter().any(|t| trimmed.contains(t))
                {
                    let doc = docs::strip_block(trimmed, "/*", "*/");
                    if long_enough(&doc) {
                        return DocMatch::Doc(doc);
                    }
                }
            }
            DocStyle::LineRun { prefix, before } => {
                if !docs::has_line_prefix(trimmed, prefix) {
                    continue;
                }
                let run = comment_run(node, source, prefix);
                let Some(&head) = run.first() else {
                    continue;
                };
                if let Some(kinds) = before {
                    if !precedes_declaration(&run, kinds) {
                        continue;
                    }
                }
                let doc = docs::join_lines(run.iter().map(|n| text(*n, source)), prefix);
                if long_enough(&doc) {
                    return if head == node {
                        DocMatch::Doc(doc)
                    } else {
                        DocMatch::RunMember
                    };
                }
            }
        }
    }
    DocMatch::NotDoc
}

fn long_enough(doc: &str) -> bool {
    char_len(doc) > MIN_DOCSTRING_LEN
}

/// A string that is the first statement of a module or of a listed
/// definition's body.
fn is_leading_string(node: Node, definitions: &[&str]) -> bool {
    let Some(statement) = node.parent() else {
        return false;
    };
    if statement.kind() != "expression_statement" || statement.named_child_count() != 1 {
        return false;
    }
    let Some(body) = statement.parent() else {
        return false;
    };
    let owned = match body.kind() {
        "module" => true,
        "block" => body
            .parent()
            .is_some_and(|def| definitions.contains(&def.kind())),
        _ => false,
    };
    if !owned {
        return false;
    }

    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|c| c.kind() != "comment");
    first == Some(statement)
}

/// The maximal run of same-kind comments on consecutive lines that share
/// `prefix` and contains `node`, in source order.
fn comment_run<'t>(node: Node<'t>, source: &[u8], prefix: &str) -> Vec<Node<'t>> {
    let linked = |a: Node, b: Node| {
        a.kind() == b.kind()
            && b.start_position().row == a.start_position().row + 1
            && docs::has_line_prefix(text(a, source), prefix)
            && docs::has_line_prefix(text(b, source), prefix)
    };

    let mut head = node;
    while let Some(prev) = head.prev_sibling() {
        if !linked(prev, head) {
            break;
        }
        head = prev;
    }

    let mut run = vec![head];
    let mut tail = head;
    while let Some(next) = tail.next_sibling() {
        if !linked(tail, next) {
            break;
        }
        run.push(next);
        tail = next;
    }
    run
}

/// Whether the node following the run is one of `kinds` on the next line.
fn precedes_declaration(run: &[Node], kinds: &[&str]) -> bool {
    let Some(last) = run.last() else {
        return false;
    };
    last.next_named_sibling().is_some_and(|next| {
        kinds.contains(&next.kind()) && next.start_position().row <= last.start_position().row + 1
    })
}
