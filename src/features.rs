//! The `CodeFeatures` record and its normalisation rules.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::language::Language;

/// Strings must be longer than this after quote stripping.
pub const MIN_STRING_LEN: usize = 2;
/// Comments must be longer than this after trimming.
pub const MIN_COMMENT_LEN: usize = 5;
/// Docstrings must be longer than this after trimming.
pub const MIN_DOCSTRING_LEN: usize = 10;

const QUOTE_CHARS: &[char] = &['"', '\'', '`'];

/// Feature slot a captured value is appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    String,
    Function,
    Variable,
    Class,
    Method,
    Comment,
    Docstring,
    Import,
}

impl Slot {
    pub const ALL: [Slot; 8] = [
        Slot::String,
        Slot::Function,
        Slot::Variable,
        Slot::Class,
        Slot::Method,
        Slot::Comment,
        Slot::Docstring,
        Slot::Import,
    ];
}

/// Structural features extracted from one source buffer.
///
/// Every list has set semantics once normalised: no duplicates, no entries
/// at or under the slot's length threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeFeatures {
    pub strings: Vec<String>,
    pub function_names: Vec<String>,
    pub variable_names: Vec<String>,
    pub comments: Vec<String>,
    pub docstrings: Vec<String>,
    pub class_names: Vec<String>,
    pub method_names: Vec<String>,
    pub imports: Vec<String>,
    pub language: Language,
    #[serde(default)]
    pub file_path: Option<String>,
}

impl CodeFeatures {
    /// Create an empty feature set.
    pub fn empty(language: Language, file_path: Option<&str>) -> Self {
        Self {
            strings: Vec::new(),
            function_names: Vec::new(),
            variable_names: Vec::new(),
            comments: Vec::new(),
            docstrings: Vec::new(),
            class_names: Vec::new(),
            method_names: Vec::new(),
            imports: Vec::new(),
            language,
            file_path: file_path.map(str::to_string),
        }
    }

    /// Append a raw value to a slot. No filtering happens until `normalize`.
    pub fn push(&mut self, slot: Slot, value: impl Into<String>) {
        self.slot_mut(slot).push(value.into());
    }

    pub fn slot(&self, slot: Slot) -> &[String] {
        match slot {
            Slot::String => &self.strings,
            Slot::Function => &self.function_names,
            Slot::Variable => &self.variable_names,
            Slot::Class => &self.class_names,
            Slot::Method => &self.method_names,
            Slot::Comment => &self.comments,
            Slot::Docstring => &self.docstrings,
            Slot::Import => &self.imports,
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Vec<String> {
        match slot {
            Slot::String => &mut self.strings,
            Slot::Function => &mut self.function_names,
            Slot::Variable => &mut self.variable_names,
            Slot::Class => &mut self.class_names,
            Slot::Method => &mut self.method_names,
            Slot::Comment => &mut self.comments,
            Slot::Docstring => &mut self.docstrings,
            Slot::Import => &mut self.imports,
        }
    }

    /// Whether every list field is empty.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
            && self.function_names.is_empty()
            && self.variable_names.is_empty()
            && self.comments.is_empty()
            && self.docstrings.is_empty()
            && self.class_names.is_empty()
            && self.method_names.is_empty()
            && self.imports.is_empty()
    }

    /// Clean every slot in place. Safe to call repeatedly.
    pub fn normalize(&mut self) {
        normalize_strings(&mut self.strings);
        normalize_trimmed(&mut self.comments, MIN_COMMENT_LEN);
        normalize_trimmed(&mut self.docstrings, MIN_DOCSTRING_LEN);
        dedup(&mut self.function_names);
        dedup(&mut self.variable_names);
        dedup(&mut self.class_names);
        dedup(&mut self.method_names);
        dedup(&mut self.imports);
    }

    /// Consume and return the normalised form.
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }
}

/// Remove the surrounding run of quote characters from a literal.
pub fn strip_quotes(s: &str) -> &str {
    s.trim_matches(QUOTE_CHARS)
}

pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn normalize_strings(values: &mut Vec<String>) {
    let stripped = values
        .drain(..)
        .map(|s| strip_quotes(&s).to_string())
        .filter(|s| char_len(s) > MIN_STRING_LEN)
        .collect();
    *values = stripped;
    dedup(values);
}

fn normalize_trimmed(values: &mut Vec<String>, min_len: usize) {
    let trimmed = values
        .drain(..)
        .map(|s| s.trim().to_string())
        .filter(|s| char_len(s) > min_len)
        .collect();
    *values = trimmed;
    dedup(values);
}

/// Deduplicate keeping the first occurrence.
fn dedup(values: &mut Vec<String>) {
    let mut seen = HashSet::with_capacity(values.len());
    values.retain(|v| seen.insert(v.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noisy() -> CodeFeatures {
        let mut f = CodeFeatures::empty(Language::Python, Some("x.py"));
        f.push(Slot::String, "\"hello\"");
        f.push(Slot::String, "'hello'");
        f.push(Slot::String, "\"ab\"");
        f.push(Slot::String, "`template`");
        f.push(Slot::Comment, "  # hi ");
        f.push(Slot::Comment, "# a longer comment");
        f.push(Slot::Comment, "# a longer comment   ");
        f.push(Slot::Docstring, "tiny doc");
        f.push(Slot::Docstring, "  A properly long docstring.  ");
        f.push(Slot::Function, "run");
        f.push(Slot::Function, "run");
        f.push(Slot::Function, "go");
        f.push(Slot::Import, "import os");
        f.push(Slot::Import, "import os");
        f
    }

    #[test]
    fn test_normalize_filters_and_dedups() {
        let f = noisy().normalized();

        assert_eq!(f.strings, vec!["hello", "template"]);
        assert_eq!(f.comments, vec!["# a longer comment"]);
        assert_eq!(f.docstrings, vec!["A properly long docstring."]);
        // Names have no length filter.
        assert_eq!(f.function_names, vec!["run", "go"]);
        assert_eq!(f.imports, vec!["import os"]);
        assert_eq!(f.file_path.as_deref(), Some("x.py"));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = noisy().normalized();
        let twice = once.clone().normalized();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_nested_quotes_strip_in_one_pass() {
        let mut f = CodeFeatures::empty(Language::Python, None);
        f.push(Slot::String, "\"'quoted'\"");
        f.push(Slot::String, "\"\"\"triple\"\"\"");
        let f = f.normalized();
        assert_eq!(f.strings, vec!["quoted", "triple"]);
    }

    #[test]
    fn test_lengths_counted_in_chars() {
        let mut f = CodeFeatures::empty(Language::Python, None);
        // Three scalar values, more than three bytes.
        f.push(Slot::String, "\"äöü\"");
        f.push(Slot::String, "\"éé\"");
        let f = f.normalized();
        assert_eq!(f.strings, vec!["äöü"]);
    }

    #[test]
    fn test_empty() {
        let f = CodeFeatures::empty(Language::Go, None);
        assert!(f.is_empty());
        assert_eq!(f.language, Language::Go);
    }

    #[test]
    fn test_serializes_flat_record() {
        let mut f = CodeFeatures::empty(Language::Rust, Some("lib.rs"));
        f.push(Slot::Function, "main");
        let value = serde_json::to_value(&f).unwrap();
        assert_eq!(value["language"], "rust");
        assert_eq!(value["file_path"], "lib.rs");
        assert_eq!(value["function_names"][0], "main");
        assert!(value["strings"].as_array().unwrap().is_empty());
    }
}
