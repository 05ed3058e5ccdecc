//! Pattern-based extraction for sources without a usable grammar.
//!
//! Less precise than the syntax path but total: any input in any language
//! produces a normalised result. Literals and comments are found by a single
//! left-to-right tokenizer per language family, so a `//` inside a string or
//! a quote inside a comment does not derail the scan. Declarations are then
//! matched against a copy of the source with those tokens blanked out.

use lazy_static::lazy_static;
use regex::Regex;

use crate::extract::{has_line_prefix, join_lines, strip_block};
use crate::features::{char_len, CodeFeatures, Slot, MIN_DOCSTRING_LEN};
use crate::language::Language;

lazy_static! {
    /// `#` comments, triple-quoted docstrings and quoted strings.
    static ref HASH_TOKENS: Regex = Regex::new(
        r#"(?P<doc>"""(?s:.*?)"""|'''(?s:.*?)''')|(?P<line>#[^\n]*)|(?P<str>"(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*')"#
    ).unwrap();

    /// `//` and `/* */` comments, quoted strings and backtick templates.
    static ref C_TOKENS: Regex = Regex::new(
        r#"(?P<block>/\*(?s:.*?)\*/)|(?P<line>//[^\n]*)|(?P<str>"(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*'|`(?:[^`\\]|\\.)*`)"#
    ).unwrap();

    /// Like `C_TOKENS`, but `'` only opens a one-character literal so
    /// lifetimes such as `'a` are left in the code.
    static ref RUST_TOKENS: Regex = Regex::new(
        r#"(?P<block>/\*(?s:.*?)\*/)|(?P<line>//[^\n]*)|(?P<str>"(?:[^"\\]|\\.)*"|'(?:[^'\\\n]|\\(?:u\{[0-9A-Fa-f]{1,6}\}|x[0-9A-Fa-f]{2}|.))')"#
    ).unwrap();

    static ref PY_DEF: Regex = Regex::new(r"(?m)^[ \t]*(?:async[ \t]+)?def[ \t]+([A-Za-z_]\w*)").unwrap();
    static ref PY_CLASS: Regex = Regex::new(r"(?m)^[ \t]*class[ \t]+([A-Za-z_]\w*)").unwrap();
    static ref PY_ASSIGN: Regex = Regex::new(r"(?m)^[ \t]*([A-Za-z_]\w*)[ \t]*=[^=]").unwrap();
    static ref PY_IMPORT: Regex =
        Regex::new(r"(?m)^[ \t]*((?:from[ \t]+[\w.]+[ \t]+)?import[ \t]+[^\n]+)").unwrap();

    static ref RUBY_DEF: Regex =
        Regex::new(r"(?m)^[ \t]*def[ \t]+(?:self\.)?([A-Za-z_]\w*[?!=]?)").unwrap();
    static ref RUBY_CLASS: Regex =
        Regex::new(r"(?m)^[ \t]*(?:class|module)[ \t]+([A-Z]\w*(?:::[A-Z]\w*)*)").unwrap();
    static ref RUBY_REQUIRE: Regex =
        Regex::new(r"(?m)^[ \t]*((?:require_relative|require|load)\b[^\n]*)").unwrap();

    static ref JS_FUNCTION: Regex =
        Regex::new(r"\bfunction\b[ \t]*\*?[ \t]*([A-Za-z_$][\w$]*)").unwrap();
    static ref JS_CLASS: Regex =
        Regex::new(r"\b(?:class|interface)[ \t]+([A-Za-z_$][\w$]*)").unwrap();
    static ref JS_VARIABLE: Regex =
        Regex::new(r"\b(?:const|let|var)[ \t]+([A-Za-z_$][\w$]*)").unwrap();
    static ref JS_IMPORT: Regex = Regex::new(r"(?m)^[ \t]*(import\b[^\n]*)").unwrap();

    static ref JAVA_METHOD: Regex = Regex::new(
        r"(?m)^[ \t]*(?:(?:public|private|protected|static|final|abstract|synchronized|native|default)[ \t]+)*[\w<>\[\],.?]+[ \t]+(\w+)[ \t]*\([^)]*\)[ \t]*(?:throws[ \t]+[\w., \t]+)?\{"
    ).unwrap();
    static ref JAVA_CLASS: Regex =
        Regex::new(r"\b(?:class|interface|enum|record)[ \t]+([A-Za-z_]\w*)").unwrap();
    static ref JAVA_IMPORT: Regex =
        Regex::new(r"(?m)^[ \t]*(import[ \t]+(?:static[ \t]+)?[\w.*]+[ \t]*;)").unwrap();

    static ref C_FUNCTION: Regex = Regex::new(
        r"(?m)^[A-Za-z_][\w \t*&:<>,]*?[ \t*&]([A-Za-z_]\w*(?:::~?[A-Za-z_]\w*)*)[ \t]*\([^;{}]*\)[ \t]*(?:const[ \t]*)?\{"
    ).unwrap();
    static ref C_CLASS: Regex =
        Regex::new(r"\b(?:class|struct|union|enum)[ \t]+([A-Za-z_]\w*)").unwrap();
    static ref C_INCLUDE: Regex =
        Regex::new(r#"(?m)^[ \t]*(#[ \t]*include[ \t]*[<"][^>"\n]+[>"])"#).unwrap();

    static ref GO_FUNC: Regex = Regex::new(r"(?m)^func[ \t]+([A-Za-z_]\w*)").unwrap();
    static ref GO_METHOD: Regex =
        Regex::new(r"(?m)^func[ \t]*\([^)]*\)[ \t]*([A-Za-z_]\w*)").unwrap();
    static ref GO_TYPE: Regex = Regex::new(r"(?m)^[ \t]*type[ \t]+([A-Za-z_]\w*)").unwrap();
    static ref GO_SHORT_VAR: Regex = Regex::new(r"([A-Za-z_]\w*)[ \t]*:=").unwrap();
    static ref GO_IMPORT: Regex =
        Regex::new(r"(?m)^(import[ \t]*(?:\([^)]*\)|[^\n]+))").unwrap();

    static ref RUST_FN: Regex = Regex::new(r"\bfn[ \t]+([A-Za-z_]\w*)").unwrap();
    static ref RUST_TYPE: Regex =
        Regex::new(r"\b(?:struct|enum|trait|union)[ \t]+([A-Za-z_]\w*)").unwrap();
    static ref RUST_LET: Regex = Regex::new(r"\blet[ \t]+(?:mut[ \t]+)?([a-z_]\w*)").unwrap();
    static ref RUST_USE: Regex =
        Regex::new(r"(?m)^[ \t]*((?:pub(?:\([^)]*\))?[ \t]+)?use[ \t]+[^;]+;)").unwrap();

    static ref PHP_FUNCTION: Regex = Regex::new(r"\bfunction[ \t]+&?([A-Za-z_]\w*)").unwrap();
    static ref PHP_CLASS: Regex =
        Regex::new(r"\b(?:class|interface|trait|enum)[ \t]+([A-Za-z_]\w*)").unwrap();
    static ref PHP_VARIABLE: Regex = Regex::new(r"(\$[A-Za-z_]\w*)[ \t]*=[^=>]").unwrap();
    static ref PHP_IMPORT: Regex = Regex::new(
        r"(?m)^[ \t]*((?:require_once|require|include_once|include)\b[^;\n]*|use[ \t]+[\w\\]+[^;\n]*;)"
    ).unwrap();

    static ref SCALA_DEF: Regex = Regex::new(r"\bdef[ \t]+([A-Za-z_]\w*)").unwrap();
    static ref SCALA_TYPE: Regex =
        Regex::new(r"\b(?:class|object|trait)[ \t]+([A-Za-z_]\w*)").unwrap();

    static ref SWIFT_FUNC: Regex = Regex::new(r"\bfunc[ \t]+([A-Za-z_]\w*)").unwrap();
    static ref SWIFT_TYPE: Regex =
        Regex::new(r"\b(?:class|struct|protocol|enum)[ \t]+([A-Za-z_]\w*)").unwrap();
}

/// Control keywords that declaration patterns can mistake for names.
const KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "sizeof", "else", "do", "new",
];

const PHPDOC_TAGS: &[&str] = &["@param", "@return", "@throws", "@var", "@author"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Hash,
    CLike,
    Opaque,
}

impl Family {
    fn of(language: Language) -> Self {
        match language {
            Language::Python | Language::Ruby => Family::Hash,
            Language::Unknown => Family::Opaque,
            _ => Family::CLike,
        }
    }
}

/// Extract normalised features from `source` with patterns only.
///
/// Unknown languages yield an empty record.
pub fn extract(source: &str, language: Language, file_path: Option<&str>) -> CodeFeatures {
    let mut features = CodeFeatures::empty(language, file_path);
    let tokens = match Family::of(language) {
        Family::Hash => &*HASH_TOKENS,
        Family::CLike if language == Language::Rust => &*RUST_TOKENS,
        Family::CLike => &*C_TOKENS,
        Family::Opaque => return features,
    };

    let views = scan_tokens(source, tokens, language, &mut features);
    for (slot, pattern) in declaration_patterns(language) {
        let text = match slot {
            Slot::Import => &views.without_comments,
            _ => &views.code,
        };
        for caps in pattern.captures_iter(text) {
            let Some(name) = caps.get(1) else {
                continue;
            };
            let name = name.as_str().trim();
            if matches!(slot, Slot::Function | Slot::Method) && KEYWORDS.contains(&name) {
                continue;
            }
            features.push(slot, name);
        }
    }

    features.normalized()
}

/// Source copies with tokens blanked. Newlines survive so line anchors in
/// declaration patterns keep working.
struct Views {
    /// Comments and literals blanked.
    code: String,
    /// Only comments blanked.
    without_comments: String,
}

fn scan_tokens(
    source: &str,
    tokens: &Regex,
    language: Language,
    features: &mut CodeFeatures,
) -> Views {
    let mut views = Views {
        code: String::with_capacity(source.len()),
        without_comments: String::with_capacity(source.len()),
    };
    let mut runs = LineDocRuns::new(language);
    let mut last = 0;
    let mut line = 0;

    for caps in tokens.captures_iter(source) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let gap = &source[last..whole.start()];
        line += gap.matches('\n').count();
        views.code.push_str(gap);
        views.without_comments.push_str(gap);
        views.code.push_str(&blank(whole.as_str()));

        if let Some(s) = caps.name("str") {
            runs.flush(features);
            views.without_comments.push_str(s.as_str());
            features.push(Slot::String, s.as_str());
        } else {
            views.without_comments.push_str(&blank(whole.as_str()));
            if let Some(doc) = caps.name("doc") {
                runs.flush(features);
                push_triple_quoted(doc.as_str(), features);
            } else if let Some(block) = caps.name("block") {
                runs.flush(features);
                push_block_comment(block.as_str(), language, features);
            } else if let Some(comment) = caps.name("line") {
                runs.push(comment.as_str(), line, features);
            }
        }

        line += whole.as_str().matches('\n').count();
        last = whole.end();
    }
    runs.flush(features);

    let rest = &source[last..];
    views.code.push_str(rest);
    views.without_comments.push_str(rest);
    views
}

/// Replace everything but newlines with spaces.
fn blank(text: &str) -> String {
    text.chars()
        .map(|c| if c == '\n' { '\n' } else { ' ' })
        .collect()
}

fn long_enough(doc: &str) -> bool {
    char_len(doc) > MIN_DOCSTRING_LEN
}

fn push_triple_quoted(text: &str, features: &mut CodeFeatures) {
    let doc = text[3..text.len() - 3].trim();
    if long_enough(doc) {
        features.push(Slot::Docstring, doc);
    } else {
        features.push(Slot::String, text);
    }
}

fn push_block_comment(text: &str, language: Language, features: &mut CodeFeatures) {
    let doc = if text.len() >= 5 && (text.starts_with("/**") || text.starts_with("/*!")) {
        Some(strip_block(text, &text[..3], "*/"))
    } else if language == Language::Php && PHPDOC_TAGS.iter().any(|t| text.contains(t)) {
        Some(strip_block(text, "/*", "*/"))
    } else {
        None
    };

    match doc {
        Some(doc) if long_enough(&doc) => features.push(Slot::Docstring, doc),
        _ => features.push(Slot::Comment, text),
    }
}

/// Groups `///` and `//!` comments on consecutive lines into one docstring
/// for languages that use that convention.
struct LineDocRuns<'s> {
    enabled: bool,
    prefix: &'static str,
    members: Vec<&'s str>,
    last_line: usize,
}

impl<'s> LineDocRuns<'s> {
    fn new(language: Language) -> Self {
        Self {
            enabled: matches!(language, Language::C | Language::Cpp | Language::Rust),
            prefix: "",
            members: Vec::new(),
            last_line: 0,
        }
    }

    fn push(&mut self, comment: &'s str, line: usize, features: &mut CodeFeatures) {
        let prefix = ["///", "//!"]
            .into_iter()
            .find(|p| self.enabled && has_line_prefix(comment, p));
        let Some(prefix) = prefix else {
            self.flush(features);
            features.push(Slot::Comment, comment);
            return;
        };

        let continues =
            !self.members.is_empty() && self.prefix == prefix && self.last_line + 1 == line;
        if !continues {
            self.flush(features);
            self.prefix = prefix;
        }
        self.members.push(comment);
        self.last_line = line;
    }

    fn flush(&mut self, features: &mut CodeFeatures) {
        if self.members.is_empty() {
            return;
        }
        let doc = join_lines(self.members.iter().copied(), self.prefix);
        if long_enough(&doc) {
            features.push(Slot::Docstring, doc);
        } else {
            for member in &self.members {
                features.push(Slot::Comment, *member);
            }
        }
        self.members.clear();
    }
}

fn declaration_patterns(language: Language) -> Vec<(Slot, &'static Regex)> {
    match language {
        Language::Python => vec![
            (Slot::Function, &*PY_DEF),
            (Slot::Class, &*PY_CLASS),
            (Slot::Variable, &*PY_ASSIGN),
            (Slot::Import, &*PY_IMPORT),
        ],
        Language::Ruby => vec![
            (Slot::Method, &*RUBY_DEF),
            (Slot::Class, &*RUBY_CLASS),
            (Slot::Import, &*RUBY_REQUIRE),
        ],
        Language::JavaScript | Language::TypeScript | Language::Tsx => vec![
            (Slot::Function, &*JS_FUNCTION),
            (Slot::Class, &*JS_CLASS),
            (Slot::Variable, &*JS_VARIABLE),
            (Slot::Import, &*JS_IMPORT),
        ],
        Language::Java => vec![
            (Slot::Method, &*JAVA_METHOD),
            (Slot::Class, &*JAVA_CLASS),
            (Slot::Import, &*JAVA_IMPORT),
        ],
        Language::C | Language::Cpp => vec![
            (Slot::Function, &*C_FUNCTION),
            (Slot::Class, &*C_CLASS),
            (Slot::Import, &*C_INCLUDE),
        ],
        Language::Go => vec![
            (Slot::Function, &*GO_FUNC),
            (Slot::Method, &*GO_METHOD),
            (Slot::Class, &*GO_TYPE),
            (Slot::Variable, &*GO_SHORT_VAR),
            (Slot::Import, &*GO_IMPORT),
        ],
        Language::Rust => vec![
            (Slot::Function, &*RUST_FN),
            (Slot::Class, &*RUST_TYPE),
            (Slot::Variable, &*RUST_LET),
            (Slot::Import, &*RUST_USE),
        ],
        Language::Php => vec![
            (Slot::Function, &*PHP_FUNCTION),
            (Slot::Class, &*PHP_CLASS),
            (Slot::Variable, &*PHP_VARIABLE),
            (Slot::Import, &*PHP_IMPORT),
        ],
        Language::Scala => vec![(Slot::Function, &*SCALA_DEF), (Slot::Class, &*SCALA_TYPE)],
        Language::Swift => vec![(Slot::Function, &*SWIFT_FUNC), (Slot::Class, &*SWIFT_TYPE)],
        Language::Unknown => Vec::new(),
    }
}
