//! Text cleanup for documentation comments and docstrings.
//!
//! These helpers operate on raw source text and are shared by the syntax
//! walker and the pattern fallback.

const STRING_PREFIXES: &[char] = &['r', 'R', 'u', 'U', 'b', 'B', 'f', 'F'];
const DOC_QUOTES: &[&str] = &["\"\"\"", "'''", "\"", "'"];

/// Strip a Python-style string docstring down to its content.
pub fn strip_string_doc(text: &str) -> String {
    let body = text.trim().trim_start_matches(STRING_PREFIXES);
    for quote in DOC_QUOTES {
        if body.len() >= quote.len() * 2 && body.starts_with(quote) && body.ends_with(quote) {
            return body[quote.len()..body.len() - quote.len()].trim().to_string();
        }
    }
    body.trim().to_string()
}

/// Strip block comment delimiters and the leading `*` gutter on each line.
pub fn strip_block(text: &str, open: &str, close: &str) -> String {
    let text = text.trim();
    let inner = text
        .strip_prefix(open)
        .and_then(|t| t.strip_suffix(close))
        .unwrap_or(text);

    inner
        .lines()
        .map(|line| {
            let line = line.trim();
            line.strip_prefix('*').map(str::trim_start).unwrap_or(line)
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whether `text` is a line comment of the `prefix` convention.
///
/// A three-slash prefix followed by another slash (`////`) is an ordinary
/// comment in Rust and Doxygen, not part of a doc run.
pub fn has_line_prefix(text: &str, prefix: &str) -> bool {
    let Some(rest) = text.trim_start().strip_prefix(prefix) else {
        return false;
    };
    !(prefix == "///" && rest.starts_with('/'))
}

/// Strip a line comment prefix plus one following space.
pub fn strip_line<'a>(text: &'a str, prefix: &str) -> &'a str {
    let text = text.trim();
    let rest = text.strip_prefix(prefix).unwrap_or(text);
    rest.strip_prefix(' ').unwrap_or(rest).trim_end()
}

/// Join the stripped lines of a comment run.
pub fn join_lines<'a, I>(lines: I, prefix: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .map(|l| strip_line(l, prefix))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
