//! Statement tokenizers and token-boundary search/replace.

use std::sync::LazyLock;

use regex::Regex;

use super::is_identifier_char;

static SPLIT_CONDITIONAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"( \|\| )|( && )|( \? )|( : )").expect("invalid regex"));

static SPLIT_CONCAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*( \+ )\s*").expect("invalid regex"));

static SPLIT_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*,\s*").expect("invalid regex"));

static SPLIT_TAB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\\t\s*").expect("invalid regex"));

/// Split on `regex`, dropping trailing empty pieces.
fn split_keep_order<'a>(regex: &Regex, s: &'a str) -> Vec<&'a str> {
    let mut parts: Vec<&str> = regex.split(s).collect();
    while parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    parts
}

/// Split a boolean expression into sub-conditions on `||`, `&&`, `?` and `:`.
///
/// Sub-conditions are trimmed.
pub fn split_conditional(s: &str) -> Vec<&str> {
    split_keep_order(&SPLIT_CONDITIONAL, s)
        .into_iter()
        .map(str::trim)
        .collect()
}

/// Split a string concatenation on ` + `.
pub fn split_concat(s: &str) -> Vec<&str> {
    split_keep_order(&SPLIT_CONCAT, s)
}

/// Split an argument list on `,`.
pub fn split_comma(s: &str) -> Vec<&str> {
    split_keep_order(&SPLIT_COMMA, s)
}

/// Split on literal `\t` escape sequences.
pub fn split_tab(s: &str) -> Vec<&str> {
    split_keep_order(&SPLIT_TAB, s)
}

/// Byte offsets of every occurrence of `sub` in `text` that is not glued to
/// a neighbouring identifier character.
fn token_occurrences(text: &str, sub: &str) -> Vec<usize> {
    if sub.is_empty() {
        return Vec::new();
    }
    let starts_ident = sub.chars().next().is_some_and(is_identifier_char);
    let ends_ident = sub.chars().next_back().is_some_and(is_identifier_char);
    text.match_indices(sub)
        .map(|(i, _)| i)
        .filter(|&i| {
            let before_ok = !starts_ident
                || text[..i].chars().next_back().is_none_or(|c| !is_identifier_char(c));
            let after_ok = !ends_ident
                || text[i + sub.len()..]
                    .chars()
                    .next()
                    .is_none_or(|c| !is_identifier_char(c));
            before_ok && after_ok
        })
        .collect()
}

/// Returns `true` if `sub` occurs in `text` as a whole token.
///
/// `contains_token("a.b + x", "x")` is true; `contains_token("xs", "x")` is not.
pub fn contains_token(text: &str, sub: &str) -> bool {
    !token_occurrences(text, sub).is_empty()
}

/// Replace every whole-token occurrence of `sub` in `text` with `replacement`.
pub fn perform_replacement(text: &str, sub: &str, replacement: &str) -> String {
    if text == sub {
        return replacement.to_owned();
    }
    let occurrences = token_occurrences(text, sub);
    if occurrences.is_empty() {
        return text.to_owned();
    }
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for start in occurrences {
        if start < last {
            continue;
        }
        out.push_str(&text[last..start]);
        out.push_str(replacement);
        last = start + sub.len();
    }
    out.push_str(&text[last..]);
    out
}

/// Drop identifiers, literals and whitespace, keeping punctuation only.
///
/// Two calls with the same shape (`f(a, g(b))` and `h(x, y(z))`) reduce to
/// the same string.
pub fn keep_reserved_tokens(s: &str) -> String {
    let mut in_string = false;
    let mut out = String::new();
    for c in s.chars() {
        if c == '"' {
            in_string = !in_string;
            continue;
        }
        if in_string || c.is_whitespace() || is_identifier_char(c) {
            continue;
        }
        out.push(c);
    }
    out
}

/// Returns `true` if byte offset `at` falls inside a `"..."` literal.
pub fn is_inside_double_quotes(s: &str, at: usize) -> bool {
    s[..at].matches('"').count() % 2 == 1
}

/// Returns `true` if byte offset `at` falls inside a `'...'` literal.
pub fn is_inside_single_quotes(s: &str, at: usize) -> bool {
    s[..at].matches('\'').count() % 2 == 1
}
