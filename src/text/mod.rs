//! Text-level primitives shared by every rule.
//!
//! Statement texts are compared as plain strings, including their trailing
//! terminators (`;\n`). Nothing here knows about the code model.
//!
//! # Pieces
//!
//! - [`prefix_suffix`]: common prefix/suffix and the middle diff
//! - [`tokens`]: regex splitters and token-boundary search/replace
//! - [`levenshtein`]: edit distance
//! - [`diff`]: inline diff rendering for trace logs

pub mod diff;
pub mod levenshtein;
pub mod prefix_suffix;
pub mod tokens;

pub use prefix_suffix::{MiddleDiff, common_prefix, common_suffix};
pub use tokens::{
    contains_token, keep_reserved_tokens, perform_replacement, split_comma, split_concat,
    split_conditional, split_tab,
};

/// Statement terminator as emitted by the code model.
pub const STATEMENT_TERMINATION: &str = ";\n";

/// Prefix of a return statement.
pub const RETURN_SPACE: &str = "return ";

pub const THROW_SPACE: &str = "throw ";

pub const THIS_DOT: &str = "this.";

/// Assignment operator as printed by the code model (no surrounding spaces).
pub const ASSIGNMENT: &str = "=";

/// Returns `true` for characters that may appear inside a Java identifier.
pub fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Number of space characters in `s`.
pub fn count_spaces(s: &str) -> usize {
    s.chars().filter(|&c| c == ' ').count()
}

/// Number of `+` and `-` characters in `s`.
pub fn count_operators(s: &str) -> usize {
    s.chars().filter(|&c| c == '+' || c == '-').count()
}

/// Returns `true` if `s` is a numeric literal (`0`, `1L`, `0x1F`, `2.5f`, ...).
pub fn is_number_literal(s: &str) -> bool {
    let body = s.strip_prefix('-').unwrap_or(s);
    let mut chars = body.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => {}
        _ => return false,
    }
    body.chars().all(|c| {
        c.is_ascii_hexdigit() || matches!(c, '.' | '_' | 'x' | 'X' | 'l' | 'L' | 'f' | 'F' | 'd' | 'D')
    })
}

/// Split a camelCase or PascalCase identifier into its words.
///
/// `getFooBar` → `get`, `Foo`, `Bar`; `HTTPServer` → `HTTP`, `Server`.
pub fn camel_case_split(s: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = s.char_indices().collect();
    let mut parts = Vec::new();
    let mut start = 0;
    for i in 1..chars.len() {
        let (offset, c) = chars[i];
        if !c.is_uppercase() {
            continue;
        }
        let prev_upper = chars[i - 1].1.is_uppercase();
        let next_lower = chars.get(i + 1).is_some_and(|&(_, n)| n.is_lowercase());
        if !prev_upper || next_lower {
            parts.push(&s[start..offset]);
            start = offset;
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Strip the outer `"` characters from a string literal token, if present.
pub fn unquote(s: &str) -> &str {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}
