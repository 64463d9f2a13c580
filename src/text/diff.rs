//! Inline diff rendering using the `similar` crate.
//!
//! Only used to make rule traces readable; no rule decision depends on it.

use similar::{Algorithm, ChangeTag, TextDiff};

/// Render a word-level inline diff of two statement texts.
///
/// Deleted words appear as `[-old-]`, inserted words as `{+new+}`. Uses the
/// Patience algorithm which keeps shared tokens aligned on code.
pub fn render_pair(before: &str, after: &str) -> String {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Patience)
        .diff_words(before.trim_end(), after.trim_end());

    let mut out = String::new();
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Equal => out.push_str(change.value()),
            ChangeTag::Delete => {
                out.push_str("[-");
                out.push_str(change.value());
                out.push_str("-]");
            }
            ChangeTag::Insert => {
                out.push_str("{+");
                out.push_str(change.value());
                out.push_str("+}");
            }
        }
    }
    out
}
