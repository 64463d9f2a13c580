//! Common prefix/suffix extraction and the middle diff.
//!
//! Prefix and suffix are computed independently, so for short inputs they
//! may overlap. [`MiddleDiff`] reports an empty diff when the stripping
//! indices cross and keeps the raw indices so callers can re-append the
//! overlapping part of the suffix.

use super::is_identifier_char;

/// Longest common prefix of `a` and `b`, compared by code point.
pub fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let len = a
        .char_indices()
        .zip(b.chars())
        .take_while(|((_, ca), cb)| ca == cb)
        .last()
        .map_or(0, |((i, c), _)| i + c.len_utf8());
    &a[..len]
}

/// Longest common suffix of `a` and `b`, compared by code point.
pub fn common_suffix<'a>(a: &'a str, b: &str) -> &'a str {
    let start = a
        .char_indices()
        .rev()
        .zip(b.chars().rev())
        .take_while(|((_, ca), cb)| ca == cb)
        .last()
        .map_or(a.len(), |((i, _), _)| i);
    &a[start..]
}

/// The part of two texts left over after stripping their common prefix and
/// suffix.
///
/// `begin*`/`end*` are byte offsets into the respective text. When
/// `begin > end` the prefix and suffix overlap and the diff is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MiddleDiff<'a> {
    pub prefix: &'a str,
    pub suffix: &'a str,
    pub diff1: &'a str,
    pub diff2: &'a str,
    pub begin1: usize,
    pub end1: usize,
    pub begin2: usize,
    pub end2: usize,
}

impl<'a> MiddleDiff<'a> {
    /// Strip the character-level common prefix and suffix.
    pub fn compute(a: &'a str, b: &'a str) -> Self {
        let prefix = common_prefix(a, b);
        let suffix = common_suffix(a, b);
        Self::from_bounds(a, b, prefix.len(), suffix.len())
    }

    /// Like [`compute`](Self::compute), but never cuts through an
    /// identifier: a prefix or suffix that ends mid-token is shortened to
    /// the last token boundary.
    ///
    /// `f(p)` vs `f(p1,p2)` yields diffs `p` and `p1,p2` instead of the
    /// character-level `""` and `1,p2`.
    pub fn token_aligned(a: &'a str, b: &'a str) -> Self {
        let mut prefix_len = common_prefix(a, b).len();
        while prefix_len > 0 && cuts_token_forward(a, b, prefix_len) {
            prefix_len = previous_boundary(a, prefix_len);
        }
        let mut suffix_len = common_suffix(a, b).len();
        while suffix_len > 0 && cuts_token_backward(a, b, suffix_len) {
            suffix_len = next_boundary_from_end(a, suffix_len);
        }
        Self::from_bounds(a, b, prefix_len, suffix_len)
    }

    fn from_bounds(a: &'a str, b: &'a str, prefix_len: usize, suffix_len: usize) -> Self {
        let begin1 = prefix_len;
        let end1 = a.len() - suffix_len;
        let begin2 = prefix_len;
        let end2 = b.len() - suffix_len;
        let diff1 = if begin1 > end1 { "" } else { &a[begin1..end1] };
        let diff2 = if begin2 > end2 { "" } else { &b[begin2..end2] };
        Self {
            prefix: &a[..prefix_len],
            suffix: &a[a.len() - suffix_len..],
            diff1,
            diff2,
            begin1,
            end1,
            begin2,
            end2,
        }
    }

    /// Both prefix and suffix are non-empty.
    pub fn anchored(&self) -> bool {
        !self.prefix.is_empty() && !self.suffix.is_empty()
    }

    /// The pair with both sides exchanged.
    pub fn swapped(&self) -> Self {
        Self {
            prefix: self.prefix,
            suffix: self.suffix,
            diff1: self.diff2,
            diff2: self.diff1,
            begin1: self.begin2,
            end1: self.end2,
            begin2: self.begin1,
            end2: self.end1,
        }
    }
}

fn char_before(s: &str, at: usize) -> Option<char> {
    s[..at].chars().next_back()
}

fn char_at(s: &str, at: usize) -> Option<char> {
    s[at..].chars().next()
}

fn is_ident(c: Option<char>) -> bool {
    c.is_some_and(is_identifier_char)
}

fn cuts_token_forward(a: &str, b: &str, prefix_len: usize) -> bool {
    is_ident(char_before(a, prefix_len))
        && (is_ident(char_at(a, prefix_len)) || is_ident(char_at(b, prefix_len)))
}

fn cuts_token_backward(a: &str, b: &str, suffix_len: usize) -> bool {
    let start_a = a.len() - suffix_len;
    let start_b = b.len() - suffix_len;
    is_ident(char_at(a, start_a))
        && (is_ident(char_before(a, start_a)) || is_ident(char_before(b, start_b)))
}

fn previous_boundary(s: &str, at: usize) -> usize {
    char_before(s, at).map_or(0, |c| at - c.len_utf8())
}

fn next_boundary_from_end(s: &str, suffix_len: usize) -> usize {
    char_at(s, s.len() - suffix_len).map_or(0, |c| suffix_len - c.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_suffix_symmetric() {
        let pairs = [
            ("foo(a, b);\n", "foo(a, c);\n"),
            ("x = 1;\n", "this.x = 1;\n"),
            ("", "abc"),
            ("αβγ", "αβδ"),
        ];
        for (a, b) in pairs {
            assert_eq!(common_prefix(a, b), common_prefix(b, a));
            assert_eq!(common_suffix(a, b), common_suffix(b, a));
        }
    }

    #[test]
    fn test_middle_diff_basic() {
        let d = MiddleDiff::compute("foo(a);\n", "foo(b);\n");
        assert_eq!(d.prefix, "foo(");
        assert_eq!(d.suffix, ");\n");
        assert_eq!(d.diff1, "a");
        assert_eq!(d.diff2, "b");
        assert!(d.anchored());
    }

    #[test]
    fn test_middle_diff_swapped() {
        let a = "return x + 1;\n";
        let b = "return (int) x + 1;\n";
        let forward = MiddleDiff::compute(a, b);
        let backward = MiddleDiff::compute(b, a);
        assert_eq!(forward.swapped().diff1, backward.diff1);
        assert_eq!(forward.swapped().diff2, backward.diff2);
    }

    #[test]
    fn test_middle_diff_crossed() {
        // prefix "aa" and suffix "aa" overlap on the shorter side
        let d = MiddleDiff::compute("aa", "aaa");
        assert!(d.begin1 > d.end1);
        assert_eq!(d.diff1, "");
    }

    #[test]
    fn test_middle_diff_disjoint() {
        let d = MiddleDiff::compute("abc", "xyz");
        assert_eq!(d.prefix, "");
        assert_eq!(d.suffix, "");
        assert_eq!(d.diff1, "abc");
        assert_eq!(d.diff2, "xyz");
        assert!(!d.anchored());
    }

    #[test]
    fn test_token_aligned() {
        let d = MiddleDiff::token_aligned("f(p);\n", "f(p1,p2);\n");
        assert_eq!(d.prefix, "f(");
        assert_eq!(d.diff1, "p");
        assert_eq!(d.diff2, "p1,p2");

        let d = MiddleDiff::token_aligned("f(ab);\n", "f(cb);\n");
        assert_eq!(d.suffix, ");\n");
        assert_eq!(d.diff1, "ab");
        assert_eq!(d.diff2, "cb");
    }
}
