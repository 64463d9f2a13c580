//! Tunable thresholds.

use serde::{Deserialize, Serialize};

/// Numeric knobs used by the rule families. Every field has a default, so
/// a partial JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicsConfig {
    /// Upper bound on the spaces in the prefix a declaration may add in
    /// front of an assignment (`final Type x = ...`).
    pub max_declaration_prefix_spaces: usize,
    /// Normalized edit distance allowed between a concatenation and a text
    /// block holding the same text.
    pub text_block_max_distance_ratio: f64,
    /// Concatenated arguments with at most this many tokens may be matched
    /// positionally against an argument list of the same size.
    pub min_concat_tokens_for_argument_match: usize,
    /// Nesting bound for the anonymous class body search.
    pub anonymous_search_depth: usize,
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            max_declaration_prefix_spaces: 2,
            text_block_max_distance_ratio: 0.1,
            min_concat_tokens_for_argument_match: 2,
            anonymous_search_depth: 8,
        }
    }
}
