//! Refactoring candidates emitted by the conditional engine.
//!
//! The engine never touches the caller's refactoring set. Candidates are
//! collected on the [`ReplacementInfo`](crate::replacement::ReplacementInfo)
//! together with the already-accepted refactorings they supersede.

use serde::{Deserialize, Serialize};

use crate::model::StatementId;
use crate::replacement::LeafMapping;

/// A conditional-level refactoring detected while comparing one pair.
///
/// Statement ids ending in `1` or named `original`/`merged` live in the
/// side 1 arena; the others live in the side 2 arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionalRefactoring {
    /// One conditional became several sequential ones.
    SplitConditional {
        original: StatementId,
        split: Vec<StatementId>,
        #[serde(default)]
        mappings: Vec<LeafMapping>,
    },
    /// Several sequential conditionals became one.
    MergeConditional {
        merged: Vec<StatementId>,
        new_conditional: StatementId,
        #[serde(default)]
        mappings: Vec<LeafMapping>,
    },
    /// The condition was negated and the branches swapped.
    InvertCondition {
        original: StatementId,
        inverted: StatementId,
    },
    /// An `if` became a ternary expression.
    ReplaceConditionalWithTernary {
        original: StatementId,
        ternary: StatementId,
        #[serde(default)]
        mappings: Vec<LeafMapping>,
    },
    /// A sub-condition was extracted into a local variable.
    ExtractVariable {
        /// Declaring statement on side 2.
        declaration: StatementId,
        variable: String,
        inside_extracted_or_inlined: bool,
        #[serde(default)]
        mappings: Vec<LeafMapping>,
    },
}

impl ConditionalRefactoring {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SplitConditional { .. } => "Split Conditional",
            Self::MergeConditional { .. } => "Merge Conditional",
            Self::InvertCondition { .. } => "Invert Condition",
            Self::ReplaceConditionalWithTernary { .. } => "Replace Conditional With Ternary",
            Self::ExtractVariable { .. } => "Extract Variable",
        }
    }

    /// Same kind and participants; sub-expression mappings are ignored.
    pub fn same_participants(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::SplitConditional { original: o1, split: s1, .. },
                Self::SplitConditional { original: o2, split: s2, .. },
            ) => o1 == o2 && s1 == s2,
            (
                Self::MergeConditional { merged: m1, new_conditional: n1, .. },
                Self::MergeConditional { merged: m2, new_conditional: n2, .. },
            ) => m1 == m2 && n1 == n2,
            (
                Self::InvertCondition { original: o1, inverted: i1 },
                Self::InvertCondition { original: o2, inverted: i2 },
            ) => o1 == o2 && i1 == i2,
            (
                Self::ReplaceConditionalWithTernary { original: o1, ternary: t1, .. },
                Self::ReplaceConditionalWithTernary { original: o2, ternary: t2, .. },
            ) => o1 == o2 && t1 == t2,
            (
                Self::ExtractVariable { declaration: d1, variable: v1, .. },
                Self::ExtractVariable { declaration: d2, variable: v2, .. },
            ) => d1 == d2 && v1 == v2,
            _ => false,
        }
    }

    /// A split of the same original conditional, or a merge of the same
    /// conditionals, into different targets.
    pub fn conflicts_with(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::SplitConditional { original: o1, .. },
                Self::SplitConditional { original: o2, .. },
            ) => o1 == o2 && !self.same_participants(other),
            (
                Self::MergeConditional { merged: m1, .. },
                Self::MergeConditional { merged: m2, .. },
            ) => m1 == m2 && !self.same_participants(other),
            _ => false,
        }
    }

    /// Attach a sub-expression mapping, skipping duplicates. Invert
    /// Condition carries no mappings.
    pub fn add_sub_expression_mapping(&mut self, mapping: LeafMapping) {
        let mappings = match self {
            Self::SplitConditional { mappings, .. }
            | Self::MergeConditional { mappings, .. }
            | Self::ReplaceConditionalWithTernary { mappings, .. }
            | Self::ExtractVariable { mappings, .. } => mappings,
            Self::InvertCondition { .. } => return,
        };
        if !mappings.contains(&mapping) {
            mappings.push(mapping);
        }
    }

    pub fn sub_expression_mappings(&self) -> &[LeafMapping] {
        match self {
            Self::SplitConditional { mappings, .. }
            | Self::MergeConditional { mappings, .. }
            | Self::ReplaceConditionalWithTernary { mappings, .. }
            | Self::ExtractVariable { mappings, .. } => mappings,
            Self::InvertCondition { .. } => &[],
        }
    }
}
