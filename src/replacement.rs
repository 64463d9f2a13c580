//! Replacement model.
//!
//! A [`Replacement`] records one elementary edit between two statements. The
//! per-comparison [`ReplacementInfo`] accumulates them, deduplicated by
//! `(before, after, kind)`, together with the context the rules need.

use serde::{Deserialize, Serialize};

use crate::model::{Call, LeafExpression, Location, Statement, StatementId};
use crate::refactoring::ConditionalRefactoring;
use crate::text::levenshtein;

// ---------------------------------------------------------------------------
// Sub-expression mappings
// ---------------------------------------------------------------------------

/// A fragment of one side: a whole statement or a sub-expression of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentRef {
    pub statement: StatementId,
    pub text: String,
    #[serde(default)]
    pub location: Option<Location>,
}

impl FragmentRef {
    pub fn text(statement: StatementId, text: impl Into<String>) -> Self {
        Self {
            statement,
            text: text.into(),
            location: None,
        }
    }

    pub fn expression(statement: StatementId, expression: &LeafExpression) -> Self {
        Self {
            statement,
            text: expression.text.clone(),
            location: Some(expression.location),
        }
    }

    pub fn statement(id: StatementId, statement: &Statement) -> Self {
        Self {
            statement: id,
            text: statement.text.clone(),
            location: Some(statement.location),
        }
    }

    pub fn call(statement: StatementId, call: &Call) -> Self {
        Self::text(statement, call.actual_string())
    }
}

/// Two fragments judged to be the same sub-expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafMapping {
    pub fragment1: FragmentRef,
    pub fragment2: FragmentRef,
}

impl LeafMapping {
    pub const fn new(fragment1: FragmentRef, fragment2: FragmentRef) -> Self {
        Self {
            fragment1,
            fragment2,
        }
    }
}

// ---------------------------------------------------------------------------
// Replacement kinds
// ---------------------------------------------------------------------------

/// Which side of a variable/invocation replacement holds the invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    InvocationToVariable,
    VariableToInvocation,
}

/// Tag of a [`ReplacementKind`], without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplacementType {
    VariableName,
    Type,
    InfixOperator,
    InfixExpression,
    InvertConditional,
    Concatenation,
    Conditional,
    Composite,
    VariableReplacedWithArrayAccess,
    VariableReplacedWithMethodInvocation,
    VariableReplacedWithThisExpression,
    VariableReplacedWithNullLiteral,
    VariableReplacedWithClassInstanceCreation,
    SplitVariable,
    MergeVariable,
    AddVariable,
    SwapArgument,
    ClassInstanceCreation,
    MethodInvocation,
    NullLiteralCheckReplacedWithOptionalIsEmptyCheck,
    NullLiteralCheckReplacedWithOptionalIsPresentCheck,
    NullLiteralReplacedWithOptionalEmpty,
}

/// Edit kind with its kind-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplacementKind {
    VariableName,
    Type,
    InfixOperator,
    InfixExpression,
    InvertConditional,
    /// String concatenation rewrite; carries the shared sub-expressions when
    /// detected through an intersection.
    Concatenation {
        #[serde(default)]
        mappings: Vec<LeafMapping>,
    },
    /// Intersection of sub-conditions.
    Conditional {
        #[serde(default)]
        mappings: Vec<LeafMapping>,
    },
    /// Split or merge: sibling statements matched in addition to the pair.
    Composite {
        #[serde(default)]
        additionally_matched1: Vec<StatementId>,
        #[serde(default)]
        additionally_matched2: Vec<StatementId>,
    },
    VariableReplacedWithArrayAccess,
    VariableReplacedWithMethodInvocation {
        direction: Direction,
        call: Call,
    },
    VariableReplacedWithThisExpression,
    VariableReplacedWithNullLiteral,
    VariableReplacedWithClassInstanceCreation,
    SplitVariable {
        split: Vec<String>,
    },
    MergeVariable {
        merged: Vec<String>,
    },
    AddVariable {
        added: Vec<String>,
    },
    SwapArgument,
    ClassInstanceCreation,
    MethodInvocation {
        call1: Call,
        call2: Call,
    },
    NullLiteralCheckReplacedWithOptionalIsEmptyCheck,
    NullLiteralCheckReplacedWithOptionalIsPresentCheck,
    NullLiteralReplacedWithOptionalEmpty,
}

impl ReplacementKind {
    pub const fn replacement_type(&self) -> ReplacementType {
        match self {
            Self::VariableName => ReplacementType::VariableName,
            Self::Type => ReplacementType::Type,
            Self::InfixOperator => ReplacementType::InfixOperator,
            Self::InfixExpression => ReplacementType::InfixExpression,
            Self::InvertConditional => ReplacementType::InvertConditional,
            Self::Concatenation { .. } => ReplacementType::Concatenation,
            Self::Conditional { .. } => ReplacementType::Conditional,
            Self::Composite { .. } => ReplacementType::Composite,
            Self::VariableReplacedWithArrayAccess => ReplacementType::VariableReplacedWithArrayAccess,
            Self::VariableReplacedWithMethodInvocation { .. } => {
                ReplacementType::VariableReplacedWithMethodInvocation
            }
            Self::VariableReplacedWithThisExpression => {
                ReplacementType::VariableReplacedWithThisExpression
            }
            Self::VariableReplacedWithNullLiteral => ReplacementType::VariableReplacedWithNullLiteral,
            Self::VariableReplacedWithClassInstanceCreation => {
                ReplacementType::VariableReplacedWithClassInstanceCreation
            }
            Self::SplitVariable { .. } => ReplacementType::SplitVariable,
            Self::MergeVariable { .. } => ReplacementType::MergeVariable,
            Self::AddVariable { .. } => ReplacementType::AddVariable,
            Self::SwapArgument => ReplacementType::SwapArgument,
            Self::ClassInstanceCreation => ReplacementType::ClassInstanceCreation,
            Self::MethodInvocation { .. } => ReplacementType::MethodInvocation,
            Self::NullLiteralCheckReplacedWithOptionalIsEmptyCheck => {
                ReplacementType::NullLiteralCheckReplacedWithOptionalIsEmptyCheck
            }
            Self::NullLiteralCheckReplacedWithOptionalIsPresentCheck => {
                ReplacementType::NullLiteralCheckReplacedWithOptionalIsPresentCheck
            }
            Self::NullLiteralReplacedWithOptionalEmpty => {
                ReplacementType::NullLiteralReplacedWithOptionalEmpty
            }
        }
    }

    pub const fn concatenation() -> Self {
        Self::Concatenation {
            mappings: Vec::new(),
        }
    }

    pub const fn conditional() -> Self {
        Self::Conditional {
            mappings: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Replacement
// ---------------------------------------------------------------------------

/// One elementary edit: `before` in statement 1 became `after` in
/// statement 2.
///
/// Equality looks at `before`, `after` and the kind tag only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replacement {
    pub before: String,
    pub after: String,
    #[serde(flatten)]
    pub kind: ReplacementKind,
}

impl PartialEq for Replacement {
    fn eq(&self, other: &Self) -> bool {
        self.before == other.before
            && self.after == other.after
            && self.kind.replacement_type() == other.kind.replacement_type()
    }
}

impl Eq for Replacement {}

impl Replacement {
    pub fn new(before: impl Into<String>, after: impl Into<String>, kind: ReplacementKind) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
            kind,
        }
    }

    pub fn split_variable(before: impl Into<String>, split: Vec<String>) -> Self {
        let after = split.join(",");
        Self::new(before, after, ReplacementKind::SplitVariable { split })
    }

    pub fn merge_variable(merged: Vec<String>, after: impl Into<String>) -> Self {
        let before = merged.join(",");
        Self::new(before, after, ReplacementKind::MergeVariable { merged })
    }

    pub fn add_variable(added: Vec<String>) -> Self {
        let after = added.join(",");
        Self::new("", after, ReplacementKind::AddVariable { added })
    }

    pub fn composite(
        before: impl Into<String>,
        after: impl Into<String>,
        additionally_matched1: Vec<StatementId>,
        additionally_matched2: Vec<StatementId>,
    ) -> Self {
        Self::new(
            before,
            after,
            ReplacementKind::Composite {
                additionally_matched1,
                additionally_matched2,
            },
        )
    }

    pub const fn replacement_type(&self) -> ReplacementType {
        self.kind.replacement_type()
    }

    pub fn is(&self, kind: ReplacementType) -> bool {
        self.replacement_type() == kind
    }

    /// Concatenation or conditional intersection.
    pub const fn is_intersection(&self) -> bool {
        matches!(
            self.kind,
            ReplacementKind::Concatenation { .. } | ReplacementKind::Conditional { .. }
        )
    }

    pub fn sub_expression_mappings(&self) -> &[LeafMapping] {
        match &self.kind {
            ReplacementKind::Concatenation { mappings } | ReplacementKind::Conditional { mappings } => {
                mappings
            }
            _ => &[],
        }
    }

    pub fn add_sub_expression_mapping(&mut self, mapping: LeafMapping) {
        if let ReplacementKind::Concatenation { mappings } | ReplacementKind::Conditional { mappings } =
            &mut self.kind
        {
            if !mappings.contains(&mapping) {
                mappings.push(mapping);
            }
        }
    }

    pub fn additionally_matched1(&self) -> &[StatementId] {
        match &self.kind {
            ReplacementKind::Composite {
                additionally_matched1,
                ..
            } => additionally_matched1,
            _ => &[],
        }
    }

    pub fn additionally_matched2(&self) -> &[StatementId] {
        match &self.kind {
            ReplacementKind::Composite {
                additionally_matched2,
                ..
            } => additionally_matched2,
            _ => &[],
        }
    }

    /// A variable replaced with a getter of the same name, e.g. `name`
    /// with `getName()` or `isValid()`.
    pub fn getter_replacement(&self) -> bool {
        let ReplacementKind::VariableReplacedWithMethodInvocation { direction, call } = &self.kind
        else {
            return false;
        };
        let variable = match direction {
            Direction::InvocationToVariable => &self.after,
            Direction::VariableToInvocation => &self.before,
        };
        if !call.arguments.is_empty() {
            return false;
        }
        let mut chars = variable.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        let capitalized: String = first.to_uppercase().chain(chars).collect();
        call.name == format!("get{capitalized}") || call.name == format!("is{capitalized}")
    }
}

// ---------------------------------------------------------------------------
// ReplacementInfo
// ---------------------------------------------------------------------------

/// Per-comparison accumulator.
///
/// Owned by exactly one statement-pair comparison. Rules append to it; a
/// rule that declines must leave it as it found it, which
/// [`attempt`](Self::attempt) guarantees.
#[derive(Debug, Clone, Default)]
pub struct ReplacementInfo {
    replacements: Vec<Replacement>,
    /// Unmatched statements of side 1 at the time of the comparison.
    pub statements1: Vec<StatementId>,
    /// Unmatched statements of side 2 at the time of the comparison.
    pub statements2: Vec<StatementId>,
    argumentized1: String,
    argumentized2: String,
    raw_distance: usize,
    sub_expression_mappings: Vec<LeafMapping>,
    refactorings: Vec<ConditionalRefactoring>,
    retracted: Vec<ConditionalRefactoring>,
}

impl ReplacementInfo {
    pub fn new(
        argumentized1: impl Into<String>,
        argumentized2: impl Into<String>,
        statements1: Vec<StatementId>,
        statements2: Vec<StatementId>,
    ) -> Self {
        let argumentized1 = argumentized1.into();
        let argumentized2 = argumentized2.into();
        let raw_distance = levenshtein::distance(&argumentized1, &argumentized2);
        Self {
            replacements: Vec::new(),
            statements1,
            statements2,
            argumentized1,
            argumentized2,
            raw_distance,
            sub_expression_mappings: Vec::new(),
            refactorings: Vec::new(),
            retracted: Vec::new(),
        }
    }

    pub fn replacements(&self) -> &[Replacement] {
        &self.replacements
    }

    /// Add `r` unless an equal replacement is present. Returns whether it
    /// was added.
    pub fn add(&mut self, r: Replacement) -> bool {
        if self.replacements.contains(&r) {
            return false;
        }
        self.replacements.push(r);
        true
    }

    pub fn add_all(&mut self, rs: impl IntoIterator<Item = Replacement>) {
        for r in rs {
            self.add(r);
        }
    }

    pub fn remove(&mut self, rs: &[Replacement]) {
        self.replacements.retain(|r| !rs.contains(r));
    }

    pub fn remove_where(&mut self, pred: impl Fn(&Replacement) -> bool) {
        self.replacements.retain(|r| !pred(r));
    }

    pub fn by_kind(&self, kind: ReplacementType) -> impl Iterator<Item = &Replacement> {
        self.replacements.iter().filter(move |r| r.is(kind))
    }

    pub fn count_kind(&self, kind: ReplacementType) -> usize {
        self.by_kind(kind).count()
    }

    pub fn contains_kind(&self, kind: ReplacementType) -> bool {
        self.by_kind(kind).next().is_some()
    }

    /// The stored replacement equal to `r`.
    pub fn find_mut(&mut self, r: &Replacement) -> Option<&mut Replacement> {
        self.replacements.iter_mut().find(|x| **x == *r)
    }

    /// Last added replacement, used to attach sub-expression mappings.
    pub fn last_mut(&mut self) -> Option<&mut Replacement> {
        self.replacements.last_mut()
    }

    pub fn argumentized1(&self) -> &str {
        &self.argumentized1
    }

    pub fn argumentized2(&self) -> &str {
        &self.argumentized2
    }

    /// Replace the side 1 scratch text and recompute the raw distance.
    pub fn set_argumentized1(&mut self, s: impl Into<String>) {
        self.argumentized1 = s.into();
        self.raw_distance = levenshtein::distance(&self.argumentized1, &self.argumentized2);
    }

    pub const fn raw_distance(&self) -> usize {
        self.raw_distance
    }

    pub fn sub_expression_mappings(&self) -> &[LeafMapping] {
        &self.sub_expression_mappings
    }

    pub fn add_sub_expression_mapping(&mut self, mapping: LeafMapping) {
        if !self.sub_expression_mappings.contains(&mapping) {
            self.sub_expression_mappings.push(mapping);
        }
    }

    pub fn refactorings(&self) -> &[ConditionalRefactoring] {
        &self.refactorings
    }

    pub fn refactorings_mut(&mut self) -> &mut Vec<ConditionalRefactoring> {
        &mut self.refactorings
    }

    /// Already-accepted refactorings superseded by this comparison.
    pub fn retracted(&self) -> &[ConditionalRefactoring] {
        &self.retracted
    }

    pub fn add_refactoring(&mut self, refactoring: ConditionalRefactoring) {
        if !self.refactorings.contains(&refactoring) {
            self.refactorings.push(refactoring);
        }
    }

    /// Withdraw `refactoring`: drop it if this comparison produced it,
    /// otherwise record it for the caller to remove.
    pub fn retract(&mut self, refactoring: &ConditionalRefactoring) {
        let before = self.refactorings.len();
        self.refactorings.retain(|r| r != refactoring);
        if self.refactorings.len() == before && !self.retracted.contains(refactoring) {
            self.retracted.push(refactoring.clone());
        }
    }

    /// Run `f`; if it returns `false`, restore the accumulator to its state
    /// before the call.
    pub fn attempt(&mut self, f: impl FnOnce(&mut Self) -> bool) -> bool {
        let snapshot = self.clone();
        if f(self) {
            true
        } else {
            *self = snapshot;
            false
        }
    }
}
