//! Source locations and code element kinds.

use serde::{Deserialize, Serialize};

/// Syntactic kind of a statement or expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CodeElementType {
    Block,
    IfStatement,
    ForStatement,
    EnhancedForStatement,
    WhileStatement,
    DoStatement,
    SwitchStatement,
    TryStatement,
    CatchClause,
    FinallyBlock,
    SynchronizedStatement,
    LabeledStatement,
    ReturnStatement,
    ThrowStatement,
    BreakStatement,
    ContinueStatement,
    ExpressionStatement,
    VariableDeclarationStatement,
    ConstructorInvocation,
    SuperConstructorInvocation,
    /// Condition of an `if`, `while`, `for` or ternary.
    Condition,
    #[default]
    Other,
}

/// Line and offset range of a code element within one source file.
///
/// Both sides of a comparison live in their own arena, so locations are
/// only ever compared within one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub start_line: u32,
    pub end_line: u32,
    pub start_offset: u32,
    pub end_offset: u32,
    pub element: CodeElementType,
}

impl Location {
    pub const fn new(start_line: u32, end_line: u32, start_offset: u32, end_offset: u32) -> Self {
        Self {
            start_line,
            end_line,
            start_offset,
            end_offset,
            element: CodeElementType::Other,
        }
    }

    #[must_use]
    pub const fn with_element(mut self, element: CodeElementType) -> Self {
        self.element = element;
        self
    }

    /// `other` lies entirely within `self`.
    pub const fn subsumes(&self, other: &Self) -> bool {
        self.start_offset <= other.start_offset && self.end_offset >= other.end_offset
    }

    /// `self` ends before `other` starts.
    pub const fn before(&self, other: &Self) -> bool {
        self.start_offset <= other.start_offset && self.end_offset <= other.start_offset
    }

    /// `self` starts on the line right after `other` ends.
    pub const fn next_line(&self, other: &Self) -> bool {
        self.start_line == other.end_line + 1
    }

    /// `self` starts on the line where `other` ends.
    pub const fn starts_at_end_line_of(&self, other: &Self) -> bool {
        self.start_line == other.end_line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsumes() {
        let outer = Location::new(1, 10, 0, 200);
        let inner = Location::new(2, 3, 20, 40);
        assert!(outer.subsumes(&inner));
        assert!(!inner.subsumes(&outer));
        assert!(outer.subsumes(&outer));
    }

    #[test]
    fn test_before_and_lines() {
        let first = Location::new(1, 2, 0, 30);
        let second = Location::new(3, 4, 31, 60);
        assert!(first.before(&second));
        assert!(!second.before(&first));
        assert!(second.next_line(&first));
        assert!(!first.next_line(&second));
        let same_line = Location::new(2, 2, 31, 40);
        assert!(same_line.starts_at_end_line_of(&first));
    }
}
