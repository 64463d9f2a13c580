//! Statement arena.
//!
//! One [`CodeModel`] holds every statement and expression of one side of a
//! comparison. Parent/child links are [`StatementId`]s into the arena, so
//! ownership stays one-directional: the arena owns statements, statements
//! own their declarations, calls and sub-expressions.

use serde::{Deserialize, Serialize};

use super::call::Call;
use super::declaration::VariableDeclaration;
use super::location::{CodeElementType, Location};
use crate::error::{HeuristicsError, HeuristicsResult};
use crate::text::{RETURN_SPACE, STATEMENT_TERMINATION};

/// Index of a statement within its [`CodeModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatementId(pub usize);

/// Kind of an indexed sub-expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafKind {
    Variable,
    StringLiteral,
    TextBlock,
    NumberLiteral,
    NullLiteral,
    BooleanLiteral,
    Infix,
    MethodInvocation,
    Creation,
    #[default]
    Other,
}

/// A sub-expression that can take part in a sub-expression mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LeafExpression {
    pub text: String,
    pub kind: LeafKind,
    pub location: Location,
}

impl LeafExpression {
    pub fn new(text: impl Into<String>, kind: LeafKind, location: Location) -> Self {
        Self {
            text: text.into(),
            kind,
            location,
        }
    }
}

/// `condition ? then : else`, each component with its location.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Ternary {
    pub condition: LeafExpression,
    pub then_expression: LeafExpression,
    pub else_expression: LeafExpression,
}

/// An anonymous class declared inside a statement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnonymousClass {
    /// Body text, starting at `{`.
    pub text: String,
    pub location: Location,
}

/// Structural role of a statement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// A plain statement without children.
    #[default]
    Leaf,
    /// A statement with a body (`if`, `for`, block, ...).
    Composite {
        #[serde(default)]
        children: Vec<StatementId>,
        /// Expressions owned by the header, e.g. the condition of an `if`.
        #[serde(default)]
        expressions: Vec<StatementId>,
    },
    /// An expression owned by a composite header.
    Expression { owner: Option<StatementId> },
}

/// One statement or expression of the code model.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Statement {
    pub text: String,
    pub location: Location,
    pub shape: Shape,
    pub parent: Option<StatementId>,
    pub variable_declarations: Vec<VariableDeclaration>,
    pub calls: Vec<Call>,
    pub infix_operators: Vec<String>,
    pub expressions: Vec<LeafExpression>,
    pub ternaries: Vec<Ternary>,
    pub anonymous_classes: Vec<AnonymousClass>,
    /// Statements of lambda bodies and anonymous class methods nested in
    /// this statement.
    pub nested: Vec<StatementId>,
}

impl Statement {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub const fn element(&self) -> CodeElementType {
        self.location.element
    }

    pub const fn is_leaf(&self) -> bool {
        matches!(self.shape, Shape::Leaf)
    }

    pub const fn is_composite(&self) -> bool {
        matches!(self.shape, Shape::Composite { .. })
    }

    pub const fn is_expression(&self) -> bool {
        matches!(self.shape, Shape::Expression { .. })
    }

    pub fn is_if(&self) -> bool {
        self.element() == CodeElementType::IfStatement && self.is_composite()
    }

    pub fn children(&self) -> &[StatementId] {
        match &self.shape {
            Shape::Composite { children, .. } => children,
            _ => &[],
        }
    }

    pub fn header_expressions(&self) -> &[StatementId] {
        match &self.shape {
            Shape::Composite { expressions, .. } => expressions,
            _ => &[],
        }
    }

    pub const fn owner(&self) -> Option<StatementId> {
        match self.shape {
            Shape::Expression { owner } => owner,
            _ => None,
        }
    }

    pub fn method_invocations(&self) -> impl Iterator<Item = &Call> {
        self.calls.iter().filter(|c| !c.is_creation())
    }

    pub fn creations(&self) -> impl Iterator<Item = &Call> {
        self.calls.iter().filter(|c| c.is_creation())
    }

    pub fn expressions_of_kind(&self, kind: LeafKind) -> impl Iterator<Item = &LeafExpression> {
        self.expressions.iter().filter(move |e| e.kind == kind)
    }

    pub fn infix_expressions(&self) -> impl Iterator<Item = &str> {
        self.expressions_of_kind(LeafKind::Infix).map(|e| e.text.as_str())
    }

    pub fn string_literals(&self) -> impl Iterator<Item = &str> {
        self.expressions_of_kind(LeafKind::StringLiteral)
            .map(|e| e.text.as_str())
    }

    pub fn text_blocks(&self) -> impl Iterator<Item = &str> {
        self.expressions_of_kind(LeafKind::TextBlock).map(|e| e.text.as_str())
    }

    /// The declaration of `name` in this statement, last one wins.
    pub fn variable_declaration(&self, name: &str) -> Option<&VariableDeclaration> {
        self.variable_declarations.iter().rev().find(|d| d.name == name)
    }

    /// Indexes of the sub-expressions whose text is exactly `s`, one per
    /// distinct location.
    pub fn find_expression(&self, s: &str) -> Vec<usize> {
        let mut seen: Vec<Location> = Vec::new();
        let mut out = Vec::new();
        for (i, e) in self.expressions.iter().enumerate() {
            if e.text == s && !seen.contains(&e.location) {
                seen.push(e.location);
                out.push(i);
            }
        }
        out
    }

    /// `expr` is the initializer of this statement's only declaration.
    fn is_initializer_of_declaration(&self, expr: &str) -> bool {
        match self.variable_declarations.as_slice() {
            [only] => only.initializer_text() == Some(expr),
            _ => false,
        }
    }

    /// `(T) expr;` or `return (T) expr;`.
    fn is_cast_covering(&self, expr: &str) -> bool {
        let Some(body) = self.text.strip_suffix(STATEMENT_TERMINATION) else {
            return false;
        };
        let body = body.strip_prefix(RETURN_SPACE).unwrap_or(body);
        let Some(head) = body.strip_suffix(expr) else {
            return false;
        };
        let head = head.trim_end();
        head.starts_with('(') && head.ends_with(')') && head.len() > 2
    }

    /// The method invocation making up this whole statement, alone, behind
    /// `return`, behind a cast, or as the only initializer.
    pub fn invocation_covering_entire_fragment(&self) -> Option<&Call> {
        self.method_invocations().find(|call| {
            let s = call.string();
            let s = s.as_ref();
            self.text == format!("{s}{STATEMENT_TERMINATION}")
                || self.text == s
                || self.text == format!("!{s}")
                || self.text == format!("{RETURN_SPACE}{s}{STATEMENT_TERMINATION}")
                || self.is_cast_covering(s)
                || self.is_initializer_of_declaration(s)
                || matches!(
                    self.element(),
                    CodeElementType::ConstructorInvocation
                        | CodeElementType::SuperConstructorInvocation
                )
        })
    }

    /// The object creation making up this whole statement.
    pub fn creation_covering_entire_fragment(&self) -> Option<&Call> {
        self.creations().find(|call| {
            let s = call.string();
            let s = s.as_ref();
            self.text == format!("{s}{STATEMENT_TERMINATION}")
                || self.text == s
                || self.text == format!("{RETURN_SPACE}{s}{STATEMENT_TERMINATION}")
                || self.text == format!("throw {s}{STATEMENT_TERMINATION}")
                || self.is_initializer_of_declaration(s)
        })
    }

    /// Right-hand side of a plain assignment `lhs = rhs;`, if any.
    pub fn assignment_right_hand_side(&self) -> Option<&str> {
        let body = self.text.strip_suffix(STATEMENT_TERMINATION)?;
        let index = assignment_index(body)?;
        Some(body[index + 1..].trim())
    }

    /// Left-hand side of a plain assignment `lhs = rhs;`, if any.
    pub fn assignment_left_hand_side(&self) -> Option<&str> {
        let body = self.text.strip_suffix(STATEMENT_TERMINATION)?;
        let index = assignment_index(body)?;
        Some(body[..index].trim())
    }

    /// The method invocation forming the right-hand side of an assignment.
    pub fn assignment_invocation_covering_entire_statement(&self) -> Option<&Call> {
        let rhs = self.assignment_right_hand_side()?;
        self.method_invocations().find(|c| c.string() == rhs)
    }

    /// The object creation forming the right-hand side of an assignment.
    pub fn assignment_creation_covering_entire_statement(&self) -> Option<&Call> {
        let rhs = self.assignment_right_hand_side()?;
        self.creations().find(|c| c.string() == rhs)
    }

    /// `break;`, `continue;` or a bare `return;`.
    pub fn is_keyword(&self) -> bool {
        matches!(self.text.as_str(), "return;\n" | "break;\n" | "continue;\n")
    }
}

/// Byte index of the first `=` that is an assignment rather than part of
/// `==`, `!=`, `<=`, `>=` or a compound operator.
pub fn assignment_index(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut in_string = false;
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'"' {
            in_string = !in_string;
        }
        if in_string || b != b'=' {
            continue;
        }
        let prev = if i > 0 { bytes[i - 1] } else { b' ' };
        let next = bytes.get(i + 1).copied().unwrap_or(b' ');
        if next == b'=' || matches!(prev, b'=' | b'!' | b'<' | b'>') {
            continue;
        }
        if matches!(prev, b'+' | b'-' | b'*' | b'/' | b'%' | b'&' | b'|' | b'^') {
            return None;
        }
        return Some(i);
    }
    None
}

/// Every statement and expression of one side, plus the declarations of
/// the enclosing operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeModel {
    pub container: Container,
    pub statements: Vec<Statement>,
    /// The operation body block.
    pub root: Option<StatementId>,
}

/// The operation (method, constructor, lambda) a code model belongs to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Container {
    pub name: String,
    pub is_constructor: bool,
    pub parameters: Vec<VariableDeclaration>,
    /// Every local declaration in the body, in source order.
    pub variable_declarations: Vec<VariableDeclaration>,
}

impl Container {
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.name.as_str())
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p.name == name)
    }

    /// Parameter or local declaration named `name`, last one wins.
    pub fn variable_declaration(&self, name: &str) -> Option<&VariableDeclaration> {
        self.variable_declarations
            .iter()
            .rev()
            .find(|d| d.name == name)
            .or_else(|| self.parameters.iter().find(|p| p.name == name))
    }

    pub fn all_variable_declarations(&self) -> impl Iterator<Item = &VariableDeclaration> {
        self.parameters.iter().chain(self.variable_declarations.iter())
    }
}

impl CodeModel {
    pub fn new(container: Container) -> Self {
        Self {
            container,
            statements: Vec::new(),
            root: None,
        }
    }

    /// Append a statement, wiring its parent's child or expression list.
    pub fn push(&mut self, statement: Statement) -> StatementId {
        let id = StatementId(self.statements.len());
        let parent = statement.parent;
        let owner = statement.owner();
        let is_expression = statement.is_expression();
        self.statements.push(statement);
        if let Some(parent) = parent.filter(|_| !is_expression) {
            if let Some(Shape::Composite { children, .. }) =
                self.statements.get_mut(parent.0).map(|s| &mut s.shape)
            {
                children.push(id);
            }
        }
        if let Some(owner) = owner {
            if let Some(Shape::Composite { expressions, .. }) =
                self.statements.get_mut(owner.0).map(|s| &mut s.shape)
            {
                expressions.push(id);
            }
        }
        id
    }

    pub fn get(&self, id: StatementId) -> Option<&Statement> {
        self.statements.get(id.0)
    }

    /// Resolve `id`, failing with [`HeuristicsError::UnknownStatement`].
    pub fn statement(&self, id: StatementId) -> HeuristicsResult<&Statement> {
        self.get(id).ok_or(HeuristicsError::UnknownStatement {
            id: id.0,
            len: self.statements.len(),
        })
    }

    pub fn text(&self, id: StatementId) -> &str {
        self.get(id).map_or("", |s| s.text.as_str())
    }

    /// Parent composite of `id`. An expression reports the parent of its
    /// owner, so the condition of a nested `if` sits in the enclosing block.
    pub fn parent(&self, id: StatementId) -> Option<StatementId> {
        let s = self.get(id)?;
        match s.owner() {
            Some(owner) => self.get(owner)?.parent,
            None => s.parent,
        }
    }

    /// First variable declaration of statement `id`.
    pub fn first_declaration(&self, id: StatementId) -> Option<&VariableDeclaration> {
        self.get(id)?.variable_declarations.first()
    }

    pub fn ids(&self) -> impl Iterator<Item = StatementId> {
        (0..self.statements.len()).map(StatementId)
    }

    /// Check that every id stored in the arena resolves.
    pub fn validate(&self) -> HeuristicsResult<()> {
        if let Some(root) = self.root {
            self.statement(root)?;
        }
        for s in &self.statements {
            let owner = s.owner();
            let linked = s
                .parent
                .iter()
                .chain(s.children())
                .chain(s.header_expressions())
                .chain(owner.iter())
                .chain(s.nested.iter());
            for &id in linked {
                self.statement(id)?;
            }
        }
        Ok(())
    }

    /// Composite descendants of `id` (post-order), followed by `id` itself.
    pub fn inner_nodes(&self, id: StatementId) -> Vec<StatementId> {
        let mut out = Vec::new();
        self.collect_inner_nodes(id, &mut out, 0);
        out
    }

    fn collect_inner_nodes(&self, id: StatementId, out: &mut Vec<StatementId>, depth: usize) {
        let Some(s) = self.get(id) else { return };
        if !s.is_composite() || depth > self.statements.len() {
            return;
        }
        for &child in s.children() {
            self.collect_inner_nodes(child, out, depth + 1);
        }
        out.push(id);
    }

    /// Leaf descendants of `id`.
    pub fn leaves(&self, id: StatementId) -> Vec<StatementId> {
        let mut out = Vec::new();
        self.collect_leaves(id, &mut out, 0);
        out
    }

    fn collect_leaves(&self, id: StatementId, out: &mut Vec<StatementId>, depth: usize) {
        let Some(s) = self.get(id) else { return };
        if depth > self.statements.len() {
            return;
        }
        for &child in s.children() {
            match self.get(child) {
                Some(c) if c.is_leaf() => out.push(child),
                Some(_) => self.collect_leaves(child, out, depth + 1),
                None => {}
            }
        }
    }

    /// `fragment` is a leaf, inner node or header expression under
    /// `composite`.
    pub fn composite_contains(&self, composite: StatementId, fragment: StatementId) -> bool {
        let Some(f) = self.get(fragment) else {
            return false;
        };
        match f.shape {
            Shape::Leaf => self.leaves(composite).contains(&fragment),
            Shape::Composite { .. } => self.inner_nodes(composite).contains(&fragment),
            Shape::Expression { .. } => self
                .get(composite)
                .is_some_and(|c| c.header_expressions().contains(&fragment)),
        }
    }

    /// Position of `id` among its parent's children.
    pub fn index_in_parent(&self, id: StatementId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.get(parent)?.children().iter().position(|&c| c == id)
    }

    /// `id` is the last statement of the operation body.
    pub fn is_last_statement(&self, id: StatementId) -> bool {
        let Some(s) = self.get(id) else { return false };
        if s.is_expression() {
            return false;
        }
        let Some(parent) = s.parent else { return false };
        let Some(p) = self.get(parent) else {
            return false;
        };
        p.parent.is_none() && self.index_in_parent(id) == Some(p.children().len().saturating_sub(1))
    }

    /// `id` is the last statement of the body and returns a boolean literal.
    pub fn is_last_statement_with_boolean_return(&self, id: StatementId) -> bool {
        self.is_last_statement(id)
            && matches!(self.text(id), "return true;\n" | "return false;\n")
    }
}
