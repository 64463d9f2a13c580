//! Queries over `if`/`else` structure.

use super::Side;
use crate::error::{HeuristicsError, invariant_violated};
use crate::model::{CodeElementType, CodeModel, MapperContext, PairContext, StatementId};
use crate::replacement::{ReplacementInfo, ReplacementKind, ReplacementType};

fn element_is(model: &CodeModel, id: StatementId, element: CodeElementType) -> bool {
    model.get(id).is_some_and(|s| s.element() == element)
}

/// Children of an `if` node, or nothing when `id` is not one.
fn if_children(model: &CodeModel, id: StatementId) -> &[StatementId] {
    match model.get(id) {
        Some(s) if s.element() == CodeElementType::IfStatement => s.children(),
        _ => &[],
    }
}

pub fn has_else_branch(model: &CodeModel, parent: StatementId) -> bool {
    matches!(if_children(model, parent), [_, second] if element_is(model, *second, CodeElementType::Block))
}

pub fn has_else_if_branch(model: &CodeModel, parent: StatementId) -> bool {
    else_if_branch(model, parent).is_some()
}

/// The `if` whose else branch is the `if` node `id`.
pub fn else_if_parent(model: &CodeModel, id: StatementId) -> Option<StatementId> {
    if !element_is(model, id, CodeElementType::IfStatement) {
        return None;
    }
    let parent = model.get(id)?.parent?;
    match if_children(model, parent) {
        [_, second] if *second == id => Some(parent),
        _ => None,
    }
}

/// The `if` node forming the else branch of `parent`.
pub fn else_if_branch(model: &CodeModel, parent: StatementId) -> Option<StatementId> {
    match if_children(model, parent) {
        [_, second] if element_is(model, *second, CodeElementType::IfStatement) => Some(*second),
        _ => None,
    }
}

pub fn is_else_if_branch(model: &CodeModel, child: StatementId, parent: StatementId) -> bool {
    element_is(model, child, CodeElementType::IfStatement)
        && matches!(if_children(model, parent), [_, second] if *second == child)
}

pub fn is_if_branch(model: &CodeModel, child: StatementId, parent: StatementId) -> bool {
    element_is(model, child, CodeElementType::Block)
        && if_children(model, parent).first() == Some(&child)
}

pub fn is_else_branch(model: &CodeModel, child: StatementId, parent: StatementId) -> bool {
    element_is(model, child, CodeElementType::Block)
        && matches!(if_children(model, parent), [_, second] if *second == child)
}

/// The condition expression of the `if` node `id`.
///
/// An `if` element without a body or without a condition is a broken model
/// and reported as an invariant violation.
pub(crate) fn first_condition(model: &CodeModel, id: StatementId) -> Option<StatementId> {
    let statement = model.get(id)?;
    if !statement.is_composite() {
        invariant_violated(&HeuristicsError::NotAnIfStatement { id: id.0 });
        return None;
    }
    let condition = statement.header_expressions().first().copied();
    if condition.is_none() {
        invariant_violated(&HeuristicsError::EmptyConditional { id: id.0 });
    }
    condition
}

/// Some node of `nodes` (in `model`) has the text of `node` (in
/// `node_model`).
pub(crate) fn contains_identical_if_node(
    model: &CodeModel,
    nodes: &[StatementId],
    node_model: &CodeModel,
    node: StatementId,
) -> bool {
    let text = node_model.text(node);
    nodes.iter().any(|&n| model.text(n) == text)
}

/// The composite `node` of `side` reappears in the other operation, either
/// with the same text or with every leaf mapped onto the leaves of one
/// inner node there.
pub fn identical_composite_in_the_other_container(
    mapper: &MapperContext,
    node: StatementId,
    side: Side,
) -> bool {
    let (own, other) = side.models(mapper);
    let Some(root) = other.root else {
        return false;
    };
    let text = own.text(node);
    let leaves = own.leaves(node);
    other.inner_nodes(root).into_iter().any(|inner| {
        if other.text(inner) == text {
            return true;
        }
        let other_leaves = other.leaves(inner);
        if leaves.is_empty() || leaves.len() != other_leaves.len() {
            return false;
        }
        let matches = mapper
            .mappings
            .iter()
            .filter(|m| match side {
                Side::One => leaves.contains(&m.fragment1) && other_leaves.contains(&m.fragment2),
                Side::Two => other_leaves.contains(&m.fragment1) && leaves.contains(&m.fragment2),
            })
            .count();
        matches == leaves.len()
    })
}

/// One side is a bare condition expression that is just a local variable
/// (possibly negated) found in the intersection.
pub fn includes_local_variable(ctx: &PairContext<'_>, intersection: &[String]) -> bool {
    let f1 = ctx.fragment1();
    let f2 = ctx.fragment2();
    let names_local = |text: &str, model: &CodeModel| {
        intersection.iter().any(|common| {
            (text == common || text.strip_prefix('!') == Some(common.as_str()))
                && model.container.variable_declaration(common).is_some()
        })
    };
    (f1.is_expression() && f2.ternaries.is_empty() && names_local(&f1.text, ctx.model1()))
        || (f2.is_expression() && f1.ternaries.is_empty() && names_local(&f2.text, ctx.model2()))
}

/// No method invocation was replaced, or the only replaced invocation
/// keeps its name and just swaps receiver and argument.
pub fn valid_method_invocation_replacement(info: &ReplacementInfo) -> bool {
    let mut replaced = info.by_kind(ReplacementType::MethodInvocation);
    match (replaced.next(), replaced.next()) {
        (None, _) => true,
        (Some(r), None) => match &r.kind {
            ReplacementKind::MethodInvocation { call1, call2 } => {
                call1.identical_name(call2) && call1.identical_with_expression_argument_swap(call2)
            }
            _ => false,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Call, Location, Shape, Statement, StatementMapping};
    use crate::replacement::Replacement;

    fn composite(text: &str, element: CodeElementType, parent: Option<StatementId>) -> Statement {
        Statement {
            shape: Shape::Composite {
                children: vec![],
                expressions: vec![],
            },
            parent,
            location: Location::default().with_element(element),
            ..Statement::new(text)
        }
    }

    /// `if(a) {..} else if(b) {..}` inside a body block.
    fn else_if_model() -> (CodeModel, StatementId, StatementId, StatementId) {
        let mut model = CodeModel::default();
        let body = model.push(composite("{", CodeElementType::Block, None));
        model.root = Some(body);
        let outer = model.push(composite("if(a)", CodeElementType::IfStatement, Some(body)));
        let then_block = model.push(composite("{", CodeElementType::Block, Some(outer)));
        let inner = model.push(composite("if(b)", CodeElementType::IfStatement, Some(outer)));
        (model, outer, then_block, inner)
    }

    // -- branches --

    #[test]
    fn test_else_if_queries() {
        let (model, outer, then_block, inner) = else_if_model();
        assert!(has_else_if_branch(&model, outer));
        assert!(!has_else_branch(&model, outer));
        assert_eq!(else_if_branch(&model, outer), Some(inner));
        assert_eq!(else_if_parent(&model, inner), Some(outer));
        assert!(is_else_if_branch(&model, inner, outer));
        assert!(is_if_branch(&model, then_block, outer));
        assert!(!is_else_branch(&model, then_block, outer));
    }

    #[test]
    fn test_else_block() {
        let mut model = CodeModel::default();
        let node = model.push(composite("if(a)", CodeElementType::IfStatement, None));
        model.push(composite("{", CodeElementType::Block, Some(node)));
        let else_block = model.push(composite("{", CodeElementType::Block, Some(node)));
        assert!(has_else_branch(&model, node));
        assert!(is_else_branch(&model, else_block, node));
        assert_eq!(else_if_branch(&model, node), None);
    }

    // -- identical composites --

    #[test]
    fn test_identical_composite_by_text_and_by_leaves() {
        let (model1, outer1, _, _) = else_if_model();
        let mut model2 = CodeModel::default();
        let body = model2.push(composite("{", CodeElementType::Block, None));
        model2.root = Some(body);
        model2.push(composite("if(a)", CodeElementType::IfStatement, Some(body)));
        let mapper = MapperContext::new(model1, model2);
        assert!(identical_composite_in_the_other_container(&mapper, outer1, Side::One));

        let mut model1 = CodeModel::default();
        let n1 = model1.push(composite("if(x)", CodeElementType::IfStatement, None));
        let leaf1 = model1.push(Statement {
            parent: Some(n1),
            ..Statement::new("go();\n")
        });
        let mut model2 = CodeModel::default();
        let root = model2.push(composite("{", CodeElementType::Block, None));
        model2.root = Some(root);
        let n2 = model2.push(composite("if(y)", CodeElementType::IfStatement, Some(root)));
        let leaf2 = model2.push(Statement {
            parent: Some(n2),
            ..Statement::new("go();\n")
        });
        let mut mapper = MapperContext::new(model1, model2);
        assert!(!identical_composite_in_the_other_container(&mapper, n1, Side::One));
        mapper.mappings.push(StatementMapping {
            fragment1: leaf1,
            fragment2: leaf2,
        });
        assert!(identical_composite_in_the_other_container(&mapper, n1, Side::One));
    }

    // -- replacements --

    #[test]
    fn test_valid_method_invocation_replacement() {
        let mut info = ReplacementInfo::default();
        assert!(valid_method_invocation_replacement(&info));
        let call1 = Call::invocation(Some("a"), "equals", &["b"]);
        let call2 = Call::invocation(Some("b"), "equals", &["a"]);
        info.add(Replacement::new(
            "a.equals(b)",
            "b.equals(a)",
            ReplacementKind::MethodInvocation { call1, call2 },
        ));
        assert!(valid_method_invocation_replacement(&info));

        let mut info = ReplacementInfo::default();
        info.add(Replacement::new(
            "a.foo()",
            "a.bar()",
            ReplacementKind::MethodInvocation {
                call1: Call::invocation(Some("a"), "foo", &[]),
                call2: Call::invocation(Some("a"), "bar", &[]),
            },
        ));
        assert!(!valid_method_invocation_replacement(&info));
    }

    #[test]
    fn test_includes_local_variable() {
        use crate::config::HeuristicsConfig;
        use crate::model::VariableDeclaration;

        let mut model1 = CodeModel::default();
        model1
            .container
            .variable_declarations
            .push(VariableDeclaration::new("ready", "boolean"));
        let owner = model1.push(composite("if(!ready)", CodeElementType::IfStatement, None));
        let cond = model1.push(Statement {
            shape: Shape::Expression { owner: Some(owner) },
            ..Statement::new("!ready")
        });
        let mut model2 = CodeModel::default();
        let s2 = model2.push(Statement::new("if(ready && go)"));
        let mapper = MapperContext::new(model1, model2);
        let config = HeuristicsConfig::default();
        let ctx = PairContext::new(&mapper, cond, s2, &config);
        assert!(includes_local_variable(&ctx, &["ready".to_owned()]));
        assert!(!includes_local_variable(&ctx, &["go".to_owned()]));
    }
}
