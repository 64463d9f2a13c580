//! Statement adjacency: are two conditionals on the same control-flow path?
//!
//! A split or merge is only credible when the conditionals involved are
//! sequential. That is proven by an accepted mapping nested in all of them,
//! by leaf statements on the relevant sides, by terminal leaves (`break`,
//! `continue`, `return`, `return true`, `return false`) that flow into the
//! other conditional, or by sharing one parent.

use super::branches::{first_condition, is_else_if_branch};
use super::subconditions::{prepare_conditional, sub_condition_intersection, sub_conditions};
use crate::model::{CodeElementType, CodeModel, Location, MapperContext, Statement, StatementId};

const RETURN_TRUE: &str = "return true;\n";
const RETURN_FALSE: &str = "return false;\n";

fn is_terminal(s: &Statement) -> bool {
    s.is_keyword() || s.text == RETURN_TRUE || s.text == RETURN_FALSE
}

fn is_leaf(model: &CodeModel, id: StatementId) -> bool {
    model.get(id).is_some_and(Statement::is_leaf)
}

/// Some leaf of `composite` is terminal and lies inside or after `anchor`.
fn has_terminal_leaf(model: &CodeModel, composite: StatementId, anchor: &Location) -> bool {
    model
        .leaves(composite)
        .into_iter()
        .filter_map(|id| model.get(id))
        .any(|leaf| is_terminal(leaf) && (anchor.subsumes(&leaf.location) || anchor.before(&leaf.location)))
}

/// `node` encloses the mapped `fragment`, or is a composite with a terminal
/// leaf inside or after `anchor`.
fn encloses(model: &CodeModel, node: StatementId, anchor: StatementId, fragment: StatementId) -> bool {
    let (Some(n), Some(f)) = (model.get(node), model.get(fragment)) else {
        return false;
    };
    if n.location.subsumes(&f.location) {
        return true;
    }
    n.is_composite()
        && model
            .get(anchor)
            .is_some_and(|a| has_terminal_leaf(model, node, &a.location))
}

/// Side 1 `node1` and side 2 `node2` are sequential: an accepted mapping
/// nests in both (or each ends in a terminal leaf), or both are leaves.
pub fn sequentially_related(mapper: &MapperContext, node1: StatementId, node2: StatementId) -> bool {
    mapper.mappings.iter().any(|m| {
        encloses(&mapper.model1, node1, node1, m.fragment1)
            && encloses(&mapper.model2, node2, node2, m.fragment2)
    }) || (is_leaf(&mapper.model1, node1) && is_leaf(&mapper.model2, node2))
}

/// The side 2 conditional `split` can be one half of a split of
/// `statement1`, given that `statement2` is the other half.
pub fn sequentially_split_conditional(
    mapper: &MapperContext,
    statement1: StatementId,
    split: StatementId,
    statement2: StatementId,
) -> bool {
    mapper.mappings.iter().any(|m| {
        encloses(&mapper.model2, split, statement2, m.fragment2)
            && encloses(&mapper.model1, statement1, statement1, m.fragment1)
    }) || is_leaf(&mapper.model1, statement1)
        || is_leaf(&mapper.model2, split)
}

/// The side 1 conditional `merged` can be one of the conditionals merged
/// into `statement2`, given that `statement1` is another.
pub fn sequentially_merged_conditional(
    mapper: &MapperContext,
    merged: StatementId,
    statement1: StatementId,
    statement2: StatementId,
) -> bool {
    mapper.mappings.iter().any(|m| {
        encloses(&mapper.model1, merged, statement1, m.fragment1)
            && encloses(&mapper.model2, statement2, statement2, m.fragment2)
    }) || is_leaf(&mapper.model1, merged)
        || is_leaf(&mapper.model2, statement2)
}

/// All of the side 2 `split` conditionals together replace `statement1`.
pub fn sequentially_split_conditionals(
    mapper: &MapperContext,
    statement1: StatementId,
    split: &[StatementId],
) -> bool {
    let pairs = mapper.mappings.iter().map(|m| (m.fragment1, m.fragment2));
    sequential_group(&mapper.model1, statement1, &mapper.model2, split, pairs)
}

/// All of the side 1 `merged` conditionals together became `statement2`.
pub fn sequentially_merged_conditionals(
    mapper: &MapperContext,
    merged: &[StatementId],
    statement2: StatementId,
) -> bool {
    let pairs = mapper.mappings.iter().map(|m| (m.fragment2, m.fragment1));
    sequential_group(&mapper.model2, statement2, &mapper.model1, merged, pairs)
}

/// One conditional (`single`) against the group of conditionals it was
/// split into or merged from. `pairs` are accepted mappings as
/// `(single side fragment, group side fragment)`.
fn sequential_group(
    single_model: &CodeModel,
    single: StatementId,
    group_model: &CodeModel,
    group: &[StatementId],
    pairs: impl Iterator<Item = (StatementId, StatementId)>,
) -> bool {
    let Some(single_statement) = single_model.get(single) else {
        return false;
    };
    for (single_fragment, group_fragment) in pairs {
        let nested_group = group
            .iter()
            .filter(|&&g| {
                located_in(group_model, g, group_fragment) || subsumed_by_other(group_model, group, g)
            })
            .count();
        let nested_single = located_in(single_model, single, single_fragment)
            || !single_statement.ternaries.is_empty();
        if nested_group == group.len() && nested_single {
            return true;
        }
    }
    if single_statement.is_leaf() && group.iter().any(|&g| is_leaf(group_model, g)) {
        return true;
    }
    if single_statement.element() == CodeElementType::IfStatement
        && all_inverted(single_model, single, group_model, group)
    {
        return true;
    }
    conditionals_under_the_same_parent(group_model, group)
}

fn located_in(model: &CodeModel, node: StatementId, fragment: StatementId) -> bool {
    match (model.get(node), model.get(fragment)) {
        (Some(n), Some(f)) => n.location.subsumes(&f.location),
        _ => false,
    }
}

/// Sub-conditions of the `if` node `id`, or none when it is not an `if`.
fn if_sub_conditions(model: &CodeModel, id: StatementId) -> Vec<String> {
    if model.get(id).is_none_or(|s| s.element() != CodeElementType::IfStatement) {
        return Vec::new();
    }
    first_condition(model, id)
        .map(|c| sub_conditions(prepare_conditional(model.text(c))))
        .unwrap_or_default()
}

/// Every group member shares only negated sub-conditions with the `if`
/// node `single`, and `single` ends in a terminal leaf.
fn all_inverted(
    single_model: &CodeModel,
    single: StatementId,
    group_model: &CodeModel,
    group: &[StatementId],
) -> bool {
    let Some(condition) = first_condition(single_model, single) else {
        return false;
    };
    let single_conditions = sub_conditions(prepare_conditional(single_model.text(condition)));
    let inverted = group
        .iter()
        .filter(|&&g| {
            let group_conditions = if_sub_conditions(group_model, g);
            let intersection = sub_condition_intersection(&group_conditions, &single_conditions);
            intersection
                .iter()
                .all(|element| !single_conditions.contains(element))
        })
        .count();
    inverted == group.len()
        && single_model
            .get(single)
            .is_some_and(|s| has_terminal_leaf(single_model, single, &s.location))
}

/// More than one conditional, all with the same parent.
pub fn conditionals_under_the_same_parent(model: &CodeModel, conditionals: &[StatementId]) -> bool {
    let Some((&first, rest)) = conditionals.split_first() else {
        return false;
    };
    let parent = model.parent(first);
    !rest.is_empty() && rest.iter().all(|&c| model.parent(c) == parent)
}

/// Another member of `conditionals` encloses `conditional`, touches it on
/// adjacent lines, or sits inside the `if` whose else branch `conditional`
/// is.
pub fn subsumed_by_other(model: &CodeModel, conditionals: &[StatementId], conditional: StatementId) -> bool {
    let Some(c) = model.get(conditional) else {
        return false;
    };
    let else_if_parent = c
        .parent
        .filter(|&p| is_else_if_branch(model, conditional, p))
        .and_then(|p| model.get(p));
    conditionals
        .iter()
        .filter(|&&other| other != conditional)
        .filter_map(|&other| model.get(other))
        .any(|other| {
            let (a, b) = (&other.location, &c.location);
            a.subsumes(b)
                || a.starts_at_end_line_of(b)
                || b.starts_at_end_line_of(a)
                || a.next_line(b)
                || b.next_line(a)
                || else_if_parent.is_some_and(|p| p.location.subsumes(a))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Shape, StatementMapping};

    fn node(text: &str, element: CodeElementType, parent: Option<StatementId>, loc: Location) -> Statement {
        Statement {
            shape: Shape::Composite {
                children: vec![],
                expressions: vec![],
            },
            parent,
            location: loc.with_element(element),
            ..Statement::new(text)
        }
    }

    fn leaf(text: &str, parent: StatementId, loc: Location) -> Statement {
        Statement {
            parent: Some(parent),
            location: loc,
            ..Statement::new(text)
        }
    }

    fn condition(model: &mut CodeModel, owner: StatementId, text: &str) {
        model.push(Statement {
            shape: Shape::Expression { owner: Some(owner) },
            ..Statement::new(text)
        });
    }

    // -- grouping --

    #[test]
    fn test_same_parent() {
        let mut model = CodeModel::default();
        let body = model.push(node("{", CodeElementType::Block, None, Location::new(1, 20, 0, 500)));
        let a = model.push(node("if(a)", CodeElementType::IfStatement, Some(body), Location::new(2, 4, 10, 50)));
        let b = model.push(node("if(b)", CodeElementType::IfStatement, Some(body), Location::new(5, 7, 60, 90)));
        assert!(conditionals_under_the_same_parent(&model, &[a, b]));
        assert!(!conditionals_under_the_same_parent(&model, &[a]));
        assert!(!conditionals_under_the_same_parent(&model, &[a, body]));
    }

    #[test]
    fn test_subsumed_by_adjacent_line() {
        let mut model = CodeModel::default();
        let a = model.push(node("if(a)", CodeElementType::IfStatement, None, Location::new(2, 4, 10, 50)));
        let b = model.push(node("if(b)", CodeElementType::IfStatement, None, Location::new(5, 7, 60, 90)));
        let far = model.push(node("if(c)", CodeElementType::IfStatement, None, Location::new(30, 32, 900, 950)));
        assert!(subsumed_by_other(&model, &[a, b], b));
        assert!(!subsumed_by_other(&model, &[a, far], far));
    }

    // -- pairwise --

    #[test]
    fn test_split_conditional_through_nested_mapping() {
        let mut model1 = CodeModel::default();
        let if1 = model1.push(node("if(a && b)", CodeElementType::IfStatement, None, Location::new(1, 3, 0, 40)));
        let inner1 = model1.push(leaf("run();\n", if1, Location::new(2, 2, 15, 22)));
        let mut model2 = CodeModel::default();
        let if2a = model2.push(node("if(a)", CodeElementType::IfStatement, None, Location::new(1, 5, 0, 80)));
        let if2b = model2.push(node("if(b)", CodeElementType::IfStatement, Some(if2a), Location::new(2, 4, 10, 70)));
        let inner2 = model2.push(leaf("run();\n", if2b, Location::new(3, 3, 30, 37)));
        let mut mapper = MapperContext::new(model1, model2);
        assert!(!sequentially_split_conditional(&mapper, if1, if2b, if2a));
        mapper.mappings.push(StatementMapping {
            fragment1: inner1,
            fragment2: inner2,
        });
        assert!(sequentially_split_conditional(&mapper, if1, if2b, if2a));
        assert!(sequentially_related(&mapper, if1, if2a));
    }

    #[test]
    fn test_terminal_leaf_counts_as_nesting() {
        let mut model1 = CodeModel::default();
        let if1 = model1.push(node("if(a)", CodeElementType::IfStatement, None, Location::new(1, 3, 0, 40)));
        model1.push(leaf("return false;\n", if1, Location::new(2, 2, 10, 24)));
        let after = model1.push(Statement {
            location: Location::new(4, 4, 50, 60),
            ..Statement::new("go();\n")
        });
        let mut model2 = CodeModel::default();
        let if2 = model2.push(node("if(a || b)", CodeElementType::IfStatement, None, Location::new(1, 3, 0, 40)));
        model2.push(leaf("return false;\n", if2, Location::new(2, 2, 10, 24)));
        let after2 = model2.push(Statement {
            location: Location::new(4, 4, 50, 60),
            ..Statement::new("go();\n")
        });
        let mut mapper = MapperContext::new(model1, model2);
        mapper.mappings.push(StatementMapping {
            fragment1: after,
            fragment2: after2,
        });
        assert!(sequentially_merged_conditional(&mapper, if1, if1, if2));
    }

    #[test]
    fn test_leaves_are_trivially_related() {
        let mut model1 = CodeModel::default();
        let a = model1.push(Statement::new("x = a && b;\n"));
        let mut model2 = CodeModel::default();
        let b = model2.push(Statement::new("x = a;\n"));
        let mapper = MapperContext::new(model1, model2);
        assert!(sequentially_related(&mapper, a, b));
        assert!(sequentially_split_conditionals(&mapper, a, &[b]));
    }

    // -- groups --

    #[test]
    fn test_merged_conditionals_under_one_parent() {
        let mut model1 = CodeModel::default();
        let body = model1.push(node("{", CodeElementType::Block, None, Location::new(1, 20, 0, 500)));
        let a = model1.push(node("if(a)", CodeElementType::IfStatement, Some(body), Location::new(2, 4, 10, 50)));
        let b = model1.push(node("if(b)", CodeElementType::IfStatement, Some(body), Location::new(8, 9, 160, 190)));
        let mut model2 = CodeModel::default();
        let merged = model2.push(node("if(a || b)", CodeElementType::IfStatement, None, Location::new(2, 4, 10, 50)));
        condition(&mut model1, a, "a");
        condition(&mut model1, b, "b");
        condition(&mut model2, merged, "a || b");
        let mapper = MapperContext::new(model1, model2);
        assert!(sequentially_merged_conditionals(&mapper, &[a, b], merged));
    }
}
