//! Sub-condition primitives: extraction, intersection, inversion and the
//! acceptance count.

use crate::model::{CodeModel, Statement, StatementId};
use crate::replacement::{
    FragmentRef, LeafMapping, Replacement, ReplacementInfo, ReplacementKind, ReplacementType,
};
use crate::text::{
    ASSIGNMENT, RETURN_SPACE, STATEMENT_TERMINATION, common_prefix, common_suffix, contains_token,
    split_conditional,
};

const EQUALS_CALL: &str = ".equals(";

/// The boolean body of a statement: the inside of `if(..)`, `do(..)` or
/// `while(..)`, the operand of `return ..;`, or the right-hand side of an
/// assignment.
pub fn prepare_conditional(s: &str) -> &str {
    let mut conditional = s;
    for head in ["if(", "do(", "while("] {
        if let Some(inner) = s.strip_prefix(head).and_then(|rest| rest.strip_suffix(')')) {
            conditional = inner;
        }
    }
    if let Some(inner) = s
        .strip_prefix(RETURN_SPACE)
        .and_then(|rest| rest.strip_suffix(STATEMENT_TERMINATION))
    {
        conditional = inner;
    }
    if let Some(index) = s.find(ASSIGNMENT) {
        let bytes = s.as_bytes();
        let next = bytes.get(index + 1).copied();
        let prev = index.checked_sub(1).map(|i| bytes[i]);
        if next.is_some_and(|b| b != b'=')
            && prev.is_some_and(|b| b != b'!')
            && s.ends_with(STATEMENT_TERMINATION)
        {
            if let Some(rhs) = s.get(index + 1..s.len() - STATEMENT_TERMINATION.len()) {
                conditional = rhs;
            }
        }
    }
    conditional
}

/// Split `conditional` into owned, trimmed sub-conditions.
pub fn sub_conditions(conditional: &str) -> Vec<String> {
    split_conditional(conditional)
        .into_iter()
        .map(str::to_owned)
        .collect()
}

/// Sub-expressions of statement `id` (and of its header expressions) whose
/// text is exactly `s`.
pub fn find_fragments(model: &CodeModel, id: StatementId, s: &str) -> Vec<FragmentRef> {
    let Some(statement) = model.get(id) else {
        return Vec::new();
    };
    let own = statement
        .find_expression(s)
        .into_iter()
        .map(|i| FragmentRef::expression(id, &statement.expressions[i]));
    let header = statement.header_expressions().iter().flat_map(|&expr| {
        model.get(expr).into_iter().flat_map(move |e| {
            e.find_expression(s)
                .into_iter()
                .map(move |i| FragmentRef::expression(expr, &e.expressions[i]))
        })
    });
    let mut out: Vec<FragmentRef> = Vec::new();
    for fragment in own.chain(header) {
        if !out.iter().any(|f| f.location == fragment.location) {
            out.push(fragment);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// SubConditions
// ---------------------------------------------------------------------------

/// The sub-conditions of one side, in order, with the sub-expressions each
/// one was found at.
#[derive(Debug, Clone, Default)]
pub struct SubConditions {
    pub list: Vec<String>,
    fragments: Vec<(String, Vec<FragmentRef>)>,
}

impl SubConditions {
    /// Split `conditional` and index every piece in statement `id`.
    pub fn collect(conditional: &str, model: &CodeModel, id: StatementId) -> Self {
        let mut out = Self::default();
        out.extend(conditional, model, id);
        out
    }

    pub fn extend(&mut self, conditional: &str, model: &CodeModel, id: StatementId) {
        for piece in split_conditional(conditional) {
            let found = find_fragments(model, id, piece);
            self.push(piece.to_owned(), found);
        }
    }

    /// Append `piece`; a non-empty `found` becomes its fragment entry.
    pub fn push(&mut self, piece: String, found: Vec<FragmentRef>) {
        if !found.is_empty() {
            self.insert(piece.clone(), found);
        }
        self.list.push(piece);
    }

    /// Set the fragments of `key`, keeping its first insertion position.
    pub fn insert(&mut self, key: String, found: Vec<FragmentRef>) {
        match self.fragments.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = found,
            None => self.fragments.push((key, found)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&[FragmentRef]> {
        self.fragments
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fragments.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Intersection
// ---------------------------------------------------------------------------

fn push_unique(out: &mut Vec<String>, s: &str) {
    if !out.iter().any(|x| x == s) {
        out.push(s.to_owned());
    }
}

/// `c` is `c2` negated with `!` or `!( .. )`.
fn negation_of(c: &str, other: &str) -> bool {
    c.strip_prefix('!') == Some(other)
        || c.strip_prefix("!(")
            .and_then(|rest| rest.strip_suffix(')'))
            == Some(other)
}

/// Operands around the first `op`, untrimmed.
fn operands<'a>(c: &'a str, op: &str) -> Option<(&'a str, &'a str)> {
    let index = c.find(op)?;
    Some((&c[..index], &c[index + op.len()..]))
}

/// `receiver.equals(argument)` split into `(receiver, argument)`.
fn equals_call(c: &str) -> Option<(&str, &str)> {
    if !c.ends_with(')') {
        return None;
    }
    let index = c.find(EQUALS_CALL)?;
    let close = c.rfind(')')?;
    let argument = c.get(index + EQUALS_CALL.len()..close)?;
    Some((&c[..index], argument))
}

/// Both strings share a non-empty prefix and a non-empty suffix once a
/// leading `!` is dropped from each. Returns the number of `!` dropped.
fn loosely_equal(mut a: &str, mut b: &str) -> Option<usize> {
    let inverted = strip_negation(&mut a) + strip_negation(&mut b);
    shares_prefix_and_suffix(a, b).then_some(inverted)
}

/// Drop a leading `!` from `s`. Returns the number of `!` dropped.
fn strip_negation(s: &mut &str) -> usize {
    match s.strip_prefix('!') {
        Some(rest) => {
            *s = rest;
            1
        }
        None => 0,
    }
}

fn shares_prefix_and_suffix(a: &str, b: &str) -> bool {
    !common_prefix(a, b).is_empty() && !common_suffix(a, b).is_empty()
}

/// Sub-conditions shared by both lists, in side 1 order.
///
/// Two sub-conditions are shared when they are equal, differ by a dangling
/// parenthesis, differ by a negation, are `==`/`!=` duals of the same
/// operands, or are the same `.equals(..)` test with invoker and argument
/// swapped. Parenthesis and negation variants contribute the bare form.
pub fn sub_condition_intersection(list1: &[String], list2: &[String]) -> Vec<String> {
    let mut intersection = Vec::new();
    for c1 in list1 {
        for c2 in list2 {
            let (c1, c2) = (c1.as_str(), c2.as_str());
            if c1 == c2 {
                push_unique(&mut intersection, c1);
                break;
            } else if c1.strip_prefix('(') == Some(c2) || c1.strip_suffix(')') == Some(c2) {
                push_unique(&mut intersection, c2);
                break;
            } else if negation_of(c1, c2) {
                push_unique(&mut intersection, c2);
                break;
            } else if c2.strip_prefix('(') == Some(c1) || c2.strip_suffix(')') == Some(c1) {
                push_unique(&mut intersection, c1);
                break;
            } else if negation_of(c2, c1) {
                push_unique(&mut intersection, c1);
                break;
            } else if c1.contains("!=") && c2.contains("==") {
                if operands(c1, "!=") == operands(c2, "==") {
                    push_unique(&mut intersection, c1);
                    break;
                }
            } else if c1.contains("==") && c2.contains("!=") {
                if operands(c1, "==") == operands(c2, "!=") {
                    push_unique(&mut intersection, c1);
                    break;
                }
            } else if let (Some((prefix1, arg1)), Some((prefix2, arg2))) =
                (equals_call(c1), equals_call(c2))
            {
                if arg2 == prefix1 && (arg1 == prefix2 || loosely_equal(arg1, prefix2).is_some()) {
                    push_unique(&mut intersection, arg2);
                    break;
                }
                if arg1 == prefix2 && (arg2 == prefix1 || loosely_equal(arg2, prefix1).is_some()) {
                    push_unique(&mut intersection, arg1);
                    break;
                }
            }
        }
    }
    intersection
}

/// The trimmed operands around `op` of both sides are the replacement
/// targets of some recorded edit, on both sides at once.
fn both_operands_replaced(info: &ReplacementInfo, prefix: (&str, &str), suffix: (&str, &str)) -> bool {
    let replaced = |a: &str, b: &str| {
        info.replacements()
            .iter()
            .any(|r| r.before != r.after && r.after == a && r.after == b)
    };
    replaced(prefix.0, prefix.1) && replaced(suffix.0, suffix.1)
}

/// Record an INVERT_CONDITIONAL for every sub-condition of side 1 whose
/// negation appears on side 2. Returns how many were found.
pub fn check_for_inverted_conditionals(
    list1: &[String],
    list2: &[String],
    info: &mut ReplacementInfo,
) -> usize {
    let mut inverted = 0;
    for c1 in list1 {
        for c2 in list2 {
            let invert = || Replacement::new(c1.as_str(), c2.as_str(), ReplacementKind::InvertConditional);
            if negation_of(c1, c2) || negation_of(c2, c1) {
                info.add(invert());
                inverted += 1;
                break;
            }
            let dual = if c1.contains("==") && c2.contains("!=") {
                Some(("==", "!="))
            } else if c1.contains("!=") && c2.contains("==") {
                Some(("!=", "=="))
            } else {
                None
            };
            if let Some((op1, op2)) = dual {
                let (Some((p1, s1)), Some((p2, s2))) = (operands(c1, op1), operands(c2, op2)) else {
                    continue;
                };
                let (p1, s1, p2, s2) = (p1.trim(), s1.trim(), p2.trim(), s2.trim());
                if p1 == p2 && s1 == s2 && !both_operands_replaced(info, (p1, p2), (s1, s2)) {
                    info.add(invert());
                    inverted += 1;
                    break;
                }
                continue;
            }
            let (Some((mut prefix1, mut arg1)), Some((mut prefix2, mut arg2))) =
                (equals_call(c1), equals_call(c2))
            else {
                continue;
            };
            if arg2 == prefix1 && arg1 != prefix2 {
                let negations = strip_negation(&mut arg1) + strip_negation(&mut prefix2);
                if negations == 1 && shares_prefix_and_suffix(arg1, prefix2) {
                    info.add(invert());
                    inverted += 1;
                    break;
                }
            }
            if arg1 == prefix2 && arg2 != prefix1 {
                let negations = strip_negation(&mut arg2) + strip_negation(&mut prefix1);
                if negations == 1 && shares_prefix_and_suffix(arg2, prefix1) {
                    info.add(invert());
                    inverted += 1;
                    break;
                }
            }
        }
    }
    inverted
}

// ---------------------------------------------------------------------------
// Acceptance
// ---------------------------------------------------------------------------

const NULL_OR_ZERO_CHECKS: [&str; 4] = [" != null", " == null", " != 0", " == 0"];

/// A recorded replacement explains `element`.
fn explained_by(element: &str, r: &Replacement) -> bool {
    let after = r.after.as_str();
    if element == after
        || element.strip_prefix('(') == Some(after)
        || element.strip_suffix(')') == Some(after)
        || element.strip_prefix('!') == Some(after)
    {
        return true;
    }
    if (r.is(ReplacementType::InfixOperator) || r.is(ReplacementType::InfixExpression))
        && element.contains(after)
    {
        return true;
    }
    !r.getter_replacement()
        && contains_token(element, after)
        && element.starts_with(after)
        && NULL_OR_ZERO_CHECKS.iter().any(|check| element.ends_with(check))
}

/// Intersection elements that count as genuine matches: those no recorded
/// replacement explains, plus those present verbatim in both statements.
pub fn match_count(
    intersection: &[String],
    info: &ReplacementInfo,
    statement1: &Statement,
    statement2: &Statement,
) -> usize {
    intersection
        .iter()
        .filter(|element| {
            let explained = info.replacements().iter().any(|r| explained_by(element, r));
            !explained
                || (statement1.text.contains(element.as_str())
                    && statement2.text.contains(element.as_str()))
        })
        .count()
}

/// Accept an intersection. A lone null check must account for every
/// sub-condition of the smaller side.
pub fn pass(list1: &[String], list2: &[String], intersection: &[String], matches: usize) -> bool {
    match intersection {
        [only] if matches == 1 && only.ends_with("null") => matches == list1.len().min(list2.len()),
        _ => matches > 0,
    }
}

// ---------------------------------------------------------------------------
// Sub-expression mappings
// ---------------------------------------------------------------------------

/// `key` with its first `from` operator turned into `to`.
fn swap_operator(key: &str, from: &str, to: &str) -> Option<String> {
    let (prefix, suffix) = operands(key, from)?;
    Some(format!("{prefix}{to}{suffix}"))
}

fn lookup<'a>(map: &'a SubConditions, key: &str) -> Option<&'a [FragmentRef]> {
    map.get(key)
        .or_else(|| map.get(&format!("!{key}")))
        .or_else(|| map.get(&format!("!({key})")))
}

/// Pair every side 1 fragment of each intersection element with every
/// side 2 fragment of it. Side 2 also accepts the `==`/`!=` dual.
pub fn create_leaf_mappings(
    map1: &SubConditions,
    map2: &SubConditions,
    intersection: &[String],
) -> Vec<LeafMapping> {
    let mut out = Vec::new();
    for key in intersection {
        let leaf1 = lookup(map1, key);
        let leaf2 = lookup(map2, key)
            .or_else(|| swap_operator(key, "==", "!=").and_then(|k| map2.get(&k)))
            .or_else(|| swap_operator(key, "!=", "==").and_then(|k| map2.get(&k)));
        let (Some(leaf1), Some(leaf2)) = (leaf1, leaf2) else {
            continue;
        };
        for l1 in leaf1 {
            for l2 in leaf2 {
                let mapping = LeafMapping::new(l1.clone(), l2.clone());
                if !out.contains(&mapping) {
                    out.push(mapping);
                }
            }
        }
    }
    out
}
