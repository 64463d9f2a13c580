//! `common_conditional`, the entry rule of the conditional sub-engine.

use tracing::{debug, trace};

use super::Side;
use super::adjacency::{
    sequentially_merged_conditional, sequentially_merged_conditionals, sequentially_split_conditional,
    sequentially_split_conditionals,
};
use super::branches::{
    contains_identical_if_node, else_if_branch, identical_composite_in_the_other_container,
    includes_local_variable, valid_method_invocation_replacement,
};
use super::subconditions::{
    SubConditions, check_for_inverted_conditionals, create_leaf_mappings, find_fragments, match_count,
    pass, prepare_conditional, sub_condition_intersection, sub_conditions,
};
use crate::model::{Call, CodeModel, PairContext, Statement, StatementId};
use crate::refactoring::ConditionalRefactoring;
use crate::replacement::{
    FragmentRef, LeafMapping, Replacement, ReplacementInfo, ReplacementKind, ReplacementType,
};
use crate::rules::anonymous::contains_method_signature_of_anonymous_class;
use crate::rules::operators::invert_conditional_direction;
use crate::text::{common_prefix, common_suffix, levenshtein, perform_replacement, split_conditional};

/// Operator pairs whose operands swap sides when a comparison is flipped.
const FLIPPED_COMPARISONS: [(&str, &str); 4] =
    [(" >= ", " <= "), (" <= ", " >= "), (" > ", " < "), (" < ", " > ")];

const NULL_CHECKS: [&str; 2] = [" != null", " == null"];

/// The two statements are the same boolean condition under a
/// sub-condition intersection, an inversion, a split or merge into sibling
/// `if` nodes, a ternary rewrite, or a flipped comparison.
///
/// Besides replacements, the rule may record Split Conditional, Merge
/// Conditional, Invert Condition, Replace Conditional With Ternary and
/// Extract Variable candidates on `info`.
pub fn common_conditional(s1: &str, s2: &str, ctx: &PairContext<'_>, info: &mut ReplacementInfo) -> bool {
    let f1 = ctx.fragment1();
    let f2 = ctx.fragment2();
    let array_creation =
        |s: &Statement| s.creation_covering_entire_fragment().is_some_and(Call::is_array_creation);
    if array_creation(f1)
        || array_creation(f2)
        || contains_method_signature_of_anonymous_class(s1)
        || contains_method_signature_of_anonymous_class(s2)
    {
        return false;
    }
    let ternaries1 = ternary_components(f1, Some(&*info));
    let ternaries2 = ternary_components(f2, None);
    let ternary_replacement = info
        .replacements()
        .iter()
        .any(|r| r.after.contains(" ? ") && r.after.contains(" : "));
    let ternary_conditions = !ternary_replacement
        && ternaries1.is_empty() != ternaries2.is_empty()
        && (f1.element() == f2.element() || f1.is_expression());
    let logical = [s1, s2].iter().any(|s| s.contains("||") || s.contains("&&"));
    let negation_differs = s1.contains('!') != s2.contains('!');

    if logical || ternary_conditions || negation_differs {
        let pair = ConditionalPair {
            ctx,
            s1,
            s2,
            ternaries1,
            ternaries2,
            ternary_conditions,
            logical,
        };
        if info.attempt(|info| pair.compare(info)) {
            return true;
        }
    }
    for (op1, op2) in FLIPPED_COMPARISONS {
        if s1.contains(op1)
            && s2.contains(op2)
            && let Some(r) = invert_conditional_direction(s1, s2, op1, op2)
        {
            trace!(before = %r.before, after = %r.after, "comparison direction flipped");
            info.add(r);
            return true;
        }
    }
    false
}

/// Condition, then and else texts of every ternary in `statement`. With
/// `info`, the recorded replacements are applied to each text.
fn ternary_components(statement: &Statement, info: Option<&ReplacementInfo>) -> Vec<String> {
    statement
        .ternaries
        .iter()
        .flat_map(|t| [&t.condition, &t.then_expression, &t.else_expression])
        .map(|e| match info {
            Some(info) => info
                .replacements()
                .iter()
                .fold(e.text.clone(), |acc, r| perform_replacement(&acc, &r.before, &r.after)),
            None => e.text.clone(),
        })
        .collect()
}

/// Sub-conditions of ternary components, each narrowed to the ternary
/// component it is when exactly one such match exists.
fn ternary_sub_conditions(components: &[String], model: &CodeModel, id: StatementId) -> SubConditions {
    let mut out = SubConditions::default();
    let statement = model.get(id);
    for component in components {
        for piece in split_conditional(prepare_conditional(component)) {
            let found = find_fragments(model, id, piece);
            let found = match statement {
                Some(s) => narrow_to_ternary(found, s),
                None => found,
            };
            out.push(piece.to_owned(), found);
        }
    }
    out
}

fn narrow_to_ternary(found: Vec<FragmentRef>, statement: &Statement) -> Vec<FragmentRef> {
    let mut hit = None;
    let mut count = 0;
    for fragment in &found {
        for t in &statement.ternaries {
            for component in [&t.condition, &t.then_expression, &t.else_expression] {
                if fragment.location == Some(component.location) {
                    hit = Some(fragment.clone());
                    count += 1;
                }
            }
        }
    }
    match hit {
        Some(hit) if count == 1 => vec![hit],
        _ => found,
    }
}

fn push_unique(out: &mut Vec<StatementId>, id: StatementId) {
    if !out.contains(&id) {
        out.push(id);
    }
}

/// Unmatched `if` nodes among the composites of `root`.
fn collect_inner_ifs(
    model: &CodeModel,
    root: StatementId,
    mapped: &dyn Fn(StatementId) -> bool,
    out: &mut Vec<StatementId>,
) {
    for inner in model.inner_nodes(root) {
        if model.get(inner).is_some_and(Statement::is_if) && !mapped(inner) {
            push_unique(out, inner);
        }
    }
}

/// The unmatched `if` owning the block `root`, plus its else-if branch.
fn collect_enclosing_if(
    model: &CodeModel,
    root: Option<StatementId>,
    mapped: &dyn Fn(StatementId) -> bool,
    out: &mut Vec<StatementId>,
) {
    let Some(owner) = root.and_then(|r| model.parent(r)) else {
        return;
    };
    if !model.get(owner).is_some_and(Statement::is_if) || mapped(owner) {
        return;
    }
    push_unique(out, owner);
    if let Some(branch) = else_if_branch(model, owner) {
        push_unique(out, branch);
    }
}

/// The part of `c` between `prefix` and `suffix`.
fn middle<'a>(c: &'a str, prefix: &str, suffix: &str) -> &'a str {
    let begin = c.find(prefix).map_or(0, |i| i + prefix.len());
    let end = c.rfind(suffix).unwrap_or(c.len());
    c.get(begin..end).unwrap_or("")
}

/// Every `!=`/`==` counted, comparisons turned into equality checks are
/// not, and the only other edits are operator replacements.
fn only_infix_operator_replacements(info: &ReplacementInfo, intersection: &[String]) -> bool {
    if intersection.is_empty() {
        return false;
    }
    let counted: Vec<&Replacement> = info
        .replacements()
        .iter()
        .filter(|r| {
            !matches!(
                r.replacement_type(),
                ReplacementType::Conditional
                    | ReplacementType::InvertConditional
                    | ReplacementType::NullLiteralCheckReplacedWithOptionalIsEmptyCheck
                    | ReplacementType::NullLiteralCheckReplacedWithOptionalIsPresentCheck
                    | ReplacementType::NullLiteralReplacedWithOptionalEmpty
            )
        })
        .collect();
    let comparison_to_equality = counted.iter().any(|r| {
        matches!(r.before.as_str(), "<" | ">" | "<=" | ">=") && matches!(r.after.as_str(), "!=" | "==")
    });
    let single_null_check = matches!(
        intersection,
        [only] if only.contains("== null") || only.contains("!= null")
    );
    !counted.is_empty()
        && !single_null_check
        && !comparison_to_equality
        && info.count_kind(ReplacementType::InfixOperator) == counted.len()
}

// ---------------------------------------------------------------------------
// ConditionalPair
// ---------------------------------------------------------------------------

/// One comparison routed through the sub-condition analysis.
struct ConditionalPair<'a> {
    ctx: &'a PairContext<'a>,
    s1: &'a str,
    s2: &'a str,
    ternaries1: Vec<String>,
    ternaries2: Vec<String>,
    ternary_conditions: bool,
    logical: bool,
}

impl ConditionalPair<'_> {
    fn compare(&self, info: &mut ReplacementInfo) -> bool {
        let ctx = self.ctx;
        let (f1, f2) = (ctx.fragment1(), ctx.fragment2());
        let (sub1, sub2) = self.collect();
        let intersection = sub_condition_intersection(&sub1.list, &sub2.list);
        let matches = match_count(&intersection, info, f1, f2);
        let passed = pass(&sub1.list, &sub2.list, &intersection, matches);
        let boolean_return = ctx.model1().is_last_statement_with_boolean_return(ctx.statement1)
            || ctx.model2().is_last_statement_with_boolean_return(ctx.statement2);
        trace!(?intersection, matches, passed, boolean_return, "sub-condition intersection");

        if (passed && !info.contains_kind(ReplacementType::Type) && valid_method_invocation_replacement(info))
            || boolean_return
        {
            let conditional = self.record_conditional(info, &sub1, &sub2, &intersection, boolean_return);
            self.split_or_merge(info, &sub1, &sub2, &intersection, &conditional);
        }

        let inverted = check_for_inverted_conditionals(&sub1.list, &sub2.list, info);
        let only_infix = matches == 0 && inverted == 0 && only_infix_operator_replacements(info, &intersection);
        if (inverted > 0 || matches > 0 || only_infix)
            && !info.contains_kind(ReplacementType::Type)
            && valid_method_invocation_replacement(info)
            && !includes_local_variable(ctx, &intersection)
        {
            self.invert_and_ternary_candidates(info, matches, inverted);
            return true;
        }
        if !passed && f1.is_expression() && !f2.is_expression() {
            return self.compatible_invocation(info, &sub2);
        }
        false
    }

    fn collect(&self) -> (SubConditions, SubConditions) {
        let ctx = self.ctx;
        let (m1, m2) = (ctx.model1(), ctx.model2());
        let (id1, id2) = (ctx.statement1, ctx.statement2);
        if self.ternary_conditions && (!self.logical || ctx.fragment1().is_expression()) {
            if self.ternaries1.is_empty() {
                return (
                    SubConditions::collect(prepare_conditional(self.s1), m1, id1),
                    ternary_sub_conditions(&self.ternaries2, m2, id2),
                );
            }
            return (
                ternary_sub_conditions(&self.ternaries1, m1, id1),
                SubConditions::collect(prepare_conditional(self.s2), m2, id2),
            );
        }
        (
            SubConditions::collect(prepare_conditional(self.s1), m1, id1),
            SubConditions::collect(prepare_conditional(self.s2), m2, id2),
        )
    }

    /// Record the CONDITIONAL replacement of the pair, unless the match
    /// only stands because one side ends in a boolean return. Returns the
    /// replacement, mappings included.
    fn record_conditional(
        &self,
        info: &mut ReplacementInfo,
        sub1: &SubConditions,
        sub2: &SubConditions,
        intersection: &[String],
        boolean_return: bool,
    ) -> Replacement {
        let mut r = Replacement::new(self.s1, self.s2, ReplacementKind::conditional());
        if !boolean_return {
            for mapping in create_leaf_mappings(sub1, sub2, intersection) {
                r.add_sub_expression_mapping(mapping);
            }
            info.add(r.clone());
        }
        r
    }

    /// Candidate `if` nodes on both sides: the `if` owning the enclosing
    /// block, and every unmatched `if` under the enclosing root.
    fn if_nodes(&self) -> (Vec<StatementId>, Vec<StatementId>) {
        let ctx = self.ctx;
        let mapper = ctx.mapper;
        let (m1, m2) = (ctx.model1(), ctx.model2());
        let mapped1 = |id| mapper.is_mapped1(id);
        let mapped2 = |id| mapper.is_mapped2(id);
        let mut nodes1 = Vec::new();
        let mut nodes2 = Vec::new();
        let mut root1 = m1.parent(ctx.statement1);
        let mut root2 = m2.parent(ctx.statement2);
        collect_enclosing_if(m1, root1, &mapped1, &mut nodes1);
        collect_enclosing_if(m2, root2, &mapped2, &mut nodes2);

        let top_level = |m: &CodeModel, root: Option<StatementId>| root.is_some_and(|r| m.parent(r).is_none());
        if top_level(m1, root1)
            && ctx.fragment1().is_composite()
            && top_level(m2, root2)
            && ctx.fragment2().is_composite()
        {
            root1 = Some(ctx.statement1);
            root2 = Some(ctx.statement2);
        }
        if let (Some(r1), Some(r2)) = (root1, root2) {
            collect_inner_ifs(m1, r1, &mapped1, &mut nodes1);
            if let Some(p) = m1.parent(r1).filter(|_| !mapper.has_parent_mapper) {
                collect_inner_ifs(m1, p, &mapped1, &mut nodes1);
            }
            collect_inner_ifs(m2, r2, &mapped2, &mut nodes2);
            if let Some(p) = m2.parent(r2).filter(|_| !mapper.has_parent_mapper) {
                collect_inner_ifs(m2, p, &mapped2, &mut nodes2);
            }
        }
        (nodes1, nodes2)
    }

    fn split_or_merge(
        &self,
        info: &mut ReplacementInfo,
        sub1: &SubConditions,
        sub2: &SubConditions,
        intersection: &[String],
        conditional: &Replacement,
    ) {
        let ctx = self.ctx;
        let mapper = ctx.mapper;
        let (nodes1, nodes2) = self.if_nodes();
        let (mut identical1, mut identical2) = (0, 0);
        if nodes1.len() == nodes2.len() && ctx.model1().root.is_some() && ctx.model2().root.is_some() {
            identical1 = nodes1
                .iter()
                .filter(|&&n| identical_composite_in_the_other_container(mapper, n, Side::One))
                .count();
            identical2 = nodes2
                .iter()
                .filter(|&&n| identical_composite_in_the_other_container(mapper, n, Side::Two))
                .count();
        }
        let remaining1 = nodes1.len() - identical1;
        let remaining2 = nodes2.len() - identical2;
        trace!(?nodes1, ?nodes2, remaining1, remaining2, "candidate if nodes");

        if remaining1 <= remaining2 && remaining2 > 0 {
            self.search_split(info, sub1, sub2, intersection, conditional, &nodes1, &nodes2);
            self.check_for_merge_conditionals(info, sub1, sub2, intersection, &nodes1, &nodes2);
        } else if nodes1.len() > nodes2.len() {
            self.check_for_merge_conditionals(info, sub1, sub2, intersection, &nodes1, &nodes2);
            if !self.ternaries2.is_empty() && self.ternaries1.is_empty() {
                self.map_ternary_components(info, sub2, &nodes1, conditional);
            }
        }
    }

    /// Drop a stale refactoring the candidate conflicts with. Returns
    /// whether one was found, in which case the candidate is not added.
    fn retract_conflict(&self, info: &mut ReplacementInfo, candidate: &ConditionalRefactoring) -> bool {
        let stale = self
            .ctx
            .mapper
            .existing_refactorings
            .iter()
            .chain(info.refactorings())
            .find(|old| candidate.conflicts_with(old))
            .cloned();
        match stale {
            Some(old) => {
                debug!(refactoring = old.name(), "conflicting conditional refactoring retracted");
                info.retract(&old);
                true
            }
            None => false,
        }
    }

    // -- Split --

    #[allow(clippy::too_many_arguments)]
    fn search_split(
        &self,
        info: &mut ReplacementInfo,
        sub1: &SubConditions,
        sub2: &SubConditions,
        intersection: &[String],
        conditional: &Replacement,
        nodes1: &[StatementId],
        nodes2: &[StatementId],
    ) {
        let ctx = self.ctx;
        let mapper = ctx.mapper;
        let (m1, m2) = (ctx.model1(), ctx.model2());
        let (f1, f2) = (ctx.fragment1(), ctx.fragment2());
        let mut split = false;
        let mut inverted = 0;
        let mut inferred = Vec::new();
        let mut last: Option<(SubConditions, Vec<String>)> = None;

        for &node2 in nodes2 {
            let Some(n2) = m2.get(node2) else { continue };
            let Some(&expression2) = n2.header_expressions().first() else {
                continue;
            };
            if node2 == ctx.statement2
                || n2.header_expressions().contains(&ctx.statement2)
                || contains_identical_if_node(m1, nodes1, m2, node2)
                || !sequentially_split_conditional(mapper, ctx.statement1, node2, ctx.statement2)
            {
                continue;
            }
            let mut split_sub = SubConditions::collect(m2.text(expression2), m2, node2);
            let mut intersection2 = sub_condition_intersection(&sub1.list, &split_sub.list);
            if intersection2.is_empty() {
                inferred.extend(self.infer_through_declarations(info, &mut split_sub, expression2, nodes1));
                intersection2 = sub_condition_intersection(&sub1.list, &split_sub.list);
            }
            let matches2 = match_count(&intersection2, info, f1, f2);
            let composite = || Replacement::composite(f1.text.as_str(), n2.text.as_str(), Vec::new(), vec![node2]);
            if pass(&sub1.list, &split_sub.list, &intersection2, matches2)
                && !intersection2.iter().all(|e| intersection.contains(e))
            {
                info.add(composite());
                split = true;
                inverted = check_for_inverted_conditionals(&sub1.list, &split_sub.list, info);
            } else if f1.is_composite() && self.split_by_related_sub_conditions(info, &split_sub, conditional) {
                info.add(composite());
                split = true;
            }
            last = Some((split_sub, intersection2));
        }

        let equal_with_inverted = nodes1.len() == nodes2.len() && inverted > 0;
        if !split || equal_with_inverted {
            return;
        }
        let mut conditionals = Vec::new();
        if f2.is_expression() {
            if let Some(owner) = f2.owner() {
                conditionals.push(owner);
            }
        } else {
            conditionals.push(ctx.statement2);
        }
        for r in info.by_kind(ReplacementType::Composite) {
            for &id in r.additionally_matched2() {
                push_unique(&mut conditionals, id);
            }
        }
        if !sequentially_split_conditionals(mapper, ctx.statement1, &conditionals) {
            trace!(?conditionals, "split conditionals are not sequential");
            return;
        }
        let mut candidate = ConditionalRefactoring::SplitConditional {
            original: ctx.statement1,
            split: conditionals,
            mappings: Vec::new(),
        };
        if self.retract_conflict(info, &candidate) {
            return;
        }
        let mut mappings = create_leaf_mappings(sub1, sub2, intersection);
        if let Some((split_sub, intersection2)) = &last {
            mappings.extend(create_leaf_mappings(sub1, split_sub, intersection2));
        }
        mappings.extend(inferred);
        for mapping in mappings {
            candidate.add_sub_expression_mapping(mapping);
        }
        debug!(refactoring = candidate.name(), "conditional refactoring candidate");
        info.add_refactoring(candidate);
    }

    /// The split conditional tests a local variable whose declaration
    /// holds a side 1 sub-condition: add the initializer's sub-conditions
    /// and map the variable's uses back onto side 1.
    fn infer_through_declarations(
        &self,
        info: &ReplacementInfo,
        split_sub: &mut SubConditions,
        expression2: StatementId,
        nodes1: &[StatementId],
    ) -> Vec<LeafMapping> {
        let ctx = self.ctx;
        let (m1, m2) = (ctx.model1(), ctx.model2());
        let f2 = ctx.fragment2();
        let mut inferred = Vec::new();
        for &declaring in &info.statements2 {
            let Some(declaration) = m2.first_declaration(declaring) else {
                continue;
            };
            let name = declaration.name.as_str();
            for sub in split_sub.list.clone() {
                if sub != name && sub.strip_prefix('!') != Some(name) {
                    continue;
                }
                let Some(cond) = declaration.initializer_text() else {
                    continue;
                };
                if f2.text.contains(name) {
                    continue;
                }
                split_sub.extend(cond, m2, declaring);
                let leaf2 = match sub.strip_prefix('!') {
                    Some(bare) => {
                        let mut found = find_fragments(m2, expression2, bare);
                        found.extend(find_fragments(m2, expression2, &sub));
                        found
                    }
                    None => find_fragments(m2, expression2, &sub),
                };
                if leaf2.is_empty() {
                    continue;
                }
                let mut leaf1 = negated_variants_in(m1, nodes1, cond);
                if leaf1.is_empty() {
                    let inlined = inline_other_declarations(m2, &info.statements2, declaring, cond);
                    leaf1 = negated_variants_in(m1, nodes1, &inlined);
                }
                if leaf1.len() == leaf2.len() {
                    inferred.extend(
                        leaf1
                            .iter()
                            .cloned()
                            .zip(leaf2)
                            .map(|(l1, l2)| LeafMapping::new(l1, l2)),
                    );
                }
                if let (Some(first1), Some(first2)) =
                    (leaf1.first(), find_fragments(m2, declaring, cond).into_iter().next())
                {
                    inferred.push(LeafMapping::new(first1.clone(), first2));
                }
            }
        }
        inferred
    }

    /// Side 1 header sub-conditions not yet mapped that still relate to a
    /// sub-condition of the split conditional: equal and untouched by any
    /// replacement, null checks of related variables, extracted into a
    /// local variable, or equal up to one recorded replacement.
    fn split_by_related_sub_conditions(
        &self,
        info: &mut ReplacementInfo,
        split_sub: &SubConditions,
        conditional: &Replacement,
    ) -> bool {
        let ctx = self.ctx;
        let m1 = ctx.model1();
        let mut found = false;
        for &expression in ctx.fragment1().header_expressions() {
            let mut originals = sub_conditions(prepare_conditional(m1.text(expression)));
            for mapping in conditional.sub_expression_mappings() {
                if let Some(i) = originals.iter().position(|c| *c == mapping.fragment1.text) {
                    originals.remove(i);
                }
            }
            for c1 in &originals {
                for c2 in &split_sub.list {
                    if c1 == c2 && !info.replacements().iter().any(|r| c1.contains(r.before.as_str())) {
                        found = true;
                    }
                    if self.related_null_checks(c1, c2) {
                        found = true;
                    }
                    let prefix = common_prefix(c1, c2);
                    let suffix = common_suffix(c1, c2);
                    if prefix.is_empty() && !suffix.is_empty() {
                        if self.extracted_sub_condition(info, c1, c2, suffix, expression) {
                            found = true;
                        }
                    } else if !prefix.is_empty()
                        && !suffix.is_empty()
                        && replaced_middle(info, c1, c2, prefix, suffix)
                    {
                        found = true;
                    }
                }
            }
        }
        found
    }

    /// `x != null` against `y != null` where a mapped declaration of `x` is
    /// initialized from `y.`.
    fn related_null_checks(&self, c1: &str, c2: &str) -> bool {
        let Some(check) = NULL_CHECKS.iter().find(|s| c1.ends_with(*s) && c2.ends_with(*s)) else {
            return false;
        };
        let prefix1 = &c1[..c1.len() - check.len()];
        let prefix2 = &c2[..c2.len() - check.len()];
        let dotted = format!("{prefix2}.");
        let mapper = self.ctx.mapper;
        mapper.mappings.iter().any(|m| {
            let d1 = mapper.model1.get(m.fragment1).and_then(|s| s.variable_declaration(prefix1));
            let d2 = mapper.model2.get(m.fragment2).and_then(|s| s.variable_declaration(prefix1));
            let (Some(d1), Some(d2)) = (d1, d2) else {
                return false;
            };
            [d1, d2]
                .iter()
                .any(|d| d.initializer_text().is_some_and(|t| t.starts_with(&dotted)))
        })
    }

    /// `c1` and `c2` share a suffix, and the part of `c2` before it is a new
    /// local variable initialized with the part of `c1` before it. Records
    /// the Extract Variable candidate.
    fn extracted_sub_condition(
        &self,
        info: &mut ReplacementInfo,
        c1: &str,
        c2: &str,
        suffix: &str,
        expression: StatementId,
    ) -> bool {
        let ctx = self.ctx;
        let (m1, m2) = (ctx.model1(), ctx.model2());
        let (Some(end1), Some(end2)) = (c1.rfind(suffix), c2.rfind(suffix)) else {
            return false;
        };
        let (diff1, diff2) = (&c1[..end1], &c2[..end2]);
        let candidates = info.statements2.clone();
        for declaring in candidates {
            let Some(declaration) = m2.first_declaration(declaring) else {
                continue;
            };
            let Some(initializer) = declaration.initializer_text() else {
                continue;
            };
            if declaration.name != diff2 || initializer != diff1 {
                continue;
            }
            let mut extract = ConditionalRefactoring::ExtractVariable {
                declaration: declaring,
                variable: declaration.name.clone(),
                inside_extracted_or_inlined: ctx.mapper.has_parent_mapper,
                mappings: Vec::new(),
            };
            for fragment in find_fragments(m1, expression, initializer) {
                extract.add_sub_expression_mapping(LeafMapping::new(
                    fragment,
                    FragmentRef::text(declaring, initializer),
                ));
            }
            debug!(variable = %declaration.name, "sub-condition extracted to a variable");
            info.add_refactoring(extract);
            return true;
        }
        false
    }

    // -- Merge --

    fn check_for_merge_conditionals(
        &self,
        info: &mut ReplacementInfo,
        sub1: &SubConditions,
        sub2: &SubConditions,
        intersection: &[String],
        nodes1: &[StatementId],
        nodes2: &[StatementId],
    ) {
        let ctx = self.ctx;
        let mapper = ctx.mapper;
        let (m1, m2) = (ctx.model1(), ctx.model2());
        let (f1, f2) = (ctx.fragment1(), ctx.fragment2());
        let mut merge = false;
        let mut last: Option<(SubConditions, Vec<String>)> = None;

        for &node1 in nodes1 {
            let Some(n1) = m1.get(node1) else { continue };
            let Some(&expression1) = n1.header_expressions().first() else {
                continue;
            };
            if node1 == ctx.statement1
                || n1.header_expressions().contains(&ctx.statement1)
                || contains_identical_if_node(m2, nodes2, m1, node1)
                || !sequentially_merged_conditional(mapper, node1, ctx.statement1, ctx.statement2)
            {
                continue;
            }
            let mut merged_sub = SubConditions::default();
            for piece in split_conditional(m1.text(expression1)) {
                let found = find_fragments(m1, node1, piece);
                let replaced = info
                    .replacements()
                    .iter()
                    .filter(|r| !r.is_intersection())
                    .fold(piece.to_owned(), |acc, r| perform_replacement(&acc, &r.before, &r.after));
                merged_sub.push(replaced, found);
            }
            let intersection2 = sub_condition_intersection(&merged_sub.list, &sub2.list);
            let matches2 = match_count(&intersection2, info, f1, f2);
            if pass(&merged_sub.list, &sub2.list, &intersection2, matches2)
                && !intersection2.iter().all(|e| intersection.contains(e))
            {
                info.add(Replacement::composite(
                    n1.text.as_str(),
                    f2.text.as_str(),
                    vec![node1],
                    Vec::new(),
                ));
                merge = true;
            }
            last = Some((merged_sub, intersection2));
        }
        if !merge {
            return;
        }

        let mut merged = Vec::new();
        if f1.is_expression() {
            if let Some(owner) = f1.owner() {
                merged.push(owner);
            }
        } else {
            merged.push(ctx.statement1);
        }
        for r in info.by_kind(ReplacementType::Composite) {
            for &id in r.additionally_matched1() {
                push_unique(&mut merged, id);
            }
        }
        if !sequentially_merged_conditionals(mapper, &merged, ctx.statement2) {
            trace!(?merged, "merged conditionals are not sequential");
            return;
        }
        let mut candidate = ConditionalRefactoring::MergeConditional {
            merged,
            new_conditional: ctx.statement2,
            mappings: Vec::new(),
        };
        if self.retract_conflict(info, &candidate) {
            return;
        }
        let mut mappings = create_leaf_mappings(sub1, sub2, intersection);
        if let Some((merged_sub, intersection2)) = &last {
            mappings.extend(create_leaf_mappings(merged_sub, sub2, intersection2));
        }
        for mapping in mappings {
            candidate.add_sub_expression_mapping(mapping);
        }
        debug!(refactoring = candidate.name(), "conditional refactoring candidate");
        info.add_refactoring(candidate);
    }

    /// Map ternary components of statement 2 onto the leaves of the side 1
    /// `if` nodes they came from.
    fn map_ternary_components(
        &self,
        info: &mut ReplacementInfo,
        sub2: &SubConditions,
        nodes1: &[StatementId],
        conditional: &Replacement,
    ) {
        let m1 = self.ctx.model1();
        let mut mappings = Vec::new();
        for &node in nodes1 {
            for leaf in m1.leaves(node) {
                for key in sub2.keys() {
                    let leaf1 = find_fragments(m1, leaf, key);
                    let Some(leaf2) = sub2.get(key) else { continue };
                    if leaf1.len() == leaf2.len() {
                        mappings.extend(
                            leaf1
                                .into_iter()
                                .zip(leaf2.iter().cloned())
                                .map(|(l1, l2)| LeafMapping::new(l1, l2)),
                        );
                        break;
                    }
                }
            }
        }
        if let Some(r) = info.find_mut(conditional) {
            for mapping in mappings {
                r.add_sub_expression_mapping(mapping);
            }
        }
    }

    // -- Candidates --

    fn invert_and_ternary_candidates(&self, info: &mut ReplacementInfo, matches: usize, inverted: usize) {
        let ctx = self.ctx;
        let f1 = ctx.fragment1();
        let reversed = info.by_kind(ReplacementType::InfixOperator).any(|r| {
            matches!(
                (r.before.as_str(), r.after.as_str()),
                ("&&", "||") | ("||", "&&") | ("==", "!=") | ("!=", "==")
            )
        });
        if matches == inverted && (reversed || !self.logical) {
            let original = if f1.is_expression() { f1.owner() } else { Some(ctx.statement1) };
            if let Some(original) = original {
                debug!(refactoring = "Invert Condition", "conditional refactoring candidate");
                info.add_refactoring(ConditionalRefactoring::InvertCondition {
                    original,
                    inverted: ctx.statement2,
                });
            }
        }
        if self.ternary_conditions && f1.is_expression() {
            if let Some(owner) = f1.owner() {
                let mut replace = ConditionalRefactoring::ReplaceConditionalWithTernary {
                    original: owner,
                    ternary: ctx.statement2,
                    mappings: Vec::new(),
                };
                let mappings: Vec<LeafMapping> = info
                    .replacements()
                    .iter()
                    .filter(|r| r.is_intersection())
                    .flat_map(|r| r.sub_expression_mappings().iter().cloned())
                    .collect();
                for mapping in mappings {
                    replace.add_sub_expression_mapping(mapping);
                }
                debug!(refactoring = replace.name(), "conditional refactoring candidate");
                info.add_refactoring(replace);
            }
        }
    }

    /// A bare condition expression that is one invocation, against a
    /// statement calling a compatible method with as many arguments.
    fn compatible_invocation(&self, info: &mut ReplacementInfo, sub2: &SubConditions) -> bool {
        let ctx = self.ctx;
        let (f1, f2) = (ctx.fragment1(), ctx.fragment2());
        let Some(call1) = f1.invocation_covering_entire_fragment() else {
            return false;
        };
        let Some(call2) = f2
            .method_invocations()
            .find(|c| call1.compatible_name(c) && call1.arguments.len() == c.arguments.len())
        else {
            return false;
        };
        if sub2.len() > 1 {
            let mut r = Replacement::new(self.s1, self.s2, ReplacementKind::conditional());
            r.add_sub_expression_mapping(LeafMapping::new(
                FragmentRef::call(ctx.statement1, call1),
                FragmentRef::call(ctx.statement2, call2),
            ));
            info.add(r);
        }
        let (text1, text2) = (call1.actual_string(), call2.actual_string());
        let negated1 = f1.text.contains(&format!("!{text1}"));
        let negated2 = f2.text.contains(&format!("!{text2}"));
        if negated1 && !negated2 {
            info.add(Replacement::new(format!("!{text1}"), text2, ReplacementKind::InvertConditional));
        } else if !negated1 && negated2 {
            info.add(Replacement::new(text1, format!("!{text2}"), ReplacementKind::InvertConditional));
        }
        true
    }
}

/// Sub-expressions of `nodes` reading `cond`, `!cond` or `!(cond)`.
fn negated_variants_in(model: &CodeModel, nodes: &[StatementId], cond: &str) -> Vec<FragmentRef> {
    let mut out = Vec::new();
    for &node in nodes {
        out.extend(find_fragments(model, node, cond));
        out.extend(find_fragments(model, node, &format!("!{cond}")));
        out.extend(find_fragments(model, node, &format!("!({cond})")));
    }
    out
}

/// `cond` with every sub-condition naming another side 2 local variable
/// replaced by that variable's initializer.
fn inline_other_declarations(
    model: &CodeModel,
    statements: &[StatementId],
    except: StatementId,
    cond: &str,
) -> String {
    let pieces = split_conditional(cond);
    let mut out = cond.to_owned();
    for &id in statements.iter().filter(|&&id| id != except) {
        let Some(variable) = model.first_declaration(id) else {
            continue;
        };
        let Some(initializer) = variable.initializer_text() else {
            continue;
        };
        if pieces.contains(&variable.name.as_str()) {
            out = out.replace(&variable.name, initializer);
        }
    }
    out
}

/// The middles of `c1` and `c2` between their common prefix and suffix are
/// equal once one recorded replacement is undone, up to one character.
fn replaced_middle(info: &ReplacementInfo, c1: &str, c2: &str, prefix: &str, suffix: &str) -> bool {
    let diff1 = middle(c1, prefix, suffix);
    let diff2 = middle(c2, prefix, suffix);
    info.replacements().iter().any(|r| {
        if !diff1.contains(r.before.as_str()) || !diff2.contains(r.after.as_str()) {
            return false;
        }
        let undone = diff2.replace(r.after.as_str(), &r.before);
        undone == diff1 || (undone.len() == diff1.len() && levenshtein::distance(diff1, &undone) <= 1)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CodeElementType, LeafExpression, LeafKind, Location, MapperContext, Shape, StatementMapping,
        Ternary,
    };
    use crate::rules::fixtures::{config, text_pair};

    /// One side under construction, rooted in a body block.
    struct Fixture {
        model: CodeModel,
        body: StatementId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut model = CodeModel::default();
            let body = model.push(Statement {
                shape: Shape::Composite {
                    children: vec![],
                    expressions: vec![],
                },
                location: Location::new(1, 40, 0, 1000).with_element(CodeElementType::Block),
                ..Statement::new("{")
            });
            model.root = Some(body);
            Self { model, body }
        }

        /// `if(condition)` under `parent`, with its condition expression and
        /// one leaf expression per sub-condition.
        fn if_node(&mut self, condition: &str, parent: StatementId, loc: Location) -> (StatementId, StatementId) {
            let node = self.model.push(Statement {
                shape: Shape::Composite {
                    children: vec![],
                    expressions: vec![],
                },
                parent: Some(parent),
                location: loc.with_element(CodeElementType::IfStatement),
                ..Statement::new(format!("if({condition})"))
            });
            let mut expression = Statement {
                shape: Shape::Expression { owner: Some(node) },
                location: Location::new(loc.start_line, loc.start_line, loc.start_offset + 3, loc.start_offset + 9)
                    .with_element(CodeElementType::Condition),
                ..Statement::new(condition)
            };
            for (i, piece) in split_conditional(condition).into_iter().enumerate() {
                let start = loc.start_offset + 3 + u32::try_from(i).unwrap_or(0);
                expression.expressions.push(LeafExpression::new(
                    piece,
                    LeafKind::Variable,
                    Location::new(loc.start_line, loc.start_line, start, start + 1),
                ));
            }
            let condition = self.model.push(expression);
            (node, condition)
        }

        fn leaf(&mut self, text: &str, parent: StatementId, loc: Location) -> StatementId {
            self.model.push(Statement {
                parent: Some(parent),
                location: loc,
                ..Statement::new(text)
            })
        }
    }

    fn compare(mapper: &MapperContext, id1: StatementId, id2: StatementId) -> (bool, ReplacementInfo) {
        let config = config();
        let ctx = PairContext::new(mapper, id1, id2, &config);
        let mut info = ReplacementInfo::default();
        let s1 = ctx.fragment1().text.clone();
        let s2 = ctx.fragment2().text.clone();
        let accepted = common_conditional(&s1, &s2, &ctx, &mut info);
        (accepted, info)
    }

    /// `if(a && b) { run(); }` against `if(a) { if(b) { run(); } }`.
    fn split_fixture() -> (MapperContext, StatementId, StatementId, StatementId) {
        let mut side1 = Fixture::new();
        let (if1, _) = side1.if_node("a && b", side1.body, Location::new(2, 4, 10, 60));
        let run1 = side1.leaf("run();\n", if1, Location::new(3, 3, 25, 32));

        let mut side2 = Fixture::new();
        let (outer, _) = side2.if_node("a", side2.body, Location::new(2, 6, 10, 90));
        let (inner, _) = side2.if_node("b", outer, Location::new(3, 5, 20, 80));
        let run2 = side2.leaf("run();\n", inner, Location::new(4, 4, 30, 37));

        let mut mapper = MapperContext::new(side1.model, side2.model);
        mapper.mappings.push(StatementMapping {
            fragment1: run1,
            fragment2: run2,
        });
        (mapper, if1, outer, inner)
    }

    // -- Intersection --

    #[test]
    fn test_inverted_equality_records_invert_condition() {
        let (mapper, id1, id2) = text_pair("if(a == b)", "if(a != b)");
        let (accepted, info) = compare(&mapper, id1, id2);
        assert!(accepted);
        assert!(info.replacements().iter().any(|r| r.is(ReplacementType::InvertConditional)
            && r.before == "a == b"
            && r.after == "a != b"));
        assert!(info.contains_kind(ReplacementType::Conditional));
        assert_eq!(
            info.refactorings(),
            &[ConditionalRefactoring::InvertCondition {
                original: id1,
                inverted: id2,
            }]
        );
    }

    #[test]
    fn test_shared_sub_condition_accepts() {
        let (mapper, id1, id2) = text_pair("if(a && b)", "if(a && c)");
        let (accepted, info) = compare(&mapper, id1, id2);
        assert!(accepted);
        assert!(info.contains_kind(ReplacementType::Conditional));
        assert!(info.refactorings().is_empty());
    }

    #[test]
    fn test_disjoint_conditions_decline() {
        let (mapper, id1, id2) = text_pair("if(a && b)", "if(c || d)");
        let (accepted, info) = compare(&mapper, id1, id2);
        assert!(!accepted);
        assert!(info.replacements().is_empty());
    }

    #[test]
    fn test_decline_restores_accumulator() {
        let (mapper, id1, id2) = text_pair("if(a == b && c)", "if(a != b && c)");
        let config = config();
        let ctx = PairContext::new(&mapper, id1, id2, &config);
        let mut info = ReplacementInfo::default();
        info.add(Replacement::new("int", "long", ReplacementKind::Type));
        let before = info.replacements().to_vec();

        let accepted = common_conditional("if(a == b && c)", "if(a != b && c)", &ctx, &mut info);
        assert!(!accepted);
        assert_eq!(info.replacements(), before.as_slice());
        assert!(info.refactorings().is_empty());
        assert!(info.sub_expression_mappings().is_empty());
    }

    #[test]
    fn test_flipped_comparison() {
        let (mapper, id1, id2) = text_pair("if(x > y)", "if(y < x)");
        let (accepted, info) = compare(&mapper, id1, id2);
        assert!(accepted);
        let r = &info.replacements()[0];
        assert!(r.is(ReplacementType::InvertConditional));
        assert_eq!((r.before.as_str(), r.after.as_str()), (" > y", "y < "));
    }

    // -- Split and merge --

    #[test]
    fn test_split_conditional() {
        let (mapper, if1, outer, inner) = split_fixture();
        let (accepted, info) = compare(&mapper, if1, outer);
        assert!(accepted);
        assert_eq!(info.count_kind(ReplacementType::Composite), 1);
        let [ConditionalRefactoring::SplitConditional { original, split, mappings }] = info.refactorings() else {
            panic!("expected one split conditional, got {:?}", info.refactorings());
        };
        assert_eq!(*original, if1);
        assert_eq!(split, &vec![outer, inner]);
        let texts: Vec<&str> = mappings.iter().map(|m| m.fragment2.text.as_str()).collect();
        assert!(texts.contains(&"a"));
        assert!(texts.contains(&"b"));
    }

    #[test]
    fn test_conflicting_split_is_retracted() {
        let (mut mapper, if1, outer, _) = split_fixture();
        let stale = ConditionalRefactoring::SplitConditional {
            original: if1,
            split: vec![outer, StatementId(99)],
            mappings: Vec::new(),
        };
        mapper.existing_refactorings.push(stale.clone());
        let (accepted, info) = compare(&mapper, if1, outer);
        assert!(accepted);
        assert!(info.refactorings().is_empty());
        assert_eq!(info.retracted(), &[stale]);
    }

    #[test]
    fn test_merge_conditional() {
        let mut side1 = Fixture::new();
        let (outer, _) = side1.if_node("a", side1.body, Location::new(2, 6, 10, 90));
        let (inner, _) = side1.if_node("b", outer, Location::new(3, 5, 20, 80));
        let run1 = side1.leaf("run();\n", inner, Location::new(4, 4, 30, 37));

        let mut side2 = Fixture::new();
        let (if2, _) = side2.if_node("a && b", side2.body, Location::new(2, 4, 10, 60));
        let run2 = side2.leaf("run();\n", if2, Location::new(3, 3, 25, 32));

        let mut mapper = MapperContext::new(side1.model, side2.model);
        mapper.mappings.push(StatementMapping {
            fragment1: run1,
            fragment2: run2,
        });
        let (accepted, info) = compare(&mapper, outer, if2);
        assert!(accepted);
        let [ConditionalRefactoring::MergeConditional { merged, new_conditional, .. }] = info.refactorings() else {
            panic!("expected one merge conditional, got {:?}", info.refactorings());
        };
        assert_eq!(merged, &vec![outer, inner]);
        assert_eq!(*new_conditional, if2);
    }

    // -- Ternary and fallback --

    #[test]
    fn test_conditional_replaced_with_ternary() {
        let mut side1 = Fixture::new();
        let (if1, condition1) = side1.if_node("flag", side1.body, Location::new(2, 6, 10, 90));
        side1.leaf("x=1;\n", if1, Location::new(3, 3, 20, 25));

        let mut side2 = Fixture::new();
        let flag = LeafExpression::new("flag", LeafKind::Variable, Location::new(2, 2, 14, 18));
        let mut assignment = Statement {
            parent: Some(side2.body),
            location: Location::new(2, 2, 10, 40),
            ..Statement::new("x=flag ? 1 : 2;\n")
        };
        assignment.expressions.push(flag.clone());
        assignment.ternaries.push(Ternary {
            condition: flag,
            then_expression: LeafExpression::new("1", LeafKind::NumberLiteral, Location::new(2, 2, 21, 22)),
            else_expression: LeafExpression::new("2", LeafKind::NumberLiteral, Location::new(2, 2, 25, 26)),
        });
        let id2 = side2.model.push(assignment);

        let mapper = MapperContext::new(side1.model, side2.model);
        let (accepted, info) = compare(&mapper, condition1, id2);
        assert!(accepted);
        let replaced = info.refactorings().iter().find_map(|r| match r {
            ConditionalRefactoring::ReplaceConditionalWithTernary { original, ternary, mappings } => {
                Some((*original, *ternary, mappings.len()))
            }
            _ => None,
        });
        assert_eq!(replaced, Some((if1, id2, 1)));
    }

    #[test]
    fn test_compatible_invocation_fallback() {
        let mut side1 = Fixture::new();
        let node = side1.model.push(Statement {
            shape: Shape::Composite {
                children: vec![],
                expressions: vec![],
            },
            parent: Some(side1.body),
            location: Location::new(2, 4, 10, 60).with_element(CodeElementType::IfStatement),
            ..Statement::new("if(!items.isEmpty())")
        });
        let mut condition = Statement {
            shape: Shape::Expression { owner: Some(node) },
            ..Statement::new("!items.isEmpty()")
        };
        condition.calls.push(Call::invocation(Some("items"), "isEmpty", &[]));
        let id1 = side1.model.push(condition);

        let mut side2 = Fixture::new();
        let mut ret = Statement {
            parent: Some(side2.body),
            ..Statement::new("return elements.isEmpty();\n")
        };
        ret.calls.push(Call::invocation(Some("elements"), "isEmpty", &[]));
        let id2 = side2.model.push(ret);

        let mapper = MapperContext::new(side1.model, side2.model);
        let (accepted, info) = compare(&mapper, id1, id2);
        assert!(accepted);
        assert_eq!(
            info.replacements(),
            &[Replacement::new(
                "!items.isEmpty()",
                "elements.isEmpty()",
                ReplacementKind::InvertConditional
            )]
        );
    }

    #[test]
    fn test_only_infix_operator_replacements() {
        let mut info = ReplacementInfo::default();
        let intersection = vec!["a".to_owned()];
        assert!(!only_infix_operator_replacements(&info, &intersection));
        info.add(Replacement::new("&&", "||", ReplacementKind::InfixOperator));
        assert!(only_infix_operator_replacements(&info, &intersection));
        info.add(Replacement::new("<", "==", ReplacementKind::InfixOperator));
        assert!(!only_infix_operator_replacements(&info, &intersection));
    }
}
