//! Argument family: swap, add, split and merge of call arguments.

use tracing::trace;

use super::anonymous::contains_method_signature_of_anonymous_class;
use crate::model::{Call, PairContext};
use crate::replacement::{Replacement, ReplacementInfo, ReplacementKind, ReplacementType};
use crate::text::{
    ASSIGNMENT, MiddleDiff, RETURN_SPACE, common_prefix, common_suffix, contains_token,
    keep_reserved_tokens, perform_replacement, split_comma,
};
use crate::text::tokens::{is_inside_double_quotes, is_inside_single_quotes};

// ---------------------------------------------------------------------------
// New arguments
// ---------------------------------------------------------------------------

/// The pair differs in the argument list only: two arguments were swapped,
/// new parameters, attributes or locals were appended, or one argument was
/// split into several.
///
/// The swap check runs first. The remaining checks need an empty side 1
/// diff, or one naming a parameter or attribute that no longer exists on
/// side 2.
pub fn equal_after_new_argument_additions(
    s1: &str,
    s2: &str,
    ctx: &PairContext<'_>,
    info: &mut ReplacementInfo,
) -> bool {
    let diff = MiddleDiff::token_aligned(s1, s2);
    if !diff.anchored() || diff.prefix == RETURN_SPACE {
        return false;
    }
    let mut diff1 = diff.diff1.to_owned();
    let mut diff2 = diff.diff2.to_owned();
    if diff.begin1 > diff.end1 {
        diff2.push_str(&diff.suffix[..diff.begin1 - diff.end1]);
        if diff2.ends_with(',') {
            diff2.pop();
        }
    }
    let next_char = s1[diff.prefix.len()..].chars().next();
    if let Some(comma) = diff.prefix.rfind(',') {
        if comma + 1 < diff.prefix.len() && !matches!(next_char, Some(',' | ')')) {
            let partial = &diff.prefix[comma + 1..];
            diff1.insert_str(0, partial);
            diff2.insert_str(0, partial);
        }
    }

    if let (Some((before1, after1)), Some((before2, after2))) =
        (diff1.split_once(','), diff2.split_once(','))
    {
        let (before1, after1) = (before1.trim(), after1.trim());
        let (before2, after2) = (before2.trim(), after2.trim());
        if before1 == after2 && before2 == after1 {
            if info.replacements().iter().any(|r| r.after == before2) {
                trace!(before1, before2, "argument swap conflicts with a recorded replacement");
            } else {
                info.add(Replacement::new(before1, before2, ReplacementKind::SwapArgument));
                return true;
            }
        }
    }

    let diff1 = diff1.trim();
    let added = diff2.trim_matches([',', ' ']);
    let container1 = &ctx.model1().container;
    let container2 = &ctx.model2().container;
    let class_diff = ctx.mapper.class_diff.as_ref();
    let no_anonymous = !contains_method_signature_of_anonymous_class(added);
    let replaced_parameter =
        container1.has_parameter(diff1) && !container2.has_parameter(diff1) && no_anonymous;
    let replaced_attribute = class_diff
        .is_some_and(|d| d.original_has_attribute(diff1) && !d.next_has_attribute(diff1))
        && no_anonymous;
    if !diff1.is_empty() && !replaced_parameter && !replaced_attribute {
        return false;
    }

    // Parameters added to the signature.
    if let Some(signature) = &ctx.mapper.signature_diff {
        let names = matching_names(
            signature.added_parameters.iter().map(|p| p.name.as_str()),
            added,
        );
        let anchor = info
            .by_kind(ReplacementType::VariableName)
            .find(|r| {
                signature
                    .renamed_parameters
                    .iter()
                    .any(|p| p.before == r.before && p.after == r.after)
            })
            .cloned();
        let known = container1.has_parameter(diff1);
        if split_or_add(names, anchor, diff1, known, added, info) {
            return true;
        }
    }

    // Attributes of the class after the change.
    if let Some(class_diff) = class_diff {
        let names = matching_names(class_diff.next_attributes.iter().map(String::as_str), added);
        let anchor = info
            .by_kind(ReplacementType::VariableName)
            .find(|r| {
                class_diff.original_has_attribute(&r.before)
                    && class_diff.next_has_attribute(&r.after)
            })
            .cloned();
        let known = class_diff.original_has_attribute(diff1);
        if split_or_add(names, anchor, diff1, known, added, info) {
            return true;
        }
    }

    // Parameters and locals of operation 2.
    let names = matching_names(
        container2.all_variable_declarations().map(|d| d.name.as_str()),
        added,
    );
    let anchor = info
        .by_kind(ReplacementType::VariableName)
        .find(|r| {
            !renames_declared_or_dereferenced(s1, s2, &r.after)
                && !follows_cast(s1, s2, &r.after)
                && container1.variable_declaration(&r.before).is_some()
                && container2.variable_declaration(&r.after).is_some()
        })
        .cloned();
    let known = container1.variable_declaration(diff1).is_some();
    split_or_add(names, anchor, diff1, known, added, info)
}

/// Candidate names appearing in `added`, in candidate order, each once.
fn matching_names<'a>(candidates: impl Iterator<Item = &'a str>, added: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in candidates {
        if contains_token(added, name) && !names.iter().any(|n| n == name) {
            names.push(name.to_owned());
        }
    }
    names
}

/// `added` lists exactly `names`, in order.
fn lists_exactly(names: &[String], added: &str) -> bool {
    let parts = split_comma(added);
    parts.len() == names.len() && parts.iter().zip(names).all(|(p, n)| p.trim() == n)
}

/// Record the new arguments `names`: as a split of the renamed variable
/// `anchor`, as plain additions, or as a split of `diff1`.
fn split_or_add(
    names: Vec<String>,
    anchor: Option<Replacement>,
    diff1: &str,
    diff1_known: bool,
    added: &str,
    info: &mut ReplacementInfo,
) -> bool {
    if names.is_empty() {
        return false;
    }
    if let Some(anchor) = anchor {
        let mut split = vec![anchor.after.clone()];
        split.extend(names.iter().filter(|n| **n != anchor.after).cloned());
        if !split.contains(&anchor.before) && lists_exactly(&names, added) {
            info.remove(std::slice::from_ref(&anchor));
            info.add(Replacement::split_variable(anchor.before, split));
            return true;
        }
    } else if diff1.is_empty() && info.replacements().is_empty() && lists_exactly(&names, added) {
        info.add(Replacement::add_variable(names));
        return true;
    }
    if diff1_known && !names.iter().any(|n| n == diff1) && lists_exactly(&names, added) {
        info.add(Replacement::split_variable(diff1, names));
        return true;
    }
    false
}

/// `name` is followed by `=` or `.` on both sides.
fn renames_declared_or_dereferenced(s1: &str, s2: &str, name: &str) -> bool {
    let followed = |s: &str| {
        s.find(name)
            .and_then(|i| s[i + name.len()..].chars().next())
            .is_some_and(|c| c == '=' || c == '.')
    };
    followed(s1) && followed(s2)
}

/// `name` directly follows a `)` on both sides.
fn follows_cast(s1: &str, s2: &str, name: &str) -> bool {
    let preceded = |s: &str| {
        s.find(name)
            .filter(|&i| i > 0)
            .is_some_and(|i| s[..i].ends_with(')'))
    };
    preceded(s1) && preceded(s2)
}

// ---------------------------------------------------------------------------
// Argument merge
// ---------------------------------------------------------------------------

/// Several recorded renames share one target name: the arguments they
/// rename were merged into one. Also covers an argument folded into a
/// `this` expression.
pub fn equal_after_argument_merge(
    s1: &str,
    s2: &str,
    _ctx: &PairContext<'_>,
    info: &mut ReplacementInfo,
) -> bool {
    let mut s1 = s1.to_owned();
    let mut s2 = s2.to_owned();
    let mut groups: Vec<(String, Vec<Replacement>)> = Vec::new();
    let mut merge_found = false;

    for replacement in info.replacements() {
        let key = replacement.after.clone();
        match replacement.replacement_type() {
            ReplacementType::VariableName => {
                if let Some((_, group)) = groups.iter_mut().find(|(k, _)| *k == key) {
                    if !group.contains(replacement) {
                        group.push(replacement.clone());
                    }
                    if let Some(stripped) = drop_comma_adjacent(&s1, &key) {
                        s1 = stripped;
                    }
                } else {
                    groups.push((key, vec![replacement.clone()]));
                }
                if s1 == s2 {
                    merge_found = true;
                }
            }
            ReplacementType::VariableReplacedWithThisExpression => {
                let Some(stripped) = drop_comma_adjacent(&s1, &key) else {
                    continue;
                };
                s1 = stripped;
                if !compatible_reserved_tokens(&keep_reserved_tokens(&s1), &keep_reserved_tokens(&s2)) {
                    continue;
                }
                let mut group = vec![replacement.clone()];
                if s1.contains(ASSIGNMENT)
                    && !s2.contains(ASSIGNMENT)
                    && !s1.starts_with(RETURN_SPACE)
                    && s2.starts_with(RETURN_SPACE)
                {
                    if let Some(i) = s1.find(ASSIGNMENT) {
                        s1 = s1[i + 1..].to_owned();
                    }
                    s2 = s2[RETURN_SPACE.len()..].to_owned();
                }
                let prefix = common_prefix(&s1, &s2);
                let suffix = common_suffix(&s1, &s2);
                if !prefix.is_empty() && !suffix.is_empty() {
                    let diff = MiddleDiff::compute(&s1, &s2);
                    if !diff.diff1.is_empty() && !diff.diff2.is_empty() && diff.diff2 == key {
                        group.push(Replacement::new(
                            diff.diff1,
                            diff.diff2,
                            ReplacementKind::VariableReplacedWithThisExpression,
                        ));
                        merge_found = true;
                    }
                }
                match groups.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, existing)) => *existing = group,
                    None => groups.push((key, group)),
                }
            }
            _ => {}
        }
    }
    if !merge_found {
        return false;
    }
    for (key, group) in groups {
        if group.len() < 2 {
            continue;
        }
        info.remove(&group);
        let mut merged: Vec<String> = Vec::new();
        for r in &group {
            if !merged.contains(&r.before) {
                merged.push(r.before.clone());
            }
        }
        info.add(Replacement::merge_variable(merged, key));
    }
    true
}

/// `s` with the first occurrence of `key` removed together with the comma
/// right after it, or else the comma right before it.
fn drop_comma_adjacent(s: &str, key: &str) -> Option<String> {
    let index = s.find(key)?;
    let end = index + key.len();
    if !s.ends_with(key) && s[end..].starts_with(',') {
        return Some(format!("{}{}", &s[..index], &s[end + 1..]));
    }
    if index > 0 && s[..index].ends_with(',') {
        return Some(format!("{}{}", &s[..index - 1], &s[end..]));
    }
    None
}

/// Punctuation skeletons agree, entirely or from the first `(` on.
fn compatible_reserved_tokens(tokens1: &str, tokens2: &str) -> bool {
    if tokens1 == tokens2 {
        return true;
    }
    match (tokens1.find('('), tokens2.find('(')) {
        (Some(i), Some(j)) => tokens1[i..] == tokens2[j..],
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Invocations
// ---------------------------------------------------------------------------

/// Every argument pair is a call of the same method on a variable of the
/// respective side, e.g. `f(a)` and `f(b)` with `a` and `b` variables.
pub fn arguments_with_identical_method_calls(
    arguments1: &[String],
    arguments2: &[String],
    variables1: &[String],
    variables2: &[String],
) -> bool {
    if arguments1.is_empty() || arguments1.len() != arguments2.len() {
        return false;
    }
    arguments1.iter().zip(arguments2).all(|(arg1, arg2)| {
        let (Some((name1, inner1)), Some((name2, inner2))) =
            (unquoted_call_parts(arg1), unquoted_call_parts(arg2))
        else {
            return false;
        };
        !name1.is_empty()
            && name1 == name2
            && variables1.iter().any(|v| v == inner1)
            && variables2.iter().any(|v| v == inner2)
    })
}

/// `name(inner)` split at the first `(` and the last `)`, unless either
/// parenthesis sits inside a literal.
fn unquoted_call_parts(arg: &str) -> Option<(&str, &str)> {
    let open = arg.find('(')?;
    let close = arg.rfind(')')?;
    let quoted = |at: usize| is_inside_single_quotes(arg, at) || is_inside_double_quotes(arg, at);
    if close < open || quoted(open) || quoted(close) {
        return None;
    }
    Some((&arg[..open], &arg[open + 1..close]))
}

/// Both statements are the same call, differing only in its receiver: one
/// added, one removed, or one replaced by another.
pub fn only_different_invoker(s1: &str, s2: &str, call1: &Call, call2: &Call) -> bool {
    if !call1.identical_name(call2) {
        return false;
    }
    let qualify = |s: &str, name: &str, receiver: &str| {
        s.find(name)
            .map(|i| format!("{}{receiver}.{}", &s[..i], &s[i..]))
    };
    match (&call1.receiver, &call2.receiver) {
        (None, Some(receiver2)) => qualify(s1, &call1.name, receiver2).as_deref() == Some(s2),
        (Some(receiver1), None) => qualify(s2, &call2.name, receiver1).as_deref() == Some(s1),
        (Some(receiver1), Some(receiver2)) => perform_replacement(s1, receiver1, receiver2) == s2,
        (None, None) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        ClassDiff, CodeModel, Container, MapperContext, RenamedParameter, SignatureDiff, Statement,
        VariableDeclaration,
    };
    use crate::rules::fixtures::{config, text_pair};

    fn with_parameters(params1: &[&str], params2: &[&str], s1: &str, s2: &str) -> MapperContext {
        let container = |params: &[&str]| Container {
            parameters: params
                .iter()
                .map(|p| VariableDeclaration::new(*p, "int"))
                .collect(),
            ..Container::default()
        };
        let mut m1 = CodeModel::new(container(params1));
        m1.push(Statement::new(s1));
        let mut m2 = CodeModel::new(container(params2));
        m2.push(Statement::new(s2));
        MapperContext::new(m1, m2)
    }

    fn run(ctx: &MapperContext, s1: &str, s2: &str, info: &mut ReplacementInfo) -> bool {
        let config = config();
        let ids = ctx.model1.ids().next().zip(ctx.model2.ids().next());
        let Some((a, b)) = ids else { return false };
        let pair = PairContext::new(ctx, a, b, &config);
        equal_after_new_argument_additions(s1, s2, &pair, info)
    }

    // -- Swap --

    #[test]
    fn test_argument_swap() {
        let (ctx, _, _) = text_pair("f(x, y);\n", "f(y, x);\n");
        let mut info = ReplacementInfo::default();
        assert!(run(&ctx, "f(x, y);\n", "f(y, x);\n", &mut info));
        assert_eq!(info.replacements().len(), 1);
        assert!(info.contains_kind(ReplacementType::SwapArgument));
        assert!(!info.contains_kind(ReplacementType::VariableName));
    }

    #[test]
    fn test_swap_conflicting_with_rename() {
        let (ctx, _, _) = text_pair("f(x, y);\n", "f(y, x);\n");
        let mut info = ReplacementInfo::default();
        info.add(Replacement::new("z", "y", ReplacementKind::VariableName));
        assert!(!run(&ctx, "f(x, y);\n", "f(y, x);\n", &mut info));
        assert_eq!(info.replacements().len(), 1);
    }

    // -- Split and add --

    #[test]
    fn test_split_parameter() {
        let mut ctx = with_parameters(&["p"], &["p1", "p2"], "f(p);\n", "f(p1,p2);\n");
        ctx.signature_diff = Some(SignatureDiff {
            added_parameters: vec![
                VariableDeclaration::new("p1", "int"),
                VariableDeclaration::new("p2", "int"),
            ],
            removed_parameters: vec![VariableDeclaration::new("p", "int")],
            renamed_parameters: Vec::new(),
        });
        let mut info = ReplacementInfo::default();
        assert!(run(&ctx, "f(p);\n", "f(p1,p2);\n", &mut info));
        let split: Vec<_> = info.by_kind(ReplacementType::SplitVariable).collect();
        assert_eq!(split.len(), 1);
        match &split[0].kind {
            ReplacementKind::SplitVariable { split } => {
                assert_eq!(split, &vec!["p1".to_owned(), "p2".to_owned()]);
            }
            other => panic!("unexpected kind {other:?}"),
        }
        assert_eq!(split[0].before, "p");
    }

    #[test]
    fn test_split_anchored_on_rename() {
        let mut ctx = with_parameters(&["p"], &["q", "r"], "f(q);\n", "f(q,r);\n");
        ctx.signature_diff = Some(SignatureDiff {
            added_parameters: vec![VariableDeclaration::new("r", "int")],
            removed_parameters: Vec::new(),
            renamed_parameters: vec![RenamedParameter {
                before: "p".into(),
                after: "q".into(),
            }],
        });
        let mut info = ReplacementInfo::default();
        info.add(Replacement::new("p", "q", ReplacementKind::VariableName));
        assert!(run(&ctx, "f(q);\n", "f(q,r);\n", &mut info));
        assert!(!info.contains_kind(ReplacementType::VariableName));
        let split = info.by_kind(ReplacementType::SplitVariable).next();
        assert_eq!(split.map(|r| r.after.as_str()), Some("q,r"));
    }

    #[test]
    fn test_added_attribute_argument() {
        let (mut ctx, _, _) = text_pair("g();\n", "g(cache);\n");
        ctx.class_diff = Some(ClassDiff {
            next_attributes: vec!["cache".into()],
            ..ClassDiff::default()
        });
        let mut info = ReplacementInfo::default();
        assert!(run(&ctx, "g();\n", "g(cache);\n", &mut info));
        assert!(info.contains_kind(ReplacementType::AddVariable));
    }

    #[test]
    fn test_unknown_argument_declines() {
        let (ctx, _, _) = text_pair("g();\n", "g(other);\n");
        let mut info = ReplacementInfo::default();
        assert!(!run(&ctx, "g();\n", "g(other);\n", &mut info));
        assert!(info.replacements().is_empty());
    }

    // -- Merge --

    #[test]
    fn test_argument_merge() {
        let (ctx, a, b) = text_pair("f(a,b);\n", "f(c);\n");
        let config = config();
        let pair = PairContext::new(&ctx, a, b, &config);
        let mut info = ReplacementInfo::default();
        info.add(Replacement::new("a", "c", ReplacementKind::VariableName));
        info.add(Replacement::new("b", "c", ReplacementKind::VariableName));
        assert!(equal_after_argument_merge("f(c,c);\n", "f(c);\n", &pair, &mut info));
        assert_eq!(info.replacements().len(), 1);
        let merge = &info.replacements()[0];
        assert!(merge.is(ReplacementType::MergeVariable));
        assert_eq!(merge.before, "a,b");
        assert_eq!(merge.after, "c");
    }

    #[test]
    fn test_drop_comma_adjacent() {
        assert_eq!(drop_comma_adjacent("f(c,c)", "c").as_deref(), Some("f(c)"));
        assert_eq!(drop_comma_adjacent("f(a,c)", "c").as_deref(), Some("f(a)"));
        assert_eq!(drop_comma_adjacent("f(c)", "c"), None);
    }

    // -- Invocations --

    #[test]
    fn test_identical_method_call_arguments() {
        let args1 = vec!["size(a)".to_owned()];
        let args2 = vec!["size(b)".to_owned()];
        let vars1 = vec!["a".to_owned()];
        let vars2 = vec!["b".to_owned()];
        assert!(arguments_with_identical_method_calls(&args1, &args2, &vars1, &vars2));
        let quoted = vec!["\"size(a)\"".to_owned()];
        assert!(!arguments_with_identical_method_calls(&quoted, &args2, &vars1, &vars2));
    }

    #[test]
    fn test_only_different_invoker() {
        let call1 = Call::invocation(None, "foo", &["x"]);
        let call2 = Call::invocation(Some("this"), "foo", &["x"]);
        assert!(only_different_invoker("foo(x);\n", "this.foo(x);\n", &call1, &call2));
        let call3 = Call::invocation(Some("a"), "foo", &["x"]);
        let call4 = Call::invocation(Some("b"), "foo", &["x"]);
        assert!(only_different_invoker("a.foo(x);\n", "b.foo(x);\n", &call3, &call4));
        assert!(!only_different_invoker("a.foo(x);\n", "b.bar(x);\n", &call3, &call4));
    }
}
