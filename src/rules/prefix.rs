//! Prefix/suffix family.
//!
//! Pairs whose texts share a prefix and a suffix and differ only in a
//! small middle part: a cast, a `this.` qualifier, a `final` modifier, a
//! unary operator, an increment style, or one extra infix operand.

use tracing::trace;

use crate::model::{CodeModel, LeafKind, PairContext, Statement, StatementId, VariableDeclaration};
use crate::replacement::{
    Direction, FragmentRef, LeafMapping, Replacement, ReplacementInfo, ReplacementKind,
    ReplacementType,
};
use crate::text::{
    ASSIGNMENT, MiddleDiff, RETURN_SPACE, STATEMENT_TERMINATION, THIS_DOT, THROW_SPACE,
    count_operators,
};

// ---------------------------------------------------------------------------
// Cast, unary operator and infix operand
// ---------------------------------------------------------------------------

/// The middle diffs differ only in a cast, a `this.` qualifier, a compound
/// assignment sign, `*` vs `/`, the update part of a `for` header, an
/// increment style, an inserted `!`/`~`, one infix operand, or an
/// invocation wrapped around a variable.
pub fn differ_only_in_cast_expression_or_prefix_operator_or_infix_operand(
    s1: &str,
    s2: &str,
    ctx: &PairContext<'_>,
    info: &mut ReplacementInfo,
) -> bool {
    let fragment1 = ctx.fragment1();
    let fragment2 = ctx.fragment2();
    let diff = MiddleDiff::compute(s1, s2);
    if !diff.anchored() {
        return false;
    }
    let (diff1, diff2) = (diff.diff1, diff.diff2);

    if (diff1.is_empty() && diff2 == THIS_DOT) || (diff2.is_empty() && diff1 == THIS_DOT) {
        return true;
    }
    let sign_only = (diff1.is_empty() && matches!(diff2, "+" | "-"))
        || (diff2.is_empty() && matches!(diff1, "+" | "-"));
    if sign_only && diff.suffix.starts_with(ASSIGNMENT) {
        return true;
    }
    if matches!((diff1, diff2), ("/", "*") | ("*", "/")) {
        return true;
    }
    if diff.prefix == "for("
        && diff.suffix == ")"
        && diff1.contains(';')
        && diff2.contains(';')
        && for_header_parts_match(diff1, diff2, ctx, info)
    {
        return true;
    }
    if increment_style_changed(diff1, diff2, info) {
        return true;
    }
    if is_cast(diff1, diff2) || is_cast(diff2, diff1) {
        if array_access_conflict(s2, ctx, info) {
            trace!(diff1, diff2, "cast declined, array access introduced instead");
            return false;
        }
        return true;
    }

    let decls1 = &fragment1.variable_declarations;
    let decls2 = &fragment2.variable_declarations;
    let infix_count1 = fragment1.infix_expressions().count();
    let infix_count2 = fragment2.infix_expressions().count();
    let untouched = |info: &ReplacementInfo| {
        !variable_declaration_name_replaced(decls1, decls2, info)
            && !return_expression_replaced(s1, s2, info)
    };

    if diff1.is_empty() {
        if matches!(diff2, "!" | "~") {
            info.add(Replacement::new(s1, s2, ReplacementKind::InvertConditional));
            return true;
        }
        if extra_infix_operand(diff2, infix_count1, fragment2) && untouched(info) {
            return true;
        }
        if for_header_gained_type(s1, s2, decls1, decls2, diff.suffix)
            || for_header_gained_type(s2, s1, decls2, decls1, diff.suffix)
        {
            return true;
        }
    }
    if diff2.is_empty() {
        if matches!(diff1, "!" | "~") {
            info.add(Replacement::new(s1, s2, ReplacementKind::InvertConditional));
            return true;
        }
        if extra_infix_operand(diff1, infix_count2, fragment1) && untouched(info) {
            return true;
        }
    }

    for call in fragment1.method_invocations() {
        if wraps_argument(call.string().as_ref(), &call.arguments, diff1, diff2) && untouched(info) {
            info.add(Replacement::new(
                diff1,
                diff2,
                ReplacementKind::VariableReplacedWithMethodInvocation {
                    direction: Direction::InvocationToVariable,
                    call: call.clone(),
                },
            ));
            return true;
        }
    }
    for call in fragment2.method_invocations() {
        if wraps_argument(call.string().as_ref(), &call.arguments, diff2, diff1) && untouched(info) {
            info.add(Replacement::new(
                diff1,
                diff2,
                ReplacementKind::VariableReplacedWithMethodInvocation {
                    direction: Direction::VariableToInvocation,
                    call: call.clone(),
                },
            ));
            return true;
        }
    }

    for infix2 in fragment2.expressions_of_kind(LeafKind::Infix) {
        let infix = infix2.text.as_str();
        let wraps = infix == diff1
            || infix.strip_prefix('(') == Some(diff1)
            || infix.strip_suffix(')') == Some(diff1);
        if !wraps {
            continue;
        }
        if info
            .replacements()
            .iter()
            .any(|r| diff1.contains(r.after.as_str()))
        {
            return false;
        }
        if let Some(infix1) = fragment1
            .expressions_of_kind(LeafKind::Infix)
            .find(|e| e.text == infix)
        {
            let mut r = Replacement::new(s1, s2, ReplacementKind::concatenation());
            r.add_sub_expression_mapping(LeafMapping::new(
                FragmentRef::expression(ctx.statement1, infix1),
                FragmentRef::expression(ctx.statement2, infix2),
            ));
            info.add(r);
            return true;
        }
    }
    false
}

/// `diff` is one operand plus its operator, glued to an infix expression
/// that only the other side has.
fn extra_infix_operand(diff: &str, infix_count_other: usize, fragment: &Statement) -> bool {
    let infix_count = fragment.infix_expressions().count();
    if infix_count != infix_count_other + 1 || diff.is_empty() || count_operators(diff) != 1 {
        return false;
    }
    fragment
        .infix_expressions()
        .any(|infix| infix != diff && (infix.starts_with(diff) || infix.ends_with(diff)))
}

/// `for(x : xs)` became `for(T x : xs)`.
fn for_header_gained_type(
    without: &str,
    with: &str,
    decls_without: &[VariableDeclaration],
    decls_with: &[VariableDeclaration],
    suffix: &str,
) -> bool {
    if !decls_without.is_empty() || decls_with.len() != 1 {
        return false;
    }
    let Some(type_name) = decls_with[0].type_name.as_deref() else {
        return false;
    };
    without.starts_with("for(")
        && with.starts_with("for(")
        && format!("for({type_name} {suffix}") == with
}

/// `call` is `diff_call`, and takes `diff_other` as its only argument or
/// as a ternary argument.
fn wraps_argument(call: &str, arguments: &[String], diff_call: &str, diff_other: &str) -> bool {
    call == diff_call
        && arguments.iter().any(|a| a == diff_other)
        && (arguments.len() == 1 || (diff_other.contains(" ? ") && diff_other.contains(" : ")))
}

/// A cast was inserted: `diff2` is `(T)` against nothing, or the other
/// side's diff in parentheses.
pub(crate) fn is_cast(diff1: &str, diff2: &str) -> bool {
    (diff1.is_empty() && diff2.starts_with('(') && diff2.ends_with(')'))
        || (diff2.len() == diff1.len() + 2
            && diff2.starts_with('(')
            && diff2.ends_with(')')
            && &diff2[1..diff2.len() - 1] == diff1)
}

fn has_brackets(s: &str) -> bool {
    s.contains('[') && s.contains(']')
}

pub(crate) fn declares(model: &CodeModel, statements: &[StatementId], name: &str) -> bool {
    statements
        .iter()
        .any(|&id| model.first_declaration(id).is_some_and(|d| d.name == name))
}

/// An array-access replacement explains the pair better than a cast: the
/// array is declared by a sibling statement of the side that indexes it.
fn array_access_conflict(s2: &str, ctx: &PairContext<'_>, info: &ReplacementInfo) -> bool {
    let decls1 = &ctx.fragment1().variable_declarations;
    let decls2 = &ctx.fragment2().variable_declarations;
    for r in info.by_kind(ReplacementType::VariableReplacedWithArrayAccess) {
        if !s2.starts_with(&format!("{}{ASSIGNMENT}", r.after)) {
            continue;
        }
        if decls1.is_empty() && !has_brackets(&r.before) {
            if has_brackets(&r.after) && decls2.is_empty() {
                let array = r.after.split('[').next().unwrap_or("");
                if declares(ctx.model2(), &info.statements2, array) {
                    return true;
                }
            }
        } else if decls2.is_empty() && !has_brackets(&r.after) {
            if has_brackets(&r.before) && decls1.is_empty() {
                let array = r.before.split('[').next().unwrap_or("");
                if declares(ctx.model1(), &info.statements1, array) {
                    return true;
                }
            }
        }
    }
    false
}

/// `i++` became `++i` (or back), possibly on a renamed variable.
fn increment_style_changed(diff1: &str, diff2: &str, info: &ReplacementInfo) -> bool {
    if diff1.len() <= 2 || diff2.len() <= 2 {
        return false;
    }
    let (var1, var2) = if diff1.ends_with("++") && diff2.starts_with("++") {
        (&diff1[..diff1.len() - 2], &diff2[2..])
    } else if diff2.ends_with("++") && diff1.starts_with("++") {
        (&diff1[2..], &diff2[..diff2.len() - 2])
    } else {
        return false;
    };
    var1 == var2
        || info
            .replacements()
            .iter()
            .any(|r| r.before == var1 && r.after == var2)
}

fn split_semicolons(s: &str) -> Vec<&str> {
    let mut parts: Vec<&str> = s.split(';').collect();
    while parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    parts
}

/// Every part of two `for` headers matches, allowing an initializer moved
/// out to a sibling declaration and a changed increment style. Records the
/// moved initializer as a sub-expression mapping.
fn for_header_parts_match(
    diff1: &str,
    diff2: &str,
    ctx: &PairContext<'_>,
    info: &mut ReplacementInfo,
) -> bool {
    let parts1 = split_semicolons(diff1);
    let parts2 = split_semicolons(diff2);
    if parts1.len() != parts2.len() {
        return false;
    }
    let mut matching1: Vec<StatementId> = Vec::new();
    let mut matching2: Vec<StatementId> = Vec::new();
    let mut matches = 0;
    for (e1, e2) in parts1.iter().zip(&parts2) {
        let (e1, e2) = (e1.trim(), e2.trim());
        if e1 == e2 {
            matches += 1;
        } else if e1.ends_with(e2) {
            matches += 1;
            collect_moved_declarations(ctx.model2(), &info.statements2, e2, e1, &mut matching2);
        } else if e2.ends_with(e1) {
            matches += 1;
            collect_moved_declarations(ctx.model1(), &info.statements1, e1, e2, &mut matching1);
        } else if e1.len() > 2 && e2.len() > 2 && e1.ends_with("++") && e2.starts_with("++") {
            if e1[..e1.len() - 2] == e2[2..] {
                matches += 1;
            }
        } else if e1.len() > 2 && e2.len() > 2 && e2.ends_with("++") && e1.starts_with("++") {
            if e2[..e2.len() - 2] == e1[2..] {
                matches += 1;
            }
        }
    }
    if matches != parts1.len() {
        return false;
    }
    let fragment1 = ctx.fragment1();
    let fragment2 = ctx.fragment2();
    if let ([moved], Some(&expr2)) = (matching1.as_slice(), fragment2.header_expressions().first()) {
        if let (Some(s1), Some(s2)) = (ctx.model1().get(*moved), ctx.model2().get(expr2)) {
            info.add_sub_expression_mapping(LeafMapping::new(
                FragmentRef::statement(*moved, s1),
                FragmentRef::statement(expr2, s2),
            ));
        }
    }
    if let ([moved], Some(&expr1)) = (matching2.as_slice(), fragment1.header_expressions().first()) {
        if let (Some(s1), Some(s2)) = (ctx.model1().get(expr1), ctx.model2().get(*moved)) {
            info.add_sub_expression_mapping(LeafMapping::new(
                FragmentRef::statement(expr1, s1),
                FragmentRef::statement(*moved, s2),
            ));
        }
    }
    true
}

/// Sibling statements declaring `short` (`x=0`) whose typed form is `long`
/// (`int x=0`).
fn collect_moved_declarations(
    model: &CodeModel,
    statements: &[StatementId],
    short: &str,
    long: &str,
    out: &mut Vec<StatementId>,
) {
    for &id in statements {
        let Some(d) = model.first_declaration(id) else {
            continue;
        };
        let Some(type_name) = d.type_name.as_deref() else {
            continue;
        };
        let assigned = format!("{}{ASSIGNMENT}", d.name);
        if short.starts_with(&assigned)
            && long.starts_with(&format!("{type_name} {assigned}"))
            && !out.contains(&id)
        {
            out.push(id);
        }
    }
}

fn variable_declaration_name_replaced(
    decls1: &[VariableDeclaration],
    decls2: &[VariableDeclaration],
    info: &ReplacementInfo,
) -> bool {
    match (decls1, decls2) {
        ([d1], [d2]) => info
            .replacements()
            .iter()
            .any(|r| r.before == d1.name && r.after == d2.name),
        _ => false,
    }
}

/// Both statements are returns and one of them returns the target of a
/// recorded replacement.
fn return_expression_replaced(s1: &str, s2: &str, info: &ReplacementInfo) -> bool {
    if !s1.starts_with(RETURN_SPACE) || !s2.starts_with(RETURN_SPACE) {
        return false;
    }
    info.replacements().iter().any(|r| {
        let returned = format!("{RETURN_SPACE}{}{STATEMENT_TERMINATION}", r.after);
        s1 == returned || s2 == returned
    })
}

// ---------------------------------------------------------------------------
// Narrow text-only checks
// ---------------------------------------------------------------------------

/// Trimmed middle diffs of a pair that differs only in a cast.
///
/// `("x.f()", "(Foo) x.f()")` yields `("", "(Foo)")`.
pub fn cast_diff<'a>(s1: &'a str, s2: &'a str) -> Option<(&'a str, &'a str)> {
    let diff = MiddleDiff::compute(s1, s2);
    let (diff1, diff2) = (diff.diff1.trim(), diff.diff2.trim());
    (is_cast(diff1, diff2) || is_cast(diff2, diff1)).then_some((diff1, diff2))
}

pub fn differ_only_in_cast(s1: &str, s2: &str) -> bool {
    cast_diff(s1, s2).is_some()
}

/// One side is the other with `prefix_with` in place of `prefix_without`.
pub fn differ_only_in_prefix(s1: &str, s2: &str, prefix_without: &str, prefix_with: &str) -> bool {
    let strip = |a: &str, b: &str| match (a.strip_prefix(prefix_without), b.strip_prefix(prefix_with)) {
        (Some(rest1), Some(rest2)) => rest1 == rest2,
        _ => false,
    };
    strip(s1, s2) || strip(s2, s1)
}

/// Pairs that differ in a `this.` qualifier or a trailing null check.
pub fn differ_only_in_this(s1: &str, s2: &str) -> bool {
    if differ_only_in_prefix(s1, s2, "", THIS_DOT) {
        return true;
    }
    let diff = MiddleDiff::compute(s1, s2);
    if !diff.anchored() {
        return false;
    }
    match (diff.diff1, diff.diff2) {
        ("", other) | (other, "") => matches!(other, THIS_DOT | "!= null" | "== null"),
        _ => false,
    }
}

pub fn differ_only_in_throw(s1: &str, s2: &str) -> bool {
    differ_only_in_prefix(s1, s2, "", THROW_SPACE)
}

/// Stripping every parenthesis makes the texts equal, possibly up to a
/// `return` keyword.
pub fn equal_after_parenthesis_elimination(s1: &str, s2: &str) -> bool {
    let strip = |s: &str| s.replace(['(', ')'], "");
    let updated1 = strip(s1);
    let updated2 = strip(s2);
    updated1 == updated2
        || updated1 == format!("{RETURN_SPACE}{updated2}")
        || updated2 == format!("{RETURN_SPACE}{updated1}")
}

// ---------------------------------------------------------------------------
// Final modifier
// ---------------------------------------------------------------------------

/// The pair differs in a `final` modifier on a declaration, a `for`
/// variable or a catch parameter. A renamed catch parameter is recorded.
pub fn differ_only_in_final_modifier(
    s1: &str,
    s2: &str,
    ctx: &PairContext<'_>,
    info: &mut ReplacementInfo,
) -> bool {
    let decls1 = &ctx.fragment1().variable_declarations;
    let decls2 = &ctx.fragment2().variable_declarations;
    differ_only_in_prefix(s1, s2, "for(", "for(final ")
        || differ_only_in_prefix(s1, s2, "catch(", "catch(final ")
        || declaration_differs_in_final_modifier(s1, s2, decls1, decls2)
        || catch_differs_in_final_modifier_and_name(s1, s2, decls1, decls2, info)
        || enhanced_for_differs_in_final_modifier_and_name(s1, s2, decls1, decls2)
}

/// First declarations of both sides, when both sides declare the same
/// number of variables and the first ones share a type.
fn same_typed_first<'a>(
    decls1: &'a [VariableDeclaration],
    decls2: &'a [VariableDeclaration],
) -> Option<(&'a VariableDeclaration, &'a VariableDeclaration)> {
    if decls1.is_empty() || decls1.len() != decls2.len() {
        return None;
    }
    let (v1, v2) = (&decls1[0], &decls2[0]);
    (v1.type_name == v2.type_name).then_some((v1, v2))
}

fn declaration_differs_in_final_modifier(
    s1: &str,
    s2: &str,
    decls1: &[VariableDeclaration],
    decls2: &[VariableDeclaration],
) -> bool {
    differ_only_in_prefix(s1, s2, "", "final ") && same_typed_first(decls1, decls2).is_some()
}

fn catch_differs_in_final_modifier_and_name(
    s1: &str,
    s2: &str,
    decls1: &[VariableDeclaration],
    decls2: &[VariableDeclaration],
    info: &mut ReplacementInfo,
) -> bool {
    if !s1.starts_with("catch(") || !s2.starts_with("catch(") {
        return false;
    }
    let Some((v1, v2)) = same_typed_first(decls1, decls2) else {
        return false;
    };
    let final_toggled = s1.starts_with("catch(final ") || s2.starts_with("catch(final ");
    if final_toggled && v1.name != v2.name {
        info.add(Replacement::new(&v1.name, &v2.name, ReplacementKind::VariableName));
        return true;
    }
    false
}

fn enhanced_for_differs_in_final_modifier_and_name(
    s1: &str,
    s2: &str,
    decls1: &[VariableDeclaration],
    decls2: &[VariableDeclaration],
) -> bool {
    if !s1.starts_with("for(") || !s2.starts_with("for(") {
        return false;
    }
    let Some((v1, v2)) = same_typed_first(decls1, decls2) else {
        return false;
    };
    let suffix = crate::text::common_suffix(s1, s2);
    let (head1, head2) = if s1.starts_with("for(final ") {
        ("for(final ", "for(")
    } else if s2.starts_with("for(final ") {
        ("for(", "for(final ")
    } else {
        return false;
    };
    format!("{head1}{}{suffix}", v1.name) == s1 && format!("{head2}{}{suffix}", v2.name) == s2
}

// ---------------------------------------------------------------------------
// Default initializer
// ---------------------------------------------------------------------------

fn is_default_initializer(d: &VariableDeclaration) -> bool {
    let Some(initializer) = &d.initializer else {
        return false;
    };
    matches!(initializer.text.as_str(), "null" | "0" | "false")
        || initializer.number_literals.first() == Some(&initializer.text)
}

fn declaration_as_string(d: &VariableDeclaration) -> String {
    let mut sb = format!("{} {}", d.type_str(), d.name);
    if let Some(initializer) = d.initializer_text() {
        sb.push_str(ASSIGNMENT);
        sb.push_str(initializer);
    }
    sb
}

/// One side spells out the default value (`null`, `0`, `false`, a number)
/// that the other side leaves implicit, for every declared variable.
pub fn differ_only_in_default_initializer(s1: &str, s2: &str, ctx: &PairContext<'_>) -> bool {
    let decls1 = &ctx.fragment1().variable_declarations;
    let decls2 = &ctx.fragment2().variable_declarations;
    if decls1.is_empty()
        || decls1.len() != decls2.len()
        || !decls1.iter().zip(decls2).all(|(d1, d2)| d1.same_signature(d2))
    {
        return false;
    }
    let mut defaults = 0;
    for (d1, d2) in decls1.iter().zip(decls2) {
        let implicit1 = d1.initializer.is_none() && is_default_initializer(d2);
        let implicit2 = d2.initializer.is_none() && is_default_initializer(d1);
        if implicit1 || implicit2 {
            defaults += 1;
        }
    }
    let render = |decls: &[VariableDeclaration]| {
        let joined: Vec<String> = decls.iter().map(declaration_as_string).collect();
        format!("{}{STATEMENT_TERMINATION}", joined.join(", "))
    };
    s1 == render(decls1) && s2 == render(decls2) && defaults == decls1.len()
}
