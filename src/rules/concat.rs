//! Concatenation family: string concatenations rewritten as other
//! concatenations, argument lists, format calls or text blocks.

use tracing::trace;

use super::anonymous::contains_method_signature_of_anonymous_class;
use super::declaration::declaration_with_array_initializer;
use crate::model::{Call, LeafKind, PairContext, Statement};
use crate::replacement::{FragmentRef, LeafMapping, Replacement, ReplacementInfo, ReplacementKind};
use crate::text::{
    ASSIGNMENT, RETURN_SPACE, STATEMENT_TERMINATION, common_prefix, contains_token, levenshtein,
    split_comma, split_concat, split_tab,
};

const STRING_CONCATENATION: &str = " + ";

/// Both statements declare the same number of variables, or one declares
/// and the other returns.
pub fn valid_statement_for_concat_comparison(statement1: &Statement, statement2: &Statement) -> bool {
    let declarations1 = statement1.variable_declarations.len();
    let declarations2 = statement2.variable_declarations.len();
    declarations1 == declarations2
        || (declarations1 > 0 && declarations2 == 0 && statement2.text.starts_with(RETURN_SPACE))
        || (declarations1 == 0 && declarations2 > 0 && statement1.text.starts_with(RETURN_SPACE))
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// The two statements build the same string in different ways.
///
/// Tries, in order: a concatenation turned into a text block, two
/// concatenations sharing most of their operands, a concatenation turned
/// into an argument list or a `\t`-separated list, a call whose arguments
/// became the operands of a concatenation, and finally per-argument
/// concatenation of two calls with the same arity.
pub fn common_concat(s1: &str, s2: &str, ctx: &PairContext<'_>, info: &mut ReplacementInfo) -> bool {
    let statement1 = ctx.fragment1();
    let statement2 = ctx.fragment2();
    let creation1 = statement1.creation_covering_entire_fragment();
    let creation2 = statement2.creation_covering_entire_fragment();
    if creation1.is_some_and(Call::is_array_creation)
        || creation2.is_some_and(Call::is_array_creation)
        || contains_method_signature_of_anonymous_class(s1)
        || contains_method_signature_of_anonymous_class(s2)
    {
        return false;
    }

    let concat1 = s1.contains(STRING_CONCATENATION);
    let concat2 = s2.contains(STRING_CONCATENATION);
    let text_blocks1 = statement1.text_blocks().count();
    let text_blocks2 = statement2.text_blocks().count();

    let accepted = if concat1 && concat2 && text_blocks1 == 0 && text_blocks2 > 0 {
        string_concat_text_block(s1, s2, ctx, info)
    } else if concat1 && concat2 {
        concat_on_both_sides(s1, s2, ctx, info)
    } else if concat1 && text_blocks1 == 0 && text_blocks2 > 0 {
        string_concat_text_block(s1, s2, ctx, info)
    } else if concat1 && no_comma_s1(s1, statement1, statement2) && s2.contains(',') {
        concat_to_argument_list(s1, s2, ctx, info)
    } else if (concat1 ^ concat2) && s1.contains(',') && s2.contains(',') {
        comma_lists_on_both_sides(s1, s2, ctx, info)
    } else if s1.contains("\\t") && !s2.contains("\\t") && !s1.contains(',') && s2.contains(',') {
        tab_list_to_argument_list(s1, s2, ctx, info)
    } else if s1.contains(',')
        && s1.contains('(')
        && s1.contains(')')
        && !s2.contains(',')
        && !s2.contains('(')
        && !s2.contains(')')
    {
        arguments_to_concat_operands(s1, s2, ctx, info)
    } else if statement1.string_literals().next().is_some() && text_blocks1 == 0 && text_blocks2 > 0 {
        string_concat_text_block(s1, s2, ctx, info)
    } else {
        false
    };
    if accepted {
        return true;
    }
    concatenated_arguments(ctx, info)
}

// ---------------------------------------------------------------------------
// Token intersection variants
// ---------------------------------------------------------------------------

fn concat_on_both_sides(s1: &str, s2: &str, ctx: &PairContext<'_>, info: &mut ReplacementInfo) -> bool {
    let tokens1 = dedup(split_concat(s1));
    let tokens2 = dedup(split_concat(s2));
    let mut intersection: Vec<String> = Vec::new();
    for token1 in &tokens1 {
        for token2 in &tokens2 {
            let common = if token1 == token2 {
                Some(*token1)
            } else if token1.strip_suffix(STATEMENT_TERMINATION) == Some(*token2) {
                Some(*token2)
            } else if token2.strip_suffix(STATEMENT_TERMINATION) == Some(*token1) {
                Some(*token1)
            } else if token2.ends_with(&format!("+={token1}")) {
                Some(*token1)
            } else if token1.ends_with(&format!("+={token2}")) {
                Some(*token2)
            } else if token1.ends_with(&format!("){STATEMENT_TERMINATION}"))
                && token2.ends_with(STATEMENT_TERMINATION)
            {
                // `f(x + y);` against `x + y;`
                let prefix = common_prefix(token1, token2);
                (prefix.len() + STATEMENT_TERMINATION.len() + 1 == token1.len()
                    && prefix.len() + STATEMENT_TERMINATION.len() == token2.len())
                .then_some(prefix)
            } else {
                None
            };
            if let Some(common) = common {
                if !intersection.iter().any(|t| t == common) {
                    intersection.push(common.to_owned());
                }
            }
        }
    }
    let filtered = not_in_replacements(intersection, info, false);
    let mappings: Vec<LeafMapping> = filtered.iter().flat_map(|key| leaf_mappings(ctx, key)).collect();

    let size = filtered.len();
    let threshold = tokens1.len().max(tokens2.len()).saturating_sub(size);
    if !((size > 0 && size > threshold)
        || (size > 1 && size >= threshold)
        || (size > 1 && mappings.len() == size))
    {
        trace!(size, threshold, "too few shared concatenation operands");
        return false;
    }

    let aligned = filtered
        .iter()
        .enumerate()
        .all(|(i, common)| tokens1.get(i) == Some(&common.as_str()) && tokens2.get(i) == Some(&common.as_str()));
    if aligned && tokens1.len() == size + 1 && tokens2.len() == size + 1 {
        // only the last operand differs: record that operand alone
        let before = tokens1[size].strip_suffix(STATEMENT_TERMINATION).unwrap_or(tokens1[size]);
        let after = tokens2[size].strip_suffix(STATEMENT_TERMINATION).unwrap_or(tokens2[size]);
        let mut r = Replacement::new(before, after, ReplacementKind::concatenation());
        for m in mappings {
            r.add_sub_expression_mapping(m);
        }
        info.add(r);
        return true;
    }

    let mut r = Replacement::new(s1, s2, ReplacementKind::concatenation());
    for m in mappings {
        r.add_sub_expression_mapping(m);
    }
    info.add(r);
    true
}

/// `"x=" + x` becoming `format("x=%s", x)`.
fn concat_to_argument_list(s1: &str, s2: &str, ctx: &PairContext<'_>, info: &mut ReplacementInfo) -> bool {
    let tokens1 = split_concat(s1);
    let tokens2 = split_comma(s2);
    let mut common: Vec<String> = Vec::new();
    for token1 in tokens1 {
        if tokens2.contains(&token1) {
            common.push(token1.to_owned());
            continue;
        }
        for token2 in &tokens2 {
            if token2.len() > 3 && token2.strip_suffix(");\n") == Some(token1) {
                common.push(token1.to_owned());
            }
        }
    }
    let filtered = not_in_replacements(common, info, false);
    if filtered.is_empty() {
        return false;
    }
    let mut r = intersection_replacement(s1, s2, ctx, &filtered);
    process_string_literals(ctx, &mut r);
    info.add(r);
    true
}

/// One side concatenates, both sides hold comma separated lists.
fn comma_lists_on_both_sides(s1: &str, s2: &str, ctx: &PairContext<'_>, info: &mut ReplacementInfo) -> bool {
    let tokens1 = split_comma(s1);
    let tokens2 = split_comma(s2);
    let common = quote_insensitive_common(&tokens1, &tokens2);
    let filtered = not_in_replacements(common, info, true);
    if filtered.len() != tokens1.len().min(tokens2.len()) {
        return false;
    }
    let mut r = intersection_replacement(s1, s2, ctx, &filtered);
    process_string_literals(ctx, &mut r);
    info.add(r);
    true
}

/// `"a\tb"` becoming an argument list `a, b`.
fn tab_list_to_argument_list(s1: &str, s2: &str, ctx: &PairContext<'_>, info: &mut ReplacementInfo) -> bool {
    let tokens1: Vec<&str> = split_tab(s1).into_iter().filter(|t| !t.is_empty()).collect();
    let tokens2 = split_comma(s2);
    let common = quote_insensitive_common(&tokens1, &tokens2);
    let filtered = not_in_replacements(common, info, true);
    if filtered.len() + 1 < tokens1.len().min(tokens2.len()) {
        return false;
    }
    let r = intersection_replacement(s1, s2, ctx, &filtered);
    info.add(r);
    true
}

/// `x=concat(a,b)` becoming `x=a + b`: same target, and every argument of
/// side 1 shows up on side 2.
fn arguments_to_concat_operands(s1: &str, s2: &str, ctx: &PairContext<'_>, info: &mut ReplacementInfo) -> bool {
    let statement1 = ctx.fragment1();
    let statement2 = ctx.fragment2();
    let declarations1 = &statement1.variable_declarations;
    let declarations2 = &statement2.variable_declarations;
    let same_declarations = !declarations1.is_empty()
        && declarations1.len() == declarations2.len()
        && declarations1.iter().zip(declarations2).all(|(d1, d2)| d1.same_signature(d2))
        && declaration_with_array_initializer(declarations1).is_none()
        && declaration_with_array_initializer(declarations2).is_none();
    let first1 = statement1.expressions_of_kind(LeafKind::Variable).next();
    let first2 = statement2.expressions_of_kind(LeafKind::Variable).next();
    let same_target = match (first1, first2) {
        (Some(v1), Some(v2)) => {
            v1.text == v2.text
                && statement1.text.starts_with(&format!("{}{ASSIGNMENT}", v1.text))
                && statement2.text.starts_with(&format!("{}{ASSIGNMENT}", v2.text))
        }
        _ => false,
    };
    if !same_declarations && !same_target {
        return false;
    }
    let (Some(open), Some(close)) = (s1.find('('), s1.rfind(')')) else {
        return false;
    };
    let Some(inner) = s1.get(open + 1..close) else {
        return false;
    };
    let tokens1: Vec<String> = split_comma(inner)
        .into_iter()
        .map(|t| match t.strip_prefix('-') {
            Some(rest) => format!("- {rest}"),
            None => t.to_owned(),
        })
        .collect();
    let count = tokens1.iter().filter(|t| contains_token(s2, t)).count();
    if count <= 1 || count != tokens1.len() {
        return false;
    }
    let r = intersection_replacement(s1, s2, ctx, &tokens1);
    info.add(r);
    true
}

// ---------------------------------------------------------------------------
// Text blocks
// ---------------------------------------------------------------------------

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// The string literals of statement 1, concatenated, hold the same text as
/// a text block of statement 2, ignoring whitespace and `%` format tails.
fn string_concat_text_block(s1: &str, s2: &str, ctx: &PairContext<'_>, info: &mut ReplacementInfo) -> bool {
    let statement1 = ctx.fragment1();
    let statement2 = ctx.fragment2();
    let literals: Vec<_> = statement1.expressions_of_kind(LeafKind::StringLiteral).collect();
    let joined: String = literals
        .iter()
        .filter_map(|l| l.text.get(1..l.text.len().saturating_sub(1)))
        .collect();
    let concatenated = strip_whitespace(&joined).replace("\\\"", "\"");

    for block in statement2.expressions_of_kind(LeafKind::TextBlock) {
        let Some(mut body) = block.text.get(3..block.text.len().saturating_sub(3)).map(str::to_owned) else {
            continue;
        };
        let comments: Vec<String> = body
            .lines()
            .filter_map(|line| line.find('%').map(|i| line[i..].to_owned()))
            .collect();
        for comment in &comments {
            body = body.replace(comment.as_str(), "");
        }
        let formatted = strip_whitespace(&body);
        let longest = concatenated.chars().count().max(formatted.chars().count());
        let close_enough = formatted == concatenated
            || (longest > 0
                && (levenshtein::distance(&concatenated, &formatted) as f64 / longest as f64)
                    < ctx.config.text_block_max_distance_ratio)
            // identical once a single line is dropped
            || body
                .lines()
                .filter(|line| !line.trim().is_empty())
                .any(|line| strip_whitespace(&body.replace(line, "")) == concatenated);
        if close_enough {
            let mut r = Replacement::new(s1, s2, ReplacementKind::concatenation());
            for literal in &literals {
                r.add_sub_expression_mapping(LeafMapping::new(
                    FragmentRef::expression(ctx.statement1, literal),
                    FragmentRef::expression(ctx.statement2, block),
                ));
            }
            info.add(r);
            return true;
        }
    }
    false
}

// ---------------------------------------------------------------------------
// Per-argument concatenation
// ---------------------------------------------------------------------------

/// The call or creation making up the whole statement, or the right-hand
/// side of its assignment.
fn covering_call(statement: &Statement) -> Option<&Call> {
    statement
        .creation_covering_entire_fragment()
        .or_else(|| statement.invocation_covering_entire_fragment())
        .or_else(|| statement.assignment_invocation_covering_entire_statement())
}

/// Literal-ize `concatenated`: join its string fragments, substituting
/// known parameter bindings for the other operands.
fn literalize(concatenated: &[&str], ctx: &PairContext<'_>) -> String {
    let mut sb = String::from("\"");
    for &token in concatenated {
        if token.len() > 1 && token.starts_with('"') && token.ends_with('"') {
            sb.push_str(&token[1..token.len() - 1]);
        } else if let Some(argument) = ctx.mapper.parameter_to_argument.get(token) {
            sb.push_str(argument);
        } else {
            sb.push_str(token);
        }
    }
    sb.push('"');
    sb
}

/// `literal` and the concatenation `tokens` spell the same string, or one
/// operand of a short concatenation is itself an argument of the other call.
fn concatenation_matches(
    literal: &str,
    tokens: &[&str],
    other_arguments: &[String],
    same_arity: bool,
    ctx: &PairContext<'_>,
) -> bool {
    let concatenated = literalize(tokens, ctx);
    concatenated == literal
        || levenshtein::distance(&concatenated, literal) < tokens.len()
        || (same_arity
            && tokens.len() <= ctx.config.min_concat_tokens_for_argument_match
            && tokens.iter().any(|t| other_arguments.iter().any(|a| a == t)))
}

/// Two calls with arguments that are equal, already replaced, or
/// concatenations of the other side's argument.
fn concatenated_arguments(ctx: &PairContext<'_>, info: &mut ReplacementInfo) -> bool {
    let (Some(call1), Some(call2)) = (covering_call(ctx.fragment1()), covering_call(ctx.fragment2())) else {
        return false;
    };
    let arguments1 = &call1.arguments;
    let arguments2 = &call2.arguments;
    let same_arity = arguments1.len() == arguments2.len();
    let mut concat_replacements: Vec<Replacement> = Vec::new();
    let mut equal = 0;
    let mut replaced = 0;
    let mut concatenated = 0;
    for (arg1, arg2) in arguments1.iter().zip(arguments2) {
        let concat1 = arg1.contains(STRING_CONCATENATION);
        let concat2 = arg2.contains(STRING_CONCATENATION);
        if arg1 == arg2 {
            equal += 1;
        } else if !concat1 && concat2 {
            let tokens = dedup(split_concat(arg2));
            if concatenation_matches(arg1, &tokens, arguments1, same_arity, ctx) {
                concat_replacements.push(Replacement::new(arg1, arg2, ReplacementKind::concatenation()));
                concatenated += 1;
            }
        } else if concat1 && !concat2 {
            let tokens = dedup(split_concat(arg1));
            if concatenation_matches(arg2, &tokens, arguments2, same_arity, ctx) {
                concat_replacements.push(Replacement::new(arg1, arg2, ReplacementKind::concatenation()));
                concatenated += 1;
            }
        } else if info
            .replacements()
            .iter()
            .any(|r| &r.before == arg1 && &r.after == arg2)
        {
            replaced += 1;
        }
    }
    let min_size = arguments1.len().min(arguments2.len());
    if concatenated > 0 && equal + replaced + concatenated == min_size {
        info.add_all(concat_replacements);
        return true;
    }
    false
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `s1` has no comma outside calls it shares with statement 2.
pub fn no_comma_s1(s1: &str, statement1: &Statement, statement2: &Statement) -> bool {
    if !s1.contains(',') {
        return true;
    }
    let calls1: Vec<&Call> = statement1.method_invocations().collect();
    let calls2: Vec<&Call> = statement2.method_invocations().collect();
    if calls1.len() != calls2.len() {
        return false;
    }
    let mut remaining = s1.to_owned();
    for (call1, call2) in calls1.iter().zip(&calls2) {
        let text1 = call1.string();
        if text1 == call2.string() && text1.contains(',') {
            remaining = remaining.replace(text1.as_ref(), "");
        }
    }
    !remaining.contains(',')
}

/// Map string literals of the two statements whose unquoted texts contain
/// one another.
fn process_string_literals(ctx: &PairContext<'_>, r: &mut Replacement) {
    let literals1: Vec<_> = ctx.fragment1().expressions_of_kind(LeafKind::StringLiteral).collect();
    let literals2: Vec<_> = ctx.fragment2().expressions_of_kind(LeafKind::StringLiteral).collect();
    if literals1.is_empty() || literals2.is_empty() {
        return;
    }
    let unquoted = |s: &str| s.replace('"', "").trim().to_owned();
    let mut pairs = Vec::new();
    if literals1.len() <= literals2.len() {
        for &l1 in &literals1 {
            for &l2 in &literals2 {
                pairs.push((l1, l2));
            }
        }
    } else {
        for &l2 in &literals2 {
            for &l1 in &literals1 {
                pairs.push((l1, l2));
            }
        }
    }
    for (l1, l2) in pairs {
        if l1.text == l2.text {
            continue;
        }
        let (u1, u2) = (unquoted(&l1.text), unquoted(&l2.text));
        if u1.contains(&u2) || u2.contains(&u1) {
            r.add_sub_expression_mapping(LeafMapping::new(
                FragmentRef::expression(ctx.statement1, l1),
                FragmentRef::expression(ctx.statement2, l2),
            ));
        }
    }
}

fn dedup(tokens: Vec<&str>) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::with_capacity(tokens.len());
    for t in tokens {
        if !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

/// Tokens of side 1 found on side 2 verbatim, or contained in a side 2
/// token (either way) once double quotes are dropped.
fn quote_insensitive_common(tokens1: &[&str], tokens2: &[&str]) -> Vec<String> {
    let mut common = Vec::new();
    for &token1 in tokens1 {
        if tokens2.contains(&token1) {
            common.push(token1.to_owned());
            continue;
        }
        let bare1 = token1.replace('"', "");
        for &token2 in tokens2 {
            let bare2 = token2.replace('"', "");
            if bare2.contains(&bare1) {
                common.push(token1.to_owned());
                break;
            }
            if bare1.contains(&bare2) {
                common.push(token2.to_owned());
                break;
            }
        }
    }
    common
}

/// Drop the tokens an existing replacement already explains. With
/// `both_ways`, a token containing a replaced text is dropped too.
fn not_in_replacements(common: Vec<String>, info: &ReplacementInfo, both_ways: bool) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for token in common {
        let explained = info.replacements().iter().any(|r| {
            r.before.contains(token.as_str())
                || r.after.contains(token.as_str())
                || (both_ways
                    && ((!r.before.is_empty() && token.contains(r.before.as_str()))
                        || (!r.after.is_empty() && token.contains(r.after.as_str()))))
        });
        if !explained && !out.contains(&token) {
            out.push(token);
        }
    }
    out
}

/// Pair up the occurrences of `key` on both sides, when both sides have
/// the same number of them.
fn leaf_mappings(ctx: &PairContext<'_>, key: &str) -> Vec<LeafMapping> {
    let statement1 = ctx.fragment1();
    let statement2 = ctx.fragment2();
    let found1 = statement1.find_expression(key);
    let found2 = statement2.find_expression(key);
    if found1.len() != found2.len() {
        return Vec::new();
    }
    found1
        .into_iter()
        .zip(found2)
        .map(|(i, j)| {
            LeafMapping::new(
                FragmentRef::expression(ctx.statement1, &statement1.expressions[i]),
                FragmentRef::expression(ctx.statement2, &statement2.expressions[j]),
            )
        })
        .collect()
}

fn intersection_replacement(s1: &str, s2: &str, ctx: &PairContext<'_>, keys: &[String]) -> Replacement {
    let mut r = Replacement::new(s1, s2, ReplacementKind::concatenation());
    for key in keys {
        for m in leaf_mappings(ctx, key) {
            r.add_sub_expression_mapping(m);
        }
    }
    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LeafExpression, Location, VariableDeclaration};
    use crate::replacement::ReplacementType;
    use crate::rules::fixtures::{config, pair, text_pair};

    fn leaf(text: &str, kind: LeafKind, offset: u32) -> LeafExpression {
        LeafExpression::new(text, kind, Location::new(1, 1, offset, offset + text.len() as u32))
    }

    #[test]
    fn test_single_differing_operand() {
        let s1 = "a + \"-\" + b;\n";
        let s2 = "a + \"-\" + c;\n";
        let (ctx, a, b) = text_pair(s1, s2);
        let config = config();
        let pair = PairContext::new(&ctx, a, b, &config);
        let mut info = ReplacementInfo::default();
        assert!(common_concat(s1, s2, &pair, &mut info));
        assert_eq!(info.replacements().len(), 1);
        let r = &info.replacements()[0];
        assert!(r.is(ReplacementType::Concatenation));
        assert_eq!((r.before.as_str(), r.after.as_str()), ("b", "c"));
    }

    #[test]
    fn test_inserted_operand() {
        let s1 = "msg=a + b + c;\n";
        let s2 = "msg=a + b + d + c;\n";
        let (ctx, a, b) = text_pair(s1, s2);
        let config = config();
        let pair = PairContext::new(&ctx, a, b, &config);
        let mut info = ReplacementInfo::default();
        assert!(common_concat(s1, s2, &pair, &mut info));
        let r = &info.replacements()[0];
        assert_eq!(r.before, s1);
        assert_eq!(r.after, s2);
    }

    #[test]
    fn test_disjoint_concatenations_decline() {
        let s1 = "x=a + b;\n";
        let s2 = "y=c + d;\n";
        let (ctx, a, b) = text_pair(s1, s2);
        let config = config();
        let pair = PairContext::new(&ctx, a, b, &config);
        let mut info = ReplacementInfo::default();
        assert!(!common_concat(s1, s2, &pair, &mut info));
        assert!(info.replacements().is_empty());
    }

    #[test]
    fn test_concat_to_format_arguments() {
        let s1 = "log(\"value \" + v);\n";
        let s2 = "log(\"value %s\", v);\n";
        let mut st1 = Statement::new(s1);
        st1.expressions.push(leaf("\"value \"", LeafKind::StringLiteral, 4));
        let mut st2 = Statement::new(s2);
        st2.expressions.push(leaf("\"value %s\"", LeafKind::StringLiteral, 4));
        let (ctx, a, b) = pair(st1, st2);
        let config = config();
        let pair = PairContext::new(&ctx, a, b, &config);
        let mut info = ReplacementInfo::default();
        assert!(common_concat(s1, s2, &pair, &mut info));
        let r = &info.replacements()[0];
        assert!(r.is(ReplacementType::Concatenation));
        assert_eq!(r.sub_expression_mappings().len(), 1);
    }

    #[test]
    fn test_arguments_become_operands() {
        let s1 = "x=concat(a,b);\n";
        let s2 = "x=a + b;\n";
        let mut st1 = Statement::new(s1);
        st1.expressions.push(leaf("x", LeafKind::Variable, 0));
        let mut st2 = Statement::new(s2);
        st2.expressions.push(leaf("x", LeafKind::Variable, 0));
        let (ctx, a, b) = pair(st1, st2);
        let config = config();
        let pair = PairContext::new(&ctx, a, b, &config);
        let mut info = ReplacementInfo::default();
        assert!(common_concat(s1, s2, &pair, &mut info));
        assert_eq!(info.count_kind(ReplacementType::Concatenation), 1);
    }

    #[test]
    fn test_text_block() {
        let s1 = "sql=\"select *\" + \" from t\";\n";
        let block = "\"\"\"\n select * from t\n \"\"\"";
        let s2 = format!("sql={block};\n");
        let mut st1 = Statement::new(s1);
        st1.expressions.push(leaf("\"select *\"", LeafKind::StringLiteral, 4));
        st1.expressions.push(leaf("\" from t\"", LeafKind::StringLiteral, 17));
        let mut st2 = Statement::new(s2.as_str());
        st2.expressions.push(leaf(block, LeafKind::TextBlock, 4));
        let (ctx, a, b) = pair(st1, st2);
        let config = config();
        let pair = PairContext::new(&ctx, a, b, &config);
        let mut info = ReplacementInfo::default();
        assert!(common_concat(s1, &s2, &pair, &mut info));
        assert_eq!(info.replacements()[0].sub_expression_mappings().len(), 2);
    }

    #[test]
    fn test_literalized_argument() {
        let s1 = "foo(\"hello world\");\n";
        let s2 = "foo(\"hello \" + name);\n";
        let mut st1 = Statement::new(s1);
        st1.calls.push(Call::invocation(None, "foo", &["\"hello world\""]));
        let mut st2 = Statement::new(s2);
        st2.calls.push(Call::invocation(None, "foo", &["\"hello \" + name"]));
        let (mut ctx, a, b) = pair(st1, st2);
        ctx.parameter_to_argument.insert("name".into(), "world".into());
        let config = config();
        let pair = PairContext::new(&ctx, a, b, &config);
        let mut info = ReplacementInfo::default();
        assert!(common_concat(s1, s2, &pair, &mut info));
        let r = &info.replacements()[0];
        assert_eq!(r.before, "\"hello world\"");
        assert_eq!(r.after, "\"hello \" + name");
    }

    #[test]
    fn test_unrelated_argument_declines() {
        let s1 = "foo(\"bye\");\n";
        let s2 = "foo(\"hello there\" + name);\n";
        let mut st1 = Statement::new(s1);
        st1.calls.push(Call::invocation(None, "foo", &["\"bye\""]));
        let mut st2 = Statement::new(s2);
        st2.calls.push(Call::invocation(None, "foo", &["\"hello there\" + name"]));
        let (ctx, a, b) = pair(st1, st2);
        let config = config();
        let pair = PairContext::new(&ctx, a, b, &config);
        let mut info = ReplacementInfo::default();
        assert!(!common_concat(s1, s2, &pair, &mut info));
        assert!(info.replacements().is_empty());
    }

    #[test]
    fn test_valid_statement_for_concat_comparison() {
        let mut declaring = Statement::new("String s=a + b;\n");
        declaring.variable_declarations.push(VariableDeclaration::new("s", "String"));
        let returning = Statement::new("return a + b;\n");
        let plain = Statement::new("s=a + b;\n");
        assert!(valid_statement_for_concat_comparison(&declaring, &returning));
        assert!(valid_statement_for_concat_comparison(&returning, &declaring));
        assert!(!valid_statement_for_concat_comparison(&declaring, &plain));
        assert!(valid_statement_for_concat_comparison(&plain, &returning));
    }

    #[test]
    fn test_no_comma_outside_shared_calls() {
        let mut st1 = Statement::new("log(f(a, b) + x);\n");
        st1.calls.push(Call::invocation(None, "f", &["a", "b"]).with_text("f(a, b)"));
        let mut st2 = Statement::new("log(f(a, b), x);\n");
        st2.calls.push(Call::invocation(None, "f", &["a", "b"]).with_text("f(a, b)"));
        assert!(no_comma_s1("log(f(a, b) + x);\n", &st1, &st2));
        assert!(!no_comma_s1("log(a, b + x);\n", &Statement::default(), &st2));
    }
}
