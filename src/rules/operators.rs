//! Operator family: infix operators, infix expressions and directional
//! comparisons.

use tracing::trace;

use super::anonymous::contains_method_signature_of_anonymous_class;
use crate::model::PairContext;
use crate::replacement::{Replacement, ReplacementInfo, ReplacementKind, ReplacementType};
use crate::text::{RETURN_SPACE, STATEMENT_TERMINATION, levenshtein, perform_replacement};

/// Every recorded operator replacement is a logical dual: `==`/`!=` or
/// `&&`/`||`.
pub fn contains_valid_operator_replacements(info: &ReplacementInfo) -> bool {
    info.by_kind(ReplacementType::InfixOperator).all(|r| {
        let dual = match r.before.as_str() {
            "==" => "!=",
            "!=" => "==",
            "&&" => "||",
            "||" => "&&",
            _ => return true,
        };
        r.after == dual
    })
}

/// A replacement `x -> y` where side 1 really had the infix expression
/// `x + 1` in place of `y`.
///
/// Each candidate expansion is tried on the side 1 scratch text and kept
/// while it brings the scratch texts closer. The pair is equal only if the
/// scratch texts end up identical; otherwise the accumulator is restored.
pub fn equal_after_infix_expression_expansion(
    s1: &str,
    _s2: &str,
    ctx: &PairContext<'_>,
    info: &mut ReplacementInfo,
) -> bool {
    let infix_expressions: Vec<&str> = ctx.fragment1().infix_expressions().collect();
    if infix_expressions.is_empty() {
        return false;
    }
    info.attempt(|info| {
        let mut to_remove = Vec::new();
        let mut to_add = Vec::new();
        for replacement in info.replacements().to_vec() {
            for &infix in &infix_expressions {
                let Some(suffix) = infix.strip_prefix(replacement.before.as_str()) else {
                    continue;
                };
                let expanded = format!("{}{suffix}", replacement.after);
                if !s1.contains(&expanded) {
                    continue;
                }
                let temp = perform_replacement(info.argumentized1(), &expanded, &replacement.after);
                if levenshtein::distance(&temp, info.argumentized2()) < info.raw_distance() {
                    to_remove.push(replacement.clone());
                    to_add.push(Replacement::new(
                        infix,
                        replacement.after.clone(),
                        ReplacementKind::InfixExpression,
                    ));
                    info.set_argumentized1(temp);
                }
            }
        }
        if info.raw_distance() != 0 {
            trace!(distance = info.raw_distance(), "infix expansion left a residual distance");
            return false;
        }
        info.remove(&to_remove);
        info.add_all(to_add);
        true
    })
}

/// Rejection check: the statements are built around an operator and every
/// part of them was replaced.
///
/// With one operator per side, the operator must be a recorded operator
/// replacement and both operands must carry a replacement (directly or via
/// a parameter binding). Otherwise, the recorded replacements laid end to
/// end must spell out both `return`, `if` or `while` statements entirely.
pub fn operator_expression_with_everything_replaced(ctx: &PairContext<'_>, info: &ReplacementInfo) -> bool {
    let statement1 = ctx.fragment1();
    let statement2 = ctx.fragment2();
    let first_line = |s: &str| -> String {
        match s.find('\n') {
            Some(i) if contains_method_signature_of_anonymous_class(s) => s[..i].to_owned(),
            _ => s.to_owned(),
        }
    };
    let string1 = first_line(&statement1.text);
    let string2 = first_line(&statement2.text);

    if let ([operator1], [operator2]) =
        (statement1.infix_operators.as_slice(), statement2.infix_operators.as_slice())
    {
        let (Some(index1), Some(index2)) = (string1.find(operator1.as_str()), string2.find(operator2.as_str()))
        else {
            return false;
        };
        let (left1, right1) = (&string1[..index1], &string1[index1 + operator1.len()..]);
        let (left2, right2) = (&string2[..index2], &string2[index2 + operator2.len()..]);
        let mut operator_replaced = false;
        let mut left_replaced = false;
        let mut right_replaced = false;
        for r in info.replacements() {
            if let Some((parameter, _)) = ctx
                .mapper
                .parameter_to_argument
                .iter()
                .find(|(_, argument)| **argument == r.after)
            {
                left_replaced |= left1.contains(r.before.as_str()) && left2.contains(parameter.as_str());
                right_replaced |= right1.contains(r.before.as_str()) && right2.contains(parameter.as_str());
            }
            if r.is(ReplacementType::InfixOperator) {
                operator_replaced |= &r.before == operator1 && &r.after == operator2;
            } else if left1.contains(r.before.as_str()) && left2.contains(r.after.as_str()) {
                left_replaced = true;
            } else if right1.contains(r.before.as_str()) && right2.contains(r.after.as_str()) {
                right_replaced = true;
            }
        }
        return operator_replaced && left_replaced && right_replaced;
    }

    if info.replacements().len() <= 1 {
        return false;
    }
    let mut before = String::new();
    let mut after = String::new();
    for r in info.replacements() {
        if r.is(ReplacementType::InfixOperator) {
            before.push_str(&format!(" {} ", r.before));
            after.push_str(&format!(" {} ", r.after));
        } else {
            before.push_str(&r.before);
            after.push_str(&r.after);
        }
    }
    let (text1, text2) = (statement1.text.as_str(), statement2.text.as_str());
    if text1.starts_with(RETURN_SPACE) && text2.starts_with(RETURN_SPACE) {
        text1 == format!("{RETURN_SPACE}{before}{STATEMENT_TERMINATION}")
            && text2 == format!("{RETURN_SPACE}{after}{STATEMENT_TERMINATION}")
    } else {
        ["if(", "while("].into_iter().any(|keyword| {
            text1.starts_with(keyword)
                && text2.starts_with(keyword)
                && text1 == format!("{keyword}{before})")
                && text2 == format!("{keyword}{after})")
        })
    }
}

/// `a > b` on side 1 read as `b < a` on side 2.
///
/// Walks away from `operator1` in `s1` and from `operator2` in `s2` in
/// opposite directions, one character at a time, and stops at the first
/// point where the two scanned strings are equal. Tries the right side of
/// `s1` against the left side of `s2` first, then the reverse.
pub fn invert_conditional_direction(s1: &str, s2: &str, operator1: &str, operator2: &str) -> Option<Replacement> {
    let index1 = s1.find(operator1)?;
    let index2 = s2.find(operator2)?;
    let chars1: Vec<char> = s1.chars().collect();
    let chars2: Vec<char> = s2.chars().collect();
    let at1 = s1[..index1].chars().count();
    let at2 = s2[..index2].chars().count();
    let len1 = operator1.chars().count();
    let len2 = operator2.chars().count();

    // s1 rightwards, s2 leftwards
    let mut scanned1 = String::new();
    let mut scanned2: Vec<char> = Vec::new();
    let (mut i, mut j) = (at1 + len1, at2);
    while i < chars1.len() && j > 0 {
        j -= 1;
        scanned1.push(chars1[i]);
        scanned2.insert(0, chars2[j]);
        if scanned2.iter().collect::<String>() == scanned1 {
            return Some(Replacement::new(
                format!("{operator1}{scanned1}"),
                format!("{scanned1}{operator2}"),
                ReplacementKind::InvertConditional,
            ));
        }
        i += 1;
    }

    // s1 leftwards, s2 rightwards
    let mut scanned1: Vec<char> = Vec::new();
    let mut scanned2 = String::new();
    let (mut i, mut j) = (at1, at2 + len2);
    while i > 0 && j < chars2.len() {
        i -= 1;
        scanned1.insert(0, chars1[i]);
        scanned2.push(chars2[j]);
        if scanned1.iter().collect::<String>() == scanned2 {
            return Some(Replacement::new(
                format!("{scanned2}{operator1}"),
                format!("{operator2}{scanned2}"),
                ReplacementKind::InvertConditional,
            ));
        }
        j += 1;
    }
    None
}
