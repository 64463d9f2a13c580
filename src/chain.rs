//! Ordered rule chain.
//!
//! [`classify`] runs [`RULE_CHAIN`] against one statement pair and stops at
//! the first rule that accepts it. Each layer either proves the statements
//! equal under the edits it records on the accumulator, or declines:
//!
//! 1. parenthesis elimination
//! 2. cast, prefix operator or infix operand
//! 3. `final` modifier
//! 4. `this.` qualifier
//! 5. `throw` keyword
//! 6. default initializer
//! 7. declaration against assignment
//! 8. identical declarations with different names
//! 9. declaration against `return`
//! 10. infix expression expansion (needs valid operator replacements)
//! 11. common conditional (needs valid operator replacements)
//! 12. argument merge
//! 13. new argument additions
//! 14. concatenation (needs comparable statement shapes)
//!
//! Once a pair is accepted, the caller runs [`everything_replaced`]: a pair
//! whose every distinguishing part was rewritten by the recorded
//! replacements is only superficially related and should be rejected.

use tracing::{Level, debug, enabled, trace};

use crate::conditional::common_conditional;
use crate::model::PairContext;
use crate::replacement::ReplacementInfo;
use crate::rules::{Rule, arguments, concat, declaration, everything, operators, prefix};
use crate::text::diff::render_pair;

/// A rejection check over an accepted pair. Never modifies the accumulator.
pub type Check = fn(&PairContext<'_>, &ReplacementInfo) -> bool;

/// The equivalence rules, in evaluation order.
pub const RULE_CHAIN: &[(&str, Rule)] = &[
    ("parenthesis elimination", parenthesis_elimination),
    (
        "cast, prefix operator or infix operand",
        prefix::differ_only_in_cast_expression_or_prefix_operator_or_infix_operand,
    ),
    ("final modifier", prefix::differ_only_in_final_modifier),
    ("this qualifier", this_qualifier),
    ("throw keyword", throw_keyword),
    ("default initializer", default_initializer),
    (
        "declaration against assignment",
        declaration::one_is_variable_declaration_the_other_is_variable_assignment,
    ),
    (
        "identical declarations with different names",
        declaration::identical_variable_declarations_with_different_names,
    ),
    ("declaration against return", declaration_against_return),
    ("infix expression expansion", infix_expression_expansion),
    ("common conditional", conditional),
    ("argument merge", arguments::equal_after_argument_merge),
    ("new argument additions", arguments::equal_after_new_argument_additions),
    ("concatenation", concatenation),
];

/// The rejection checks, in evaluation order.
pub const EVERYTHING_REPLACED_CHAIN: &[(&str, Check)] = &[
    (
        "variable declarations",
        everything::variable_declarations_with_everything_replaced,
    ),
    (
        "variable assignment",
        everything::variable_assignment_with_everything_replaced,
    ),
    (
        "class instance creation",
        everything::class_instance_creation_with_everything_replaced,
    ),
    (
        "this constructor call",
        everything::this_constructor_call_with_everything_replaced,
    ),
    ("invocation", everything::invocation_with_everything_replaced),
    (
        "operator expression",
        operators::operator_expression_with_everything_replaced,
    ),
];

// -- Adapters for rules with narrower signatures --

fn parenthesis_elimination(s1: &str, s2: &str, _: &PairContext<'_>, _: &mut ReplacementInfo) -> bool {
    prefix::equal_after_parenthesis_elimination(s1, s2)
}

fn this_qualifier(s1: &str, s2: &str, _: &PairContext<'_>, _: &mut ReplacementInfo) -> bool {
    prefix::differ_only_in_this(s1, s2)
}

fn throw_keyword(s1: &str, s2: &str, _: &PairContext<'_>, _: &mut ReplacementInfo) -> bool {
    prefix::differ_only_in_throw(s1, s2)
}

fn default_initializer(s1: &str, s2: &str, ctx: &PairContext<'_>, _: &mut ReplacementInfo) -> bool {
    prefix::differ_only_in_default_initializer(s1, s2, ctx)
}

fn declaration_against_return(s1: &str, s2: &str, ctx: &PairContext<'_>, _: &mut ReplacementInfo) -> bool {
    declaration::one_is_variable_declaration_the_other_is_return_statement(s1, s2, ctx)
}

fn infix_expression_expansion(s1: &str, s2: &str, ctx: &PairContext<'_>, info: &mut ReplacementInfo) -> bool {
    operators::contains_valid_operator_replacements(info)
        && operators::equal_after_infix_expression_expansion(s1, s2, ctx, info)
}

fn conditional(s1: &str, s2: &str, ctx: &PairContext<'_>, info: &mut ReplacementInfo) -> bool {
    operators::contains_valid_operator_replacements(info) && common_conditional(s1, s2, ctx, info)
}

fn concatenation(s1: &str, s2: &str, ctx: &PairContext<'_>, info: &mut ReplacementInfo) -> bool {
    concat::valid_statement_for_concat_comparison(ctx.fragment1(), ctx.fragment2())
        && concat::common_concat(s1, s2, ctx, info)
}

/// Run the rule chain over `s1` and `s2`, the statement texts after the
/// caller's replacements so far.
///
/// Returns the name of the accepting rule, or `None` when every rule
/// declined. Replacements and refactoring candidates end up on `info`.
pub fn classify(
    s1: &str,
    s2: &str,
    ctx: &PairContext<'_>,
    info: &mut ReplacementInfo,
) -> Option<&'static str> {
    if enabled!(Level::TRACE) {
        trace!(
            statement1 = ?ctx.statement1,
            statement2 = ?ctx.statement2,
            diff = %render_pair(s1, s2),
            "classifying pair"
        );
    }
    for &(name, rule) in RULE_CHAIN {
        if rule(s1, s2, ctx, info) {
            debug!(
                rule = name,
                replacements = info.replacements().len(),
                refactorings = info.refactorings().len(),
                "rule accepted pair"
            );
            return Some(name);
        }
        trace!(rule = name, "rule declined");
    }
    debug!("no rule accepted pair");
    None
}

/// The first rejection check that fires for an accepted pair.
pub fn everything_replaced(ctx: &PairContext<'_>, info: &ReplacementInfo) -> Option<&'static str> {
    let fired = EVERYTHING_REPLACED_CHAIN
        .iter()
        .find(|(_, check)| check(ctx, info))
        .map(|&(name, _)| name);
    if let Some(name) = fired {
        debug!(check = name, "everything replaced");
    }
    fired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Call, Statement};
    use crate::replacement::{Replacement, ReplacementKind};
    use crate::rules::fixtures::{config, pair, text_pair};

    #[test]
    fn test_chain_order() {
        let names: Vec<&str> = RULE_CHAIN.iter().map(|(name, _)| *name).collect();
        assert_eq!(names.len(), 14);
        assert_eq!(names[0], "parenthesis elimination");
        assert_eq!(names[10], "common conditional");
        assert_eq!(names[13], "concatenation");
    }

    #[test]
    fn test_first_accepting_rule_wins() {
        let (mapper, a, b) = text_pair("x=(a+b);\n", "x=a+b;\n");
        let config = config();
        let ctx = PairContext::new(&mapper, a, b, &config);
        let mut info = ReplacementInfo::default();
        let s1 = ctx.fragment1().text.clone();
        let s2 = ctx.fragment2().text.clone();
        assert_eq!(classify(&s1, &s2, &ctx, &mut info), Some("parenthesis elimination"));
        assert!(info.replacements().is_empty());
    }

    #[test]
    fn test_everything_replaced_reports_check() {
        let this_call = |text: &str, args: &[&str]| {
            let mut s = Statement::new(text);
            s.calls.push(Call::invocation(None, "this", args));
            s
        };
        let (mapper, a, b) = pair(this_call("this(a,b);\n", &["a", "b"]), this_call("this(c,d);\n", &["c", "d"]));
        let config = config();
        let ctx = PairContext::new(&mapper, a, b, &config);
        let mut info = ReplacementInfo::default();
        info.add(Replacement::new("a", "c", ReplacementKind::VariableName));
        assert!(everything_replaced(&ctx, &info).is_some());
    }
}
