//! Declaration/assignment family.
//!
//! Decides when a variable declaration is the same statement as a plain
//! assignment or a `return` of the same value, and records renamed or
//! retyped declarations.

use tracing::trace;

use super::prefix::declares;
use crate::model::{CodeModel, PairContext, StatementId, VariableDeclaration};
use crate::replacement::{Replacement, ReplacementInfo, ReplacementKind};
use crate::text::{
    ASSIGNMENT, RETURN_SPACE, STATEMENT_TERMINATION, common_suffix, count_spaces,
    perform_replacement,
};

/// Both sides declare exactly one variable, under different names, and the
/// statements are otherwise the same. Catch clauses may also change the
/// exception type when no other catch clause is left unmatched.
pub fn identical_variable_declarations_with_different_names(
    s1: &str,
    s2: &str,
    ctx: &PairContext<'_>,
    info: &mut ReplacementInfo,
) -> bool {
    let ([d1], [d2]) = (
        ctx.fragment1().variable_declarations.as_slice(),
        ctx.fragment2().variable_declarations.as_slice(),
    ) else {
        return false;
    };
    if d1.name == d2.name {
        return false;
    }
    let same_type = d1.type_name == d2.type_name;
    let suffix = common_suffix(s1, s2);
    let (composed1, composed2) = if s1.starts_with("catch(final ")
        && s2.starts_with("catch(final ")
        && same_type
    {
        (format!("catch(final {})", d1.name), format!("catch(final {})", d2.name))
    } else if s1.starts_with("catch(") && s2.starts_with("catch(") && same_type {
        (format!("catch({})", d1.name), format!("catch({})", d2.name))
    } else {
        (
            format!("{} {}{suffix}", d1.type_str(), d1.name),
            format!("{} {}{suffix}", d2.type_str(), d2.name),
        )
    };
    if s1 == composed1 && s2 == composed2 {
        info.add(Replacement::new(&d1.name, &d2.name, ReplacementKind::VariableName));
        return true;
    }

    if s1.starts_with("catch(") && s2.starts_with("catch(") && !same_type {
        let another_catch = |model: &CodeModel, statements: &[StatementId]| {
            statements
                .iter()
                .any(|&id| model.text(id).starts_with("catch("))
        };
        if another_catch(ctx.model1(), &info.statements1)
            || another_catch(ctx.model2(), &info.statements2)
        {
            trace!("catch clause retyped, but another catch clause is unmatched");
            return false;
        }
        info.add(Replacement::new(&d1.name, &d2.name, ReplacementKind::VariableName));
        info.add(Replacement::new(d1.type_str(), d2.type_str(), ReplacementKind::Type));
        return true;
    }
    false
}

/// `T x=value;` against `x=value;`.
///
/// The shorter side must be the common suffix of both texts, and the extra
/// prefix of the longer side may hold at most a modifier and a type.
pub fn one_is_variable_declaration_the_other_is_variable_assignment(
    s1: &str,
    s2: &str,
    ctx: &PairContext<'_>,
    info: &mut ReplacementInfo,
) -> bool {
    let decls1 = &ctx.fragment1().variable_declarations;
    let decls2 = &ctx.fragment2().variable_declarations;
    if let (Some(d1), Some(d2)) = (decls1.first(), decls2.first()) {
        if let (Some(i1), Some(i2)) = (d1.initializer_text(), d2.initializer_text()) {
            if d1.name != d2.name && i1 != i2 {
                return false;
            }
        }
    }
    if !s1.contains(ASSIGNMENT) || !s2.contains(ASSIGNMENT) {
        return false;
    }
    let suffix = common_suffix(s1, s2);
    let max_spaces = ctx.config.max_declaration_prefix_spaces;

    if s1 == suffix || s2 == suffix {
        if prefix_explained_by_replacements(s1, s2, suffix, max_spaces, info) {
            return false;
        }
        return !array_introduced_instead(decls1, decls2, ctx, info);
    }
    suffix.contains(ASSIGNMENT)
        && info.replacements().is_empty()
        && (qualified_by_sibling_declaration(s1, s2, suffix, max_spaces, ctx.model1(), &info.statements1)
            || qualified_by_sibling_declaration(s2, s1, suffix, max_spaces, ctx.model2(), &info.statements2))
}

/// `qualified` is `v.<suffix>` for a variable `v` declared by a sibling
/// statement, and `other` adds at most a modifier and a type in front of
/// the suffix.
fn qualified_by_sibling_declaration(
    qualified: &str,
    other: &str,
    suffix: &str,
    max_spaces: usize,
    model: &CodeModel,
    statements: &[StatementId],
) -> bool {
    let short_prefix = other
        .find(suffix)
        .is_some_and(|i| count_spaces(&other[..i]) <= max_spaces);
    short_prefix
        && statements
            .iter()
            .filter_map(|&id| model.get(id))
            .flat_map(|s| &s.variable_declarations)
            .any(|d| qualified == format!("{}.{suffix}", d.name))
}

/// The common suffix is just the recorded replacements glued together, or
/// the extra prefix holds more than a modifier and a type.
fn prefix_explained_by_replacements(
    s1: &str,
    s2: &str,
    suffix: &str,
    max_spaces: usize,
    info: &ReplacementInfo,
) -> bool {
    match info.replacements() {
        [r1, r2] => format!("{}{ASSIGNMENT}{}{STATEMENT_TERMINATION}", r1.after, r2.after) == suffix,
        [r] if suffix.ends_with("=false;\n") => format!("{}=false;\n", r.after) == suffix,
        [r] if suffix.ends_with("=true;\n") => format!("{}=true;\n", r.after) == suffix,
        _ => {
            let longer = if s1 == suffix { s2 } else { s1 };
            let prefix = longer.find(suffix).map_or(longer, |i| &longer[..i]);
            count_spaces(prefix) > max_spaces
        }
    }
}

/// A replacement turned the declared variable into an element of an array
/// that a sibling statement declares.
fn array_introduced_instead(
    decls1: &[VariableDeclaration],
    decls2: &[VariableDeclaration],
    ctx: &PairContext<'_>,
    info: &ReplacementInfo,
) -> bool {
    let has_brackets = |s: &str| s.contains('[') && s.contains(']');
    let array_name = |s: &str| s.split('[').next().unwrap_or("").to_owned();
    for r in info.replacements() {
        if decls1.first().is_some_and(|d| r.before == d.name) {
            if has_brackets(&r.after)
                && decls2.is_empty()
                && declares(ctx.model2(), &info.statements2, &array_name(&r.after))
            {
                return true;
            }
        } else if decls2.first().is_some_and(|d| r.after == d.name)
            && has_brackets(&r.before)
            && decls1.is_empty()
            && declares(ctx.model1(), &info.statements1, &array_name(&r.before))
        {
            return true;
        }
    }
    false
}

/// `return value;` against `x=value;` or `T x=value;`. Trivial values
/// (`null`, `true`, `false`) never count; `0` counts only between
/// statements that declare nothing.
pub fn one_is_variable_declaration_the_other_is_return_statement(
    s1: &str,
    s2: &str,
    ctx: &PairContext<'_>,
) -> bool {
    let suffix = common_suffix(s1, s2);
    let returns_assigned = |ret: &str, assign: &str| {
        ret.strip_prefix(RETURN_SPACE) == Some(suffix)
            && assign
                .find(ASSIGNMENT)
                .is_some_and(|i| &assign[i + 1..] == suffix)
    };
    let either = returns_assigned(s1, s2) || returns_assigned(s2, s1);
    if !matches!(suffix, "null;\n" | "true;\n" | "false;\n" | "0;\n") && either {
        return true;
    }
    suffix == "0;\n"
        && ctx.fragment1().variable_declarations.is_empty()
        && ctx.fragment2().variable_declarations.is_empty()
        && either
}

/// Applying every recorded replacement to `s1` yields `s2`. Multi-line
/// replacements are cut to their first line, without a trailing `{`.
pub fn identical_after_variable_and_type_replacements(
    s1: &str,
    s2: &str,
    replacements: &[Replacement],
) -> bool {
    let mut updated = s1.to_owned();
    for r in replacements {
        let (mut before, mut after) = (r.before.as_str(), r.after.as_str());
        if let (Some(i), Some(j)) = (before.find('\n'), after.find('\n')) {
            before = &before[..i];
            after = &after[..j];
            if let (Some(b), Some(a)) = (before.strip_suffix('{'), after.strip_suffix('{')) {
                before = b;
                after = a;
            }
        }
        updated = perform_replacement(&updated, before, after);
    }
    updated == s2
}

/// An object creation returned or passed directly on side 1 was first
/// stored in a new local on side 2, and a sibling statement uses that
/// local where side 1 used the creation.
pub fn extracted_to_variable(
    s1: &str,
    s2: &str,
    ctx: &PairContext<'_>,
    info: &ReplacementInfo,
) -> bool {
    let suffix = common_suffix(s1, s2);
    if !suffix.starts_with("new ") {
        return false;
    }
    let Some(d2) = ctx.fragment2().variable_declarations.first() else {
        return false;
    };
    if !ctx.fragment1().variable_declarations.is_empty() {
        return false;
    }
    let Some(prefix1) = s1.find(suffix).map(|i| &s1[..i]) else {
        return false;
    };
    if prefix1.is_empty() {
        return false;
    }
    let prefix1 = prefix1.strip_prefix(RETURN_SPACE).unwrap_or(prefix1);
    let model2 = ctx.model2();
    info.statements2.iter().any(|&id| {
        let text = model2.text(id);
        text.contains(prefix1) && text.contains(d2.name.as_str())
    })
}

/// First declaration initialized with an array initializer `{...}`.
pub fn declaration_with_array_initializer(
    declarations: &[VariableDeclaration],
) -> Option<&VariableDeclaration> {
    declarations.iter().find(|d| {
        d.initializer_text()
            .is_some_and(|i| i.starts_with('{') && i.ends_with('}'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Statement;
    use crate::replacement::ReplacementType;
    use crate::rules::fixtures::{config, pair};

    fn declaring(text: &str, decls: Vec<VariableDeclaration>) -> Statement {
        let mut s = Statement::new(text);
        s.variable_declarations = decls;
        s
    }

    // -- Renamed declarations --

    #[test]
    fn test_renamed_declaration() {
        let (ctx, a, b) = pair(
            declaring("int x=0;\n", vec![VariableDeclaration::new("x", "int").with_initializer("0")]),
            declaring("int y=0;\n", vec![VariableDeclaration::new("y", "int").with_initializer("0")]),
        );
        let config = config();
        let pair = PairContext::new(&ctx, a, b, &config);
        let mut info = ReplacementInfo::default();
        assert!(identical_variable_declarations_with_different_names(
            "int x=0;\n",
            "int y=0;\n",
            &pair,
            &mut info
        ));
        assert_eq!(info.count_kind(ReplacementType::VariableName), 1);
    }

    #[test]
    fn test_retyped_catch_clause() {
        let (ctx, a, b) = pair(
            declaring("catch(IOException e)", vec![VariableDeclaration::new("e", "IOException")]),
            declaring("catch(Exception ex)", vec![VariableDeclaration::new("ex", "Exception")]),
        );
        let config = config();
        let pair = PairContext::new(&ctx, a, b, &config);
        let mut info = ReplacementInfo::default();
        assert!(identical_variable_declarations_with_different_names(
            "catch(IOException e)",
            "catch(Exception ex)",
            &pair,
            &mut info
        ));
        assert!(info.contains_kind(ReplacementType::Type));
        assert!(info.contains_kind(ReplacementType::VariableName));
    }

    #[test]
    fn test_retyped_catch_declined_with_unmatched_catch() {
        let (mut ctx, a, b) = pair(
            declaring("catch(IOException e)", vec![VariableDeclaration::new("e", "IOException")]),
            declaring("catch(Exception ex)", vec![VariableDeclaration::new("ex", "Exception")]),
        );
        let other = ctx.model1.push(Statement::new("catch(RuntimeException r)"));
        let config = config();
        let pair = PairContext::new(&ctx, a, b, &config);
        let mut info = ReplacementInfo::new("", "", vec![other], vec![]);
        assert!(!identical_variable_declarations_with_different_names(
            "catch(IOException e)",
            "catch(Exception ex)",
            &pair,
            &mut info
        ));
        assert!(info.replacements().is_empty());
    }

    // -- Declaration vs assignment --

    #[test]
    fn test_declaration_vs_assignment() {
        let decl = VariableDeclaration::new("x", "int").with_initializer("compute()");
        let (ctx, a, b) = pair(
            declaring("int x=compute();\n", vec![decl]),
            Statement::new("x=compute();\n"),
        );
        let config = config();
        let pair = PairContext::new(&ctx, a, b, &config);
        let mut info = ReplacementInfo::default();
        assert!(one_is_variable_declaration_the_other_is_variable_assignment(
            "int x=compute();\n",
            "x=compute();\n",
            &pair,
            &mut info
        ));
    }

    #[test]
    fn test_declaration_prefix_too_long() {
        let (ctx, a, b) = pair(
            Statement::new("final static int x=compute();\n"),
            Statement::new("x=compute();\n"),
        );
        let config = config();
        let pair = PairContext::new(&ctx, a, b, &config);
        let mut info = ReplacementInfo::default();
        assert!(!one_is_variable_declaration_the_other_is_variable_assignment(
            "final static int x=compute();\n",
            "x=compute();\n",
            &pair,
            &mut info
        ));
    }

    #[test]
    fn test_declaration_vs_return() {
        let (ctx, a, b) = pair(
            Statement::new("return compute();\n"),
            Statement::new("int x=compute();\n"),
        );
        let config = config();
        let pair = PairContext::new(&ctx, a, b, &config);
        assert!(one_is_variable_declaration_the_other_is_return_statement(
            "return compute();\n",
            "int x=compute();\n",
            &pair
        ));
        assert!(!one_is_variable_declaration_the_other_is_return_statement(
            "return null;\n",
            "x=null;\n",
            &pair
        ));
    }

    // -- Replacements and extraction --

    #[test]
    fn test_identical_after_replacements() {
        let replacements = vec![
            Replacement::new("int", "long", ReplacementKind::Type),
            Replacement::new("a", "b", ReplacementKind::VariableName),
        ];
        assert!(identical_after_variable_and_type_replacements(
            "int a=f(a);\n",
            "long b=f(b);\n",
            &replacements
        ));
        assert!(!identical_after_variable_and_type_replacements(
            "int a=f(a);\n",
            "long b=g(b);\n",
            &replacements
        ));
    }

    #[test]
    fn test_extracted_to_variable() {
        let (mut ctx, a, b) = pair(
            Statement::new("list.add(new Foo(a));\n"),
            declaring("Foo foo=new Foo(a));\n", vec![VariableDeclaration::new("foo", "Foo")]),
        );
        let user = ctx.model2.push(Statement::new("list.add(foo);\n"));
        let config = config();
        let pair = PairContext::new(&ctx, a, b, &config);
        let info = ReplacementInfo::new("", "", vec![], vec![user]);
        assert!(extracted_to_variable(
            "list.add(new Foo(a));\n",
            "Foo foo=new Foo(a));\n",
            &pair,
            &info
        ));
    }

    #[test]
    fn test_array_initializer() {
        let decls = vec![
            VariableDeclaration::new("a", "int"),
            VariableDeclaration::new("b", "int[]").with_initializer("{1, 2}"),
        ];
        assert_eq!(declaration_with_array_initializer(&decls).map(|d| d.name.as_str()), Some("b"));
    }
}
