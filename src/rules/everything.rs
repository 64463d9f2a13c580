//! Rejection checks run after a pair was accepted: the replacements
//! recorded so far rewrite every distinguishing part of the statement, so
//! the two statements are only superficially related.
//!
//! Every check reads the accumulator and never modifies it.

use super::anonymous::contains_method_signature_of_anonymous_class;
use crate::model::{Call, Container, MapperContext, PairContext, Statement, compatible_types};
use crate::replacement::{Direction, Replacement, ReplacementInfo, ReplacementKind, ReplacementType};
use crate::text::{
    ASSIGNMENT, RETURN_SPACE, STATEMENT_TERMINATION, THIS_DOT, camel_case_split,
};

const LAMBDA_ARROW: &str = "->";

/// Statement text cut at the first line break when it declares an
/// anonymous class method.
fn first_line(s: &str) -> &str {
    match s.find('\n') {
        Some(i) if contains_method_signature_of_anonymous_class(s) => &s[..i],
        _ => s,
    }
}

/// `lhs=rhs;` split into its two sides.
fn split_assignment(s: &str) -> Option<(&str, &str)> {
    let body = s.strip_suffix(STATEMENT_TERMINATION)?;
    body.split_once(ASSIGNMENT)
}

fn returned_expression(s: &str) -> Option<&str> {
    s.strip_prefix(RETURN_SPACE)?.strip_suffix(STATEMENT_TERMINATION)
}

// ---------------------------------------------------------------------------
// Calls
// ---------------------------------------------------------------------------

/// Same method on both sides, with both the receiver and every argument
/// replaced by a lambda on one side only.
pub fn invocation_with_everything_replaced(ctx: &PairContext<'_>, info: &ReplacementInfo) -> bool {
    let (Some(call1), Some(call2)) = (
        ctx.fragment1().invocation_covering_entire_fragment(),
        ctx.fragment2().invocation_covering_entire_fragment(),
    ) else {
        return false;
    };
    let (Some(expression1), Some(expression2)) = (&call1.receiver, &call2.receiver) else {
        return false;
    };
    if !call1.identical_name(call2) {
        return false;
    }
    let min_arguments = call1.arguments.len().min(call2.arguments.len());
    let mut replaced_arguments = 0;
    let mut expression_replaced = false;
    for r in info.replacements() {
        if r.before.contains(LAMBDA_ARROW) == r.after.contains(LAMBDA_ARROW) {
            continue;
        }
        if call1.arguments.contains(&r.before) && call2.arguments.contains(&r.after) {
            replaced_arguments += 1;
        }
        if expression1 == &r.before && expression2 == &r.after {
            expression_replaced = true;
        }
    }
    min_arguments > 0 && replaced_arguments == min_arguments && expression_replaced
}

/// Two `this(...)` calls whose replaced arguments outnumber the shared ones.
pub fn this_constructor_call_with_everything_replaced(ctx: &PairContext<'_>, info: &ReplacementInfo) -> bool {
    let (Some(call1), Some(call2)) = (
        ctx.fragment1().invocation_covering_entire_fragment(),
        ctx.fragment2().invocation_covering_entire_fragment(),
    ) else {
        return false;
    };
    if call1.name != "this" || call2.name != "this" {
        return false;
    }
    let shared = call1.argument_intersection(call2).len();
    let min_arguments = call1.arguments.len().min(call2.arguments.len());
    let replaced_arguments = info
        .replacements()
        .iter()
        .filter(|r| call1.arguments.contains(&r.before) && call2.arguments.contains(&r.after))
        .count();
    replaced_arguments == min_arguments || replaced_arguments > shared
}

// ---------------------------------------------------------------------------
// Object creations
// ---------------------------------------------------------------------------

fn creation_of<'a>(statement: &'a Statement, text: &str) -> Option<&'a Call> {
    statement.creations().filter(|c| c.string() == text).last()
}

/// An assignment of a new object turned into a return of an unrelated new
/// object, or the reverse, with the type, the creation and every argument
/// replaced.
pub fn class_instance_creation_with_everything_replaced(ctx: &PairContext<'_>, info: &ReplacementInfo) -> bool {
    let statement1 = ctx.fragment1();
    let statement2 = ctx.fragment2();
    let string1 = first_line(&statement1.text);
    let string2 = first_line(&statement2.text);
    let terminated = string1.ends_with(STATEMENT_TERMINATION) && string2.ends_with(STATEMENT_TERMINATION);
    if !terminated {
        return false;
    }
    let sides = if string1.contains(ASSIGNMENT) && string2.starts_with(RETURN_SPACE) {
        split_assignment(string1).map(|(_, rhs)| rhs).zip(returned_expression(string2))
    } else if string1.starts_with(RETURN_SPACE) && string2.contains(ASSIGNMENT) {
        returned_expression(string1).zip(split_assignment(string2).map(|(_, rhs)| rhs))
    } else {
        None
    };
    let Some((assignment1, assignment2)) = sides else {
        return false;
    };

    let creation1 = creation_of(statement1, assignment1);
    let creation2 = creation_of(statement2, assignment2);
    // argument of side 2 bound to a parameter: argument text -> parameter
    let argument_to_parameter: Vec<(&str, &str)> = creation2
        .map(|c| {
            c.arguments
                .iter()
                .filter_map(|a| {
                    ctx.mapper
                        .parameter_to_argument
                        .get(a)
                        .map(|bound| (bound.as_str(), a.as_str()))
                })
                .collect()
        })
        .unwrap_or_default();
    let (compatible, min_arguments) = match (creation1, creation2) {
        (Some(c1), Some(c2)) => (
            c1.created_type()
                .zip(c2.created_type())
                .is_some_and(|(t1, t2)| compatible_types(t1, t2)),
            c1.arguments.len().min(c2.arguments.len()),
        ),
        _ => (false, 0),
    };

    let mut type_replaced = false;
    let mut creation_replaced = false;
    let mut replaced_arguments = 0;
    for r in info.replacements() {
        if r.is(ReplacementType::Type) {
            type_replaced = true;
            if string1.contains(&format!("new {}(", r.before)) && string2.contains(&format!("new {}(", r.after)) {
                creation_replaced = true;
            }
        } else if let (Some(c1), Some(c2)) = (creation1, creation2)
            && c1.arguments.contains(&r.before)
            && (c2.arguments.contains(&r.after)
                || argument_to_parameter
                    .iter()
                    .any(|&(bound, parameter)| bound == r.after && c2.arguments.iter().any(|a| a == parameter)))
        {
            replaced_arguments += 1;
        } else if r.is(ReplacementType::ClassInstanceCreation) && r.before == assignment1 && r.after == assignment2 {
            creation_replaced = true;
        }
    }
    type_replaced && !compatible && replaced_arguments == min_arguments && creation_replaced
}

// ---------------------------------------------------------------------------
// Assignments
// ---------------------------------------------------------------------------

/// `replacement` renames the assigned variable `name1` to `name2`.
fn renames_target(r: &Replacement, name1: &str, name2: &str) -> bool {
    let names = |name: &str, replaced: &str| {
        name == replaced || name.ends_with(&format!(" {replaced}")) || name == format!("{THIS_DOT}{replaced}")
    };
    (r.is(ReplacementType::VariableName) || r.is(ReplacementType::VariableReplacedWithArrayAccess))
        && names(name1, &r.before)
        && names(name2, &r.after)
        && name1 != format!("{THIS_DOT}{name2}")
        && name2 != format!("{THIS_DOT}{name1}")
}

/// The mapper is not comparing against extracted method calls, or its
/// parent compares operations with different signatures.
fn zero_calls_to_extracted_methods_or_parent_mapper(mapper: &MapperContext) -> bool {
    mapper.calls_to_extracted_methods == 0
        || (mapper.has_parent_mapper && mapper.parent_signatures_differ)
}

/// The replaced variable and the parameter referenced by the other side
/// sit at the same position with the same type in both signatures.
///
/// `variable_before` tells which side of `r` holds the variable.
fn referenced_parameter(r: &Replacement, variable_before: bool, container1: &Container, container2: &Container) -> bool {
    let position = |container: &Container, matches: &dyn Fn(&str) -> bool| {
        container
            .parameters
            .iter()
            .enumerate()
            .filter(|(_, p)| matches(&p.name))
            .last()
            .map(|(i, p)| (i, p.type_name.clone()))
    };
    let (found1, found2) = if variable_before {
        (
            position(container1, &|name| name == r.before),
            position(container2, &|name| r.after.contains(name)),
        )
    } else {
        (
            position(container1, &|name| r.before.contains(name)),
            position(container2, &|name| name == r.after),
        )
    };
    match (found1, found2) {
        (Some((i1, Some(t1))), Some((i2, Some(t2)))) => i1 == i2 && t1 == t2,
        _ => false,
    }
}

/// Field of the enclosing class assigned from a constructor parameter.
fn field_initialized_with_parameter(
    variable: &str,
    assignment: &str,
    attributes: &[String],
    container: &Container,
) -> bool {
    attributes.iter().any(|a| variable == a || variable == format!("{THIS_DOT}{a}"))
        && container
            .parameter_names()
            .any(|p| assignment == p || assignment.contains(&format!("{p}.")))
}

/// The assigned variable and the assigned value were both replaced.
///
/// Accepts a rename combined with an unrelated new object, with an
/// unrelated right-hand side (when the two names share few camel-case
/// words), with unrelated invocations, or with a switch between a field
/// initialized from a parameter and one that is not.
pub fn variable_assignment_with_everything_replaced(ctx: &PairContext<'_>, info: &ReplacementInfo) -> bool {
    let statement1 = ctx.fragment1();
    let statement2 = ctx.fragment2();
    let anonymous1 = contains_method_signature_of_anonymous_class(&statement1.text);
    let anonymous2 = contains_method_signature_of_anonymous_class(&statement2.text);
    let string1 = first_line(&statement1.text);
    let string2 = first_line(&statement2.text);

    if let (Some((name1, assignment1)), Some((name2, assignment2))) =
        (split_assignment(string1), split_assignment(string2))
    {
        return assignment_with_everything_replaced(ctx, info, (name1, assignment1), (name2, assignment2));
    }

    // one side declares an anonymous class: compare the full texts
    if anonymous1 != anonymous2 && string1.contains(ASSIGNMENT) && string2.contains(ASSIGNMENT) {
        let (Some(index1), Some(index2)) = (string1.find(ASSIGNMENT), string2.find(ASSIGNMENT)) else {
            return false;
        };
        let (name1, name2) = (&string1[..index1], &string2[..index2]);
        let (Some((_, assignment1)), Some((_, assignment2))) =
            (split_assignment(&statement1.text), split_assignment(&statement2.text))
        else {
            return false;
        };
        let mut renamed = false;
        let mut rhs_replaced = false;
        for r in info.replacements() {
            if renames_target(r, name1, name2) {
                renamed = true;
            } else if r.before == assignment1 && r.after == assignment2 {
                rhs_replaced = true;
            }
        }
        return renamed && rhs_replaced;
    }
    false
}

fn assignment_with_everything_replaced(
    ctx: &PairContext<'_>,
    info: &ReplacementInfo,
    (name1, assignment1): (&str, &str),
    (name2, assignment2): (&str, &str),
) -> bool {
    let statement1 = ctx.fragment1();
    let statement2 = ctx.fragment2();
    let container1 = &ctx.model1().container;
    let container2 = &ctx.model2().container;
    let string1 = first_line(&statement1.text);
    let string2 = first_line(&statement2.text);

    let (field_init1, field_init2) = match &ctx.mapper.class_diff {
        Some(diff) if container1.is_constructor && container2.is_constructor => (
            field_initialized_with_parameter(name1, assignment1, &diff.original_attributes, container1),
            field_initialized_with_parameter(name2, assignment2, &diff.next_attributes, container2),
        ),
        _ => (false, false),
    };

    let creation1 = creation_of(statement1, assignment1);
    let creation2 = creation_of(statement2, assignment2);
    let compatible = creation1
        .and_then(Call::created_type)
        .zip(creation2.and_then(Call::created_type))
        .is_some_and(|(t1, t2)| compatible_types(t1, t2));
    let invocation1 = statement1
        .method_invocations()
        .filter(|c| c.string() == assignment1)
        .last()
        .or(creation1);
    let invocation2 = statement2
        .method_invocations()
        .filter(|c| c.string() == assignment2)
        .last()
        .or(creation2);

    let mut type_replaced = false;
    let mut creation_replaced = false;
    let mut renamed = false;
    let mut rhs_replaced = false;
    for r in info.replacements() {
        let replaces_rhs = r.before == assignment1 && r.after == assignment2;
        if r.is(ReplacementType::Type) {
            type_replaced = true;
            if string1.contains(&format!("new {}(", r.before)) && string2.contains(&format!("new {}(", r.after)) {
                creation_replaced = true;
            }
        } else if renames_target(r, name1, name2) {
            renamed = true;
        } else if r.is(ReplacementType::VariableName)
            && replaces_rhs
            && !container1.is_constructor
            && !container2.is_constructor
            && container1.name != container2.name
            && zero_calls_to_extracted_methods_or_parent_mapper(ctx.mapper)
        {
            rhs_replaced = true;
        } else if r.is(ReplacementType::VariableReplacedWithNullLiteral) && replaces_rhs {
            rhs_replaced = true;
        } else if r.is(ReplacementType::VariableReplacedWithClassInstanceCreation) && replaces_rhs {
            let variable_before = r.after.contains("new ");
            if (variable_before || r.before.contains("new "))
                && referenced_parameter(r, variable_before, container1, container2)
            {
                continue;
            }
            rhs_replaced = true;
        } else if let ReplacementKind::VariableReplacedWithMethodInvocation { direction, .. } = &r.kind
            && replaces_rhs
        {
            if !assignment1.starts_with(assignment2)
                && !assignment2.starts_with(assignment1)
                && !referenced_parameter(r, *direction == Direction::VariableToInvocation, container1, container2)
            {
                rhs_replaced = true;
            }
        } else if r.is(ReplacementType::ClassInstanceCreation) && replaces_rhs {
            creation_replaced = true;
        }
    }

    let equal_arguments = match (invocation1, invocation2) {
        (Some(i1), Some(i2)) => i1.equal_arguments(i2) && !i1.arguments.is_empty(),
        _ => false,
    };
    if type_replaced && !compatible && renamed && creation_replaced && !equal_arguments {
        return true;
    }
    if renamed && rhs_replaced {
        let tokens1 = camel_case_split(name1);
        let tokens2 = camel_case_split(name2);
        let common: usize = tokens1
            .iter()
            .map(|t1| tokens2.iter().filter(|t2| *t2 == t1).count())
            .sum();
        if (common as f64) < tokens1.len().max(tokens2.len()) as f64 / 2.0 {
            return true;
        }
    }
    if let (true, Some(i1), Some(i2)) = (renamed, invocation1, invocation2)
        && i1.different_expression_name_and_arguments(i2)
    {
        // an argument that is itself a call related to the other side
        // keeps the pair
        let related = if i1.arguments.len() > i2.arguments.len() {
            i1.arguments.iter().any(|argument| {
                statement1
                    .method_invocations()
                    .any(|c| c.string() == argument.as_str() && !c.different_expression_name_and_arguments(i2))
            })
        } else if i1.arguments.len() < i2.arguments.len() {
            i2.arguments.iter().any(|argument| {
                statement2
                    .method_invocations()
                    .any(|c| c.string() == argument.as_str() && !i1.different_expression_name_and_arguments(c))
            })
        } else {
            false
        };
        return !related;
    }
    renamed && field_init1 != field_init2 && invocation2.is_none()
}

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

/// Single declarations on both sides with the type, the name and the
/// initializer all replaced.
pub fn variable_declarations_with_everything_replaced(ctx: &PairContext<'_>, info: &ReplacementInfo) -> bool {
    let ([declaration1], [declaration2]) = (
        ctx.fragment1().variable_declarations.as_slice(),
        ctx.fragment2().variable_declarations.as_slice(),
    ) else {
        return false;
    };
    let initializer1 = declaration1.initializer.as_ref();
    let initializer2 = declaration2.initializer.as_ref();
    let mut null_initializer = false;
    let mut zero_argument_creation = false;
    let mut creation_argument_replaced = false;
    let mut initializer_replaced = false;
    match (initializer1, initializer2) {
        (None, None) => null_initializer = true,
        (Some(i1), Some(i2)) => {
            null_initializer = i1.text == "null" || i2.text == "null";
            let creations1: Vec<&Call> = i1.creations().collect();
            let creations2: Vec<&Call> = i2.creations().collect();
            if let ([c1], [c2]) = (creations1.as_slice(), creations2.as_slice()) {
                match (c1.arguments.as_slice(), c2.arguments.as_slice()) {
                    ([], []) => zero_argument_creation = true,
                    ([a1], [a2]) => {
                        creation_argument_replaced =
                            info.replacements().iter().any(|r| &r.before == a1 && &r.after == a2);
                    }
                    _ => {}
                }
            }
            if i1.covering_invocation().is_some()
                && i2.covering_invocation().is_some()
                && i1.is_cast_invocation() != i2.is_cast_invocation()
            {
                initializer_replaced = true;
            }
        }
        _ => {}
    }

    let mut type_replaced = false;
    let mut renamed = false;
    for r in info.replacements() {
        if r.is(ReplacementType::Type)
            && declaration1.type_name.as_deref() == Some(r.before.as_str())
            && declaration2.type_name.as_deref() == Some(r.after.as_str())
        {
            type_replaced = true;
        } else if r.is(ReplacementType::VariableName) && declaration1.name == r.before && declaration2.name == r.after {
            renamed = true;
        } else if initializer1.is_some_and(|i| i.text == r.before) && initializer2.is_some_and(|i| i.text == r.after) {
            initializer_replaced = true;
        }
    }
    type_replaced
        && !declaration1.compatible_type(declaration2)
        && renamed
        && (initializer_replaced || null_initializer || zero_argument_creation || creation_argument_replaced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassDiff, Initializer, VariableDeclaration};
    use crate::rules::fixtures::{config, pair};

    fn with_calls(text: &str, calls: Vec<Call>) -> Statement {
        let mut s = Statement::new(text);
        s.calls = calls;
        s
    }

    #[test]
    fn test_invocation_replacements_must_involve_lambda() {
        let (ctx, a, b) = pair(
            with_calls("items.forEach(x -> x.run());\n", vec![Call::invocation(Some("items"), "forEach", &["x -> x.run()"])]),
            with_calls("other.forEach(handler);\n", vec![Call::invocation(Some("other"), "forEach", &["handler"])]),
        );
        let config = config();
        let pair = PairContext::new(&ctx, a, b, &config);
        let mut info = ReplacementInfo::default();
        info.add(Replacement::new("x -> x.run()", "handler", ReplacementKind::VariableName));
        assert!(!invocation_with_everything_replaced(&pair, &info));
        info.add(Replacement::new("items", "other", ReplacementKind::VariableName));
        assert!(!invocation_with_everything_replaced(&pair, &info));
    }

    #[test]
    fn test_this_constructor_call() {
        let (ctx, a, b) = pair(
            with_calls("this(a,b);\n", vec![Call::invocation(None, "this", &["a", "b"])]),
            with_calls("this(c,d);\n", vec![Call::invocation(None, "this", &["c", "d"])]),
        );
        let config = config();
        let pair = PairContext::new(&ctx, a, b, &config);
        let mut info = ReplacementInfo::default();
        info.add(Replacement::new("a", "c", ReplacementKind::VariableName));
        assert!(this_constructor_call_with_everything_replaced(&pair, &info));
    }

    #[test]
    fn test_this_constructor_call_keeps_shared_arguments() {
        let (ctx, a, b) = pair(
            with_calls("this(a,b,c);\n", vec![Call::invocation(None, "this", &["a", "b", "c"])]),
            with_calls("this(a,b,d);\n", vec![Call::invocation(None, "this", &["a", "b", "d"])]),
        );
        let config = config();
        let pair = PairContext::new(&ctx, a, b, &config);
        let mut info = ReplacementInfo::default();
        info.add(Replacement::new("c", "d", ReplacementKind::VariableName));
        assert!(!this_constructor_call_with_everything_replaced(&pair, &info));
    }

    #[test]
    fn test_assignment_turned_into_unrelated_return() {
        let (ctx, a, b) = pair(
            with_calls("list=new ArrayList(size);\n", vec![Call::creation("ArrayList", &["size"])]),
            with_calls("return new Point(x);\n", vec![Call::creation("Point", &["x"])]),
        );
        let config = config();
        let pair = PairContext::new(&ctx, a, b, &config);
        let mut info = ReplacementInfo::default();
        info.add(Replacement::new("ArrayList", "Point", ReplacementKind::Type));
        info.add(Replacement::new("size", "x", ReplacementKind::VariableName));
        assert!(class_instance_creation_with_everything_replaced(&pair, &info));
    }

    #[test]
    fn test_assignment_with_compatible_creation_kept() {
        let (ctx, a, b) = pair(
            with_calls("list=new ArrayList(size);\n", vec![Call::creation("ArrayList", &["size"])]),
            with_calls("return new ArrayList(n);\n", vec![Call::creation("ArrayList", &["n"])]),
        );
        let config = config();
        let pair = PairContext::new(&ctx, a, b, &config);
        let mut info = ReplacementInfo::default();
        info.add(Replacement::new("size", "n", ReplacementKind::VariableName));
        assert!(!class_instance_creation_with_everything_replaced(&pair, &info));
    }

    #[test]
    fn test_rename_with_unrelated_right_hand_side() {
        let (ctx, a, b) = pair(
            with_calls("count=x;\n", vec![]),
            with_calls("label=y;\n", vec![]),
        );
        let mut ctx = ctx;
        ctx.model1.container.name = "before".into();
        ctx.model2.container.name = "after".into();
        let config = config();
        let pair = PairContext::new(&ctx, a, b, &config);
        let mut info = ReplacementInfo::default();
        info.add(Replacement::new("count", "label", ReplacementKind::VariableName));
        assert!(!variable_assignment_with_everything_replaced(&pair, &info));
        info.add(Replacement::new("x", "y", ReplacementKind::VariableName));
        assert!(variable_assignment_with_everything_replaced(&pair, &info));
    }

    #[test]
    fn test_rename_with_similar_names_kept() {
        let (mut ctx, a, b) = pair(
            with_calls("userName=x;\n", vec![]),
            with_calls("userFullName=y;\n", vec![]),
        );
        ctx.model1.container.name = "before".into();
        ctx.model2.container.name = "after".into();
        let config = config();
        let pair = PairContext::new(&ctx, a, b, &config);
        let mut info = ReplacementInfo::default();
        info.add(Replacement::new("userName", "userFullName", ReplacementKind::VariableName));
        info.add(Replacement::new("x", "y", ReplacementKind::VariableName));
        assert!(!variable_assignment_with_everything_replaced(&pair, &info));
    }

    #[test]
    fn test_field_initialization_switch() {
        let (mut ctx, a, b) = pair(
            with_calls("this.name=name;\n", vec![]),
            with_calls("this.title=DEFAULT;\n", vec![]),
        );
        ctx.model1.container.is_constructor = true;
        ctx.model1.container.parameters.push(VariableDeclaration::new("name", "String"));
        ctx.model2.container.is_constructor = true;
        ctx.class_diff = Some(ClassDiff {
            original_attributes: vec!["name".into()],
            next_attributes: vec!["title".into()],
            ..ClassDiff::default()
        });
        let config = config();
        let pair = PairContext::new(&ctx, a, b, &config);
        let mut info = ReplacementInfo::default();
        info.add(Replacement::new("name", "title", ReplacementKind::VariableName));
        assert!(variable_assignment_with_everything_replaced(&pair, &info));
    }

    #[test]
    fn test_declaration_with_everything_replaced() {
        let mut s1 = Statement::new("List items=null;\n");
        s1.variable_declarations.push(VariableDeclaration::new("items", "List").with_initializer("null"));
        let mut s2 = Statement::new("Map index=null;\n");
        s2.variable_declarations.push(VariableDeclaration::new("index", "Map").with_initializer("null"));
        let (ctx, a, b) = pair(s1, s2);
        let config = config();
        let pair = PairContext::new(&ctx, a, b, &config);
        let mut info = ReplacementInfo::default();
        info.add(Replacement::new("List", "Map", ReplacementKind::Type));
        assert!(!variable_declarations_with_everything_replaced(&pair, &info));
        info.add(Replacement::new("items", "index", ReplacementKind::VariableName));
        assert!(variable_declarations_with_everything_replaced(&pair, &info));
    }

    #[test]
    fn test_declaration_creation_argument_replaced() {
        let mut init1 = Initializer::new("new Foo(a)");
        init1.calls.push(Call::creation("Foo", &["a"]));
        let mut init2 = Initializer::new("new Bar(b)");
        init2.calls.push(Call::creation("Bar", &["b"]));
        let mut d1 = VariableDeclaration::new("foo", "Foo");
        d1.initializer = Some(init1);
        let mut d2 = VariableDeclaration::new("bar", "Bar");
        d2.initializer = Some(init2);
        let mut s1 = Statement::new("Foo foo=new Foo(a);\n");
        s1.variable_declarations.push(d1);
        let mut s2 = Statement::new("Bar bar=new Bar(b);\n");
        s2.variable_declarations.push(d2);
        let (ctx, a, b) = pair(s1, s2);
        let config = config();
        let pair = PairContext::new(&ctx, a, b, &config);
        let mut info = ReplacementInfo::default();
        info.add(Replacement::new("Foo", "Bar", ReplacementKind::Type));
        info.add(Replacement::new("foo", "bar", ReplacementKind::VariableName));
        info.add(Replacement::new("a", "b", ReplacementKind::VariableName));
        assert!(variable_declarations_with_everything_replaced(&pair, &info));
    }
}
