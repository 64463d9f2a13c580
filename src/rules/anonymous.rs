//! Anonymous class bodies inside statements.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::HeuristicsConfig;
use crate::model::{AnonymousClass, CodeModel, StatementId};
use crate::text::STATEMENT_TERMINATION;

static METHOD_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(public|protected|private|static|\s) +[\w<>\[\]]+\s+(\w+) *\([^)]*\) *(\{?|[^;])$")
        .expect("invalid regex")
});

static SPACED_FINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*final").expect("invalid regex"));

const LAMBDA_ARROW: &str = "->";

/// Strip leading annotations and a `throws` clause from a source line.
fn prepare_line(line: &str) -> &str {
    let mut line = line.trim();
    for annotation in ["@Nullable", "@Override"] {
        if let Some(rest) = line.strip_prefix(annotation) {
            line = rest.trim();
        }
    }
    if let Some(i) = line.find("throws ") {
        line = &line[..i];
    }
    line
}

/// `s` holds a lambda spanning a statement, or a line that reads like a
/// method declaration of an anonymous class.
pub fn contains_method_signature_of_anonymous_class(s: &str) -> bool {
    let mut lines: Vec<&str> = s.split('\n').collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    if s.contains(LAMBDA_ARROW)
        && (lines.len() > 1 || (lines.len() == 1 && s.ends_with(STATEMENT_TERMINATION)))
    {
        return true;
    }
    lines
        .iter()
        .any(|line| METHOD_SIGNATURE.is_match(prepare_line(line)))
}

/// Text of statement `id` up to where `anonymous` starts, or the creation
/// expression that declares it.
///
/// When `anonymous` belongs to a lambda body or an anonymous class method
/// nested in the statement, the search descends into that nested statement,
/// at most `config.anonymous_search_depth` levels deep.
pub fn statement_without_anonymous(
    model: &CodeModel,
    id: StatementId,
    anonymous: &AnonymousClass,
    config: &HeuristicsConfig,
) -> Option<String> {
    without_anonymous(model, id, anonymous, config.anonymous_search_depth)
}

fn without_anonymous(
    model: &CodeModel,
    id: StatementId,
    anonymous: &AnonymousClass,
    max_depth: usize,
) -> Option<String> {
    let statement = model.get(id)?;
    if let Some(index) = statement.text.find(&anonymous.text) {
        return Some(statement.text[..index].to_owned());
    }
    if max_depth > 0 {
        for &nested in &statement.nested {
            let leaves = match model.get(nested) {
                Some(s) if s.is_leaf() => vec![nested],
                Some(_) => model.leaves(nested),
                None => continue,
            };
            for leaf in leaves {
                let declares = model.get(leaf).is_some_and(|l| {
                    l.anonymous_classes.iter().any(|a| {
                        a.location == anonymous.location || a.location.subsumes(&anonymous.location)
                    })
                });
                if !declares {
                    continue;
                }
                if let Some(found) = without_anonymous(model, leaf, anonymous, max_depth - 1) {
                    return Some(found);
                }
            }
        }
    }
    if let Some(creation) = statement
        .creations()
        .find(|c| c.anonymous_body() == Some(anonymous.text.as_str()))
    {
        return Some(creation.actual_string());
    }
    // a second anonymous class in the argument list: cut before its first
    // method declaration
    let position = statement.anonymous_classes.iter().position(|a| a == anonymous)?;
    if position == 0 {
        return None;
    }
    let method_declaration = anonymous.text.lines().nth(1)?.trim();
    let method_declaration = SPACED_FINAL.replace_all(method_declaration, "final");
    let index = statement.text.find(method_declaration.as_ref())?;
    statement.text.get(..index.checked_sub(2)?).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Call, Location, Shape, Statement};

    #[test]
    fn test_method_signature_detection() {
        assert!(contains_method_signature_of_anonymous_class(
            "new Runnable(){\n public void run() {\n"
        ));
        assert!(contains_method_signature_of_anonymous_class("@Override\npublic int size()"));
        assert!(contains_method_signature_of_anonymous_class("x -> x.close();\n"));
        assert!(!contains_method_signature_of_anonymous_class("p1,p2"));
        assert!(!contains_method_signature_of_anonymous_class("foo(a, b);\n"));
    }

    #[test]
    fn test_prepare_line() {
        assert_eq!(prepare_line("  @Override public void run() throws IOException"), "public void run() ");
    }

    #[test]
    fn test_cut_at_anonymous_body() {
        let body = "{\n public void run() {\n }\n}";
        let mut model = CodeModel::default();
        let id = model.push(Statement::new(format!("executor.submit(new Runnable(){body});\n")));
        let anonymous = AnonymousClass {
            text: body.to_owned(),
            location: Location::new(3, 5, 40, 80),
        };
        assert_eq!(
            statement_without_anonymous(&model, id, &anonymous, &HeuristicsConfig::default()).as_deref(),
            Some("executor.submit(new Runnable()")
        );
    }

    #[test]
    fn test_creation_fallback() {
        let body = "{ int size() { return 0; } }";
        let mut creation = Call::creation("Sized", &[]);
        if let crate::model::CallKind::ObjectCreation { anonymous_body, .. } = &mut creation.kind {
            *anonymous_body = Some(body.to_owned());
        }
        let mut model = CodeModel::default();
        let mut statement = Statement::new("use(new Sized(){...});\n");
        statement.calls.push(creation);
        let id = model.push(statement);
        let anonymous = AnonymousClass {
            text: body.to_owned(),
            location: Location::new(1, 1, 4, 30),
        };
        assert_eq!(
            statement_without_anonymous(&model, id, &anonymous, &HeuristicsConfig::default()).as_deref(),
            Some("new Sized()")
        );
    }

    #[test]
    fn test_nested_lambda_body() {
        let inner_body = "{ void run() {} }";
        let location = Location::new(2, 2, 30, 50);
        let mut model = CodeModel::default();
        let outer = model.push(Statement::new("list.forEach(x -> { ... });\n"));
        let lambda_block = model.push(Statement {
            shape: Shape::Composite {
                children: vec![],
                expressions: vec![],
            },
            ..Statement::new("{")
        });
        let mut leaf = Statement::new(format!("pool.add(new Task(){inner_body});\n"));
        leaf.parent = Some(lambda_block);
        leaf.anonymous_classes.push(AnonymousClass {
            text: inner_body.to_owned(),
            location,
        });
        model.push(leaf);
        model.statements[outer.0].nested.push(lambda_block);
        let anonymous = AnonymousClass {
            text: inner_body.to_owned(),
            location,
        };
        assert_eq!(
            statement_without_anonymous(&model, outer, &anonymous, &HeuristicsConfig::default()).as_deref(),
            Some("pool.add(new Task()")
        );
        let shallow = HeuristicsConfig {
            anonymous_search_depth: 0,
            ..HeuristicsConfig::default()
        };
        assert_eq!(statement_without_anonymous(&model, outer, &anonymous, &shallow), None);
    }
}
