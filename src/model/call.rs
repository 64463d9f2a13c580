//! Method invocations and object creations.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::text::camel_case_split;

/// The two call shapes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallKind {
    #[default]
    MethodInvocation,
    ObjectCreation {
        type_name: String,
        #[serde(default)]
        array: bool,
        /// Body text of an anonymous class created by this call.
        #[serde(default)]
        anonymous_body: Option<String>,
    },
}

/// A method invocation or object creation found in a statement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Call {
    pub kind: CallKind,
    pub receiver: Option<String>,
    pub name: String,
    pub arguments: Vec<String>,
    /// The call exactly as it appears in the statement text. Derived from
    /// the parts when absent.
    pub text: Option<String>,
}

impl Call {
    pub fn invocation(receiver: Option<&str>, name: &str, arguments: &[&str]) -> Self {
        Self {
            kind: CallKind::MethodInvocation,
            receiver: receiver.map(str::to_owned),
            name: name.to_owned(),
            arguments: arguments.iter().map(|&a| a.to_owned()).collect(),
            text: None,
        }
    }

    pub fn creation(type_name: &str, arguments: &[&str]) -> Self {
        Self {
            kind: CallKind::ObjectCreation {
                type_name: type_name.to_owned(),
                array: false,
                anonymous_body: None,
            },
            receiver: None,
            name: type_name.to_owned(),
            arguments: arguments.iter().map(|&a| a.to_owned()).collect(),
            text: None,
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub const fn is_creation(&self) -> bool {
        matches!(self.kind, CallKind::ObjectCreation { .. })
    }

    pub const fn is_array_creation(&self) -> bool {
        matches!(self.kind, CallKind::ObjectCreation { array: true, .. })
    }

    pub fn created_type(&self) -> Option<&str> {
        match &self.kind {
            CallKind::ObjectCreation { type_name, .. } => Some(type_name),
            CallKind::MethodInvocation => None,
        }
    }

    pub fn anonymous_body(&self) -> Option<&str> {
        match &self.kind {
            CallKind::ObjectCreation { anonymous_body, .. } => anonymous_body.as_deref(),
            CallKind::MethodInvocation => None,
        }
    }

    /// The canonical `receiver.name(a,b)` / `new T(a,b)` form.
    pub fn actual_string(&self) -> String {
        let mut sb = String::new();
        match &self.kind {
            CallKind::MethodInvocation => {
                if let Some(receiver) = &self.receiver {
                    sb.push_str(receiver);
                    sb.push('.');
                }
                sb.push_str(&self.name);
            }
            CallKind::ObjectCreation { type_name, .. } => {
                sb.push_str("new ");
                sb.push_str(type_name);
            }
        }
        sb.push('(');
        sb.push_str(&self.arguments.join(","));
        sb.push(')');
        sb
    }

    /// The call as it appears in its statement.
    pub fn string(&self) -> Cow<'_, str> {
        self.text
            .as_deref()
            .map_or_else(|| Cow::Owned(self.actual_string()), Cow::Borrowed)
    }

    pub fn identical_name(&self, other: &Self) -> bool {
        self.name == other.name
    }

    fn one_name_contains_the_other(&self, other: &Self) -> bool {
        self.name.contains(&other.name) || other.name.contains(&self.name)
    }

    /// Names are equal or share all camel-case words of the shorter one.
    pub fn compatible_name(&self, other: &Self) -> bool {
        if self.identical_name(other) {
            return true;
        }
        let tokens1 = camel_case_split(&self.name);
        let tokens2 = camel_case_split(&other.name);
        let common = tokens1
            .iter()
            .map(|t1| tokens2.iter().filter(|t2| *t2 == t1).count())
            .sum::<usize>();
        common == tokens1.len().min(tokens2.len())
    }

    /// Arguments present on both sides, compared on their first line.
    pub fn argument_intersection(&self, other: &Self) -> Vec<String> {
        let first_line = |a: &String| a.lines().next().unwrap_or("").to_owned();
        let args2: Vec<String> = other.arguments.iter().map(first_line).collect();
        let mut out: Vec<String> = Vec::new();
        for arg in self.arguments.iter().map(first_line) {
            if args2.contains(&arg) && !out.contains(&arg) {
                out.push(arg);
            }
        }
        out
    }

    pub fn equal_arguments(&self, other: &Self) -> bool {
        self.arguments == other.arguments
    }

    pub fn identical_expression(&self, other: &Self) -> bool {
        self.receiver == other.receiver
    }

    /// Receiver, name and arguments all differ, with no argument shared and
    /// no argument of one call appearing in the other's receiver.
    pub fn different_expression_name_and_arguments(&self, other: &Self) -> bool {
        let different_expression = match (&self.receiver, &other.receiver) {
            (None, None) => false,
            (Some(a), Some(b)) => a != b && !a.starts_with(b.as_str()) && !b.starts_with(a.as_str()),
            _ => true,
        };
        let different_name = self.name != other.name;
        let shared_argument = self.arguments.iter().any(|a| other.arguments.contains(a));
        let argument_in_expression = self
            .receiver
            .as_ref()
            .is_some_and(|r| other.arguments.iter().any(|a| r.contains(a.as_str())))
            || other
                .receiver
                .as_ref()
                .is_some_and(|r| self.arguments.iter().any(|a| r.contains(a.as_str())));
        let different_arguments =
            self.arguments != other.arguments && !shared_argument && !argument_in_expression;
        different_expression && different_name && different_arguments
    }

    /// `a.f(b, c)` vs `b.f(a, c)`: the receiver moved into the argument list
    /// at the same position and every other argument is kept.
    pub fn identical_with_expression_argument_swap(&self, other: &Self) -> bool {
        let (Some(r1), Some(r2)) = (&self.receiver, &other.receiver) else {
            return false;
        };
        if !(self.identical_name(other) || self.one_name_contains_the_other(other)) {
            return false;
        }
        let index1 = self.arguments.iter().position(|a| a == r2);
        let index2 = other.arguments.iter().position(|a| a == r1);
        match (index1, index2) {
            (Some(i1), Some(i2)) if i1 == i2 => {
                let shared = self.argument_intersection(other).len();
                shared + 1 == self.arguments.len() && shared + 1 == other.arguments.len()
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actual_string() {
        let call = Call::invocation(Some("list"), "add", &["a", "b"]);
        assert_eq!(call.actual_string(), "list.add(a,b)");
        let creation = Call::creation("Foo", &["x"]);
        assert_eq!(creation.actual_string(), "new Foo(x)");
        let spaced = Call::invocation(None, "f", &["x", "y"]).with_text("f(x, y)");
        assert_eq!(spaced.string(), "f(x, y)");
    }

    #[test]
    fn test_compatible_name() {
        let a = Call::invocation(None, "getName", &[]);
        let b = Call::invocation(None, "getFullName", &[]);
        let c = Call::invocation(None, "size", &[]);
        assert!(a.compatible_name(&b));
        assert!(!a.compatible_name(&c));
    }

    #[test]
    fn test_different_expression_name_and_arguments() {
        let a = Call::invocation(Some("x"), "foo", &["1"]);
        let b = Call::invocation(Some("y"), "bar", &["2"]);
        assert!(a.different_expression_name_and_arguments(&b));
        let c = Call::invocation(Some("y"), "bar", &["1"]);
        assert!(!a.different_expression_name_and_arguments(&c));
    }

    #[test]
    fn test_expression_argument_swap() {
        let a = Call::invocation(Some("a"), "equals", &["b"]);
        let b = Call::invocation(Some("b"), "equals", &["a"]);
        assert!(a.identical_with_expression_argument_swap(&b));
        let c = Call::invocation(Some("b"), "equals", &["c"]);
        assert!(!a.identical_with_expression_argument_swap(&c));
    }
}
