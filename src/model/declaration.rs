//! Variable declarations and declared types.

use serde::{Deserialize, Serialize};

use super::call::Call;

/// Initializer expression of a variable declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Initializer {
    pub text: String,
    /// Calls and object creations appearing in the initializer.
    pub calls: Vec<Call>,
    pub number_literals: Vec<String>,
}

impl Initializer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Object creations inside the initializer.
    pub fn creations(&self) -> impl Iterator<Item = &Call> {
        self.calls.iter().filter(|c| c.is_creation())
    }

    /// The method invocation the initializer consists of, possibly behind a
    /// cast: `foo()` or `(T) foo()`.
    pub fn covering_invocation(&self) -> Option<&Call> {
        self.calls.iter().filter(|c| !c.is_creation()).find(|c| {
            let call = c.string();
            self.text == call.as_ref()
                || (self.text.starts_with('(')
                    && self.text.ends_with(call.as_ref())
                    && self.text[..self.text.len() - call.len()].trim_end().ends_with(')'))
        })
    }

    /// The initializer is a cast applied to a method invocation.
    pub fn is_cast_invocation(&self) -> bool {
        self.text.starts_with('(')
            && self
                .covering_invocation()
                .is_some_and(|c| self.text != c.string().as_ref())
    }
}

/// A declared local variable, parameter, or attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableDeclaration {
    pub name: String,
    pub type_name: Option<String>,
    pub initializer: Option<Initializer>,
    pub is_parameter: bool,
    pub is_attribute: bool,
}

impl VariableDeclaration {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: Some(type_name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_initializer(mut self, initializer: impl Into<String>) -> Self {
        self.initializer = Some(Initializer::new(initializer));
        self
    }

    pub fn initializer_text(&self) -> Option<&str> {
        self.initializer.as_ref().map(|i| i.text.as_str())
    }

    pub fn type_str(&self) -> &str {
        self.type_name.as_deref().unwrap_or("")
    }

    /// Same name and type; initializers may differ.
    pub fn same_signature(&self, other: &Self) -> bool {
        self.name == other.name && self.type_name == other.type_name
    }

    /// Same type and same initializer text.
    pub fn same_shape(&self, other: &Self) -> bool {
        self.type_name == other.type_name && self.initializer_text() == other.initializer_text()
    }

    /// Declared types denote the same class, ignoring package qualification
    /// and type arguments.
    pub fn compatible_type(&self, other: &Self) -> bool {
        match (&self.type_name, &other.type_name) {
            (Some(a), Some(b)) => compatible_types(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

/// Declared types `a` and `b` denote the same class.
///
/// `java.util.List<String>` is compatible with `List<Integer>`; `List` is not
/// compatible with `Set`, and `int[]` is not compatible with `int`.
pub fn compatible_types(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let (raw_a, dims_a) = raw_type(a);
    let (raw_b, dims_b) = raw_type(b);
    dims_a == dims_b && simple_name(raw_a) == simple_name(raw_b)
}

fn raw_type(t: &str) -> (&str, usize) {
    let mut t = t.trim();
    let mut dims = 0;
    while let Some(stripped) = t.strip_suffix("[]") {
        t = stripped;
        dims += 1;
    }
    if let Some(stripped) = t.strip_suffix("...") {
        t = stripped;
        dims += 1;
    }
    let raw = t.find('<').map_or(t, |i| &t[..i]);
    (raw, dims)
}

fn simple_name(t: &str) -> &str {
    t.rsplit('.').next().unwrap_or(t)
}
