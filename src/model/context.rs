//! Read-only context supplied by the outer statement mapper.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::declaration::VariableDeclaration;
use super::location::Location;
use super::statement::{CodeModel, Shape, Statement, StatementId};
use crate::config::HeuristicsConfig;
use crate::refactoring::ConditionalRefactoring;

/// A parameter whose name changed between the two operation signatures.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenamedParameter {
    pub before: String,
    pub after: String,
}

/// Parameter-level differences between the two enclosing operations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureDiff {
    pub added_parameters: Vec<VariableDeclaration>,
    pub removed_parameters: Vec<VariableDeclaration>,
    pub renamed_parameters: Vec<RenamedParameter>,
}

impl SignatureDiff {
    pub fn added_parameter(&self, name: &str) -> Option<&VariableDeclaration> {
        self.added_parameters.iter().find(|p| p.name == name)
    }

    pub fn removed_parameter(&self, name: &str) -> Option<&VariableDeclaration> {
        self.removed_parameters.iter().find(|p| p.name == name)
    }

    /// `name` is the new name of a renamed parameter.
    pub fn renamed_to(&self, name: &str) -> Option<&RenamedParameter> {
        self.renamed_parameters.iter().find(|p| p.after == name)
    }

    /// `name` is the old name of a renamed parameter.
    pub fn renamed_from(&self, name: &str) -> Option<&RenamedParameter> {
        self.renamed_parameters.iter().find(|p| p.before == name)
    }
}

/// Attribute-level differences between the two enclosing classes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassDiff {
    pub removed_attributes: Vec<VariableDeclaration>,
    pub added_attributes: Vec<VariableDeclaration>,
    /// Attribute names of the class before the change.
    pub original_attributes: Vec<String>,
    /// Attribute names of the class after the change.
    pub next_attributes: Vec<String>,
}

impl ClassDiff {
    pub fn removed_attribute(&self, name: &str) -> Option<&VariableDeclaration> {
        self.removed_attributes.iter().find(|a| a.name == name)
    }

    pub fn added_attribute(&self, name: &str) -> Option<&VariableDeclaration> {
        self.added_attributes.iter().find(|a| a.name == name)
    }

    pub fn original_has_attribute(&self, name: &str) -> bool {
        self.original_attributes.iter().any(|a| a == name)
    }

    pub fn next_has_attribute(&self, name: &str) -> bool {
        self.next_attributes.iter().any(|a| a == name)
    }
}

/// An accepted pairing of a statement on side 1 with one on side 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatementMapping {
    pub fragment1: StatementId,
    pub fragment2: StatementId,
}

/// Everything the mapper knows about the two operations being compared.
///
/// Owned by the caller and shared read-only across every pair comparison
/// of one mapping run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperContext {
    pub model1: CodeModel,
    pub model2: CodeModel,
    /// Parameter name to argument text, from the call site of an inlined or
    /// extracted operation.
    pub parameter_to_argument: BTreeMap<String, String>,
    pub signature_diff: Option<SignatureDiff>,
    pub class_diff: Option<ClassDiff>,
    pub mappings: Vec<StatementMapping>,
    /// Refactorings already accepted by the mapper.
    pub existing_refactorings: Vec<ConditionalRefactoring>,
    /// The mapper compares an extracted or inlined operation under a
    /// parent mapper.
    pub has_parent_mapper: bool,
    /// The parent mapper's two operations have different signatures.
    pub parent_signatures_differ: bool,
    pub calls_to_extracted_methods: usize,
}

impl MapperContext {
    pub fn new(model1: CodeModel, model2: CodeModel) -> Self {
        Self {
            model1,
            model2,
            ..Self::default()
        }
    }

    /// `id` on side 1 takes part in an accepted mapping.
    pub fn is_mapped1(&self, id: StatementId) -> bool {
        self.mappings.iter().any(|m| m.fragment1 == id)
    }

    /// `id` on side 2 takes part in an accepted mapping.
    pub fn is_mapped2(&self, id: StatementId) -> bool {
        self.mappings.iter().any(|m| m.fragment2 == id)
    }

    pub fn mapping_of1(&self, id: StatementId) -> Option<&StatementMapping> {
        self.mappings.iter().find(|m| m.fragment1 == id)
    }

    pub fn mapping_of2(&self, id: StatementId) -> Option<&StatementMapping> {
        self.mappings.iter().find(|m| m.fragment2 == id)
    }

    pub fn is_mapped_pair(&self, id1: StatementId, id2: StatementId) -> bool {
        self.mappings
            .iter()
            .any(|m| m.fragment1 == id1 && m.fragment2 == id2)
    }

    /// `name` is declared as a parameter of operation 1.
    pub fn is_parameter1(&self, name: &str) -> bool {
        self.model1.container.has_parameter(name)
    }

    pub fn is_parameter2(&self, name: &str) -> bool {
        self.model2.container.has_parameter(name)
    }

    pub fn removed_attribute(&self, name: &str) -> Option<&VariableDeclaration> {
        self.class_diff.as_ref().and_then(|d| d.removed_attribute(name))
    }

    pub fn added_attribute(&self, name: &str) -> Option<&VariableDeclaration> {
        self.class_diff.as_ref().and_then(|d| d.added_attribute(name))
    }
}

/// One statement-pair comparison: the mapper context plus the two
/// statements being compared.
#[derive(Debug, Clone, Copy)]
pub struct PairContext<'a> {
    pub mapper: &'a MapperContext,
    pub statement1: StatementId,
    pub statement2: StatementId,
    pub config: &'a HeuristicsConfig,
}

impl<'a> PairContext<'a> {
    pub const fn new(
        mapper: &'a MapperContext,
        statement1: StatementId,
        statement2: StatementId,
        config: &'a HeuristicsConfig,
    ) -> Self {
        Self {
            mapper,
            statement1,
            statement2,
            config,
        }
    }

    pub const fn model1(&self) -> &'a CodeModel {
        &self.mapper.model1
    }

    pub const fn model2(&self) -> &'a CodeModel {
        &self.mapper.model2
    }

    /// Statement 1. Ids are validated by the caller; an unknown id reads
    /// as an empty statement.
    pub fn fragment1(&self) -> &'a Statement {
        self.mapper
            .model1
            .get(self.statement1)
            .unwrap_or(&EMPTY_STATEMENT)
    }

    pub fn fragment2(&self) -> &'a Statement {
        self.mapper
            .model2
            .get(self.statement2)
            .unwrap_or(&EMPTY_STATEMENT)
    }
}

static EMPTY_STATEMENT: Statement = Statement {
    text: String::new(),
    location: Location::new(0, 0, 0, 0),
    shape: Shape::Leaf,
    parent: None,
    variable_declarations: Vec::new(),
    calls: Vec::new(),
    infix_operators: Vec::new(),
    expressions: Vec::new(),
    ternaries: Vec::new(),
    anonymous_classes: Vec::new(),
    nested: Vec::new(),
};
