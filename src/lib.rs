//! `stmt-equiv` -- heuristic statement equivalence for refactoring
//! detection.
//!
//! Given two statements from two versions of a method, decides whether they
//! are "the same statement" under a set of recorded edits (renamed
//! variables, inverted conditions, reshaped concatenations, added
//! arguments, split or merged conditionals, ...). The caller supplies a
//! code model of both sides; the engine never parses source text.
//!
//! # Layers
//!
//! - [`text`] -- prefix/suffix diffs, tokenizers, edit distance
//! - [`model`] -- arena code model, mapper and pair context
//! - [`replacement`] -- recorded edits and the per-comparison accumulator
//! - [`rules`] -- the rule families
//! - [`conditional`] -- sub-condition analysis, split/merge/invert detection
//! - [`chain`] -- ordered rule table and [`classify`]
//! - [`driver`] -- newline-delimited JSON front end used by the binary
//!
//! # Architecture
//!
//! ```text
//! stdin (NDJSON) → driver → classify → RULE_CHAIN → rules / conditional
//!                                ↓
//!                       everything_replaced
//! stdout (NDJSON) ←──────────────┘
//! ```

pub mod chain;
pub mod conditional;
pub mod config;
pub mod driver;
pub mod error;
pub mod model;
pub mod refactoring;
pub mod replacement;
pub mod rules;
pub mod text;

pub use chain::{classify, everything_replaced};
pub use config::HeuristicsConfig;
pub use driver::run_stdio;
pub use error::{HeuristicsError, HeuristicsResult};
pub use model::{CodeModel, MapperContext, PairContext, Statement, StatementId};
pub use refactoring::ConditionalRefactoring;
pub use replacement::{Replacement, ReplacementInfo, ReplacementKind, ReplacementType};
