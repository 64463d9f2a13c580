//! Conditional-structure sub-engine.
//!
//! Boolean expressions are reduced to their body (see
//! [`prepare_conditional`]) and split into sub-conditions. Two statements
//! match when their sub-condition sets intersect beyond what the recorded
//! replacements already explain. Around that core the engine looks for
//! sibling `if` nodes that take part in a split or merge, inverted
//! conditions, and conditionals rewritten as ternaries.

pub mod adjacency;
pub mod branches;
pub mod engine;
pub mod subconditions;

use crate::model::{CodeModel, MapperContext};

pub use crate::rules::operators::invert_conditional_direction;
pub use engine::common_conditional;
pub use subconditions::{
    SubConditions, check_for_inverted_conditionals, match_count, pass, prepare_conditional,
    sub_condition_intersection,
};

/// Which arena a statement id lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    One,
    Two,
}

impl Side {
    /// The model of this side and the model of the other side.
    pub const fn models(self, mapper: &MapperContext) -> (&CodeModel, &CodeModel) {
        match self {
            Self::One => (&mapper.model1, &mapper.model2),
            Self::Two => (&mapper.model2, &mapper.model1),
        }
    }
}
