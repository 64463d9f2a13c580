//! Rule families.
//!
//! Every rule takes the two statement texts, the pair context and the
//! accumulator, and answers whether the pair is the same statement under
//! the edits it recorded. A declining rule leaves the accumulator as it
//! found it.
//!
//! The texts passed in are usually the statement texts after the caller
//! applied the replacements found so far, so they may differ from
//! `ctx.fragment1().text`.

pub mod anonymous;
pub mod arguments;
pub mod concat;
pub mod declaration;
pub mod everything;
pub mod operators;
pub mod prefix;

use crate::model::PairContext;
use crate::replacement::ReplacementInfo;

/// Signature shared by every rule of the chain.
pub type Rule = fn(&str, &str, &PairContext<'_>, &mut ReplacementInfo) -> bool;

#[cfg(test)]
pub(crate) mod fixtures {
    //! Small builders for rule tests.

    use crate::config::HeuristicsConfig;
    use crate::model::{CodeModel, MapperContext, Statement, StatementId};

    /// Two one-statement models holding `s1` and `s2`.
    pub fn pair(s1: Statement, s2: Statement) -> (MapperContext, StatementId, StatementId) {
        let mut m1 = CodeModel::default();
        let id1 = m1.push(s1);
        let mut m2 = CodeModel::default();
        let id2 = m2.push(s2);
        (MapperContext::new(m1, m2), id1, id2)
    }

    pub fn text_pair(s1: &str, s2: &str) -> (MapperContext, StatementId, StatementId) {
        pair(Statement::new(s1), Statement::new(s2))
    }

    pub fn config() -> HeuristicsConfig {
        HeuristicsConfig::default()
    }
}
