//! Code model consumed by the heuristics.
//!
//! The model is built by a parser outside this crate and handed over as
//! plain data. Rules only ever read it.

pub mod call;
pub mod context;
pub mod declaration;
pub mod location;
pub mod statement;

pub use call::{Call, CallKind};
pub use context::{
    ClassDiff, MapperContext, PairContext, RenamedParameter, SignatureDiff, StatementMapping,
};
pub use declaration::{Initializer, VariableDeclaration, compatible_types};
pub use location::{CodeElementType, Location};
pub use statement::{
    AnonymousClass, CodeModel, Container, LeafExpression, LeafKind, Shape, Statement,
    StatementId, Ternary,
};
