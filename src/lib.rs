//! Query-evaluation engine for an append-only, content-addressed graph
//! store: the iterator algebra, comparator/value-range machinery, the
//! constraint tree, read-or truth tracking, and the freeze/thaw cursor
//! protocol that makes evaluation state externally resumable on a budget.
//!
//! The wire protocol, the primitive store's own durability, replication,
//! and the session/event-loop layer are external collaborators; this crate
//! only defines the trait boundaries they must satisfy (`db::primitives`)
//! and the engine that runs on top of them.

extern crate self as graphcore;

pub mod arena;
pub mod budget;
pub mod config;
pub mod db;
pub mod error;
pub mod obs;
pub mod serialize;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Domain vocabulary only: no errors, budgets, or store plumbing.
///

pub mod prelude {
    pub use crate::{
        budget::IterOutcome,
        db::comparator::Comparator,
        db::constraint::{ConstraintNode, GuidClause, StringClause},
        db::guidset::GuidSet,
        db::iter::{Cursor0, Direction, FreezeFlags},
        db::ormap::{OrMap, OrState},
        db::primitives::{Datatype, Linkage, Primitive, PrimitiveStore},
        db::token::ResultToken,
        types::{Guid, PdbId, Timestamp},
    };
}
