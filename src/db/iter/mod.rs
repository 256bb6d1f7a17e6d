//! The iterator algebra: a uniform, budgeted,
//! resumable producer of sorted or unsorted ID streams.
//!
//! `Cursor0` is named to avoid colliding with `std::iter::Iterator` — its
//! operations are budgeted and suspendable, which gives it a materially
//! different contract from the standard trait.

mod all;
mod and;
mod fixed;
mod hash_iter;
mod idset;
mod null;
mod or;
mod prefix;
mod vrange_iter;
mod with_value;
mod word;

pub use all::AllIter;
pub use and::AndIter;
pub use fixed::FixedIter;
pub use hash_iter::HashIter;
pub use idset::IdSetIter;
pub use null::NullIter;
pub use or::OrIter;
pub use prefix::{PrefixField, PrefixIter};
pub use vrange_iter::VRangeIter;
pub use with_value::WithoutValueIter;
pub use word::WordIter;

use crate::{budget::IterOutcome, budget::Budget, db::primitives::Linkage, types::PdbId};
use std::rc::Rc;

/// Shared handle to the external primitive store. Single-threaded
/// cooperative scheduling means `Rc`, not `Arc`, is the right
/// shared-ownership type.
pub type StoreHandle = Rc<dyn crate::db::primitives::PrimitiveStore>;

///
/// Direction
/// Forward or backward traversal, shared by iterators, comparator bins,
/// and cursor position encoding.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    #[must_use]
    pub const fn is_forward(self) -> bool {
        matches!(self, Self::Forward)
    }

    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

///
/// FreezeFlags
/// Which subset of `{SET, POSITION, STATE}` `freeze` should serialize.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FreezeFlags(u8);

impl FreezeFlags {
    pub const SET: Self = Self(0b001);
    pub const POSITION: Self = Self(0b010);
    pub const STATE: Self = Self(0b100);
    pub const ALL: Self = Self(0b111);

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl std::ops::BitOr for FreezeFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

///
/// IterKind
/// Type tag distinguishing the iterator variants.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IterKind {
    Null,
    All,
    Fixed,
    Hash,
    Word,
    Prefix,
    And,
    Or,
    VRange,
    IdSet,
    WithoutValue,
}

impl IterKind {
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::All => "all",
            Self::Fixed => "fixed",
            Self::Hash => "hash",
            Self::Word => "word",
            Self::Prefix => "prefix",
            Self::And => "and",
            Self::Or => "or",
            Self::VRange => "vrange",
            Self::IdSet => "idset",
            Self::WithoutValue => "without-value",
        }
    }

    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "null" => Self::Null,
            "all" => Self::All,
            "fixed" => Self::Fixed,
            "hash" => Self::Hash,
            "word" => Self::Word,
            "prefix" => Self::Prefix,
            "and" => Self::And,
            "or" => Self::Or,
            "vrange" => Self::VRange,
            "idset" => Self::IdSet,
            "without-value" => Self::WithoutValue,
            _ => return None,
        })
    }
}

///
/// Stats
/// Cost/shape description of one iterator, computed on demand and cached
/// on the original (`statistics`).
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stats {
    pub n: u64,
    pub check_cost: u64,
    pub next_cost: u64,
    pub find_cost: u64,
    pub sorted: bool,
    /// `true` when consecutive emissions are additionally monotone with
    /// respect to a sort key beyond raw ID order (used by `beyond`).
    pub ordered: bool,
    /// Name of the sort key backing `ordered`, when present.
    pub ordering: Option<String>,
}

///
/// PrimitiveSummary
/// Compact filter description an enclosing `and`/`or` can use to prune
/// without building the full sub-iterator (`primitive_summary`).
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PrimitiveSummary {
    pub fixed_linkages: Vec<(Linkage, crate::types::Guid)>,
    pub fixed_value: Option<String>,
}

///
/// Cursor0
///
/// The uniform iterator contract. Every operation is a potential
/// suspension point: it accepts a mutable budget and must be re-entrant,
/// resuming exactly where it left off when handed fresh budget.
///
pub trait Cursor0 {
    /// Tag identifying which variant this is, for cursor encoding.
    fn kind(&self) -> IterKind;

    /// This iterator's traversal direction.
    fn direction(&self) -> Direction;

    /// Emit the next ID in this iterator's direction.
    fn next(&mut self, budget: &mut Budget) -> IterOutcome<PdbId>;

    /// Position at or past `in_id` (in this iterator's direction) and
    /// emit the next element. Only meaningful when `sorted`; the default
    /// falls back to linear scan via repeated `next`, which is correct
    /// but not necessarily cheap — variants with a real index should
    /// override it.
    fn find(&mut self, in_id: PdbId, budget: &mut Budget) -> IterOutcome<PdbId> {
        loop {
            match self.next(budget) {
                IterOutcome::Done(id) => {
                    let past = if self.direction().is_forward() {
                        id >= in_id
                    } else {
                        id <= in_id
                    };
                    if past {
                        return IterOutcome::Done(id);
                    }
                }
                other => return other,
            }
        }
    }

    /// Decide membership of `id` without disturbing position.
    fn check(&mut self, id: PdbId, budget: &mut Budget) -> IterOutcome<()>;

    /// Fill in cost/shape statistics. Idempotent after first success.
    fn statistics(&mut self, budget: &mut Budget) -> IterOutcome<Stats>;

    /// Rewind to the first element in the current direction.
    fn reset(&mut self);

    /// Produce an independent positioned copy sharing this iterator's
    /// heavy state (see `Original`/`Clone`).
    fn box_clone(&self) -> Box<dyn Cursor0>;

    /// Serialize the requested subset of `{SET, POSITION, STATE}`.
    fn freeze(&self, flags: FreezeFlags) -> String;

    /// Given a sort key, answer whether the last emitted ID has already
    /// passed it. Only meaningful when `ordered`; `None` otherwise.
    fn beyond(&self, _value: &str) -> Option<bool> {
        None
    }

    /// A compact filter description letting enclosing joins prune.
    fn primitive_summary(&self) -> PrimitiveSummary {
        PrimitiveSummary::default()
    }
}
