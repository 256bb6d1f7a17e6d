//! Comparators: per-locale string ordering plus the capability
//! set used to build value-range iterators. Two implementations are
//! required: `default` (case-sensitive, fuzzy-match capable) and
//! `case_insensitive`.

mod default_cmp;
mod case_insensitive;
mod glob;

pub use case_insensitive::CaseInsensitiveComparator;
pub use default_cmp::DefaultComparator;

use crate::db::iter::{Cursor0, Direction};
use crate::db::primitives::IdRange;
use std::cmp::Ordering;

///
/// StringOp
/// Operators a comparator's `syntax` capability may accept or reject.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StringOp {
    Eq,
    Ne,
    Fuzzy,
    Lt,
    Le,
    Gt,
    Ge,
}

///
/// Comparator
///
/// The capability-set interface. `vrange_*`/`value_in_range`
/// capabilities are consumed exclusively by `db::vrange`; a comparator
/// that cannot support them degrades range queries to full scan (left to
/// the constraint compiler, not this trait).
///
pub trait Comparator {
    fn name(&self) -> &'static str;

    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    fn locale(&self) -> &'static str;

    /// Rejects operators this comparator cannot support.
    fn syntax(&self, op: StringOp) -> bool;

    /// Total order on strings.
    fn sort_compare(&self, a: &str, b: &str) -> Ordering;

    /// Build an index iterator for `=`/`~=`. Returning `None` means "no
    /// useful index restriction, fall back to range scan".
    fn eq_iterator(
        &self,
        op: StringOp,
        value: &str,
        range: IdRange,
        dir: Direction,
    ) -> Option<Box<dyn Cursor0>>;

    /// Optional fuzzy-match post-filter predicate for `~=`.
    fn glob(&self, _pattern: &str, _text: &str) -> Option<bool> {
        None
    }

    /// Locate the bin containing `value` under this comparator's order.
    fn bin_lookup(&self, value: &str) -> u64;

    /// Comparator-specific estimate of the number of bins.
    fn bin_count(&self) -> u64;

    /// Sentinel strings bounding unbounded range endpoints.
    fn lowest_string(&self) -> &'static str {
        ""
    }

    fn highest_string(&self) -> &'static str {
        "\u{10FFFF}"
    }

    /// Comparators are process-wide constants; this only exists
    /// so owners of a `Box<dyn Comparator>` (e.g. `VRangeDriver`) can be
    /// cloned without generics.
    fn box_clone(&self) -> Box<dyn Comparator>;
}

#[must_use]
pub fn by_name(name: &str) -> Option<Box<dyn Comparator>> {
    match name {
        "default" => Some(Box::new(DefaultComparator)),
        "case_insensitive" | "ci" => Some(Box::new(CaseInsensitiveComparator)),
        _ => None,
    }
}
