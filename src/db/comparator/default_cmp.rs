use super::{Comparator, StringOp, glob::fuzzy_match};
use crate::db::iter::{Cursor0, Direction};
use crate::db::primitives::IdRange;
use std::cmp::Ordering;

///
/// DefaultComparator
/// Case-sensitive byte ordering with word-aware fuzzy matching.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultComparator;

impl Comparator for DefaultComparator {
    fn name(&self) -> &'static str {
        "default"
    }

    fn locale(&self) -> &'static str {
        "C"
    }

    fn syntax(&self, _op: StringOp) -> bool {
        true
    }

    fn sort_compare(&self, a: &str, b: &str) -> Ordering {
        a.as_bytes().cmp(b.as_bytes())
    }

    fn eq_iterator(
        &self,
        _op: StringOp,
        _value: &str,
        _range: IdRange,
        _dir: Direction,
    ) -> Option<Box<dyn Cursor0>> {
        None
    }

    fn glob(&self, pattern: &str, text: &str) -> Option<bool> {
        Some(fuzzy_match(pattern, text))
    }

    fn bin_lookup(&self, value: &str) -> u64 {
        // Coarse 256-way partition on the first byte; the store's
        // `bin_lookup` is the authority for the real binset.
        value.as_bytes().first().copied().unwrap_or(0) as u64
    }

    fn bin_count(&self) -> u64 {
        256
    }

    fn box_clone(&self) -> Box<dyn Comparator> {
        Box::new(*self)
    }
}
