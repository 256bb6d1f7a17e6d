use super::{Comparator, StringOp};
use crate::db::iter::{Cursor0, Direction};
use crate::db::primitives::IdRange;
use std::cmp::Ordering;

///
/// CaseInsensitiveComparator
/// Unicode-aware `strcasecmp` ordering. No fuzzy matching; `~=` is
/// rejected at `syntax` time.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct CaseInsensitiveComparator;

impl Comparator for CaseInsensitiveComparator {
    fn name(&self) -> &'static str {
        "case_insensitive"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["ci"]
    }

    fn locale(&self) -> &'static str {
        "C"
    }

    fn syntax(&self, op: StringOp) -> bool {
        !matches!(op, StringOp::Fuzzy)
    }

    fn sort_compare(&self, a: &str, b: &str) -> Ordering {
        a.to_lowercase().cmp(&b.to_lowercase())
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

    fn bin_lookup(&self, value: &str) -> u64 {
        value
            .to_lowercase()
            .as_bytes()
            .first()
            .copied()
            .unwrap_or(0) as u64
    }

    fn bin_count(&self) -> u64 {
        256
    }

    fn box_clone(&self) -> Box<dyn Comparator> {
        Box::new(*self)
    }
}
