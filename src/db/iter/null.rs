use super::{Cursor0, Direction, FreezeFlags, IterKind, Stats};
use crate::budget::{Budget, IterOutcome};
use crate::types::PdbId;

///
/// NullIter
/// The empty stream. Always sorted, always `ERR_NO`.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NullIter;

impl NullIter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Cursor0 for NullIter {
    fn kind(&self) -> IterKind {
        IterKind::Null
    }

    fn direction(&self) -> Direction {
        Direction::Forward
    }

    fn next(&mut self, _budget: &mut Budget) -> IterOutcome<PdbId> {
        IterOutcome::EndOfIteration
    }

    fn check(&mut self, _id: PdbId, _budget: &mut Budget) -> IterOutcome<()> {
        IterOutcome::EndOfIteration
    }

    fn statistics(&mut self, _budget: &mut Budget) -> IterOutcome<Stats> {
        IterOutcome::Done(Stats {
            n: 0,
            check_cost: 1,
            next_cost: 1,
            find_cost: 1,
            sorted: true,
            ordered: true,
            ordering: None,
        })
    }

    fn reset(&mut self) {}

    fn box_clone(&self) -> Box<dyn Cursor0> {
        Box::new(*self)
    }

    fn freeze(&self, _flags: FreezeFlags) -> String {
        "null()".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_eof() {
        let mut budget = Budget::new(100);
        let mut it = NullIter::new();

        assert_eq!(it.next(&mut budget), IterOutcome::EndOfIteration);
    }
}
