use super::{Cursor0, Direction, FreezeFlags, IterKind, Stats};
use crate::budget::{BASE_STEP_COST, Budget, IterOutcome};
use crate::db::primitives::IdRange;
use crate::types::PdbId;

///
/// AllIter
/// Dense `[low, high)` integers, in either direction.
///

#[derive(Clone, Copy, Debug)]
pub struct AllIter {
    range: IdRange,
    dir: Direction,
    cursor: Option<PdbId>,
    started: bool,
}

impl AllIter {
    #[must_use]
    pub const fn new(range: IdRange, dir: Direction) -> Self {
        Self {
            range,
            dir,
            cursor: None,
            started: false,
        }
    }

    #[must_use]
    pub const fn with_position(range: IdRange, dir: Direction, last: Option<PdbId>) -> Self {
        Self {
            range,
            dir,
            cursor: last,
            started: true,
        }
    }

    const fn first(&self) -> PdbId {
        if self.dir.is_forward() {
            self.range.low
        } else {
            PdbId::new(self.range.high.get() - 1)
        }
    }
}

impl Cursor0 for AllIter {
    fn kind(&self) -> IterKind {
        IterKind::All
    }

    fn direction(&self) -> Direction {
        self.dir
    }

    fn next(&mut self, budget: &mut Budget) -> IterOutcome<PdbId> {
        if !budget.charge(BASE_STEP_COST) {
            return IterOutcome::NeedsBudget;
        }

        if self.range.low.get() >= self.range.high.get() {
            return IterOutcome::EndOfIteration;
        }

        let candidate = if !self.started {
            self.started = true;
            self.first()
        } else {
            match self.cursor {
                None => return IterOutcome::EndOfIteration,
                Some(last) => {
                    if self.dir.is_forward() {
                        match last.checked_next() {
                            Some(n) if self.range.contains(n) => n,
                            _ => return IterOutcome::EndOfIteration,
                        }
                    } else if last.get() > self.range.low.get() {
                        last.prev()
                    } else {
                        return IterOutcome::EndOfIteration;
                    }
                }
            }
        };

        if !self.range.contains(candidate) {
            self.cursor = None;
            return IterOutcome::EndOfIteration;
        }

        self.cursor = Some(candidate);

        IterOutcome::Done(candidate)
    }

    fn find(&mut self, in_id: PdbId, budget: &mut Budget) -> IterOutcome<PdbId> {
        if !budget.charge(BASE_STEP_COST) {
            return IterOutcome::NeedsBudget;
        }

        let target = if self.dir.is_forward() {
            in_id.max(self.range.low)
        } else {
            in_id.min(PdbId::new(self.range.high.get() - 1))
        };

        if !self.range.contains(target) {
            self.cursor = None;
            self.started = true;
            return IterOutcome::EndOfIteration;
        }

        self.cursor = Some(target);
        self.started = true;

        IterOutcome::Done(target)
    }

    fn check(&mut self, id: PdbId, budget: &mut Budget) -> IterOutcome<()> {
        if !budget.charge(BASE_STEP_COST) {
            return IterOutcome::NeedsBudget;
        }

        if self.range.contains(id) {
            IterOutcome::Done(())
        } else {
            IterOutcome::EndOfIteration
        }
    }

    fn statistics(&mut self, _budget: &mut Budget) -> IterOutcome<Stats> {
        IterOutcome::Done(Stats {
            n: self.range.high.get().saturating_sub(self.range.low.get()),
            check_cost: 1,
            next_cost: 1,
            find_cost: 1,
            sorted: true,
            ordered: false,
            ordering: None,
        })
    }

    fn reset(&mut self) {
        self.cursor = None;
        self.started = false;
    }

    fn box_clone(&self) -> Box<dyn Cursor0> {
        Box::new(*self)
    }

    fn freeze(&self, flags: FreezeFlags) -> String {
        let mut out = format!(
            "all({},{},{})",
            self.range.low.get(),
            self.range.high.get(),
            if self.dir.is_forward() { "f" } else { "b" }
        );
        if flags.contains(FreezeFlags::POSITION) {
            match self.cursor {
                Some(id) => out.push_str(&format!("/{}", id.get())),
                None => out.push_str("/$"),
            }
        }
        out
    }
}
