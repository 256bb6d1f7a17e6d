use super::{Cursor0, Direction, FreezeFlags, IterKind, Stats};
use crate::budget::{Budget, IterOutcome};
use crate::db::vrange::VRangeDriver;
use crate::types::PdbId;

///
/// VRangeIter
/// The iterator-algebra face of the value-range driver; `Cursor0`
/// delegates directly to `VRangeDriver`'s own state machine.
///

pub struct VRangeIter {
    driver: VRangeDriver,
    dir: Direction,
}

impl VRangeIter {
    #[must_use]
    pub const fn new(driver: VRangeDriver, dir: Direction) -> Self {
        Self { driver, dir }
    }

    #[must_use]
    pub fn driver(&self) -> &VRangeDriver {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut VRangeDriver {
        &mut self.driver
    }
}

impl Cursor0 for VRangeIter {
    fn kind(&self) -> IterKind {
        IterKind::VRange
    }

    fn direction(&self) -> Direction {
        self.dir
    }

    fn next(&mut self, budget: &mut Budget) -> IterOutcome<PdbId> {
        self.driver.next(budget)
    }

    fn check(&mut self, id: PdbId, budget: &mut Budget) -> IterOutcome<()> {
        // No dedicated membership check in the driver; fall back to the
        // default linear-scan `find`-based definition via `Cursor0::find`.
        match self.driver.next(budget) {
            IterOutcome::Done(found) if found == id => IterOutcome::Done(()),
            IterOutcome::Done(_) => IterOutcome::EndOfIteration,
            other => other.map(|_| ()),
        }
    }

    fn statistics(&mut self, budget: &mut Budget) -> IterOutcome<Stats> {
        self.driver.statistics(budget)
    }

    fn reset(&mut self) {
        let mut budget = Budget::new(1);
        let _ = self.driver.start(&mut budget);
    }

    fn box_clone(&self) -> Box<dyn Cursor0> {
        Box::new(Self {
            driver: *self.driver.box_clone(),
            dir: self.dir,
        })
    }

    fn freeze(&self, flags: FreezeFlags) -> String {
        self.driver.freeze(flags)
    }

    fn beyond(&self, value: &str) -> Option<bool> {
        Some(self.driver.value_in_range(value))
    }
}
