use super::{Cursor0, Direction, FreezeFlags, IterKind, Stats, StoreHandle};
use crate::budget::{BASE_STEP_COST, Budget, IterOutcome};
use crate::types::PdbId;

///
/// WithoutValueIter
/// The complement of "has any non-empty value": wraps a
/// base stream (typically `all` over the allowed range) and post-filters
/// by reading each candidate primitive.
///

pub struct WithoutValueIter {
    store: StoreHandle,
    inner: Box<dyn Cursor0>,
}

impl WithoutValueIter {
    #[must_use]
    pub fn new(store: StoreHandle, inner: Box<dyn Cursor0>) -> Self {
        Self { store, inner }
    }
}

impl Cursor0 for WithoutValueIter {
    fn kind(&self) -> IterKind {
        IterKind::WithoutValue
    }

    fn direction(&self) -> Direction {
        self.inner.direction()
    }

    fn next(&mut self, budget: &mut Budget) -> IterOutcome<PdbId> {
        loop {
            if !budget.charge(BASE_STEP_COST) {
                return IterOutcome::NeedsBudget;
            }

            match self.inner.next(budget) {
                IterOutcome::Done(id) => match self.store.id_read(id) {
                    Ok(primitive) if primitive.value.is_none() => return IterOutcome::Done(id),
                    Ok(_) => continue,
                    Err(_) => return IterOutcome::EndOfIteration,
                },
                other => return other,
            }
        }
    }

    fn check(&mut self, id: PdbId, budget: &mut Budget) -> IterOutcome<()> {
        if !budget.charge(BASE_STEP_COST) {
            return IterOutcome::NeedsBudget;
        }

        match self.inner.check(id, budget) {
            IterOutcome::Done(()) => match self.store.id_read(id) {
                Ok(primitive) if primitive.value.is_none() => IterOutcome::Done(()),
                Ok(_) => IterOutcome::EndOfIteration,
                Err(_) => IterOutcome::EndOfIteration,
            },
            other => other,
        }
    }

    fn statistics(&mut self, budget: &mut Budget) -> IterOutcome<Stats> {
        self.inner.statistics(budget).map(|mut stats| {
            stats.next_cost += 1;
            stats.ordered = false;
            stats.ordering = None;
            stats
        })
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn box_clone(&self) -> Box<dyn Cursor0> {
        Box::new(Self {
            store: self.store.clone(),
            inner: self.inner.box_clone(),
        })
    }

    fn freeze(&self, flags: FreezeFlags) -> String {
        format!("without-value({})", self.inner.freeze(flags))
    }
}
