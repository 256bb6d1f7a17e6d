use super::{Cursor0, Direction, FreezeFlags, IterKind, Stats};
use crate::budget::{BASE_STEP_COST, Budget, IterOutcome};
use crate::types::PdbId;

///
/// AndIter
/// Sorted intersection over `k` sub-iterators. Planning picks
/// the cheapest `next_cost` sub as producer; the others are checkers,
/// consulted in ascending `check_cost` order with short-circuit on the
/// first miss.
///

pub struct AndIter {
    subs: Vec<Box<dyn Cursor0>>,
    dir: Direction,
    stats: Vec<Option<Stats>>,
    plan_cursor: usize,
    producer: Option<usize>,
    checkers: Vec<usize>,
    check_order: Vec<usize>,
    /// `(candidate, next checker index to try)`: a producer-emitted
    /// candidate whose verification was interrupted by `NeedsBudget`.
    pending: Option<(PdbId, usize)>,
}

impl AndIter {
    #[must_use]
    pub fn new(subs: Vec<Box<dyn Cursor0>>, dir: Direction) -> Self {
        let len = subs.len();
        Self {
            subs,
            dir,
            stats: vec![None; len],
            plan_cursor: 0,
            producer: None,
            checkers: Vec::new(),
            check_order: Vec::new(),
            pending: None,
        }
    }

    fn ensure_plan(&mut self, budget: &mut Budget) -> IterOutcome<()> {
        if self.producer.is_some() {
            return IterOutcome::Done(());
        }

        while self.plan_cursor < self.subs.len() {
            match self.subs[self.plan_cursor].statistics(budget) {
                IterOutcome::Done(stats) => {
                    self.stats[self.plan_cursor] = Some(stats);
                    self.plan_cursor += 1;
                }
                IterOutcome::NeedsBudget => return IterOutcome::NeedsBudget,
                IterOutcome::EndOfIteration => return IterOutcome::EndOfIteration,
            }
        }

        let mut order: Vec<usize> = (0..self.subs.len()).collect();
        order.sort_by_key(|&i| self.stats[i].as_ref().map_or(u64::MAX, |s| s.check_cost));
        self.check_order = order;

        let producer = (0..self.subs.len())
            .min_by_key(|&i| self.stats[i].as_ref().map_or(u64::MAX, |s| s.next_cost))
            .unwrap_or(0);
        self.producer = Some(producer);
        self.checkers = self.check_order.iter().copied().filter(|&i| i != producer).collect();

        IterOutcome::Done(())
    }

    fn verify(&mut self, id: PdbId, mut from_checker: usize, budget: &mut Budget) -> IterOutcome<bool> {
        while from_checker < self.checkers.len() {
            let ci = self.checkers[from_checker];
            match self.subs[ci].check(id, budget) {
                IterOutcome::Done(()) => from_checker += 1,
                IterOutcome::EndOfIteration => return IterOutcome::Done(false),
                IterOutcome::NeedsBudget => {
                    self.pending = Some((id, from_checker));
                    return IterOutcome::NeedsBudget;
                }
            }
        }
        IterOutcome::Done(true)
    }
}

impl Cursor0 for AndIter {
    fn kind(&self) -> IterKind {
        IterKind::And
    }

    fn direction(&self) -> Direction {
        self.dir
    }

    fn next(&mut self, budget: &mut Budget) -> IterOutcome<PdbId> {
        if !budget.charge(BASE_STEP_COST) {
            return IterOutcome::NeedsBudget;
        }

        match self.ensure_plan(budget) {
            IterOutcome::Done(()) => {}
            IterOutcome::NeedsBudget => return IterOutcome::NeedsBudget,
            IterOutcome::EndOfIteration => return IterOutcome::EndOfIteration,
        }

        let producer = self.producer.expect("plan ensured");

        loop {
            let (id, from_checker) = match self.pending.take() {
                Some(p) => p,
                None => match self.subs[producer].next(budget) {
                    IterOutcome::Done(id) => (id, 0),
                    IterOutcome::EndOfIteration => return IterOutcome::EndOfIteration,
                    IterOutcome::NeedsBudget => return IterOutcome::NeedsBudget,
                },
            };

            match self.verify(id, from_checker, budget) {
                IterOutcome::Done(true) => return IterOutcome::Done(id),
                IterOutcome::Done(false) => continue,
                IterOutcome::NeedsBudget => return IterOutcome::NeedsBudget,
                IterOutcome::EndOfIteration => return IterOutcome::EndOfIteration,
            }
        }
    }

    fn check(&mut self, id: PdbId, budget: &mut Budget) -> IterOutcome<()> {
        if let IterOutcome::NeedsBudget = self.ensure_plan(budget) {
            return IterOutcome::NeedsBudget;
        }

        for &idx in &self.check_order.clone() {
            match self.subs[idx].check(id, budget) {
                IterOutcome::Done(()) => continue,
                IterOutcome::EndOfIteration => return IterOutcome::EndOfIteration,
                IterOutcome::NeedsBudget => return IterOutcome::NeedsBudget,
            }
        }

        IterOutcome::Done(())
    }

    fn find(&mut self, in_id: PdbId, budget: &mut Budget) -> IterOutcome<PdbId> {
        if let IterOutcome::NeedsBudget = self.ensure_plan(budget) {
            return IterOutcome::NeedsBudget;
        }

        let producer = self.producer.expect("plan ensured");

        loop {
            let (id, from_checker) = match self.pending.take() {
                Some(p) => p,
                None => match self.subs[producer].find(in_id, budget) {
                    IterOutcome::Done(id) => (id, 0),
                    IterOutcome::EndOfIteration => return IterOutcome::EndOfIteration,
                    IterOutcome::NeedsBudget => return IterOutcome::NeedsBudget,
                },
            };

            match self.verify(id, from_checker, budget) {
                IterOutcome::Done(true) => return IterOutcome::Done(id),
                IterOutcome::Done(false) => {
                    match self.subs[producer].next(budget) {
                        IterOutcome::Done(next_id) => {
                            self.pending = Some((next_id, 0));
                        }
                        IterOutcome::EndOfIteration => return IterOutcome::EndOfIteration,
                        IterOutcome::NeedsBudget => return IterOutcome::NeedsBudget,
                    }
                }
                IterOutcome::NeedsBudget => return IterOutcome::NeedsBudget,
                IterOutcome::EndOfIteration => return IterOutcome::EndOfIteration,
            }
        }
    }

    fn statistics(&mut self, budget: &mut Budget) -> IterOutcome<Stats> {
        if let IterOutcome::NeedsBudget = self.ensure_plan(budget) {
            return IterOutcome::NeedsBudget;
        }

        let producer = self.producer.expect("plan ensured");
        let n = self.stats[producer].as_ref().map_or(0, |s| s.n);
        let check_cost: u64 = self.checkers.iter().filter_map(|&i| self.stats[i].as_ref()).map(|s| s.check_cost).sum();
        let next_cost = self.stats[producer].as_ref().map_or(1, |s| s.next_cost) + check_cost;
        let sorted = self.stats[producer].as_ref().is_some_and(|s| s.sorted);

        IterOutcome::Done(Stats {
            n,
            check_cost: check_cost.max(1),
            next_cost,
            find_cost: next_cost,
            sorted,
            ordered: false,
            ordering: None,
        })
    }

    fn reset(&mut self) {
        for sub in &mut self.subs {
            sub.reset();
        }
        self.pending = None;
    }

    fn box_clone(&self) -> Box<dyn Cursor0> {
        Box::new(Self {
            subs: self.subs.iter().map(|s| s.box_clone()).collect(),
            dir: self.dir,
            stats: self.stats.clone(),
            plan_cursor: self.plan_cursor,
            producer: self.producer,
            checkers: self.checkers.clone(),
            check_order: self.check_order.clone(),
            pending: self.pending,
        })
    }

    fn freeze(&self, flags: FreezeFlags) -> String {
        let parts: Vec<String> = self.subs.iter().map(|s| s.freeze(flags)).collect();
        format!("and({})", parts.join(","))
    }
}
