use super::{Cursor0, Direction, FreezeFlags, IterKind, Stats};
use crate::budget::{BASE_STEP_COST, Budget, IterOutcome};
use crate::types::PdbId;
use std::collections::HashSet;

///
/// OrIter
/// Sorted union over sub-iterators. When every sub is sorted
/// the merge emits in order with one `next` call per sub per step; if any
/// sub is unsorted, the whole iterator degrades to unsorted emission with
/// hash-based deduplication against IDs already returned.
///

enum Strategy {
    /// One pending peeked value per sub (`None` once that sub is
    /// exhausted); the merge emits the extreme value in `dir`.
    Merge(Vec<Option<PdbId>>),
    /// Linear scan of subs in order, deduplicating via `seen`.
    Scan { active: usize, seen: HashSet<PdbId> },
}

pub struct OrIter {
    subs: Vec<Box<dyn Cursor0>>,
    dir: Direction,
    sorted: Option<bool>,
    strategy: Option<Strategy>,
}

impl OrIter {
    #[must_use]
    pub fn new(subs: Vec<Box<dyn Cursor0>>, dir: Direction) -> Self {
        Self { subs, dir, sorted: None, strategy: None }
    }

    fn ensure_sortedness(&mut self, budget: &mut Budget) -> IterOutcome<bool> {
        if let Some(sorted) = self.sorted {
            return IterOutcome::Done(sorted);
        }

        let mut sorted = true;
        for sub in &mut self.subs {
            match sub.statistics(budget) {
                IterOutcome::Done(stats) => sorted &= stats.sorted,
                IterOutcome::NeedsBudget => return IterOutcome::NeedsBudget,
                IterOutcome::EndOfIteration => return IterOutcome::EndOfIteration,
            }
        }

        self.sorted = Some(sorted);
        IterOutcome::Done(sorted)
    }

    fn ensure_strategy(&mut self, budget: &mut Budget) -> IterOutcome<()> {
        if self.strategy.is_some() {
            return IterOutcome::Done(());
        }

        let sorted = match self.ensure_sortedness(budget) {
            IterOutcome::Done(s) => s,
            IterOutcome::NeedsBudget => return IterOutcome::NeedsBudget,
            IterOutcome::EndOfIteration => return IterOutcome::EndOfIteration,
        };

        self.strategy = Some(if sorted {
            Strategy::Merge(vec![None; self.subs.len()])
        } else {
            Strategy::Scan { active: 0, seen: HashSet::new() }
        });

        IterOutcome::Done(())
    }

    fn extreme(&self, a: PdbId, b: PdbId) -> PdbId {
        if self.dir.is_forward() { a.min(b) } else { a.max(b) }
    }
}

impl Cursor0 for OrIter {
    fn kind(&self) -> IterKind {
        IterKind::Or
    }

    fn direction(&self) -> Direction {
        self.dir
    }

    fn next(&mut self, budget: &mut Budget) -> IterOutcome<PdbId> {
        if !budget.charge(BASE_STEP_COST) {
            return IterOutcome::NeedsBudget;
        }

        if let IterOutcome::NeedsBudget = self.ensure_strategy(budget) {
            return IterOutcome::NeedsBudget;
        }

        // Taken out of `self` for the duration so `self.subs`/`self.extreme`
        // can be borrowed independently of the strategy's own state.
        let mut strategy = self.strategy.take().expect("strategy ensured");

        let result = match &mut strategy {
            Strategy::Merge(peeked) => {
                for (i, slot) in peeked.iter_mut().enumerate() {
                    if slot.is_none() {
                        match self.subs[i].next(budget) {
                            IterOutcome::Done(id) => *slot = Some(id),
                            IterOutcome::EndOfIteration => {}
                            IterOutcome::NeedsBudget => {
                                self.strategy = Some(strategy);
                                return IterOutcome::NeedsBudget;
                            }
                        }
                    }
                }

                let winner = peeked
                    .iter()
                    .enumerate()
                    .filter_map(|(i, v)| v.map(|id| (i, id)))
                    .reduce(|a, b| if self.extreme(a.1, b.1) == a.1 { a } else { b });

                match winner {
                    Some((winner_idx, id)) => {
                        for (j, slot) in peeked.iter_mut().enumerate() {
                            if j == winner_idx || *slot == Some(id) {
                                *slot = None;
                            }
                        }
                        IterOutcome::Done(id)
                    }
                    None => IterOutcome::EndOfIteration,
                }
            }
            Strategy::Scan { active, seen } => loop {
                if *active >= self.subs.len() {
                    break IterOutcome::EndOfIteration;
                }
                match self.subs[*active].next(budget) {
                    IterOutcome::Done(id) => {
                        if seen.insert(id) {
                            break IterOutcome::Done(id);
                        }
                    }
                    IterOutcome::EndOfIteration => *active += 1,
                    IterOutcome::NeedsBudget => {
                        self.strategy = Some(strategy);
                        return IterOutcome::NeedsBudget;
                    }
                }
            },
        };

        self.strategy = Some(strategy);
        result
    }

    fn check(&mut self, id: PdbId, budget: &mut Budget) -> IterOutcome<()> {
        if !budget.charge(BASE_STEP_COST) {
            return IterOutcome::NeedsBudget;
        }

        for sub in &mut self.subs {
            match sub.check(id, budget) {
                IterOutcome::Done(()) => return IterOutcome::Done(()),
                IterOutcome::EndOfIteration => continue,
                IterOutcome::NeedsBudget => return IterOutcome::NeedsBudget,
            }
        }

        IterOutcome::EndOfIteration
    }

    fn statistics(&mut self, budget: &mut Budget) -> IterOutcome<Stats> {
        let sorted = match self.ensure_sortedness(budget) {
            IterOutcome::Done(s) => s,
            IterOutcome::NeedsBudget => return IterOutcome::NeedsBudget,
            IterOutcome::EndOfIteration => return IterOutcome::EndOfIteration,
        };

        let mut n = 0u64;
        let mut check_cost = 0u64;
        for sub in &mut self.subs {
            match sub.statistics(budget) {
                IterOutcome::Done(stats) => {
                    n += stats.n;
                    check_cost += stats.check_cost;
                }
                IterOutcome::NeedsBudget => return IterOutcome::NeedsBudget,
                IterOutcome::EndOfIteration => return IterOutcome::EndOfIteration,
            }
        }

        IterOutcome::Done(Stats {
            n,
            check_cost: check_cost.max(1),
            next_cost: self.subs.len().max(1) as u64,
            find_cost: self.subs.len().max(1) as u64,
            sorted,
            ordered: false,
            ordering: None,
        })
    }

    fn reset(&mut self) {
        for sub in &mut self.subs {
            sub.reset();
        }
        self.strategy = None;
    }

    fn box_clone(&self) -> Box<dyn Cursor0> {
        Box::new(Self {
            subs: self.subs.iter().map(|s| s.box_clone()).collect(),
            dir: self.dir,
            sorted: self.sorted,
            strategy: None,
        })
    }

    fn freeze(&self, flags: FreezeFlags) -> String {
        let parts: Vec<String> = self.subs.iter().map(|s| s.freeze(flags)).collect();
        format!("or({})", parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::iter::FixedIter;

    #[test]
    fn merges_sorted_subs_without_duplicates() {
        let mut budget = Budget::new(1000);
        let a = Box::new(FixedIter::new(vec![PdbId::new(1), PdbId::new(3)], Direction::Forward));
        let b = Box::new(FixedIter::new(vec![PdbId::new(2), PdbId::new(3)], Direction::Forward));
        let mut or_iter = OrIter::new(vec![a, b], Direction::Forward);

        let mut seen = Vec::new();
        while let IterOutcome::Done(id) = or_iter.next(&mut budget) {
            seen.push(id.get());
        }

        assert_eq!(seen, vec![1, 2, 3]);
    }
}
