use super::{Cursor0, Direction, FreezeFlags, IterKind, Stats};
use crate::budget::{BASE_STEP_COST, Budget, IterOutcome};
use crate::types::PdbId;

///
/// FixedIter
/// A sorted, deduplicated array of IDs known in advance. Used for literal
/// GUID lists and as the terminal leaf of constraint compilation when a
/// clause resolves to an explicit set.
///

#[derive(Clone, Debug)]
pub struct FixedIter {
    ids: Vec<PdbId>,
    dir: Direction,
    pos: Option<usize>,
}

impl FixedIter {
    /// `ids` is sorted and deduplicated in forward order regardless of
    /// `dir`; traversal direction only affects emission order.
    #[must_use]
    pub fn new(mut ids: Vec<PdbId>, dir: Direction) -> Self {
        ids.sort_unstable();
        ids.dedup();
        Self { ids, dir, pos: None }
    }

    const fn len(&self) -> usize {
        self.ids.len()
    }

    fn start_index(&self) -> Option<usize> {
        if self.ids.is_empty() {
            None
        } else if self.dir.is_forward() {
            Some(0)
        } else {
            Some(self.len() - 1)
        }
    }

    fn step(&self, from: usize) -> Option<usize> {
        if self.dir.is_forward() {
            (from + 1 < self.len()).then_some(from + 1)
        } else {
            from.checked_sub(1)
        }
    }
}

impl Cursor0 for FixedIter {
    fn kind(&self) -> IterKind {
        IterKind::Fixed
    }

    fn direction(&self) -> Direction {
        self.dir
    }

    fn next(&mut self, budget: &mut Budget) -> IterOutcome<PdbId> {
        if !budget.charge(BASE_STEP_COST) {
            return IterOutcome::NeedsBudget;
        }

        let next_index = match self.pos {
            None => self.start_index(),
            Some(p) => self.step(p),
        };

        match next_index {
            Some(idx) => {
                self.pos = Some(idx);
                IterOutcome::Done(self.ids[idx])
            }
            None => IterOutcome::EndOfIteration,
        }
    }

    fn find(&mut self, in_id: PdbId, budget: &mut Budget) -> IterOutcome<PdbId> {
        if !budget.charge(BASE_STEP_COST) {
            return IterOutcome::NeedsBudget;
        }

        let idx = if self.dir.is_forward() {
            self.ids.partition_point(|&id| id < in_id)
        } else {
            match self.ids.iter().rposition(|&id| id <= in_id) {
                Some(i) => i,
                None => {
                    self.pos = None;
                    return IterOutcome::EndOfIteration;
                }
            }
        };

        if idx >= self.len() {
            self.pos = Some(self.len());
            return IterOutcome::EndOfIteration;
        }

        self.pos = Some(idx);
        IterOutcome::Done(self.ids[idx])
    }

    fn check(&mut self, id: PdbId, budget: &mut Budget) -> IterOutcome<()> {
        if !budget.charge(BASE_STEP_COST) {
            return IterOutcome::NeedsBudget;
        }

        if self.ids.binary_search(&id).is_ok() {
            IterOutcome::Done(())
        } else {
            IterOutcome::EndOfIteration
        }
    }

    fn statistics(&mut self, _budget: &mut Budget) -> IterOutcome<Stats> {
        IterOutcome::Done(Stats {
            n: self.len() as u64,
            check_cost: 1,
            next_cost: 1,
            find_cost: 1,
            sorted: true,
            ordered: false,
            ordering: None,
        })
    }

    fn reset(&mut self) {
        self.pos = None;
    }

    fn box_clone(&self) -> Box<dyn Cursor0> {
        Box::new(self.clone())
    }

    fn freeze(&self, flags: FreezeFlags) -> String {
        let mut out = String::from("fixed(");
        if flags.contains(FreezeFlags::SET) {
            let ids: Vec<String> = self.ids.iter().map(|id| id.get().to_string()).collect();
            out.push_str(&ids.join(","));
        }
        out.push(')');
        if flags.contains(FreezeFlags::POSITION) {
            match self.pos {
                Some(p) if p < self.len() => out.push_str(&format!("/{}", self.ids[p].get())),
                _ => out.push_str("/$"),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u64]) -> Vec<PdbId> {
        raw.iter().copied().map(PdbId::new).collect()
    }

    #[test]
    fn deduplicates_and_sorts_on_construction() {
        let mut budget = Budget::new(100);
        let mut it = FixedIter::new(ids(&[5, 1, 1, 3]), Direction::Forward);
        let mut seen = Vec::new();

        while let IterOutcome::Done(id) = it.next(&mut budget) {
            seen.push(id.get());
        }

        assert_eq!(seen, vec![1, 3, 5]);
    }

    #[test]
    fn backward_traversal_reverses_order() {
        let mut budget = Budget::new(100);
        let mut it = FixedIter::new(ids(&[1, 3, 5]), Direction::Backward);
        let mut seen = Vec::new();

        while let IterOutcome::Done(id) = it.next(&mut budget) {
            seen.push(id.get());
        }

        assert_eq!(seen, vec![5, 3, 1]);
    }

    #[test]
    fn find_positions_at_or_past_target() {
        let mut budget = Budget::new(100);
        let mut it = FixedIter::new(ids(&[1, 3, 5, 7]), Direction::Forward);

        assert_eq!(it.find(PdbId::new(4), &mut budget), IterOutcome::Done(PdbId::new(5)));
        assert_eq!(it.next(&mut budget), IterOutcome::Done(PdbId::new(7)));
    }

    #[test]
    fn check_does_not_disturb_position() {
        let mut budget = Budget::new(100);
        let mut it = FixedIter::new(ids(&[1, 3, 5]), Direction::Forward);

        assert_eq!(it.next(&mut budget), IterOutcome::Done(PdbId::new(1)));
        assert_eq!(it.check(PdbId::new(5), &mut budget), IterOutcome::Done(()));
        assert_eq!(it.check(PdbId::new(4), &mut budget), IterOutcome::EndOfIteration);
        assert_eq!(it.next(&mut budget), IterOutcome::Done(PdbId::new(3)));
    }
}
