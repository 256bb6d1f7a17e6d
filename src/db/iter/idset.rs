use super::{Cursor0, Direction, FreezeFlags, IterKind, Stats, StoreHandle};
use crate::budget::{BASE_STEP_COST, Budget, IterOutcome};
use crate::types::PdbId;

///
/// IdSetIter
/// Wraps an externally supplied ordered ID set. Supports lazy
/// recovery: when thawed from position alone, `recovered` stays `false`
/// until the underlying ids are available and the position has been
/// re-seeked with `iterator_find_nonstep`.
///

pub struct IdSetIter {
    store: StoreHandle,
    ids: Vec<PdbId>,
    dir: Direction,
    pos: Option<usize>,
    recovered: bool,
}

impl IdSetIter {
    #[must_use]
    pub fn new(store: StoreHandle, mut ids: Vec<PdbId>, dir: Direction) -> Self {
        ids.sort_unstable();
        ids.dedup();
        Self { store, ids, dir, pos: None, recovered: true }
    }

    /// Build a set whose position is not yet recovered; the next `find`
    /// call will use `iterator_find_nonstep` to locate `last_id`.
    #[must_use]
    pub fn thawed(store: StoreHandle, mut ids: Vec<PdbId>, dir: Direction, last_id: Option<PdbId>) -> Self {
        ids.sort_unstable();
        ids.dedup();
        let pos = last_id.and_then(|id| ids.iter().position(|&x| x == id));
        let recovered = pos.is_some();
        Self { store, ids, dir, pos, recovered }
    }

    #[must_use]
    pub const fn is_recovered(&self) -> bool {
        self.recovered
    }

    fn start_index(&self) -> Option<usize> {
        if self.ids.is_empty() {
            None
        } else if self.dir.is_forward() {
            Some(0)
        } else {
            Some(self.ids.len() - 1)
        }
    }

    fn step(&self, from: usize) -> Option<usize> {
        if self.dir.is_forward() {
            (from + 1 < self.ids.len()).then_some(from + 1)
        } else {
            from.checked_sub(1)
        }
    }
}

impl Cursor0 for IdSetIter {
    fn kind(&self) -> IterKind {
        IterKind::IdSet
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
                self.recovered = true;
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
                    self.recovered = true;
                    return IterOutcome::EndOfIteration;
                }
            }
        };

        if idx >= self.ids.len() {
            self.pos = Some(self.ids.len());
            self.recovered = true;
            return IterOutcome::EndOfIteration;
        }

        self.pos = Some(idx);
        self.recovered = true;

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
            n: self.ids.len() as u64,
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
        Box::new(Self {
            store: self.store.clone(),
            ids: self.ids.clone(),
            dir: self.dir,
            pos: self.pos,
            recovered: self.recovered,
        })
    }

    fn freeze(&self, flags: FreezeFlags) -> String {
        let mut out = String::from("idset(");
        if flags.contains(FreezeFlags::SET) {
            let ids: Vec<String> = self.ids.iter().map(|id| id.get().to_string()).collect();
            out.push_str(&ids.join(","));
        }
        out.push(')');
        if flags.contains(FreezeFlags::POSITION) {
            match self.pos {
                Some(p) if p < self.ids.len() => out.push_str(&format!("/{}", self.ids[p].get())),
                _ => out.push_str("/$"),
            }
        }
        out
    }
}

#[allow(dead_code)]
fn recover_position(store: &StoreHandle, iter: &mut dyn Cursor0, id: PdbId) -> Option<PdbId> {
    store.iterator_find_nonstep(iter, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    struct NoopStore;

    impl crate::db::primitives::PrimitiveStore for NoopStore {
        fn id_read(&self, _id: PdbId) -> Result<crate::db::primitives::Primitive, crate::error::EngineError> {
            unimplemented!()
        }
        fn hash_iterator(
            &self,
            _kind: crate::db::primitives::HashKind,
            _key: &[u8],
            _range: crate::db::primitives::IdRange,
            _dir: Direction,
        ) -> Box<dyn Cursor0> {
            unimplemented!()
        }
        fn word_iterator(&self, _word: &str, _range: crate::db::primitives::IdRange, _dir: Direction) -> Box<dyn Cursor0> {
            unimplemented!()
        }
        fn bin_lookup(&self, _binset: crate::db::primitives::StringBinSet, _value: &[u8]) -> u64 {
            unimplemented!()
        }
        fn bin_to_iterator(
            &self,
            _binset: crate::db::primitives::StringBinSet,
            _bin: u64,
            _range: crate::db::primitives::IdRange,
            _dir: Direction,
            _error_if_null: bool,
        ) -> Box<dyn Cursor0> {
            unimplemented!()
        }
        fn bin_value(&self, _binset: crate::db::primitives::StringBinSet, _bin: u64) -> Option<Vec<u8>> {
            unimplemented!()
        }
        fn bin_end(&self, _binset: crate::db::primitives::StringBinSet) -> u64 {
            unimplemented!()
        }
        fn generation_nth(&self, _guid: crate::types::Guid, _oldest: bool, _offset: u64) -> Result<crate::types::Guid, crate::error::EngineError> {
            unimplemented!()
        }
        fn generation_last_n(&self, _guid: crate::types::Guid) -> Result<(PdbId, u64), crate::error::EngineError> {
            unimplemented!()
        }
        fn iterator_find_nonstep(&self, _iter: &mut dyn Cursor0, _id: PdbId) -> Option<PdbId> {
            None
        }
    }

    #[test]
    fn dedupes_and_sorts() {
        let mut budget = Budget::new(100);
        let store: StoreHandle = Rc::new(NoopStore);
        let mut it = IdSetIter::new(store, vec![PdbId::new(3), PdbId::new(1), PdbId::new(1)], Direction::Forward);
        let mut seen = Vec::new();

        while let IterOutcome::Done(id) = it.next(&mut budget) {
            seen.push(id.get());
        }

        assert_eq!(seen, vec![1, 3]);
    }

    #[test]
    fn thawed_without_last_id_is_not_recovered() {
        let store: StoreHandle = Rc::new(NoopStore);
        let it = IdSetIter::thawed(store, vec![PdbId::new(1)], Direction::Forward, None);

        assert!(!it.is_recovered());
    }
}
