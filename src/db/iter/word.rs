use super::{Cursor0, Direction, FreezeFlags, IterKind, Stats, StoreHandle};
use crate::budget::{BASE_STEP_COST, Budget, IterOutcome};
use crate::db::primitives::IdRange;
use crate::types::PdbId;

///
/// WordIter
/// Delegates to the store's word index, backing `~=` substring search and
/// prefix completion.
///

pub struct WordIter {
    store: StoreHandle,
    word: String,
    range: IdRange,
    dir: Direction,
    inner: Box<dyn Cursor0>,
}

impl WordIter {
    #[must_use]
    pub fn new(store: StoreHandle, word: String, range: IdRange, dir: Direction) -> Self {
        let inner = store.word_iterator(&word, range, dir);
        Self { store, word, range, dir, inner }
    }
}

impl Cursor0 for WordIter {
    fn kind(&self) -> IterKind {
        IterKind::Word
    }

    fn direction(&self) -> Direction {
        self.dir
    }

    fn next(&mut self, budget: &mut Budget) -> IterOutcome<PdbId> {
        if !budget.charge(BASE_STEP_COST) {
            return IterOutcome::NeedsBudget;
        }
        self.inner.next(budget)
    }

    fn find(&mut self, in_id: PdbId, budget: &mut Budget) -> IterOutcome<PdbId> {
        self.inner.find(in_id, budget)
    }

    fn check(&mut self, id: PdbId, budget: &mut Budget) -> IterOutcome<()> {
        self.inner.check(id, budget)
    }

    fn statistics(&mut self, budget: &mut Budget) -> IterOutcome<Stats> {
        self.inner.statistics(budget)
    }

    fn reset(&mut self) {
        self.inner = self.store.word_iterator(&self.word, self.range, self.dir);
    }

    fn box_clone(&self) -> Box<dyn Cursor0> {
        Box::new(Self {
            store: self.store.clone(),
            word: self.word.clone(),
            range: self.range,
            dir: self.dir,
            inner: self.inner.box_clone(),
        })
    }

    fn freeze(&self, flags: FreezeFlags) -> String {
        let mut out = format!("word({})", self.word);
        if flags.contains(FreezeFlags::STATE) {
            out.push_str(&self.inner.freeze(flags));
        }
        out
    }
}
