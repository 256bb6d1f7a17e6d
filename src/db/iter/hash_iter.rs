use super::{Cursor0, Direction, FreezeFlags, IterKind, Stats, StoreHandle};
use crate::budget::{BASE_STEP_COST, Budget, IterOutcome};
use crate::db::primitives::{HashKind, IdRange};
use crate::types::PdbId;

///
/// HashIter
/// Delegates to the store's hash index for exact-value and exact-name
/// lookups. The store owns the real index; this wraps its
/// returned cursor so `and`/`or` can treat it like any other variant.
///

pub struct HashIter {
    store: StoreHandle,
    kind: HashKind,
    key: Vec<u8>,
    range: IdRange,
    dir: Direction,
    inner: Box<dyn Cursor0>,
}

impl HashIter {
    #[must_use]
    pub fn new(store: StoreHandle, kind: HashKind, key: Vec<u8>, range: IdRange, dir: Direction) -> Self {
        let inner = store.hash_iterator(kind, &key, range, dir);
        Self { store, kind, key, range, dir, inner }
    }
}

impl Cursor0 for HashIter {
    fn kind(&self) -> IterKind {
        IterKind::Hash
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
        self.inner = self.store.hash_iterator(self.kind, &self.key, self.range, self.dir);
    }

    fn box_clone(&self) -> Box<dyn Cursor0> {
        Box::new(Self {
            store: self.store.clone(),
            kind: self.kind,
            key: self.key.clone(),
            range: self.range,
            dir: self.dir,
            inner: self.inner.box_clone(),
        })
    }

    fn freeze(&self, flags: FreezeFlags) -> String {
        let mut out = format!("hash({:?})", self.kind);
        if flags.contains(FreezeFlags::STATE) {
            out.push_str(&self.inner.freeze(flags));
        }
        out
    }
}
