use super::{Cursor0, Direction, FreezeFlags, IterKind, Stats, StoreHandle};
use crate::budget::{BASE_STEP_COST, Budget, IterOutcome};
use crate::db::primitives::IdRange;
use crate::types::PdbId;

///
/// PrefixField
/// Which primitive attribute a `prefix` iterator matches against.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PrefixField {
    Name,
    Value,
}

///
/// PrefixIter
/// Composite iterator for prefix search: the store's word
/// index narrows to candidates sharing the prefix's leading word, then
/// this wrapper post-filters on the exact field to confirm the prefix
/// (the word index is word-granular, not prefix-granular).
///

pub struct PrefixIter {
    store: StoreHandle,
    field: PrefixField,
    prefix: String,
    range: IdRange,
    dir: Direction,
    inner: Box<dyn Cursor0>,
}

impl PrefixIter {
    #[must_use]
    pub fn new(store: StoreHandle, field: PrefixField, prefix: String, range: IdRange, dir: Direction) -> Self {
        let inner = store.word_iterator(&prefix, range, dir);
        Self { store, field, prefix, range, dir, inner }
    }

    fn field_value(&self, primitive: &crate::db::primitives::Primitive) -> Option<String> {
        match self.field {
            PrefixField::Name => Some(primitive.name.clone()),
            PrefixField::Value => primitive.value.clone(),
        }
    }
}

impl Cursor0 for PrefixIter {
    fn kind(&self) -> IterKind {
        IterKind::Prefix
    }

    fn direction(&self) -> Direction {
        self.dir
    }

    fn next(&mut self, budget: &mut Budget) -> IterOutcome<PdbId> {
        loop {
            if !budget.charge(BASE_STEP_COST) {
                return IterOutcome::NeedsBudget;
            }

            match self.inner.next(budget) {
                IterOutcome::Done(id) => match self.store.id_read(id) {
                    Ok(primitive) => {
                        if self.field_value(&primitive).is_some_and(|v| v.starts_with(&self.prefix)) {
                            return IterOutcome::Done(id);
                        }
                    }
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

        match self.store.id_read(id) {
            Ok(primitive) if self.field_value(&primitive).is_some_and(|v| v.starts_with(&self.prefix)) => {
                IterOutcome::Done(())
            }
            _ => IterOutcome::EndOfIteration,
        }
    }

    fn statistics(&mut self, budget: &mut Budget) -> IterOutcome<Stats> {
        self.inner.statistics(budget).map(|mut stats| {
            stats.next_cost += 1;
            stats
        })
    }

    fn reset(&mut self) {
        self.inner = self.store.word_iterator(&self.prefix, self.range, self.dir);
    }

    fn box_clone(&self) -> Box<dyn Cursor0> {
        Box::new(Self {
            store: self.store.clone(),
            field: self.field,
            prefix: self.prefix.clone(),
            range: self.range,
            dir: self.dir,
            inner: self.inner.box_clone(),
        })
    }

    fn freeze(&self, flags: FreezeFlags) -> String {
        let mut out = format!("prefix({:?},{})", self.field, self.prefix);
        if flags.contains(FreezeFlags::STATE) {
            out.push_str(&self.inner.freeze(flags));
        }
        out
    }
}
