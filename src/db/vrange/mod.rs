//! The value-range driver: iterates a closed value interval by
//! walking a comparator's bins, intersecting each bin with an optional
//! sorted filter (`internal_and`).

use crate::budget::{BASE_STEP_COST, Budget, IterOutcome};
use crate::db::comparator::Comparator;
use crate::db::iter::{Cursor0, Direction, FreezeFlags, Stats, StoreHandle};
use crate::db::primitives::{IdRange, StringBinSet};
use crate::error::{EngineError, ErrorOrigin};
use crate::types::PdbId;

/// One end of the `[lo, hi]` interval; `None` means unbounded.
#[derive(Clone, Debug)]
pub struct Endpoint {
    pub value: Option<String>,
    pub strict: bool,
}

impl Endpoint {
    #[must_use]
    pub const fn unbounded() -> Self {
        Self { value: None, strict: false }
    }

    #[must_use]
    pub const fn bounded(value: String, strict: bool) -> Self {
        Self { value: Some(value), strict }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Phase {
    Initial,
    Positioned,
    Eof,
}

///
/// VRangeDriver
/// State machine: `Start → Positioned → {Next advances bin} → Eof`.
///

pub struct VRangeDriver {
    store: StoreHandle,
    comparator: Box<dyn Comparator>,
    binset: StringBinSet,
    lo: Endpoint,
    hi: Endpoint,
    dir: Direction,
    range: IdRange,
    internal_and: Option<Box<dyn Cursor0>>,
    lo_bin: u64,
    hi_bin: u64,
    cur_bin: Option<u64>,
    cvit: Option<Box<dyn Cursor0>>,
    last_id: Option<PdbId>,
    phase: Phase,
}

impl VRangeDriver {
    #[must_use]
    pub fn new(
        store: StoreHandle,
        comparator: Box<dyn Comparator>,
        binset: StringBinSet,
        lo: Endpoint,
        hi: Endpoint,
        dir: Direction,
        range: IdRange,
        internal_and: Option<Box<dyn Cursor0>>,
    ) -> Self {
        Self {
            store,
            comparator,
            binset,
            lo,
            hi,
            dir,
            range,
            internal_and,
            lo_bin: 0,
            hi_bin: 0,
            cur_bin: None,
            cvit: None,
            last_id: None,
            phase: Phase::Initial,
        }
    }

    /// Computes `lo_bin`/`hi_bin` from the endpoint strings. `ERR_NO`
    /// immediately if `lo > hi` under the comparator's order.
    pub fn start(&mut self, budget: &mut Budget) -> IterOutcome<()> {
        if !budget.charge(BASE_STEP_COST) {
            return IterOutcome::NeedsBudget;
        }

        if let (Some(lo), Some(hi)) = (&self.lo.value, &self.hi.value) {
            if self.comparator.sort_compare(lo, hi) == std::cmp::Ordering::Greater {
                self.phase = Phase::Eof;
                return IterOutcome::EndOfIteration;
            }
        }

        // `store.bin_lookup` returns the lowest bin index whose boundary is
        // >= the probe value (the store's own dense bin space, not the
        // comparator's coarse byte partition). That index already excludes
        // every value below the endpoint; it only needs nudging forward
        // when the endpoint itself sits exactly on a bin boundary and
        // strictness says to exclude that boundary value.
        self.lo_bin = self.lo.value.as_deref().map_or(0, |v| self.store.bin_lookup(self.binset, v.as_bytes()));
        if self.lo.strict && self.lo.value.as_deref().is_some_and(|v| self.bin_boundary_is(self.lo_bin, v)) {
            self.lo_bin += 1;
        }

        let bin_end = self.store.bin_end(self.binset);
        self.hi_bin = self.hi.value.as_deref().map_or(bin_end, |v| self.store.bin_lookup(self.binset, v.as_bytes()));
        if !self.hi.strict && self.hi.value.as_deref().is_some_and(|v| self.bin_boundary_is(self.hi_bin, v)) {
            self.hi_bin += 1;
        }

        self.cur_bin = Some(if self.dir.is_forward() { self.lo_bin } else { self.hi_bin.saturating_sub(1) });
        self.phase = Phase::Positioned;

        IterOutcome::Done(())
    }

    /// True when `bin`'s boundary value is exactly `value`, i.e. the probe
    /// landed on a real bin rather than strictly between two of them.
    fn bin_boundary_is(&self, bin: u64, value: &str) -> bool {
        self.store.bin_value(self.binset, bin).as_deref() == Some(value.as_bytes())
    }

    fn cur_bin_in_range(&self) -> bool {
        match self.cur_bin {
            Some(b) => b >= self.lo_bin && b < self.hi_bin,
            None => false,
        }
    }

    fn build_bin_iter(&mut self, bin: u64, budget: &mut Budget) -> IterOutcome<()> {
        let raw = self
            .store
            .bin_to_iterator(self.binset, bin, self.range, self.dir, false);

        self.cvit = Some(match self.internal_and.as_ref() {
            Some(filter) => Box::new(crate::db::iter::AndIter::new(
                vec![raw, filter.box_clone()],
                self.dir,
            )),
            None => raw,
        });

        let _ = budget;
        IterOutcome::Done(())
    }

    fn advance_bin(&mut self) -> bool {
        let next = match self.cur_bin {
            Some(b) if self.dir.is_forward() => b + 1,
            Some(b) => match b.checked_sub(1) {
                Some(v) => v,
                None => {
                    self.phase = Phase::Eof;
                    return false;
                }
            },
            None => {
                self.phase = Phase::Eof;
                return false;
            }
        };
        self.cur_bin = Some(next);
        if !self.cur_bin_in_range() {
            self.phase = Phase::Eof;
            return false;
        }
        true
    }

    /// Drains the current bin; on exhaustion advances `cur_bin` in the
    /// iteration direction and retries.
    pub fn next(&mut self, budget: &mut Budget) -> IterOutcome<PdbId> {
        if self.phase == Phase::Initial {
            match self.start(budget) {
                IterOutcome::Done(()) => {}
                other => return other.map(|()| unreachable!()),
            }
        }

        loop {
            if self.phase == Phase::Eof {
                return IterOutcome::EndOfIteration;
            }

            if !budget.charge(BASE_STEP_COST) {
                return IterOutcome::NeedsBudget;
            }

            if self.cvit.is_none() {
                if !self.cur_bin_in_range() {
                    self.phase = Phase::Eof;
                    return IterOutcome::EndOfIteration;
                }
                let bin = self.cur_bin.expect("range checked");
                if let IterOutcome::NeedsBudget = self.build_bin_iter(bin, budget) {
                    return IterOutcome::NeedsBudget;
                }
            }

            match self.cvit.as_mut().expect("built above").next(budget) {
                IterOutcome::Done(id) => {
                    self.last_id = Some(id);
                    return IterOutcome::Done(id);
                }
                IterOutcome::NeedsBudget => return IterOutcome::NeedsBudget,
                IterOutcome::EndOfIteration => {
                    self.cvit = None;
                    if !self.advance_bin() {
                        return IterOutcome::EndOfIteration;
                    }
                }
            }
        }
    }

    /// `total_ids ≈ (hi_bin - lo_bin) * (1 + N / (bin_count * 2))`.
    pub fn statistics(&mut self, _budget: &mut Budget) -> IterOutcome<Stats> {
        if self.phase == Phase::Initial {
            self.lo_bin = 0;
            self.hi_bin = self.store.bin_end(self.binset);
        }

        let bin_span = self.hi_bin.saturating_sub(self.lo_bin);
        let bin_count = self.comparator.bin_count().max(1);
        let n = bin_span.saturating_mul(1 + bin_span / (bin_count * 2).max(1));
        let extra = if self.internal_and.is_some() { 2 } else { 0 };

        IterOutcome::Done(Stats {
            n,
            check_cost: 2 + extra,
            next_cost: 1 + extra,
            find_cost: 2 + extra,
            sorted: true,
            ordered: true,
            ordering: Some("value".to_owned()),
        })
    }

    /// Find the bin containing `value`, build its iterator, fast-forward
    /// past `id`; position `cur_bin` so a following `next` moves on.
    pub fn seek(&mut self, value: &str, id: PdbId, budget: &mut Budget) -> IterOutcome<PdbId> {
        if !budget.charge(BASE_STEP_COST) {
            return IterOutcome::NeedsBudget;
        }

        let bin = self.store.bin_lookup(self.binset, value.as_bytes());
        self.cur_bin = Some(bin);
        self.phase = Phase::Positioned;

        if let IterOutcome::NeedsBudget = self.build_bin_iter(bin, budget) {
            return IterOutcome::NeedsBudget;
        }

        match self.cvit.as_mut().expect("built above").find(id, budget) {
            IterOutcome::Done(found) if found == id => self.next(budget),
            IterOutcome::Done(found) => {
                self.last_id = Some(found);
                IterOutcome::Done(found)
            }
            IterOutcome::EndOfIteration => {
                self.cvit = None;
                if self.advance_bin() { self.next(budget) } else { IterOutcome::EndOfIteration }
            }
            IterOutcome::NeedsBudget => IterOutcome::NeedsBudget,
        }
    }

    /// True iff `value` lies past this driver's current position in its
    /// direction (used by `beyond`).
    #[must_use]
    pub fn value_in_range(&self, value: &str) -> bool {
        let past_lo = self.lo.value.as_deref().is_none_or(|lo| {
            let c = self.comparator.sort_compare(value, lo);
            if self.lo.strict { c.is_gt() } else { c.is_ge() }
        });
        let before_hi = self.hi.value.as_deref().is_none_or(|hi| {
            let c = self.comparator.sort_compare(value, hi);
            if self.hi.strict { c.is_lt() } else { c.is_le() }
        });
        past_lo && before_hi
    }

    /// `cur_bin` plus comparator-private state.
    #[must_use]
    pub fn freeze(&self, flags: FreezeFlags) -> String {
        let mut out = format!(
            "vrange({},{})",
            self.lo.value.as_deref().unwrap_or(""),
            self.hi.value.as_deref().unwrap_or("")
        );
        if flags.contains(FreezeFlags::STATE) {
            out.push_str(&format!("/bin={}", self.cur_bin.unwrap_or(self.lo_bin)));
        }
        if flags.contains(FreezeFlags::POSITION) {
            match self.last_id {
                Some(id) => out.push_str(&format!("/{}", id.get())),
                None => out.push_str("/$"),
            }
        }
        out
    }

    /// Parses `cur_bin`, validating `lo_bin - 1 <= cur_bin <= hi_bin + 1`
    /// (open design question: whether to tolerate the transient
    /// `cur_bin == hi_bin + 1` one step past the last bin). Any lexical
    /// error falls back to position recovery via `last_id`.
    /// An independent copy sharing no mutable state: the current bin
    /// iterator is dropped and rebuilt lazily on the next `next` call,
    /// matching the original/clone split (only the original keeps
    /// the live bin cursor; a fresh copy re-derives it from `cur_bin`).
    #[must_use]
    pub fn box_clone(&self) -> Box<Self> {
        Box::new(Self {
            store: self.store.clone(),
            comparator: self.comparator.box_clone(),
            binset: self.binset,
            lo: self.lo.clone(),
            hi: self.hi.clone(),
            dir: self.dir,
            range: self.range,
            internal_and: self.internal_and.as_ref().map(|i| i.box_clone()),
            lo_bin: self.lo_bin,
            hi_bin: self.hi_bin,
            cur_bin: self.cur_bin,
            cvit: None,
            last_id: self.last_id,
            phase: self.phase,
        })
    }

    pub fn thaw_state(&mut self, cur_bin_text: &str) -> Result<(), EngineError> {
        let bin: u64 = cur_bin_text
            .parse()
            .map_err(|_| EngineError::lexical(ErrorOrigin::VRange, "malformed vrange cur_bin"))?;

        if self.phase == Phase::Initial {
            let mut budget = Budget::new(BASE_STEP_COST);
            let _ = self.start(&mut budget);
        }

        if bin + 1 < self.lo_bin || bin > self.hi_bin + 1 {
            return Err(EngineError::lexical(ErrorOrigin::VRange, "vrange cur_bin out of range"));
        }

        self.cur_bin = Some(bin);
        self.phase = if bin >= self.hi_bin { Phase::Eof } else { Phase::Positioned };
        self.cvit = None;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::comparator::DefaultComparator;
    use crate::db::iter::NullIter;
    use std::rc::Rc;

    struct FakeStore {
        end: u64,
    }

    impl crate::db::primitives::PrimitiveStore for FakeStore {
        fn id_read(&self, _id: PdbId) -> Result<crate::db::primitives::Primitive, EngineError> {
            unimplemented!()
        }
        fn hash_iterator(
            &self,
            _kind: crate::db::primitives::HashKind,
            _key: &[u8],
            _range: IdRange,
            _dir: Direction,
        ) -> Box<dyn Cursor0> {
            Box::new(NullIter::new())
        }
        fn word_iterator(&self, _word: &str, _range: IdRange, _dir: Direction) -> Box<dyn Cursor0> {
            Box::new(NullIter::new())
        }
        fn bin_lookup(&self, _binset: StringBinSet, _value: &[u8]) -> u64 {
            0
        }
        fn bin_to_iterator(
            &self,
            _binset: StringBinSet,
            _bin: u64,
            _range: IdRange,
            _dir: Direction,
            _error_if_null: bool,
        ) -> Box<dyn Cursor0> {
            Box::new(NullIter::new())
        }
        fn bin_value(&self, _binset: StringBinSet, _bin: u64) -> Option<Vec<u8>> {
            None
        }
        fn bin_end(&self, _binset: StringBinSet) -> u64 {
            self.end
        }
        fn generation_nth(&self, guid: crate::types::Guid, _oldest: bool, _offset: u64) -> Result<crate::types::Guid, EngineError> {
            Ok(guid)
        }
        fn generation_last_n(&self, _guid: crate::types::Guid) -> Result<(PdbId, u64), EngineError> {
            Ok((PdbId::ZERO, 0))
        }
        fn iterator_find_nonstep(&self, _iter: &mut dyn Cursor0, _id: PdbId) -> Option<PdbId> {
            None
        }
    }

    #[test]
    fn empty_interval_is_eof_on_start() {
        let store: StoreHandle = Rc::new(FakeStore { end: 10 });
        let mut driver = VRangeDriver::new(
            store,
            Box::new(DefaultComparator),
            StringBinSet::Strings,
            Endpoint::bounded("z".to_owned(), false),
            Endpoint::bounded("a".to_owned(), false),
            Direction::Forward,
            IdRange::new(PdbId::ZERO, PdbId::new(100)),
            None,
        );
        let mut budget = Budget::new(10);

        assert_eq!(driver.start(&mut budget), IterOutcome::EndOfIteration);
    }

    #[test]
    fn value_in_range_respects_strictness() {
        let store: StoreHandle = Rc::new(FakeStore { end: 10 });
        let driver = VRangeDriver::new(
            store,
            Box::new(DefaultComparator),
            StringBinSet::Strings,
            Endpoint::bounded("m".to_owned(), true),
            Endpoint::bounded("p".to_owned(), true),
            Direction::Forward,
            IdRange::new(PdbId::ZERO, PdbId::new(100)),
            None,
        );

        assert!(driver.value_in_range("melon"));
        assert!(!driver.value_in_range("m"));
        assert!(!driver.value_in_range("p"));
    }
}
