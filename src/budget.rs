//! Cooperative scheduling primitives: a decrementing work allowance and the
//! two iteration-control outcomes (`ERR_NO`, `ERR_MORE`) that every
//! suspendable operation in `db::iter` communicates through.

///
/// Budget
///
/// An in/out integer work allowance. Every iterator operation charges it an
/// implementation-defined, constant per-call cost before doing any real
/// work; an operation that cannot make progress within the remaining
/// budget must leave it untouched (not negative) and return
/// `IterOutcome::NeedsBudget`.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Budget(u64);

impl Budget {
    #[must_use]
    pub const fn new(units: u64) -> Self {
        Self(units)
    }

    #[must_use]
    pub const fn remaining(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn is_exhausted(self) -> bool {
        self.0 == 0
    }

    /// Charge `cost` units. Returns `false` (and leaves the budget
    /// unchanged) when the charge cannot be afforded; callers must treat
    /// that as `IterOutcome::NeedsBudget` and preserve their position.
    #[must_use]
    pub fn charge(&mut self, cost: u64) -> bool {
        match self.0.checked_sub(cost) {
            Some(remaining) => {
                self.0 = remaining;
                true
            }
            None => false,
        }
    }

    /// Top up the allowance, e.g. when the scheduler resumes a suspended
    /// request with a fresh grant.
    pub fn replenish(&mut self, units: u64) {
        self.0 = self.0.saturating_add(units);
    }
}

/// Per-call cost charged by most iterator operations; variants that touch
/// more state (comparator bin construction, statistics) charge multiples
/// of this.
pub const BASE_STEP_COST: u64 = 1;

///
/// IterOutcome
///
/// The two iteration-control signals of the error-handling design,
/// `ERR_NO` and `ERR_MORE`, modeled as data rather than folded into
/// `EngineError`: they are not failures, and nearly every call site needs
/// to match on them directly.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IterOutcome<T> {
    /// The operation completed with `T`.
    Done(T),
    /// `ERR_NO`: end of iteration, or "no match". Never fatal.
    EndOfIteration,
    /// `ERR_MORE`: the budget was exhausted before completion. State is
    /// preserved; the caller retries with a fresh budget.
    NeedsBudget,
}

impl<T> IterOutcome<T> {
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::EndOfIteration)
    }

    #[must_use]
    pub const fn needs_budget(&self) -> bool {
        matches!(self, Self::NeedsBudget)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> IterOutcome<U> {
        match self {
            Self::Done(v) => IterOutcome::Done(f(v)),
            Self::EndOfIteration => IterOutcome::EndOfIteration,
            Self::NeedsBudget => IterOutcome::NeedsBudget,
        }
    }
}
