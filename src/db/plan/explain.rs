//! Supplemental: a human-readable rendering of a compiled iterator tree,
//! for diagnostics and test assertions. Not part of the wire protocol.

use crate::budget::Budget;
use crate::db::iter::{Cursor0, FreezeFlags};

/// Renders `iter`'s frozen `SET` text plus its reported statistics, a
/// cheap stand-in for a real query-plan visualizer.
#[must_use]
pub fn explain(iter: &mut dyn Cursor0, budget: &mut Budget) -> String {
    let set_text = iter.freeze(FreezeFlags::SET);
    match iter.statistics(budget) {
        crate::budget::IterOutcome::Done(stats) => format!(
            "{set_text} [n={} sorted={} next_cost={} check_cost={}]",
            stats.n, stats.sorted, stats.next_cost, stats.check_cost
        ),
        crate::budget::IterOutcome::NeedsBudget => format!("{set_text} [statistics: needs more budget]"),
        crate::budget::IterOutcome::EndOfIteration => format!("{set_text} [statistics: unavailable]"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::iter::NullIter;

    #[test]
    fn explain_includes_set_text_and_stats() {
        let mut budget = Budget::new(100);
        let mut iter = NullIter::new();

        let rendered = explain(&mut iter, &mut budget);

        assert!(rendered.starts_with("null()"));
        assert!(rendered.contains("n=0"));
    }
}
