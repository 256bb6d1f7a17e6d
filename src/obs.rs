//! Structured logging and read-only evaluation diagnostics.
//!
//! Spans wrap compilation and suspension/resume; `EvaluationSnapshot` is a
//! read-only projection over an in-flight or completed evaluation, never
//! consulted by evaluation itself.

use tracing::Span;

/// Open a span for one constraint-tree compilation pass.
pub fn compile_span(root_or_index: usize) -> Span {
    tracing::debug_span!("compile", or_index = root_or_index)
}

/// Open a span for one resume of a suspended evaluation.
pub fn resume_span(request: u64) -> Span {
    tracing::trace_span!("resume", request)
}

/// Emit a warning when a cursor's STATE section fails to parse and the
/// engine downgrades to position-only recovery.
pub fn cursor_state_downgrade(reason: &str) {
    tracing::warn!(reason, "cursor STATE failed to parse; recovering from position");
}

///
/// EvaluationSnapshot
///
/// A read-only diagnostics projection over an evaluation: iterator kind
/// counts and budget consumed. Never consulted by evaluation itself.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EvaluationSnapshot {
    pub iterators_built: u64,
    pub budget_consumed: u64,
    pub suspensions: u64,
}

impl EvaluationSnapshot {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            iterators_built: 0,
            budget_consumed: 0,
            suspensions: 0,
        }
    }

    pub fn record_iterator_built(&mut self) {
        self.iterators_built += 1;
    }

    pub fn record_budget_consumed(&mut self, units: u64) {
        self.budget_consumed += units;
    }

    pub fn record_suspension(&mut self) {
        self.suspensions += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    #[test]
    fn spans_and_warning_emit_without_panicking() {
        init_tracing();

        let _compile = compile_span(0).entered();
        let _resume = resume_span(42).entered();
        cursor_state_downgrade("truncated STATE section");
    }

    #[test]
    fn snapshot_accumulates_recorded_counters() {
        let mut snapshot = EvaluationSnapshot::new();
        snapshot.record_iterator_built();
        snapshot.record_budget_consumed(10);
        snapshot.record_suspension();

        assert_eq!(snapshot.iterators_built, 1);
        assert_eq!(snapshot.budget_consumed, 10);
        assert_eq!(snapshot.suspensions, 1);
    }
}
