//! Constraint compilation: turns a constraint subtree
//! into an iterator tree using the comparator and value-range driver.

mod explain;

pub use explain::explain;

use crate::arena::{Arena, ArenaIndex};
use crate::budget::{BASE_STEP_COST, Budget, IterOutcome};
use crate::db::comparator::{self, Comparator};
use crate::db::constraint::{ConstraintNode, GuidField, GuidOp, StringClause, StringField, StringOp};
use crate::db::guidset::GuidSet;
use crate::db::iter::{
    AllIter, AndIter, Cursor0, Direction, FixedIter, FreezeFlags, HashIter, IterKind, OrIter, PrefixField, PrefixIter, Stats,
    StoreHandle, WithoutValueIter, WordIter,
};
use crate::db::primitives::{HashKind, IdRange, Linkage, Primitive};
use crate::types::PdbId;

///
/// Planner
/// Compiles a constraint subtree into an iterator tree over a single
/// `PrimitiveStore`. One planner instance serves one request.
///

pub struct Planner {
    store: StoreHandle,
    comparator: Box<dyn Comparator>,
}

impl Planner {
    #[must_use]
    pub fn new(store: StoreHandle) -> Self {
        Self { store, comparator: Box::new(comparator::DefaultComparator) }
    }

    #[must_use]
    pub fn with_comparator(store: StoreHandle, comparator: Box<dyn Comparator>) -> Self {
        Self { store, comparator }
    }

    fn comparator_for(&self, name: Option<&str>) -> Box<dyn Comparator> {
        name.and_then(comparator::by_name).unwrap_or_else(|| self.comparator.box_clone())
    }

    /// Step 2: build the most restrictive indexed iterator available for
    /// one string clause.
    fn compile_string_clause(&self, clause: &StringClause, range: IdRange) -> Box<dyn Cursor0> {
        let cmp = self.comparator_for(clause.comparator.as_deref());

        match clause.op {
            StringOp::Eq if clause.field == StringField::Value && clause.value.is_empty() => {
                Box::new(WithoutValueIter::new(self.store.clone(), Box::new(AllIter::new(range, Direction::Forward))))
            }
            StringOp::Eq => {
                let kind = match clause.field {
                    StringField::Value => HashKind::Value,
                    StringField::Type => HashKind::Typeguid,
                    StringField::Name => HashKind::Name,
                };
                Box::new(HashIter::new(
                    self.store.clone(),
                    kind,
                    clause.value.as_bytes().to_vec(),
                    range,
                    Direction::Forward,
                ))
            }
            StringOp::Fuzzy => {
                if let Some(prefix) = simple_prefix(&clause.value) {
                    Box::new(PrefixIter::new(self.store.clone(), PrefixField::Value, prefix, range, Direction::Forward))
                } else {
                    let word = WordIter::new(self.store.clone(), leading_word(&clause.value), range, Direction::Forward);
                    Box::new(GlobCheckIter::new(self.store.clone(), cmp, clause.value.clone(), Box::new(word)))
                }
            }
            StringOp::Lt | StringOp::Le | StringOp::Gt | StringOp::Ge => {
                let (lo, hi) = match clause.op {
                    StringOp::Lt => (
                        crate::db::vrange::Endpoint::unbounded(),
                        crate::db::vrange::Endpoint::bounded(clause.value.clone(), true),
                    ),
                    StringOp::Le => (
                        crate::db::vrange::Endpoint::unbounded(),
                        crate::db::vrange::Endpoint::bounded(clause.value.clone(), false),
                    ),
                    StringOp::Gt => (
                        crate::db::vrange::Endpoint::bounded(clause.value.clone(), true),
                        crate::db::vrange::Endpoint::unbounded(),
                    ),
                    _ => (
                        crate::db::vrange::Endpoint::bounded(clause.value.clone(), false),
                        crate::db::vrange::Endpoint::unbounded(),
                    ),
                };
                let driver = crate::db::vrange::VRangeDriver::new(
                    self.store.clone(),
                    cmp,
                    crate::db::primitives::StringBinSet::Strings,
                    lo,
                    hi,
                    Direction::Forward,
                    range,
                    None,
                );
                Box::new(crate::db::iter::VRangeIter::new(driver, Direction::Forward))
            }
            StringOp::Ne => Box::new(AllIter::new(range, Direction::Forward)),
        }
    }

    /// Normalization + step 2 for one GUID clause: root-normalize on
    /// `~=`, enumerate the generation window exactly on `=`.
    fn compile_guid_clause(&self, field: GuidField, op: GuidOp, set: &GuidSet, range: IdRange) -> Box<dyn Cursor0> {
        let _ = field; // field selects which linkage the result feeds into a join; handled by the caller.

        let mut ids = Vec::new();
        for guid in set.ids() {
            let resolved = match op {
                GuidOp::Approx => self.store.generation_nth(*guid, true, 0).unwrap_or(*guid),
                GuidOp::Eq => *guid,
            };
            if let Ok((last_id, _n)) = self.store.generation_last_n(resolved) {
                if range.contains(last_id) {
                    ids.push(last_id);
                }
            }
        }

        Box::new(FixedIter::new(ids, Direction::Forward))
    }

    /// Step 3: join a compiled child iterator to its parent by the
    /// linkage field connecting them. The join reads each candidate
    /// parent-range ID's primitive and checks whether its linkage field
    /// names a GUID the child iterator would accept.
    fn join_by_linkage(&self, linkage: Linkage, child_guids: GuidSet, range: IdRange) -> Box<dyn Cursor0> {
        Box::new(LinkageJoinIter::new(self.store.clone(), linkage, child_guids, range))
    }

    /// Drains `iter` (consuming its own budget loop) into the `GuidSet`
    /// of GUIDs it would accept, for use as a join's right-hand side.
    fn guids_of(&self, mut iter: Box<dyn Cursor0>) -> GuidSet {
        let mut budget = Budget::new(u64::MAX / 2);
        let mut set = GuidSet::new();
        loop {
            match iter.next(&mut budget) {
                IterOutcome::Done(id) => {
                    if let Ok(primitive) = self.store.id_read(id) {
                        set.add(primitive.guid);
                    }
                }
                IterOutcome::EndOfIteration => break,
                IterOutcome::NeedsBudget => budget.replenish(u64::MAX / 2),
            }
        }
        set
    }

    /// Steps 1-5 for one constraint subtree, returning its compiled
    /// producer. `range` bounds the allowed ID range (step 4 fallback).
    pub fn compile(&self, arena: &Arena<ConstraintNode>, idx: ArenaIndex<ConstraintNode>, range: IdRange) -> Box<dyn Cursor0> {
        let node = arena.get(idx);

        if node.is_false {
            return Box::new(crate::db::iter::NullIter::new());
        }

        let mut subs: Vec<Box<dyn Cursor0>> = Vec::new();

        for clause in &node.string_clauses {
            subs.push(self.compile_string_clause(clause, range));
        }

        for clause in &node.guid_clauses {
            let iter = self.compile_guid_clause(clause.field, clause.op, &clause.set, range);
            subs.push(iter);
        }

        for &child_idx in &node.children {
            let child = arena.get(child_idx);
            if let Some(linkage) = child.linkage {
                let child_iter = self.compile(arena, child_idx, range);
                let child_guids = self.guids_of(child_iter);
                subs.push(self.join_by_linkage(linkage, child_guids, range));
            }
        }

        // Step 4: fallback when no index restriction exists.
        if subs.is_empty() {
            return Box::new(AllIter::new(range, Direction::Forward));
        }

        if subs.len() == 1 {
            return subs.into_iter().next().expect("len checked");
        }

        // Step 2/tie-break: cheapest-`n` sub leads `and`'s planning, which
        // itself re-derives producer/checker order from `statistics`.
        Box::new(AndIter::new(subs, Direction::Forward))
    }

    /// Compiles an `or`-cluster: each branch compiles independently and
    /// the cluster is the sorted (or degraded) union of its branches.
    pub fn compile_or(&self, arena: &Arena<ConstraintNode>, branches: &[ArenaIndex<ConstraintNode>], range: IdRange) -> Box<dyn Cursor0> {
        let subs = branches.iter().map(|&idx| self.compile(arena, idx, range)).collect();
        Box::new(OrIter::new(subs, Direction::Forward))
    }
}

fn leading_word(pattern: &str) -> String {
    pattern
        .trim_start_matches(['^', '*'])
        .split(|c: char| !c.is_alphanumeric())
        .find(|w| !w.is_empty())
        .unwrap_or("")
        .to_owned()
}

/// Recognizes the "bare trailing wildcard" shape of a fuzzy pattern
/// (`foo*`, nothing else special) that a prefix scan answers exactly,
/// rather than falling back to a full glob post-filter.
fn simple_prefix(pattern: &str) -> Option<String> {
    let head = pattern.strip_suffix('*')?;
    if head.is_empty() || head.contains(['^', '*', '$', '\\']) {
        return None;
    }
    Some(head.to_owned())
}

struct LinkageJoinIter {
    store: StoreHandle,
    linkage: Linkage,
    allowed: GuidSet,
    base: AllIter,
}

impl LinkageJoinIter {
    fn new(store: StoreHandle, linkage: Linkage, allowed: GuidSet, range: IdRange) -> Self {
        Self { store, linkage, allowed, base: AllIter::new(range, Direction::Forward) }
    }

    fn accepts(&self, primitive: &Primitive) -> bool {
        self.allowed.matches(Some(primitive.linkage(self.linkage)))
    }
}

impl Cursor0 for LinkageJoinIter {
    fn kind(&self) -> IterKind {
        IterKind::And
    }

    fn direction(&self) -> Direction {
        Direction::Forward
    }

    fn next(&mut self, budget: &mut Budget) -> IterOutcome<PdbId> {
        loop {
            match self.base.next(budget) {
                IterOutcome::Done(id) => match self.store.id_read(id) {
                    Ok(primitive) if self.accepts(&primitive) => return IterOutcome::Done(id),
                    Ok(_) => continue,
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
            Ok(primitive) if self.accepts(&primitive) => IterOutcome::Done(()),
            _ => IterOutcome::EndOfIteration,
        }
    }

    fn statistics(&mut self, budget: &mut Budget) -> IterOutcome<Stats> {
        self.base.statistics(budget).map(|mut stats| {
            stats.next_cost += 1;
            stats
        })
    }

    fn reset(&mut self) {
        self.base.reset();
    }

    fn box_clone(&self) -> Box<dyn Cursor0> {
        Box::new(Self {
            store: self.store.clone(),
            linkage: self.linkage,
            allowed: self.allowed.clone(),
            base: self.base,
        })
    }

    fn freeze(&self, flags: FreezeFlags) -> String {
        format!("and({:?}-join,{})", self.linkage, self.base.freeze(flags))
    }
}

/// Wraps a word-index producer with the comparator's full fuzzy-match
/// semantics (anchors, wildcards, numeric normalization) as a post-filter:
/// the word index only narrows candidates to one shared token, so this
/// checks the whole pattern against the candidate's value.
struct GlobCheckIter {
    store: StoreHandle,
    comparator: Box<dyn Comparator>,
    pattern: String,
    inner: Box<dyn Cursor0>,
}

impl GlobCheckIter {
    fn new(store: StoreHandle, comparator: Box<dyn Comparator>, pattern: String, inner: Box<dyn Cursor0>) -> Self {
        Self { store, comparator, pattern, inner }
    }

    fn accepts(&self, primitive: &Primitive) -> bool {
        let text = primitive.value.as_deref().unwrap_or("");
        self.comparator.glob(&self.pattern, text).unwrap_or(true)
    }
}

impl Cursor0 for GlobCheckIter {
    fn kind(&self) -> IterKind {
        IterKind::Prefix
    }

    fn direction(&self) -> Direction {
        self.inner.direction()
    }

    fn next(&mut self, budget: &mut Budget) -> IterOutcome<PdbId> {
        loop {
            if !budget.charge(BASE_STEP_COST) {
                return IterOutcome::NeedsBudget;
            }

            match self.inner.next(budget) {
                IterOutcome::Done(id) => match self.store.id_read(id) {
                    Ok(primitive) if self.accepts(&primitive) => return IterOutcome::Done(id),
                    Ok(_) => continue,
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
        match self.inner.check(id, budget) {
            IterOutcome::Done(()) => match self.store.id_read(id) {
                Ok(primitive) if self.accepts(&primitive) => IterOutcome::Done(()),
                _ => IterOutcome::EndOfIteration,
            },
            other => other,
        }
    }

    fn statistics(&mut self, budget: &mut Budget) -> IterOutcome<Stats> {
        self.inner.statistics(budget).map(|mut stats| {
            stats.next_cost += 1;
            stats.ordered = false;
            stats.ordering = None;
            stats
        })
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn box_clone(&self) -> Box<dyn Cursor0> {
        Box::new(Self {
            store: self.store.clone(),
            comparator: self.comparator.box_clone(),
            pattern: self.pattern.clone(),
            inner: self.inner.box_clone(),
        })
    }

    fn freeze(&self, flags: FreezeFlags) -> String {
        format!("glob-check({})", self.inner.freeze(flags))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_word_skips_anchors_and_wildcards() {
        assert_eq!(leading_word("^quick *fox$"), "quick");
        assert_eq!(leading_word("*fox"), "fox");
    }

    #[test]
    fn simple_prefix_accepts_only_bare_trailing_wildcard() {
        assert_eq!(simple_prefix("quick*"), Some("quick".to_owned()));
        assert_eq!(simple_prefix("quick *fox"), None);
        assert_eq!(simple_prefix("*"), None);
        assert_eq!(simple_prefix("^quick*"), None);
    }
}
