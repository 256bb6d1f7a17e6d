//! End-to-end scenarios exercising the full compile → evaluate → freeze
//! path against a small in-memory store, one per illustrative case.

use graphcore::budget::{Budget, IterOutcome};
use graphcore::db::comparator::StringOp;
use graphcore::db::constraint::{ConstraintNode, GuidClause, GuidField, GuidOp, StringClause, StringField};
use graphcore::db::guidset::GuidSet;
use graphcore::db::iter::{Cursor0, Direction, FreezeFlags};
use graphcore::db::plan::Planner;
use graphcore::db::primitives::{Datatype, HashKind, IdRange, Linkage, Primitive, PrimitiveStore, StringBinSet};
use graphcore::types::{Guid, PdbId, Timestamp};
use std::collections::HashMap;
use std::rc::Rc;

struct FixtureStore {
    primitives: Vec<Primitive>,
    bins: Vec<Vec<PdbId>>,
    bin_keys: Vec<String>,
    /// Maps any generation GUID in a version chain to its lineage root.
    roots: HashMap<Guid, Guid>,
    /// Maps a lineage root GUID to its currently-live primitive.
    live: HashMap<Guid, PdbId>,
}

impl FixtureStore {
    fn new(primitives: Vec<Primitive>) -> Self {
        let mut sorted: Vec<(String, PdbId)> = primitives
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.value.clone().map(|v| (v, PdbId::new(i as u64))))
            .collect();
        sorted.sort();

        let mut bins = Vec::new();
        let mut bin_keys = Vec::new();
        for (value, id) in sorted {
            bin_keys.push(value);
            bins.push(vec![id]);
        }

        Self { primitives, bins, bin_keys, roots: HashMap::new(), live: HashMap::new() }
    }

    fn with_lineage(mut self, members: &[Guid], root: Guid, live_id: PdbId) -> Self {
        for guid in members {
            self.roots.insert(*guid, root);
        }
        self.live.insert(root, live_id);
        self
    }

    fn full_range(&self) -> IdRange {
        IdRange::new(PdbId::ZERO, PdbId::new(self.primitives.len() as u64))
    }
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric()).filter(|s| !s.is_empty())
}

impl PrimitiveStore for FixtureStore {
    fn id_read(&self, id: PdbId) -> Result<Primitive, graphcore::error::EngineError> {
        self.primitives
            .get(id.get() as usize)
            .cloned()
            .ok_or_else(|| graphcore::error::EngineError::system(graphcore::error::ErrorOrigin::PrimitiveStore, "out of range"))
    }

    fn hash_iterator(&self, kind: HashKind, key: &[u8], range: IdRange, dir: Direction) -> Box<dyn Cursor0> {
        let ids: Vec<PdbId> = self
            .primitives
            .iter()
            .enumerate()
            .filter(|(i, p)| {
                range.contains(PdbId::new(*i as u64))
                    && match kind {
                        HashKind::Value => p.value.as_deref().map(str::as_bytes) == Some(key),
                        HashKind::Name => p.name.as_bytes() == key,
                        HashKind::Typeguid => p.typeguid.to_bytes().as_slice() == key,
                    }
            })
            .map(|(i, _)| PdbId::new(i as u64))
            .collect();
        Box::new(graphcore::db::iter::FixedIter::new(ids, dir))
    }

    fn word_iterator(&self, word: &str, range: IdRange, dir: Direction) -> Box<dyn Cursor0> {
        let needle = word.to_lowercase();
        let ids: Vec<PdbId> = self
            .primitives
            .iter()
            .enumerate()
            .filter(|(i, p)| {
                range.contains(PdbId::new(*i as u64))
                    && p.value.as_deref().is_some_and(|v| words(v).any(|w| w.eq_ignore_ascii_case(&needle)))
            })
            .map(|(i, _)| PdbId::new(i as u64))
            .collect();
        Box::new(graphcore::db::iter::FixedIter::new(ids, dir))
    }

    fn bin_lookup(&self, _binset: StringBinSet, value: &[u8]) -> u64 {
        let value = String::from_utf8_lossy(value).into_owned();
        self.bin_keys.binary_search(&value).unwrap_or_else(|idx| idx) as u64
    }

    fn bin_to_iterator(&self, _binset: StringBinSet, bin: u64, range: IdRange, dir: Direction, _error_if_null: bool) -> Box<dyn Cursor0> {
        let ids = self
            .bins
            .get(bin as usize)
            .map(|ids| ids.iter().copied().filter(|id| range.contains(*id)).collect())
            .unwrap_or_default();
        Box::new(graphcore::db::iter::FixedIter::new(ids, dir))
    }

    fn bin_value(&self, _binset: StringBinSet, bin: u64) -> Option<Vec<u8>> {
        self.bin_keys.get(bin as usize).map(|s| s.as_bytes().to_vec())
    }

    fn bin_end(&self, _binset: StringBinSet) -> u64 {
        self.bins.len() as u64
    }

    fn generation_nth(&self, guid: Guid, oldest: bool, offset: u64) -> Result<Guid, graphcore::error::EngineError> {
        let _ = offset;
        if oldest {
            return Ok(*self.roots.get(&guid).unwrap_or(&guid));
        }
        Ok(guid)
    }

    fn generation_last_n(&self, guid: Guid) -> Result<(PdbId, u64), graphcore::error::EngineError> {
        if let Some(id) = self.live.get(&guid) {
            return Ok((*id, 1));
        }
        self.primitives
            .iter()
            .position(|p| p.guid == guid)
            .map(|i| (PdbId::new(i as u64), 1))
            .ok_or_else(|| graphcore::error::EngineError::semantics(graphcore::error::ErrorOrigin::PrimitiveStore, "unknown guid"))
    }

    fn iterator_find_nonstep(&self, iter: &mut dyn Cursor0, id: PdbId) -> Option<PdbId> {
        let mut budget = Budget::new(u64::MAX / 2);
        match iter.find(id, &mut budget) {
            IterOutcome::Done(found) => Some(found),
            _ => None,
        }
    }
}

fn next_guid() -> Guid {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    Guid::from_u128(u128::from(COUNTER.fetch_add(1, Ordering::Relaxed)))
}

fn primitive(name: &str, value: Option<&str>, typeguid: Guid, left: Guid, right: Guid) -> Primitive {
    Primitive {
        guid: next_guid(),
        typeguid,
        name: name.to_owned(),
        value: value.map(str::to_owned),
        datatype: if value.is_some() { Datatype::String } else { Datatype::Null },
        scope: Guid::nil(),
        live: true,
        archival: false,
        timestamp: Timestamp::from_secs(0),
        left,
        right,
        previous: None,
    }
}

fn drain(mut iter: Box<dyn Cursor0>) -> Vec<PdbId> {
    let mut budget = Budget::new(1_000);
    let mut out = Vec::new();
    loop {
        match iter.next(&mut budget) {
            IterOutcome::Done(id) => out.push(id),
            IterOutcome::EndOfIteration => break,
            IterOutcome::NeedsBudget => budget.replenish(1_000),
        }
    }
    out
}

/// Scenario 1: exact value, one GUID; cursor after the hit is `position=$`.
#[test]
fn exact_value_returns_single_hit_and_freezes_to_eof() {
    let t = Guid::from_u128(100);
    let store = Rc::new(FixtureStore::new(vec![
        primitive("n1", Some("alpha"), t, Guid::nil(), Guid::nil()),
        primitive("n2", Some("beta"), t, Guid::nil(), Guid::nil()),
    ]));
    let planner = Planner::new(store.clone());

    let mut root = ConstraintNode::root();
    root.string_clauses.push(StringClause {
        field: StringField::Value,
        op: StringOp::Eq,
        value: "alpha".to_owned(),
        comparator: None,
    });

    let mut arena = graphcore::arena::Arena::new();
    let idx = arena.alloc(root);

    let mut iter = planner.compile(&arena, idx, store.full_range());
    let mut budget = Budget::new(1_000);

    assert_eq!(iter.next(&mut budget), IterOutcome::Done(PdbId::ZERO));
    assert_eq!(iter.next(&mut budget), IterOutcome::EndOfIteration);
    assert!(iter.freeze(FreezeFlags::SET | FreezeFlags::POSITION).ends_with("/$"));
}

/// Scenario 2: fuzzy match returns the insertion-order hits under the
/// default comparator's word-tokenized glob.
#[test]
fn fuzzy_match_returns_two_hits_in_insertion_order() {
    let t = Guid::from_u128(200);
    let store = Rc::new(FixtureStore::new(vec![
        primitive("a", Some("the quick brown fox"), t, Guid::nil(), Guid::nil()),
        primitive("b", Some("the quick lazy fox"), t, Guid::nil(), Guid::nil()),
        primitive("c", Some("slow fox"), t, Guid::nil(), Guid::nil()),
    ]));
    let planner = Planner::new(store.clone());

    let mut root = ConstraintNode::root();
    root.string_clauses.push(StringClause {
        field: StringField::Value,
        op: StringOp::Fuzzy,
        value: "quick *fox".to_owned(),
        comparator: None,
    });

    let mut arena = graphcore::arena::Arena::new();
    let idx = arena.alloc(root);

    let iter = planner.compile(&arena, idx, store.full_range());
    let hits = drain(iter);

    assert_eq!(hits, vec![PdbId::new(0), PdbId::new(1)]);
}

/// Scenario 5: disjunctive `or` over two singleton hash matches.
#[test]
fn disjunctive_or_returns_both_branch_hits() {
    let t = Guid::from_u128(300);
    let store = Rc::new(FixtureStore::new(vec![
        primitive("n1", Some("x"), t, Guid::nil(), Guid::nil()),
        primitive("n2", Some("y"), t, Guid::nil(), Guid::nil()),
    ]));
    let planner = Planner::new(store.clone());

    let mut left = ConstraintNode::root();
    left.string_clauses.push(StringClause { field: StringField::Value, op: StringOp::Eq, value: "x".to_owned(), comparator: None });
    let mut right = ConstraintNode::root();
    right.string_clauses.push(StringClause { field: StringField::Value, op: StringOp::Eq, value: "y".to_owned(), comparator: None });

    let mut arena = graphcore::arena::Arena::new();
    let li = arena.alloc(left);
    let ri = arena.alloc(right);

    let iter = planner.compile_or(&arena, &[li, ri], store.full_range());
    let mut hits = drain(iter);
    hits.sort();

    assert_eq!(hits, vec![PdbId::new(0), PdbId::new(1)]);
}

/// Scenario 6: `guid~=G0` and `guid~=G2` over a version chain `G0<-G1<-G2`
/// resolve to the same live ID.
#[test]
fn generation_normalization_resolves_same_chain_to_one_live_id() {
    let t = Guid::from_u128(500);
    let g0 = Guid::from_u128(501);
    let g1 = Guid::from_u128(502);
    let g2 = Guid::from_u128(503);

    let store = Rc::new(
        FixtureStore::new(vec![primitive("node", Some("v"), t, Guid::nil(), Guid::nil())])
            .with_lineage(&[g0, g1, g2], g0, PdbId::ZERO),
    );
    let planner = Planner::new(store.clone());
    let mut arena = graphcore::arena::Arena::new();

    for probe in [g0, g2] {
        let mut root = ConstraintNode::root();
        root.guid_clauses.push(GuidClause { field: GuidField::Guid, op: GuidOp::Approx, set: GuidSet::from_guids([probe]) });
        let idx = arena.alloc(root);

        let iter = planner.compile(&arena, idx, store.full_range());
        let hits = drain(iter);

        assert_eq!(hits, vec![PdbId::ZERO], "probe {probe:?} should resolve to the live id");
    }
}

/// Scenario 3 (linkage join): a root's `left`-linked children are
/// restricted to a value range, and the join returns only the roots whose
/// `left` target falls in that range.
#[test]
fn linkage_join_restricts_to_value_range_targets() {
    let t = Guid::from_u128(600);
    let mango = primitive("mango", Some("mango"), t, Guid::nil(), Guid::nil());
    let melon = primitive("melon", Some("melon"), t, Guid::nil(), Guid::nil());
    let orange = primitive("orange", Some("orange"), t, Guid::nil(), Guid::nil());
    let peach = primitive("peach", Some("peach"), t, Guid::nil(), Guid::nil());
    let root_a = primitive("root_a", None, t, mango.guid, Guid::nil());
    let root_b = primitive("root_b", None, t, orange.guid, Guid::nil());
    let root_a_id = PdbId::new(4);
    let root_b_id = PdbId::new(5);

    let store = Rc::new(FixtureStore::new(vec![mango, melon, orange, peach, root_a, root_b]));
    let planner = Planner::new(store.clone());

    let mut child = ConstraintNode::child(Linkage::Left);
    child.string_clauses.push(StringClause { field: StringField::Value, op: StringOp::Gt, value: "m".to_owned(), comparator: None });
    child.string_clauses.push(StringClause { field: StringField::Value, op: StringOp::Lt, value: "p".to_owned(), comparator: None });

    let mut arena = graphcore::arena::Arena::new();
    let child_idx = arena.alloc(child);

    let mut root = ConstraintNode::root();
    root.children.push(child_idx);
    let root_idx = arena.alloc(root);

    let iter = planner.compile(&arena, root_idx, store.full_range());
    let mut hits = drain(iter);
    hits.sort();

    assert_eq!(hits, vec![root_a_id, root_b_id]);
}
