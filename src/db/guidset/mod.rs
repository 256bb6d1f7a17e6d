//! Guid-set algebra: small arrays of GUIDs with an explicit
//! `contains_null` flag. The empty set is semantically `{null}`.

use crate::types::Guid;
use sha2::{Digest, Sha256};

///
/// GuidSet
///
/// Owned by the constraint that contains it (request-arena lifetime, not
/// tracked by this type). `contains_null` is tracked separately from
/// membership in `ids` so that "no GUIDs and no null" (true empty) is
/// distinguishable from "the null element" for `intersect`/`subtract`.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GuidSet {
    ids: Vec<Guid>,
    contains_null: bool,
}

impl GuidSet {
    #[must_use]
    pub const fn new() -> Self {
        Self { ids: Vec::new(), contains_null: false }
    }

    #[must_use]
    pub fn from_guids(guids: impl IntoIterator<Item = Guid>) -> Self {
        let mut set = Self::new();
        for g in guids {
            set.add(g);
        }
        set
    }

    #[must_use]
    pub const fn null() -> Self {
        Self { ids: Vec::new(), contains_null: true }
    }

    #[must_use]
    pub const fn contains_null(&self) -> bool {
        self.contains_null
    }

    #[must_use]
    pub fn ids(&self) -> &[Guid] {
        &self.ids
    }

    /// The empty set is semantically `{null}`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && !self.contains_null
    }

    pub fn add(&mut self, guid: Guid) {
        if self.ids.binary_search(&guid).is_err() {
            let idx = self.ids.partition_point(|g| *g < guid);
            self.ids.insert(idx, guid);
        }
    }

    pub fn delete(&mut self, guid: Guid) {
        if let Ok(idx) = self.ids.binary_search(&guid) {
            self.ids.remove(idx);
        }
    }

    #[must_use]
    pub fn find(&self, guid: Guid) -> bool {
        self.ids.binary_search(&guid).is_ok()
    }

    /// Matches `guid` against this set, with null matching on emptiness
    /// or the explicit null flag.
    #[must_use]
    pub fn matches(&self, guid: Option<Guid>) -> bool {
        match guid {
            None => self.contains_null || self.ids.is_empty(),
            Some(g) => self.find(g),
        }
    }

    /// Root-ancestor-normalize each member so two `~=` sets become
    /// directly intersectable.
    pub fn normalize_match(&mut self, mut root_of: impl FnMut(Guid) -> Guid) {
        let normalized: Vec<Guid> = self.ids.iter().map(|g| root_of(*g)).collect();
        self.ids = normalized;
        self.ids.sort_unstable();
        self.ids.dedup();
    }

    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        if self.is_empty() || other.is_empty() {
            return Self { ids: Vec::new(), contains_null: self.contains_null && other.contains_null };
        }
        let ids = self.ids.iter().copied().filter(|g| other.find(*g)).collect();
        Self { ids, contains_null: self.contains_null && other.contains_null }
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut ids = self.ids.clone();
        for g in &other.ids {
            if ids.binary_search(g).is_err() {
                ids.push(*g);
            }
        }
        ids.sort_unstable();
        Self { ids, contains_null: self.contains_null || other.contains_null }
    }

    #[must_use]
    pub fn subtract(&self, other: &Self) -> Self {
        let ids = self.ids.iter().copied().filter(|g| !other.find(*g)).collect();
        Self { ids, contains_null: self.contains_null && !other.contains_null }
    }

    #[must_use]
    pub fn filter_match(&self, mut predicate: impl FnMut(Guid) -> bool) -> Self {
        let ids = self.ids.iter().copied().filter(|g| predicate(*g)).collect();
        Self { ids, contains_null: self.contains_null }
    }

    /// Deterministic fingerprint: order-independent because membership is
    /// kept sorted, so structurally equal sets always hash identically
    /// across processes and Rust releases.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update([u8::from(self.contains_null)]);
        hasher.update(self.ids.len().to_le_bytes());
        for g in &self.ids {
            hasher.update(g.to_bytes());
        }
        let digest = hasher.finalize();
        u64::from_le_bytes(digest[..8].try_into().expect("sha256 digest is 32 bytes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn g(n: u128) -> Guid {
        Guid::from_u128(n)
    }

    #[test]
    fn union_with_empty_keeps_contains_null_of_the_other() {
        let a = GuidSet::from_guids([g(1), g(2)]);
        let empty = GuidSet::new();

        let u = a.union(&empty);

        assert_eq!(u.ids(), a.ids());
    }

    #[test]
    fn subtract_self_yields_null_iff_contained_null() {
        let a = GuidSet::from_guids([g(1)]);

        assert!(a.subtract(&a).is_empty());
        assert!(!a.subtract(&a).contains_null());

        let mut b = GuidSet::from_guids([g(1)]);
        b.contains_null = true;
        let result = b.subtract(&GuidSet::new());

        assert!(result.contains_null());
    }

    #[test]
    fn intersect_is_commutative() {
        let a = GuidSet::from_guids([g(1), g(2), g(3)]);
        let b = GuidSet::from_guids([g(2), g(3), g(4)]);

        assert_eq!(a.intersect(&b), b.intersect(&a));
    }

    #[test]
    fn equal_sets_hash_identically_regardless_of_build_order() {
        let a = GuidSet::from_guids([g(3), g(1), g(2)]);
        let b = GuidSet::from_guids([g(1), g(2), g(3)]);

        assert_eq!(a, b);
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    fn arb_guid() -> impl Strategy<Value = Guid> {
        any::<u128>().prop_map(Guid::from_u128)
    }

    fn arb_guid_set() -> impl Strategy<Value = GuidSet> {
        proptest::collection::vec(arb_guid(), 0..8).prop_map(GuidSet::from_guids)
    }

    proptest! {
        #[test]
        fn intersect_is_commutative_over_arbitrary_sets(a in arb_guid_set(), b in arb_guid_set()) {
            prop_assert_eq!(a.intersect(&b), b.intersect(&a));
        }

        #[test]
        fn fingerprint_is_insertion_order_independent(mut guids in proptest::collection::vec(arb_guid(), 0..8)) {
            let forward = GuidSet::from_guids(guids.clone());
            guids.reverse();
            let backward = GuidSet::from_guids(guids);

            prop_assert_eq!(forward.fingerprint(), backward.fingerprint());
        }

        #[test]
        fn subtract_self_is_always_empty_of_members(set in arb_guid_set()) {
            prop_assert!(set.subtract(&set).ids().is_empty());
        }
    }
}
