//! An in-memory `PrimitiveStore` for tests: a flat `Vec<Primitive>` plus
//! the hash/word/bin indexes the trait requires, built eagerly from
//! whatever is inserted. Not a performance reference — just enough index
//! structure to exercise the iterator algebra end to end.

use crate::db::iter::{Cursor0, Direction};
use crate::db::primitives::{HashKind, IdRange, Linkage, Primitive, PrimitiveStore, StringBinSet};
use crate::error::{EngineError, ErrorOrigin};
use crate::types::{Guid, PdbId};
use std::collections::BTreeMap;

///
/// MemoryStore
///
/// Primitives are kept in insertion order; `pdb_id` is the Vec index.
/// Bins are built by sorting `(value, id)` pairs and splitting into
/// fixed-size buckets, giving a stable, reproducible bin numbering for
/// tests of `vrange`.
///

pub struct MemoryStore {
    primitives: Vec<Primitive>,
    by_guid: BTreeMap<Guid, PdbId>,
    bins: Vec<Vec<PdbId>>,
    bin_keys: Vec<String>,
    bin_size: usize,
}

impl MemoryStore {
    #[must_use]
    pub fn new(primitives: Vec<Primitive>) -> Self {
        let mut by_guid = BTreeMap::new();
        for (i, p) in primitives.iter().enumerate() {
            by_guid.insert(p.guid, PdbId::new(i as u64));
        }

        let mut store = Self { primitives, by_guid, bins: Vec::new(), bin_keys: Vec::new(), bin_size: 4 };
        store.rebuild_bins();
        store
    }

    fn rebuild_bins(&mut self) {
        let mut sorted: Vec<(String, PdbId)> = self
            .primitives
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.value.clone().map(|v| (v, PdbId::new(i as u64))))
            .collect();
        sorted.sort();

        self.bins.clear();
        self.bin_keys.clear();
        for chunk in sorted.chunks(self.bin_size) {
            self.bin_keys.push(chunk[0].0.clone());
            self.bins.push(chunk.iter().map(|(_, id)| *id).collect());
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    #[must_use]
    pub fn full_range(&self) -> IdRange {
        IdRange::new(PdbId::ZERO, PdbId::new(self.primitives.len() as u64))
    }
}

impl PrimitiveStore for MemoryStore {
    fn id_read(&self, id: PdbId) -> Result<Primitive, EngineError> {
        self.primitives
            .get(id.get() as usize)
            .cloned()
            .ok_or_else(|| EngineError::system(ErrorOrigin::PrimitiveStore, "id out of range"))
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

        Box::new(crate::db::iter::FixedIter::new(ids, dir))
    }

    fn word_iterator(&self, word: &str, range: IdRange, dir: Direction) -> Box<dyn Cursor0> {
        let needle = word.to_lowercase();
        let ids: Vec<PdbId> = self
            .primitives
            .iter()
            .enumerate()
            .filter(|(i, p)| {
                range.contains(PdbId::new(*i as u64))
                    && p.value.as_deref().is_some_and(|v| extract_words(v).any(|w| w.eq_ignore_ascii_case(&needle)))
            })
            .map(|(i, _)| PdbId::new(i as u64))
            .collect();

        Box::new(crate::db::iter::FixedIter::new(ids, dir))
    }

    fn bin_lookup(&self, _binset: StringBinSet, value: &[u8]) -> u64 {
        let value = String::from_utf8_lossy(value).into_owned();
        match self.bin_keys.binary_search(&value) {
            Ok(idx) => idx as u64,
            Err(idx) => idx.saturating_sub(1) as u64,
        }
    }

    fn bin_to_iterator(
        &self,
        _binset: StringBinSet,
        bin: u64,
        range: IdRange,
        dir: Direction,
        _error_if_null: bool,
    ) -> Box<dyn Cursor0> {
        let ids = self
            .bins
            .get(bin as usize)
            .map(|ids| ids.iter().copied().filter(|id| range.contains(*id)).collect())
            .unwrap_or_default();

        Box::new(crate::db::iter::FixedIter::new(ids, dir))
    }

    fn bin_value(&self, _binset: StringBinSet, bin: u64) -> Option<Vec<u8>> {
        self.bin_keys.get(bin as usize).map(|s| s.as_bytes().to_vec())
    }

    fn bin_end(&self, _binset: StringBinSet) -> u64 {
        self.bins.len() as u64
    }

    fn generation_nth(&self, guid: Guid, oldest: bool, offset: u64) -> Result<Guid, EngineError> {
        let _ = (oldest, offset);
        Ok(guid)
    }

    fn generation_last_n(&self, guid: Guid) -> Result<(PdbId, u64), EngineError> {
        self.by_guid
            .get(&guid)
            .map(|id| (*id, 1))
            .ok_or_else(|| EngineError::semantics(ErrorOrigin::PrimitiveStore, "unknown guid"))
    }

    fn iterator_find_nonstep(&self, iter: &mut dyn Cursor0, id: PdbId) -> Option<PdbId> {
        let mut budget = crate::budget::Budget::new(u64::MAX / 2);
        match iter.find(id, &mut budget) {
            crate::budget::IterOutcome::Done(found) => Some(found),
            _ => None,
        }
    }
}

fn extract_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric()).filter(|s| !s.is_empty())
}

/// A minimal fixture builder for end-to-end query-evaluation scenarios.
#[must_use]
pub fn primitive(name: &str, value: Option<&str>, typeguid: Guid, left: Guid, right: Guid) -> Primitive {
    Primitive {
        guid: Guid::generate(),
        typeguid,
        name: name.to_owned(),
        value: value.map(str::to_owned),
        datatype: if value.is_some() { crate::db::primitives::Datatype::String } else { crate::db::primitives::Datatype::Null },
        scope: Guid::nil(),
        live: true,
        archival: false,
        timestamp: crate::types::Timestamp::from_secs(0),
        left,
        right,
        previous: None,
    }
}

#[must_use]
pub fn linkage_of(primitive: &Primitive, linkage: Linkage) -> Guid {
    primitive.linkage(linkage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_iterator_finds_exact_value() {
        let t = Guid::generate();
        let store = MemoryStore::new(vec![
            primitive("n1", Some("alpha"), t, Guid::nil(), Guid::nil()),
            primitive("n2", Some("beta"), t, Guid::nil(), Guid::nil()),
        ]);
        let mut budget = crate::budget::Budget::new(100);
        let mut iter = store.hash_iterator(HashKind::Value, b"alpha", store.full_range(), Direction::Forward);

        assert_eq!(iter.next(&mut budget), crate::budget::IterOutcome::Done(PdbId::ZERO));
        assert_eq!(iter.next(&mut budget), crate::budget::IterOutcome::EndOfIteration);
    }
}
