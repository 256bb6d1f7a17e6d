//! The primitive store: an external collaborator. This module only names
//! the contract (`PrimitiveStore`) and the record shape (`Primitive`) the
//! rest of the engine is built against; it does not implement durability,
//! replication, or on-disk layout. An in-memory
//! implementation for tests lives in `crate::test_support`.

use crate::{
    db::iter::{Cursor0, Direction},
    error::EngineError,
    types::{Guid, PdbId, Timestamp},
};

///
/// Datatype
///
/// The primitive's value interpretation. The engine only needs to know
/// enough about a datatype to decide whether "no value" (`Null`) applies,
/// since `without-value` and `vrange`'s null bucket depend on it; the rest
/// is opaque to this crate.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Datatype {
    Null,
    String,
    Timestamp,
    Guid,
}

///
/// Primitive
///
/// An immutable node/edge record.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Primitive {
    pub guid: Guid,
    pub typeguid: Guid,
    pub name: String,
    pub value: Option<String>,
    pub datatype: Datatype,
    pub scope: Guid,
    pub live: bool,
    pub archival: bool,
    pub timestamp: Timestamp,
    pub left: Guid,
    pub right: Guid,
    pub previous: Option<Guid>,
}

///
/// Linkage
///
/// The four named pointer fields by which primitives reference each
/// other. Shared between `db::primitives` (field access) and
/// `db::constraint` (how a constraint node is hooked to its parent).
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Linkage {
    Left,
    Right,
    Scope,
    Typeguid,
}

impl Primitive {
    #[must_use]
    pub fn linkage(&self, linkage: Linkage) -> Guid {
        match linkage {
            Linkage::Left => self.left,
            Linkage::Right => self.right,
            Linkage::Scope => self.scope,
            Linkage::Typeguid => self.typeguid,
        }
    }
}

///
/// HashKind
/// Selects which field a `hash_iterator` request indexes on.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HashKind {
    Value,
    Name,
    Typeguid,
}

///
/// StringBinSet
/// The binset namespace a `bin_lookup`/`bin_to_iterator` call addresses.
/// Only `Strings` is required by the value-range driver, but the type leaves room for a
/// store with more than one ordered binset without widening every call
/// site's signature.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StringBinSet {
    Strings,
}

/// Dense ID range a request is restricted to, `[low, high)`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IdRange {
    pub low: PdbId,
    pub high: PdbId,
}

impl IdRange {
    #[must_use]
    pub const fn new(low: PdbId, high: PdbId) -> Self {
        Self { low, high }
    }

    #[must_use]
    pub const fn contains(&self, id: PdbId) -> bool {
        id.get() >= self.low.get() && id.get() < self.high.get()
    }
}

///
/// PrimitiveStore
///
/// The interface the engine consumes. Implementations provide indexed
/// read/write of primitives and are the engine's only source of I/O; the
/// engine never blocks on a call — `bin_to_iterator`/`hash_iterator`/
/// `word_iterator` return iterators that surface their own `ERR_MORE`
/// through `Cursor0`, not through this trait.
///
pub trait PrimitiveStore {
    /// Read one primitive by dense ID.
    fn id_read(&self, id: PdbId) -> Result<Primitive, EngineError>;

    /// Build an iterator over IDs matching a hash key for one of
    /// `{value, name, typeguid}`.
    fn hash_iterator(
        &self,
        kind: HashKind,
        key: &[u8],
        range: IdRange,
        dir: Direction,
    ) -> Box<dyn Cursor0>;

    /// Build an iterator over IDs containing an indexed word (used for
    /// `~=` and prefix completion).
    fn word_iterator(&self, word: &str, range: IdRange, dir: Direction) -> Box<dyn Cursor0>;

    /// Locate the bin containing `value` under the comparator's ordering.
    fn bin_lookup(&self, binset: StringBinSet, value: &[u8]) -> u64;

    /// Build an iterator over the IDs in one bin. `error_if_null`
    /// requests `ERR_NO` rather than an empty iterator when the bin is
    /// out of range, matching the value-range driver's open-interval convention.
    fn bin_to_iterator(
        &self,
        binset: StringBinSet,
        bin: u64,
        range: IdRange,
        dir: Direction,
        error_if_null: bool,
    ) -> Box<dyn Cursor0>;

    /// The raw bytes a bin boundary was built from, used by `vrange` to
    /// re-derive `cur_bin` on thaw.
    fn bin_value(&self, binset: StringBinSet, bin: u64) -> Option<Vec<u8>>;

    /// The index one past the last populated bin.
    fn bin_end(&self, binset: StringBinSet) -> u64;

    /// `nth(guid, oldest?, offset)`: walk the generation chain.
    fn generation_nth(&self, guid: Guid, oldest: bool, offset: u64) -> Result<Guid, EngineError>;

    /// `(last_id, n)` for a GUID's lineage.
    fn generation_last_n(&self, guid: Guid) -> Result<(PdbId, u64), EngineError>;

    /// Positional seek without budget, used by freeze/thaw position
    /// recovery.
    fn iterator_find_nonstep(&self, iter: &mut dyn Cursor0, id: PdbId) -> Option<PdbId>;
}
