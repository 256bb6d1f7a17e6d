//! The constraint tree: the abstract query the parser
//! (external) builds and the planner compiles into an iterator tree.

use crate::db::guidset::GuidSet;
use crate::db::ormap::OrMap;
use crate::db::primitives::Linkage;
use crate::types::Guid;

/// A string clause's operator is the same capability a comparator's
/// `syntax` accepts or rejects — one enum, not two that must stay in sync.
pub use crate::db::comparator::StringOp;

///
/// StringField
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StringField {
    Name,
    Type,
    Value,
}

///
/// StringClause
///

#[derive(Clone, Debug)]
pub struct StringClause {
    pub field: StringField,
    pub op: StringOp,
    pub value: String,
    pub comparator: Option<String>,
}

///
/// GuidField
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GuidField {
    Guid,
    Next,
    Prev,
    Left,
    Right,
    Scope,
    Typeguid,
}

///
/// GuidOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GuidOp {
    /// `=`: enumerate the requested generation window exactly.
    Eq,
    /// `~=`: root-normalize before matching.
    Approx,
}

///
/// GuidClause
///

#[derive(Clone, Debug)]
pub struct GuidClause {
    pub field: GuidField,
    pub op: GuidOp,
    pub set: GuidSet,
}

///
/// Meta
/// Syntactic sugar resolving to an explicit `left`/`right` linkage.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Meta {
    From,
    To,
    Unspecified,
}

impl Meta {
    #[must_use]
    pub const fn resolve(self) -> Option<Linkage> {
        match self {
            Self::From => Some(Linkage::Left),
            Self::To => Some(Linkage::Right),
            Self::Unspecified => None,
        }
    }
}

///
/// GenerationBound
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GenerationBound {
    pub oldest: Option<u64>,
    pub newest: Option<u64>,
}

impl Default for GenerationBound {
    fn default() -> Self {
        Self { oldest: None, newest: None }
    }
}

///
/// SortField
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortField {
    Name,
    Type,
    Value,
    Timestamp,
    Guid,
}

///
/// SortPattern
///

#[derive(Clone, Debug)]
pub struct SortPattern {
    pub field: SortField,
    pub descending: bool,
    pub comparator: Option<String>,
}

///
/// ResultPattern
/// What to emit per matched ID (see H).
///

#[derive(Clone, Debug)]
pub enum ResultPattern {
    Guid,
    Name,
    Value,
    Typeguid,
    Timestamp,
    List(Vec<ResultPattern>),
}

///
/// Pagination
///

#[derive(Clone, Debug, Default)]
pub struct Pagination {
    pub pagesize: Option<u64>,
    pub countlimit: Option<u64>,
    pub resultpagesize: Option<u64>,
    pub start: Option<u64>,
    pub cursor: Option<String>,
}

///
/// ConstraintNode
///
/// Essential attributes of a constraint node. `or_head`/`or_tail`/`or_prototype` are
/// stored as indices into the owning request's constraint arena rather
/// than as direct references, matching the arena-allocation design of
/// arena indices, not references, since the constraint tree has cyclic relationships.
///

#[derive(Clone, Debug)]
pub struct ConstraintNode {
    pub linkage: Option<Linkage>,
    pub meta: Meta,
    pub string_clauses: Vec<StringClause>,
    pub guid_clauses: Vec<GuidClause>,
    pub generation: GenerationBound,
    pub pagination: Pagination,
    pub result_pattern: Option<ResultPattern>,
    pub sort_patterns: Vec<SortPattern>,
    pub is_false: bool,
    pub anchor: bool,
    pub children: Vec<crate::arena::ArenaIndex<ConstraintNode>>,
    pub or_index: Option<usize>,
    pub or_head: Option<crate::arena::ArenaIndex<ConstraintNode>>,
    pub or_tail: Option<crate::arena::ArenaIndex<ConstraintNode>>,
    pub or_prototype: Option<crate::arena::ArenaIndex<ConstraintNode>>,
}

impl ConstraintNode {
    #[must_use]
    pub fn root() -> Self {
        Self {
            linkage: None,
            meta: Meta::Unspecified,
            string_clauses: Vec::new(),
            guid_clauses: Vec::new(),
            generation: GenerationBound::default(),
            pagination: Pagination::default(),
            result_pattern: None,
            sort_patterns: Vec::new(),
            is_false: false,
            anchor: false,
            children: Vec::new(),
            or_index: None,
            or_head: None,
            or_tail: None,
            or_prototype: None,
        }
    }

    #[must_use]
    pub fn child(linkage: Linkage) -> Self {
        Self { linkage: Some(linkage), ..Self::root() }
    }

    /// True exactly when this node has no linkage, i.e. it's the root.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.linkage.is_none()
    }

    #[must_use]
    pub const fn has_subconstraints(&self) -> bool {
        !self.children.is_empty()
    }
}

///
/// OrCluster
/// Groups sibling branches sharing a common parent, assigning dense
/// `or_index` by pre-order walk from the cluster root.
///

#[derive(Clone, Debug)]
pub struct OrCluster {
    pub branches: Vec<crate::arena::ArenaIndex<ConstraintNode>>,
    pub or_map: OrMap,
}

impl OrCluster {
    #[must_use]
    pub fn new(branches: Vec<crate::arena::ArenaIndex<ConstraintNode>>) -> Self {
        let or_map = OrMap::new(branches.len());
        Self { branches, or_map }
    }
}

/// Root-normalize `guid` when `op` is `~=`; otherwise enumerate the
/// generation window exactly.
#[must_use]
pub fn normalize_guid_clause(
    clause: &GuidClause,
    mut root_of: impl FnMut(Guid) -> Guid,
) -> GuidSet {
    match clause.op {
        GuidOp::Approx => {
            let mut set = clause.set.clone();
            set.normalize_match(&mut root_of);
            set
        }
        GuidOp::Eq => clause.set.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_resolves_to_explicit_linkage() {
        assert_eq!(Meta::From.resolve(), Some(Linkage::Left));
        assert_eq!(Meta::To.resolve(), Some(Linkage::Right));
        assert_eq!(Meta::Unspecified.resolve(), None);
    }

    #[test]
    fn root_constraint_has_no_linkage() {
        let root = ConstraintNode::root();

        assert!(root.is_root());
    }
}
