//! The query-evaluation engine.
//!
//! Module layout mirrors the system's component breakdown: one directory
//! per component, leaves first. `primitives` is the only module that names
//! an external collaborator's contract rather than engine-owned logic.

pub mod comparator;
pub mod constraint;
pub mod cursor;
pub mod guidset;
pub mod iter;
pub mod ormap;
pub mod plan;
pub mod primitives;
pub mod token;
pub mod vrange;
