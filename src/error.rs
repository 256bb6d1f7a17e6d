use std::fmt;
use thiserror::Error as ThisError;

///
/// EngineError
/// Structured runtime error with a stable classification, propagated as a
/// tagged outcome per the error-handling design (see `ErrKind`).
/// Not a stable wire format; intended for internal use and may change
/// without notice.
///

#[derive(Debug, ThisError)]
#[error("{origin}:{kind}: {message}")]
pub struct EngineError {
    pub kind: ErrKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl EngineError {
    #[must_use]
    pub fn new(kind: ErrKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    pub fn lexical(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrKind::Lexical, origin, message)
    }

    pub fn semantics(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrKind::Semantics, origin, message)
    }

    pub fn too_many_matches(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrKind::TooManyMatches, origin, message)
    }

    pub fn not_a_replica(message: impl Into<String>) -> Self {
        Self::new(ErrKind::NotAReplica, ErrorOrigin::Session, message)
    }

    pub fn system(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrKind::System, origin, message)
    }

    #[must_use]
    pub const fn is_lexical(&self) -> bool {
        matches!(self.kind, ErrKind::Lexical)
    }
}

///
/// ErrKind
/// The error taxonomy of the error-handling design: `ERR_NO` and `ERR_MORE`
/// are deliberately *not* members of this enum — they are iteration control
/// flow, not failures, and are represented instead by `IterResult` (see
/// `crate::budget`).
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrKind {
    /// Malformed cursor or request (`ERR_LEXICAL`).
    Lexical,
    /// Well-formed but disallowed (`ERR_SEMANTICS`).
    Semantics,
    /// Anchor matched more than one primitive (`ERR_TOO_MANY_MATCHES`).
    TooManyMatches,
    /// Request forbidden by access mode (`ERR_NOT_A_REPLICA`).
    NotAReplica,
    /// Allocation failed or I/O error (`ERR_NOMEM` / other system error).
    System,
}

impl fmt::Display for ErrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Lexical => "lexical",
            Self::Semantics => "semantics",
            Self::TooManyMatches => "too_many_matches",
            Self::NotAReplica => "not_a_replica",
            Self::System => "system",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Iterator,
    Comparator,
    VRange,
    Constraint,
    GuidSet,
    OrMap,
    Token,
    Cursor,
    Plan,
    PrimitiveStore,
    Session,
    Serialize,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Iterator => "iterator",
            Self::Comparator => "comparator",
            Self::VRange => "vrange",
            Self::Constraint => "constraint",
            Self::GuidSet => "guidset",
            Self::OrMap => "ormap",
            Self::Token => "token",
            Self::Cursor => "cursor",
            Self::Plan => "plan",
            Self::PrimitiveStore => "primitives",
            Self::Session => "session",
            Self::Serialize => "serialize",
        };
        write!(f, "{label}")
    }
}

impl From<crate::serialize::SerializeError> for EngineError {
    fn from(err: crate::serialize::SerializeError) -> Self {
        Self::system(ErrorOrigin::Serialize, err.to_string())
    }
}
