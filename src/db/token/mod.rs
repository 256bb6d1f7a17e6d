//! Result-token tree: typed, ref-counted reply values
//! traversed by the (external) reply writer into S-expression output.

use crate::db::primitives::Primitive;
use crate::types::{Guid, Timestamp};
use std::fmt;
use std::rc::{Rc, Weak};

///
/// ResultToken
///
/// `Str` carries a weak back-reference to the primitive its bytes are
/// borrowed from, so the primitive's backing storage is not released
/// while the token tree is still alive but the token itself does not
/// keep it alive past the primitive store's own retention.
///

#[derive(Clone)]
pub enum ResultToken {
    Atom(Rc<str>),
    Str {
        value: Rc<str>,
        backing: Option<Weak<Primitive>>,
    },
    Number(f64),
    Timestamp(Timestamp),
    Guid(Guid),
    List(Vec<ResultToken>),
    Sequence(Vec<ResultToken>),
    Null,
    Unspecified,
}

impl ResultToken {
    #[must_use]
    pub fn atom(name: impl Into<Rc<str>>) -> Self {
        Self::Atom(name.into())
    }

    #[must_use]
    pub fn string(value: impl Into<Rc<str>>) -> Self {
        Self::Str { value: value.into(), backing: None }
    }

    #[must_use]
    pub fn string_from_primitive(value: impl Into<Rc<str>>, primitive: &Rc<Primitive>) -> Self {
        Self::Str { value: value.into(), backing: Some(Rc::downgrade(primitive)) }
    }

    /// `true` for `Str` tokens whose backing primitive has since been
    /// released; the value bytes remain valid regardless (the `Rc<str>`
    /// owns them), this only reports staleness of the back-reference.
    #[must_use]
    pub fn backing_released(&self) -> bool {
        match self {
            Self::Str { backing: Some(w), .. } => w.upgrade().is_none(),
            _ => false,
        }
    }
}

fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

impl fmt::Display for ResultToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom(name) => write!(f, "{name}"),
            Self::Str { value, .. } => write!(f, "{}", escape_string(value)),
            Self::Number(n) => write!(f, "{n}"),
            Self::Timestamp(ts) => write!(f, "T{}", ts.as_secs()),
            Self::Guid(guid) => write!(f, "{guid}"),
            Self::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Self::Sequence(items) => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "}}")
            }
            Self::Null => write!(f, "null"),
            Self::Unspecified => write!(f, "?"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_renders_space_separated_parens() {
        let list = ResultToken::List(vec![ResultToken::Number(1.0), ResultToken::Number(2.0)]);

        assert_eq!(list.to_string(), "(1 2)");
    }

    #[test]
    fn string_escapes_quotes() {
        let s = ResultToken::string("a\"b");

        assert_eq!(s.to_string(), "\"a\\\"b\"");
    }

    #[test]
    fn sequence_uses_braces() {
        let seq = ResultToken::Sequence(vec![ResultToken::Null]);

        assert_eq!(seq.to_string(), "{null}");
    }
}
