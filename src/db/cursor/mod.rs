//! The freeze/thaw cursor codec: serializes evaluator
//! state into a textual, round-trippable cursor and restores it, tolerating
//! missing state by recovery from position.
//!
//! Wire format: ASCII, printable, bounded length. `/` separates the three
//! conceptual sections `SET / POSITION / STATE`; the structural characters
//! `/ : ( ) $ * ~` are escaped (XX-encoded) inside literal segments so a
//! value can never be mistaken for cursor structure.

use crate::error::{EngineError, ErrorOrigin};

const STRUCTURAL: &[u8] = b"/:()$*~%";

/// XX-encode `input`: any structural byte (or the escape byte `%` itself)
/// becomes `%XX` in uppercase hex; everything else passes through.
#[must_use]
pub fn xx_encode(input: &[u8]) -> String {
    let mut out = String::with_capacity(input.len());
    for &b in input {
        if STRUCTURAL.contains(&b) || !(0x20..0x7f).contains(&b) {
            out.push_str(&format!("%{b:02X}"));
        } else {
            out.push(b as char);
        }
    }
    out
}

/// Inverse of `xx_encode`. `ERR_LEXICAL` on a truncated or malformed
/// escape.
pub fn xx_decode(input: &str) -> Result<Vec<u8>, EngineError> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .ok_or_else(|| EngineError::lexical(ErrorOrigin::Cursor, "truncated escape"))?;
            let hex_str = std::str::from_utf8(hex)
                .map_err(|_| EngineError::lexical(ErrorOrigin::Cursor, "non-ASCII escape"))?;
            let value = u8::from_str_radix(hex_str, 16)
                .map_err(|_| EngineError::lexical(ErrorOrigin::Cursor, "malformed escape"))?;
            out.push(value);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

///
/// CursorSections
/// The three `/`-separated textual sections, already split but not yet
/// semantically interpreted by the owning iterator variant's codec.
///

#[derive(Clone, Debug, Default)]
pub struct CursorSections {
    pub set: String,
    pub position: Option<String>,
    pub state: Option<String>,
}

impl CursorSections {
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = self.set.clone();
        if let Some(pos) = &self.position {
            out.push('/');
            out.push_str(pos);
            if let Some(state) = &self.state {
                out.push('/');
                out.push_str(state);
            }
        }
        out
    }

    /// Splits on the first and second `/` that are not part of an escape,
    /// tolerating a cursor with only `SET`, or `SET/POSITION`.
    pub fn parse(text: &str) -> Result<Self, EngineError> {
        let mut parts = text.splitn(3, '/');
        let set = parts
            .next()
            .ok_or_else(|| EngineError::lexical(ErrorOrigin::Cursor, "empty cursor"))?
            .to_owned();
        let position = parts.next().map(str::to_owned);
        let state = parts.next().map(str::to_owned);

        Ok(Self { set, position, state })
    }
}

/// `$` denotes end-of-iteration position; anything else is a decimal ID.
#[must_use]
pub fn position_is_eof(position: &str) -> bool {
    position == "$"
}

/// Outcome of thawing a cursor: full state restoration, or a documented
/// downgrade to position-only recovery.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ThawFidelity {
    /// `SET + POSITION + STATE` restored exactly.
    Exact,
    /// `STATE` was absent or failed to parse; recovered via
    /// `seek(last_value, last_id)` instead.
    PositionRecovered,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xx_round_trips_structural_bytes() {
        let raw = b"a/b:c(d)e$f*g~h%i";
        let encoded = xx_encode(raw);
        let decoded = xx_decode(&encoded).unwrap();

        assert_eq!(decoded, raw);
    }

    #[test]
    fn parse_tolerates_missing_sections() {
        let sections = CursorSections::parse("fixed(1,2,3)").unwrap();

        assert_eq!(sections.set, "fixed(1,2,3)");
        assert!(sections.position.is_none());
        assert!(sections.state.is_none());
    }

    #[test]
    fn parse_splits_all_three_sections() {
        let sections = CursorSections::parse("vrange(a,z)/5/bin=3").unwrap();

        assert_eq!(sections.set, "vrange(a,z)");
        assert_eq!(sections.position.as_deref(), Some("5"));
        assert_eq!(sections.state.as_deref(), Some("bin=3"));
    }

    #[test]
    fn xx_decode_rejects_truncated_escape() {
        assert!(xx_decode("%A").is_err());
    }
}
