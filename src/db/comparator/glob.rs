//! Fuzzy (`~=`) pattern matching for the default comparator.
//!
//! Patterns are split on whitespace/punctuation into word-tokens, mirroring
//! the indexed word-extraction rule (maximal alphanumeric runs, plus whole
//! numbers). `^`/`$` anchor the token sequence to the start/end of the
//! text's word sequence; otherwise the pattern's tokens must appear as an
//! ordered subsequence. Within one token, `*` matches any run of word
//! characters; `\x` forces `x` to match literally and case-sensitively
//! rather than case-insensitively.

#[derive(Clone, Debug, Eq, PartialEq)]
enum Piece {
    /// Case-insensitive literal run.
    Word(String),
    /// Escaped literal run, matched case-sensitively.
    Literal(String),
    /// Unescaped `*`.
    Star,
}

struct Token {
    pieces: Vec<Piece>,
}

fn is_separator(c: char) -> bool {
    !c.is_alphanumeric()
}

fn tokenize_pattern(pattern: &str) -> (bool, bool, Vec<Token>) {
    let mut chars = pattern.chars().peekable();
    let anchor_start = chars.peek() == Some(&'^');
    if anchor_start {
        chars.next();
    }

    let mut rest: Vec<char> = chars.collect();
    let anchor_end = rest.last() == Some(&'$');
    if anchor_end {
        rest.pop();
    }

    let mut tokens = Vec::new();
    let mut pieces = Vec::new();
    let mut word_buf = String::new();
    let mut lit_buf = String::new();
    let mut i = 0;

    macro_rules! flush_word {
        () => {
            if !word_buf.is_empty() {
                pieces.push(Piece::Word(std::mem::take(&mut word_buf)));
            }
        };
    }
    macro_rules! flush_lit {
        () => {
            if !lit_buf.is_empty() {
                pieces.push(Piece::Literal(std::mem::take(&mut lit_buf)));
            }
        };
    }
    macro_rules! flush_token {
        () => {
            flush_word!();
            flush_lit!();
            if !pieces.is_empty() {
                tokens.push(Token { pieces: std::mem::take(&mut pieces) });
            }
        };
    }

    while i < rest.len() {
        let c = rest[i];
        if c == '\\' && i + 1 < rest.len() {
            flush_word!();
            lit_buf.push(rest[i + 1]);
            i += 2;
            continue;
        }
        flush_lit!();
        if c == '*' {
            flush_word!();
            pieces.push(Piece::Star);
            i += 1;
        } else if is_separator(c) {
            flush_token!();
            i += 1;
        } else {
            word_buf.push(c);
            i += 1;
        }
    }
    flush_token!();

    (anchor_start, anchor_end, tokens)
}

fn extract_words(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .collect()
}

fn normalize_number(s: &str) -> Option<String> {
    let negative = s.starts_with('-');
    let trimmed = s.trim_start_matches(['+', '-']);
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let (int_part, frac_part) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    let int_norm = int_part.trim_start_matches('0');
    let int_norm = if int_norm.is_empty() { "0" } else { int_norm };
    let frac_norm = frac_part.trim_end_matches('0');

    let mut out = String::new();
    if negative && int_norm != "0" {
        out.push('-');
    }
    out.push_str(int_norm);
    if !frac_norm.is_empty() {
        out.push('.');
        out.push_str(frac_norm);
    }
    Some(out)
}

fn token_matches_word(token: &Token, word: &str) -> bool {
    if token.pieces.iter().all(|p| matches!(p, Piece::Word(_))) {
        let joined: String = token
            .pieces
            .iter()
            .map(|p| match p {
                Piece::Word(w) => w.as_str(),
                _ => unreachable!(),
            })
            .collect();
        if let (Some(pat_num), Some(word_num)) = (normalize_number(&joined), normalize_number(word)) {
            return pat_num == word_num;
        }
    }

    let chars: Vec<char> = word.chars().collect();
    glob_word(&token.pieces, &chars)
}

fn glob_word(pieces: &[Piece], word: &[char]) -> bool {
    match pieces.split_first() {
        None => word.is_empty(),
        Some((Piece::Star, rest)) => {
            (0..=word.len()).any(|split| glob_word(rest, &word[split..]))
        }
        Some((Piece::Word(w), rest)) => {
            let w_chars: Vec<char> = w.chars().flat_map(char::to_lowercase).collect();
            let prefix: Vec<char> = word
                .iter()
                .take(w_chars.len())
                .flat_map(|c| c.to_lowercase())
                .collect();
            word.len() >= w_chars.len() && prefix == w_chars && glob_word(rest, &word[w.chars().count()..])
        }
        Some((Piece::Literal(l), rest)) => {
            let l_chars: Vec<char> = l.chars().collect();
            word.len() >= l_chars.len()
                && word[..l_chars.len()] == l_chars[..]
                && glob_word(rest, &word[l_chars.len()..])
        }
    }
}

/// True if `text`'s word sequence satisfies `pattern` per the rules above.
#[must_use]
pub fn fuzzy_match(pattern: &str, text: &str) -> bool {
    let (anchor_start, anchor_end, tokens) = tokenize_pattern(pattern);
    let words = extract_words(text);

    if tokens.is_empty() {
        return words.is_empty();
    }

    if anchor_start && anchor_end {
        return tokens.len() == words.len()
            && tokens.iter().zip(words.iter()).all(|(t, w)| token_matches_word(t, w));
    }

    if anchor_start {
        return words.len() >= tokens.len()
            && tokens.iter().zip(words.iter()).all(|(t, w)| token_matches_word(t, w));
    }

    if anchor_end {
        if words.len() < tokens.len() {
            return false;
        }
        let offset = words.len() - tokens.len();
        return tokens.iter().zip(words[offset..].iter()).all(|(t, w)| token_matches_word(t, w));
    }

    // Unanchored: pattern tokens must appear as an ordered subsequence.
    let mut word_idx = 0;
    for token in &tokens {
        let mut matched = false;
        while word_idx < words.len() {
            let w = words[word_idx];
            word_idx += 1;
            if token_matches_word(token, w) {
                matched = true;
                break;
            }
        }
        if !matched {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_partial_word_wildcard() {
        assert!(fuzzy_match("quick *fox", "the quick brown fox"));
        assert!(fuzzy_match("quick *fox", "the quick lazy fox"));
        assert!(!fuzzy_match("quick *fox", "slow fox"));
    }

    #[test]
    fn anchors_restrict_to_full_sequence() {
        assert!(fuzzy_match("^the$", "the"));
        assert!(!fuzzy_match("^the$", "the fox"));
    }

    #[test]
    fn numeric_fragments_compare_after_normalization() {
        assert!(fuzzy_match("007", "7"));
        assert!(fuzzy_match("+3.50", "3.5"));
    }
}
