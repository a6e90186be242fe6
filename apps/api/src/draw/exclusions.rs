//! Exclusion parsing: turns free-form admin text into ordered `(giver, receiver)` pairs.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Separators in priority order. A line is split on the first of these that it contains,
/// regardless of where the other separators appear in the line.
const SEPARATORS: &[&str] = &["->", ":", ","];

/// Delimiter used when a pair is stored in the draw record's audit trail.
pub const TOKEN_DELIMITER: &str = "::";

/// "giver must not give to receiver". Directional: `(A, B)` says nothing about `(B, A)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExclusionPair {
    pub giver: String,
    pub receiver: String,
}

impl ExclusionPair {
    pub fn new(giver: impl Into<String>, receiver: impl Into<String>) -> Self {
        Self {
            giver: giver.into(),
            receiver: receiver.into(),
        }
    }

    /// Encodes the pair as a `"giver::receiver"` audit token.
    ///
    /// `\` and `:` inside either name are backslash-escaped, so the only bare `::` in a
    /// token is the delimiter. Names without those characters encode unchanged.
    pub fn to_token(&self) -> String {
        format!(
            "{}{}{}",
            escape(&self.giver),
            TOKEN_DELIMITER,
            escape(&self.receiver)
        )
    }

    /// Decodes an audit token. Returns `None` when the delimiter is missing or an escape
    /// is left dangling.
    pub fn from_token(token: &str) -> Option<Self> {
        let mut giver = String::new();
        let mut chars = token.chars();
        loop {
            match chars.next()? {
                '\\' => giver.push(chars.next()?),
                ':' if chars.as_str().starts_with(':') => {
                    chars.next();
                    break;
                }
                c => giver.push(c),
            }
        }
        let receiver = unescape(chars.as_str())?;
        Some(Self::new(giver, receiver))
    }
}

fn escape(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c == '\\' || c == ':' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn unescape(escaped: &str) -> Option<String> {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push(chars.next()?),
            c => out.push(c),
        }
    }
    Some(out)
}

/// Parses one exclusion per line.
///
/// Blank lines, lines without any separator, and lines where either side trims to
/// nothing are dropped silently. Duplicates are kept; the store collapses them.
/// Names are not checked against any participant set.
pub fn parse_exclusions(text: &str) -> Vec<ExclusionPair> {
    let mut pairs = Vec::new();

    for (lineno, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Some(pair) => pairs.push(pair),
            None => debug!(line = lineno + 1, "skipping unparseable exclusion line"),
        }
    }

    pairs
}

fn parse_line(line: &str) -> Option<ExclusionPair> {
    let (giver, receiver) = SEPARATORS
        .iter()
        .find_map(|sep| line.split_once(*sep))?;

    let giver = giver.trim();
    let receiver = receiver.trim();
    if giver.is_empty() || receiver.is_empty() {
        return None;
    }

    Some(ExclusionPair::new(giver, receiver))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(g: &str, r: &str) -> ExclusionPair {
        ExclusionPair::new(g, r)
    }

    #[test]
    fn test_arrow_separator() {
        assert_eq!(parse_exclusions("A->B"), vec![pair("A", "B")]);
    }

    #[test]
    fn test_comma_separator() {
        assert_eq!(parse_exclusions("A,B"), vec![pair("A", "B")]);
    }

    #[test]
    fn test_colon_wins_over_comma() {
        assert_eq!(parse_exclusions("A:B,C"), vec![pair("A", "B,C")]);
    }

    #[test]
    fn test_colon_wins_even_when_comma_comes_first() {
        assert_eq!(parse_exclusions("A,B:C"), vec![pair("A,B", "C")]);
    }

    #[test]
    fn test_arrow_wins_over_colon() {
        assert_eq!(parse_exclusions("A:x -> B"), vec![pair("A:x", "B")]);
    }

    #[test]
    fn test_splits_on_first_occurrence_only() {
        assert_eq!(parse_exclusions("A -> B -> C"), vec![pair("A", "B -> C")]);
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        assert_eq!(
            parse_exclusions("   Ana María  ->   Luis \t"),
            vec![pair("Ana María", "Luis")]
        );
    }

    #[test]
    fn test_line_without_separator_is_dropped() {
        assert!(parse_exclusions("just a name").is_empty());
    }

    #[test]
    fn test_empty_side_is_dropped() {
        assert!(parse_exclusions("->B\nA:\n , ").is_empty());
    }

    #[test]
    fn test_blank_lines_ignored_and_order_kept() {
        let text = "\nA->B\n\n   \nC:D\nnoise\nE,F\n";
        assert_eq!(
            parse_exclusions(text),
            vec![pair("A", "B"), pair("C", "D"), pair("E", "F")]
        );
    }

    #[test]
    fn test_duplicates_are_kept() {
        assert_eq!(
            parse_exclusions("A->B\nA:B"),
            vec![pair("A", "B"), pair("A", "B")]
        );
    }

    #[test]
    fn test_crlf_input() {
        assert_eq!(
            parse_exclusions("A->B\r\nC->D\r\n"),
            vec![pair("A", "B"), pair("C", "D")]
        );
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let text = "A->B\nB:C,D\nbad line\nD,A";
        assert_eq!(parse_exclusions(text), parse_exclusions(text));
    }

    #[test]
    fn test_token_encoding() {
        let p = pair("A", "B");
        assert_eq!(p.to_token(), "A::B");
        assert_eq!(ExclusionPair::from_token("A::B"), Some(p));
        assert_eq!(ExclusionPair::from_token("AB"), None);
    }

    #[test]
    fn test_token_round_trips_names_with_colons() {
        let pairs = parse_exclusions("ana: -> bea\nana -> :bea\nx::y -> z\nback\\slash -> q:");
        assert_eq!(pairs.len(), 4);

        let tokens: std::collections::BTreeSet<String> =
            pairs.iter().map(ExclusionPair::to_token).collect();
        assert_eq!(tokens.len(), 4, "distinct pairs must not share a token: {tokens:?}");

        for p in &pairs {
            assert_eq!(ExclusionPair::from_token(&p.to_token()).as_ref(), Some(p));
        }
    }

    #[test]
    fn test_token_escapes_only_when_needed() {
        assert_eq!(pair("ana:", "bea").to_token(), "ana\\:::bea");
        assert_eq!(pair("ana", ":bea").to_token(), "ana::\\:bea");
        assert_eq!(pair("Ana María", "Luis").to_token(), "Ana María::Luis");
    }

    #[test]
    fn test_dangling_escape_is_rejected() {
        assert_eq!(ExclusionPair::from_token("ana::bea\\"), None);
        assert_eq!(ExclusionPair::from_token("ana\\"), None);
    }
}
