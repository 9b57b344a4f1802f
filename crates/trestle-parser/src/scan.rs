//! Low-level source scanners shared by the tokenizer.
//!
//! These are the host-utility pieces of lexing: whitespace skipping and the
//! string-literal sub-grammar. String literals come in three forms
//! (`"""multi "quote" text"""`, `"text"` and `'text'`), none of which support
//! escape sequences; a literal simply runs to its matching closer.

/// Advance past any whitespace starting at `pos`, returning the new position.
pub(crate) fn skip_whitespace(source: &str, pos: usize) -> usize {
    for (offset, c) in source[pos..].char_indices() {
        if !c.is_whitespace() {
            return pos + offset;
        }
    }
    source.len()
}

/// A scanned string literal: its unquoted value and the position just past
/// the closing quote.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ScannedLiteral<'src> {
    pub value: &'src str,
    pub end: usize,
}

/// Scan the string literal starting at `pos` (which must sit on a quote).
/// Returns `None` when the literal is unterminated.
pub(crate) fn string_literal(source: &str, pos: usize) -> Option<ScannedLiteral<'_>> {
    let rest = &source[pos..];
    if let Some(body) = rest.strip_prefix("\"\"\"") {
        return body.find("\"\"\"").map(|close| ScannedLiteral {
            value: &source[pos + 3..pos + 3 + close],
            end: pos + 3 + close + 3,
        });
    }
    for quote in ['"', '\''] {
        if let Some(body) = rest.strip_prefix(quote) {
            return body.find(quote).map(|close| ScannedLiteral {
                value: &source[pos + 1..pos + 1 + close],
                end: pos + 1 + close + 1,
            });
        }
    }
    None
}

/// Scan a region delimited by an opener already seen at `pos` and a closing
/// marker, returning the inner text and the position just past the closer.
pub(crate) fn delimited<'src>(
    source: &'src str,
    pos: usize,
    opener_len: usize,
    closer: &str,
) -> Option<ScannedLiteral<'src>> {
    let body_start = pos + opener_len;
    source[body_start..].find(closer).map(|close| ScannedLiteral {
        value: &source[body_start..body_start + close],
        end: body_start + close + closer.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_unicode_whitespace() {
        assert_eq!(skip_whitespace("  \t\na", 0), 4);
        assert_eq!(skip_whitespace("a  b", 1), 3);
        assert_eq!(skip_whitespace("   ", 0), 3);
    }

    #[test]
    fn scans_double_quoted() {
        let lit = string_literal("\"hello\" rest", 0).unwrap();
        assert_eq!(lit.value, "hello");
        assert_eq!(lit.end, 7);
    }

    #[test]
    fn scans_single_quoted_and_empty() {
        let lit = string_literal("'a b'", 0).unwrap();
        assert_eq!(lit.value, "a b");
        assert_eq!(string_literal("\"\"", 0).unwrap().value, "");
    }

    #[test]
    fn scans_triple_quoted_with_embedded_quotes() {
        let lit = string_literal("\"\"\"say \"hi\" now\"\"\"", 0).unwrap();
        assert_eq!(lit.value, "say \"hi\" now");
        assert_eq!(lit.end, 18);
    }

    #[test]
    fn unterminated_literals_are_rejected() {
        assert_eq!(string_literal("\"open", 0), None);
        assert_eq!(string_literal("'open", 0), None);
        assert_eq!(string_literal("\"\"\"open\"", 0), None);
    }

    #[test]
    fn delimited_scans_to_closer() {
        let scanned = delimited("[[a|b]] tail", 0, 2, "]]").unwrap();
        assert_eq!(scanned.value, "a|b");
        assert_eq!(scanned.end, 7);
        assert_eq!(delimited("{{open", 0, 2, "}}"), None);
    }
}
