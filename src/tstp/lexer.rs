//! TSTP lexer (C11): splits input into individual characters, the terminal
//! alphabet the char-level grammar in `tstp::grammar` shifts, dropping
//! whitespace and `%`-line-comments — the one layer above raw bytes the
//! grammar doesn't itself model. Mirrors how `tstp_parser.h`'s `CHAR`
//! terminal feeds its own `LETTER`/`ID`/... rule ladder
//! (`original_source/provers/tstp/tstp_parser.h`), redone here as the
//! token supply for a real LR(1) table instead of a hand-rolled multi-char
//! token scanner.

use super::grammar::char_sym;
use crate::intern::SymTok;

/// Tokenizes `input` into one `SymTok` per grammar-significant character,
/// skipping ASCII whitespace and `%`-to-end-of-line comments. Returns
/// `None` on the first character outside the grammar's 7-bit ASCII
/// alphabet; rejecting a character the grammar itself can't shift (e.g. an
/// unsupported operator) is left to the parser, which fails the same way
/// it fails on any other unparseable token sequence.
pub fn tokenize(input: &str) -> Option<Vec<SymTok>> {
    let mut out = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            continue;
        }
        if c == '%' {
            for c2 in chars.by_ref() {
                if c2 == '\n' {
                    break;
                }
            }
            continue;
        }
        out.push(char_sym(c)?);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_one_symbol_per_character() {
        let toks = tokenize("p(X,a)").unwrap();
        assert_eq!(toks.len(), 6);
    }

    #[test]
    fn skips_whitespace_and_leading_comments() {
        let a = tokenize("% a leading comment\na").unwrap();
        let b = tokenize("a").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn comment_without_trailing_newline_is_dropped() {
        assert_eq!(tokenize("a % trailing").unwrap(), tokenize("a").unwrap());
    }

    #[test]
    fn rejects_character_outside_ascii_alphabet() {
        assert!(tokenize("a\u{1F600}b").is_none());
    }
}
