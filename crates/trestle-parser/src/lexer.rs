//! Tokenizer for the railroad notation.
//!
//! The notation is scanned left to right with up to three characters of
//! lookahead. Multi-character operators are recognized before their
//! single-character prefixes, and three sub-grammars are delegated to
//! dedicated scanners: string literals, doubled-bracket references and raw
//! `<script>` blocks. The token spans cover each full lexeme, so
//! concatenating all spans in order reproduces the source modulo whitespace.

use log::trace;

use crate::error::{ParseError, Result};
use crate::scan;
use crate::span::Span;
use crate::tokens::{RefKind, Token, TokenKind};

/// Characters that form a single-character operator token.
const SINGLE_OPERATORS: &str = "()<>+/:|-";

/// Split source text into its token sequence.
///
/// # Errors
///
/// Fails on the first unterminated literal, reference or script block, and
/// on any character no token can start with.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut pos = 0;
    while pos < source.len() {
        pos = scan::skip_whitespace(source, pos);
        if pos >= source.len() {
            break;
        }
        let token = next_token(source, pos)?;
        pos = token.span.end();
        tokens.push(token);
    }
    trace!(token_count = tokens.len(); "Tokenized notation source");
    Ok(tokens)
}

/// Scan the token starting at `pos`, which is not whitespace.
fn next_token(source: &str, pos: usize) -> Result<Token> {
    let rest = &source[pos..];
    let bytes = rest.as_bytes();
    let c1 = rest.chars().next().expect("caller checked for input");
    let c2 = bytes.get(1).copied().unwrap_or(0) as char;
    let c3 = bytes.get(2).copied().unwrap_or(0) as char;

    if c1 == '"' || c1 == '\'' {
        return string_token(source, pos);
    }
    if "[]{}".contains(c1) {
        if c2 == c1 {
            return reference_token(source, pos);
        }
        return Ok(operator(source, pos, 1));
    }
    if c1 == '<' && matches!(c2, '-' | '^' | '!' | '?') {
        return Ok(operator(source, pos, 2));
    }
    if matches!(c1, '-' | '^' | '!' | '?') && c2 == '>' {
        return Ok(operator(source, pos, 2));
    }
    if c1 == '(' && matches!(c2, '$' | '&' | '-') {
        return Ok(operator(source, pos, 2));
    }
    if matches!(c1, '$' | '&' | '-') && c2 == ')' {
        return Ok(operator(source, pos, 2));
    }
    if c1 == '-' && c2 == '|' {
        return Ok(operator(source, pos, if c3 == '|' { 3 } else { 2 }));
    }
    if rest.starts_with("<script>") {
        return script_token(source, pos);
    }
    if (c1 == '!' && c2 == '!') || (c1 == '#' && c2 == '#') {
        return Ok(operator(source, pos, 2));
    }
    if SINGLE_OPERATORS.contains(c1) {
        return Ok(operator(source, pos, 1));
    }
    if c1.is_ascii_alphabetic() {
        return Ok(name_token(source, pos));
    }
    if c1 == '\\' {
        return pragma_token(source, pos);
    }
    Err(ParseError::UnrecognizedCharacter {
        found: c1,
        span: Span::new(pos..pos + c1.len_utf8()),
    })
}

fn operator(source: &str, pos: usize, len: usize) -> Token {
    Token::new(
        TokenKind::Operator,
        &source[pos..pos + len],
        Span::new(pos..pos + len),
    )
}

fn string_token(source: &str, pos: usize) -> Result<Token> {
    let literal =
        scan::string_literal(source, pos).ok_or(ParseError::UnterminatedString {
            span: Span::new(pos..source.len()),
        })?;
    Ok(Token::new(
        TokenKind::String,
        literal.value,
        Span::new(pos..literal.end),
    ))
}

fn reference_token(source: &str, pos: usize) -> Result<Token> {
    let opener = &source[pos..pos + 2];
    // `[[` closes with `]]`; the other doubled forms, stray closers
    // included, close with `}}`.
    let (closer, kind) = match opener {
        "[[" => ("]]", RefKind::Link),
        _ => ("}}", RefKind::Transclusion),
    };
    let scanned =
        scan::delimited(source, pos, 2, closer).ok_or(ParseError::UnterminatedReference {
            closer,
            span: Span::new(pos..source.len()),
        })?;
    Ok(Token::new(
        TokenKind::Reference(kind),
        scanned.value,
        Span::new(pos..scanned.end),
    ))
}

fn script_token(source: &str, pos: usize) -> Result<Token> {
    let scanned = scan::delimited(source, pos, "<script>".len(), "</script>").ok_or(
        ParseError::UnterminatedScript {
            span: Span::new(pos..source.len()),
        },
    )?;
    Ok(Token::new(
        TokenKind::Script,
        scanned.value,
        Span::new(pos..scanned.end),
    ))
}

fn name_token(source: &str, pos: usize) -> Token {
    let len = source[pos..]
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-'))
        .count();
    Token::new(
        TokenKind::Name,
        &source[pos..pos + len],
        Span::new(pos..pos + len),
    )
}

fn pragma_token(source: &str, pos: usize) -> Result<Token> {
    let name_start = pos + 1;
    let len = source[name_start..]
        .bytes()
        .take_while(|b| b.is_ascii_alphabetic())
        .count();
    if len == 0 {
        return Err(ParseError::InvalidPragmaName {
            span: Span::new(pos..name_start),
        });
    }
    // The span covers the backslash so spans concatenate back to the source.
    Ok(Token::new(
        TokenKind::Pragma,
        &source[name_start..name_start + len],
        Span::new(pos..name_start + len),
    ))
}
