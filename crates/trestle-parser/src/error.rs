//! Error types for the parsing lifecycle.
//!
//! Every failure aborts the whole parse: there is no recovery and no partial
//! tree. Errors carry the span of the offending lexeme so callers can point
//! back into the notation source. [`ParseError::kind`] sorts each variant
//! into the lexical or syntactic class.

use thiserror::Error;

use crate::span::Span;

/// Broad classification of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The tokenizer could not form a token.
    Lexical,
    /// The token stream did not match the notation grammar.
    Syntax,
}

/// A type alias for `Result<T, ParseError>`.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Error raised while tokenizing or parsing notation source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Unterminated string literal")]
    UnterminatedString { span: Span },

    #[error("Unterminated reference: closing {closer} expected")]
    UnterminatedReference { closer: &'static str, span: Span },

    #[error("Unterminated script block: closing </script> expected")]
    UnterminatedScript { span: Span },

    /// A character no token can start with.
    #[error("Syntax error at {found}")]
    UnrecognizedCharacter { found: char, span: Span },

    /// A backslash not followed by a pragma name.
    #[error("Invalid pragma")]
    InvalidPragmaName { span: Span },

    /// A bracketing construct was never closed.
    #[error("Closing {closer} expected")]
    MissingCloser { closer: &'static str, span: Span },

    /// A specific token class was required, e.g. the string after `/`.
    #[error("{expected} expected {context}")]
    ExpectedToken {
        expected: &'static str,
        context: &'static str,
        span: Span,
    },

    /// Tokens were left over after the root content ended.
    #[error("Syntax error at {found}")]
    UnexpectedToken { found: String, span: Span },

    #[error("Invalid pragma \\{name}")]
    UnknownPragma { name: String, span: Span },

    /// A pragma argument outside its allowed vocabulary.
    #[error("{expected} expected after \\{pragma}")]
    InvalidPragmaArgument {
        expected: String,
        pragma: String,
        span: Span,
    },
}

impl ParseError {
    /// The span of the offending lexeme, or of the end of input.
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnterminatedString { span }
            | ParseError::UnterminatedReference { span, .. }
            | ParseError::UnterminatedScript { span }
            | ParseError::UnrecognizedCharacter { span, .. }
            | ParseError::InvalidPragmaName { span }
            | ParseError::MissingCloser { span, .. }
            | ParseError::ExpectedToken { span, .. }
            | ParseError::UnexpectedToken { span, .. }
            | ParseError::UnknownPragma { span, .. }
            | ParseError::InvalidPragmaArgument { span, .. } => *span,
        }
    }

    /// Whether this failure is lexical or syntactic.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::UnterminatedString { .. }
            | ParseError::UnterminatedReference { .. }
            | ParseError::UnterminatedScript { .. }
            | ParseError::UnrecognizedCharacter { .. }
            | ParseError::InvalidPragmaName { .. } => ErrorKind::Lexical,
            ParseError::MissingCloser { .. }
            | ParseError::ExpectedToken { .. }
            | ParseError::UnexpectedToken { .. }
            | ParseError::UnknownPragma { .. }
            | ParseError::InvalidPragmaArgument { .. } => ErrorKind::Syntax,
        }
    }
}
