//! Error adapter for converting CLI errors to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI. Parse errors
//! carry a span into the notation source, so they render with a labeled
//! source snippet; other errors render as plain reports.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use trestle_parser::{ErrorKind, ParseError, Span};

use crate::CliError;

/// Adapter for a parse error with its notation source.
pub struct ParseAdapter<'a> {
    /// The wrapped parse error
    err: &'a ParseError,
    /// Source code for displaying snippets
    src: &'a str,
}

impl<'a> ParseAdapter<'a> {
    pub fn new(err: &'a ParseError, src: &'a str) -> Self {
        Self { err, src }
    }
}

impl fmt::Debug for ParseAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseAdapter")
            .field("err", &self.err)
            .finish()
    }
}

impl fmt::Display for ParseAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.err, f)
    }
}

impl std::error::Error for ParseAdapter<'_> {}

impl MietteDiagnostic for ParseAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.err.kind() {
            ErrorKind::Lexical => "trestle::parse::lexical",
            ErrorKind::Syntax => "trestle::parse::syntax",
        };
        Some(Box::new(code))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = span_to_miette(self.err.span());
        Some(Box::new(std::iter::once(LabeledSpan::new_primary_with_span(
            Some("here".to_string()),
            span,
        ))))
    }
}

/// Adapter for [`CliError`] variants without source location information.
pub struct ErrorAdapter<'a>(pub &'a CliError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            CliError::Parse { .. } => return None,
            CliError::Layout(_) => "trestle::layout",
            CliError::Io(_) => "trestle::io",
            CliError::Config(_) => "trestle::config",
        };
        Some(Box::new(code))
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A parse error with a labeled source snippet.
    Parse(ParseAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Parse(p) => fmt::Display::fmt(p, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Parse(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Parse(p) => p.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Parse(p) => p.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Parse(p) => p.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a trestle [`Span`] to a miette [`SourceSpan`].
fn span_to_miette(span: Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Convert a [`CliError`] into the reportable form miette renders.
pub fn to_reportable(err: &CliError) -> Reportable<'_> {
    match err {
        CliError::Parse { err, src } => Reportable::Parse(ParseAdapter::new(err, src)),
        _ => Reportable::Error(ErrorAdapter(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_error(source: &str) -> CliError {
        let err = trestle::DiagramBuilder::default()
            .parse(source)
            .expect_err("source should fail");
        CliError::from_trestle(err, source)
    }

    #[test]
    fn parse_errors_carry_a_labeled_source_span() {
        let err = parse_error("a )");
        let reportable = to_reportable(&err);
        assert_eq!(reportable.to_string(), "Syntax error at )");
        assert_eq!(reportable.code().unwrap().to_string(), "trestle::parse::syntax");

        let labels: Vec<_> = reportable.labels().expect("has labels").collect();
        assert_eq!(labels.len(), 1);
        assert!(labels[0].primary());
        assert_eq!(labels[0].offset(), 2);
        assert_eq!(labels[0].len(), 1);
    }

    #[test]
    fn lexical_errors_use_the_lexical_code() {
        let err = parse_error("\"open");
        let reportable = to_reportable(&err);
        assert_eq!(
            reportable.code().unwrap().to_string(),
            "trestle::parse::lexical"
        );
    }

    #[test]
    fn io_errors_render_without_labels() {
        let err = CliError::Io(std::io::Error::other("no such file"));
        let reportable = to_reportable(&err);
        assert_eq!(reportable.code().unwrap().to_string(), "trestle::io");
        assert!(reportable.labels().is_none());
        assert!(reportable.source_code().is_none());
    }
}
