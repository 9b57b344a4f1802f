//! Session options for a single parse/render invocation.
//!
//! A [`SessionOptions`] value is created per top-level parse and mutated in
//! place by pragmas encountered in the notation. Nested transclusion parses
//! share the same instance, so a pragma inside a transclusion affects content
//! parsed afterwards in the parent.

use serde::Deserialize;

/// Rendering style of a start or end terminus marker.
///
/// `Simple` draws a single bar, `Complex` a double bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminusStyle {
    Simple,
    Complex,
}

/// Branch-taking mode of a multiple choice: every branch (`All`, `($…$)`)
/// or any non-empty subset (`Any`, `(&…&)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultipleChoiceMode {
    All,
    Any,
}

/// Mutable per-invocation settings, adjusted by pragmas during parsing.
///
/// The same instance is threaded through nested transclusion parses; its
/// lifetime is one top-level parse invocation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionOptions {
    /// Draw direction chevrons on repetition loops (`\showArrows yes|no`).
    pub show_arrows: bool,
    /// End markers additionally hook down to mark end-of-line (`\closeEol yes|no`).
    pub close_eol: bool,
    /// Emit the component dump instead of a diagram (`\debug`).
    pub debug: bool,
    /// Style of the leading terminus (`\start simple|complex`).
    pub start: TerminusStyle,
    /// Optional caption above the leading terminus (`\startLabel "…"`).
    pub start_label: Option<String>,
    /// Style of the trailing terminus (`\end simple|complex`).
    pub end: TerminusStyle,
    /// Delimiter splitting a caption from its link target (`\titleLinkDelim "…"`).
    pub title_link_delim: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            show_arrows: true,
            close_eol: false,
            debug: false,
            start: TerminusStyle::Simple,
            start_label: None,
            end: TerminusStyle::Complex,
            title_link_delim: "|".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = SessionOptions::default();
        assert!(options.show_arrows);
        assert!(!options.close_eol);
        assert!(!options.debug);
        assert_eq!(options.start, TerminusStyle::Simple);
        assert_eq!(options.end, TerminusStyle::Complex);
        assert_eq!(options.title_link_delim, "|");
        assert_eq!(options.start_label, None);
    }

    #[test]
    fn deserializes_pragma_vocabulary() {
        let options: SessionOptions = serde_json::from_str(
            r#"{"showArrows": false, "start": "complex", "titleLinkDelim": "#"}"#,
        )
        .expect("valid options document");
        assert!(!options.show_arrows);
        assert_eq!(options.start, TerminusStyle::Complex);
        assert_eq!(options.end, TerminusStyle::Complex);
        assert_eq!(options.title_link_delim, "#");
    }
}
