//! Host collaborator boundary.
//!
//! The engine does not know where transcluded text lives or what counts as an
//! external link; the embedding application does. A [`Host`] supplies both
//! answers. [`NullHost`] resolves nothing and [`MapHost`] serves references
//! from an in-memory table, which is also what the tests use.

use std::collections::HashMap;

/// Link schemes treated as external by the default classifier.
const EXTERNAL_SCHEMES: &[&str] = &[
    "file:", "http:", "https:", "mailto:", "ftp:", "irc:", "news:", "data:", "skype:",
];

/// Characters that terminate an external link target right after its scheme.
const INVALID_TARGET_CHARS: &str = "<>{}[]`|\"\\^";

/// Services a hosting application provides to the parser.
pub trait Host {
    /// Resolve the text behind a `{{reference}}` transclusion.
    ///
    /// Returning `None` means the reference is unknown; the parser then
    /// treats the transclusion as empty content rather than failing.
    fn resolve_reference(&self, reference: &str) -> Option<String> {
        let _ = reference;
        None
    }

    /// Decide whether a link target points outside the hosting document
    /// space. The default recognizes a fixed set of URI schemes.
    fn is_external_link(&self, target: &str) -> bool {
        EXTERNAL_SCHEMES.iter().any(|scheme| {
            target
                .strip_prefix(scheme)
                .and_then(|rest| rest.chars().next())
                .is_some_and(|c| !c.is_whitespace() && !INVALID_TARGET_CHARS.contains(c))
        })
    }
}

/// A host with no resolvable references.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl Host for NullHost {}

/// A host backed by an in-memory reference table.
#[derive(Debug, Clone, Default)]
pub struct MapHost {
    references: HashMap<String, String>,
}

impl MapHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the text a reference resolves to.
    pub fn insert(&mut self, reference: impl Into<String>, text: impl Into<String>) -> &mut Self {
        self.references.insert(reference.into(), text.into());
        self
    }
}

impl Host for MapHost {
    fn resolve_reference(&self, reference: &str) -> Option<String> {
        self.references.get(reference).cloned()
    }
}

impl<R, T> FromIterator<(R, T)> for MapHost
where
    R: Into<String>,
    T: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (R, T)>>(iter: I) -> Self {
        Self {
            references: iter
                .into_iter()
                .map(|(reference, text)| (reference.into(), text.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_classifier_recognizes_schemes() {
        let host = NullHost;
        assert!(host.is_external_link("https://example.org/grammar"));
        assert!(host.is_external_link("mailto:ops@example.org"));
        assert!(!host.is_external_link("Expression"));
        assert!(!host.is_external_link("https:"));
        assert!(!host.is_external_link("https: //spaced"));
    }

    #[test]
    fn map_host_resolves_registered_references() {
        let mut host = MapHost::new();
        host.insert("digits", "\"0\" \"1\"");
        assert_eq!(host.resolve_reference("digits").as_deref(), Some("\"0\" \"1\""));
        assert_eq!(host.resolve_reference("missing"), None);
    }
}
