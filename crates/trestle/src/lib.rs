//! Trestle - railroad diagrams from a compact grammar notation.
//!
//! Notation text like `"begin" {item + ","} [:tail]` is tokenized and parsed
//! into a component tree, laid out into absolute-coordinate vector paths, and
//! serialized to SVG markup or attached to a drawing surface.

pub mod config;

mod diagram;
mod error;
mod layout;
mod path;
mod render;

pub use trestle_core::{component, host, options};

pub use diagram::Diagram;
pub use error::{LayoutError, TrestleError};
pub use render::{Children, Element, Surface, SvgSurface};

use log::{debug, info, trace};

use trestle_core::component::Component;
use trestle_core::host::{Host, NullHost};
use trestle_core::options::SessionOptions;

use config::RenderConfig;

/// The result of parsing notation source: the component tree plus the
/// session options as pragmas left them.
#[derive(Debug, Clone)]
pub struct Parsed {
    root: Component,
    options: SessionOptions,
}

impl Parsed {
    pub fn root(&self) -> &Component {
        &self.root
    }

    /// The options after every pragma in the source (and in any transcluded
    /// source) has been applied.
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// The indented component dump shown for the `debug` pragma.
    pub fn debug_dump(&self) -> String {
        self.root.debug_dump()
    }
}

/// Builder for parsing and rendering Trestle diagrams.
///
/// This provides an API for processing railroad notation through the
/// parsing, layout, and rendering stages.
///
/// # Examples
///
/// ```rust,no_run
/// use trestle::{DiagramBuilder, config::RenderConfig};
///
/// let source = r#""commit" {file-name} [:"--amend"]"#;
///
/// let builder = DiagramBuilder::new(RenderConfig::default());
///
/// // Parse notation into a component tree
/// let parsed = builder.parse(source)
///     .expect("Failed to parse");
///
/// // Render the component tree to SVG markup
/// let svg = builder.render(&parsed)
///     .expect("Failed to render");
///
/// // Or use default config
/// let builder = DiagramBuilder::default();
/// ```
pub struct DiagramBuilder {
    config: RenderConfig,
    host: Box<dyn Host>,
}

impl Default for DiagramBuilder {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

impl DiagramBuilder {
    /// Create a new diagram builder with the given configuration.
    ///
    /// The configuration carries both the layout constants and the initial
    /// session options a parse starts from. References resolve through
    /// [`NullHost`] until [`DiagramBuilder::with_host`] supplies another.
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            host: Box::new(NullHost),
        }
    }

    /// Use `host` to resolve transclusion references and classify link
    /// targets.
    pub fn with_host(mut self, host: impl Host + 'static) -> Self {
        self.host = Box::new(host);
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Parse notation source into a component tree.
    ///
    /// Starts from a copy of the configured session options; pragmas in the
    /// source mutate that copy, and the final state is returned alongside
    /// the tree.
    ///
    /// # Errors
    ///
    /// Returns `TrestleError` for lexical and syntax errors. The parse
    /// aborts on the first failure; there is no partial tree.
    pub fn parse(&self, source: &str) -> Result<Parsed, TrestleError> {
        info!("Parsing notation");

        let mut options = self.config.options.clone();
        let root = trestle_parser::parse(source, &mut options, self.host.as_ref())?;

        debug!("Notation parsed successfully");
        trace!(root:?; "Parsed component tree");

        Ok(Parsed { root, options })
    }

    /// Lay out a parsed component tree into a [`Diagram`].
    ///
    /// # Errors
    ///
    /// Returns `TrestleError` for configuration errors such as an
    /// out-of-range normal branch index.
    pub fn diagram(&self, parsed: &Parsed) -> Result<Diagram, TrestleError> {
        info!("Laying out diagram");
        let diagram = Diagram::new(&parsed.root, &parsed.options, self.config.layout.clone())?;
        debug!("Layout calculated");
        Ok(diagram)
    }

    /// Render a parsed component tree to SVG markup.
    ///
    /// # Errors
    ///
    /// Returns `TrestleError` for layout errors.
    pub fn render(&self, parsed: &Parsed) -> Result<String, TrestleError> {
        let mut diagram = self.diagram(parsed)?;
        let markup = diagram.to_markup();
        info!("SVG rendered successfully");
        Ok(markup)
    }
}
