//! The assembled diagram.
//!
//! A [`Diagram`] wraps the parsed content in start and end termini, carries
//! the accumulated metrics for the whole drawing, and formats at most once:
//! the first call to [`Diagram::to_markup`], [`Diagram::attach`] or
//! [`Diagram::element`] runs the coordinate pass and the result is cached, so
//! repeated serialization yields identical output.

use log::debug;

use trestle_core::component::Component;
use trestle_core::options::SessionOptions;

use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::layout::{ITEM_PADDING, Node};
use crate::path::Path;
use crate::render::{Element, Surface};

/// A laid-out railroad diagram, ready to serialize or attach to a surface.
#[derive(Debug, Clone)]
pub struct Diagram {
    items: Vec<Node>,
    width: f64,
    up: f64,
    down: f64,
    height: f64,
    config: LayoutConfig,
    /// A script root bypasses layout and serializes verbatim.
    script: Option<String>,
    formatted: Option<Element>,
}

impl Diagram {
    /// Assemble a diagram from a parsed component tree.
    ///
    /// The session options decide the terminus styles, the start label and
    /// the end-of-line hook; they should be the options as they stood when
    /// the parse finished, since pragmas mutate them along the way.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] when a choice's normal branch index is out
    /// of range or an alternating sequence does not have exactly two
    /// children.
    pub fn new(
        root: &Component,
        options: &SessionOptions,
        config: LayoutConfig,
    ) -> Result<Self, LayoutError> {
        if let Component::Script { text } = root {
            return Ok(Self {
                items: Vec::new(),
                width: 0.0,
                up: 0.0,
                down: 0.0,
                height: 0.0,
                config,
                script: Some(text.clone()),
                formatted: None,
            });
        }

        let mut items = Vec::new();
        items.push(Node::start(options.start, options.start_label.clone()));
        match root {
            Component::Root { children } => {
                for child in children {
                    items.push(Node::build(child, &config)?);
                }
            }
            other => items.push(Node::build(other, &config)?),
        }
        items.push(Node::end(options.end, options.close_eol));

        // Stacked rows shift the baseline, so the vertical extents are
        // accumulated against the running height offset.
        let mut width = 0.0;
        let mut up: f64 = 0.0;
        let mut down: f64 = 0.0;
        let mut height = 0.0;
        for item in &items {
            let m = item.metrics();
            width += m.width + if m.needs_space { ITEM_PADDING * 2.0 } else { 0.0 };
            up = up.max(m.up - height);
            height += m.height;
            down = (down - m.height).max(m.down);
        }

        Ok(Self {
            items,
            width,
            up,
            down,
            height,
            config,
            script: None,
            formatted: None,
        })
    }

    /// The formatted element tree, computing it on first use.
    pub fn element(&mut self) -> &Element {
        if self.formatted.is_none() {
            self.formatted = Some(self.format());
        }
        self.formatted.as_ref().expect("formatted above")
    }

    /// Serialize the diagram to markup, formatting it first if needed.
    pub fn to_markup(&mut self) -> String {
        self.element().to_markup()
    }

    /// Materialize the diagram through a surface's element factory,
    /// formatting it first if needed.
    pub fn attach<S: Surface>(&mut self, surface: &mut S) -> S::Node {
        self.element().materialize(surface)
    }

    fn format(&self) -> Element {
        if let Some(script) = &self.script {
            return Element::with_raw_text("script", script);
        }

        let padding = self.config.padding;
        let mut x = padding.left;
        let mut y = padding.top + self.up;
        let mut g = Element::new("g");
        if self.config.stroke_odd_pixel_length {
            g = g.set("transform", "translate(.5 .5)");
        }

        for item in &self.items {
            let m = item.metrics();
            if m.needs_space {
                Path::start(x, y, self.config.arc_radius)
                    .h(ITEM_PADDING)
                    .add_to(&mut g);
                x += ITEM_PADDING;
            }
            g.add(item.format(x, y, m.width, &self.config));
            x += m.width;
            y += m.height;
            if m.needs_space {
                Path::start(x, y, self.config.arc_radius)
                    .h(ITEM_PADDING)
                    .add_to(&mut g);
                x += ITEM_PADDING;
            }
        }

        let total_width = self.width + padding.left + padding.right;
        let total_height = self.up + self.height + self.down + padding.top + padding.bottom;
        debug!(width = total_width, height = total_height; "Formatted diagram");

        let mut svg = Element::new("svg")
            .set("class", &self.config.diagram_class)
            .set("width", total_width)
            .set("height", total_height)
            .set("viewBox", format!("0 0 {total_width} {total_height}"));
        svg.add(g);
        svg
    }
}
