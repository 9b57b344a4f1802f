//! Drawable element tree, markup serializer and surface adapter.
//!
//! Layout produces a tree of [`Element`]s: a tag, an insertion-ordered
//! attribute map and either text or child elements. The tree has two
//! materializations: serialize it to markup with [`Element::to_markup`], or
//! walk it through a [`Surface`] element factory such as [`SvgSurface`],
//! which builds `svg` crate nodes for a live document.

use std::fmt;

use indexmap::IndexMap;
use svg::Node as _;

/// Contents of an element: leaf text, verbatim text exempt from escaping,
/// or nested children.
#[derive(Debug, Clone, PartialEq)]
pub enum Children {
    Text(String),
    /// Verbatim payload serialized without escaping, used for script roots.
    Raw(String),
    Elements(Vec<Element>),
}

/// One drawable element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: String,
    attrs: IndexMap<String, String>,
    children: Children,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: IndexMap::new(),
            children: Children::Elements(Vec::new()),
        }
    }

    pub fn with_text(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: IndexMap::new(),
            children: Children::Text(text.into()),
        }
    }

    /// An element whose text payload serializes verbatim.
    pub fn with_raw_text(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: IndexMap::new(),
            children: Children::Raw(text.into()),
        }
    }

    /// Set an attribute, keeping insertion order for serialization.
    pub fn set(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.attrs.insert(name.into(), value.to_string());
        self
    }

    pub fn add(&mut self, child: Element) {
        match &mut self.children {
            Children::Elements(children) => children.push(child),
            Children::Text(_) | Children::Raw(_) => {
                // Text elements stay leaves; drawing code never mixes both.
                debug_assert!(false, "cannot add children to a text element");
            }
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn attrs(&self) -> &IndexMap<String, String> {
        &self.attrs
    }

    pub fn children(&self) -> &Children {
        &self.children
    }

    /// Depth-first iterator over this element and all descendants.
    pub fn walk(&self) -> Vec<&Element> {
        let mut found = vec![self];
        if let Children::Elements(children) = &self.children {
            for child in children {
                found.extend(child.walk());
            }
        }
        found
    }

    /// Serialize to markup. Attribute values escape `&` and `"`; text
    /// escapes `&` and `<`.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attribute(value));
            out.push('"');
        }
        out.push('>');
        if self.tag == "g" || self.tag == "svg" {
            out.push('\n');
        }
        match &self.children {
            Children::Text(text) => out.push_str(&escape_text(text)),
            Children::Raw(text) => out.push_str(text),
            Children::Elements(children) => {
                for child in children {
                    child.write_markup(out);
                }
            }
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push_str(">\n");
    }

    /// Materialize the tree through a surface's element factory.
    pub fn materialize<S: Surface>(&self, surface: &mut S) -> S::Node {
        match &self.children {
            Children::Text(text) | Children::Raw(text) => {
                surface.element(&self.tag, &self.attrs, Some(text), Vec::new())
            }
            Children::Elements(children) => {
                let nodes = children
                    .iter()
                    .map(|child| child.materialize(surface))
                    .collect();
                surface.element(&self.tag, &self.attrs, None, nodes)
            }
        }
    }
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

fn escape_text(value: &str) -> String {
    value.replace('&', "&amp;").replace('<', "&lt;")
}

/// A drawing-surface element factory.
///
/// The engine stays ignorant of the final document model; a surface turns
/// each tag, attribute map and text payload into whatever node type the
/// hosting document uses.
pub trait Surface {
    type Node;

    fn element(
        &mut self,
        tag: &str,
        attrs: &IndexMap<String, String>,
        text: Option<&str>,
        children: Vec<Self::Node>,
    ) -> Self::Node;
}

/// A surface producing [`svg`] crate nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgSurface;

impl Surface for SvgSurface {
    type Node = svg::node::element::Element;

    fn element(
        &mut self,
        tag: &str,
        attrs: &IndexMap<String, String>,
        text: Option<&str>,
        children: Vec<Self::Node>,
    ) -> Self::Node {
        let mut element = svg::node::element::Element::new(tag);
        for (name, value) in attrs {
            element.assign(name.clone(), value.clone());
        }
        if let Some(text) = text {
            element.append(svg::node::Text::new(text));
        }
        for child in children {
            element.append(child);
        }
        element
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_attributes_in_insertion_order() {
        let mut g = Element::new("g");
        g.add(
            Element::new("rect")
                .set("x", 4)
                .set("y", -11)
                .set("width", 28),
        );
        assert_eq!(
            g.to_markup(),
            "<g>\n<rect x=\"4\" y=\"-11\" width=\"28\"></rect>\n</g>\n"
        );
    }

    #[test]
    fn escapes_attributes_and_text() {
        let element = Element::with_text("text", "a < b & \"c\"").set("class", "say \"hi\" & bye");
        assert_eq!(
            element.to_markup(),
            "<text class=\"say &quot;hi&quot; &amp; bye\">a &lt; b &amp; \"c\"</text>\n"
        );
    }

    #[test]
    fn raw_text_is_not_escaped() {
        let element = Element::with_raw_text("script", "if (a < b) { draw() }");
        assert_eq!(
            element.to_markup(),
            "<script>if (a < b) { draw() }</script>\n"
        );
    }

    #[test]
    fn group_tags_get_a_newline_after_opening() {
        assert_eq!(Element::new("svg").to_markup(), "<svg>\n</svg>\n");
        assert_eq!(Element::new("path").to_markup(), "<path></path>\n");
    }

    #[test]
    fn materializes_through_the_svg_surface() {
        let mut g = Element::new("g");
        g.add(Element::with_text("text", "label").set("x", 14));
        let node = g.materialize(&mut SvgSurface);
        let rendered = node.to_string();
        assert!(rendered.contains("<g>"));
        assert!(rendered.contains("label"));
    }
}
