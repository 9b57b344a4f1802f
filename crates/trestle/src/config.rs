//! Configuration for layout and rendering.
//!
//! Layout constants are explicit configuration handed to the engine rather
//! than process-wide state, so diagrams with different settings can be built
//! side by side. All types implement [`serde::Deserialize`] for loading from
//! external sources such as the CLI's TOML configuration file.

use serde::Deserialize;

use trestle_core::options::SessionOptions;

/// How a shape distributes leftover width when it is allotted more than its
/// natural size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

/// Per-side whitespace around the finished diagram.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

impl Default for Padding {
    fn default() -> Self {
        Self::uniform(20.0)
    }
}

/// Geometry constants for the layout engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Radius of every quarter-circle connector arc.
    pub arc_radius: f64,
    /// Minimum clearance between a shape and the track above or below it.
    pub vertical_separation: f64,
    /// Gap distribution policy for over-allotted shapes.
    pub internal_alignment: Alignment,
    /// Advance per character in terminal and nonterminal captions.
    pub char_width: f64,
    /// Fixed box padding around terminal and nonterminal captions.
    pub text_padding: f64,
    /// Advance per character in comment captions.
    pub comment_char_width: f64,
    /// Fixed padding around comment captions.
    pub comment_padding: f64,
    /// CSS class on the diagram root element.
    pub diagram_class: String,
    /// Shift the drawing by half a pixel so odd-width strokes stay crisp.
    pub stroke_odd_pixel_length: bool,
    /// Whitespace around the finished diagram.
    pub padding: Padding,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            arc_radius: 10.0,
            vertical_separation: 8.0,
            internal_alignment: Alignment::default(),
            char_width: 8.0,
            text_padding: 20.0,
            comment_char_width: 7.0,
            comment_padding: 10.0,
            diagram_class: "railroad-diagram".to_string(),
            stroke_odd_pixel_length: true,
            padding: Padding::default(),
        }
    }
}

/// Top-level configuration: layout constants plus the initial session
/// options a parse starts from (pragmas may mutate their copy).
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub layout: LayoutConfig,
    pub options: SessionOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_diagram_constants() {
        let config = LayoutConfig::default();
        assert_eq!(config.arc_radius, 10.0);
        assert_eq!(config.vertical_separation, 8.0);
        assert_eq!(config.diagram_class, "railroad-diagram");
        assert!(config.stroke_odd_pixel_length);
        assert_eq!(config.padding, Padding::uniform(20.0));
    }
}
