//! The path-drawing primitive.
//!
//! A [`Path`] accumulates drawing commands into a single `d` attribute
//! string: relative horizontal/vertical lines, quarter-circle arcs named by
//! their compass sweep, raw lines and moves. Every path in the layout engine
//! starts and ends horizontally.

use crate::render::Element;

/// The eight quarter-arc sweeps, named by entry and exit heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sweep {
    Ne,
    Nw,
    Es,
    En,
    Ws,
    Wn,
    Se,
    Sw,
}

impl Sweep {
    /// The arc's endpoint offset and sweep direction for radius `r`.
    fn deltas(self, r: f64) -> (f64, f64, u8) {
        match self {
            Sweep::Ne => (r, r, 1),
            Sweep::Nw => (-r, r, 0),
            Sweep::Es => (-r, r, 1),
            Sweep::En => (-r, -r, 0),
            Sweep::Ws => (r, r, 0),
            Sweep::Wn => (r, -r, 1),
            Sweep::Se => (r, -r, 0),
            Sweep::Sw => (-r, -r, 1),
        }
    }
}

/// An exclusively-owned accumulator for one `path` element.
#[derive(Debug, Clone)]
pub(crate) struct Path {
    d: String,
    class: Option<&'static str>,
    arc_radius: f64,
}

impl Path {
    pub fn start(x: f64, y: f64, arc_radius: f64) -> Self {
        Self {
            d: format!("M{x} {y}"),
            class: None,
            arc_radius,
        }
    }

    pub fn with_class(mut self, class: &'static str) -> Self {
        self.class = Some(class);
        self
    }

    pub fn h(mut self, length: f64) -> Self {
        self.d.push_str(&format!("h{length}"));
        self
    }

    pub fn right(self, length: f64) -> Self {
        self.h(length)
    }

    pub fn left(self, length: f64) -> Self {
        self.h(-length)
    }

    pub fn v(mut self, length: f64) -> Self {
        self.d.push_str(&format!("v{length}"));
        self
    }

    pub fn down(self, length: f64) -> Self {
        self.v(length)
    }

    pub fn up(self, length: f64) -> Self {
        self.v(-length)
    }

    /// A quarter-circle arc at the configured radius.
    pub fn arc(mut self, sweep: Sweep) -> Self {
        let r = self.arc_radius;
        let (dx, dy, cw) = sweep.deltas(r);
        self.d.push_str(&format!("a{r} {r} 0 0 {cw} {dx} {dy}"));
        self
    }

    /// A raw straight line.
    pub fn line(mut self, dx: f64, dy: f64) -> Self {
        self.d.push_str(&format!("l{dx} {dy}"));
        self
    }

    pub fn into_element(self) -> Element {
        let element = Element::new("path");
        let element = match self.class {
            Some(class) => element.set("class", class),
            None => element,
        };
        element.set("d", self.d)
    }

    pub fn add_to(self, parent: &mut Element) {
        parent.add(self.into_element());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_relative_commands() {
        let path = Path::start(20.0, 31.0, 10.0).h(10.0).down(4.0).left(2.5);
        let element = path.into_element();
        assert_eq!(element.attr("d"), Some("M20 31h10v4h-2.5"));
    }

    #[test]
    fn arcs_carry_radius_and_sweep() {
        let path = Path::start(0.0, 0.0, 10.0).arc(Sweep::Ne);
        assert_eq!(element_d(path), "M0 0a10 10 0 0 1 10 10");
        let path = Path::start(0.0, 0.0, 10.0).arc(Sweep::En);
        assert_eq!(element_d(path), "M0 0a10 10 0 0 0 -10 -10");
    }

    #[test]
    fn class_precedes_path_data() {
        let element = Path::start(0.0, 0.0, 10.0)
            .with_class("arrow")
            .line(5.0, -5.0)
            .into_element();
        assert_eq!(element.attr("class"), Some("arrow"));
        assert_eq!(element.to_markup(), "<path class=\"arrow\" d=\"M0 0l5 -5\"></path>\n");
    }

    fn element_d(path: Path) -> String {
        path.into_element().attr("d").unwrap().to_string()
    }
}
