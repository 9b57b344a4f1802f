//! The format pass: measured node tree in, positioned element tree out.
//!
//! Every shape is formatted at an allotted width at least its natural width.
//! When the allotment is larger, [`edge_gaps`] inserts connective runs on
//! both sides per the alignment policy, so the allotted width is always
//! honored exactly and sibling anchor lines stay aligned. All track paths
//! enter and leave a shape horizontally on its center line.

use trestle_core::options::{MultipleChoiceMode, TerminusStyle};

use crate::config::LayoutConfig;
use crate::layout::{ITEM_PADDING, Node, determine_gaps, padded_width};
use crate::path::{Path, Sweep};
use crate::render::Element;

/// Caption baseline offset below the center line.
const TEXT_BASELINE: f64 = 4.0;

impl Node {
    /// Assign coordinates and emit the drawable element for this shape.
    ///
    /// `width` is the allotted width; it must be at least the natural width
    /// from the metrics pass.
    pub(crate) fn format(&self, x: f64, y: f64, width: f64, config: &LayoutConfig) -> Element {
        match self {
            Node::Terminal { text, metrics } => {
                caption_box(text, metrics.width, x, y, width, true, config)
            }
            Node::Nonterminal { text, metrics } => {
                caption_box(text, metrics.width, x, y, width, false, config)
            }
            Node::Comment { text, metrics } => {
                let mut g = Element::new("g");
                let x = edge_gaps(&mut g, x, y, width, metrics.width, config);
                g.add(
                    Element::with_text("text", text)
                        .set("x", x + metrics.width / 2.0)
                        .set("y", y + TEXT_BASELINE + 1.0)
                        .set("class", "comment"),
                );
                g
            }
            Node::Skip { .. } => {
                let mut g = Element::new("g");
                Path::start(x, y, config.arc_radius)
                    .right(width)
                    .add_to(&mut g);
                g
            }
            Node::Start { style, label, .. } => format_start(*style, label.as_deref(), x, y),
            Node::End {
                style, close_eol, ..
            } => format_end(*style, *close_eol, x, y),
            Node::Anchor { target, item, .. } => {
                let mut a = Element::new("a").set("data-target", &target.target);
                if target.external {
                    a = a.set("data-external", "true");
                }
                a.add(item.format(x, y, width, config));
                a
            }
            Node::Sequence { items, metrics } => {
                let mut g = Element::new("g");
                let mut x = edge_gaps(&mut g, x, y, width, metrics.width, config);
                for item in items {
                    let m = item.metrics();
                    if m.needs_space {
                        Path::start(x, y, config.arc_radius)
                            .h(ITEM_PADDING)
                            .add_to(&mut g);
                        x += ITEM_PADDING;
                    }
                    g.add(item.format(x, y, m.width, config));
                    x += m.width;
                    if m.needs_space {
                        Path::start(x, y, config.arc_radius)
                            .h(ITEM_PADDING)
                            .add_to(&mut g);
                        x += ITEM_PADDING;
                    }
                }
                g
            }
            Node::Stack { items, metrics } => format_stack(items, metrics.width, x, y, width, config),
            Node::Choice {
                normal,
                items,
                metrics,
            } => {
                let mut g = Element::new("g");
                let x = edge_gaps(&mut g, x, y, width, metrics.width, config);
                format_choice(&mut g, items, *normal, x, y, metrics.width, config);
                g
            }
            Node::HorizontalChoice {
                items,
                upper_track,
                lower_track,
                metrics,
            } => {
                let mut g = Element::new("g");
                let x = edge_gaps(&mut g, x, y, width, metrics.width, config);
                format_horizontal_choice(&mut g, items, *upper_track, *lower_track, x, y, config);
                g
            }
            Node::OptionalSequence {
                items,
                upper_track,
                lower_track,
                metrics,
            } => {
                let mut g = Element::new("g");
                let x = edge_gaps(&mut g, x, y, width, metrics.width, config);
                format_optional_sequence(&mut g, items, *upper_track, *lower_track, x, y, config);
                g
            }
            Node::OneOrMore {
                item,
                rep,
                arrow,
                loop_offset,
                metrics,
            } => {
                let mut g = Element::new("g");
                let arc = config.arc_radius;
                let x = edge_gaps(&mut g, x, y, width, metrics.width, config);
                let inner = metrics.width - arc * 2.0;

                // Forward path through the item.
                Path::start(x, y, arc).right(arc).add_to(&mut g);
                g.add(item.format(x + arc, y, inner, config));
                Path::start(x + metrics.width - arc, y, arc)
                    .right(arc)
                    .add_to(&mut g);

                // Backward loop through the separator.
                let dist = *loop_offset;
                Path::start(x + arc, y, arc)
                    .arc(Sweep::Nw)
                    .down(dist - arc * 2.0)
                    .arc(Sweep::Ws)
                    .add_to(&mut g);
                g.add(rep.format(x + arc, y + dist, inner, config));
                Path::start(x + metrics.width - arc, y + dist, arc)
                    .arc(Sweep::Se)
                    .up(dist - arc * 2.0)
                    .arc(Sweep::En)
                    .add_to(&mut g);

                if *arrow {
                    // The chevron looks unbalanced when the loop is shallow,
                    // so its trailing stroke is stretched slightly.
                    let size = arc / 2.0;
                    let stretch = if dist < size * 5.0 { 1.2 } else { 1.0 };
                    Path::start(x - size, y + dist / 2.0 + size / 2.0, arc)
                        .with_class("arrow")
                        .line(size, -size)
                        .line(size * stretch, size)
                        .add_to(&mut g);
                }
                g
            }
            Node::MultipleChoice {
                normal,
                mode,
                items,
                metrics,
            } => {
                let mut g = Element::new("g");
                let x = edge_gaps(&mut g, x, y, width, metrics.width, config);

                // Leading marker box naming the branch-taking mode.
                let marker = super::build::MULTIPLE_CHOICE_MARKER_WIDTH;
                let tail = super::build::MULTIPLE_CHOICE_TAIL;
                g.add(
                    Element::new("rect")
                        .set("x", x)
                        .set("y", y - 11.0)
                        .set("width", marker)
                        .set("height", 22.0),
                );
                let label = match mode {
                    MultipleChoiceMode::All => "all",
                    MultipleChoiceMode::Any => "1+",
                };
                g.add(
                    Element::with_text("text", label)
                        .set("x", x + marker / 2.0)
                        .set("y", y + TEXT_BASELINE),
                );

                let choice_width = metrics.width - marker - tail;
                format_choice(&mut g, items, *normal, x + marker, y, choice_width, config);
                Path::start(x + metrics.width - tail, y, config.arc_radius)
                    .right(tail)
                    .add_to(&mut g);
                g
            }
        }
    }
}

/// Draw the connective runs splitting an over-allotment between the two
/// sides, returning the x where the shape proper starts.
fn edge_gaps(
    g: &mut Element,
    x: f64,
    y: f64,
    width: f64,
    natural: f64,
    config: &LayoutConfig,
) -> f64 {
    let (before, after) = determine_gaps(config, width, natural);
    Path::start(x, y, config.arc_radius).h(before).add_to(g);
    Path::start(x + before + natural, y, config.arc_radius)
        .h(after)
        .add_to(g);
    x + before
}

fn caption_box(
    text: &str,
    natural: f64,
    x: f64,
    y: f64,
    width: f64,
    rounded: bool,
    config: &LayoutConfig,
) -> Element {
    let mut g = Element::new("g");
    let x = edge_gaps(&mut g, x, y, width, natural, config);
    let mut rect = Element::new("rect")
        .set("x", x)
        .set("y", y - 11.0)
        .set("width", natural)
        .set("height", 22.0);
    if rounded {
        rect = rect
            .set("rx", config.arc_radius)
            .set("ry", config.arc_radius);
    }
    g.add(rect);
    g.add(
        Element::with_text("text", text)
            .set("x", x + natural / 2.0)
            .set("y", y + TEXT_BASELINE),
    );
    g
}

fn format_start(style: TerminusStyle, label: Option<&str>, x: f64, y: f64) -> Element {
    let d = match style {
        TerminusStyle::Simple => format!("M {x} {} v 20 m 0 -10 h 10.5", y - 10.0),
        TerminusStyle::Complex => {
            format!("M {x} {} v 20 m 10 -20 v 20 m -10 -10 h 20.5", y - 10.0)
        }
    };
    let path = Element::new("path").set("d", d);
    match label {
        Some(label) => {
            let mut g = Element::new("g");
            g.add(path);
            g.add(
                Element::with_text("text", label)
                    .set("x", x)
                    .set("y", y - 15.0)
                    .set("style", "text-anchor:start"),
            );
            g
        }
        None => path,
    }
}

fn format_end(style: TerminusStyle, close_eol: bool, x: f64, y: f64) -> Element {
    let mut d = match style {
        TerminusStyle::Simple => format!("M {x} {y} h 10 m 0 -10 v 20"),
        TerminusStyle::Complex => format!("M {x} {y} h 20 m -10 -10 v 20 m 10 -20 v 20"),
    };
    if close_eol {
        // Hook the track down past the final bar to mark end-of-line.
        d.push_str(" m 0 -10 h 6 v 10");
    }
    Element::new("path").set("d", d)
}

fn format_stack(
    items: &[Node],
    natural: f64,
    x: f64,
    y: f64,
    width: f64,
    config: &LayoutConfig,
) -> Element {
    let mut g = Element::new("g");
    let arc = config.arc_radius;
    let separation = config.vertical_separation;
    let (before, after) = determine_gaps(config, width, natural);
    Path::start(x, y, arc).h(before).add_to(&mut g);
    let mut x = x + before;
    let mut y = y;

    let x_initial = x;
    let inset = if items.len() > 1 { arc } else { 0.0 };
    if items.len() > 1 {
        Path::start(x, y, arc).h(arc).add_to(&mut g);
        x += arc;
    }
    let inner = natural - inset * 2.0;

    let last = items.len() - 1;
    for (index, item) in items.iter().enumerate() {
        let m = item.metrics();
        g.add(item.format(x, y, inner, config));
        x += inner;
        y += m.height;

        if index != last {
            let next_up = items[index + 1].metrics().up;
            Path::start(x, y, arc)
                .arc(Sweep::Ne)
                .down(f64::max(0.0, m.down + separation - arc * 2.0))
                .arc(Sweep::Es)
                .left(inner)
                .arc(Sweep::Nw)
                .down(f64::max(0.0, next_up + separation - arc * 2.0))
                .arc(Sweep::Ws)
                .add_to(&mut g);
            y += f64::max(m.down + separation, arc * 2.0)
                + f64::max(next_up + separation, arc * 2.0);
            x = x_initial + arc;
        }
    }

    if items.len() > 1 {
        Path::start(x, y, arc).h(arc).add_to(&mut g);
        x += arc;
    }
    Path::start(x, y, arc).h(after).add_to(&mut g);
    g
}

/// Draw a choice's branches at `x..x+width` around the center line `y`.
///
/// The caller has already accounted for any over-allotment; `width` is the
/// natural choice width. The normal branch runs straight; branches above and
/// below leave through quarter-arc pairs at offsets accumulated with the same
/// separation formula as the metrics pass.
fn format_choice(
    g: &mut Element,
    items: &[Node],
    normal: usize,
    x: f64,
    y: f64,
    width: f64,
    config: &LayoutConfig,
) {
    let arc = config.arc_radius;
    let separation = config.vertical_separation;
    let last = items.len() - 1;
    let inner = width - arc * 4.0;

    // Branches curving above the normal route.
    let mut dist = 0.0;
    for index in (0..normal).rev() {
        let m = items[index].metrics();
        if index == normal - 1 {
            dist = f64::max(arc * 2.0, items[normal].metrics().up + separation + m.down);
        }
        Path::start(x, y, arc)
            .arc(Sweep::Se)
            .up(dist - arc * 2.0)
            .arc(Sweep::Wn)
            .add_to(g);
        g.add(items[index].format(x + arc * 2.0, y - dist, inner, config));
        Path::start(x + arc * 2.0 + inner, y - dist, arc)
            .arc(Sweep::Ne)
            .down(dist - arc * 2.0)
            .arc(Sweep::Ws)
            .add_to(g);
        let above = if index == 0 {
            0.0
        } else {
            items[index - 1].metrics().down
        };
        dist += f64::max(arc, m.up + separation + above);
    }

    // The straight-through route.
    Path::start(x, y, arc).right(arc * 2.0).add_to(g);
    g.add(items[normal].format(x + arc * 2.0, y, inner, config));
    Path::start(x + arc * 2.0 + inner, y, arc)
        .right(arc * 2.0)
        .add_to(g);

    // Branches curving below.
    let mut dist = 0.0;
    for index in normal + 1..=last {
        let m = items[index].metrics();
        if index == normal + 1 {
            dist = f64::max(arc * 2.0, items[normal].metrics().down + separation + m.up);
        }
        Path::start(x, y, arc)
            .arc(Sweep::Ne)
            .down(dist - arc * 2.0)
            .arc(Sweep::Ws)
            .add_to(g);
        g.add(items[index].format(x + arc * 2.0, y + dist, inner, config));
        Path::start(x + arc * 2.0 + inner, y + dist, arc)
            .arc(Sweep::Se)
            .up(dist - arc * 2.0)
            .arc(Sweep::Wn)
            .add_to(g);
        let below = if index == last {
            0.0
        } else {
            items[index + 1].metrics().up
        };
        dist += f64::max(arc, m.down + separation + below);
    }
}

/// Branches side by side: the first is entered on the line, later ones
/// descend from an upper distribution track; all but the last drop onto a
/// lower collection track that rises back to the exit.
fn format_horizontal_choice(
    g: &mut Element,
    items: &[Node],
    upper_track: f64,
    lower_track: f64,
    x: f64,
    y: f64,
    config: &LayoutConfig,
) {
    let arc = config.arc_radius;
    let last = items.len() - 1;

    // Column start positions, separated by one arc-pair gap.
    let mut columns = Vec::with_capacity(items.len());
    let mut cx = x + arc * 2.0;
    for item in items {
        columns.push(cx);
        cx += padded_width(item.metrics()) + arc * 2.0;
    }

    // Entry run into the first branch, and the upper distribution track
    // reaching the descent point of the last branch.
    Path::start(x, y, arc).right(arc * 2.0).add_to(g);
    Path::start(x, y, arc)
        .arc(Sweep::Se)
        .up(upper_track - arc * 2.0)
        .arc(Sweep::Wn)
        .right(columns[last] - arc * 2.0 - (x + arc * 2.0))
        .add_to(g);

    for (index, item) in items.iter().enumerate() {
        let m = item.metrics();
        let column = columns[index];
        if index > 0 {
            Path::start(column - arc * 2.0, y - upper_track, arc)
                .arc(Sweep::Ne)
                .down(upper_track - arc * 2.0)
                .arc(Sweep::Ws)
                .add_to(g);
        }
        g.add(item.format(column, y, padded_width(m), config));

        let exit = column + padded_width(m);
        if index == last {
            // The last branch leaves straight ahead.
            Path::start(exit, y, arc).right(arc * 2.0).add_to(g);
        } else {
            // Earlier branches drop onto the collection track and run to the
            // next drop point, the final one rising back up to the exit.
            let drop = Path::start(exit, y, arc)
                .arc(Sweep::Ne)
                .down(lower_track - arc * 2.0)
                .arc(Sweep::Ws);
            if index == last - 1 {
                drop.right(padded_width(items[last].metrics()))
                    .arc(Sweep::Se)
                    .up(lower_track - arc * 2.0)
                    .arc(Sweep::Wn)
                    .add_to(g);
            } else {
                drop.right(padded_width(items[index + 1].metrics()) + arc * 2.0)
                    .add_to(g);
            }
        }
    }
}

/// A row of individually skippable items: every item sits in its own segment
/// with a bypass, below the line for the first item and above for the rest.
fn format_optional_sequence(
    g: &mut Element,
    items: &[Node],
    upper_track: f64,
    lower_track: f64,
    x: f64,
    y: f64,
    config: &LayoutConfig,
) {
    let arc = config.arc_radius;
    let mut segment = x;
    for (index, item) in items.iter().enumerate() {
        let m = item.metrics();
        let item_width = padded_width(m);

        Path::start(segment, y, arc).right(arc * 2.0).add_to(g);
        g.add(item.format(segment + arc * 2.0, y, item_width, config));
        Path::start(segment + arc * 2.0 + item_width, y, arc)
            .right(arc * 2.0)
            .add_to(g);

        let run = f64::max(0.0, item_width - arc * 2.0);
        if index == 0 {
            Path::start(segment, y, arc)
                .arc(Sweep::Ne)
                .down(lower_track - arc * 2.0)
                .arc(Sweep::Ws)
                .right(run)
                .arc(Sweep::Se)
                .up(lower_track - arc * 2.0)
                .arc(Sweep::Wn)
                .add_to(g);
        } else {
            Path::start(segment, y, arc)
                .arc(Sweep::Se)
                .up(upper_track - arc * 2.0)
                .arc(Sweep::Wn)
                .right(run)
                .arc(Sweep::Ne)
                .down(upper_track - arc * 2.0)
                .arc(Sweep::Ws)
                .add_to(g);
        }
        segment += item_width + arc * 4.0;
    }
}
