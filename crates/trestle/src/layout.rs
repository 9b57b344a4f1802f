//! The layout/shape engine.
//!
//! A [`Node`] tree mirrors the component tree but carries geometry. Building
//! the tree ([`Node::build`]) is the bottom-up metrics pass: every node knows
//! its natural `width`, its vertical extents `up`/`down` around the center
//! line, the baseline offset `height` it imposes on what follows, and whether
//! it `needs_space` padding inside a sequence. Formatting
//! ([`Node::format`]) is the top-down pass assigning absolute coordinates
//! and emitting path primitives; a shape allotted more than its natural
//! width always honors the allotted width exactly by inserting connective
//! gaps per the alignment policy.
//!
//! Optional content, zero-or-more repetition and alternating sequences have
//! no geometry of their own: they desugar into choices over a skip run and
//! into repetitions while the node tree is built.

mod build;
mod format;

use trestle_core::component::LinkTarget;
use trestle_core::options::{MultipleChoiceMode, TerminusStyle};

use crate::config::{Alignment, LayoutConfig};

/// Size measurements of one shape, produced by the metrics pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct Metrics {
    /// Natural width along the travel direction.
    pub width: f64,
    /// Extent above the entry center line.
    pub up: f64,
    /// Extent below the exit center line.
    pub down: f64,
    /// Offset between entry and exit baselines (non-zero for stacked rows).
    pub height: f64,
    /// Whether sequence composition pads 10 units on each side.
    pub needs_space: bool,
}

/// One shape of the layout tree.
#[derive(Debug, Clone)]
pub(crate) enum Node {
    Terminal {
        text: String,
        metrics: Metrics,
    },
    Nonterminal {
        text: String,
        metrics: Metrics,
    },
    Comment {
        text: String,
        metrics: Metrics,
    },
    /// A plain run of track.
    Skip {
        metrics: Metrics,
    },
    Start {
        style: TerminusStyle,
        label: Option<String>,
        metrics: Metrics,
    },
    End {
        style: TerminusStyle,
        close_eol: bool,
        metrics: Metrics,
    },
    /// A navigation anchor wrapped around one shape.
    Anchor {
        target: LinkTarget,
        item: Box<Node>,
        metrics: Metrics,
    },
    Sequence {
        items: Vec<Node>,
        metrics: Metrics,
    },
    Stack {
        items: Vec<Node>,
        metrics: Metrics,
    },
    Choice {
        normal: usize,
        items: Vec<Node>,
        metrics: Metrics,
    },
    /// Branches in columns with an upper distribution track and a lower
    /// collection track.
    HorizontalChoice {
        items: Vec<Node>,
        upper_track: f64,
        lower_track: f64,
        metrics: Metrics,
    },
    /// A row of individually skippable items; the first bypasses below, the
    /// rest above.
    OptionalSequence {
        items: Vec<Node>,
        upper_track: f64,
        lower_track: f64,
        metrics: Metrics,
    },
    /// One-or-more repetition; the separator rides the backward loop at the
    /// precomputed offset.
    OneOrMore {
        item: Box<Node>,
        rep: Box<Node>,
        arrow: bool,
        loop_offset: f64,
        metrics: Metrics,
    },
    MultipleChoice {
        normal: usize,
        mode: MultipleChoiceMode,
        items: Vec<Node>,
        metrics: Metrics,
    },
}

impl Node {
    pub(crate) fn metrics(&self) -> Metrics {
        match self {
            Node::Terminal { metrics, .. }
            | Node::Nonterminal { metrics, .. }
            | Node::Comment { metrics, .. }
            | Node::Skip { metrics }
            | Node::Start { metrics, .. }
            | Node::End { metrics, .. }
            | Node::Anchor { metrics, .. }
            | Node::Sequence { metrics, .. }
            | Node::Stack { metrics, .. }
            | Node::Choice { metrics, .. }
            | Node::HorizontalChoice { metrics, .. }
            | Node::OptionalSequence { metrics, .. }
            | Node::OneOrMore { metrics, .. }
            | Node::MultipleChoice { metrics, .. } => *metrics,
        }
    }
}

/// Split the difference between an allotted width and a natural width
/// according to the alignment policy.
pub(crate) fn determine_gaps(config: &LayoutConfig, outer: f64, inner: f64) -> (f64, f64) {
    let diff = outer - inner;
    match config.internal_alignment {
        Alignment::Left => (0.0, diff),
        Alignment::Right => (diff, 0.0),
        Alignment::Center => (diff / 2.0, diff / 2.0),
    }
}

/// Connective padding drawn on each side of a `needs_space` item.
pub(crate) const ITEM_PADDING: f64 = 10.0;

/// Width of an item inside horizontal composition, including its
/// `needs_space` padding.
pub(crate) fn padded_width(metrics: Metrics) -> f64 {
    metrics.width
        + if metrics.needs_space {
            ITEM_PADDING * 2.0
        } else {
            0.0
        }
}
