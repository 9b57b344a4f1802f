//! The metrics pass: component tree in, measured node tree out.
//!
//! Each constructor here is a pure function of its children's metrics, so
//! the tree is built bottom-up in one traversal.

use log::debug;

use trestle_core::component::{Component, LinkTarget};
use trestle_core::options::{MultipleChoiceMode, TerminusStyle};

use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::layout::{Metrics, Node, padded_width};

/// Width of the mode marker box leading a multiple choice.
pub(super) const MULTIPLE_CHOICE_MARKER_WIDTH: f64 = 30.0;
/// Length of the run trailing a multiple choice.
pub(super) const MULTIPLE_CHOICE_TAIL: f64 = 20.0;
/// Length of the end-of-line hook on an end marker.
const EOL_HOOK_WIDTH: f64 = 6.0;

impl Node {
    /// Convert a component into its measured shape.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] when a choice's normal index is out of
    /// range or an alternating sequence does not have exactly two children.
    pub(crate) fn build(component: &Component, config: &LayoutConfig) -> Result<Node, LayoutError> {
        Ok(match component {
            Component::Terminal { text, link } => with_link(
                Node::Terminal {
                    text: text.clone(),
                    metrics: caption_box(text, config.char_width, config.text_padding),
                },
                link,
            ),
            Component::Nonterminal { text, link } => with_link(
                Node::Nonterminal {
                    text: text.clone(),
                    metrics: caption_box(text, config.char_width, config.text_padding),
                },
                link,
            ),
            Component::Comment { text, link } => with_link(
                Node::Comment {
                    text: text.clone(),
                    metrics: caption_box(text, config.comment_char_width, config.comment_padding),
                },
                link,
            ),
            Component::Dummy => Node::skip(),
            Component::End { style, close_eol } => Node::end(*style, *close_eol),
            Component::Script { .. } => {
                // A script can only reach layout embedded in transcluded
                // content; it has no geometry there.
                debug!("embedded script has no layout; emitting a skip");
                Node::skip()
            }
            Component::Optional { child, normal } => {
                let item = Node::build(child, config)?;
                choice(vec![Node::skip(), item], usize::from(*normal), config)?
            }
            Component::OptionalRepeated {
                child,
                separator,
                normal,
            } => {
                let repetition = one_or_more(child, separator.as_deref(), false, config)?;
                choice(vec![Node::skip(), repetition], usize::from(*normal), config)?
            }
            Component::Repeated {
                child,
                separator,
                arrows,
            } => one_or_more(child, separator.as_deref(), *arrows, config)?,
            Component::Link { child, target } => {
                let item = Node::build(child, config)?;
                anchor(item, target.clone())
            }
            Component::Transclusion { child } => Node::build(child, config)?,
            Component::Sequence { children } => sequence(children, config)?,
            Component::Stack { children } => stack(children, config)?,
            Component::Choice { normal, branches } => {
                let items = build_all(branches, config)?;
                choice(items, *normal, config)?
            }
            Component::AlternatingSequence { branches } => {
                if branches.len() != 2 {
                    return Err(LayoutError::AlternatingArity {
                        found: branches.len(),
                    });
                }
                // Alternation is the repetition of the first child with the
                // second riding the return loop.
                let item = Node::build(&branches[0], config)?;
                let rep = Node::build(&branches[1], config)?;
                one_or_more_nodes(item, rep, false, config)
            }
            Component::OptionalSequence { branches } => {
                let items = build_all(branches, config)?;
                optional_sequence(items, config)
            }
            Component::HorizontalChoice { branches } => {
                let items = build_all(branches, config)?;
                horizontal_choice(items, config)
            }
            Component::MultipleChoice {
                normal,
                mode,
                branches,
            } => {
                let items = build_all(branches, config)?;
                multiple_choice(items, *normal, *mode, config)?
            }
            Component::Root { children } => sequence(children, config)?,
        })
    }

    pub(crate) fn skip() -> Node {
        Node::Skip {
            metrics: Metrics::default(),
        }
    }

    pub(crate) fn start(style: TerminusStyle, label: Option<String>) -> Node {
        Node::Start {
            style,
            label,
            metrics: Metrics {
                width: terminus_width(style),
                up: 10.0,
                down: 10.0,
                height: 0.0,
                needs_space: false,
            },
        }
    }

    pub(crate) fn end(style: TerminusStyle, close_eol: bool) -> Node {
        let hook = if close_eol { EOL_HOOK_WIDTH } else { 0.0 };
        Node::End {
            style,
            close_eol,
            metrics: Metrics {
                width: terminus_width(style) + hook,
                up: 10.0,
                down: 10.0,
                height: 0.0,
                needs_space: false,
            },
        }
    }
}

fn terminus_width(style: TerminusStyle) -> f64 {
    match style {
        TerminusStyle::Simple => 10.0,
        TerminusStyle::Complex => 20.0,
    }
}

fn build_all(components: &[Component], config: &LayoutConfig) -> Result<Vec<Node>, LayoutError> {
    components
        .iter()
        .map(|component| Node::build(component, config))
        .collect()
}

/// Metrics of a captioned box: one advance per character plus fixed padding.
fn caption_box(text: &str, char_width: f64, padding: f64) -> Metrics {
    Metrics {
        width: text.chars().count() as f64 * char_width + padding,
        up: 11.0,
        down: 11.0,
        height: 0.0,
        needs_space: true,
    }
}

fn with_link(node: Node, link: &Option<LinkTarget>) -> Node {
    match link {
        Some(target) => anchor(node, target.clone()),
        None => node,
    }
}

fn anchor(item: Node, target: LinkTarget) -> Node {
    let metrics = Metrics {
        needs_space: true,
        ..item.metrics()
    };
    Node::Anchor {
        target,
        item: Box::new(item),
        metrics,
    }
}

fn sequence(children: &[Component], config: &LayoutConfig) -> Result<Node, LayoutError> {
    let items = build_all(children, config)?;
    let mut metrics = Metrics::default();
    for item in &items {
        let m = item.metrics();
        metrics.width += padded_width(m);
        metrics.up = metrics.up.max(m.up);
        metrics.down = metrics.down.max(m.down);
    }
    Ok(Node::Sequence { items, metrics })
}

fn stack(children: &[Component], config: &LayoutConfig) -> Result<Node, LayoutError> {
    let mut items = build_all(children, config)?;
    if items.is_empty() {
        items.push(Node::skip());
    }
    let arc = config.arc_radius;
    let separation = config.vertical_separation;
    let last = items.len() - 1;

    let mut width = items
        .iter()
        .map(|item| padded_width(item.metrics()))
        .fold(0.0, f64::max);
    if items.len() > 1 {
        width += arc * 2.0;
    }

    let mut height = 0.0;
    for (index, item) in items.iter().enumerate() {
        let m = item.metrics();
        height += m.height;
        if index > 0 {
            height += f64::max(arc * 2.0, m.up + separation);
        }
        if index < last {
            height += f64::max(arc * 2.0, m.down + separation);
        }
    }

    let metrics = Metrics {
        width,
        up: items[0].metrics().up,
        down: items[last].metrics().down,
        height,
        needs_space: true,
    };
    Ok(Node::Stack { items, metrics })
}

fn choice(items: Vec<Node>, normal: usize, config: &LayoutConfig) -> Result<Node, LayoutError> {
    let metrics = choice_metrics(&items, normal, config)?;
    Ok(Node::Choice {
        normal,
        items,
        metrics,
    })
}

fn choice_metrics(
    items: &[Node],
    normal: usize,
    config: &LayoutConfig,
) -> Result<Metrics, LayoutError> {
    check_normal(normal, items.len())?;
    let arc = config.arc_radius;
    let separation = config.vertical_separation;

    let width = items
        .iter()
        .map(|item| item.metrics().width)
        .fold(0.0, f64::max)
        + arc * 4.0;

    let mut up = 0.0;
    let mut down = 0.0;
    for (index, item) in items.iter().enumerate() {
        let m = item.metrics();
        if index < normal {
            up += f64::max(arc, m.up + m.down + separation);
        }
        if index == normal {
            up += f64::max(arc, m.up);
            down += f64::max(arc, m.down);
        }
        if index > normal {
            down += f64::max(arc, separation + m.up + m.down);
        }
    }

    Ok(Metrics {
        width,
        up,
        down,
        height: 0.0,
        needs_space: false,
    })
}

fn one_or_more(
    child: &Component,
    separator: Option<&Component>,
    arrow: bool,
    config: &LayoutConfig,
) -> Result<Node, LayoutError> {
    let item = Node::build(child, config)?;
    let rep = match separator {
        Some(separator) => Node::build(separator, config)?,
        None => Node::skip(),
    };
    Ok(one_or_more_nodes(item, rep, arrow, config))
}

fn one_or_more_nodes(item: Node, rep: Node, arrow: bool, config: &LayoutConfig) -> Node {
    let arc = config.arc_radius;
    let separation = config.vertical_separation;
    let im = item.metrics();
    let rm = rep.metrics();

    let metrics = Metrics {
        width: f64::max(im.width, rm.width) + arc * 2.0,
        up: im.up,
        down: f64::max(arc * 2.0, im.down + separation + rm.up + rm.down),
        height: 0.0,
        needs_space: true,
    };
    // The backward arc's vertical offset is fixed by the metrics, so compute
    // it once here rather than during every format.
    let loop_offset = f64::max(arc * 2.0, im.down + separation + rm.up);
    Node::OneOrMore {
        item: Box::new(item),
        rep: Box::new(rep),
        arrow,
        loop_offset,
        metrics,
    }
}

fn horizontal_choice(mut items: Vec<Node>, config: &LayoutConfig) -> Node {
    if items.is_empty() {
        return Node::skip();
    }
    if items.len() == 1 {
        return items.remove(0);
    }
    let arc = config.arc_radius;
    let separation = config.vertical_separation;
    let last = items.len() - 1;

    let columns: f64 = items.iter().map(|item| padded_width(item.metrics())).sum();
    let width = arc * 2.0 + columns + arc * 2.0 * (items.len() - 1) as f64 + arc * 2.0;

    // The upper track distributes over every branch that can be skipped on
    // the way in; the lower track collects under every branch that can be
    // skipped on the way out.
    let upper_track = f64::max(
        arc * 2.0,
        items[..last]
            .iter()
            .map(|item| item.metrics().up)
            .fold(0.0, f64::max)
            + separation,
    );
    let lower_track = f64::max(
        arc * 2.0,
        items[1..]
            .iter()
            .map(|item| item.metrics().down)
            .fold(0.0, f64::max)
            + separation,
    );

    let up = items
        .iter()
        .map(|item| item.metrics().up)
        .fold(upper_track, f64::max);
    let down = items
        .iter()
        .map(|item| item.metrics().down)
        .fold(lower_track, f64::max);

    Node::HorizontalChoice {
        items,
        upper_track,
        lower_track,
        metrics: Metrics {
            width,
            up,
            down,
            height: 0.0,
            needs_space: false,
        },
    }
}

fn optional_sequence(mut items: Vec<Node>, config: &LayoutConfig) -> Node {
    if items.is_empty() {
        return Node::skip();
    }
    if items.len() == 1 {
        return items.remove(0);
    }
    let arc = config.arc_radius;
    let separation = config.vertical_separation;

    let columns: f64 = items.iter().map(|item| padded_width(item.metrics())).sum();
    let width = columns + arc * 4.0 * items.len() as f64;

    let upper_track = f64::max(
        arc * 2.0,
        items[1..]
            .iter()
            .map(|item| item.metrics().up)
            .fold(0.0, f64::max)
            + separation,
    );
    let lower_track = f64::max(arc * 2.0, items[0].metrics().down + separation);

    let up = items
        .iter()
        .map(|item| item.metrics().up)
        .fold(upper_track, f64::max);
    let down = items
        .iter()
        .map(|item| item.metrics().down)
        .fold(lower_track, f64::max);

    Node::OptionalSequence {
        items,
        upper_track,
        lower_track,
        metrics: Metrics {
            width,
            up,
            down,
            height: 0.0,
            needs_space: false,
        },
    }
}

fn multiple_choice(
    items: Vec<Node>,
    normal: usize,
    mode: MultipleChoiceMode,
    config: &LayoutConfig,
) -> Result<Node, LayoutError> {
    let base = choice_metrics(&items, normal, config)?;
    Ok(Node::MultipleChoice {
        normal,
        mode,
        items,
        metrics: Metrics {
            width: MULTIPLE_CHOICE_MARKER_WIDTH + base.width + MULTIPLE_CHOICE_TAIL,
            // The marker box spans the full caption height on the line.
            up: f64::max(base.up, 11.0),
            down: f64::max(base.down, 11.0),
            height: 0.0,
            needs_space: true,
        },
    })
}

fn check_normal(normal: usize, branches: usize) -> Result<(), LayoutError> {
    if normal >= branches {
        return Err(LayoutError::NormalOutOfRange { normal, branches });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    fn config() -> LayoutConfig {
        LayoutConfig::default()
    }

    fn build(component: &Component) -> Node {
        Node::build(component, &config()).expect("component builds")
    }

    fn terminal(text: &str) -> Component {
        Component::Terminal {
            text: text.to_string(),
            link: None,
        }
    }

    fn nonterminal(text: &str) -> Component {
        Component::Nonterminal {
            text: text.to_string(),
            link: None,
        }
    }

    #[test]
    fn caption_boxes_measure_per_character() {
        let m = build(&terminal("abc")).metrics();
        assert!(approx_eq!(f64, m.width, 3.0 * 8.0 + 20.0));
        assert!(approx_eq!(f64, m.up, 11.0));
        assert!(approx_eq!(f64, m.down, 11.0));
        assert!(m.needs_space);

        let m = build(&Component::Comment {
            text: "abc".to_string(),
            link: None,
        })
        .metrics();
        assert!(approx_eq!(f64, m.width, 3.0 * 7.0 + 10.0));
    }

    #[test]
    fn sequence_width_sums_padded_children() {
        let m = build(&Component::Sequence {
            children: vec![terminal("a"), Component::Dummy, terminal("b")],
        })
        .metrics();
        // Two padded boxes and a zero-width run.
        assert!(approx_eq!(f64, m.width, 48.0 + 0.0 + 48.0));
        assert!(approx_eq!(f64, m.up, 11.0));
    }

    #[test]
    fn choice_width_adds_four_arc_radii() {
        let m = build(&Component::Choice {
            normal: 0,
            branches: vec![nonterminal("a"), nonterminal("wide-branch")],
        })
        .metrics();
        assert!(approx_eq!(f64, m.width, (11.0 * 8.0 + 20.0) + 40.0));
        // Normal branch on the line, the other accumulated below.
        assert!(approx_eq!(f64, m.up, 11.0));
        assert!(approx_eq!(f64, m.down, 11.0 + (11.0 + 8.0 + 11.0)));
    }

    #[test]
    fn optional_desugars_to_a_choice_over_a_skip() {
        let node = build(&Component::Optional {
            child: Box::new(nonterminal("a")),
            normal: false,
        });
        let Node::Choice { normal, items, .. } = &node else {
            panic!("expected a choice");
        };
        assert_eq!(*normal, 0);
        assert!(matches!(items[0], Node::Skip { .. }));
        assert!(matches!(&items[1], Node::Nonterminal { text, .. } if text == "a"));

        let node = build(&Component::Optional {
            child: Box::new(nonterminal("a")),
            normal: true,
        });
        let Node::Choice { normal, .. } = &node else {
            panic!("expected a choice");
        };
        assert_eq!(*normal, 1);
    }

    #[test]
    fn optional_repeated_wraps_a_repetition_in_the_bypass() {
        let node = build(&Component::OptionalRepeated {
            child: Box::new(nonterminal("a")),
            separator: None,
            normal: false,
        });
        let Node::Choice { items, .. } = &node else {
            panic!("expected a choice");
        };
        assert!(matches!(items[1], Node::OneOrMore { .. }));
    }

    #[test]
    fn alternating_sequence_is_a_two_child_repetition() {
        let node = build(&Component::AlternatingSequence {
            branches: vec![nonterminal("a"), nonterminal("b")],
        });
        let Node::OneOrMore { item, rep, .. } = &node else {
            panic!("expected a repetition");
        };
        assert!(matches!(&**item, Node::Nonterminal { text, .. } if text == "a"));
        assert!(matches!(&**rep, Node::Nonterminal { text, .. } if text == "b"));

        let err = Node::build(
            &Component::AlternatingSequence {
                branches: vec![nonterminal("a")],
            },
            &config(),
        )
        .expect_err("one child cannot alternate");
        assert!(matches!(err, LayoutError::AlternatingArity { found: 1 }));
    }

    #[test]
    fn stack_accumulates_row_gaps_into_height() {
        let m = build(&Component::Stack {
            children: vec![nonterminal("a"), nonterminal("b")],
        })
        .metrics();
        assert!(approx_eq!(f64, m.width, 48.0 + 20.0));
        assert!(approx_eq!(f64, m.up, 11.0));
        assert!(approx_eq!(f64, m.down, 11.0));
        // Row gap below the first and above the second, each at least 2R.
        assert!(approx_eq!(f64, m.height, 20.0 + 20.0));
    }

    #[test]
    fn repetition_down_extent_covers_the_loop() {
        let node = build(&Component::Repeated {
            child: Box::new(nonterminal("a")),
            separator: Some(Box::new(terminal(","))),
            arrows: true,
        });
        let m = node.metrics();
        // Item and separator are the same width; the loop adds one arc pair.
        assert!(approx_eq!(f64, m.width, 28.0 + 20.0));
        assert!(approx_eq!(f64, m.down, 11.0 + 8.0 + 11.0 + 11.0));
    }

    #[test]
    fn nested_normal_is_validated_wherever_it_appears() {
        let err = Node::build(
            &Component::Sequence {
                children: vec![Component::MultipleChoice {
                    normal: 9,
                    mode: MultipleChoiceMode::Any,
                    branches: vec![nonterminal("a")],
                }],
            },
            &config(),
        )
        .expect_err("invalid nested normal");
        assert!(matches!(
            err,
            LayoutError::NormalOutOfRange {
                normal: 9,
                branches: 1
            }
        ));
    }

    #[test]
    fn transclusion_is_transparent_to_layout() {
        let node = build(&Component::Transclusion {
            child: Box::new(nonterminal("a")),
        });
        assert!(matches!(node, Node::Nonterminal { .. }));
    }
}
