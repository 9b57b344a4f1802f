//! The diagram component model.
//!
//! A [`Component`] tree describes the semantics of a railroad diagram
//! (terminals, choices, repetitions and so on) independently of any layout
//! or rendering concern. The parser produces this tree; the layout engine
//! consumes it.
//!
//! Ownership is a strict tree: every child is owned exactly once and children
//! are never shared. Content lists obey the collapse rule implemented by
//! [`Component::from_content`]: an empty list becomes a single [`Component::Dummy`],
//! a singleton unwraps to its only element, and anything longer is wrapped in
//! a [`Component::Sequence`].

use std::fmt::Write as _;

use crate::options::{MultipleChoiceMode, TerminusStyle};

/// Link annotation on a component: where it points and whether the target is
/// outside the hosting document (as decided by the host's link classifier).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    pub target: String,
    pub external: bool,
}

/// One node of a diagram description.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    /// A literal token, drawn as a rounded box.
    Terminal {
        text: String,
        link: Option<LinkTarget>,
    },
    /// A reference to another rule, drawn as a square box.
    Nonterminal {
        text: String,
        link: Option<LinkTarget>,
    },
    /// Free-standing caption text on the line.
    Comment {
        text: String,
        link: Option<LinkTarget>,
    },
    /// A plain run of track with no content.
    Dummy,
    /// An inline end-of-rule marker.
    End {
        style: TerminusStyle,
        close_eol: bool,
    },
    /// A raw script block; when present it is the sole root of the parse.
    Script { text: String },

    /// Content that may be skipped. `normal` is true when inclusion is the
    /// default route.
    Optional { child: Box<Component>, normal: bool },
    /// Zero-or-more repetition, optionally captioned below by a separator.
    OptionalRepeated {
        child: Box<Component>,
        separator: Option<Box<Component>>,
        normal: bool,
    },
    /// One-or-more repetition with an optional separator on the return loop.
    /// `arrows` records the session's arrow setting at parse time.
    Repeated {
        child: Box<Component>,
        separator: Option<Box<Component>>,
        arrows: bool,
    },
    /// A child wrapped in a navigation link.
    Link {
        child: Box<Component>,
        target: LinkTarget,
    },
    /// Content included from another document through the host resolver.
    Transclusion { child: Box<Component> },

    /// Children drawn left to right on one line.
    Sequence { children: Vec<Component> },
    /// Children drawn as stacked rows connected by return curves.
    Stack { children: Vec<Component> },
    /// Exactly one branch is taken; `normal` indexes the straight-through one.
    Choice {
        normal: usize,
        branches: Vec<Component>,
    },
    /// Each branch may be skipped, but at least one must be taken.
    OptionalSequence { branches: Vec<Component> },
    /// Two branches traversed alternately, starting and ending with the first.
    AlternatingSequence { branches: Vec<Component> },
    /// Branches laid out side by side instead of vertically.
    HorizontalChoice { branches: Vec<Component> },
    /// One or more branches taken, drawn with a mode marker.
    MultipleChoice {
        normal: usize,
        mode: MultipleChoiceMode,
        branches: Vec<Component>,
    },
    /// The top of a parsed diagram.
    Root { children: Vec<Component> },
}

impl Component {
    /// Collapse a content list into a single component.
    pub fn from_content(mut content: Vec<Component>) -> Component {
        match content.len() {
            0 => Component::Dummy,
            1 => content.remove(0),
            _ => Component::Sequence { children: content },
        }
    }

    /// Force a children list to be non-empty, synthesizing a dummy run when
    /// the notation supplied no content.
    pub fn children_or_dummy(children: Vec<Component>) -> Vec<Component> {
        if children.is_empty() {
            vec![Component::Dummy]
        } else {
            children
        }
    }

    /// Create the root component for a content list.
    pub fn root(children: Vec<Component>) -> Component {
        Component::Root {
            children: Self::children_or_dummy(children),
        }
    }

    /// The variant name used in the debug dump.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Component::Terminal { .. } => "Terminal",
            Component::Nonterminal { .. } => "Nonterminal",
            Component::Comment { .. } => "Comment",
            Component::Dummy => "Dummy",
            Component::End { .. } => "End",
            Component::Script { .. } => "Script",
            Component::Optional { .. } => "Optional",
            Component::OptionalRepeated { .. } => "OptionalRepeated",
            Component::Repeated { .. } => "Repeated",
            Component::Link { .. } => "Link",
            Component::Transclusion { .. } => "Transclusion",
            Component::Sequence { .. } => "Sequence",
            Component::Stack { .. } => "Stack",
            Component::Choice { .. } => "Choice",
            Component::OptionalSequence { .. } => "OptionalSequence",
            Component::AlternatingSequence { .. } => "AlternatingSequence",
            Component::HorizontalChoice { .. } => "HorizontalChoice",
            Component::MultipleChoice { .. } => "MultipleChoice",
            Component::Root { .. } => "Root",
        }
    }

    /// Render the indented component dump produced by the `\debug` pragma.
    pub fn debug_dump(&self) -> String {
        let mut output = String::new();
        self.debug_into(&mut output, "");
        output
    }

    fn debug_into(&self, output: &mut String, indent: &str) {
        output.push_str(indent);
        output.push_str(self.kind_name());
        if let Some(text) = self.leaf_text() {
            if !text.is_empty() {
                let _ = write!(output, ": {text}");
            }
        }
        match self.normal_flag() {
            Some(NormalFlag::Included) => output.push_str(" (normal)"),
            Some(NormalFlag::Branch(index)) => {
                let _ = write!(output, " (normal: {index})");
            }
            None => {}
        }
        output.push('\n');
        let content_indent = format!("{indent}  ");
        match self {
            Component::Optional { child, .. }
            | Component::Link { child, .. }
            | Component::Transclusion { child } => {
                child.debug_into(output, &content_indent);
            }
            Component::OptionalRepeated {
                child, separator, ..
            }
            | Component::Repeated {
                child, separator, ..
            } => {
                child.debug_into(output, &content_indent);
                if let Some(separator) = separator {
                    output.push_str(indent);
                    output.push_str("(separator)\n");
                    separator.debug_into(output, &content_indent);
                }
            }
            Component::Sequence { children }
            | Component::Stack { children }
            | Component::Root { children } => {
                for child in children {
                    child.debug_into(output, &content_indent);
                }
            }
            Component::Choice { branches, .. }
            | Component::OptionalSequence { branches }
            | Component::AlternatingSequence { branches }
            | Component::HorizontalChoice { branches }
            | Component::MultipleChoice { branches, .. } => {
                // Branches are numbered so the normal index can be read off.
                for (index, branch) in branches.iter().enumerate() {
                    output.push_str(&content_indent);
                    let _ = writeln!(output, "({index})");
                    let branch_indent = format!("  {content_indent}");
                    branch.debug_into(output, &branch_indent);
                }
            }
            _ => {}
        }
    }

    fn leaf_text(&self) -> Option<&str> {
        match self {
            Component::Terminal { text, .. }
            | Component::Nonterminal { text, .. }
            | Component::Comment { text, .. }
            | Component::Script { text } => Some(text),
            _ => None,
        }
    }

    fn normal_flag(&self) -> Option<NormalFlag> {
        match self {
            Component::Optional { normal, .. } | Component::OptionalRepeated { normal, .. } => {
                normal.then_some(NormalFlag::Included)
            }
            Component::Choice { normal, .. } | Component::MultipleChoice { normal, .. } => {
                Some(NormalFlag::Branch(*normal))
            }
            _ => None,
        }
    }
}

enum NormalFlag {
    Included,
    Branch(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nonterminal(text: &str) -> Component {
        Component::Nonterminal {
            text: text.to_string(),
            link: None,
        }
    }

    #[test]
    fn empty_content_collapses_to_dummy() {
        assert_eq!(Component::from_content(vec![]), Component::Dummy);
    }

    #[test]
    fn singleton_content_unwraps() {
        let collapsed = Component::from_content(vec![nonterminal("a")]);
        assert_eq!(collapsed, nonterminal("a"));
    }

    #[test]
    fn longer_content_wraps_in_sequence() {
        let collapsed = Component::from_content(vec![nonterminal("a"), nonterminal("b")]);
        assert!(matches!(
            collapsed,
            Component::Sequence { ref children } if children.len() == 2
        ));
    }

    #[test]
    fn root_never_empty() {
        let root = Component::root(vec![]);
        assert!(matches!(
            root,
            Component::Root { ref children } if children == &[Component::Dummy]
        ));
    }

    #[test]
    fn debug_dump_numbers_choice_branches() {
        let choice = Component::Choice {
            normal: 1,
            branches: vec![nonterminal("a"), nonterminal("b")],
        };
        let dump = choice.debug_dump();
        assert!(dump.starts_with("Choice (normal: 1)\n"));
        assert!(dump.contains("  (0)\n    Nonterminal: a\n"));
        assert!(dump.contains("  (1)\n    Nonterminal: b\n"));
    }

    #[test]
    fn debug_dump_marks_separator_and_normal() {
        let repeated = Component::OptionalRepeated {
            child: Box::new(nonterminal("item")),
            separator: Some(Box::new(Component::Comment {
                text: "between".to_string(),
                link: None,
            })),
            normal: true,
        };
        let dump = repeated.debug_dump();
        assert!(dump.starts_with("OptionalRepeated (normal)\n"));
        assert!(dump.contains("(separator)\n"));
        assert!(dump.contains("  Comment: between\n"));
    }
}
