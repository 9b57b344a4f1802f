//! End-to-end tests for the DiagramBuilder API: notation in, markup out.

use trestle::component::Component;
use trestle::config::RenderConfig;
use trestle::host::MapHost;
use trestle::{Children, DiagramBuilder, Element, SvgSurface, TrestleError};

fn builder() -> DiagramBuilder {
    DiagramBuilder::new(RenderConfig::default())
}

/// Every `rect` in the tree as an `(x, x + width)` interval.
fn rect_spans(element: &Element) -> Vec<(f64, f64)> {
    let mut spans: Vec<(f64, f64)> = element
        .walk()
        .into_iter()
        .filter(|e| e.tag() == "rect")
        .map(|e| {
            let x: f64 = e.attr("x").unwrap().parse().unwrap();
            let width: f64 = e.attr("width").unwrap().parse().unwrap();
            (x, x + width)
        })
        .collect();
    spans.sort_by(|a, b| a.0.total_cmp(&b.0));
    spans
}

#[test]
fn two_terminals_render_as_a_padded_sequence() {
    let builder = builder();
    let parsed = builder.parse(r#""a" "b""#).expect("source parses");
    let svg = builder.render(&parsed).expect("renders");

    // Start 10, two boxes of 28 with 20 padding around each, end 20,
    // 20 diagram padding per side.
    assert!(svg.starts_with(
        "<svg class=\"railroad-diagram\" width=\"166\" height=\"62\" viewBox=\"0 0 166 62\">"
    ));
    assert_eq!(svg.matches("<rect").count(), 2);
    assert_eq!(svg.matches("<text").count(), 2);
}

#[test]
fn sequence_siblings_do_not_overlap() {
    let builder = builder();
    let parsed = builder.parse(r#""first" "second" "third""#).expect("parses");
    let mut diagram = builder.diagram(&parsed).expect("lays out");
    let spans = rect_spans(diagram.element());
    assert_eq!(spans.len(), 3);
    for pair in spans.windows(2) {
        assert!(
            pair[0].1 <= pair[1].0,
            "boxes overlap: {:?} and {:?}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn rendering_twice_yields_identical_markup() {
    let builder = builder();
    let parsed = builder.parse(r#"(a|:b|c) {d + ","}"#).expect("parses");
    let first = builder.render(&parsed).expect("renders");
    let second = builder.render(&parsed).expect("renders");
    assert_eq!(first, second);

    let mut diagram = builder.diagram(&parsed).expect("lays out");
    assert_eq!(diagram.to_markup(), diagram.to_markup());
}

#[test]
fn optional_renders_a_bypass_and_the_item() {
    let builder = builder();
    let parsed = builder.parse("[a]").expect("parses");
    let svg = builder.render(&parsed).expect("renders");
    // The skip route is the default: a full-width straight path exists next
    // to the curving branch holding the box.
    assert!(svg.contains("<rect"));
    assert!(svg.contains(">a</text>"));
    assert!(svg.contains("a10 10 0 0 1 10 10"));
}

#[test]
fn arrow_pragma_controls_the_repetition_chevron() {
    let builder = builder();

    let parsed = builder.parse("{a}").expect("parses");
    let svg = builder.render(&parsed).expect("renders");
    assert!(svg.contains("class=\"arrow\""));

    let parsed = builder.parse("\\showArrows no {a}").expect("parses");
    let svg = builder.render(&parsed).expect("renders");
    assert!(!svg.contains("class=\"arrow\""));
}

#[test]
fn debug_pragma_surfaces_the_component_dump() {
    let builder = builder();
    let parsed = builder.parse("\\debug (x|y)").expect("parses");
    assert!(parsed.options().debug);
    let dump = parsed.debug_dump();
    assert!(dump.starts_with("Root\n"));
    assert!(dump.contains("Choice (normal: 0)\n"));
    assert!(dump.contains("Nonterminal: x\n"));
}

#[test]
fn transclusion_pulls_content_through_the_host() {
    let mut host = MapHost::new();
    host.insert("digits", r#""0" "1""#);
    let builder = DiagramBuilder::new(RenderConfig::default()).with_host(host);
    let parsed = builder.parse("{{digits}}").expect("parses");
    let svg = builder.render(&parsed).expect("renders");
    assert!(svg.contains(">0</text>"));
    assert!(svg.contains(">1</text>"));
}

#[test]
fn external_links_become_anchor_elements() {
    let builder = builder();
    let parsed = builder
        .parse(r#""docs|https://example.org/spec""#)
        .expect("parses");
    let svg = builder.render(&parsed).expect("renders");
    assert!(svg.contains("<a data-target=\"https://example.org/spec\" data-external=\"true\">"));
}

#[test]
fn script_root_short_circuits_layout() {
    let builder = builder();
    let parsed = builder
        .parse("ignored <script>draw(1 < 2)</script> also ignored")
        .expect("parses");
    assert!(matches!(parsed.root(), Component::Script { .. }));
    let svg = builder.render(&parsed).expect("renders");
    assert_eq!(svg, "<script>draw(1 < 2)</script>\n");
}

#[test]
fn parse_failures_abort_without_partial_output() {
    let builder = builder();
    let err = builder.parse("<a").expect_err("missing closer");
    assert!(matches!(err, TrestleError::Parse(_)));
    assert_eq!(err.to_string(), "Closing > expected");

    let err = builder.parse("\"open").expect_err("unterminated literal");
    assert_eq!(err.to_string(), "Unterminated string literal");
}

#[test]
fn attaches_to_an_svg_surface() {
    let builder = builder();
    let parsed = builder.parse(r#""a""#).expect("parses");
    let mut diagram = builder.diagram(&parsed).expect("lays out");
    let node = diagram.attach(&mut SvgSurface);
    let rendered = node.to_string();
    assert!(rendered.starts_with("<svg"));
    assert!(rendered.contains("railroad-diagram"));
}

#[test]
fn stacked_rows_grow_the_viewport_downward() {
    let builder = builder();
    let single = builder.parse("<^a^>").expect("parses");
    let stacked = builder.parse("<^a b^>").expect("parses");
    let height_of = |parsed| {
        let mut diagram = builder.diagram(parsed).expect("lays out");
        diagram
            .element()
            .attr("height")
            .unwrap()
            .parse::<f64>()
            .unwrap()
    };
    // Two rows add the row itself plus the between-row gap.
    assert!(height_of(&stacked) >= height_of(&single) + 22.0);
}

#[test]
fn comment_text_is_escaped_in_markup() {
    let builder = builder();
    let parsed = builder.parse(r#"/"a < b & c"/"#).expect("parses");
    let svg = builder.render(&parsed).expect("renders");
    assert!(svg.contains(">a &lt; b &amp; c</text>"));
}

#[test]
fn element_children_expose_the_drawing_tree() {
    let builder = builder();
    let parsed = builder.parse(r#""a""#).expect("parses");
    let mut diagram = builder.diagram(&parsed).expect("lays out");
    let svg = diagram.element();
    let Children::Elements(children) = svg.children() else {
        panic!("svg root holds elements");
    };
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].tag(), "g");
    assert_eq!(children[0].attr("transform"), Some("translate(.5 .5)"));
}
