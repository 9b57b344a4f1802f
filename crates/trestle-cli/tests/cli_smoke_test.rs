//! End-to-end smoke tests for the Trestle CLI: notation files in a temp
//! directory, SVG (or component dump) out.

use std::fs;

use tempfile::tempdir;

use trestle_cli::{Args, CliError, run};

fn args(input: &str, output: &str) -> Args {
    Args {
        input: input.to_string(),
        output: output.to_string(),
        config: None,
        log_level: "off".to_string(),
    }
}

#[test]
fn renders_a_notation_file_to_svg() {
    let dir = tempdir().expect("temp directory");
    let input = dir.path().join("grammar.rr");
    let output = dir.path().join("grammar.svg");
    fs::write(&input, r#""select" {column + ","} [:"from" table]"#).expect("writes input");

    run(&args(
        &input.to_string_lossy(),
        &output.to_string_lossy(),
    ))
    .expect("pipeline succeeds");

    let svg = fs::read_to_string(&output).expect("output exists");
    assert!(svg.starts_with("<svg class=\"railroad-diagram\""));
    assert!(svg.contains(">select</text>"));
    assert!(svg.contains(">table</text>"));
}

#[test]
fn debug_pragma_writes_the_component_dump() {
    let dir = tempdir().expect("temp directory");
    let input = dir.path().join("debug.rr");
    let output = dir.path().join("debug.txt");
    fs::write(&input, "\\debug (a|:b)").expect("writes input");

    run(&args(
        &input.to_string_lossy(),
        &output.to_string_lossy(),
    ))
    .expect("pipeline succeeds");

    let dump = fs::read_to_string(&output).expect("output exists");
    assert!(dump.starts_with("Root\n"));
    assert!(dump.contains("Choice (normal: 1)\n"));
}

#[test]
fn malformed_notation_fails_without_writing_output() {
    let dir = tempdir().expect("temp directory");
    let input = dir.path().join("broken.rr");
    let output = dir.path().join("broken.svg");
    fs::write(&input, "(a|b").expect("writes input");

    let err = run(&args(
        &input.to_string_lossy(),
        &output.to_string_lossy(),
    ))
    .expect_err("parse fails");

    assert!(matches!(err, CliError::Parse { .. }));
    assert_eq!(err.to_string(), "Closing ) expected");
    assert!(!output.exists());
}

#[test]
fn missing_input_is_an_io_error() {
    let dir = tempdir().expect("temp directory");
    let output = dir.path().join("never.svg");

    let err = run(&args("/nonexistent/input.rr", &output.to_string_lossy()))
        .expect_err("read fails");
    assert!(matches!(err, CliError::Io(_)));
}

#[test]
fn config_file_reshapes_the_output() {
    let dir = tempdir().expect("temp directory");
    let input = dir.path().join("plain.rr");
    let output = dir.path().join("plain.svg");
    let config = dir.path().join("trestle.toml");
    fs::write(&input, r#""a""#).expect("writes input");
    fs::write(
        &config,
        "[layout]\npadding = { top = 0.0, right = 0.0, bottom = 0.0, left = 0.0 }\n",
    )
    .expect("writes config");

    let mut cli_args = args(&input.to_string_lossy(), &output.to_string_lossy());
    cli_args.config = Some(config.to_string_lossy().to_string());
    run(&cli_args).expect("pipeline succeeds");

    let svg = fs::read_to_string(&output).expect("output exists");
    // No padding: the viewport is exactly the content box.
    assert!(svg.contains("viewBox=\"0 0 78 22\""));
}
