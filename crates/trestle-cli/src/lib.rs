//! CLI logic for the Trestle railroad diagram tool.
//!
//! This module contains the core CLI logic for the Trestle diagram tool:
//! notation file in, SVG markup (or, under the `debug` pragma, the component
//! dump) out.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::info;
use thiserror::Error;

use trestle::{DiagramBuilder, LayoutError, TrestleError};
use trestle_parser::ParseError;

/// Errors surfaced by the CLI, pairing parse failures with their source text
/// so they can be reported against a snippet.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{err}")]
    Parse {
        err: ParseError,
        /// The notation source the error points into.
        src: String,
    },

    #[error("{0}")]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML configuration: {0}")]
    Config(String),
}

impl CliError {
    /// Attach the notation source to a library error.
    pub fn from_trestle(err: TrestleError, src: &str) -> Self {
        match err {
            TrestleError::Parse(err) => CliError::Parse {
                err,
                src: src.to_string(),
            },
            TrestleError::Layout(err) => CliError::Layout(err),
        }
    }
}

/// Run the Trestle CLI application
///
/// This function processes the input file through the Trestle pipeline
/// and writes the resulting SVG to the output file. When the notation
/// carries the `debug` pragma, the component dump is written instead.
///
/// # Errors
///
/// Returns `CliError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors
/// - Layout errors
pub fn run(args: &Args) -> Result<(), CliError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing diagram"
    );

    // Load configuration
    let render_config = config::load_config(args.config.as_ref())?;

    // Read input file
    let source = fs::read_to_string(&args.input)?;

    // Process the notation using the DiagramBuilder API
    let builder = DiagramBuilder::new(render_config);
    let parsed = builder
        .parse(&source)
        .map_err(|err| CliError::from_trestle(err, &source))?;

    let output = if parsed.options().debug {
        info!("Debug pragma set, emitting the component dump");
        parsed.debug_dump()
    } else {
        builder
            .render(&parsed)
            .map_err(|err| CliError::from_trestle(err, &source))?
    };

    // Write output file
    fs::write(&args.output, output)?;

    info!(output_file = args.output; "Diagram exported successfully");

    Ok(())
}
