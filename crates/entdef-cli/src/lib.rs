//! CLI logic for the entdef definition inspector.
//!
//! Loads one entity definition file, reports the diagnostics it produced and
//! prints the resolved catalog.

pub mod error_adapter;

mod args;
mod config;
mod report;

pub use args::Args;

use std::{fs, io, path::Path};

use log::info;

use entdef::{DefinitionLoader, EntdefError, Format, diagnostic::Diagnostic};

/// The outcome of a successful run.
#[derive(Debug)]
pub struct RunSummary {
    /// Number of loaded definitions.
    pub definitions: usize,
    /// Non-fatal diagnostics, to be shown to the user.
    pub diagnostics: Vec<Diagnostic>,
    /// Text of the input file, for rendering `diagnostics`.
    pub source: String,
}

/// Run the entdef CLI application
///
/// Loads the input file and writes the catalog report to the output file,
/// or to standard output if none is given.
///
/// # Errors
///
/// Returns `EntdefError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Structural parse errors
/// - Warnings, when they are denied
pub fn run(args: &Args) -> Result<RunSummary, EntdefError> {
    info!(
        input_path = args.input,
        output_path:? = args.output;
        "Processing entity definitions"
    );

    let mut loader_config = config::load_config(args.config.as_ref())?;
    if args.deny_warnings {
        loader_config = loader_config.with_deny_warnings(true);
    }

    let input = Path::new(&args.input);
    let format =
        Format::from_path(input).ok_or_else(|| EntdefError::UnknownFormat(input.to_path_buf()))?;

    let source = fs::read_to_string(&args.input)?;

    let loader = DefinitionLoader::new(loader_config);
    let loaded = loader.load_str(&source, format, Some(input))?;

    let report = report::render_catalog(&loaded.catalog).map_err(io::Error::other)?;
    match &args.output {
        Some(output) => {
            fs::write(output, report)?;
            info!(output_file = output.as_str(); "Catalog report written");
        }
        None => print!("{report}"),
    }

    Ok(RunSummary {
        definitions: loaded.catalog.len(),
        diagnostics: loaded.diagnostics,
        source,
    })
}
