//! Command-line argument definitions for the entdef CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, warning handling and logging verbosity.

use clap::Parser;

/// Command-line arguments for the entdef definition inspector
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input definition file (.fgd, .def or .ent)
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Write the catalog report here instead of standard output
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Fail if the definitions produce any warning
    #[arg(long)]
    pub deny_warnings: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
