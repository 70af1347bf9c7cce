//! entdef CLI entry point.

use std::{path::Path, process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info, warn};
use miette::{Diagnostic as _, GraphicalReportHandler};

use entdef_cli::{
    Args,
    error_adapter::{Reportable, diagnostics_to_reportables, to_reportables},
};

fn main() {
    // Install miette's pretty panic hook early for better panic reports
    miette::set_panic_hook();

    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting entdef");
    debug!(args:?; "Parsed arguments");

    let reporter = GraphicalReportHandler::new();
    let input = Path::new(&args.input);

    match entdef_cli::run(&args) {
        Ok(summary) => {
            let reportables =
                diagnostics_to_reportables(&summary.diagnostics, &summary.source, Some(input));
            for reportable in &reportables {
                report(&reporter, reportable);
            }
            info!(definitions = summary.definitions; "Completed successfully");
        }
        Err(err) => {
            // Render each diagnostic independently
            for reportable in &to_reportables(&err, Some(input)) {
                report(&reporter, reportable);
            }
            process::exit(1);
        }
    }
}

fn report(reporter: &GraphicalReportHandler, reportable: &Reportable<'_>) {
    let mut writer = String::new();
    reporter
        .render_report(&mut writer, reportable)
        .expect("Writing to String buffer is infallible");

    match reportable.severity() {
        Some(miette::Severity::Warning) => warn!("{writer}"),
        Some(miette::Severity::Advice) => debug!("{writer}"),
        _ => error!("{writer}"),
    }
}
