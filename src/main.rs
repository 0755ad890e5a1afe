//! Application entry point.
//!
//! Parses command-line arguments and delegates execution to [`runner::run`].

use clap::Parser;
use mkmk::error::{EXIT_USER_ERROR, MkmkError};
use mkmk::{cli::Cli, runner};
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let max_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::ERROR
    };
    fmt()
        .with_max_level(max_level)
        .with_writer(io::stderr)
        .init();
    match runner::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "run failed");
            let code = err
                .downcast_ref::<MkmkError>()
                .map_or(EXIT_USER_ERROR, MkmkError::exit_code);
            report(err);
            ExitCode::from(code)
        }
    }
}

/// Write `err` to standard error as a diagnostic report.
fn report(err: anyhow::Error) {
    let report = match err.downcast::<MkmkError>() {
        Ok(diagnostic) => miette::Report::new(diagnostic),
        Err(other) => miette::miette!("{other:#}"),
    };
    // Nothing sensible remains to be done if stderr itself is gone.
    drop(writeln!(io::stderr().lock(), "Error: {report:?}"));
}
