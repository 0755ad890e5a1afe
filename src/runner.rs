//! CLI execution logic.
//!
//! This module keeps `main` minimal by providing a single entry point that
//! loads the configuration, runs the generator, and writes the Makefile.

use crate::cli::Cli;
use crate::config::Configuration;
use crate::generator::Generator;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info};

/// Execute the parsed [`Cli`].
///
/// The Makefile is rendered completely before anything is written, so a
/// failure never leaves partial output behind.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, a source cannot be
/// processed, or the output cannot be written. Errors raised by the generator
/// remain downcastable to [`crate::error::MkmkError`].
pub fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let makefile = generate_makefile(cli, &config)?;
    match &cli.output {
        Some(path) if !cli.writes_stdout() => write_and_log(path, &makefile),
        _ => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(makefile.as_bytes())
                .and_then(|()| stdout.flush())
                .context("writing Makefile to standard output")
        }
    }
}

/// Load the configuration named on the command line, or the defaults.
///
/// # Errors
///
/// Returns an error when the file cannot be read, parsed, or validated.
pub fn load_config(cli: &Cli) -> Result<Configuration> {
    let Some(path) = &cli.config else {
        debug!("using default configuration");
        return Ok(Configuration::default());
    };
    let path = utf8(path)?;
    debug!(config = %path, "loading configuration");
    Ok(Configuration::from_path(&path)?)
}

/// Read every source named by `cli` and render the Makefile.
///
/// # Errors
///
/// Returns an error if any source cannot be processed.
pub fn generate_makefile(cli: &Cli, config: &Configuration) -> Result<String> {
    let mut generator = Generator::new(config)?;
    if let Some(dir) = &cli.directory {
        generator = generator.with_source_root(utf8(dir)?);
    }
    generator.read_files(&cli.sources)?;
    generator.evaluate()?;
    Ok(generator.render()?)
}

fn write_and_log(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
    info!("Generated Makefile at {}", path.display());
    Ok(())
}

fn utf8(path: &Path) -> Result<Utf8PathBuf> {
    Utf8Path::from_path(path)
        .map(Utf8Path::to_path_buf)
        .with_context(|| format!("path is not valid UTF-8: {}", path.display()))
}
