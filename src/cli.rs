//! Command line interface definition using clap.
//!
//! This module defines the [`Cli`] structure. It is also compiled by the
//! build script to render the manual page, so it depends only on `clap` and
//! the standard library.

use clap::Parser;
use std::path::PathBuf;

/// Generate a Makefile for a C++ project from its local #include graph.
#[derive(Debug, Parser)]
#[command(name = "mkmk", author, version, about, long_about = None)]
pub struct Cli {
    /// YAML file overriding extensions, commands, and the preamble.
    #[arg(short, long, value_name = "FILE", env = "MKMK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Read sources relative to this directory.
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Write the Makefile here instead of standard output ("-" for stdout).
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Enable verbose logging output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Root source files, e.g. every `.cpp` file under the source directory.
    #[arg(value_name = "SOURCE", required = true)]
    pub sources: Vec<String>,
}

impl Cli {
    /// Whether output goes to standard output.
    #[must_use]
    pub fn writes_stdout(&self) -> bool {
        self.output
            .as_ref()
            .is_none_or(|path| path.as_os_str() == "-")
    }
}
