//! Error types shared by every stage of Makefile generation.
//!
//! Every failure aborts the whole run. Variants are split into user-facing
//! problems (bad configuration, missing files, malformed includes, cycles) and
//! internal defects, which [`MkmkError::is_internal`] reports so the binary can
//! exit with a distinct status.

use camino::Utf8PathBuf;
use miette::Diagnostic;
use std::io;
use thiserror::Error;

/// Exit status reported for user-facing errors.
pub const EXIT_USER_ERROR: u8 = 254;

/// Exit status reported for internal errors.
pub const EXIT_INTERNAL_ERROR: u8 = 255;

/// Errors raised while reading sources and generating rules.
#[derive(Debug, Error, Diagnostic)]
pub enum MkmkError {
    /// The configuration cannot describe a usable project layout.
    #[error("invalid configuration: {reason}")]
    #[diagnostic(code(mkmk::config::invalid))]
    Config {
        /// Why the configuration was rejected.
        reason: String,
    },

    /// The configuration file could not be parsed.
    #[error("cannot parse configuration file {path}: {message}")]
    #[diagnostic(code(mkmk::config::parse))]
    ConfigParse {
        /// Location of the configuration file.
        path: Utf8PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// A path carries neither the body nor the header extension.
    #[error("unrecognized source type: {path}")]
    #[diagnostic(
        code(mkmk::source::unrecognized),
        help("source files must end with the configured body or header extension")
    )]
    UnrecognizedSource {
        /// The offending path.
        path: String,
    },

    /// A source file could not be opened or read.
    #[error("cannot read file: {path}")]
    #[diagnostic(code(mkmk::source::read))]
    Read {
        /// The file that failed.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// An include directive lacks its closing quote.
    #[error("bad #include in {file}: {line}")]
    #[diagnostic(code(mkmk::source::malformed_include))]
    MalformedInclude {
        /// File containing the directive.
        file: String,
        /// The directive as written.
        line: String,
    },

    /// Files include each other, directly or transitively.
    #[error("cyclic include in {file}{chain}", chain = render_chain(.included_by))]
    #[diagnostic(code(mkmk::graph::cyclic_include))]
    CyclicInclude {
        /// The file reached twice.
        file: String,
        /// Includers from the innermost outwards, ending at `file`.
        included_by: Vec<String>,
    },

    /// The generated rules could not be written out.
    #[error("cannot write Makefile")]
    #[diagnostic(code(mkmk::output))]
    Output {
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// A derived dependency graph contains a cycle.
    #[error("circular dependency: {entity}")]
    #[diagnostic(code(mkmk::graph::circular))]
    CircularDependency {
        /// File name of the entity reached twice.
        entity: String,
    },

    /// A broken invariant inside mkmk itself.
    #[error("{message}")]
    #[diagnostic(
        code(mkmk::internal),
        help("this is a bug in mkmk; please report it")
    )]
    Internal {
        /// Description of the violated invariant.
        message: String,
    },
}

impl MkmkError {
    /// Build an [`MkmkError::Internal`] from any message.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error signals a defect in mkmk rather than bad input.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// Process exit status matching this error's category.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        if self.is_internal() {
            EXIT_INTERNAL_ERROR
        } else {
            EXIT_USER_ERROR
        }
    }
}

fn render_chain(included_by: &[String]) -> String {
    included_by
        .iter()
        .map(|file| format!("\n    included by {file}"))
        .collect()
}
