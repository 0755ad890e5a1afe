//! Project configuration.
//!
//! A [`Configuration`] holds everything that varies between projects: file
//! extensions, the Makefile preamble, and the shell commands used to compile
//! and link. The defaults describe a Clang/libc++ project laid out as
//! `src/` (sources) and `var/obj/` (outputs) under a Git checkout. Any field
//! may be overridden from a YAML file.
//!
//! ```
//! use mkmk::config::Configuration;
//!
//! let config = Configuration::from_yaml("corpus_ext: .cc\nheader_ext: .h\n", "mkmk.yml")
//!     .expect("valid configuration");
//! assert_eq!(config.corpus_ext, ".cc");
//! assert_eq!(config.object_ext, ".o");
//! ```

use crate::error::MkmkError;
use camino::Utf8Path;
use serde::Deserialize;
use std::fs;

const DEFAULT_PREAMBLE: &str = concat!(
    "PREFIX = $(shell git rev-parse --show-toplevel)\n",
    "SRCDIR = $(PREFIX)/src\n",
    "OBJDIR = $(PREFIX)/var/obj\n",
    "CXX = clang++\n",
    "CPPFLAGS = -I$(SRCDIR)\n",
    "CXXFLAGS = -std=c++1y -pedantic -Wall -stdlib=libc++\n",
    "LDFLAGS = -lc++\n",
    "MKDIR = mkdir -p\n",
    "RMDIR = rm -rf\n",
);

/// Settings that may vary from project to project.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Configuration {
    /// Separator between path components, typically `/`.
    pub path_separator: char,
    /// Text printed verbatim at the top of the Makefile.
    pub preamble: String,
    /// Spaces per level of indentation in continuation lines.
    pub indent_width: usize,
    /// Extension of source body files, e.g. `.cpp`.
    pub corpus_ext: String,
    /// Extension of header files, e.g. `.hpp`.
    pub header_ext: String,
    /// Extension of object files, e.g. `.o`.
    pub object_ext: String,
    /// Extension of executables; empty on Unix.
    pub linked_ext: String,
    /// Recipe building an object from its sources.
    pub compile_command: String,
    /// Recipe building a program from its objects.
    pub link_command: String,
    /// Prepended to every source dependency.
    pub source_prefix: String,
    /// Prepended to every target.
    pub target_prefix: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            path_separator: '/',
            preamble: DEFAULT_PREAMBLE.to_owned(),
            indent_width: 4,
            corpus_ext: ".cpp".to_owned(),
            header_ext: ".hpp".to_owned(),
            object_ext: ".o".to_owned(),
            linked_ext: String::new(),
            compile_command: "$(CXX) -o $@ $(CPPFLAGS) $(CXXFLAGS) -c $<".to_owned(),
            link_command: "$(CXX) -o $@ $^ $(LDFLAGS)".to_owned(),
            source_prefix: "$(SRCDIR)/".to_owned(),
            target_prefix: "$(OBJDIR)/".to_owned(),
        }
    }
}

impl Configuration {
    /// Parse a YAML document, filling omitted keys with defaults.
    ///
    /// `name` identifies the document in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`MkmkError::ConfigParse`] for malformed YAML or unknown keys
    /// and [`MkmkError::Config`] when the result fails validation.
    pub fn from_yaml(yaml: &str, name: &str) -> Result<Self, MkmkError> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_saphyr::from_str(yaml).map_err(|err| MkmkError::ConfigParse {
                path: name.into(),
                message: err.to_string(),
            })?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`MkmkError::Read`] when the file cannot be read, otherwise as
    /// [`Configuration::from_yaml`].
    pub fn from_path(path: &Utf8Path) -> Result<Self, MkmkError> {
        let yaml = fs::read_to_string(path).map_err(|source| MkmkError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_yaml(&yaml, path.as_str())
    }

    /// Check that source kinds can be told apart by extension.
    ///
    /// # Errors
    ///
    /// Returns [`MkmkError::Config`] when the body extension is empty or
    /// equal to the header extension.
    pub fn validate(&self) -> Result<(), MkmkError> {
        if self.corpus_ext.is_empty() {
            return Err(MkmkError::Config {
                reason: "extensionless source body files are not supported".to_owned(),
            });
        }
        if self.corpus_ext == self.header_ext {
            return Err(MkmkError::Config {
                reason: format!(
                    "body and header files share the extension {:?}",
                    self.corpus_ext
                ),
            });
        }
        Ok(())
    }

    /// One level of indentation.
    #[must_use]
    pub fn indent(&self) -> String {
        " ".repeat(self.indent_width)
    }
}
