//! Line-oriented recognition of local includes and `main` definitions.
//!
//! The scanner is deliberately naive: it only understands lines that start
//! with `#include "` or `int main(`. System includes (`#include <...>`),
//! indented directives, and anything hidden behind the preprocessor are
//! ignored.

use thiserror::Error;

const INCLUDE_PREFIX: &str = "#include \"";
const MAIN_PREFIX: &str = "int main(";

/// An include directive without a closing quote.
#[derive(Debug, Error, Eq, PartialEq)]
#[error("unterminated #include: {line}")]
pub struct UnterminatedInclude {
    /// The offending line.
    pub line: String,
}

/// What a single source line means to mkmk.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Line<'a> {
    /// A local include naming this path.
    Include(&'a str),
    /// The start of a `main` function definition.
    EntryPoint,
    /// Anything else.
    Other,
}

/// Return the path named by a local include directive.
///
/// # Errors
///
/// Returns [`UnterminatedInclude`] when the directive has no closing quote.
pub fn include_target(line: &str) -> Result<Option<&str>, UnterminatedInclude> {
    if line.len() <= INCLUDE_PREFIX.len() {
        return Ok(None);
    }
    let Some(rest) = line.strip_prefix(INCLUDE_PREFIX) else {
        return Ok(None);
    };
    rest.split_once('"')
        .map(|(target, _)| Some(target))
        .ok_or_else(|| UnterminatedInclude {
            line: line.to_owned(),
        })
}

/// Whether `line` opens the definition of `main`.
#[must_use]
pub fn defines_entry_point(line: &str) -> bool {
    line.starts_with(MAIN_PREFIX)
}

/// Classify `line`, trying the include directive first.
///
/// # Errors
///
/// Returns [`UnterminatedInclude`] for a malformed include directive.
pub fn classify(line: &str) -> Result<Line<'_>, UnterminatedInclude> {
    if let Some(target) = include_target(line)? {
        return Ok(Line::Include(target));
    }
    if defines_entry_point(line) {
        return Ok(Line::EntryPoint);
    }
    Ok(Line::Other)
}
