//! Test utilities for building throwaway source trees.
//!
//! [`SourceTree`] writes a handful of C++ files into a temporary directory so
//! integration tests can point the generator (or the `mkmk` binary) at a
//! real project layout.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

/// A temporary directory populated with source files.
///
/// The directory is removed when the tree is dropped.
#[derive(Debug)]
pub struct SourceTree {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl SourceTree {
    /// Create an empty tree.
    ///
    /// # Errors
    ///
    /// Returns an error when the temporary directory cannot be created or its
    /// path is not valid UTF-8.
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("create temp dir for source tree")?;
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|path| anyhow::anyhow!("temp dir is not UTF-8: {}", path.display()))?;
        Ok(Self { _dir: dir, root })
    }

    /// Create a tree holding `files`, given as `(relative path, contents)`.
    ///
    /// # Errors
    ///
    /// Returns an error when any file cannot be written.
    pub fn with_files(files: &[(&str, &str)]) -> Result<Self> {
        let tree = Self::new()?;
        for (path, contents) in files {
            tree.write(path, contents)?;
        }
        Ok(tree)
    }

    /// Write `contents` to `path` below the root, creating parent folders.
    ///
    /// # Errors
    ///
    /// Returns an error when the file or its folders cannot be created.
    pub fn write(&self, path: &str, contents: impl AsRef<[u8]>) -> Result<()> {
        let full = self.root.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
        }
        fs::write(&full, contents).with_context(|| format!("write {full}"))
    }

    /// Root directory of the tree.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

}
