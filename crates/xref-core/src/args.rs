//! The three positional values every run is parameterized by.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexArgs {
    /// Checkout of the repository holding per-tree configuration.
    pub config_repo_path: PathBuf,
    /// Config file describing the trees. Passed to helpers exactly as given.
    pub config_file: PathBuf,
    /// Kept as given; only the config lookup needs it as UTF-8.
    pub tree_name: OsString,
}

impl IndexArgs {
    pub fn new(
        config_repo_path: impl Into<PathBuf>,
        config_file: impl Into<PathBuf>,
        tree_name: impl Into<OsString>,
    ) -> Self {
        Self {
            config_repo_path: config_repo_path.into(),
            config_file: config_file.into(),
            tree_name: tree_name.into(),
        }
    }

    /// Absolute form of the config repo path, anchored at the current
    /// directory when relative. Does not require the path to exist.
    pub fn config_repo_absolute(&self) -> std::io::Result<PathBuf> {
        std::path::absolute(&self.config_repo_path)
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }
}
