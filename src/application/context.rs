//! Per-invocation settings.

use std::path::PathBuf;

pub const DEFAULT_CONFIG_FILE: &str = "package.json";
pub const DEFAULT_CONFIG_KEY: &str = "develarms";

/// Settings shared by every use case of one invocation.
///
/// Built once from the command line and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    /// The JSON document holding the declarations.
    pub config_file: PathBuf,
    /// Top-level key of the declaration section.
    pub config_key: String,
    /// Compute and report everything, but write nothing.
    pub dry_run: bool,
}

impl Context {
    pub fn new(config_file: impl Into<PathBuf>, config_key: impl Into<String>, dry_run: bool) -> Self {
        Self {
            config_file: config_file.into(),
            config_key: config_key.into(),
            dry_run,
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_FILE, DEFAULT_CONFIG_KEY, false)
    }
}
