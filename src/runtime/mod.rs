//! Runtime abstraction for system operations.
//!
//! This module provides a trait-based abstraction over the file system,
//! enabling dependency injection and testability.
//!
//! # Structure
//!
//! - `fs` - File system operations (read, write, existence)
//! - `dry_run` - A wrapper that reports writes instead of performing them

mod dry_run;
mod fs;

use anyhow::Result;
use std::path::Path;

pub use dry_run::DryRun;

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.write_impl(path, contents)
    }

    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }
}
