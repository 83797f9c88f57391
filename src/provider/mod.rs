//! Package manager abstraction.
//!
//! The core never talks to a package manager directly. It asks a
//! [`PackageManager`] for installed versions and published metadata, and hands
//! it the final install/uninstall lists.

mod npm;

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::package::Scope;

pub use npm::{DEFAULT_PROGRAM, Npm};

/// Published metadata of a package version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
}

/// Flags for [`PackageManager::install`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallFlags {
    pub global: bool,
    pub dry_run: bool,
}

/// Flags for [`PackageManager::uninstall`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UninstallFlags {
    pub dry_run: bool,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PackageManager: Send + Sync {
    /// Installed versions of `names` in `scope`, keyed by package name.
    ///
    /// Packages that are not installed are simply absent from the map.
    async fn list_installed(
        &self,
        names: &[String],
        scope: Scope,
    ) -> Result<BTreeMap<String, String>>;

    /// Metadata of the version `specifier` resolves to (`name` or `name@range`).
    async fn query_metadata(&self, specifier: &str) -> Result<PackageMetadata>;

    /// Install `name@constraint` specifiers in one call.
    async fn install(&self, specifiers: &[String], flags: InstallFlags) -> Result<()>;

    /// Uninstall `names` in one call.
    async fn uninstall(&self, names: &[String], flags: UninstallFlags) -> Result<()>;
}
