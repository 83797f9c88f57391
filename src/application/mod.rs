//! Application layer - Use cases that coordinate the config store, the
//! resolver and the package manager.
//!
//! Every use case loads the declaration file once, and writes it back at most
//! once. Declarations are persisted before the package manager is asked to
//! change anything, and are not rolled back if it fails.

mod context;
mod install;
mod list;
mod uninstall;
mod upgrade;

use anyhow::Result;
use futures_util::future::try_join_all;
use log::debug;
use serde_json::{Map, Value};

use crate::package::{InstalledSnapshot, Scope};
use crate::provider::{PackageManager, PackageMetadata};

pub use context::{Context, DEFAULT_CONFIG_FILE, DEFAULT_CONFIG_KEY};
pub use install::{InstallOptions, InstallOutcome, InstallUseCase};
pub use list::{ListEntry, ListUseCase};
pub use uninstall::{UninstallOutcome, UninstallUseCase};
pub use upgrade::{UpgradeChange, UpgradeOutcome, UpgradeUseCase};

/// Query local and global installed versions of `names` concurrently.
///
/// A failed query counts as "nothing installed" in that scope.
pub(crate) async fn installed_snapshot<P: PackageManager>(
    manager: &P,
    names: &[String],
) -> InstalledSnapshot {
    let (local, global) = tokio::join!(
        manager.list_installed(names, Scope::Local),
        manager.list_installed(names, Scope::Global)
    );
    let or_empty = |result: Result<_>, scope: Scope| {
        result.unwrap_or_else(|e| {
            debug!("Treating {} packages as empty: {:#}", scope, e);
            Default::default()
        })
    };
    InstalledSnapshot::new(or_empty(local, Scope::Local), or_empty(global, Scope::Global))
}

/// Query metadata for all `specifiers` concurrently; the first failure fails the batch.
pub(crate) async fn fetch_metadata<P: PackageManager>(
    manager: &P,
    specifiers: &[String],
) -> Result<Vec<PackageMetadata>> {
    try_join_all(specifiers.iter().map(|s| manager.query_metadata(s))).await
}

/// Wrap a section-relative patch so it applies to the whole document.
pub(crate) fn section_patch(key: &str, inner: Map<String, Value>) -> Map<String, Value> {
    let mut patch = Map::new();
    patch.insert(key.to_string(), Value::Object(inner));
    patch
}
