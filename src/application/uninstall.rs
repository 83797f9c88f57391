//! Uninstall use case - removes packages and their declarations.

use anyhow::{Context as _, Result};
use log::{debug, warn};

use crate::config::ConfigStore;
use crate::package::DeclaredSet;
use crate::provider::{PackageManager, UninstallFlags};
use crate::runtime::Runtime;

use super::Context;

/// What an uninstall run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UninstallOutcome {
    /// Declared names that were uninstalled and undeclared.
    pub removed: Vec<String>,
    /// Requested names that were not declared.
    pub skipped: Vec<String>,
}

impl UninstallOutcome {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }
}

pub struct UninstallUseCase<'a, R: Runtime, P: PackageManager> {
    ctx: &'a Context,
    runtime: &'a R,
    manager: &'a P,
}

impl<'a, R: Runtime, P: PackageManager> UninstallUseCase<'a, R, P> {
    pub fn new(ctx: &'a Context, runtime: &'a R, manager: &'a P) -> Self {
        Self {
            ctx,
            runtime,
            manager,
        }
    }

    /// Uninstall the declared ones among `names` and drop their declarations.
    ///
    /// The section key is removed entirely once nothing is declared under it.
    #[tracing::instrument(skip(self))]
    pub async fn execute(&self, names: &[String]) -> Result<UninstallOutcome> {
        let key = self.ctx.config_key.as_str();
        let mut store = ConfigStore::load(self.runtime, &self.ctx.config_file)?;
        let declared = DeclaredSet::from_section(store.get(key));

        let mut outcome = UninstallOutcome::default();
        for name in names {
            if outcome.removed.contains(name) || outcome.skipped.contains(name) {
                continue;
            }
            if declared.contains(name) {
                outcome.removed.push(name.clone());
            } else {
                warn!("'{}' is not declared in '{}', skipping", name, key);
                outcome.skipped.push(name.clone());
            }
        }
        if outcome.removed.is_empty() {
            return Ok(outcome);
        }

        let flags = UninstallFlags {
            dry_run: self.ctx.dry_run,
        };
        self.manager
            .uninstall(&outcome.removed, flags)
            .await
            .context("Uninstallation failed")?;

        store.sync()?;
        for name in &outcome.removed {
            for location in DeclaredSet::locations(store.get(key), name) {
                let mut path = vec![key];
                path.extend(location.iter().map(String::as_str));
                store.remove_path(&path);
                debug!("Undeclared '{}' at {}", name, location.join("."));
            }
        }
        if DeclaredSet::from_section(store.get(key)).is_empty() {
            debug!("Section '{}' is empty, removing it", key);
            store.remove(key);
        }
        store.save()?;

        Ok(outcome)
    }
}
