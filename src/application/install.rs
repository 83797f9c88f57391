//! Install use case - declares requested packages and installs whatever the
//! declaration file asks for but is not installed yet.

use anyhow::{Context as _, Result};
use log::info;
use serde_json::{Map, Value};

use crate::config::{ConfigStore, deep_merge};
use crate::package::{DeclaredSet, Resolution, VersionResolver, caret};
use crate::provider::{InstallFlags, PackageManager};
use crate::runtime::Runtime;

use super::{Context, fetch_metadata, installed_snapshot, section_patch};

/// Options for the install use case
#[derive(Debug, Clone, Copy, Default)]
pub struct InstallOptions {
    /// Install into the global scope
    pub global: bool,
}

/// What an install run did.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallOutcome {
    /// Declarations written for the requested packages, as (name, constraint).
    pub declared: Vec<(String, String)>,
    /// Resolution of the full declared set.
    pub resolution: Resolution,
}

pub struct InstallUseCase<'a, R: Runtime, P: PackageManager> {
    ctx: &'a Context,
    runtime: &'a R,
    manager: &'a P,
}

impl<'a, R: Runtime, P: PackageManager> InstallUseCase<'a, R, P> {
    pub fn new(ctx: &'a Context, runtime: &'a R, manager: &'a P) -> Self {
        Self {
            ctx,
            runtime,
            manager,
        }
    }

    /// Declare `names` (if any) at their latest version, then install every
    /// unsatisfied declaration.
    ///
    /// New declarations are saved before resolution starts and stay saved
    /// even if installation fails.
    #[tracing::instrument(skip(self))]
    pub async fn execute(&self, names: &[String], options: InstallOptions) -> Result<InstallOutcome> {
        let key = self.ctx.config_key.as_str();
        let mut store = ConfigStore::load(self.runtime, &self.ctx.config_file)?;

        let mut declared_now = Vec::new();
        if !names.is_empty() {
            let metadata = fetch_metadata(self.manager, names).await?;
            let existing = DeclaredSet::from_section(store.get(key));

            let mut patch = Map::new();
            for meta in metadata {
                let constraint = caret(&meta.version);
                let entry = match existing.get(&meta.name) {
                    Some(spec) => spec.retarget_patch(&constraint),
                    None => {
                        let mut entry = Map::new();
                        entry.insert(meta.name.clone(), Value::String(constraint.clone()));
                        entry
                    }
                };
                info!("Declaring {}@{}", meta.name, constraint);
                deep_merge(&mut patch, entry);
                declared_now.push((meta.name, constraint));
            }

            store.assign(section_patch(key, patch));
            store.save()?;
        }

        let declared = DeclaredSet::from_section(store.get(key));
        let resolution = if declared.is_empty() {
            Resolution::NoDependencies
        } else {
            info!("Resolving {} declared dependencies", declared.len());
            let snapshot = installed_snapshot(self.manager, &declared.names()).await;
            VersionResolver::resolve(&declared, &snapshot)
        };

        if let Resolution::Install(requests) = &resolution {
            let specifiers: Vec<String> = requests.iter().map(|r| r.specifier()).collect();
            info!("Installing {} ...", specifiers.join(", "));
            let flags = InstallFlags {
                global: options.global,
                dry_run: self.ctx.dry_run,
            };
            self.manager
                .install(&specifiers, flags)
                .await
                .context("Installation failed")?;
        }

        Ok(InstallOutcome {
            declared: declared_now,
            resolution,
        })
    }
}
