//! List action - reports declared dependencies and their installed state.

use anyhow::Result;

use crate::config::ConfigStore;
use crate::package::{Constraint, DeclaredSet, Scope};
use crate::provider::PackageManager;
use crate::runtime::Runtime;

use super::{Context, installed_snapshot};

/// A declared dependency and what is installed for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub name: String,
    /// Declared constraint, `None` if the declaration has no usable one.
    pub constraint: Option<String>,
    /// Scope and version of the first installation satisfying the constraint.
    pub satisfied: Option<(Scope, String)>,
    /// Every installed version found, in scope precedence order.
    pub installed: Vec<(Scope, String)>,
}

/// List action - queries declarations and installed versions
pub struct ListUseCase<'a, R: Runtime, P: PackageManager> {
    ctx: &'a Context,
    runtime: &'a R,
    manager: &'a P,
}

impl<'a, R: Runtime, P: PackageManager> ListUseCase<'a, R, P> {
    pub fn new(ctx: &'a Context, runtime: &'a R, manager: &'a P) -> Self {
        Self {
            ctx,
            runtime,
            manager,
        }
    }

    /// List every declaration in declared order.
    pub async fn execute(&self) -> Result<Vec<ListEntry>> {
        let store = ConfigStore::load(self.runtime, &self.ctx.config_file)?;
        let declared = DeclaredSet::from_section(store.get(&self.ctx.config_key));
        if declared.is_empty() {
            return Ok(Vec::new());
        }

        let snapshot = installed_snapshot(self.manager, &declared.names()).await;

        Ok(declared
            .iter()
            .map(|spec| {
                let satisfied = spec.constraint.as_deref().and_then(|raw| {
                    snapshot
                        .satisfying(&spec.name, &Constraint::parse(raw))
                        .map(|(scope, version)| (scope, version.to_string()))
                });
                let installed = Scope::PRECEDENCE
                    .into_iter()
                    .filter_map(|scope| {
                        snapshot
                            .scope(scope)
                            .get(&spec.name)
                            .map(|v| (scope, v.clone()))
                    })
                    .collect();
                ListEntry {
                    name: spec.name.clone(),
                    constraint: spec.constraint.clone(),
                    satisfied,
                    installed,
                }
            })
            .collect())
    }
}
