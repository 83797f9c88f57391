//! Upgrade use case - retargets declared constraints to newer published
//! versions.
//!
//! Upgrading only rewrites the declaration file; run install afterwards to
//! bring installed packages in line.

use anyhow::Result;
use log::{info, warn};
use serde_json::Map;

use crate::config::{ConfigStore, deep_merge};
use crate::package::{Constraint, DeclaredSet, DependencySpec, UpgradeTarget, caret};
use crate::provider::PackageManager;
use crate::runtime::Runtime;

use super::{Context, fetch_metadata, section_patch};

/// One declaration rewritten by an upgrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeChange {
    pub name: String,
    /// Constraint before the upgrade, if there was a usable one.
    pub from: Option<String>,
    pub to: String,
}

impl UpgradeChange {
    pub fn is_noop(&self) -> bool {
        self.from.as_deref() == Some(self.to.as_str())
    }
}

/// What an upgrade run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpgradeOutcome {
    pub changes: Vec<UpgradeChange>,
    /// Requested names that were not declared, or could not be scoped.
    pub skipped: Vec<String>,
}

impl UpgradeOutcome {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

pub struct UpgradeUseCase<'a, R: Runtime, P: PackageManager> {
    ctx: &'a Context,
    runtime: &'a R,
    manager: &'a P,
}

impl<'a, R: Runtime, P: PackageManager> UpgradeUseCase<'a, R, P> {
    pub fn new(ctx: &'a Context, runtime: &'a R, manager: &'a P) -> Self {
        Self {
            ctx,
            runtime,
            manager,
        }
    }

    /// Rewrite the constraints of `names` (or of every declaration when empty)
    /// to `^latest`, where latest is bounded by `target`.
    #[tracing::instrument(skip(self))]
    pub async fn execute(&self, names: &[String], target: UpgradeTarget) -> Result<UpgradeOutcome> {
        let key = self.ctx.config_key.as_str();
        let mut store = ConfigStore::load(self.runtime, &self.ctx.config_file)?;
        let declared = DeclaredSet::from_section(store.get(key));

        let mut outcome = UpgradeOutcome::default();
        let candidates: Vec<&DependencySpec> = if names.is_empty() {
            declared.iter().collect()
        } else {
            let mut picked: Vec<&DependencySpec> = Vec::new();
            for name in names {
                match declared.get(name) {
                    Some(spec) if !picked.iter().any(|p| p.name == spec.name) => picked.push(spec),
                    Some(_) => {}
                    None => {
                        warn!("'{}' is not declared in '{}', skipping", name, key);
                        outcome.skipped.push(name.clone());
                    }
                }
            }
            picked
        };

        let mut planned = Vec::new();
        let mut specifiers = Vec::new();
        for spec in candidates {
            let current = spec.constraint.as_deref().map(Constraint::parse);
            match target.specifier(&spec.name, current.as_ref()) {
                Some(specifier) => {
                    planned.push(spec);
                    specifiers.push(specifier);
                }
                None => {
                    warn!(
                        "Cannot scope a {} upgrade of '{}' from '{}', skipping",
                        target,
                        spec.name,
                        spec.constraint.as_deref().unwrap_or_default()
                    );
                    outcome.skipped.push(spec.name.clone());
                }
            }
        }
        if planned.is_empty() {
            return Ok(outcome);
        }

        let metadata = fetch_metadata(self.manager, &specifiers).await?;

        let mut patch = Map::new();
        for (spec, meta) in planned.into_iter().zip(metadata) {
            let to = caret(&meta.version);
            info!(
                "{}: {} -> {}",
                spec.name,
                spec.constraint.as_deref().unwrap_or("(none)"),
                to
            );
            deep_merge(&mut patch, spec.retarget_patch(&to));
            outcome.changes.push(UpgradeChange {
                name: spec.name.clone(),
                from: spec.constraint.clone(),
                to,
            });
        }

        store.sync()?;
        store.assign(section_patch(key, patch));
        store.save()?;

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MockPackageManager, PackageMetadata};
    use crate::test_utils::mock_config_file;
    use anyhow::anyhow;
    use mockall::predicate::eq;
    use serde_json::{Value, json};

    fn ctx() -> Context {
        Context::new("package.json", "develarms", false)
    }

    fn metadata(name: &str, version: &str) -> PackageMetadata {
        PackageMetadata {
            name: name.into(),
            version: version.into(),
        }
    }

    fn written(file: &std::sync::Arc<std::sync::Mutex<String>>) -> Value {
        serde_json::from_str(&file.lock().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_patch_target_scopes_query_to_major_minor() {
        let (runtime, file) = mock_config_file("package.json", r#"{"develarms": {"pkg": "^2.3.1"}}"#);
        let mut manager = MockPackageManager::new();
        manager
            .expect_query_metadata()
            .with(eq("pkg@2.3"))
            .times(1)
            .returning(|_| Ok(metadata("pkg", "2.3.7")));
        manager.expect_install().never();

        let ctx = ctx();
        let outcome = UpgradeUseCase::new(&ctx, &runtime, &manager)
            .execute(&[], UpgradeTarget::Patch)
            .await
            .unwrap();

        assert_eq!(
            outcome.changes,
            vec![UpgradeChange {
                name: "pkg".into(),
                from: Some("^2.3.1".into()),
                to: "^2.3.7".into()
            }]
        );
        assert_eq!(written(&file), json!({ "develarms": { "pkg": "^2.3.7" } }));
    }

    #[tokio::test]
    async fn test_minor_and_major_specifiers() {
        let (runtime, file) = mock_config_file(
            "package.json",
            r#"{"develarms": {"a": "^1.2.0", "b": "~3.0.0"}}"#,
        );
        let mut manager = MockPackageManager::new();
        manager
            .expect_query_metadata()
            .with(eq("a"))
            .returning(|_| Ok(metadata("a", "4.0.0")));
        manager
            .expect_query_metadata()
            .with(eq("b"))
            .returning(|_| Ok(metadata("b", "3.9.1")));

        let ctx = ctx();
        UpgradeUseCase::new(&ctx, &runtime, &manager)
            .execute(&[], UpgradeTarget::Major)
            .await
            .unwrap();
        assert_eq!(
            written(&file),
            json!({ "develarms": { "a": "^4.0.0", "b": "^3.9.1" } })
        );

        let mut manager = MockPackageManager::new();
        manager
            .expect_query_metadata()
            .with(eq("a@4"))
            .times(1)
            .returning(|_| Ok(metadata("a", "4.2.0")));

        UpgradeUseCase::new(&ctx, &runtime, &manager)
            .execute(&["a".to_string()], UpgradeTarget::Minor)
            .await
            .unwrap();
        assert_eq!(
            written(&file),
            json!({ "develarms": { "a": "^4.2.0", "b": "^3.9.1" } })
        );
    }

    #[tokio::test]
    async fn test_unknown_names_are_skipped() {
        let original = r#"{"develarms": {"a": "^1.2.0"}}"#;
        let (runtime, file) = mock_config_file("package.json", original);
        let mut manager = MockPackageManager::new();
        manager.expect_query_metadata().never();

        let ctx = ctx();
        let outcome = UpgradeUseCase::new(&ctx, &runtime, &manager)
            .execute(&["nope".to_string()], UpgradeTarget::Major)
            .await
            .unwrap();

        assert!(outcome.is_empty());
        assert_eq!(outcome.skipped, vec!["nope"]);
        assert_eq!(*file.lock().unwrap(), original);
    }

    #[tokio::test]
    async fn test_unscopable_constraint_is_skipped() {
        let (runtime, _file) = mock_config_file(
            "package.json",
            r#"{"develarms": {"tagged": "latest", "a": "^1.2.0"}}"#,
        );
        let mut manager = MockPackageManager::new();
        manager
            .expect_query_metadata()
            .with(eq("a@1"))
            .times(1)
            .returning(|_| Ok(metadata("a", "1.9.0")));

        let ctx = ctx();
        let outcome = UpgradeUseCase::new(&ctx, &runtime, &manager)
            .execute(&[], UpgradeTarget::Minor)
            .await
            .unwrap();

        assert_eq!(outcome.skipped, vec!["tagged"]);
        assert_eq!(outcome.changes.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_query_writes_nothing() {
        let original = r#"{"develarms": {"a": "^1.2.0", "b": "^2.0.0"}}"#;
        let (runtime, file) = mock_config_file("package.json", original);
        let mut manager = MockPackageManager::new();
        manager
            .expect_query_metadata()
            .with(eq("a"))
            .returning(|_| Ok(metadata("a", "1.9.0")));
        manager
            .expect_query_metadata()
            .with(eq("b"))
            .returning(|_| Err(anyhow!("ETIMEDOUT")));

        let ctx = ctx();
        let result = UpgradeUseCase::new(&ctx, &runtime, &manager)
            .execute(&[], UpgradeTarget::Major)
            .await;

        assert!(result.is_err());
        assert_eq!(*file.lock().unwrap(), original);
    }

    #[tokio::test]
    async fn test_upgrade_preserves_concurrent_edits() {
        let (runtime, file) = mock_config_file(
            "package.json",
            r#"{"develarms": {"a": {"version": "^1.0.0", "why": "tests"}}}"#,
        );
        let mut manager = MockPackageManager::new();
        let edit = file.clone();
        manager.expect_query_metadata().returning(move |_| {
            // Someone else edits the file while the query is in flight.
            *edit.lock().unwrap() =
                r#"{"scripts": {"test": "x"}, "develarms": {"a": {"version": "^1.0.0", "why": "tests"}}}"#
                    .to_string();
            Ok(metadata("a", "1.5.0"))
        });

        let ctx = ctx();
        let outcome = UpgradeUseCase::new(&ctx, &runtime, &manager)
            .execute(&[], UpgradeTarget::Major)
            .await
            .unwrap();

        assert!(!outcome.changes[0].is_noop());
        assert_eq!(
            written(&file),
            json!({
                "scripts": { "test": "x" },
                "develarms": { "a": { "version": "^1.5.0", "why": "tests" } }
            })
        );
    }
}
