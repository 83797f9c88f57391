use anyhow::Result;
use log::debug;

use crate::application::{Context, ListEntry, ListUseCase};
use crate::provider::PackageManager;
use crate::runtime::Runtime;

/// List declared dependencies and where they are satisfied
#[tracing::instrument(skip(runtime, manager))]
pub async fn list<R: Runtime, P: PackageManager>(runtime: R, manager: P, ctx: &Context) -> Result<()> {
    let entries = ListUseCase::new(ctx, &runtime, &manager).execute().await?;
    if entries.is_empty() {
        println!("No dependencies.");
        return Ok(());
    }

    debug!("Found {} declared dependencies", entries.len());
    for entry in &entries {
        println!("{}", format_entry(entry));
    }
    Ok(())
}

fn format_entry(entry: &ListEntry) -> String {
    let Some(constraint) = &entry.constraint else {
        return format!("{} (no version, skipped)", entry.name);
    };
    match &entry.satisfied {
        Some((scope, version)) => format!("{} {} {} {}", entry.name, constraint, scope, version),
        None if entry.installed.is_empty() => format!("{} {} missing", entry.name, constraint),
        None => {
            let found: Vec<String> = entry
                .installed
                .iter()
                .map(|(scope, version)| format!("{} {}", scope, version))
                .collect();
            format!("{} {} outdated ({})", entry.name, constraint, found.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::Scope;
    use crate::provider::MockPackageManager;
    use crate::test_utils::mock_config_file;

    fn entry(
        constraint: Option<&str>,
        satisfied: Option<(Scope, &str)>,
        installed: &[(Scope, &str)],
    ) -> ListEntry {
        ListEntry {
            name: "left-pad".into(),
            constraint: constraint.map(String::from),
            satisfied: satisfied.map(|(s, v)| (s, v.to_string())),
            installed: installed.iter().map(|(s, v)| (*s, v.to_string())).collect(),
        }
    }

    #[test]
    fn test_format_entry() {
        assert_eq!(
            format_entry(&entry(Some("^1.0.0"), Some((Scope::Local, "1.3.0")), &[(Scope::Local, "1.3.0")])),
            "left-pad ^1.0.0 local 1.3.0"
        );
        assert_eq!(format_entry(&entry(Some("^1.0.0"), None, &[])), "left-pad ^1.0.0 missing");
        assert_eq!(
            format_entry(&entry(Some("^1.0.0"), None, &[(Scope::Global, "0.9.0")])),
            "left-pad ^1.0.0 outdated (global 0.9.0)"
        );
        assert_eq!(format_entry(&entry(None, None, &[])), "left-pad (no version, skipped)");
    }

    #[tokio::test]
    async fn test_list_without_declarations() {
        let (runtime, _file) = mock_config_file("package.json", "{}");
        let manager = MockPackageManager::new();

        let result = list(runtime, manager, &Context::default()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_list_missing_config_fails() {
        let mut runtime = crate::runtime::MockRuntime::new();
        runtime.expect_exists().returning(|_| false);
        let manager = MockPackageManager::new();

        let result = list(runtime, manager, &Context::default()).await;
        assert!(result.is_err());
    }
}
