//! [`PackageManager`] backed by the `npm` executable.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Output;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;
use serde_json::Value;
use tokio::process::Command;

use super::{InstallFlags, PackageManager, PackageMetadata, UninstallFlags};
use crate::package::Scope;

#[cfg(windows)]
pub const DEFAULT_PROGRAM: &str = "npm.cmd";
#[cfg(not(windows))]
pub const DEFAULT_PROGRAM: &str = "npm";

pub struct Npm {
    program: PathBuf,
}

impl Npm {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn exec(&self, args: &[String]) -> Result<Output> {
        info!("[exec] {} {}", self.program.display(), args.join(" "));
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .await
            .with_context(|| format!("Failed to run {:?}", self.program))?;
        debug!(
            "{:?} exited with {} ({} bytes of output)",
            self.program,
            output.status,
            output.stdout.len()
        );
        Ok(output)
    }

    /// Run and fail unless the command exits successfully.
    async fn exec_checked(&self, args: &[String]) -> Result<Output> {
        let output = self.exec(args).await?;
        if !output.status.success() {
            bail!(
                "`{} {}` failed with {}: {}",
                self.program.display(),
                args.join(" "),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(output)
    }
}

#[async_trait]
impl PackageManager for Npm {
    async fn list_installed(
        &self,
        names: &[String],
        scope: Scope,
    ) -> Result<BTreeMap<String, String>> {
        let mut args = vec!["ls".to_string()];
        if scope == Scope::Global {
            args.push("-g".into());
        }
        args.extend(names.iter().cloned());
        args.push("--json".into());
        args.push("--depth=0".into());

        // `npm ls` exits non-zero when something is missing but still reports
        // what it found.
        let output = self.exec(&args).await?;
        parse_ls_output(&String::from_utf8_lossy(&output.stdout))
            .with_context(|| format!("Failed to list {} packages", scope))
    }

    async fn query_metadata(&self, specifier: &str) -> Result<PackageMetadata> {
        let args = vec![
            "view".to_string(),
            specifier.to_string(),
            "name".into(),
            "version".into(),
            "--json".into(),
        ];
        let output = self
            .exec_checked(&args)
            .await
            .with_context(|| format!("Failed to fetch info of '{}'", specifier))?;
        parse_view_output(&String::from_utf8_lossy(&output.stdout))
            .with_context(|| format!("Failed to fetch info of '{}'", specifier))
    }

    async fn install(&self, specifiers: &[String], flags: InstallFlags) -> Result<()> {
        let mut args = vec!["i".to_string(), "--no-save".into()];
        if flags.global {
            args.push("-g".into());
        }
        if flags.dry_run {
            args.push("--dry-run".into());
        }
        args.extend(specifiers.iter().cloned());

        self.exec_checked(&args).await?;
        Ok(())
    }

    async fn uninstall(&self, names: &[String], flags: UninstallFlags) -> Result<()> {
        let mut args = vec!["uninstall".to_string(), "--no-save".into()];
        if flags.dry_run {
            args.push("--dry-run".into());
        }
        args.extend(names.iter().cloned());

        self.exec_checked(&args).await?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct LsOutput {
    #[serde(default)]
    dependencies: BTreeMap<String, LsEntry>,
}

#[derive(Deserialize)]
struct LsEntry {
    version: Option<String>,
}

/// Installed versions from `npm ls --json` output.
fn parse_ls_output(stdout: &str) -> Result<BTreeMap<String, String>> {
    let parsed: LsOutput = serde_json::from_str(stdout).context("Invalid `npm ls` output")?;
    Ok(parsed
        .dependencies
        .into_iter()
        .filter_map(|(name, entry)| entry.version.map(|v| (name, v)))
        .collect())
}

/// Metadata from `npm view --json` output.
///
/// A range matching several versions yields an array in ascending version
/// order; the last element is the newest match.
fn parse_view_output(stdout: &str) -> Result<PackageMetadata> {
    if stdout.trim().is_empty() {
        bail!("No matching version found");
    }
    let value: Value = serde_json::from_str(stdout).context("Invalid `npm view` output")?;
    let value = match value {
        Value::Array(items) => items
            .into_iter()
            .last()
            .context("No matching version found")?,
        other => other,
    };
    if !value.is_object() {
        bail!("Unexpected package info: {}", value);
    }
    serde_json::from_value(value).context("Package info lacks name or version")
}
