//! Deciding which declared dependencies need installing.

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, info, warn};

use super::{Constraint, DeclaredSet};

/// Installation locality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Local,
    Global,
}

impl Scope {
    /// Scopes in the order they are checked.
    pub const PRECEDENCE: [Scope; 2] = [Scope::Local, Scope::Global];
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Scope::Local => "local",
            Scope::Global => "global",
        })
    }
}

/// Installed package versions per scope, taken fresh for a single resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstalledSnapshot {
    local: BTreeMap<String, String>,
    global: BTreeMap<String, String>,
}

impl InstalledSnapshot {
    pub fn new(local: BTreeMap<String, String>, global: BTreeMap<String, String>) -> Self {
        Self { local, global }
    }

    pub fn scope(&self, scope: Scope) -> &BTreeMap<String, String> {
        match scope {
            Scope::Local => &self.local,
            Scope::Global => &self.global,
        }
    }

    /// First scope, in precedence order, whose installed `name` satisfies `constraint`.
    pub fn satisfying(&self, name: &str, constraint: &Constraint) -> Option<(Scope, &str)> {
        Scope::PRECEDENCE.into_iter().find_map(|scope| {
            self.scope(scope)
                .get(name)
                .filter(|version| constraint.satisfied_by(version))
                .map(|version| (scope, version.as_str()))
        })
    }
}

/// A package the package manager is asked to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub name: String,
    pub constraint: String,
}

impl InstallRequest {
    /// `name@constraint`, the form handed to the package manager.
    pub fn specifier(&self) -> String {
        format!("{}@{}", self.name, self.constraint)
    }
}

impl fmt::Display for InstallRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.constraint)
    }
}

/// Outcome of a resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The declared set is empty.
    NoDependencies,
    /// Every usable declaration is already satisfied.
    NothingToInstall,
    /// Unsatisfied declarations, in declared order.
    Install(Vec<InstallRequest>),
}

/// Version resolver - pure function from declarations and installed state
/// to an install list.
pub struct VersionResolver;

impl VersionResolver {
    pub fn resolve(declared: &DeclaredSet, installed: &InstalledSnapshot) -> Resolution {
        if declared.is_empty() {
            return Resolution::NoDependencies;
        }

        let mut installs = Vec::new();
        for spec in declared.iter() {
            let Some(raw) = spec.constraint.as_deref() else {
                warn!(
                    "The dependency '{}' is skipped due to a lack of 'version' info.",
                    spec.name
                );
                continue;
            };

            let constraint = Constraint::parse(raw);
            if !constraint.is_range() {
                debug!("'{}' is not a version range, leaving it to the package manager", raw);
            }

            match installed.satisfying(&spec.name, &constraint) {
                Some((scope, version)) => {
                    info!(
                        "'{}' is already satisfied ({} {} matches {})",
                        spec.name, scope, version, raw
                    );
                }
                None => installs.push(InstallRequest {
                    name: spec.name.clone(),
                    constraint: raw.to_string(),
                }),
            }
        }

        if installs.is_empty() {
            Resolution::NothingToInstall
        } else {
            Resolution::Install(installs)
        }
    }
}
