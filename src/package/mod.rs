//! Dependency domain model
//!
//! This module describes what the declaration file asks for and decides,
//! against what is installed, what still has to be installed.

mod declared;
mod resolver;
mod spec;
mod version;

pub use declared::{DeclaredSet, LEGACY_GROUP_KEYS};
pub use resolver::{InstallRequest, InstalledSnapshot, Resolution, Scope, VersionResolver};
pub use spec::{DeclaredValue, DependencySpec, Origin};
pub use version::{Constraint, UpgradeTarget, caret};
