//! The declared dependency set stored under the section key.

use log::debug;
use serde_json::Value;

use super::{DependencySpec, Origin};

/// Sub-keys older layouts used to group declarations under the section.
pub const LEGACY_GROUP_KEYS: [&str; 4] = ["pkgs", "deps", "packages", "dependencies"];

/// Ordered set of declared dependencies, unique by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeclaredSet {
    entries: Vec<DependencySpec>,
}

impl DeclaredSet {
    /// Read the declarations held by a section value.
    ///
    /// Direct entries come first in document order. A legacy group key whose
    /// value is an object without a `version` field is read as a group of
    /// declarations instead of a package; groups are merged in
    /// [`LEGACY_GROUP_KEYS`] order and later ones override earlier names.
    pub fn from_section(section: Option<&Value>) -> Self {
        let mut set = Self::default();
        let Some(Value::Object(section)) = section else {
            return set;
        };

        for (name, value) in section {
            if is_legacy_group(name, value) {
                continue;
            }
            set.upsert(DependencySpec::from_value(name, value, Origin::Direct));
        }

        for group in LEGACY_GROUP_KEYS {
            if let Some(value) = section.get(group)
                && is_legacy_group(group, value)
                && let Value::Object(members) = value
            {
                debug!("Reading legacy group '{}' ({} entries)", group, members.len());
                for (name, value) in members {
                    set.upsert(DependencySpec::from_value(
                        name,
                        value,
                        Origin::Group(group.to_string()),
                    ));
                }
            }
        }

        set
    }

    fn upsert(&mut self, spec: DependencySpec) {
        match self.entries.iter_mut().find(|e| e.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.entries.push(spec),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DependencySpec> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&DependencySpec> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Every key path below the section under which `name` is declared.
    ///
    /// A name may be declared both directly and inside legacy groups; the set
    /// keeps only the winning declaration, but removal has to clear them all.
    pub fn locations(section: Option<&Value>, name: &str) -> Vec<Vec<String>> {
        let Some(Value::Object(section)) = section else {
            return Vec::new();
        };

        let mut found = Vec::new();
        if let Some(value) = section.get(name)
            && !is_legacy_group(name, value)
        {
            found.push(vec![name.to_string()]);
        }
        for group in LEGACY_GROUP_KEYS {
            if let Some(value) = section.get(group)
                && is_legacy_group(group, value)
                && let Value::Object(members) = value
                && members.contains_key(name)
            {
                found.push(vec![group.to_string(), name.to_string()]);
            }
        }
        found
    }
}

/// A legacy group key holding an object of declarations, as opposed to a
/// package that happens to share the name.
fn is_legacy_group(key: &str, value: &Value) -> bool {
    if !LEGACY_GROUP_KEYS.contains(&key) {
        return false;
    }
    let Value::Object(members) = value else {
        return false;
    };
    !members.contains_key("version")
        && members
            .values()
            .all(|member| member.is_string() || member.is_object())
}
