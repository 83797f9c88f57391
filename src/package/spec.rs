//! A single declared dependency.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The two shapes a declaration may take in the document.
///
/// ```json
/// { "left-pad": "^1.0.0", "chalk": { "version": "^5.0.0", "note": "colors" } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeclaredValue {
    /// One-liner form: the value is the constraint itself.
    Constraint(String),
    /// Object form: the constraint lives under `version`, other fields are kept as-is.
    Detailed {
        #[serde(default)]
        version: Option<String>,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
}

/// Where a declaration lives inside the section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Directly under the section key.
    Direct,
    /// Inside one of the legacy group keys (`pkgs`, `deps`, ...).
    Group(String),
}

/// One declared dependency, normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencySpec {
    pub name: String,
    /// `None` when the declaration carries no usable constraint.
    pub constraint: Option<String>,
    /// True if declared in object form.
    pub detailed: bool,
    pub origin: Origin,
}

impl DependencySpec {
    /// Normalize a raw document value.
    pub fn from_value(name: impl Into<String>, value: &Value, origin: Origin) -> Self {
        let parsed = serde_json::from_value::<DeclaredValue>(value.clone()).ok();
        let (constraint, detailed) = match parsed {
            Some(DeclaredValue::Constraint(c)) => (Some(c), false),
            Some(DeclaredValue::Detailed { version, .. }) => (version, true),
            None => (None, value.is_object()),
        };

        Self {
            name: name.into(),
            constraint: constraint
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            detailed,
            origin,
        }
    }

    /// Patch (relative to the section) that retargets this declaration to `constraint`.
    ///
    /// Object-form declarations only get their `version` field replaced so any
    /// other fields survive the merge.
    pub fn retarget_patch(&self, constraint: &str) -> Map<String, Value> {
        let leaf = if self.detailed {
            let mut version = Map::new();
            version.insert("version".into(), Value::String(constraint.to_string()));
            Value::Object(version)
        } else {
            Value::String(constraint.to_string())
        };

        let mut inner = Map::new();
        inner.insert(self.name.clone(), leaf);
        match &self.origin {
            Origin::Direct => inner,
            Origin::Group(group) => {
                let mut outer = Map::new();
                outer.insert(group.clone(), Value::Object(inner));
                outer
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_string_value() {
        let spec = DependencySpec::from_value("left-pad", &json!("^1.0.0"), Origin::Direct);
        assert_eq!(spec.constraint.as_deref(), Some("^1.0.0"));
        assert!(!spec.detailed);
    }

    #[test]
    fn test_from_object_value() {
        let spec = DependencySpec::from_value(
            "chalk",
            &json!({ "version": "^5.0.0", "note": "colors" }),
            Origin::Direct,
        );
        assert_eq!(spec.constraint.as_deref(), Some("^5.0.0"));
        assert!(spec.detailed);
    }

    #[test]
    fn test_missing_or_unusable_constraint() {
        for value in [json!({ "note": "x" }), json!(""), json!(42), json!(null), json!({ "version": 1 })] {
            let spec = DependencySpec::from_value("pkg", &value, Origin::Direct);
            assert_eq!(spec.constraint, None, "value: {}", value);
        }
    }

    #[test]
    fn test_retarget_patch_string_form() {
        let spec = DependencySpec::from_value("left-pad", &json!("^1.0.0"), Origin::Direct);
        assert_eq!(
            Value::Object(spec.retarget_patch("^1.3.0")),
            json!({ "left-pad": "^1.3.0" })
        );
    }

    #[test]
    fn test_retarget_patch_object_form_in_group() {
        let spec = DependencySpec::from_value(
            "chalk",
            &json!({ "version": "^4.0.0", "note": "colors" }),
            Origin::Group("deps".into()),
        );
        assert_eq!(
            Value::Object(spec.retarget_patch("^5.3.0")),
            json!({ "deps": { "chalk": { "version": "^5.3.0" } } })
        );
    }
}
