//! Version constraints.
//!
//! Declared constraints use the npm range dialect. They are translated into
//! [`semver::VersionReq`] alternatives, one per `||` branch:
//!
//! - `1.2.3` and `=1.2.3` match exactly that version
//! - `^1.2.3`, `~1.2.3`, `>=1.0.0 <2.0.0` behave as in npm
//! - `1.2.x`, `1.*`, `*` and the empty string are wildcards
//! - `1.2.3 - 2.0.0` is an inclusive range
//!
//! Anything else (dist-tags such as `latest`) is kept verbatim but never
//! considered satisfied.

use std::fmt;

use semver::{Version, VersionReq};

const OPERATORS: [&str; 8] = ["", "=", "<", "<=", ">", ">=", "~", "^"];

/// A declared version constraint.
#[derive(Debug, Clone)]
pub struct Constraint {
    raw: String,
    alternatives: Option<Vec<VersionReq>>,
}

impl Constraint {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim().to_string();
        let alternatives = raw
            .split("||")
            .map(parse_comparator_set)
            .collect::<Option<Vec<_>>>();
        Self { raw, alternatives }
    }

    /// Whether the constraint is a range that can be evaluated locally.
    pub fn is_range(&self) -> bool {
        self.alternatives.is_some()
    }

    /// Whether `installed` satisfies this constraint.
    pub fn satisfied_by(&self, installed: &str) -> bool {
        let Some(alternatives) = &self.alternatives else {
            return false;
        };
        let Ok(version) = parse_version(installed) else {
            return false;
        };
        alternatives.iter().any(|req| req.matches(&version))
    }

    /// Major and (if present) minor number of the first version the constraint mentions.
    ///
    /// `^2.3.1` gives `(2, Some(3))`, `~4` gives `(4, None)`.
    pub fn base_version(&self) -> Option<(u64, Option<u64>)> {
        let first = self
            .raw
            .split("||")
            .next()?
            .split_whitespace()
            .find(|t| !t.chars().all(|c| "<>=~^".contains(c)))?;
        let (_, rest) = split_operator(first);
        let mut parts = rest.trim_start_matches(['v', 'V']).split(['.', '-', '+']);
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next().and_then(|m| m.parse().ok());
        Some((major, minor))
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Caret constraint pinned at `version`, as written into the declaration file.
pub fn caret(version: &str) -> String {
    format!("^{}", version)
}

/// How far an upgrade may move a dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum UpgradeTarget {
    /// Latest published version.
    #[default]
    Major,
    /// Latest version with the same major number.
    Minor,
    /// Latest version with the same major.minor.
    Patch,
}

impl UpgradeTarget {
    /// Metadata query specifier for `name`, scoped by the current constraint.
    ///
    /// Returns `None` when the current constraint does not mention enough of a
    /// version to scope the query.
    pub fn specifier(self, name: &str, current: Option<&Constraint>) -> Option<String> {
        match self {
            UpgradeTarget::Major => Some(name.to_string()),
            UpgradeTarget::Minor => {
                let (major, _) = current?.base_version()?;
                Some(format!("{}@{}", name, major))
            }
            UpgradeTarget::Patch => {
                let (major, minor) = current?.base_version()?;
                Some(format!("{}@{}.{}", name, major, minor?))
            }
        }
    }
}

impl fmt::Display for UpgradeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UpgradeTarget::Major => "major",
            UpgradeTarget::Minor => "minor",
            UpgradeTarget::Patch => "patch",
        })
    }
}

fn parse_version(version: &str) -> Result<Version, semver::Error> {
    Version::parse(version.trim().trim_start_matches(['v', '=']))
}

fn parse_comparator_set(set: &str) -> Option<VersionReq> {
    let set = set.trim();

    let mut comparators = Vec::new();
    if let Some((low, high)) = set.split_once(" - ") {
        comparators.push(translate(&format!(">={}", low.trim()))?);
        comparators.push(translate(&format!("<={}", high.trim()))?);
    } else {
        // npm allows whitespace between an operator and its version.
        let mut pending_op: Option<&str> = None;
        for token in set.split_whitespace() {
            if token.chars().all(|c| "<>=~^".contains(c)) {
                pending_op = Some(token);
                continue;
            }
            let token = match pending_op.take() {
                Some(op) => format!("{}{}", op, token),
                None => token.to_string(),
            };
            comparators.push(translate(&token)?);
        }
        if pending_op.is_some() {
            return None;
        }
    }

    let comparators: Vec<String> = comparators.into_iter().flatten().collect();
    if comparators.is_empty() {
        return Some(VersionReq::STAR);
    }
    VersionReq::parse(&comparators.join(", ")).ok()
}

/// Translate one npm comparator to semver syntax.
///
/// `Some(None)` means the comparator matches everything.
fn translate(comparator: &str) -> Option<Option<String>> {
    let (op, rest) = split_operator(comparator);
    let op = if op == "~>" { "~" } else { op };
    if !OPERATORS.contains(&op) {
        return None;
    }

    let rest = rest.trim().trim_start_matches(['v', 'V']);
    let core_end = rest.find(['-', '+']).unwrap_or(rest.len());
    let (core, suffix) = rest.split_at(core_end);

    let parts: Vec<&str> = core.split('.').collect();
    let kept: Vec<&str> = parts
        .iter()
        .take_while(|p| !matches!(**p, "x" | "X" | "*" | ""))
        .copied()
        .collect();

    if kept.is_empty() {
        return match op {
            "" | "=" | ">=" | "<=" | "~" | "^" => Some(None),
            _ => None,
        };
    }
    if kept.iter().any(|p| p.parse::<u64>().is_err()) {
        return None;
    }

    let suffix = if kept.len() == parts.len() { suffix } else { "" };
    let op = if op.is_empty() { "=" } else { op };
    Some(Some(format!("{}{}{}", op, kept.join("."), suffix)))
}

fn split_operator(comparator: &str) -> (&str, &str) {
    let end = comparator
        .find(|c: char| !"<>=~^".contains(c))
        .unwrap_or(comparator.len());
    comparator.split_at(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn satisfies(version: &str, range: &str) -> bool {
        Constraint::parse(range).satisfied_by(version)
    }

    #[test]
    fn test_caret_and_tilde() {
        assert!(satisfies("1.2.0", "^1.0.0"));
        assert!(!satisfies("2.0.0", "^1.0.0"));
        assert!(!satisfies("0.9.0", "^1.0.0"));
        assert!(satisfies("0.2.5", "^0.2.3"));
        assert!(!satisfies("0.3.0", "^0.2.3"));
        assert!(satisfies("1.2.9", "~1.2.3"));
        assert!(!satisfies("1.3.0", "~1.2.3"));
    }

    #[test]
    fn test_bare_version_is_exact() {
        assert!(satisfies("1.2.3", "1.2.3"));
        assert!(!satisfies("1.2.4", "1.2.3"));
        assert!(satisfies("1.2.3", "v1.2.3"));
        assert!(satisfies("1.2.3", "=1.2.3"));
    }

    #[test]
    fn test_wildcards() {
        assert!(satisfies("3.4.5", "*"));
        assert!(satisfies("3.4.5", ""));
        assert!(satisfies("1.9.0", "1.x"));
        assert!(!satisfies("2.0.0", "1.x"));
        assert!(satisfies("1.2.7", "1.2.*"));
        assert!(!satisfies("1.3.0", "1.2.X"));
        assert!(satisfies("1.5.0", ">=1.x"));
    }

    #[test]
    fn test_comparator_sets_and_alternatives() {
        assert!(satisfies("1.5.0", ">=1.0.0 <2.0.0"));
        assert!(!satisfies("2.0.0", ">=1.0.0 <2.0.0"));
        assert!(satisfies("1.5.0", ">= 1.0.0 < 2.0.0"));
        assert!(satisfies("3.1.0", "^1.0.0 || ^3.0.0"));
        assert!(!satisfies("2.1.0", "^1.0.0 || ^3.0.0"));
    }

    #[test]
    fn test_hyphen_range() {
        assert!(satisfies("1.2.3", "1.2.3 - 2.3.4"));
        assert!(satisfies("2.3.4", "1.2.3 - 2.3.4"));
        assert!(!satisfies("2.3.5", "1.2.3 - 2.3.4"));
        assert!(satisfies("2.3.9", "1.2 - 2.3"));
    }

    #[test]
    fn test_prerelease_matching() {
        assert!(satisfies("1.0.0-beta.2", "^1.0.0-beta.1"));
        assert!(!satisfies("1.1.0-beta.1", "^1.0.0"));
    }

    #[test]
    fn test_non_range_constraints_never_satisfied() {
        let latest = Constraint::parse("latest");
        assert!(!latest.is_range());
        assert!(!latest.satisfied_by("1.0.0"));
        assert!(!satisfies("1.0.0", "github:user/repo"));
    }

    #[test]
    fn test_unparsable_installed_version() {
        assert!(!satisfies("not-a-version", "*"));
    }

    #[test]
    fn test_base_version() {
        assert_eq!(Constraint::parse("^2.3.1").base_version(), Some((2, Some(3))));
        assert_eq!(Constraint::parse("~4").base_version(), Some((4, None)));
        assert_eq!(Constraint::parse(">= 1.2.0 <2").base_version(), Some((1, Some(2))));
        assert_eq!(Constraint::parse("v3.0.0").base_version(), Some((3, Some(0))));
        assert_eq!(Constraint::parse("latest").base_version(), None);
    }

    #[test]
    fn test_upgrade_specifiers() {
        let current = Constraint::parse("^2.3.1");
        assert_eq!(
            UpgradeTarget::Patch.specifier("pkg", Some(&current)),
            Some("pkg@2.3".to_string())
        );
        assert_eq!(
            UpgradeTarget::Minor.specifier("pkg", Some(&current)),
            Some("pkg@2".to_string())
        );
        assert_eq!(
            UpgradeTarget::Major.specifier("pkg", Some(&current)),
            Some("pkg".to_string())
        );
        assert_eq!(UpgradeTarget::Major.specifier("pkg", None), Some("pkg".to_string()));

        let loose = Constraint::parse("~4");
        assert_eq!(UpgradeTarget::Patch.specifier("pkg", Some(&loose)), None);
        assert_eq!(
            UpgradeTarget::Minor.specifier("pkg", Some(&loose)),
            Some("pkg@4".to_string())
        );
    }

    #[test]
    fn test_caret() {
        assert_eq!(caret("1.3.0"), "^1.3.0");
    }
}
