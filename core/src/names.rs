//! Option names and the schema-wide name registry.

use std::collections::HashMap;
use std::fmt;

use crate::error::ConfigError;

/// Insertion-ordered names of one option.
///
/// The first name is the *primary* name, used in diagnostics, help output and
/// as the key when an [`ArgumentBag`](crate::ArgumentBag) is serialized.
///
/// # Examples
///
/// ```
/// use argsplit_core::Names;
///
/// let names = Names::from(["-v", "--verbose"]);
/// assert_eq!(names.primary(), "-v");
/// assert!(names.contains("--verbose"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Names(Vec<String>);

impl Names {
    /// Creates a name set from already collected names.
    ///
    /// Names are validated when the owning schema is built, not here.
    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    /// Returns the first declared name, or `""` if none were declared.
    pub fn primary(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or("")
    }

    /// Returns `true` if `name` is one of the declared names.
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    /// Iterates names in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of declared names.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no names were declared.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Names {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

impl From<&str> for Names {
    fn from(name: &str) -> Self {
        Self(vec![name.to_string()])
    }
}

impl From<String> for Names {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl<const N: usize> From<[&str; N]> for Names {
    fn from(names: [&str; N]) -> Self {
        Self(names.iter().map(|n| n.to_string()).collect())
    }
}

impl From<&[&str]> for Names {
    fn from(names: &[&str]) -> Self {
        Self(names.iter().map(|n| n.to_string()).collect())
    }
}

impl From<Vec<&str>> for Names {
    fn from(names: Vec<&str>) -> Self {
        Self(names.into_iter().map(String::from).collect())
    }
}

impl From<Vec<String>> for Names {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

/// Maps every declared name of a schema to the index of its option.
#[derive(Debug, Clone, Default)]
pub(crate) struct NameRegistry {
    by_name: HashMap<String, usize>,
}

impl NameRegistry {
    /// Registers all names of the option at `index`.
    pub(crate) fn register(
        &mut self,
        index: usize,
        kind: &'static str,
        names: &Names,
    ) -> Result<(), ConfigError> {
        if names.is_empty() {
            return Err(ConfigError::NoNames { kind, index });
        }
        for name in names.iter() {
            validate_name(name)?;
            if self.by_name.insert(name.to_string(), index).is_some() {
                return Err(ConfigError::DuplicateName(name.to_string()));
            }
        }
        Ok(())
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }
}

fn validate_name(name: &str) -> Result<(), ConfigError> {
    let invalid = name.is_empty()
        || name == "--"
        || name.starts_with('@')
        || name.contains('=')
        || name.chars().any(char::is_whitespace);
    if invalid {
        return Err(ConfigError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_rejects_duplicates_across_options() {
        let mut registry = NameRegistry::default();
        registry
            .register(0, "flag", &Names::from(["-v", "--verbose"]))
            .unwrap();
        let err = registry
            .register(1, "single", &Names::from(["--out", "-v"]))
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateName("-v".into()));
    }

    #[test]
    fn test_registry_rejects_duplicates_within_option() {
        let mut registry = NameRegistry::default();
        let err = registry
            .register(0, "flag", &Names::from(["-v", "-v"]))
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateName("-v".into()));
    }

    #[test]
    fn test_registry_rejects_empty_names() {
        let mut registry = NameRegistry::default();
        let err = registry
            .register(3, "required", &Names::default())
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::NoNames {
                kind: "required",
                index: 3
            }
        );
    }

    #[test]
    fn test_invalid_name_syntax() {
        for bad in ["", "--", "@file", "--a=b", "two words"] {
            assert_eq!(
                validate_name(bad),
                Err(ConfigError::InvalidName(bad.to_string())),
                "{bad:?} should be rejected"
            );
        }
        assert!(validate_name("--list").is_ok());
        assert!(validate_name("help").is_ok());
    }

    #[test]
    fn test_lookup() {
        let mut registry = NameRegistry::default();
        registry.register(2, "branch", &Names::from("help")).unwrap();
        assert_eq!(registry.lookup("help"), Some(2));
        assert_eq!(registry.lookup("Help"), None);
    }
}
