//! `@file` argument expansion.
//!
//! Expansion runs once over the raw token list before any matching. A token
//! `@path` is replaced by the lines of `path`:
//!
//! - surrounding whitespace is stripped from every line;
//! - blank lines and lines starting with `#` are dropped;
//! - each remaining line becomes exactly one token;
//! - a line starting with `@` is rejected (no recursive expansion), while a
//!   line starting with `@@` yields a literal token with one `@` removed.
//!
//! A top-level `@@token` is likewise unescaped to `@token`.
//!
//! # Example
//!
//! ```
//! use argsplit_core::{ArgFileExpander, TokenExpander};
//!
//! let dir = std::env::temp_dir();
//! let path = dir.join(format!("argsplit-doc-{}.args", std::process::id()));
//! std::fs::write(&path, "# defaults\n\n  --verbose  \n").unwrap();
//!
//! let tokens = vec![format!("@{}", path.display()), "@@home".to_string()];
//! let expanded = ArgFileExpander::new().expand(tokens).unwrap();
//! assert_eq!(expanded, vec!["--verbose", "@home"]);
//! std::fs::remove_file(&path).ok();
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ExpandError;

/// Preprocessing hook applied to the raw token list before splitting.
///
/// Closures of the right signature are expanders too.
pub trait TokenExpander: Send + Sync {
    fn expand(&self, tokens: Vec<String>) -> Result<Vec<String>, ExpandError>;
}

impl<F> TokenExpander for F
where
    F: Fn(Vec<String>) -> Result<Vec<String>, ExpandError> + Send + Sync,
{
    fn expand(&self, tokens: Vec<String>) -> Result<Vec<String>, ExpandError> {
        self(tokens)
    }
}

/// Passes tokens through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExpansion;

impl TokenExpander for NoExpansion {
    fn expand(&self, tokens: Vec<String>) -> Result<Vec<String>, ExpandError> {
        Ok(tokens)
    }
}

/// Inlines `@file` references.
///
/// Relative paths are resolved against the base directory when one is set,
/// otherwise against the process working directory.
#[derive(Debug, Clone, Default)]
pub struct ArgFileExpander {
    base_dir: Option<PathBuf>,
}

impl ArgFileExpander {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative `@file` paths against `dir`.
    pub fn with_base_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
        }
    }

    fn resolve(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn read_file(&self, reference: &str) -> Result<Vec<String>, ExpandError> {
        let path = self.resolve(reference);
        let content = fs::read_to_string(&path).map_err(|source| ExpandError::Unreadable {
            path: path.clone(),
            source,
        })?;
        let tokens = parse_arg_file(&path, &content)?;
        debug!(path = %path.display(), tokens = tokens.len(), "expanded argument file");
        Ok(tokens)
    }
}

impl TokenExpander for ArgFileExpander {
    fn expand(&self, tokens: Vec<String>) -> Result<Vec<String>, ExpandError> {
        let mut expanded = Vec::with_capacity(tokens.len());
        for token in tokens {
            if let Some(literal) = token.strip_prefix("@@") {
                expanded.push(format!("@{literal}"));
            } else if let Some(reference) = token.strip_prefix('@').filter(|r| !r.is_empty()) {
                expanded.extend(self.read_file(reference)?);
            } else {
                expanded.push(token);
            }
        }
        Ok(expanded)
    }
}

/// Splits argument-file `content` into tokens. `path` is only used in errors.
pub fn parse_arg_file(path: &Path, content: &str) -> Result<Vec<String>, ExpandError> {
    let mut tokens = Vec::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(literal) = line.strip_prefix("@@") {
            tokens.push(format!("@{literal}"));
        } else if line.starts_with('@') {
            return Err(ExpandError::NestedReference {
                path: path.to_path_buf(),
                line: number + 1,
                token: line.to_string(),
            });
        } else {
            tokens.push(line.to_string());
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_comment_and_blank_lines_dropped() {
        let tokens = parse_arg_file(Path::new("x"), "# comment\n\n   data line  \n").unwrap();
        assert_eq!(tokens, vec!["data line"]);
    }

    #[test]
    fn test_nested_reference_rejected() {
        let err = parse_arg_file(Path::new("args.txt"), "--ok\n@other.txt\n").unwrap_err();
        match err {
            ExpandError::NestedReference { line, token, .. } => {
                assert_eq!(line, 2);
                assert_eq!(token, "@other.txt");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_escaped_lines_and_tokens() {
        let tokens = parse_arg_file(Path::new("x"), "@@user\r\n").unwrap();
        assert_eq!(tokens, vec!["@user"]);

        let expanded = ArgFileExpander::new()
            .expand(strings(&["@@user", "@", "plain"]))
            .unwrap();
        assert_eq!(expanded, strings(&["@user", "@", "plain"]));
    }

    #[test]
    fn test_expands_relative_to_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("opts.txt"), "-v\n--name\n  spaced value \n").unwrap();

        let expander = ArgFileExpander::with_base_dir(dir.path());
        let expanded = expander
            .expand(strings(&["first", "@opts.txt", "last"]))
            .unwrap();
        assert_eq!(
            expanded,
            strings(&["first", "-v", "--name", "spaced value", "last"])
        );
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let expander = ArgFileExpander::with_base_dir(dir.path());
        let err = expander.expand(strings(&["@missing.txt"])).unwrap_err();
        assert!(matches!(err, ExpandError::Unreadable { ref path, .. } if path.ends_with("missing.txt")));
    }

    #[test]
    fn test_closure_expander() {
        let upper = |tokens: Vec<String>| -> Result<Vec<String>, ExpandError> {
            Ok(tokens.into_iter().map(|t| t.to_uppercase()).collect())
        };
        assert_eq!(upper.expand(strings(&["a"])).unwrap(), strings(&["A"]));
        assert_eq!(NoExpansion.expand(strings(&["@x"])).unwrap(), strings(&["@x"]));
    }
}
