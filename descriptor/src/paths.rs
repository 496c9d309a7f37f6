//! Descriptor file discovery.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DescriptorError, Result};

const EXTENSIONS: [&str; 3] = ["json", "yml", "yaml"];

fn is_descriptor(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| EXTENSIONS.contains(&ext))
}

/// Collects descriptor file paths from input files and/or directories.
///
/// Directories are scanned one level deep for `.json`, `.yml` and `.yaml`
/// files. The result is sorted and free of duplicates.
///
/// # Errors
///
/// Returns [`InvalidInput`](DescriptorError::InvalidInput) when no inputs are
/// given, an input does not exist, a file has another extension, or nothing
/// was found.
pub fn collect_descriptor_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    if inputs.is_empty() {
        return Err(DescriptorError::InvalidInput(
            "No descriptor paths were provided".to_string(),
        ));
    }

    let mut paths = BTreeSet::new();

    for input in inputs {
        if input.is_dir() {
            for entry in fs::read_dir(input)? {
                let path = entry?.path();
                if path.is_file() && is_descriptor(&path) {
                    paths.insert(path);
                }
            }
            continue;
        }

        if input.is_file() {
            if !is_descriptor(input) {
                return Err(DescriptorError::InvalidInput(format!(
                    "Descriptor file '{}' must end in .json, .yml or .yaml",
                    input.display()
                )));
            }
            paths.insert(input.clone());
            continue;
        }

        return Err(DescriptorError::InvalidInput(format!(
            "Descriptor path '{}' does not exist",
            input.display()
        )));
    }

    if paths.is_empty() {
        return Err(DescriptorError::InvalidInput(
            "No descriptor files found in the provided inputs".to_string(),
        ));
    }

    Ok(paths.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_from_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("more");
        fs::create_dir(&nested).unwrap();
        fs::write(dir.path().join("a.yaml"), "fields: []").unwrap();
        fs::write(dir.path().join("b.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::write(nested.join("c.yml"), "fields: []").unwrap();

        let paths =
            collect_descriptor_paths(&[dir.path().to_path_buf(), nested.join("c.yml")]).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.yaml", "b.json", "c.yml"]);
    }

    #[test]
    fn test_rejects_missing_and_foreign_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("schema.txt");
        fs::write(&txt, "").unwrap();

        assert!(collect_descriptor_paths(&[]).is_err());
        assert!(collect_descriptor_paths(&[dir.path().join("missing.yaml")]).is_err());
        assert!(collect_descriptor_paths(&[txt]).is_err());
        assert!(collect_descriptor_paths(&[dir.path().to_path_buf()]).is_err());
    }
}
