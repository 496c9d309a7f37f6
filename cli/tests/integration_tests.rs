use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path =
            std::env::temp_dir().join(format!("argsplit_cli_test_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn path(&self) -> &PathBuf {
        &self.path
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

const JAR_YAML: &str = r#"name: jar
description: Create and list archives
fields:
  - kind: flag
    names: [-v, --verbose]
    help: Print more output
  - kind: repeatable
    names: [-D, --define]
  - kind: required
    names: [jar]
    shape: path
  - kind: required
    names: [main]
  - kind: branch
    names: [help]
    schema:
      fields:
        - kind: required
          names: [topic]
"#;

fn write_jar_descriptor(dir: &TempDir) -> PathBuf {
    let path = dir.join("jar.yaml");
    fs::write(&path, JAR_YAML).expect("failed to write descriptor");
    path
}

fn argsplit(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_argsplit"))
        .args(args)
        .output()
        .expect("failed to run argsplit")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

#[test]
fn test_split_prints_json() {
    let dir = TempDir::new("split_json");
    let schema = write_jar_descriptor(&dir);

    let out = argsplit(&[
        "split",
        "--schema",
        schema.to_str().unwrap(),
        "--",
        "-v",
        "--define=a,b",
        "app.jar",
        "Main",
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(
        stdout_json(&out),
        serde_json::json!({
            "-v": true,
            "-D": ["a", "b"],
            "jar": "app.jar",
            "main": "Main",
            "help": null,
        })
    );
}

#[test]
fn test_split_branch_yaml() {
    let dir = TempDir::new("split_yaml");
    let schema = write_jar_descriptor(&dir);

    let out = argsplit(&[
        "split",
        "--schema",
        schema.to_str().unwrap(),
        "--format",
        "yaml",
        "help",
        "install",
    ]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("help:"));
    assert!(stdout.contains("topic: install"));
}

#[test]
fn test_split_expands_arg_files_unless_disabled() {
    let dir = TempDir::new("split_expand");
    let schema = write_jar_descriptor(&dir);
    let args = dir.join("args.txt");
    fs::write(&args, "# jar arguments\n\napp.jar\nMain\n").unwrap();
    let reference = format!("@{}", args.display());

    let out = argsplit(&["split", "--schema", schema.to_str().unwrap(), &reference]);
    assert!(out.status.success());
    assert_eq!(stdout_json(&out)["main"], "Main");

    let out = argsplit(&[
        "split",
        "--schema",
        schema.to_str().unwrap(),
        "--no-expand",
        &reference,
        "Main",
    ]);
    assert!(out.status.success());
    assert_eq!(stdout_json(&out)["jar"], serde_json::json!(reference));
}

#[test]
fn test_split_failure_exits_nonzero() {
    let dir = TempDir::new("split_fail");
    let schema = write_jar_descriptor(&dir);

    let out = argsplit(&[
        "split",
        "--schema",
        schema.to_str().unwrap(),
        "--",
        "app.jar",
        "Main",
        "--bogus",
    ]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("error:"));
    assert!(stderr.contains("--bogus"));

    let out = argsplit(&["split", "--schema", schema.to_str().unwrap(), "app.jar"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("main"));
}

#[test]
fn test_help_renders_descriptor() {
    let dir = TempDir::new("help");
    let schema = write_jar_descriptor(&dir);

    let out = argsplit(&["help", "--schema", schema.to_str().unwrap()]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("jar: Create and list archives"));
    assert!(stdout.contains("Usage: [options] <jar> <main> [help ...]"));
    assert!(stdout.contains("-v, --verbose"));
    assert!(stdout.contains("topic <string> (required)"));
}

#[test]
fn test_validate_reports_failures() {
    let dir = TempDir::new("validate");
    write_jar_descriptor(&dir);

    let out = argsplit(&["validate", dir.path().to_str().unwrap()]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("Validated 1 descriptor file(s)."));

    fs::write(
        dir.join("broken.json"),
        r#"{ "fields": [ { "kind": "single", "names": ["--ip"], "shape": { "named": "ip" } } ] }"#,
    )
    .unwrap();
    let out = argsplit(&["validate", dir.path().to_str().unwrap()]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("broken.json"));
    assert!(stderr.contains("1 of 2 descriptor file(s) failed validation"));
}

#[test]
fn test_validate_requires_inputs() {
    let out = argsplit(&["validate"]);
    assert!(!out.status.success());
}
