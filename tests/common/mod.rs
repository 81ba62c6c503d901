//! Common test utilities and helpers
//!
//! Shared utilities for integration tests: an isolated project directory
//! and a simulated qemu-img runner.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;

use tempfile::TempDir;

use vmforge::error::CommandError;
use vmforge::infra::runner::{CommandRunner, RunOutput};

/// Test project context backed by a temporary directory
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

#[allow(dead_code)]
impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Directory for generated images inside the test project
    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("generated-images")
    }

    /// Directory for cached downloads inside the test project
    pub fn tmp_dir(&self) -> PathBuf {
        self.dir.path().join("tmp")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Simulated qemu-img runner.
///
/// Records every invocation and mimics the tool's filesystem effects:
/// `create` writes the output file, `convert` copies the input to the
/// output. Individual actions can be made to fail with a non-zero exit
/// code.
#[derive(Default)]
pub struct FakeRunner {
    calls: Mutex<Vec<Vec<String>>>,
    failing: Mutex<HashSet<String>>,
}

#[allow(dead_code)]
impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent invocation of `action` fail
    pub fn fail_on(&self, action: &str) {
        self.failing.lock().unwrap().insert(action.to_string());
    }

    /// All recorded invocations, argument vectors as passed to the tool
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// The action (first argument) of every recorded invocation, in order
    pub fn actions(&self) -> Vec<String> {
        self.calls().iter().map(|call| call[0].clone()).collect()
    }

    /// Number of invocations of one action
    pub fn count(&self, action: &str) -> usize {
        self.actions().iter().filter(|a| *a == action).count()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<RunOutput, CommandError> {
        assert_eq!(program, "qemu-img", "unexpected external tool: {program}");
        self.calls.lock().unwrap().push(args.to_vec());

        let action = args[0].as_str();
        if self.failing.lock().unwrap().contains(action) {
            return Ok(RunOutput {
                exit_code: Some(1),
                stdout: String::new(),
                stderr: format!("simulated {action} failure"),
            });
        }

        // Positional operands with flags and their values stripped; every
        // supported action ends with its path operands.
        let operands: Vec<&String> = args[1..]
            .iter()
            .filter(|a| !a.starts_with('-') && !is_flag_value(args, a))
            .collect();

        let mut stdout = String::new();
        match action {
            "create" => {
                // operands: [path, size]
                std::fs::write(operands[0], b"fake qemu image").unwrap();
            }
            "convert" => {
                // operands: [input, output]
                std::fs::copy(operands[0], operands[1]).unwrap();
            }
            "info" => {
                stdout = format!("image: {}\nvirtual size: 1 GiB", operands[0]);
            }
            "resize" | "amend" | "check" => {}
            other => panic!("unexpected qemu-img action: {other}"),
        }

        Ok(RunOutput {
            exit_code: Some(0),
            stdout,
            stderr: String::new(),
        })
    }
}

/// Whether `arg` is the value of a preceding `-f`/`-O`/`-o` flag
fn is_flag_value(args: &[String], arg: &String) -> bool {
    args.iter()
        .zip(args.iter().skip(1))
        .any(|(flag, value)| value == arg && matches!(flag.as_str(), "-f" | "-O" | "-o"))
}
