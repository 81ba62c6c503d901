//! External command execution
//!
//! All subprocess invocation goes through the [`CommandRunner`] trait so the
//! imaging tool can be replaced with a simulated runner in tests.

use std::process::Command;

use crate::error::CommandError;

/// Captured result of one external command invocation
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Exit code of the process, `None` if it was terminated by a signal
    pub exit_code: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl RunOutput {
    /// Whether the command completed with a zero exit code
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Capability to run an external command and capture its output
pub trait CommandRunner {
    /// Run `program` with `args`, blocking until it exits.
    ///
    /// A non-zero exit code is not an error at this level; it is reported
    /// through [`RunOutput::exit_code`]. `Err` means the process could not
    /// be started at all.
    fn run(&self, program: &str, args: &[String]) -> Result<RunOutput, CommandError>;
}

/// [`CommandRunner`] backed by [`std::process::Command`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    /// Create a new system runner
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<RunOutput, CommandError> {
        tracing::debug!("exec: {program} {}", args.join(" "));

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| CommandError {
                program: program.to_string(),
                error: e.to_string(),
            })?;

        Ok(RunOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
