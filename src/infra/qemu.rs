//! qemu-img operation wrappers
//!
//! Each imaging primitive is one `qemu-img` invocation with a uniform
//! success/failure contract: a non-zero exit code fails the operation and
//! carries the tool's captured stderr, success carries its stdout.

use std::path::Path;

use crate::config::defaults::CONSISTENCY_SUPPORTED_FORMATS;
use crate::error::ImageToolError;
use crate::infra::runner::CommandRunner;

/// Name of the external imaging tool
pub const QEMU_IMG: &str = "qemu-img";

/// Whether `format` supports a `qemu-img check` pass
pub fn consistency_check_supported(format: &str) -> bool {
    CONSISTENCY_SUPPORTED_FORMATS.contains(&format)
}

/// Thin wrapper dispatching imaging operations through a [`CommandRunner`]
#[derive(Debug)]
pub struct QemuImg<'a, R: CommandRunner> {
    runner: &'a R,
    verbose: bool,
}

impl<'a, R: CommandRunner> QemuImg<'a, R> {
    /// Create a wrapper around `runner`; without `verbose` the tool is
    /// invoked with its quiet flag.
    pub fn new(runner: &'a R, verbose: bool) -> Self {
        Self { runner, verbose }
    }

    fn call(
        &self,
        action: &str,
        args: Vec<String>,
        supports_quiet: bool,
    ) -> Result<String, ImageToolError> {
        let mut command = Vec::with_capacity(args.len() + 2);
        command.push(action.to_string());
        if supports_quiet && !self.verbose {
            command.push("-q".to_string());
        }
        command.extend(args);

        let output = self.runner.run(QEMU_IMG, &command)?;
        if !output.success() {
            return Err(ImageToolError::Failed {
                action: action.to_string(),
                stderr: output.stderr,
            });
        }
        Ok(output.stdout)
    }

    /// Allocate a new empty disk image of the given format and size
    pub fn create(&self, path: &Path, size: &str, format: &str) -> Result<String, ImageToolError> {
        self.call(
            "create",
            vec![
                "-f".to_string(),
                format.to_string(),
                path.display().to_string(),
                size.to_string(),
            ],
            true,
        )
    }

    /// Transform one disk image into another format/location
    pub fn convert(
        &self,
        input_path: &Path,
        output_path: &Path,
        input_format: &str,
        output_format: &str,
    ) -> Result<String, ImageToolError> {
        self.call(
            "convert",
            vec![
                "-f".to_string(),
                input_format.to_string(),
                "-O".to_string(),
                output_format.to_string(),
                input_path.display().to_string(),
                output_path.display().to_string(),
            ],
            true,
        )
    }

    /// Change a disk image's logical size.
    ///
    /// `shrink` passes the explicit shrink-consent flag the tool requires
    /// before reducing an image below its current size.
    pub fn resize(
        &self,
        path: &Path,
        size: &str,
        format: &str,
        shrink: bool,
    ) -> Result<String, ImageToolError> {
        let mut args = Vec::with_capacity(5);
        if shrink {
            args.push("--shrink".to_string());
        }
        args.extend([
            "-f".to_string(),
            format.to_string(),
            path.display().to_string(),
            size.to_string(),
        ]);
        self.call("resize", args, true)
    }

    /// Apply format-specific compatibility options to an existing image
    pub fn amend(&self, path: &Path, options: &str, format: &str) -> Result<String, ImageToolError> {
        self.call(
            "amend",
            vec![
                "-f".to_string(),
                format.to_string(),
                "-o".to_string(),
                options.to_string(),
                path.display().to_string(),
            ],
            true,
        )
    }

    /// Validate the internal consistency of a disk image
    pub fn check(&self, path: &Path, format: &str) -> Result<String, ImageToolError> {
        self.call(
            "check",
            vec![
                "-f".to_string(),
                format.to_string(),
                path.display().to_string(),
            ],
            true,
        )
    }

    /// Query image details; returns the tool's raw report.
    pub fn info(&self, path: &Path) -> Result<String, ImageToolError> {
        // info does not accept the quiet flag
        self.call("info", vec![path.display().to_string()], false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommandError;
    use crate::infra::runner::RunOutput;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Runner that records every invocation and always succeeds
    #[derive(Default)]
    struct RecordingRunner {
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl RecordingRunner {
        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, program: &str, args: &[String]) -> Result<RunOutput, CommandError> {
            assert_eq!(program, QEMU_IMG);
            self.calls.lock().unwrap().push(args.to_vec());
            Ok(RunOutput {
                exit_code: Some(0),
                stdout: String::new(),
                stderr: String::new(),
            })
        }
    }

    /// Runner that always fails with a fixed stderr
    struct FailingRunner;

    impl CommandRunner for FailingRunner {
        fn run(&self, _program: &str, _args: &[String]) -> Result<RunOutput, CommandError> {
            Ok(RunOutput {
                exit_code: Some(1),
                stdout: String::new(),
                stderr: "broken image".to_string(),
            })
        }
    }

    #[test]
    fn test_create_arguments() {
        let runner = RecordingRunner::default();
        let qemu = QemuImg::new(&runner, false);
        qemu.create(&PathBuf::from("out/disk.qcow2"), "10G", "qcow2")
            .unwrap();

        assert_eq!(
            runner.calls(),
            vec![vec![
                "create".to_string(),
                "-q".to_string(),
                "-f".to_string(),
                "qcow2".to_string(),
                "out/disk.qcow2".to_string(),
                "10G".to_string(),
            ]]
        );
    }

    #[test]
    fn test_verbose_drops_quiet_flag() {
        let runner = RecordingRunner::default();
        let qemu = QemuImg::new(&runner, true);
        qemu.create(&PathBuf::from("disk.qcow2"), "1G", "qcow2")
            .unwrap();

        assert!(!runner.calls()[0].contains(&"-q".to_string()));
    }

    #[test]
    fn test_convert_arguments() {
        let runner = RecordingRunner::default();
        let qemu = QemuImg::new(&runner, false);
        qemu.convert(
            &PathBuf::from("in.raw"),
            &PathBuf::from("out.qcow2"),
            "raw",
            "qcow2",
        )
        .unwrap();

        assert_eq!(
            runner.calls()[0],
            vec!["convert", "-q", "-f", "raw", "-O", "qcow2", "in.raw", "out.qcow2"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_resize_with_shrink_consent() {
        let runner = RecordingRunner::default();
        let qemu = QemuImg::new(&runner, false);
        qemu.resize(&PathBuf::from("disk.qcow2"), "5G", "qcow2", true)
            .unwrap();

        let call = &runner.calls()[0];
        assert_eq!(call[0], "resize");
        assert!(call.contains(&"--shrink".to_string()));
    }

    #[test]
    fn test_resize_without_shrink_consent() {
        let runner = RecordingRunner::default();
        let qemu = QemuImg::new(&runner, false);
        qemu.resize(&PathBuf::from("disk.qcow2"), "20G", "qcow2", false)
            .unwrap();

        assert!(!runner.calls()[0].contains(&"--shrink".to_string()));
    }

    #[test]
    fn test_amend_arguments() {
        let runner = RecordingRunner::default();
        let qemu = QemuImg::new(&runner, false);
        qemu.amend(&PathBuf::from("disk.qcow2"), "compat=v3", "qcow2")
            .unwrap();

        assert_eq!(
            runner.calls()[0],
            vec!["amend", "-q", "-f", "qcow2", "-o", "compat=v3", "disk.qcow2"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_info_never_passes_quiet_flag() {
        let runner = RecordingRunner::default();
        let qemu = QemuImg::new(&runner, false);
        qemu.info(&PathBuf::from("disk.qcow2")).unwrap();

        assert_eq!(
            runner.calls()[0],
            vec!["info".to_string(), "disk.qcow2".to_string()]
        );
    }

    #[test]
    fn test_failure_carries_tool_stderr() {
        let qemu = QemuImg::new(&FailingRunner, false);
        let err = qemu
            .check(&PathBuf::from("disk.qcow2"), "qcow2")
            .unwrap_err();

        match err {
            ImageToolError::Failed { action, stderr } => {
                assert_eq!(action, "check");
                assert_eq!(stderr, "broken image");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_consistency_check_support_set() {
        assert!(consistency_check_supported("qcow2"));
        assert!(consistency_check_supported("vdi"));
        assert!(!consistency_check_supported("raw"));
    }
}
