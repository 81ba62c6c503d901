//! Output formatting and progress indicators
//!
//! Every invocation ends with one structured JSON response object, printed
//! to stdout on success and stderr on failure, so CI pipelines can consume
//! the result without scraping log lines.

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::error::{BuildError, JSON_DUMP_ERROR, SUCCESS};

/// Structured response emitted on every exit
#[derive(Debug, Serialize)]
pub struct Response {
    /// "success" or "failed"
    pub status: &'static str,

    /// Human-readable summary or error message
    pub msg: String,

    /// Output artifact paths, plus the verbose log when requested
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,

    /// Process exit code
    pub return_code: i32,
}

impl Response {
    /// Successful response with the given summary and outputs
    pub fn success(msg: String, outputs: Vec<String>) -> Self {
        Self {
            status: "success",
            msg,
            outputs,
            return_code: SUCCESS,
        }
    }

    /// Failed response derived from a build error
    pub fn failed(error: &BuildError) -> Self {
        Self {
            status: "failed",
            msg: error.to_string(),
            outputs: Vec::new(),
            return_code: error.exit_code(),
        }
    }
}

/// Print the response as pretty JSON and return the process exit code.
pub fn emit(response: &Response) -> i32 {
    match serde_json::to_string_pretty(response) {
        Ok(body) => {
            if response.return_code == SUCCESS {
                println!("{body}");
            } else {
                eprintln!("{body}");
            }
            response.return_code
        }
        Err(e) => {
            eprintln!("Failed to dump JSON: {e}");
            JSON_DUMP_ERROR
        }
    }
}

/// Create a progress bar for downloads
pub fn create_download_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .expect("Invalid progress bar template")
            .progress_chars("█▓▒░"),
    );
    pb
}
