//! Error types for vmforge
//!
//! Domain-specific error types using thiserror. Every fatal error maps to a
//! stable numeric exit code through [`BuildError::exit_code`], so CI
//! pipelines can branch on the failure class without parsing messages.

use std::path::PathBuf;
use thiserror::Error;

/// Exit code reported on success.
pub const SUCCESS: i32 = 0;

/// Exit code reported when the response object itself cannot be serialized.
pub const JSON_DUMP_ERROR: i32 = 9;

/// Checksum computation and verification errors
#[derive(Error, Debug)]
pub enum ChecksumError {
    /// Requested digest algorithm is not supported
    #[error("Unsupported checksum algorithm: '{algorithm}'")]
    UnsupportedAlgorithm { algorithm: String },

    /// The file could not be read while digesting
    #[error("Failed to read '{path}' while computing its checksum: {error}")]
    Io { path: PathBuf, error: String },

    /// Computed digest does not match the expected value
    #[error(
        "The checksum of the input image: {actual} does not match the expected checksum: {expected}"
    )]
    Mismatch { expected: String, actual: String },
}

/// Download errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Network error
    #[error("Network error downloading '{url}': {error}")]
    Network { url: String, error: String },

    /// IO error while writing the fetched content
    #[error("IO error for '{path}': {error}")]
    Io { path: PathBuf, error: String },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to stat a file for its size
    #[error("Failed to get the size of path: {path}")]
    FileSize { path: PathBuf },
}

/// External command execution failure (the process could not be spawned)
#[derive(Error, Debug)]
#[error("Failed to execute '{program}': {error}")]
pub struct CommandError {
    pub program: String,
    pub error: String,
}

/// Imaging tool invocation errors
#[derive(Error, Debug)]
pub enum ImageToolError {
    /// The tool could not be started at all
    #[error("{0}")]
    Spawn(#[from] CommandError),

    /// The tool ran and reported a failure
    #[error("qemu-img {action} failed: {stderr}")]
    Failed { action: String, stderr: String },
}

/// Size string parsing error
#[derive(Error, Debug)]
#[error("Invalid size value: '{value}'")]
pub struct SizeError {
    pub value: String,
}

/// Top-level build error
///
/// A closed taxonomy: each variant corresponds to one CLI exit code and
/// carries structured context instead of a pre-formatted message.
#[derive(Error, Debug)]
pub enum BuildError {
    /// A referenced path does not exist
    #[error("Path not found: {path} - error: {reason}")]
    PathNotFound { path: PathBuf, reason: String },

    /// A file exists but could not be loaded or parsed
    #[error("Failed to load path: {path} - error: {reason}")]
    PathLoad { path: PathBuf, reason: String },

    /// A directory or image artifact could not be created
    #[error("Failed to create path: {path} - error: {reason}")]
    PathCreate { path: PathBuf, reason: String },

    /// A required manifest attribute is absent
    #[error("Missing attribute: {attribute} in {context}")]
    MissingAttribute { attribute: String, context: String },

    /// A manifest attribute has the wrong shape or type
    #[error("Invalid attribute type for value: {value} - must be {expected}")]
    InvalidAttributeType { value: String, expected: String },

    /// Checksum error
    #[error("Checksum error: {0}")]
    Checksum(#[from] ChecksumError),

    /// Resizing the output image failed
    #[error("Failed to resize image: {path} - error: {reason}")]
    Resize { path: PathBuf, reason: String },

    /// The generated image failed its consistency check
    #[error("Consistency check failed for image: {path} - error: {reason}")]
    Check { path: PathBuf, reason: String },

    /// Download error
    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    /// The size of a local file could not be determined
    #[error("Failed to get the size of path: {path}")]
    FileSize { path: PathBuf },
}

impl BuildError {
    /// Numeric exit code for this failure class.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::PathNotFound { .. } => 1,
            Self::PathLoad { .. } => 2,
            Self::PathCreate { .. } => 3,
            Self::MissingAttribute { .. } => 4,
            Self::InvalidAttributeType { .. } => 5,
            Self::Checksum(_) => 6,
            Self::Resize { .. } => 7,
            Self::Check { .. } => 8,
            Self::Download(_) => 10,
            Self::FileSize { .. } => 11,
        }
    }
}

impl From<FilesystemError> for BuildError {
    fn from(error: FilesystemError) -> Self {
        match error {
            FilesystemError::CreateDir { path, error } => Self::PathCreate {
                path,
                reason: error,
            },
            FilesystemError::FileSize { path } => Self::FileSize { path },
        }
    }
}
