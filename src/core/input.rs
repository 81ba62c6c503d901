//! Image input specification and resolution
//!
//! An image's input may be a bare string (local path or URL) or a structured
//! map with an explicit format and checksum. The shape is normalized into
//! [`InputSpec`] exactly once; the resolver then turns it into a concrete
//! local file, downloading and verifying as required.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::defaults::{DEFAULT_BUFFER_SIZE, DEFAULT_IMAGE_FORMAT};
use crate::error::{BuildError, ChecksumError};
use crate::infra::checksum::compute_checksum;
use crate::infra::download::DownloadManager;
use crate::infra::filesystem;

/// Raw manifest representation of an image input
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum InputField {
    /// Bare string: a local path or a URL
    Source(String),
    /// Structured map with explicit format/checksum
    Detailed(DetailedInput),
}

/// Structured input form
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DetailedInput {
    /// Local filesystem path
    #[serde(default)]
    pub path: Option<String>,

    /// Remote URL
    #[serde(default)]
    pub url: Option<String>,

    /// Format of the input image; inferred from the file extension if absent
    #[serde(default)]
    pub format: Option<String>,

    /// Expected checksum of the input image
    #[serde(default)]
    pub checksum: Option<ChecksumField>,
}

/// Raw manifest representation of an input checksum
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ChecksumField {
    /// Digest algorithm, e.g. "sha256"
    #[serde(rename = "type")]
    pub algorithm: String,

    /// Expected lowercase hex digest
    pub value: String,

    /// Read buffer size in bytes
    #[serde(default)]
    pub buffer_size: Option<usize>,

    /// Digest only the first N bytes of the file
    #[serde(default)]
    pub read_bytes: Option<u64>,
}

/// Where an input comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Local filesystem path
    Path(PathBuf),
    /// Remote URL, fetched into the cache directory
    Url(String),
}

/// Checksum expectation with defaults applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumSpec {
    pub algorithm: String,
    pub value: String,
    pub buffer_size: usize,
    pub read_bytes: Option<u64>,
}

/// Normalized input specification
#[derive(Debug, Clone, PartialEq)]
pub struct InputSpec {
    pub source: InputSource,
    pub format: Option<String>,
    pub checksum: Option<ChecksumSpec>,
}

/// An input resolved to a concrete local file
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedInput {
    pub path: PathBuf,
    pub format: String,
}

/// Classify a bare source string as a URL or a local path.
///
/// Purely syntactic: no network access, no filesystem access.
pub fn classify_source(value: &str) -> InputSource {
    match reqwest::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https" | "ftp") => {
            InputSource::Url(value.to_string())
        }
        _ => InputSource::Path(PathBuf::from(value)),
    }
}

impl ChecksumField {
    fn normalize(&self, entry: &str) -> Result<ChecksumSpec, BuildError> {
        if self.buffer_size == Some(0) {
            return Err(BuildError::InvalidAttributeType {
                value: format!("checksum buffer_size in '{entry}'"),
                expected: "a positive integer".to_string(),
            });
        }
        if self.read_bytes == Some(0) {
            return Err(BuildError::InvalidAttributeType {
                value: format!("checksum read_bytes in '{entry}'"),
                expected: "a positive integer".to_string(),
            });
        }
        Ok(ChecksumSpec {
            algorithm: self.algorithm.clone(),
            value: self.value.clone(),
            buffer_size: self.buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE),
            read_bytes: self.read_bytes,
        })
    }
}

impl InputField {
    /// Normalize the raw manifest shape into an [`InputSpec`].
    ///
    /// The structured form must name exactly one of `path`/`url`.
    pub fn normalize(&self, entry: &str) -> Result<InputSpec, BuildError> {
        match self {
            Self::Source(value) => Ok(InputSpec {
                source: classify_source(value),
                format: None,
                checksum: None,
            }),
            Self::Detailed(detailed) => {
                let source = match (&detailed.path, &detailed.url) {
                    (Some(path), None) => InputSource::Path(PathBuf::from(path)),
                    (None, Some(url)) => InputSource::Url(url.clone()),
                    (Some(_), Some(_)) => {
                        return Err(BuildError::InvalidAttributeType {
                            value: format!("input of '{entry}'"),
                            expected: "exactly one of 'path' or 'url', not both".to_string(),
                        })
                    }
                    (None, None) => {
                        return Err(BuildError::MissingAttribute {
                            attribute: "'path' or 'url'".to_string(),
                            context: format!("input of '{entry}'"),
                        })
                    }
                };
                let checksum = detailed
                    .checksum
                    .as_ref()
                    .map(|c| c.normalize(entry))
                    .transpose()?;
                Ok(InputSpec {
                    source,
                    format: detailed.format.clone(),
                    checksum,
                })
            }
        }
    }
}

/// Derive the local cache filename for a URL from its last path segment
fn cache_filename(url: &str) -> String {
    url.rsplit('/').next().unwrap_or(url).to_string()
}

/// Infer an image format from a path's file extension
fn infer_format(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().into_owned())
}

/// Resolve an input specification to a local file and format.
///
/// Remote sources are cached under `tmp_dir` keyed by the URL's last path
/// segment; an already-cached file is reused without touching the network.
/// A checksum mismatch is terminal, but the cached file is deliberately left
/// in place so a later run can re-verify it.
pub async fn resolve_input(
    spec: &InputSpec,
    tmp_dir: &Path,
    downloader: &DownloadManager,
    log: &mut Vec<String>,
) -> Result<ResolvedInput, BuildError> {
    let local_path = match &spec.source {
        InputSource::Url(url) => {
            if !tmp_dir.exists() {
                filesystem::create_dir_all(tmp_dir)?;
            }
            let cached = tmp_dir.join(cache_filename(url));
            if cached.exists() {
                log.push(format!(
                    "Reusing the cached input image: {}",
                    cached.display()
                ));
            } else {
                log.push(format!("Downloading image from: {url}"));
                let result = downloader.download(url, &cached).await?;
                log.push(format!(
                    "Downloaded {} bytes to: {}",
                    result.size,
                    cached.display()
                ));
            }
            cached
        }
        InputSource::Path(path) => {
            if !path.exists() {
                return Err(BuildError::PathNotFound {
                    path: path.clone(),
                    reason: "the defined input path does not exist".to_string(),
                });
            }
            path.clone()
        }
    };

    let format = spec
        .format
        .clone()
        .or_else(|| infer_format(&local_path))
        .unwrap_or_else(|| DEFAULT_IMAGE_FORMAT.to_string());

    if let Some(checksum) = &spec.checksum {
        let calculated = compute_checksum(
            &local_path,
            &checksum.algorithm,
            checksum.buffer_size,
            checksum.read_bytes,
        )
        .map_err(BuildError::Checksum)?;

        if calculated != checksum.value {
            return Err(ChecksumError::Mismatch {
                expected: checksum.value.clone(),
                actual: calculated,
            }
            .into());
        }
        log.push(format!(
            "The calculated checksum: {calculated} matches the expected checksum"
        ));
    }

    Ok(ResolvedInput {
        path: local_path,
        format,
    })
}
