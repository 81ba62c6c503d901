//! Architecture manifest parsing and validation
//!
//! The architecture file is a YAML document describing every image to build.
//! Parsing is deliberately permissive (all entry fields optional) so that
//! structural validation can report the offending field and entry by name
//! before any external tool is invoked.

use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::config::defaults::DEFAULT_IMAGE_FORMAT;
use crate::core::input::{InputField, InputSpec};
use crate::error::BuildError;

/// A scalar manifest value that may be written as a string or a number
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ScalarField {
    /// Quoted or plain string
    Text(String),
    /// Integer scalar
    Int(i64),
    /// Floating point scalar, e.g. a version written as `3.2`
    Float(f64),
}

impl fmt::Display for ScalarField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
        }
    }
}

/// One raw image entry as written in the manifest
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ImageEntry {
    /// Image name, forms the output filename
    #[serde(default)]
    pub name: Option<String>,

    /// Requested logical size, e.g. "10G"
    #[serde(default)]
    pub size: Option<ScalarField>,

    /// Optional version, appended to the output filename
    #[serde(default)]
    pub version: Option<ScalarField>,

    /// Output format, defaults to qcow2
    #[serde(default)]
    pub format: Option<String>,

    /// Optional input the image is derived from
    #[serde(default)]
    pub input: Option<InputField>,
}

/// The architecture manifest
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Architecture {
    /// Owning team or user of the generated images
    #[serde(default)]
    pub owner: Option<String>,

    /// Image entries, iterated in declared order
    #[serde(default)]
    pub images: Option<IndexMap<String, ImageEntry>>,
}

/// A fully validated image specification, ready to generate
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSpec {
    /// Manifest entry key the spec came from
    pub key: String,
    /// Image name
    pub name: String,
    /// Requested logical size
    pub size: String,
    /// Optional version
    pub version: Option<String>,
    /// Output format
    pub output_format: String,
    /// Normalized input, if any
    pub input: Option<InputSpec>,
}

impl ImageSpec {
    /// Output filename: `{name}[-{version}].{format}`
    pub fn output_filename(&self) -> String {
        match &self.version {
            Some(version) => format!("{}-{}.{}", self.name, version, self.output_format),
            None => format!("{}.{}", self.name, self.output_format),
        }
    }
}

/// Load an architecture manifest from a YAML file.
pub fn load_architecture(path: &Path) -> Result<Architecture, BuildError> {
    if !path.exists() {
        return Err(BuildError::PathNotFound {
            path: path.to_path_buf(),
            reason: "Failed to find the architecture file".to_string(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| BuildError::PathLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    serde_yaml::from_str(&content).map_err(|e| BuildError::PathLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

impl Architecture {
    /// Validate the manifest structure and normalize every image entry.
    ///
    /// All validation happens up front; a malformed manifest never triggers
    /// partial image generation.
    pub fn validate(&self) -> Result<Vec<ImageSpec>, BuildError> {
        let owner = self.owner.as_deref().unwrap_or_default();
        if owner.is_empty() {
            return Err(BuildError::MissingAttribute {
                attribute: "owner".to_string(),
                context: "architecture".to_string(),
            });
        }

        let images = match &self.images {
            Some(images) if !images.is_empty() => images,
            _ => {
                return Err(BuildError::MissingAttribute {
                    attribute: "images".to_string(),
                    context: "architecture".to_string(),
                })
            }
        };

        let mut specs = Vec::with_capacity(images.len());
        for (key, entry) in images {
            let name = entry.name.clone().ok_or_else(|| BuildError::MissingAttribute {
                attribute: "name".to_string(),
                context: key.clone(),
            })?;
            let size = entry
                .size
                .as_ref()
                .ok_or_else(|| BuildError::MissingAttribute {
                    attribute: "size".to_string(),
                    context: key.clone(),
                })?
                .to_string();
            let input = entry
                .input
                .as_ref()
                .map(|input| input.normalize(key))
                .transpose()?;

            specs.push(ImageSpec {
                key: key.clone(),
                name,
                size,
                version: entry.version.as_ref().map(ToString::to_string),
                output_format: entry
                    .format
                    .clone()
                    .unwrap_or_else(|| DEFAULT_IMAGE_FORMAT.to_string()),
                input,
            });
        }
        Ok(specs)
    }
}
