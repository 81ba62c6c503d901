//! Single-image command implementation
//!
//! Builds one image from command-line arguments alone, without an
//! architecture file.

use std::path::PathBuf;

use crate::cli::commands::{download_manager, CommandOutcome};
use crate::core::architecture::ImageSpec;
use crate::core::generate::{generate_image, GenerateOptions};
use crate::core::input::{classify_source, ChecksumSpec, InputSpec};
use crate::error::BuildError;
use crate::infra::runner::SystemRunner;

/// Arguments of the `single` command
#[derive(Debug)]
pub struct SingleOptions {
    pub name: String,
    pub size: String,
    pub input: Option<String>,
    pub input_format: Option<String>,
    pub input_checksum_type: Option<String>,
    pub input_checksum: Option<String>,
    pub input_checksum_buffer_size: usize,
    pub input_checksum_read_bytes: Option<u64>,
    pub output_directory: PathBuf,
    pub tmp_directory: PathBuf,
    pub output_format: String,
    pub image_version: Option<String>,
}

/// Execute the single command
pub async fn execute(opts: SingleOptions, verbose: bool) -> Result<CommandOutcome, BuildError> {
    let input = build_input(&opts)?;

    let spec = ImageSpec {
        key: opts.name.clone(),
        name: opts.name,
        size: opts.size,
        version: opts.image_version,
        output_format: opts.output_format,
        input,
    };

    let generate_opts = GenerateOptions {
        output_directory: opts.output_directory.clone(),
        tmp_directory: opts.tmp_directory,
        overwrite: false,
        verbose,
    };

    if !opts.output_directory.exists() {
        crate::infra::filesystem::create_dir_all(&opts.output_directory)?;
    }

    let runner = SystemRunner::new();
    let downloader = download_manager();
    let generated = generate_image(&spec, &generate_opts, &runner, &downloader).await?;

    let msg = if generated.skipped {
        format!(
            "The output image: {} already exists, skipping",
            generated.path.display()
        )
    } else {
        format!(
            "Successfully generated the image at: {}",
            generated.path.display()
        )
    };

    Ok(CommandOutcome {
        msg,
        outputs: vec![generated.path],
        log: generated.log,
    })
}

/// Assemble the input specification from the checksum-related flags.
///
/// A checksum value without an algorithm is a hard error; an algorithm
/// without a value is ignored, matching the flag semantics of the manifest's
/// structured input form.
fn build_input(opts: &SingleOptions) -> Result<Option<InputSpec>, BuildError> {
    let Some(raw) = &opts.input else {
        return Ok(None);
    };

    let checksum = match &opts.input_checksum {
        Some(value) => {
            let algorithm =
                opts.input_checksum_type
                    .clone()
                    .ok_or_else(|| BuildError::MissingAttribute {
                        attribute: "input-checksum-type".to_string(),
                        context: format!("checksum {value}"),
                    })?;
            if opts.input_checksum_buffer_size == 0 {
                return Err(BuildError::InvalidAttributeType {
                    value: "input-checksum-buffer-size".to_string(),
                    expected: "a positive integer".to_string(),
                });
            }
            if opts.input_checksum_read_bytes == Some(0) {
                return Err(BuildError::InvalidAttributeType {
                    value: "input-checksum-read-bytes".to_string(),
                    expected: "a positive integer".to_string(),
                });
            }
            Some(ChecksumSpec {
                algorithm,
                value: value.clone(),
                buffer_size: opts.input_checksum_buffer_size,
                read_bytes: opts.input_checksum_read_bytes,
            })
        }
        None => None,
    };

    Ok(Some(InputSpec {
        source: classify_source(raw),
        format: opts.input_format.clone(),
        checksum,
    }))
}
