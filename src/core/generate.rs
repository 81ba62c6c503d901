//! Per-image generation orchestration
//!
//! Composes input resolution and the imaging primitives into one image
//! artifact: decide the output path, skip or overwrite, convert-or-create,
//! shrink-aware resize, then format-specific post-processing. The first
//! fatal failure short-circuits the remaining steps.

use std::path::PathBuf;

use crate::config::defaults::{
    DEFAULT_IMAGE_FORMAT, GENERATED_IMAGE_DIR, QCOW2_COMPAT_OPTIONS, TMP_DIR,
};
use crate::core::architecture::ImageSpec;
use crate::core::input::resolve_input;
use crate::core::size::parse_size;
use crate::error::BuildError;
use crate::infra::download::DownloadManager;
use crate::infra::filesystem;
use crate::infra::qemu::{consistency_check_supported, QemuImg};
use crate::infra::runner::CommandRunner;

/// Options threaded through image generation
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Directory the output artifact is written to
    pub output_directory: PathBuf,
    /// Directory remote inputs are cached in
    pub tmp_directory: PathBuf,
    /// Replace an already existing output artifact
    pub overwrite: bool,
    /// Collect and emit detailed tool output
    pub verbose: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from(GENERATED_IMAGE_DIR),
            tmp_directory: PathBuf::from(TMP_DIR),
            overwrite: false,
            verbose: false,
        }
    }
}

/// Outcome of generating one image
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    /// Path of the output artifact
    pub path: PathBuf,
    /// The artifact already existed and was left untouched
    pub skipped: bool,
    /// Step-by-step log of the generation
    pub log: Vec<String>,
}

/// Generate one image according to `spec`.
///
/// Without an input the image is created empty at the requested size; with
/// an input the resolved file is converted to the output format and resized,
/// passing shrink consent only when the target is smaller than the input.
pub async fn generate_image<R: CommandRunner>(
    spec: &ImageSpec,
    opts: &GenerateOptions,
    runner: &R,
    downloader: &DownloadManager,
) -> Result<GeneratedImage, BuildError> {
    let mut log = Vec::new();
    let output_path = opts.output_directory.join(spec.output_filename());
    let qemu = QemuImg::new(runner, opts.verbose);

    if output_path.exists() {
        log.push(format!(
            "The output image: {} already exists",
            output_path.display()
        ));
        if !opts.overwrite {
            log.push("Use the --overwrite flag to overwrite the existing image".to_string());
            tracing::info!("Skipping existing image: {}", output_path.display());
            return Ok(GeneratedImage {
                path: output_path,
                skipped: true,
                log,
            });
        }
        log.push(format!(
            "Overwriting the existing image: {}",
            output_path.display()
        ));
    }

    if let Some(input) = &spec.input {
        let resolved = resolve_input(input, &opts.tmp_directory, downloader, &mut log).await?;

        tracing::info!(
            "Converting {} ({}) to {} ({})",
            resolved.path.display(),
            resolved.format,
            output_path.display(),
            spec.output_format
        );
        qemu.convert(
            &resolved.path,
            &output_path,
            &resolved.format,
            &spec.output_format,
        )
        .map_err(|e| BuildError::PathCreate {
            path: resolved.path.clone(),
            reason: e.to_string(),
        })?;

        let input_size = filesystem::file_size(&resolved.path)?;
        let target_size =
            parse_size(&spec.size).map_err(|_| BuildError::InvalidAttributeType {
                value: spec.size.clone(),
                expected: "a byte magnitude such as '10G' or '512MiB'".to_string(),
            })?;

        // Shrinking below the input's current size requires explicit consent
        // from the imaging tool since data past the new boundary is lost.
        let shrink = target_size < input_size;
        if shrink {
            log.push(format!(
                "The requested size {} is smaller than the input image, resizing with shrink enabled",
                spec.size
            ));
        }
        qemu.resize(&output_path, &spec.size, &spec.output_format, shrink)
            .map_err(|e| BuildError::Resize {
                path: output_path.clone(),
                reason: e.to_string(),
            })?;
    } else {
        qemu.create(&output_path, &spec.size, &spec.output_format)
            .map_err(|e| BuildError::PathCreate {
                path: output_path.clone(),
                reason: e.to_string(),
            })?;
        log.push(format!("Generated image at: {}", output_path.display()));
    }

    if opts.verbose {
        if let Ok(details) = qemu.info(&output_path) {
            log.push(details);
        }
    }

    // Raise qcow2 outputs to compat level v3; best-effort only.
    if spec.output_format == DEFAULT_IMAGE_FORMAT {
        if let Err(e) = qemu.amend(&output_path, QCOW2_COMPAT_OPTIONS, &spec.output_format) {
            tracing::warn!("Failed to amend {}: {e}", output_path.display());
            log.push(format!(
                "Failed to amend the format version of: {} - error: {e}",
                output_path.display()
            ));
        }
    }

    if consistency_check_supported(&spec.output_format) {
        qemu.check(&output_path, &spec.output_format)
            .map_err(|e| BuildError::Check {
                path: output_path.clone(),
                reason: e.to_string(),
            })?;
    }

    Ok(GeneratedImage {
        path: output_path,
        skipped: false,
        log,
    })
}
