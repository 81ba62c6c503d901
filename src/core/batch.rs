//! Architecture batch driver
//!
//! Iterates a manifest's image entries in declared order and generates each
//! one sequentially. The whole manifest is validated before the first tool
//! invocation, and the first failing image aborts the batch.

use std::path::{Path, PathBuf};

use crate::core::architecture::load_architecture;
use crate::core::generate::{generate_image, GenerateOptions};
use crate::error::BuildError;
use crate::infra::download::DownloadManager;
use crate::infra::filesystem;
use crate::infra::runner::CommandRunner;

/// Aggregated result of a full batch run
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Human-readable summary naming the output directory
    pub message: String,
    /// Output artifact path of every image in the manifest
    pub outputs: Vec<PathBuf>,
    /// Merged per-image generation logs
    pub log: Vec<String>,
}

/// Build every image described by the architecture file at
/// `architecture_path`.
pub async fn build_architecture<R: CommandRunner>(
    architecture_path: &Path,
    opts: &GenerateOptions,
    runner: &R,
    downloader: &DownloadManager,
) -> Result<BatchOutcome, BuildError> {
    let architecture = load_architecture(architecture_path)?;
    let specs = architecture.validate()?;

    if !opts.output_directory.exists() {
        filesystem::create_dir_all(&opts.output_directory)?;
    }

    let mut outputs = Vec::with_capacity(specs.len());
    let mut log = Vec::new();

    for spec in &specs {
        tracing::info!("Generating image '{}' ({})", spec.name, spec.key);
        let generated = generate_image(spec, opts, runner, downloader).await?;
        log.extend(generated.log);
        outputs.push(generated.path);
    }

    Ok(BatchOutcome {
        message: format!(
            "Successfully built the images in: {}",
            opts.output_directory.display()
        ),
        outputs,
        log,
    })
}
