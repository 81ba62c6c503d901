//! Multiple-image command implementation
//!
//! Builds every image described by an architecture file.

use std::path::PathBuf;

use crate::cli::commands::{download_manager, CommandOutcome};
use crate::core::batch::build_architecture;
use crate::core::generate::GenerateOptions;
use crate::error::BuildError;
use crate::infra::runner::SystemRunner;

/// Arguments of the `multiple` command
#[derive(Debug)]
pub struct MultipleOptions {
    pub architecture_path: PathBuf,
    pub output_directory: PathBuf,
    pub tmp_directory: PathBuf,
    pub overwrite: bool,
}

/// Execute the multiple command
pub async fn execute(opts: MultipleOptions, verbose: bool) -> Result<CommandOutcome, BuildError> {
    let generate_opts = GenerateOptions {
        output_directory: opts.output_directory,
        tmp_directory: opts.tmp_directory,
        overwrite: opts.overwrite,
        verbose,
    };

    let runner = SystemRunner::new();
    let downloader = download_manager();
    let outcome = build_architecture(
        &opts.architecture_path,
        &generate_opts,
        &runner,
        &downloader,
    )
    .await?;

    Ok(CommandOutcome {
        msg: outcome.message,
        outputs: outcome.outputs,
        log: outcome.log,
    })
}
