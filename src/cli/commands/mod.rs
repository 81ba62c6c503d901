//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod multiple;
pub mod single;

use std::path::PathBuf;

use clap::Subcommand;

use crate::cli::output;
use crate::config::defaults::{DEFAULT_BUFFER_SIZE, DEFAULT_IMAGE_FORMAT, GENERATED_IMAGE_DIR, TMP_DIR};
use crate::error::BuildError;
use crate::infra::download::DownloadManager;

/// Result of a successfully executed command
#[derive(Debug)]
pub struct CommandOutcome {
    /// Summary message for the response object
    pub msg: String,
    /// Paths of the output artifacts
    pub outputs: Vec<PathBuf>,
    /// Verbose log lines collected during execution
    pub log: Vec<String>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a single virtual machine image
    Single {
        /// Name of the image that will be generated
        name: String,

        /// Size of the image that will be generated, e.g. "10G"
        size: String,

        /// Path or URL to the input image the generated image is based on
        #[arg(short, long)]
        input: Option<String>,

        /// Format of the input image; inferred from the file extension if
        /// not provided
        #[arg(long)]
        input_format: Option<String>,

        /// Checksum algorithm used to validate the input image
        #[arg(long)]
        input_checksum_type: Option<String>,

        /// Expected checksum of the input image
        #[arg(long)]
        input_checksum: Option<String>,

        /// Buffer size used to read the input image while computing its
        /// checksum
        #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE)]
        input_checksum_buffer_size: usize,

        /// Number of bytes of the input image the expected checksum covers
        #[arg(long)]
        input_checksum_read_bytes: Option<u64>,

        /// Directory where the image will be saved
        #[arg(short, long, default_value = GENERATED_IMAGE_DIR, env = "VMFORGE_OUTPUT_DIR")]
        output_directory: PathBuf,

        /// Directory where remote inputs are cached
        #[arg(long, default_value = TMP_DIR, env = "VMFORGE_TMP_DIR")]
        tmp_directory: PathBuf,

        /// Format of the output image
        #[arg(short = 'f', long, default_value = DEFAULT_IMAGE_FORMAT)]
        output_format: String,

        /// Version of the image that is generated; forms part of the output
        /// filename
        #[arg(long = "version", value_name = "VERSION")]
        image_version: Option<String>,
    },

    /// Build multiple images from an architecture file
    Multiple {
        /// Path to the architecture file that defines the images to build
        architecture_path: PathBuf,

        /// Directory where the images will be saved
        #[arg(short, long, default_value = GENERATED_IMAGE_DIR, env = "VMFORGE_OUTPUT_DIR")]
        output_directory: PathBuf,

        /// Directory where remote inputs are cached
        #[arg(long, default_value = TMP_DIR, env = "VMFORGE_TMP_DIR")]
        tmp_directory: PathBuf,

        /// Overwrite existing image disks
        #[arg(long)]
        overwrite: bool,
    },
}

impl Commands {
    /// Execute the command
    pub async fn run(self, verbose: bool) -> Result<CommandOutcome, BuildError> {
        match self {
            Self::Single {
                name,
                size,
                input,
                input_format,
                input_checksum_type,
                input_checksum,
                input_checksum_buffer_size,
                input_checksum_read_bytes,
                output_directory,
                tmp_directory,
                output_format,
                image_version,
            } => {
                single::execute(
                    single::SingleOptions {
                        name,
                        size,
                        input,
                        input_format,
                        input_checksum_type,
                        input_checksum,
                        input_checksum_buffer_size,
                        input_checksum_read_bytes,
                        output_directory,
                        tmp_directory,
                        output_format,
                        image_version,
                    },
                    verbose,
                )
                .await
            }
            Self::Multiple {
                architecture_path,
                output_directory,
                tmp_directory,
                overwrite,
            } => {
                multiple::execute(
                    multiple::MultipleOptions {
                        architecture_path,
                        output_directory,
                        tmp_directory,
                        overwrite,
                    },
                    verbose,
                )
                .await
            }
        }
    }
}

/// Download manager wired to a terminal progress bar
pub(crate) fn download_manager() -> DownloadManager {
    let bar = output::create_download_bar();
    DownloadManager::new().with_progress(Box::new(move |downloaded, total| {
        if total > 0 && bar.length() != Some(total) {
            bar.set_length(total);
        }
        bar.set_position(downloaded);
    }))
}
