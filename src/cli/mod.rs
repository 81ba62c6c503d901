//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no business logic - that belongs in the [`crate::core`]
//! module.

pub mod commands;
pub mod output;

use clap::Parser;

use commands::Commands;
use output::Response;

/// Vmforge - Declarative virtual machine disk image builder
///
/// Generates versioned VM disk images from an architecture description,
/// driving qemu-img for format conversion, resizing, and consistency checks.
#[derive(Parser, Debug)]
#[command(name = "vmforge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Print verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Execute the CLI command, returning the process exit code.
    pub async fn run(self) -> i32 {
        let Some(command) = self.command else {
            // No subcommand provided, show help
            use clap::CommandFactory;
            let mut cmd = Self::command();
            let _ = cmd.print_help();
            return crate::error::SUCCESS;
        };

        match command.run(self.verbose).await {
            Ok(outcome) => {
                let mut outputs: Vec<String> = outcome
                    .outputs
                    .iter()
                    .map(|path| path.display().to_string())
                    .collect();
                if self.verbose {
                    outputs.extend(outcome.log);
                }
                output::emit(&Response::success(outcome.msg, outputs))
            }
            Err(error) => output::emit(&Response::failed(&error)),
        }
    }
}
