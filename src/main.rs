//! Vmforge CLI - Declarative virtual machine disk image builder
//!
//! Entry point for the vmforge command-line application.

use clap::Parser;

use vmforge::cli::Cli;

#[tokio::main]
async fn main() {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let exit_code = cli.run().await;
    std::process::exit(exit_code);
}
