//! sati - Decode password-protected PDFs from a ZIP archive and merge them.
//!
//! Command-line front end for the `sati` library.

mod cli;

use clap::Parser;
use std::io;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, DecodeAndMergeArgs};
use sati::error::SatiError;
use sati::output::{OutputFormatter, display_run_report};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();
    let Command::DecodeAndMerge(args) = cli.command;

    init_tracing(&args);

    // Run the application and handle errors
    if let Err(err) = run(args).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Default log filter when `RUST_LOG` is not set.
fn log_filter(args: &DecodeAndMergeArgs) -> &'static str {
    if args.verbose {
        "sati=debug,warn"
    } else if args.quiet || args.json {
        "error"
    } else {
        "warn"
    }
}

/// Install the stderr tracing subscriber. `RUST_LOG` wins over the flags.
fn init_tracing(args: &DecodeAndMergeArgs) {
    let filter = log_filter(args);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();
}

/// Main application logic.
async fn run(args: DecodeAndMergeArgs) -> Result<(), SatiError> {
    let config = args.to_config()?;
    let formatter = OutputFormatter::from_config(&config);

    if formatter.should_print() {
        formatter.section(&format!("{} v{}", sati::NAME, sati::VERSION));
        formatter.blank_line();
    }

    formatter.info(&format!("Reading {}...", config.zip.display()));
    formatter.debug(&format!("Compression: {:?}", config.compression));
    formatter.debug(&format!("On empty: {}", config.empty_policy));

    let report = sati::decode_and_merge(&config).await?;

    display_run_report(&formatter, &report);

    if args.json {
        println!("{}", report.to_json()?);
    }

    Ok(())
}
