//! CLI argument parsing for sati.
//!
//! This module defines the command-line interface structure using `clap`.
//! It is also compiled by the build script to render the man page, so it
//! only depends on `clap` and the `sati` library.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

use sati::config::{CompressionLevel, Config, EmptyPolicy};
use sati::error::{Result, SatiError};

/// Decode password-protected PDFs from a ZIP archive and merge them.
///
/// Every PDF in the archive is opened with a single password and the pages
/// of those that open are concatenated, in filename order, into one
/// unencrypted PDF. Entries that cannot be opened are reported and skipped.
#[derive(Parser, Debug)]
#[command(name = "sati")]
#[command(version)]
#[command(about = "Decode password-protected PDFs from a ZIP archive and merge them", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Operation to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available operations.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decrypt every PDF in a ZIP archive and merge them into one document
    ///
    /// Examples:
    ///   sati decode-and-merge --zip statements.zip --password secret --output all.pdf
    ///   SATI_PDF_PASSWORD=secret sati decode-and-merge --zip in.zip --output out.pdf
    DecodeAndMerge(DecodeAndMergeArgs),
}

/// Arguments of `decode-and-merge`.
#[derive(Args, Debug)]
pub struct DecodeAndMergeArgs {
    /// ZIP archive holding the PDFs
    #[arg(long, value_name = "FILE")]
    pub zip: PathBuf,

    /// Password tried against every encrypted PDF (may be empty)
    #[arg(
        long,
        value_name = "PASSWORD",
        env = "SATI_PDF_PASSWORD",
        hide_env_values = true,
        allow_hyphen_values = true
    )]
    pub password: String,

    /// Merged PDF file path
    ///
    /// An existing file at this path is replaced.
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// What to do when no entry can be opened
    ///
    /// - fail: exit with an error and write nothing (default)
    /// - write-empty: write a valid PDF with no pages
    #[arg(long, value_name = "POLICY", default_value = "fail")]
    #[arg(value_parser = ["fail", "write-empty"])]
    pub on_empty: String,

    /// Compression level for output PDF
    ///
    /// - none: No compression
    /// - standard: Compress streams (default)
    /// - maximum: Compress streams and drop unused objects
    #[arg(short, long, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// Dry run - report what would be merged and skipped without writing
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbose output - show statistics and debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    ///
    /// Warnings about skipped entries and errors are still printed.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl DecodeAndMergeArgs {
    /// Convert CLI arguments into a validated Config.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Compression level or empty policy is invalid
    /// - Configuration validation fails
    pub fn to_config(&self) -> Result<Config> {
        let compression = CompressionLevel::from_str(&self.compression)?;
        let empty_policy = EmptyPolicy::from_str(&self.on_empty)?;

        let config = Config {
            zip: self.zip.clone(),
            password: self.password.clone(),
            output: self.output.clone(),
            dry_run: self.dry_run,
            // JSON owns stdout
            verbose: self.verbose && !self.json,
            quiet: self.quiet || self.json,
            compression,
            empty_policy,
        };

        config.validate().map_err(|e| {
            SatiError::invalid_config(format!("Configuration validation failed: {e}"))
        })?;

        Ok(config)
    }
}
