//! Configuration module for sati.
//!
//! This module holds the validated configuration that drives a
//! decode-and-merge run. It is built from CLI arguments by the binary and
//! passed explicitly to the pipeline; nothing here reads the process
//! environment.

use anyhow::{Result, bail};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::SatiError;

/// Compression level for the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// No compression - streams are written as they were decoded.
    None,
    /// Compress uncompressed streams.
    #[default]
    Standard,
    /// Compress and drop unreferenced objects.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = SatiError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(SatiError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// What to do when no archive entry contributes any page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyPolicy {
    /// Abort the run with [`SatiError::NothingToMerge`]; no output is written.
    #[default]
    Fail,
    /// Write a valid PDF that has no pages.
    WriteEmpty,
}

impl FromStr for EmptyPolicy {
    type Err = SatiError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "write-empty" | "empty" => Ok(Self::WriteEmpty),
            _ => Err(SatiError::invalid_config(format!(
                "Invalid empty policy: {s}. Must be one of: fail, write-empty"
            ))),
        }
    }
}

impl fmt::Display for EmptyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fail => f.write_str("fail"),
            Self::WriteEmpty => f.write_str("write-empty"),
        }
    }
}

/// Complete configuration for a decode-and-merge run.
#[derive(Clone)]
pub struct Config {
    /// ZIP archive holding the PDFs.
    pub zip: PathBuf,

    /// Password tried against every encrypted PDF. May be empty.
    pub password: String,

    /// Merged PDF file path.
    pub output: PathBuf,

    /// Dry run mode - decrypt and plan without creating output.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// Compression level for output.
    pub compression: CompressionLevel,

    /// Behaviour when nothing can be merged.
    pub empty_policy: EmptyPolicy,
}

impl Config {
    /// Create a configuration with default options for the three required inputs.
    pub fn new(
        zip: impl Into<PathBuf>,
        password: impl Into<String>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            zip: zip.into(),
            password: password.into(),
            output: output.into(),
            dry_run: false,
            verbose: false,
            quiet: false,
            compression: CompressionLevel::default(),
            empty_policy: EmptyPolicy::default(),
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Verbose and quiet modes are both enabled
    /// - The archive or output path is empty
    /// - The output path is the archive itself
    pub fn validate(&self) -> Result<()> {
        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        if self.zip.as_os_str().is_empty() {
            bail!("Archive path must not be empty");
        }

        if self.output.as_os_str().is_empty() {
            bail!("Output path must not be empty");
        }

        if self.output == self.zip {
            bail!(
                "Output file cannot be the same as the input archive: {}",
                self.output.display()
            );
        }

        Ok(())
    }

    /// Check if progress output should be displayed.
    ///
    /// Returns false if in quiet mode and not doing a dry run.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("zip", &self.zip)
            .field("password", &"<redacted>")
            .field("output", &self.output)
            .field("dry_run", &self.dry_run)
            .field("verbose", &self.verbose)
            .field("quiet", &self.quiet)
            .field("compression", &self.compression)
            .field("empty_policy", &self.empty_policy)
            .finish()
    }
}
