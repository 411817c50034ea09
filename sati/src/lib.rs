//! sati - Decode password-protected PDFs from a ZIP archive and merge them.
//!
//! This library reads every PDF stored in a ZIP archive, opens each one with
//! a single password, and concatenates the pages of the documents that open
//! into one unencrypted PDF. It supports:
//!
//! - In-memory ZIP reading in filename order
//! - Decryption of password-protected PDFs
//! - Page-order preserving merges
//! - Per-entry skipping with a run report
//! - Atomic output writes
//!
//! # Examples
//!
//! ## Basic Run
//!
//! ```no_run
//! use sati::config::{CompressionLevel, Config, EmptyPolicy};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = Config::new("statements.zip", "secret", "merged.pdf");
//! config.compression = CompressionLevel::Maximum;
//! config.empty_policy = EmptyPolicy::WriteEmpty;
//!
//! let report = sati::decode_and_merge(&config).await?;
//! for skipped in &report.skipped {
//!     eprintln!("skipped {}: {}", skipped.name, skipped.reason);
//! }
//! println!("Created {} page document", report.total_pages);
//! # Ok(())
//! # }
//! ```
//!
//! ## Using Individual Components
//!
//! ```no_run
//! use sati::archive::ArchiveReader;
//! use sati::io::{DecryptResult, PdfDecryptor, PdfWriter};
//! use sati::merge::Merger;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let decryptor = PdfDecryptor::new("secret");
//! let mut pdfs = Vec::new();
//! for entry in ArchiveReader::open(Path::new("statements.zip"))?.into_entries() {
//!     if let Ok(entry) = entry {
//!         if let DecryptResult::Decrypted(pdf) = decryptor.decrypt(&entry) {
//!             pdfs.push(pdf);
//!         }
//!     }
//! }
//!
//! let merged = Merger::new().merge(pdfs)?;
//! PdfWriter::new().save(merged.document, Path::new("merged.pdf")).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod archive;
pub mod config;
pub mod error;
pub mod io;
pub mod merge;
pub mod output;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, SatiError};
pub use pipeline::{RunReport, decode_and_merge};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
