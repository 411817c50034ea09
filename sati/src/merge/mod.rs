//! PDF merging operations.
//!
//! Decoded documents are concatenated page by page into one document, in
//! the order they are handed over.
//!
//! # Examples
//!
//! ```no_run
//! use sati::io::DecodedPdf;
//! use sati::merge::Merger;
//!
//! # fn example(pdfs: Vec<DecodedPdf>) -> Result<(), Box<dyn std::error::Error>> {
//! let merged = Merger::new().merge(pdfs)?;
//! println!("Merged {} pages", merged.statistics.total_pages);
//! # Ok(())
//! # }
//! ```

pub mod merger;

pub use merger::{MergeStatistics, MergedDocument, Merger};
