//! I/O operations for sati.
//!
//! This module turns archive entries into usable documents and writes the
//! merged result:
//! - Opening and decrypting PDF entries in memory
//! - Writing the merged PDF atomically
//!
//! # Examples
//!
//! ```no_run
//! use sati::archive::ArchiveReader;
//! use sati::io::{DecryptResult, PdfDecryptor};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let decryptor = PdfDecryptor::new("secret");
//! for entry in ArchiveReader::open(Path::new("bundle.zip"))?.into_entries() {
//!     let Ok(entry) = entry else { continue };
//!     if let DecryptResult::Decrypted(pdf) = decryptor.decrypt(&entry) {
//!         println!("{}: {} pages", pdf.name, pdf.page_count);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod decrypt;
pub mod writer;

pub use decrypt::{DecodedPdf, DecryptResult, PdfDecryptor, SkipReason};
pub use writer::{PdfWriter, WriteStatistics};
