//! ZIP archive reading.
//!
//! The archive is opened once, its central directory is scanned for PDF
//! entries, and the entries are handed out in ascending filename order.
//! Entry bytes are only read when the iterator reaches them.
//!
//! # Examples
//!
//! ```no_run
//! use sati::archive::ArchiveReader;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = ArchiveReader::open(Path::new("statements.zip"))?;
//! for entry in reader.into_entries() {
//!     match entry {
//!         Ok(entry) => println!("{} ({} bytes)", entry.name, entry.bytes.len()),
//!         Err(unreadable) => eprintln!("{}: {}", unreadable.name, unreadable.reason),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

use crate::error::{Result, SatiError};

/// One PDF file read out of the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Name as stored in the archive, including any directory prefix.
    pub name: String,

    /// Position of the entry in the archive's central directory.
    pub index: usize,

    /// Uncompressed contents.
    pub bytes: Vec<u8>,
}

/// Central-directory information about a PDF entry, before it is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryInfo {
    /// Position of the entry in the archive's central directory.
    pub index: usize,

    /// Name as stored in the archive.
    pub name: String,

    /// Declared uncompressed size in bytes.
    pub size: u64,
}

/// A PDF entry whose bytes could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadableEntry {
    /// Name as stored in the archive.
    pub name: String,

    /// Reason reported by the ZIP reader.
    pub reason: String,
}

/// Outcome of pulling one entry out of the archive.
pub type EntryRead = std::result::Result<ArchiveEntry, UnreadableEntry>;

/// An opened ZIP archive with its PDF entries listed and sorted.
pub struct ArchiveReader {
    path: PathBuf,
    archive: ZipArchive<BufReader<File>>,
    listing: Vec<EntryInfo>,
    ignored: usize,
}

impl ArchiveReader {
    /// Open a ZIP archive and list its PDF entries.
    ///
    /// Entries are sorted by name (byte-wise, case-sensitive). The sort is
    /// stable, so entries sharing a name keep their central-directory order.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path does not exist or is not a regular file
    /// - The file cannot be opened
    /// - The file is not a valid ZIP archive
    pub fn open(path: &Path) -> Result<Self> {
        check_path_exists(path)?;

        let file = File::open(path).map_err(|source| SatiError::ArchiveNotAccessible {
            path: path.to_path_buf(),
            source,
        })?;

        let mut archive = ZipArchive::new(BufReader::new(file))
            .map_err(|err| SatiError::invalid_archive(path.to_path_buf(), err.to_string()))?;

        let mut listing = Vec::new();
        let mut ignored = 0;

        for index in 0..archive.len() {
            // Raw access reads the header only; encrypted or oddly compressed
            // entries still list fine and fail later, per entry.
            let file = archive
                .by_index_raw(index)
                .map_err(|err| SatiError::invalid_archive(path.to_path_buf(), err.to_string()))?;

            if file.is_dir() {
                continue;
            }

            let name = file.name().to_owned();
            if is_pdf_name(&name) {
                listing.push(EntryInfo {
                    index,
                    name,
                    size: file.size(),
                });
            } else {
                debug!(entry = %name, "ignoring non-PDF archive entry");
                ignored += 1;
            }
        }

        listing.sort_by(|a, b| a.name.cmp(&b.name));

        debug!(
            archive = %path.display(),
            pdf_entries = listing.len(),
            ignored,
            "listed archive"
        );

        Ok(Self {
            path: path.to_path_buf(),
            archive,
            listing,
            ignored,
        })
    }

    /// Path the archive was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// PDF entries in the order they will be read.
    pub fn pdf_entries(&self) -> &[EntryInfo] {
        &self.listing
    }

    /// Number of non-directory entries that are not PDFs.
    pub fn ignored_count(&self) -> usize {
        self.ignored
    }

    /// Consume the reader and read the PDF entries one at a time, in order.
    pub fn into_entries(self) -> ArchiveEntries {
        ArchiveEntries {
            archive: self.archive,
            pending: self.listing.into_iter(),
        }
    }
}

/// Lazy, single-pass iterator over the sorted PDF entries of an archive.
pub struct ArchiveEntries {
    archive: ZipArchive<BufReader<File>>,
    pending: std::vec::IntoIter<EntryInfo>,
}

impl ArchiveEntries {
    fn read_entry(&mut self, info: EntryInfo) -> EntryRead {
        let unreadable = |reason: String| UnreadableEntry {
            name: info.name.clone(),
            reason,
        };

        let mut file = self
            .archive
            .by_index(info.index)
            .map_err(|err| unreadable(err.to_string()))?;

        // Declared sizes come from the archive and are only a hint.
        let capacity = usize::try_from(info.size).unwrap_or(0).min(64 * 1024 * 1024);
        let mut bytes = Vec::with_capacity(capacity);
        file.read_to_end(&mut bytes)
            .map_err(|err| unreadable(err.to_string()))?;

        Ok(ArchiveEntry {
            name: info.name,
            index: info.index,
            bytes,
        })
    }
}

impl Iterator for ArchiveEntries {
    type Item = EntryRead;

    fn next(&mut self) -> Option<Self::Item> {
        let info = self.pending.next()?;
        Some(self.read_entry(info))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.pending.size_hint()
    }
}

impl ExactSizeIterator for ArchiveEntries {}

/// Check whether an archive entry name denotes a PDF.
///
/// The extension match is case-insensitive. macOS resource forks
/// (`__MACOSX/…` and `._name` files) are never PDFs even if named so.
pub fn is_pdf_name(name: &str) -> bool {
    if name.ends_with('/') || name.starts_with("__MACOSX/") {
        return false;
    }

    let base = name.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(name);
    if base.starts_with("._") {
        return false;
    }

    Path::new(base)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Check that the archive path exists and is a regular file.
fn check_path_exists(path: &Path) -> Result<()> {
    let exists = path
        .try_exists()
        .map_err(|source| SatiError::ArchiveNotAccessible {
            path: path.to_path_buf(),
            source,
        })?;
    if !exists {
        return Err(SatiError::archive_not_found(path.to_path_buf()));
    }

    if !path.is_file() {
        return Err(SatiError::not_a_file(path.to_path_buf()));
    }

    Ok(())
}
