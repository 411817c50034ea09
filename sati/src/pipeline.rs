//! The decode-and-merge run.
//!
//! A run opens the archive, tries the password on every PDF entry in
//! filename order, and concatenates the pages of every entry that opens
//! into a single output document. Entries that cannot be opened are
//! reported and left out; only problems with the archive itself or the
//! output location end the run.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;
use tracing::{debug, info};

use crate::archive::ArchiveReader;
use crate::config::{Config, EmptyPolicy};
use crate::error::{Result, SatiError};
use crate::io::{DecodedPdf, DecryptResult, PdfDecryptor, PdfWriter, SkipReason};
use crate::merge::Merger;

/// An entry whose pages went into the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedEntry {
    /// Archive entry name.
    pub name: String,

    /// Pages contributed by the entry.
    pub page_count: usize,

    /// Whether the entry had to be decrypted.
    pub was_encrypted: bool,
}

/// An entry that contributed no pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    /// Archive entry name.
    pub name: String,

    /// Why the entry was left out.
    pub reason: SkipReason,
}

/// Time spent in each phase of a run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunTimings {
    /// Reading and decrypting entries.
    pub decode: Duration,

    /// Concatenating pages.
    pub merge: Duration,

    /// Writing the output file.
    pub write: Duration,

    /// Whole run.
    pub total: Duration,
}

/// Summary of one decode-and-merge run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Archive that was read.
    pub archive: PathBuf,

    /// Output path, written or not.
    pub output: PathBuf,

    /// Number of PDF entries found in the archive.
    pub entries_seen: usize,

    /// Number of non-PDF entries that were ignored.
    pub entries_ignored: usize,

    /// Entries merged, in output order.
    pub merged: Vec<MergedEntry>,

    /// Entries left out, in archive order.
    pub skipped: Vec<SkippedEntry>,

    /// Pages in the output document.
    pub total_pages: usize,

    /// Whether the output file was written. False for dry runs.
    pub written: bool,

    /// Size of the written file in bytes.
    pub output_size: Option<u64>,

    /// Phase timings.
    pub timings: RunTimings,
}

impl RunReport {
    /// Returns true if some entries were left out.
    pub fn is_partial(&self) -> bool {
        !self.skipped.is_empty()
    }

    /// Render the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| SatiError::other(format!("Failed to serialise run report: {err}")))
    }
}

/// What the entry loop produced.
struct Decoded {
    pdfs: Vec<DecodedPdf>,
    skipped: Vec<SkippedEntry>,
    seen: usize,
    ignored: usize,
}

/// Run decode-and-merge as described by `config`.
///
/// The output location is checked before the archive is touched, so an
/// unwritable output fails without reading anything. Entries that cannot
/// be opened with the password are skipped; the run still succeeds as long
/// as the output is written.
///
/// # Errors
///
/// Returns an error if:
/// - The configuration is invalid
/// - The output location is not writable
/// - The archive is missing, unreadable, or not a ZIP
/// - No entry contributes pages and the policy is [`EmptyPolicy::Fail`]
/// - Merging or writing the output fails
///
/// # Examples
///
/// ```no_run
/// use sati::{Config, decode_and_merge};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::new("statements.zip", "secret", "merged.pdf");
/// let report = decode_and_merge(&config).await?;
/// println!("{} pages, {} entries skipped", report.total_pages, report.skipped.len());
/// # Ok(())
/// # }
/// ```
pub async fn decode_and_merge(config: &Config) -> Result<RunReport> {
    let start = Instant::now();
    config
        .validate()
        .map_err(|err| SatiError::invalid_config(format!("{err:#}")))?;

    let writer = PdfWriter::new();
    writer.can_write(&config.output).await?;

    let decode_start = Instant::now();
    let zip = config.zip.clone();
    let decryptor = PdfDecryptor::new(config.password.clone());
    let decoded = task::spawn_blocking(move || decode_entries(&zip, &decryptor))
        .await
        .map_err(|e| SatiError::other(format!("Decode task failed: {e}")))??;
    let decode_time = decode_start.elapsed();

    let Decoded {
        pdfs,
        skipped,
        seen,
        ignored,
    } = decoded;

    if pdfs.is_empty() && config.empty_policy == EmptyPolicy::Fail {
        return Err(SatiError::NothingToMerge {
            archive: config.zip.clone(),
            seen,
            skipped: skipped.len(),
        });
    }

    let merged: Vec<MergedEntry> = pdfs
        .iter()
        .map(|pdf| MergedEntry {
            name: pdf.name.clone(),
            page_count: pdf.page_count,
            was_encrypted: pdf.was_encrypted,
        })
        .collect();

    let mut report = RunReport {
        archive: config.zip.clone(),
        output: config.output.clone(),
        entries_seen: seen,
        entries_ignored: ignored,
        total_pages: merged.iter().map(|entry| entry.page_count).sum(),
        merged,
        skipped,
        written: false,
        output_size: None,
        timings: RunTimings {
            decode: decode_time,
            ..RunTimings::default()
        },
    };

    if config.dry_run {
        info!(
            pages = report.total_pages,
            skipped = report.skipped.len(),
            "dry run, output not written"
        );
        report.timings.total = start.elapsed();
        return Ok(report);
    }

    let merger = Merger::with_compression(config.compression);
    let result = task::spawn_blocking(move || merger.merge(pdfs))
        .await
        .map_err(|e| SatiError::other(format!("Merge task failed: {e}")))??;
    report.timings.merge = result.statistics.merge_time;
    report.total_pages = result.statistics.total_pages;

    let write_stats = writer
        .save_with_stats(result.document, &config.output)
        .await?;
    report.timings.write = write_stats.write_time;
    report.output_size = Some(write_stats.file_size);
    report.written = true;
    report.timings.total = start.elapsed();

    info!(
        output = %config.output.display(),
        pages = report.total_pages,
        merged = report.merged.len(),
        skipped = report.skipped.len(),
        "wrote merged document"
    );

    Ok(report)
}

/// Read every PDF entry in order and try to open it.
///
/// Runs on a blocking thread; archive reads and PDF parsing are synchronous.
fn decode_entries(zip: &Path, decryptor: &PdfDecryptor) -> Result<Decoded> {
    let reader = ArchiveReader::open(zip)?;
    let seen = reader.pdf_entries().len();
    let ignored = reader.ignored_count();

    let mut pdfs = Vec::with_capacity(seen);
    let mut skipped = Vec::new();

    for entry in reader.into_entries() {
        let (name, outcome) = match entry {
            Ok(entry) => {
                let outcome = decryptor.decrypt(&entry);
                (entry.name, outcome)
            }
            Err(unreadable) => (
                unreadable.name,
                DecryptResult::Skipped(SkipReason::Unreadable(unreadable.reason)),
            ),
        };

        match outcome {
            DecryptResult::Decrypted(pdf) => {
                debug!(entry = %name, pages = pdf.page_count, "entry opened");
                pdfs.push(pdf);
            }
            DecryptResult::Skipped(reason) => {
                info!(entry = %name, %reason, "skipping entry");
                skipped.push(SkippedEntry { name, reason });
            }
        }
    }

    Ok(Decoded {
        pdfs,
        skipped,
        seen,
        ignored,
    })
}
