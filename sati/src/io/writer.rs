//! PDF writing and saving operations.
//!
//! This module provides safe PDF writing with:
//! - Pre-flight checks on the output location
//! - Atomic writes (write to a sibling temp file, then rename)
//! - Write statistics
//!
//! # Examples
//!
//! ```no_run
//! use sati::io::writer::PdfWriter;
//! use lopdf::Document;
//! use std::path::Path;
//!
//! # async fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! writer.can_write(Path::new("merged.pdf")).await?;
//! writer.save(doc, Path::new("merged.pdf")).await?;
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;
use tracing::debug;

use crate::error::{Result, SatiError};

const WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// Statistics about a write operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

/// Writes documents atomically through a hidden sibling file.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter;

impl PdfWriter {
    /// Create a new PDF writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Save a PDF document to a file, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created, written, or moved
    /// into place.
    pub async fn save(&self, doc: Document, path: &Path) -> Result<()> {
        self.save_with_stats(doc, path).await.map(|_| ())
    }

    /// Save a PDF and return statistics about the operation.
    ///
    /// Serialisation runs on a blocking task.
    pub async fn save_with_stats(&self, doc: Document, path: &Path) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();

        task::spawn_blocking(move || write_document(doc, path_buf))
            .await
            .map_err(|e| SatiError::other(format!("Write task failed: {e}")))?
    }

    /// Check that a file can be written at the given path.
    ///
    /// Performs pre-flight checks without writing anything.
    ///
    /// # Errors
    ///
    /// Returns [`SatiError::OutputNotWritable`] if:
    /// - The path is an existing directory
    /// - The parent directory doesn't exist or is not a directory
    /// - The parent directory is read-only
    pub async fn can_write(&self, path: &Path) -> Result<()> {
        let not_writable = |reason: String| SatiError::output_not_writable(path.to_path_buf(), reason);

        if tokio::fs::metadata(path)
            .await
            .is_ok_and(|metadata| metadata.is_dir())
        {
            return Err(not_writable("path is a directory".to_string()));
        }

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let metadata = tokio::fs::metadata(parent).await.map_err(|e| {
            not_writable(format!(
                "output directory {} is not accessible: {e}",
                parent.display()
            ))
        })?;

        if !metadata.is_dir() {
            return Err(not_writable(format!(
                "{} is not a directory",
                parent.display()
            )));
        }

        if metadata.permissions().readonly() {
            return Err(not_writable(format!(
                "output directory {} is read-only",
                parent.display()
            )));
        }

        Ok(())
    }
}

/// Serialise the document to disk. Runs on a blocking thread.
fn write_document(mut doc: Document, path: PathBuf) -> Result<WriteStatistics> {
    let start = Instant::now();
    let write_path = temp_path_for(&path);

    let file =
        std::fs::File::create(&write_path).map_err(|source| SatiError::FailedToCreateOutput {
            path: write_path.clone(),
            source,
        })?;

    let mut writer = std::io::BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);

    let written = doc
        .save_to(&mut writer)
        .map_err(|e| std::io::Error::other(e.to_string()))
        .and_then(|()| writer.flush());

    if let Err(source) = written {
        let _ = std::fs::remove_file(&write_path);
        return Err(SatiError::FailedToWrite {
            path: write_path,
            source,
        });
    }
    drop(writer);

    std::fs::rename(&write_path, &path).map_err(|source| {
        let _ = std::fs::remove_file(&write_path);
        SatiError::FailedToWrite {
            path: path.clone(),
            source,
        }
    })?;

    let file_size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    debug!(output = %path.display(), bytes = file_size, "wrote merged document");

    Ok(WriteStatistics {
        write_time: start.elapsed(),
        file_size,
        output_path: path,
    })
}

/// Hidden sibling of `path` used as the atomic write target.
fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.pdf".to_string());
    path.with_file_name(format!(".{file_name}.{}.tmp", std::process::id()))
}
