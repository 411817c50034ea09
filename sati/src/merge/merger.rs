//! Core PDF merging implementation.
//!
//! Documents are concatenated into a fresh base document in the order they
//! are given. Each input is renumbered past the objects already merged, its
//! catalog and page tree are dropped, its objects are moved over, and its
//! pages are appended directly under the base page tree root.

use lopdf::{Document, Object, ObjectId, dictionary};
use serde::Serialize;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::CompressionLevel;
use crate::error::{Result, SatiError};
use crate::io::DecodedPdf;

const DEFAULT_PDF_VERSION: &str = "1.5";

/// Page attributes a page may take from its ancestors in the page tree.
const INHERITABLE_ATTRIBUTES: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Statistics about a merge operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeStatistics {
    /// Number of documents merged.
    pub files_merged: usize,

    /// Total number of pages in merged document.
    pub total_pages: usize,

    /// Total time taken for merge.
    pub merge_time: Duration,

    /// Compression applied to the result.
    pub compression: CompressionLevel,
}

/// Result of a merge operation.
pub struct MergedDocument {
    /// The merged PDF document.
    pub document: Document,

    /// Statistics about the merge.
    pub statistics: MergeStatistics,
}

/// PDF merger that concatenates decoded documents.
#[derive(Debug, Clone, Default)]
pub struct Merger {
    compression: CompressionLevel,
}

impl Merger {
    /// Create a new merger with standard compression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a merger that applies the given compression level.
    pub fn with_compression(compression: CompressionLevel) -> Self {
        Self { compression }
    }

    /// Merge documents in the order given.
    ///
    /// An empty input produces a valid document with zero pages; callers
    /// decide whether that is acceptable.
    ///
    /// # Errors
    ///
    /// Returns an error if the base page tree cannot be located or patched.
    pub fn merge(&self, pdfs: Vec<DecodedPdf>) -> Result<MergedDocument> {
        let start = Instant::now();

        let version = pdfs
            .iter()
            .map(|pdf| pdf.document.version.as_str())
            .max()
            .unwrap_or(DEFAULT_PDF_VERSION)
            .to_string();

        let mut merged = Self::empty_document(&version);
        let mut max_id = merged.max_id;
        let files_merged = pdfs.len();
        let mut expected_pages = 0;

        for pdf in pdfs {
            let DecodedPdf { name, mut document, .. } = pdf;

            // Avoid object id collisions by renumbering the incoming document
            document.renumber_objects_with(max_id + 1);
            max_id = max_id.max(document.max_id);

            let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();
            let page_count = page_ids.len();
            Self::detach_pages(&mut document, &page_ids);

            merged.objects.extend(document.objects);
            merged.max_id = max_id;

            Self::append_pages_to_page_tree(&mut merged, &page_ids)?;

            debug!(entry = %name, pages = page_count, first_page = expected_pages + 1, "appended document");
            expected_pages += page_count;
        }

        match self.compression {
            CompressionLevel::None => {}
            CompressionLevel::Standard => {
                merged.compress();
            }
            CompressionLevel::Maximum => {
                merged.prune_objects();
                merged.compress();
            }
        }

        // Always renumber for consistency
        merged.renumber_objects();

        let total_pages = merged.get_pages().len();
        if total_pages != expected_pages {
            return Err(SatiError::merge_failed(format!(
                "page tree holds {total_pages} pages, expected {expected_pages}"
            )));
        }

        Ok(MergedDocument {
            document: merged,
            statistics: MergeStatistics {
                files_merged,
                total_pages,
                merge_time: start.elapsed(),
                compression: self.compression,
            },
        })
    }

    /// A document holding a catalog and an empty page tree.
    fn empty_document(version: &str) -> Document {
        let mut doc = Document::with_version(version);

        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        doc
    }

    /// Make every page self-contained, then drop the catalog and page tree nodes.
    ///
    /// Inherited attributes are copied onto the pages first, since the nodes
    /// that carried them do not survive into the merged document.
    fn detach_pages(document: &mut Document, page_ids: &[ObjectId]) {
        for &page_id in page_ids {
            let inherited = inherited_attributes(document, page_id);
            if let Ok(page) = document.get_object_mut(page_id).and_then(Object::as_dict_mut) {
                for (key, value) in inherited {
                    page.set(key, value);
                }
            }
        }

        let mut dropped: Vec<ObjectId> = document
            .objects
            .iter()
            .filter(|(_, object)| {
                object
                    .as_dict()
                    .is_ok_and(|dict| dict.has_type(b"Pages"))
            })
            .map(|(&id, _)| id)
            .collect();
        if let Ok(catalog_id) = document.trailer.get(b"Root").and_then(Object::as_reference) {
            dropped.push(catalog_id);
        }

        for id in dropped {
            document.objects.remove(&id);
        }
    }

    /// Appends the given pages under the merged document's root Pages dictionary.
    fn append_pages_to_page_tree(merged: &mut Document, page_ids: &[ObjectId]) -> Result<()> {
        let pages_id = merged
            .catalog()
            .and_then(|catalog| catalog.get(b"Pages"))
            .and_then(Object::as_reference)
            .map_err(|e| SatiError::merge_failed(format!("Failed to get pages reference: {e}")))?;

        let pages_dict = merged
            .get_object_mut(pages_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| SatiError::merge_failed(format!("Failed to get pages object: {e}")))?;

        let kids = pages_dict
            .get_mut(b"Kids")
            .and_then(Object::as_array_mut)
            .map_err(|_| SatiError::merge_failed("Pages dictionary missing Kids array"))?;

        kids.extend(page_ids.iter().map(|&id| Object::Reference(id)));

        let current_count = pages_dict.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
        pages_dict.set("Count", Object::Integer(current_count + page_ids.len() as i64));

        for &page_id in page_ids {
            let page = merged
                .get_object_mut(page_id)
                .and_then(Object::as_dict_mut)
                .map_err(|e| SatiError::merge_failed(format!("Failed to get page object: {e}")))?;
            page.set("Parent", pages_id);
        }

        Ok(())
    }
}

/// Inheritable attributes a page lacks but one of its ancestors defines.
///
/// The nearest ancestor wins.
fn inherited_attributes(document: &Document, page_id: ObjectId) -> Vec<(Vec<u8>, Object)> {
    let mut found = Vec::new();
    let Ok(page) = document.get_dictionary(page_id) else {
        return found;
    };

    let mut missing: Vec<&[u8]> = INHERITABLE_ATTRIBUTES
        .into_iter()
        .filter(|key| !page.has(key))
        .collect();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut seen = HashSet::new();

    while let Some(node_id) = parent {
        if missing.is_empty() || !seen.insert(node_id) {
            break;
        }
        let Ok(node) = document.get_dictionary(node_id) else {
            break;
        };

        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                found.push((key.to_vec(), value.clone()));
                false
            }
            Err(_) => true,
        });
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    found
}
