//! Opening archive entries as PDF documents.
//!
//! Every entry goes through [`PdfDecryptor::decrypt`], which never fails:
//! problems with a single entry are reported as [`DecryptResult::Skipped`]
//! so the run can carry on with the next one.

use lopdf::encryption::DecryptionError;
use lopdf::xref::XrefEntry;
use lopdf::{Document, Object, ObjectId, Reader};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use tracing::debug;

use crate::archive::ArchiveEntry;

/// A PDF that opened successfully and can contribute pages.
#[derive(Debug, Clone)]
pub struct DecodedPdf {
    /// Archive entry the document came from.
    pub name: String,

    /// The document, decrypted in memory when it was encrypted.
    pub document: Document,

    /// Number of pages in the document.
    pub page_count: usize,

    /// Whether the entry was password protected.
    pub was_encrypted: bool,
}

/// Why an entry contributes no pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "kebab-case")]
pub enum SkipReason {
    /// The supplied password does not open the document.
    WrongPassword,

    /// The document uses an encryption scheme that cannot be decrypted.
    UnsupportedEncryption(String),

    /// The entry could not be read or is not a valid PDF.
    Unreadable(String),

    /// The document parsed but has no pages.
    NoPages,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongPassword => f.write_str("password does not open this PDF"),
            Self::UnsupportedEncryption(detail) => {
                write!(f, "cannot decrypt this PDF: {detail}")
            }
            Self::Unreadable(detail) => write!(f, "not a readable PDF: {detail}"),
            Self::NoPages => f.write_str("PDF has no pages"),
        }
    }
}

/// Outcome of opening one archive entry.
#[derive(Debug, Clone)]
#[expect(clippy::large_enum_variant)]
pub enum DecryptResult {
    /// The entry opened; its pages go into the merge.
    Decrypted(DecodedPdf),
    /// The entry is left out of the merge.
    Skipped(SkipReason),
}

impl DecryptResult {
    /// Returns true if the entry opened.
    pub fn is_decrypted(&self) -> bool {
        matches!(self, Self::Decrypted(_))
    }
}

/// Opens archive entries with a single password.
#[derive(Clone)]
pub struct PdfDecryptor {
    password: String,
}

impl PdfDecryptor {
    /// Create a decryptor that tries `password` on encrypted documents.
    ///
    /// An empty password is valid; it opens documents protected only by an
    /// owner password.
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
        }
    }

    /// Open an entry as a PDF, decrypting it if needed.
    ///
    /// Unencrypted documents, and encrypted ones whose user password is
    /// empty, open without consulting the password.
    pub fn decrypt(&self, entry: &ArchiveEntry) -> DecryptResult {
        let document = match Document::load_mem(&entry.bytes) {
            Ok(doc) => doc,
            Err(err) => {
                let message = err.to_string();
                debug!(entry = %entry.name, error = %message, "failed to parse entry");
                return DecryptResult::Skipped(SkipReason::Unreadable(message));
            }
        };

        let was_encrypted = document.is_encrypted();
        let document = if !was_encrypted {
            document
        } else if document.encryption_state.is_some() {
            // lopdf already opened it with the empty user password
            debug!(entry = %entry.name, "entry opens without a password");
            strip_encryption(document)
        } else {
            match self.unlock(&entry.bytes, document) {
                Ok(doc) => {
                    debug!(entry = %entry.name, "decrypted entry");
                    doc
                }
                Err(reason) => {
                    debug!(entry = %entry.name, %reason, "failed to decrypt entry");
                    return DecryptResult::Skipped(reason);
                }
            }
        };

        let page_count = document.get_pages().len();
        if page_count == 0 {
            return DecryptResult::Skipped(SkipReason::NoPages);
        }

        DecryptResult::Decrypted(DecodedPdf {
            name: entry.name.clone(),
            document,
            page_count,
            was_encrypted,
        })
    }

    /// Check the password, then read and decrypt every object.
    ///
    /// `Document::decrypt` removes the encryption dictionary, so the result
    /// is written in the clear.
    fn unlock(&self, bytes: &[u8], document: Document) -> Result<Document, SkipReason> {
        document
            .authenticate_password(&self.password)
            .map_err(classify_decrypt_error)?;

        let mut document = read_encrypted_objects(bytes, document);
        document
            .decrypt(&self.password)
            .map_err(classify_decrypt_error)?;
        document.encryption_state = None;

        Ok(document)
    }
}

impl fmt::Debug for PdfDecryptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfDecryptor")
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Parse the objects of an encrypted file without decrypting them.
///
/// When the empty password does not open a file, loading keeps only its
/// `/Encrypt` dictionary. The other objects are read again here through the
/// cross-reference table of the loaded document, still encrypted.
fn read_encrypted_objects(bytes: &[u8], document: Document) -> Document {
    // Xref offsets count from the header, as in `Reader::read`
    let start = bytes
        .windows(5)
        .position(|window| window == b"%PDF-")
        .unwrap_or(0);

    let ids: Vec<ObjectId> = document
        .reference_table
        .entries
        .iter()
        .filter_map(|(&number, entry)| match *entry {
            XrefEntry::Normal { generation, .. } => Some((number, generation)),
            _ => None,
        })
        .filter(|id| !document.objects.contains_key(id))
        .collect();

    let reader = Reader {
        buffer: &bytes[start..],
        document,
        encryption_state: None,
        raw_objects: BTreeMap::new(),
    };

    let objects: Vec<(ObjectId, Object)> = ids
        .into_iter()
        .filter_map(|id| match reader.get_object(id, &mut HashSet::new()) {
            Ok(object) => Some((id, object)),
            Err(err) => {
                debug!(object = ?id, error = %err, "skipping unparsable object");
                None
            }
        })
        .collect();

    let mut document = reader.document;
    document.objects.extend(objects);
    document
}

/// Drop the encryption dictionary of a document lopdf decrypted on load.
fn strip_encryption(mut document: Document) -> Document {
    if let Some(Ok(id)) = document
        .trailer
        .remove(b"Encrypt")
        .map(|object| object.as_reference())
    {
        document.objects.remove(&id);
    }
    document.encryption_state = None;
    document
}

fn classify_decrypt_error(err: lopdf::Error) -> SkipReason {
    match err {
        lopdf::Error::Decryption(DecryptionError::IncorrectPassword) => SkipReason::WrongPassword,
        other => SkipReason::UnsupportedEncryption(other.to_string()),
    }
}
