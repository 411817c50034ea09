//! Shared helpers for the integration tests.
//!
//! PDFs are generated with lopdf and packed into ZIP archives on the fly,
//! so the tests need no binary fixtures. Every page carries a tag as its
//! MediaBox width and draws a line whose content stream names the same
//! tag, which lets tests check page order and decrypted content.

#![allow(dead_code)]

use lopdf::{
    Document, EncryptionState, EncryptionVersion, Object, ObjectId, Permissions, Stream,
    StringFormat, dictionary,
};
use sati::Config;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Content stream of a page tagged `tag`.
pub fn page_content(tag: i64) -> Vec<u8> {
    format!("0 0 m {tag} 842 l S").into_bytes()
}

/// Build a document with `pages` pages whose MediaBox width is `tag`.
pub fn pdf_document(tag: i64, pages: usize) -> Document {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (0..pages)
        .map(|_| {
            let content_id = doc.add_object(Stream::new(dictionary! {}, page_content(tag)));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), tag.into(), 842.into()],
                "Contents" => content_id,
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

fn to_bytes(mut doc: Document) -> Vec<u8> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Serialised unencrypted PDF.
pub fn pdf_bytes(tag: i64, pages: usize) -> Vec<u8> {
    to_bytes(pdf_document(tag, pages))
}

/// Serialised PDF encrypted with 128-bit RC4 under `user_password`.
///
/// Content streams are really encrypted, so only a correct decryption
/// gives back [`page_content`].
pub fn encrypted_pdf_bytes(tag: i64, pages: usize, user_password: &str) -> Vec<u8> {
    let mut doc = pdf_document(tag, pages);
    doc.trailer.set(
        "ID",
        vec![
            Object::String(b"sati-test-file-1".to_vec(), StringFormat::Literal),
            Object::String(b"sati-test-file-2".to_vec(), StringFormat::Literal),
        ],
    );

    let owner_password = format!("owner-{user_password}");
    let version = EncryptionVersion::V2 {
        document: &doc,
        owner_password: &owner_password,
        user_password,
        key_length: 128,
        permissions: Permissions::all(),
    };
    let state = EncryptionState::try_from(version).unwrap();
    doc.encrypt(&state).unwrap();
    to_bytes(doc)
}

/// Write a ZIP archive holding `entries` in the given central-directory order.
pub fn write_zip(dir: &Path, name: &str, entries: &[(&str, Vec<u8>)]) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(CompressionMethod::Deflated);

    for (entry_name, contents) in entries {
        zip.start_file(*entry_name, options).unwrap();
        zip.write_all(contents).unwrap();
    }

    zip.finish().unwrap();
    path
}

fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Page tags of a PDF on disk, in page order.
pub fn page_tags(path: &Path) -> Vec<i64> {
    let doc = Document::load(path).unwrap();
    page_ids(&doc)
        .into_iter()
        .map(|id| {
            let page = doc.get_dictionary(id).unwrap();
            let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
            media_box[2].as_i64().unwrap()
        })
        .collect()
}

/// Decoded content stream of every page of a PDF on disk, in page order.
pub fn page_contents(path: &Path) -> Vec<Vec<u8>> {
    let doc = Document::load(path).unwrap();
    page_ids(&doc)
        .into_iter()
        .map(|id| doc.get_page_content(id).unwrap())
        .collect()
}

/// A quiet configuration for the given archive, password and output.
pub fn config(zip: &Path, password: &str, output: &Path) -> Config {
    let mut config = Config::new(zip, password, output);
    config.quiet = true;
    config
}
