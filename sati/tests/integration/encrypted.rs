//! Integration tests for password-protected entries.

use lopdf::Document;
use sati::archive::ArchiveEntry;
use sati::decode_and_merge;
use sati::io::{DecodedPdf, DecryptResult, PdfDecryptor, SkipReason};
use tempfile::TempDir;

use crate::common::{
    config, encrypted_pdf_bytes, page_content, page_contents, page_tags, pdf_bytes, write_zip,
};

fn entry(name: &str, bytes: Vec<u8>) -> ArchiveEntry {
    ArchiveEntry {
        name: name.to_string(),
        index: 0,
        bytes,
    }
}

fn opened(result: DecryptResult) -> DecodedPdf {
    match result {
        DecryptResult::Decrypted(pdf) => pdf,
        DecryptResult::Skipped(reason) => panic!("unexpected skip: {reason}"),
    }
}

#[test]
fn test_correct_password_opens_entry() {
    let decryptor = PdfDecryptor::new("secret");
    let pdf = opened(decryptor.decrypt(&entry("a.pdf", encrypted_pdf_bytes(10, 2, "secret"))));

    assert!(pdf.was_encrypted);
    assert_eq!(pdf.page_count, 2);
    assert!(pdf.document.trailer.get(b"Encrypt").is_err());
    for page_id in pdf.document.get_pages().into_values() {
        assert_eq!(
            pdf.document.get_page_content(page_id).unwrap(),
            page_content(10)
        );
    }
}

#[test]
fn test_wrong_password_skips_entry() {
    let decryptor = PdfDecryptor::new("not-the-password");
    let result = decryptor.decrypt(&entry("a.pdf", encrypted_pdf_bytes(10, 2, "secret")));

    assert!(matches!(
        result,
        DecryptResult::Skipped(SkipReason::WrongPassword)
    ));
}

#[tokio::test]
async fn test_encrypted_and_plain_entries_merge() {
    let dir = TempDir::new().unwrap();
    let zip = write_zip(
        dir.path(),
        "bundle.zip",
        &[
            ("b.pdf", pdf_bytes(20, 1)),
            ("a.pdf", encrypted_pdf_bytes(10, 2, "secret")),
        ],
    );
    let output = dir.path().join("merged.pdf");

    let report = decode_and_merge(&config(&zip, "secret", &output))
        .await
        .unwrap();

    assert_eq!(report.total_pages, 3);
    assert!(report.merged[0].was_encrypted);
    assert!(!report.merged[1].was_encrypted);
    assert_eq!(page_tags(&output), vec![10, 10, 20]);
    assert_eq!(
        page_contents(&output),
        vec![page_content(10), page_content(10), page_content(20)]
    );
}

#[tokio::test]
async fn test_only_correctly_decrypted_pages_are_kept() {
    let dir = TempDir::new().unwrap();
    let zip = write_zip(
        dir.path(),
        "bundle.zip",
        &[
            ("a.pdf", encrypted_pdf_bytes(10, 2, "secret")),
            ("b.pdf", encrypted_pdf_bytes(20, 3, "something-else")),
        ],
    );
    let output = dir.path().join("merged.pdf");

    let report = decode_and_merge(&config(&zip, "secret", &output))
        .await
        .unwrap();

    assert!(report.written);
    assert_eq!(report.merged.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].name, "b.pdf");
    assert_eq!(report.skipped[0].reason, SkipReason::WrongPassword);
    assert_eq!(page_tags(&output), vec![10, 10]);
    assert_eq!(page_contents(&output), vec![page_content(10); 2]);
}

#[tokio::test]
async fn test_empty_user_password_entry_opens_with_any_password() {
    let dir = TempDir::new().unwrap();
    let zip = write_zip(
        dir.path(),
        "bundle.zip",
        &[
            ("a.pdf", encrypted_pdf_bytes(10, 1, "")),
            ("b.pdf", encrypted_pdf_bytes(20, 1, "secret")),
        ],
    );

    for password in ["", "secret"] {
        let output = dir.path().join(format!("merged-{}.pdf", password.len()));
        let report = decode_and_merge(&config(&zip, password, &output))
            .await
            .unwrap();

        assert_eq!(report.merged[0].name, "a.pdf");
        assert_eq!(page_contents(&output)[0], page_content(10));
    }
}

#[tokio::test]
async fn test_output_is_not_encrypted() {
    let dir = TempDir::new().unwrap();
    let zip = write_zip(
        dir.path(),
        "bundle.zip",
        &[("a.pdf", encrypted_pdf_bytes(10, 1, "secret"))],
    );
    let output = dir.path().join("merged.pdf");

    decode_and_merge(&config(&zip, "secret", &output))
        .await
        .unwrap();

    let merged = Document::load(&output).unwrap();
    assert!(!merged.is_encrypted());
    assert!(merged.trailer.get(b"Encrypt").is_err());
    assert_eq!(merged.get_pages().len(), 1);
    assert_eq!(page_contents(&output), vec![page_content(10)]);
}
