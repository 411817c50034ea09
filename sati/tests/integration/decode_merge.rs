//! Integration tests for the decode-and-merge flow with unencrypted entries.

use sati::config::EmptyPolicy;
use sati::decode_and_merge;
use sati::io::SkipReason;
use tempfile::TempDir;

use crate::common::{config, page_tags, pdf_bytes, write_zip};

#[tokio::test]
async fn test_pages_follow_filename_order() {
    let dir = TempDir::new().unwrap();
    let zip = write_zip(
        dir.path(),
        "bundle.zip",
        &[
            ("c.pdf", pdf_bytes(300, 3)),
            ("a.pdf", pdf_bytes(100, 1)),
            ("b.pdf", pdf_bytes(200, 2)),
        ],
    );
    let output = dir.path().join("merged.pdf");

    let report = decode_and_merge(&config(&zip, "", &output)).await.unwrap();

    assert!(report.written);
    assert_eq!(report.entries_seen, 3);
    assert_eq!(report.total_pages, 6);
    assert!(report.skipped.is_empty());
    let names: Vec<&str> = report.merged.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["a.pdf", "b.pdf", "c.pdf"]);

    assert_eq!(page_tags(&output), vec![100, 200, 200, 300, 300, 300]);
}

#[tokio::test]
async fn test_non_pdf_entries_are_ignored() {
    let dir = TempDir::new().unwrap();
    let zip = write_zip(
        dir.path(),
        "bundle.zip",
        &[
            ("readme.txt", b"not a pdf".to_vec()),
            ("scans/B.PDF", pdf_bytes(20, 1)),
            ("scans/a.pdf", pdf_bytes(10, 1)),
            ("__MACOSX/scans/._a.pdf", b"resource fork".to_vec()),
        ],
    );
    let output = dir.path().join("merged.pdf");

    let report = decode_and_merge(&config(&zip, "", &output)).await.unwrap();

    assert_eq!(report.entries_seen, 2);
    assert_eq!(report.entries_ignored, 2);
    // Byte-wise order puts the upper-case name first
    assert_eq!(page_tags(&output), vec![20, 10]);
}

#[tokio::test]
async fn test_corrupt_entry_is_skipped() {
    let dir = TempDir::new().unwrap();
    let zip = write_zip(
        dir.path(),
        "bundle.zip",
        &[
            ("a.pdf", pdf_bytes(10, 2)),
            ("b.pdf", b"this is not a pdf".to_vec()),
            ("c.pdf", pdf_bytes(30, 1)),
        ],
    );
    let output = dir.path().join("merged.pdf");

    let report = decode_and_merge(&config(&zip, "", &output)).await.unwrap();

    assert!(report.written);
    assert!(report.is_partial());
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].name, "b.pdf");
    assert!(matches!(report.skipped[0].reason, SkipReason::Unreadable(_)));
    assert_eq!(page_tags(&output), vec![10, 10, 30]);
}

#[tokio::test]
async fn test_second_run_overwrites_with_same_result() {
    let dir = TempDir::new().unwrap();
    let zip = write_zip(
        dir.path(),
        "bundle.zip",
        &[("a.pdf", pdf_bytes(10, 1)), ("b.pdf", pdf_bytes(20, 2))],
    );
    let output = dir.path().join("merged.pdf");
    std::fs::write(&output, b"stale output from an earlier run").unwrap();

    let config = config(&zip, "", &output);
    decode_and_merge(&config).await.unwrap();
    let first = std::fs::read(&output).unwrap();

    decode_and_merge(&config).await.unwrap();
    let second = std::fs::read(&output).unwrap();

    assert_eq!(first, second);
    assert_eq!(page_tags(&output), vec![10, 20, 20]);
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let zip = write_zip(
        dir.path(),
        "bundle.zip",
        &[("a.pdf", pdf_bytes(10, 2)), ("b.pdf", b"junk".to_vec())],
    );
    let output = dir.path().join("merged.pdf");

    let mut config = config(&zip, "", &output);
    config.dry_run = true;
    let report = decode_and_merge(&config).await.unwrap();

    assert!(!report.written);
    assert_eq!(report.output_size, None);
    assert_eq!(report.total_pages, 2);
    assert_eq!(report.skipped.len(), 1);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_write_empty_policy_produces_empty_document() {
    let dir = TempDir::new().unwrap();
    let zip = write_zip(dir.path(), "bundle.zip", &[("a.pdf", b"junk".to_vec())]);
    let output = dir.path().join("merged.pdf");

    let mut config = config(&zip, "", &output);
    config.empty_policy = EmptyPolicy::WriteEmpty;
    let report = decode_and_merge(&config).await.unwrap();

    assert!(report.written);
    assert!(report.merged.is_empty());
    assert_eq!(report.total_pages, 0);
    assert!(page_tags(&output).is_empty());
}

#[tokio::test]
async fn test_report_serialises_to_json() {
    let dir = TempDir::new().unwrap();
    let zip = write_zip(dir.path(), "bundle.zip", &[("a.pdf", pdf_bytes(10, 1))]);
    let output = dir.path().join("merged.pdf");

    let report = decode_and_merge(&config(&zip, "", &output)).await.unwrap();
    let json = report.to_json().unwrap();

    assert!(json.contains("\"totalPages\": 1"));
    assert!(json.contains("\"written\": true"));
}
