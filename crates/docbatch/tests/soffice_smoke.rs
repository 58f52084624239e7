//! Smoke test against a real LibreOffice installation.
//!
//! Run with: `DOCBATCH_SOFFICE_TESTS=1 cargo test -p docbatch --test soffice_smoke -- --ignored`

use std::fs;

use docbatch::config::{ConvertOptions, TargetFormat};
use docbatch::soffice::SofficeLauncher;

fn soffice_available() -> bool {
    if std::env::var("DOCBATCH_SOFFICE_TESTS").unwrap_or_default() != "1" {
        return false;
    }
    if which::which("soffice").is_err() {
        eprintln!("[WARN] soffice not installed, skipping");
        return false;
    }
    true
}

#[test]
#[ignore]
fn test_rtf_folder_to_pdf() {
    if !soffice_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("one.rtf"), r"{\rtf1\ansi Hello from one\par}").unwrap();
    fs::create_dir_all(root.join("sub")).unwrap();
    fs::write(root.join("sub/two.rtf"), r"{\rtf1\ansi Hello from two\par}").unwrap();

    let mut options = ConvertOptions::new(root);
    options.include_filter = "*.rtf".to_string();
    options.target_format = TargetFormat::Pdf;
    options.reset_template = true;
    docbatch::batch::run(&options, &SofficeLauncher::default()).unwrap();

    for pdf in [root.join("one.pdf"), root.join("sub/two.pdf")] {
        let bytes = fs::read(&pdf).unwrap();
        assert!(bytes.starts_with(b"%PDF"), "{} should be a PDF", pdf.display());
    }
}

#[test]
#[ignore]
fn test_xps_fails_per_document() {
    if !soffice_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("a.rtf");
    fs::write(&source, r"{\rtf1\ansi xps\par}").unwrap();

    let mut options = ConvertOptions::new(&source);
    options.target_format = TargetFormat::Xps;
    let err = docbatch::batch::run(&options, &SofficeLauncher::default()).unwrap_err();
    assert_eq!(err.exit_code(), 1003);
    assert!(source.exists());
}
