//! Integration test: merging DOCX files end to end

mod common;

use common::*;
use docx_merger::{ArchivePatcher, DocxMerger, Error, MergeOptions, MergeOutcome};
use pretty_assertions::assert_eq;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::ZipArchive;

const PAGE_BREAK: &str = r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#;

fn sources(dir: &TempDir, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let path = dir.path().join(format!("{}.docx", name));
            write_docx(&path, &format!("Text of {}", name));
            path
        })
        .collect()
}

fn raw_entry(path: &Path, name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    let index = archive.index_for_name(name).unwrap();
    let mut entry = archive.by_index_raw(index).unwrap();
    let mut data = Vec::new();
    entry.read_to_end(&mut data).unwrap();
    data
}

#[test]
fn test_merge_three_documents() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let files = sources(&dir, &["a", "b", "c"]);
    let output = dir.path().join("merged.docx");

    let mut merger = DocxMerger::new();
    merger.add_files(&files);
    let outcome = merger.save(&output).unwrap();
    assert_eq!(outcome, MergeOutcome::Merged { appended: 2 });

    let names = entry_names(&output);
    let original = entry_names(&files[0]);
    assert_eq!(&names[..original.len()], &original[..]);
    assert_eq!(
        &names[original.len()..],
        &["file_part_1.docx".to_string(), "file_part_2.docx".to_string()]
    );

    assert_eq!(read_entry(&output, "file_part_1.docx"), fs::read(&files[1]).unwrap());
    assert_eq!(read_entry(&output, "file_part_2.docx"), fs::read(&files[2]).unwrap());

    let body = read_text(&output, "word/document.xml");
    assert!(body.ends_with(
        r#"<w:sectPr/><w:altChunk r:id="rId101"/><w:altChunk r:id="rId102"/></w:body></w:document>"#
    ));
    assert!(!body.contains(PAGE_BREAK));

    let rels = read_text(&output, "word/_rels/document.xml.rels");
    assert_eq!(rels.matches("relationships/aFChunk").count(), 2);
    assert!(rels.contains(r#"Id="rId101" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/aFChunk" Target="../file_part_1.docx""#));

    let types = read_text(&output, "[Content_Types].xml");
    assert!(types.contains(r#"<Override PartName="/file_part_1.docx""#));
    assert!(types.contains(r#"<Override PartName="/file_part_2.docx""#));
}

#[test]
fn test_untouched_entries_keep_their_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let files = sources(&dir, &["a", "b"]);
    let output = dir.path().join("merged.docx");

    let mut merger = DocxMerger::new();
    merger.add_files(&files);
    merger.save(&output).unwrap();

    for name in ["word/styles.xml", "word/header1.xml", "_rels/.rels"] {
        assert_eq!(raw_entry(&output, name), raw_entry(&files[0], name), "{}", name);
    }
}

#[test]
fn test_page_break_before_flagged_file_only() {
    let dir = tempfile::tempdir().unwrap();
    let files = sources(&dir, &["a", "b", "c"]);
    let output = dir.path().join("merged.docx");

    let mut merger = DocxMerger::new();
    merger
        .add_file(&files[0])
        .add_file_with_page_break(&files[1], true)
        .add_file_with_page_break(&files[2], false);
    merger.save(&output).unwrap();

    let body = read_text(&output, "word/document.xml");
    assert_eq!(body.matches(PAGE_BREAK).count(), 1);
    assert!(body.contains(&format!(
        r#"{}<w:altChunk r:id="rId101"/><w:altChunk r:id="rId102"/></w:body>"#,
        PAGE_BREAK
    )));
}

#[test]
fn test_uniform_page_break_and_ragged_flags() {
    let dir = tempfile::tempdir().unwrap();
    let files = sources(&dir, &["a", "b", "c"]);
    let output = dir.path().join("merged.docx");

    // flag list covers only the first two files
    let mut merger = DocxMerger::new();
    merger.add_files_with_page_breaks(&files, &[true, false]);

    merger.save(&output).unwrap();
    let body = read_text(&output, "word/document.xml");
    assert_eq!(body.matches(PAGE_BREAK).count(), 0);

    merger
        .save_with(&output, &MergeOptions::new().page_break(true))
        .unwrap();
    let body = read_text(&output, "word/document.xml");
    // b keeps its explicit `false`, c falls back to the uniform flag
    assert!(body.ends_with(&format!(
        r#"<w:altChunk r:id="rId101"/>{}<w:altChunk r:id="rId102"/></w:body></w:document>"#,
        PAGE_BREAK
    )));
}

#[test]
fn test_single_file_is_copied() {
    let dir = tempfile::tempdir().unwrap();
    let files = sources(&dir, &["a"]);
    let output = dir.path().join("merged.docx");

    let mut merger = DocxMerger::new();
    merger.add_files(&files);
    assert_eq!(
        merger.save(&output).unwrap(),
        MergeOutcome::Merged { appended: 0 }
    );

    assert_eq!(entry_names(&output), entry_names(&files[0]));
    assert_eq!(
        read_text(&output, "word/document.xml"),
        read_text(&files[0], "word/document.xml")
    );
}

#[test]
fn test_save_twice_does_not_leak_state() {
    let dir = tempfile::tempdir().unwrap();
    let files = sources(&dir, &["a", "b", "c", "d"]);
    let output = dir.path().join("merged.docx");

    let mut first = DocxMerger::new();
    first.add_files(&files[..3]);
    first.save(&output).unwrap();

    let mut second = DocxMerger::new();
    second.add_files([&files[3], &files[0]]);
    second.save(&output).unwrap();

    let body = read_text(&output, "word/document.xml");
    assert!(body.contains("Text of d"));
    assert_eq!(body.matches("<w:altChunk").count(), 1);
    assert_eq!(
        entry_names(&output).iter().filter(|n| n.starts_with("file_part_")).count(),
        1
    );
    assert_eq!(read_entry(&output, "file_part_1.docx"), fs::read(&files[0]).unwrap());
}

#[test]
fn test_replacements_reach_headers() {
    let dir = tempfile::tempdir().unwrap();
    let files = sources(&dir, &["a", "b"]);
    let output = dir.path().join("merged.docx");

    let mut merger = DocxMerger::new();
    merger.add_files(&files);
    merger
        .save_with(
            &output,
            &MergeOptions::new()
                .preserve_headers_footers(true)
                .replace("{title}", "Annual Report")
                .replace("Text of a", "Summary"),
        )
        .unwrap();

    assert!(read_text(&output, "word/header1.xml").contains("Annual Report"));
    assert!(read_text(&output, "word/document.xml").contains("Summary"));
    // the embedded file is opaque
    assert_eq!(read_entry(&output, "file_part_1.docx"), fs::read(&files[1]).unwrap());
}

#[test]
fn test_headers_untouched_without_preserve() {
    let dir = tempfile::tempdir().unwrap();
    let files = sources(&dir, &["a", "b"]);
    let output = dir.path().join("merged.docx");

    let mut merger = DocxMerger::new();
    merger.add_files(&files);
    merger
        .save_with(&output, &MergeOptions::new().replace("{title}", "X"))
        .unwrap();

    assert_eq!(
        raw_entry(&output, "word/header1.xml"),
        raw_entry(&files[0], "word/header1.xml")
    );
}

#[test]
fn test_missing_source_removes_output() {
    let dir = tempfile::tempdir().unwrap();
    let files = sources(&dir, &["a"]);
    let output = dir.path().join("merged.docx");

    let mut merger = DocxMerger::new();
    merger.add_file(&files[0]).add_file(dir.path().join("gone.docx"));

    assert!(matches!(
        merger.save(&output),
        Err(Error::SourceRead { .. })
    ));
    assert!(!output.exists());
}

#[test]
fn test_patcher_on_copied_output_with_custom_names() {
    let dir = tempfile::tempdir().unwrap();
    let files = sources(&dir, &["a", "b"]);
    let output = dir.path().join("merged.docx");
    fs::copy(&files[0], &output).unwrap();

    let mut patcher = ArchivePatcher::open(&output).unwrap();
    patcher
        .append(&files[1], "chunks/b.docx", "rIdChunkB", true)
        .unwrap();
    patcher.commit().unwrap();

    let rels = read_text(&output, "word/_rels/document.xml.rels");
    assert!(rels.contains(r#"Target="../chunks/b.docx""#));
    let types = read_text(&output, "[Content_Types].xml");
    assert!(types.contains(r#"PartName="/chunks/b.docx""#));
    assert_eq!(read_entry(&output, "chunks/b.docx"), fs::read(&files[1]).unwrap());

    // no temp files left behind
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with(".dm"))
        .collect();
    assert!(leftovers.is_empty());
}
