//! Tests for loading extracted course material from a directory.

use std::fs;

use tutor_rag::{DirectoryLoader, RagError, normalize_whitespace};

#[test]
fn loads_supported_files_sorted_by_name() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b-notes.md"), "# Notes\n\nrequirements   first").unwrap();
    fs::write(dir.path().join("Syllabus.pdf.txt"), "Systems\tengineering\n\nsyllabus").unwrap();
    fs::write(dir.path().join("grades.csv"), "name,grade").unwrap();
    fs::create_dir(dir.path().join("archive.txt")).unwrap();

    let documents = DirectoryLoader::default().load(dir.path()).unwrap();

    let ids: Vec<&str> = documents.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["Syllabus.pdf", "b-notes.md"]);
    assert_eq!(documents[0].text, "Systems engineering syllabus");
    assert_eq!(documents[1].text, "# Notes requirements first");
}

#[test]
fn documents_come_out_in_identifier_order() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("x.pdf.txt"), "extracted slides").unwrap();
    fs::write(dir.path().join("x.pdf-notes.md"), "lecture notes").unwrap();
    fs::write(dir.path().join("chapter.1.md"), "first chapter").unwrap();

    let documents = DirectoryLoader::default().load(dir.path()).unwrap();

    let ids: Vec<&str> = documents.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["chapter.1.md", "x.pdf", "x.pdf-notes.md"]);
    assert!(ids.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn pages_beyond_the_limit_are_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let pages: Vec<String> = (1..=5).map(|i| format!("page {i}")).collect();
    fs::write(dir.path().join("Book.pdf.txt"), pages.join("\x0c")).unwrap();

    let documents = DirectoryLoader::new(3).load(dir.path()).unwrap();

    assert_eq!(documents[0].text, "page 1 page 2 page 3");
}

#[test]
fn custom_extensions_replace_the_defaults() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "plain").unwrap();
    fs::write(dir.path().join("b.TEXT"), "custom").unwrap();

    let documents = DirectoryLoader::default().with_extensions(["text"]).load(dir.path()).unwrap();

    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].id, "b.TEXT");
}

#[test]
fn missing_or_empty_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();

    let empty = DirectoryLoader::default().load(dir.path());
    assert!(matches!(empty, Err(RagError::LoaderError { .. })));

    let missing = DirectoryLoader::default().load(dir.path().join("does-not-exist"));
    assert!(matches!(missing, Err(RagError::LoaderError { .. })));
}

#[test]
fn whitespace_is_collapsed_and_trimmed() {
    assert_eq!(normalize_whitespace("  a\n\n b\t\tc \r\n"), "a b c");
    assert_eq!(normalize_whitespace(" \n "), "");
}
