//! Course material loading.
//!
//! PDF extraction happens outside this crate. The loader reads the text
//! that extraction produced: one `.txt` or `.md` file per document, pages
//! separated by form feeds (`\x0c`) as text extractors emit them. A file
//! named `Syllabus.pdf.txt` is cited as `Syllabus.pdf`; every other file is
//! cited by its full name.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use crate::config::MAX_PDF_PAGES;
use crate::document::Document;
use crate::error::{RagError, Result};

const PAGE_SEPARATOR: char = '\x0c';

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").expect("unreachable error: failed to compile whitespace pattern")
});

/// Loads every supported file of a directory as a [`Document`].
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    max_pages: usize,
    extensions: Vec<String>,
}

impl Default for DirectoryLoader {
    fn default() -> Self {
        Self { max_pages: MAX_PDF_PAGES, extensions: vec!["txt".to_string(), "md".to_string()] }
    }
}

impl DirectoryLoader {
    /// Create a loader reading at most `max_pages` pages per document.
    pub fn new(max_pages: usize) -> Self {
        Self { max_pages, ..Self::default() }
    }

    /// Replace the accepted file extensions (without the leading dot).
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(|e| e.into().to_ascii_lowercase()).collect();
        self
    }

    /// Load the documents in `dir`, sorted by document ID.
    ///
    /// Unreadable files are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::LoaderError`] if the directory cannot be listed or
    /// contains no loadable document.
    pub fn load(&self, dir: impl AsRef<Path>) -> Result<Vec<Document>> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|e| RagError::LoaderError {
            path: dir.display().to_string(),
            message: format!("failed to list directory: {e}"),
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && self.accepts(path))
            .collect();
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            match fs::read_to_string(&path) {
                Ok(raw) => {
                    let document = Document::new(document_id(&path), self.extract(&raw));
                    info!(document.id = %document.id, chars = document.text.len(), "loaded document");
                    documents.push(document);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable document");
                }
            }
        }

        // Stable, so `x.pdf.md` and `x.pdf.txt` keep file-name order.
        documents.sort_by(|a, b| a.id.cmp(&b.id));

        if documents.is_empty() {
            return Err(RagError::LoaderError {
                path: dir.display().to_string(),
                message: "no documents found".to_string(),
            });
        }
        Ok(documents)
    }

    /// Keep the first `max_pages` pages and normalise whitespace.
    pub fn extract(&self, raw: &str) -> String {
        let pages: Vec<&str> = raw.split(PAGE_SEPARATOR).take(self.max_pages).collect();
        normalize_whitespace(&pages.join(" "))
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

/// Collapse every whitespace run into a single space and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// File name used for citations; extracted text named `Name.pdf.<ext>`
/// becomes `Name.pdf`.
fn document_id(path: &Path) -> String {
    let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let pdf_name = Path::new(&file_name)
        .file_stem()
        .filter(|stem| {
            Path::new(stem).extension().is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .map(|stem| stem.to_string_lossy().into_owned());
    pdf_name.unwrap_or(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_id_strips_text_suffix_of_extracted_files() {
        assert_eq!(document_id(Path::new("/tmp/Syllabus.pdf.txt")), "Syllabus.pdf");
        assert_eq!(document_id(Path::new("/tmp/notes.md")), "notes.md");
        assert_eq!(document_id(Path::new("/tmp/chapter.1.md")), "chapter.1.md");
        assert_eq!(document_id(Path::new("/tmp/x.pdf-notes.md")), "x.pdf-notes.md");
        assert_eq!(document_id(Path::new("/tmp/Lab.PDF.txt")), "Lab.PDF");
    }

    #[test]
    fn extract_limits_pages() {
        let loader = DirectoryLoader::new(2);
        assert_eq!(loader.extract("page one\x0cpage\n two\x0cpage three"), "page one page two");
    }
}
