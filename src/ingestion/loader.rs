//! Page-level document loading
//!
//! The core only needs page-ordered text. Format-specific extraction (PDF,
//! DOCX, ...) belongs to external collaborators implementing
//! [`DocumentLoader`]; the bundled loader handles plain text and markdown
//! with form-feed page breaks.

use std::path::Path;

use crate::error::{Error, Result};

/// Loads a document as an ordered sequence of page texts
pub trait DocumentLoader: Send + Sync {
    /// Load page-ordered text from a document.
    ///
    /// An unreadable or unparseable source fails with
    /// [`Error::InvalidDocument`]; it is never retried here.
    fn load(&self, path: &Path) -> Result<Vec<String>>;
}

/// Plain text / markdown loader.
///
/// Pages are separated by form-feed characters (`\x0c`); a file without
/// form feeds is a single page.
#[derive(Debug, Default)]
pub struct TextFileLoader;

impl TextFileLoader {
    /// Create a new text file loader
    pub fn new() -> Self {
        Self
    }
}

impl DocumentLoader for TextFileLoader {
    fn load(&self, path: &Path) -> Result<Vec<String>> {
        let bytes = std::fs::read(path)
            .map_err(|e| Error::invalid_document(path, format!("cannot read file: {}", e)))?;

        let text = String::from_utf8(bytes)
            .map_err(|_| Error::invalid_document(path, "file is not valid UTF-8 text"))?;

        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(text.split('\u{0c}').map(|page| page.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_single_page() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "hello support document").unwrap();

        let pages = TextFileLoader::new().load(file.path()).unwrap();
        assert_eq!(pages, vec!["hello support document".to_string()]);
    }

    #[test]
    fn test_load_form_feed_pages() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "page one\u{0c}page two\u{0c}page three").unwrap();

        let pages = TextFileLoader::new().load(file.path()).unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[1], "page two");
    }

    #[test]
    fn test_missing_file_is_invalid_document() {
        let err = TextFileLoader::new()
            .load(Path::new("/nonexistent/support.txt"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDocument { .. }));
    }

    #[test]
    fn test_non_utf8_is_invalid_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xff, 0xfe, 0x80, 0x80]).unwrap();

        let err = TextFileLoader::new().load(file.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidDocument { .. }));
    }
}
