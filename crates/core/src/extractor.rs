use crate::error::IngestError;
use crate::models::LoadedDocument;
use chrono::Utc;
use lopdf::Document;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct PageText {
    pub number: u32,
    pub text: String,
}

pub trait PdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, IngestError>;
}

#[derive(Default)]
pub struct LopdfExtractor;

impl PdfExtractor for LopdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, IngestError> {
        let document =
            Document::load(path).map_err(|error| IngestError::PdfParse(error.to_string()))?;

        let mut pages = Vec::new();
        for (page_no, _page_id) in document.get_pages() {
            let text = document
                .extract_text(&[page_no])
                .map_err(|error| IngestError::PdfParse(error.to_string()))?;

            if !text.trim().is_empty() {
                pages.push(PageText {
                    number: page_no,
                    text,
                });
            }
        }

        if pages.is_empty() {
            return Err(IngestError::PdfParse(format!(
                "pdf had no readable page text: {}",
                path.display()
            )));
        }

        Ok(pages)
    }
}

/// Concatenate page text in page order, with no separators between pages.
pub fn concat_pages(pages: &[PageText]) -> String {
    pages.iter().map(|page| page.text.as_str()).collect()
}

pub fn extract_document_text(path: &Path) -> Result<String, IngestError> {
    let pages = LopdfExtractor.extract_pages(path)?;
    Ok(concat_pages(&pages))
}

pub fn digest_file(path: &Path) -> Result<String, IngestError> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Load the source document once: checksum the file bytes and extract the
/// full text blob used for chunking.
pub fn load_document(path: &Path) -> Result<LoadedDocument, IngestError> {
    let checksum = digest_file(path)?;
    let text = extract_document_text(path)?;

    Ok(LoadedDocument {
        source_path: path.to_string_lossy().to_string(),
        checksum,
        text,
        loaded_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::{concat_pages, digest_file, load_document, PageText};
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    #[test]
    fn pages_concatenate_in_order_without_separators() {
        let pages = vec![
            PageText {
                number: 1,
                text: "The fiscal deficit".to_string(),
            },
            PageText {
                number: 2,
                text: " target is 4.5 percent.".to_string(),
            },
        ];

        assert_eq!(
            concat_pages(&pages),
            "The fiscal deficit target is 4.5 percent."
        );
    }

    #[test]
    fn checksum_is_reproducible() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let file_path = dir.path().join("a.pdf");
        fs::write(&file_path, b"abc")?;

        let first = digest_file(&file_path)?;
        let second = digest_file(&file_path)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = load_document(Path::new("/nonexistent/Budget_Speech.pdf"));
        assert!(matches!(result, Err(crate::IngestError::Io(_))));
    }

    #[test]
    fn unreadable_pdf_is_a_parse_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let file_path = dir.path().join("broken.pdf");
        fs::write(&file_path, b"%PDF-1.4\n%broken")?;

        let result = load_document(&file_path);
        assert!(matches!(result, Err(crate::IngestError::PdfParse(_))));
        Ok(())
    }
}
