//! Document loading: PDFs through pdfium's text layer, plain text as-is.

use crate::document::{Document, Page};
use crate::error::QuizError;
use crate::pipeline::input::{resolve_input, InputKind};
use crate::providers::DocumentLoader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Loads PDFs (one [`Page`] per PDF page) and `.txt`/`.md` files (one page).
///
/// Images are rejected: they have no text layer and must go through
/// [`crate::pipeline::ocr`] first.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileLoader;

impl DocumentLoader for FileLoader {
    fn load(&self, path: &Path) -> Result<Document, QuizError> {
        match resolve_input(path)? {
            InputKind::Pdf => load_pdf(path),
            InputKind::Text => load_text(path),
            InputKind::Image(format) => Err(QuizError::UnsupportedInput {
                path: path.to_path_buf(),
                detail: format!("{format:?} image has no text layer; answer 'y' to run OCR"),
            }),
        }
    }
}

/// Run `loader` on the blocking pool.
///
/// pdfium is synchronous and not `Send`; it must never run on an async
/// worker thread.
pub async fn load_blocking(
    loader: Arc<dyn DocumentLoader>,
    path: PathBuf,
) -> Result<Document, QuizError> {
    tokio::task::spawn_blocking(move || loader.load(&path))
        .await
        .map_err(|e| QuizError::Internal(format!("Load task panicked: {}", e)))?
}

fn load_text(path: &Path) -> Result<Document, QuizError> {
    let text = std::fs::read_to_string(path).map_err(|e| QuizError::UnsupportedInput {
        path: path.to_path_buf(),
        detail: format!("not valid UTF-8 text: {e}"),
    })?;
    Ok(Document::single_page(path, text))
}

fn load_pdf(path: &Path) -> Result<Document, QuizError> {
    let pdfium = crate::pdfium::bind()?;

    let document = pdfium
        .load_pdf_from_file(path, None)
        .map_err(|e| QuizError::UnsupportedInput {
            path: path.to_path_buf(),
            detail: format!("pdfium could not open the PDF: {e:?}"),
        })?;

    let mut pages = Vec::new();
    for (idx, page) in document.pages().iter().enumerate() {
        let text = page
            .text()
            .map_err(|e| QuizError::UnsupportedInput {
                path: path.to_path_buf(),
                detail: format!("text extraction failed on page {}: {e:?}", idx + 1),
            })?
            .all();
        debug!("Page {}: {} chars", idx + 1, text.chars().count());
        pages.push(Page {
            number: idx + 1,
            text,
        });
    }

    info!("Loaded {} pages from {}", pages.len(), path.display());
    Ok(Document::new(path, pages))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_plain_text_as_one_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "The mitochondria is the powerhouse of the cell.").unwrap();

        let doc = FileLoader.load(&path).unwrap();
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.source(), path.as_path());
        assert!(doc.text().contains("powerhouse"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = FileLoader
            .load(Path::new("/no/such/document.pdf"))
            .unwrap_err();
        assert!(matches!(err, QuizError::NotFound { .. }));
    }

    #[tokio::test]
    async fn blocking_load_matches_direct_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "# Cells\nRibosomes build proteins.").unwrap();

        let doc = load_blocking(Arc::new(FileLoader), path.clone()).await.unwrap();
        assert_eq!(doc.text(), FileLoader.load(&path).unwrap().text());

        let err = load_blocking(Arc::new(FileLoader), dir.path().join("gone.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::NotFound { .. }));
    }

    #[test]
    fn images_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n']).unwrap();
        let err = FileLoader.load(&path).unwrap_err();
        assert!(err.to_string().contains("OCR"), "got: {err}");
    }
}
