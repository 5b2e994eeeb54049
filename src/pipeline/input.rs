//! Input resolution: validate a user-supplied path and classify its content.
//!
//! The orchestrator asks the user whether the input is an image, but the
//! answer is only trusted as far as the bytes agree: a PDF is recognised by
//! its `%PDF` magic, an image by its format signature, plain text by its
//! extension. Classifying up front turns "tesseract crashed on a PDF" into
//! a clear [`QuizError::UnsupportedInput`].

use crate::error::QuizError;
use image::ImageFormat;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// What kind of document a path holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Pdf,
    Image(ImageFormat),
    Text,
}

/// Image formats this build can decode.
const DECODABLE: [ImageFormat; 2] = [ImageFormat::Png, ImageFormat::Jpeg];

/// Validate that `path` exists and is readable, and classify it.
pub fn resolve_input(path: &Path) -> Result<InputKind, QuizError> {
    if !path.exists() {
        return Err(QuizError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let mut magic = [0u8; 16];
    let read = match std::fs::File::open(path) {
        Ok(mut f) => f.read(&mut magic).unwrap_or(0),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(QuizError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(QuizError::NotFound {
                path: path.to_path_buf(),
            });
        }
    };

    let kind = classify(path, &magic[..read])?;
    debug!("Resolved {} as {:?}", path.display(), kind);
    Ok(kind)
}

fn classify(path: &Path, head: &[u8]) -> Result<InputKind, QuizError> {
    if head.starts_with(b"%PDF") {
        return Ok(InputKind::Pdf);
    }

    if let Ok(format) = image::guess_format(head) {
        if DECODABLE.contains(&format) {
            return Ok(InputKind::Image(format));
        }
        return Err(QuizError::UnsupportedInput {
            path: path.to_path_buf(),
            detail: format!("{format:?} images are not supported, convert to PNG or JPEG"),
        });
    }

    let is_text = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "txt" | "md"))
        .unwrap_or(false);
    if is_text {
        return Ok(InputKind::Text);
    }

    Err(QuizError::UnsupportedInput {
        path: path.to_path_buf(),
        detail: "expected a PDF, a PNG/JPEG image or a .txt/.md file".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

    #[test]
    fn missing_file_is_not_found() {
        let err = resolve_input(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, QuizError::NotFound { .. }));
    }

    #[test]
    fn pdf_magic_wins_over_extension() {
        let kind = classify(Path::new("scan.png"), b"%PDF-1.7\n").unwrap();
        assert_eq!(kind, InputKind::Pdf);
    }

    #[test]
    fn png_signature_is_image() {
        let kind = classify(Path::new("upload.bin"), PNG_SIGNATURE).unwrap();
        assert_eq!(kind, InputKind::Image(ImageFormat::Png));
    }

    #[test]
    fn text_by_extension() {
        assert_eq!(
            classify(Path::new("notes.TXT"), b"Chapter 1").unwrap(),
            InputKind::Text
        );
        assert_eq!(
            classify(Path::new("notes.md"), b"# Title").unwrap(),
            InputKind::Text
        );
    }

    #[test]
    fn unknown_content_rejected() {
        let err = classify(Path::new("archive.zip"), b"PK\x03\x04").unwrap_err();
        assert!(matches!(err, QuizError::UnsupportedInput { .. }));
    }

    #[test]
    fn resolves_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"%PDF-1.4 minimal").unwrap();
        assert_eq!(resolve_input(&path).unwrap(), InputKind::Pdf);
    }
}
