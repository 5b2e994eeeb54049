//! Text extraction from scanned images.
//!
//! Two backends, selected by [`OcrEngine`]:
//!
//! * **Vision** — the scan is PNG-encoded and sent to a vision chat model
//!   with [`OCR_SYSTEM_PROMPT`] at temperature 0.
//! * **Tesseract** — the `tesseract` executable is run as a subprocess and
//!   its stdout is the text.
//!
//! Either way the result is `(text, token_count)` with the token count
//! estimated as characters / 4. There is no retry: a backend failure is
//! returned as [`QuizError::ExternalServiceFailure`].

use crate::config::{OcrEngine, QuizConfig};
use crate::document::estimate_tokens;
use crate::error::QuizError;
use crate::pipeline::encode;
use crate::pipeline::input::{resolve_input, InputKind};
use crate::prompts::OCR_SYSTEM_PROMPT;
use crate::providers::resolve_chat_provider;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Text recognised in one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub text: String,
    pub token_count: usize,
}

impl Extraction {
    fn new(text: String) -> Self {
        let token_count = estimate_tokens(&text);
        Self { text, token_count }
    }
}

/// OCR `image_path` with the backend configured in `config`.
pub async fn extract_text(image_path: &Path, config: &QuizConfig) -> Result<Extraction, QuizError> {
    match resolve_input(image_path)? {
        InputKind::Image(_) => {}
        other => {
            return Err(QuizError::UnsupportedInput {
                path: image_path.to_path_buf(),
                detail: format!("expected an image for OCR, found {other:?}"),
            })
        }
    }

    let start = Instant::now();
    let extraction = match config.ocr {
        OcrEngine::Vision => {
            let provider = match config.provider {
                Some(ref p) => Arc::clone(p),
                None => resolve_chat_provider(config.provider_name.as_deref(), &config.ocr_model)?,
            };
            vision_ocr(&provider, image_path, config.temperature).await?
        }
        OcrEngine::Tesseract { ref binary } => {
            let binary = binary.clone();
            let path = image_path.to_path_buf();
            tokio::task::spawn_blocking(move || tesseract_ocr(&binary, &path))
                .await
                .map_err(|e| QuizError::Internal(format!("OCR task panicked: {e}")))??
        }
    };

    if extraction.text.trim().is_empty() {
        warn!("OCR found no text in {}", image_path.display());
    }
    info!(
        "OCR extracted {} chars (~{} tokens) in {}ms",
        extraction.text.chars().count(),
        extraction.token_count,
        start.elapsed().as_millis()
    );
    Ok(extraction)
}

/// Transcribe a scan with a vision model.
pub async fn vision_ocr(
    provider: &Arc<dyn LLMProvider>,
    image_path: &Path,
    temperature: f32,
) -> Result<Extraction, QuizError> {
    let path = image_path.to_path_buf();
    let image_data = tokio::task::spawn_blocking(move || {
        let img = image::open(&path).map_err(|e| QuizError::UnsupportedInput {
            path: path.clone(),
            detail: format!("image could not be decoded: {e}"),
        })?;
        encode::encode_scan(&img).map_err(|e| QuizError::Internal(format!("PNG encoding: {e}")))
    })
    .await
    .map_err(|e| QuizError::Internal(format!("Encode task panicked: {e}")))??;

    let messages = vec![
        ChatMessage::system(OCR_SYSTEM_PROMPT),
        ChatMessage::user_with_images("", vec![image_data]),
    ];
    let options = CompletionOptions {
        temperature: Some(temperature),
        ..Default::default()
    };

    let response = provider
        .chat(&messages, Some(&options))
        .await
        .map_err(|e| QuizError::service("vision OCR", e))?;
    debug!(
        "Vision OCR: {} input tokens, {} output tokens",
        response.prompt_tokens, response.completion_tokens
    );

    Ok(Extraction::new(response.content))
}

/// Run `<binary> <image> stdout` and return what tesseract printed.
pub fn tesseract_ocr(binary: &Path, image_path: &Path) -> Result<Extraction, QuizError> {
    let output = Command::new(binary)
        .arg(image_path)
        .arg("stdout")
        .output()
        .map_err(|e| {
            QuizError::service(
                "tesseract",
                format!("could not run '{}': {e} (is tesseract installed?)", binary.display()),
            )
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(QuizError::service(
            "tesseract",
            format!("exited with {}: {}", output.status, stderr.trim()),
        ));
    }

    Ok(Extraction::new(
        String::from_utf8_lossy(&output.stdout).into_owned(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn token_count_is_quarter_of_chars() {
        let e = Extraction::new("Hello World\n".to_string());
        assert_eq!(e.token_count, 3);
    }

    #[test]
    fn missing_tesseract_binary_is_service_failure() {
        let err = tesseract_ocr(
            Path::new("/no/such/tesseract-binary"),
            Path::new("images/test.png"),
        )
        .unwrap_err();
        match err {
            QuizError::ExternalServiceFailure { service, message } => {
                assert_eq!(service, "tesseract");
                assert!(message.contains("tesseract-binary"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_image_is_not_found() {
        let config = QuizConfig::builder()
            .ocr(OcrEngine::Tesseract {
                binary: PathBuf::from("tesseract"),
            })
            .build()
            .unwrap();
        let err = extract_text(Path::new("/no/such/scan.png"), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::NotFound { .. }));
    }

    #[tokio::test]
    async fn pdf_is_rejected_for_ocr() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();
        let err = extract_text(&path, &QuizConfig::default()).await.unwrap_err();
        assert!(matches!(err, QuizError::UnsupportedInput { .. }));
    }
}
