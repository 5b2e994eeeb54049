//! Error type for the docuquiz library.
//!
//! Every stage of the pipeline aborts the run on failure: there is no
//! per-page tolerance and no retry loop, so a single fatal enum is enough.
//! Variants are grouped by the stage that raises them and their messages
//! carry a hint telling the user what to fix.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the docuquiz library.
#[derive(Debug, Error)]
pub enum QuizError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// An input file (image, PDF or text document) does not exist.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    NotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but is neither a PDF, a supported image nor plain text.
    #[error("Unsupported input '{path}': {detail}")]
    UnsupportedInput { path: PathBuf, detail: String },

    // ── Quiz pipeline errors ──────────────────────────────────────────────
    /// A query was issued before the retrieval index was built or loaded.
    #[error("Quiz bot is not initialized yet.\nCall initialize() before query().")]
    NotInitialized,

    /// The token budget falls between the compact and standard tiers.
    #[error(
        "No model is configured for a token budget of {tokens} \
(compact covers <= {compact_max}, standard starts at {standard_min}).\n\
Truncate or split the document, or adjust the model tiers."
    )]
    UnsupportedModelSelection {
        tokens: usize,
        compact_max: usize,
        standard_min: usize,
    },

    // ── Resource errors ───────────────────────────────────────────────────
    /// A font or logo file could not be found at any configured location.
    #[error("Required {resource} not found. Searched:\n{}", format_searched(.searched))]
    ResourceMissing {
        resource: String,
        searched: Vec<PathBuf>,
    },

    // ── External service errors ───────────────────────────────────────────
    /// OCR, embedding or completion call failed. The message is the
    /// backend's own error text, unchanged.
    #[error("{service} failed: {message}")]
    ExternalServiceFailure { service: String, message: String },

    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Index errors ──────────────────────────────────────────────────────
    /// The persisted index exists but cannot be used.
    #[error("Index at '{path}' is unusable: {detail}\nRe-run with --reset to rebuild it.")]
    IndexCorrupt { path: PathBuf, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file (PDF or index).
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Place libpdfium next to the executable, install it system-wide,\n\
or set PDFIUM_LIB_PATH=/path/to/libpdfium.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl QuizError {
    /// Shorthand for [`QuizError::ExternalServiceFailure`].
    pub fn service(service: impl Into<String>, message: impl ToString) -> Self {
        QuizError::ExternalServiceFailure {
            service: service.into(),
            message: message.to_string(),
        }
    }
}

fn format_searched(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_missing_lists_every_path() {
        let e = QuizError::ResourceMissing {
            resource: "regular font".into(),
            searched: vec![
                PathBuf::from("fonts/dejavu-sans-ttf-2.37/DejaVuSans.ttf"),
                PathBuf::from("fonts/ttf/DejaVuSans.ttf"),
            ],
        };
        let msg = e.to_string();
        assert!(msg.contains("regular font"), "got: {msg}");
        assert!(msg.contains("fonts/ttf/DejaVuSans.ttf"), "got: {msg}");
        assert!(msg.contains("dejavu-sans-ttf-2.37"), "got: {msg}");
    }

    #[test]
    fn unsupported_model_selection_display() {
        let e = QuizError::UnsupportedModelSelection {
            tokens: 10_000,
            compact_max: 8192,
            standard_min: 16384,
        };
        let msg = e.to_string();
        assert!(msg.contains("10000"));
        assert!(msg.contains("8192"));
        assert!(msg.contains("16384"));
    }

    #[test]
    fn service_failure_keeps_backend_message() {
        let e = QuizError::service("embedding", "HTTP 401: invalid api key");
        assert_eq!(e.to_string(), "embedding failed: HTTP 401: invalid api key");
    }

    #[test]
    fn not_initialized_display() {
        assert!(QuizError::NotInitialized.to_string().contains("initialize()"));
    }
}
