//! Binding to the pdfium shared library.
//!
//! pdfium backs both PDF text extraction and PDF writing. The library is
//! looked up, in order, at `PDFIUM_LIB_PATH`, next to the working directory
//! and finally among the system libraries.

use crate::error::QuizError;
use pdfium_render::prelude::*;
use tracing::debug;

/// Bind to pdfium.
pub fn bind() -> Result<Pdfium, QuizError> {
    if let Ok(path) = std::env::var("PDFIUM_LIB_PATH") {
        if !path.is_empty() {
            debug!("Binding pdfium from PDFIUM_LIB_PATH={}", path);
            let bindings = Pdfium::bind_to_library(&path)
                .map_err(|e| QuizError::PdfiumBindingFailed(format!("{path}: {e:?}")))?;
            return Ok(Pdfium::new(bindings));
        }
    }

    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| QuizError::PdfiumBindingFailed(format!("{e:?}")))?;
    Ok(Pdfium::new(bindings))
}
