//! Pipeline stages for image-to-quiz generation.
//!
//! Each submodule implements one transformation step and is testable on
//! its own; the orchestration lives in [`crate::run`].
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ ocr ──▶ (render_plain) ──▶ loader ──▶ split ──▶ index ──▶ llm ──▶ postprocess
//! (path)  (vision/   (normalized PDF)  (pdfium)   (chars)   (embed,   (tier,  (cleanup)
//!          tesseract)                                        persist)  prompt)
//! ```
//!
//! 1. [`input`]  — classify the user-supplied file by its magic bytes
//! 2. [`ocr`]    — turn a scanned image into text; [`encode`] prepares the
//!    image for vision models
//! 3. [`loader`] — read text back out of the normalized PDF
//! 4. [`split`]  — deterministic overlapping character chunks
//! 5. [`index`]  — embed chunks, persist them, search by cosine similarity
//! 6. [`llm`]    — choose the model for the token budget and ask for a quiz
//! 7. [`postprocess`] — strip Markdown syntax the PDF would print literally

pub mod encode;
pub mod index;
pub mod input;
pub mod llm;
pub mod loader;
pub mod ocr;
pub mod postprocess;
pub mod split;
