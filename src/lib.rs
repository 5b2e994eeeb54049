//! # docuquiz
//!
//! Turn a scanned page into a printable multiple-choice quiz.
//!
//! The text of the scan is recognised (vision model or tesseract), written
//! out as a clean PDF, indexed for retrieval, and handed to a chat model
//! that writes up to ten questions with an answer key. The quiz is laid
//! out as a branded PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! image
//!  │
//!  ├─ 1. OCR        vision LLM or tesseract → text + token estimate
//!  ├─ 2. Normalize  text → plain PDF (data_sets/document.pdf)
//!  ├─ 3. Index      load → split → embed → persist (quiz_vectorstore/)
//!  ├─ 4. Generate   pick model by token budget → retrieve → prompt
//!  ├─ 5. Polish     strip fences and Markdown markers
//!  └─ 6. Render     branded quiz PDF (docuquiz_results/docuquiz_quiz.pdf)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docuquiz::{run, ImageAnswer, QuizConfig, RunOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / …
//!     let config = QuizConfig::builder()
//!         .input_path("images/test.png")
//!         .build()?;
//!     if let RunOutcome::Completed(result) = run(&config, ImageAnswer::Yes).await? {
//!         eprintln!("quiz written to {}", result.output_path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docuquiz` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! ## Choosing a Model
//!
//! The generation model follows the document size, estimated at four
//! characters per token:
//!
//! | Token budget | Default model |
//! |--------------|---------------|
//! | none or ≤ 8192 | `gpt-4o-mini` |
//! | 16384 – 32767 | `gpt-5-mini` |
//! | ≥ 32768 | `gpt-5` |
//!
//! Budgets between 8192 and 16384 are rejected with
//! [`QuizError::UnsupportedModelSelection`].

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod document;
pub mod error;
pub mod pdfium;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod providers;
pub mod quiz;
pub mod render;
pub mod run;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{FontConfig, ModelTiers, OcrEngine, QuizConfig, QuizConfigBuilder};
pub use document::{estimate_tokens, Chunk, Document, Page, ScoredChunk};
pub use error::QuizError;
pub use pipeline::index::{IndexBuilder, VectorIndex};
pub use pipeline::ocr::{extract_text, Extraction};
pub use progress::{NoopProgressCallback, ProgressCallback, QuizProgressCallback, Stage};
pub use providers::{
    CompletionProvider, CompletionRequest, DocumentLoader, EmbeddingProvider, SimilarityIndex,
    TextSplitter,
};
pub use quiz::{QuizBot, Services};
pub use render::{render, render_plain};
pub use run::{run, run_sync, run_with, ImageAnswer, QuizRun, RunOutcome};
