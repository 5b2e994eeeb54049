//! Configuration types for the quiz pipeline.
//!
//! Every knob lives in [`QuizConfig`], built via [`QuizConfigBuilder`]. The
//! defaults reproduce the stock layout of a docuquiz checkout: `images/`,
//! `data_sets/`, `logo/`, `fonts/` and `docuquiz_results/` relative to the
//! working directory, and an index persisted under `quiz_vectorstore/`.

use crate::error::QuizError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Directory the retrieval index is persisted under.
pub const DEFAULT_INDEX_DIR: &str = "quiz_vectorstore";

/// The question sent to the quiz pipeline by the orchestrator.
pub const DEFAULT_QUESTION: &str = "Make me a quiz based on the document.";

/// Configuration for a quiz run.
///
/// Built via [`QuizConfig::builder()`] or using [`QuizConfig::default()`].
///
/// # Example
/// ```rust
/// use docuquiz::QuizConfig;
///
/// let config = QuizConfig::builder()
///     .input_path("images/test.png")
///     .top_k(6)
///     .reset_index(false)
///     .build()
///     .unwrap();
/// assert_eq!(config.chunk_size, 2000);
/// ```
#[derive(Clone)]
pub struct QuizConfig {
    /// Document to quiz on: a scanned image or a PDF. Default: `images/test.png`.
    pub input_path: PathBuf,

    /// Where the OCR text is written as a normalized PDF before indexing.
    /// Default: `data_sets/document.pdf`.
    pub document_path: PathBuf,

    /// Quiz PDF output. Default: `docuquiz_results/docuquiz_quiz.pdf`.
    pub output_path: PathBuf,

    /// Logo drawn at both ends of the quiz header. Default: `logo/docuquiz_logo_transparent.png`.
    pub logo_path: PathBuf,

    /// Directory holding the persisted retrieval index. Default: `quiz_vectorstore`.
    pub index_dir: PathBuf,

    /// Rebuild the index even if one is already persisted. Default: true.
    pub reset_index: bool,

    /// Font files tried in order when the renderer registers its fonts.
    pub fonts: FontConfig,

    /// Model names per token-budget tier.
    pub models: ModelTiers,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None, the provider is auto-detected from the environment.
    pub provider_name: Option<String>,

    /// Pre-constructed chat provider. Takes precedence over `provider_name`
    /// and ignores the per-tier model names.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// OCR backend used for image inputs. Default: [`OcrEngine::Vision`].
    pub ocr: OcrEngine,

    /// Vision model used by [`OcrEngine::Vision`]. Default: `gpt-4o-mini`.
    pub ocr_model: String,

    /// Sampling temperature for quiz generation and vision OCR. Default: 0.0.
    pub temperature: f32,

    /// Cap on generated tokens. None leaves it to the provider. Default: None.
    pub max_tokens: Option<usize>,

    /// Maximum fresh characters per chunk. Default: 2000.
    pub chunk_size: usize,

    /// Characters carried over from the previous chunk. Default: 50.
    pub chunk_overlap: usize,

    /// Number of chunks retrieved as context. Default: 4.
    pub top_k: usize,

    /// Question sent to the quiz pipeline. Default: [`DEFAULT_QUESTION`].
    pub question: String,

    /// Receives stage events while the orchestrator runs.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("images/test.png"),
            document_path: PathBuf::from("data_sets/document.pdf"),
            output_path: PathBuf::from("docuquiz_results/docuquiz_quiz.pdf"),
            logo_path: PathBuf::from("logo/docuquiz_logo_transparent.png"),
            index_dir: PathBuf::from(DEFAULT_INDEX_DIR),
            reset_index: true,
            fonts: FontConfig::default(),
            models: ModelTiers::default(),
            provider_name: None,
            provider: None,
            ocr: OcrEngine::default(),
            ocr_model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            max_tokens: None,
            chunk_size: 2000,
            chunk_overlap: 50,
            top_k: 4,
            question: DEFAULT_QUESTION.to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for QuizConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizConfig")
            .field("input_path", &self.input_path)
            .field("document_path", &self.document_path)
            .field("output_path", &self.output_path)
            .field("logo_path", &self.logo_path)
            .field("index_dir", &self.index_dir)
            .field("reset_index", &self.reset_index)
            .field("fonts", &self.fonts)
            .field("models", &self.models)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("ocr", &self.ocr)
            .field("ocr_model", &self.ocr_model)
            .field("temperature", &self.temperature)
            .field("chunk_size", &self.chunk_size)
            .field("chunk_overlap", &self.chunk_overlap)
            .field("top_k", &self.top_k)
            .finish()
    }
}

impl QuizConfig {
    /// Create a new builder for `QuizConfig`.
    pub fn builder() -> QuizConfigBuilder {
        QuizConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`QuizConfig`].
#[derive(Debug)]
pub struct QuizConfigBuilder {
    config: QuizConfig,
}

impl QuizConfigBuilder {
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.input_path = path.into();
        self
    }

    pub fn document_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.document_path = path.into();
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = path.into();
        self
    }

    pub fn logo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.logo_path = path.into();
        self
    }

    pub fn index_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.index_dir = dir.into();
        self
    }

    pub fn reset_index(mut self, v: bool) -> Self {
        self.config.reset_index = v;
        self
    }

    pub fn fonts(mut self, fonts: FontConfig) -> Self {
        self.config.fonts = fonts;
        self
    }

    pub fn models(mut self, models: ModelTiers) -> Self {
        self.config.models = models;
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn ocr(mut self, engine: OcrEngine) -> Self {
        self.config.ocr = engine;
        self
    }

    pub fn ocr_model(mut self, model: impl Into<String>) -> Self {
        self.config.ocr_model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = Some(n);
        self
    }

    pub fn chunk_size(mut self, n: usize) -> Self {
        self.config.chunk_size = n;
        self
    }

    pub fn chunk_overlap(mut self, n: usize) -> Self {
        self.config.chunk_overlap = n;
        self
    }

    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k.max(1);
        self
    }

    pub fn question(mut self, q: impl Into<String>) -> Self {
        self.config.question = q.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<QuizConfig, QuizError> {
        let c = &self.config;
        if c.chunk_size == 0 {
            return Err(QuizError::InvalidConfig("chunk size must be ≥ 1".into()));
        }
        if c.chunk_overlap >= c.chunk_size {
            return Err(QuizError::InvalidConfig(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                c.chunk_overlap, c.chunk_size
            )));
        }
        if c.question.trim().is_empty() {
            return Err(QuizError::InvalidConfig("question must not be empty".into()));
        }
        if c.fonts.regular.is_empty() {
            return Err(QuizError::InvalidConfig(
                "at least one regular font path is required".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Nested settings ──────────────────────────────────────────────────────

/// Font fallback lists. The first existing file in each list wins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontConfig {
    pub regular: Vec<PathBuf>,
    pub bold: Vec<PathBuf>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            regular: vec![
                PathBuf::from("fonts/dejavu-sans-ttf-2.37/DejaVuSans.ttf"),
                PathBuf::from("fonts/ttf/DejaVuSans.ttf"),
            ],
            bold: vec![
                PathBuf::from("fonts/dejavu-sans-ttf-2.37/DejaVuSans-Bold.ttf"),
                PathBuf::from("fonts/ttf/DejaVuSans-Bold.ttf"),
            ],
        }
    }
}

/// Model name for each token-budget tier.
///
/// | Tier | Budget | Default |
/// |------|--------|---------|
/// | compact  | none or ≤ 8192 | `gpt-4o-mini` |
/// | standard | 16384 – 32767 | `gpt-5-mini` |
/// | large    | ≥ 32768 | `gpt-5` |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelTiers {
    pub compact: String,
    pub standard: String,
    pub large: String,
}

impl Default for ModelTiers {
    fn default() -> Self {
        Self {
            compact: "gpt-4o-mini".to_string(),
            standard: "gpt-5-mini".to_string(),
            large: "gpt-5".to_string(),
        }
    }
}

/// OCR backend for image inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OcrEngine {
    /// Transcribe the image with a vision-capable chat model. (default)
    #[default]
    Vision,
    /// Run the tesseract executable at `binary`.
    Tesseract { binary: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_layout() {
        let c = QuizConfig::default();
        assert_eq!(c.chunk_size, 2000);
        assert_eq!(c.chunk_overlap, 50);
        assert_eq!(c.temperature, 0.0);
        assert_eq!(c.index_dir, PathBuf::from("quiz_vectorstore"));
        assert!(c.reset_index);
        assert_eq!(c.question, DEFAULT_QUESTION);
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk() {
        let err = QuizConfig::builder()
            .chunk_size(100)
            .chunk_overlap(100)
            .build()
            .unwrap_err();
        assert!(matches!(err, QuizError::InvalidConfig(_)));
    }

    #[test]
    fn top_k_is_at_least_one() {
        let c = QuizConfig::builder().top_k(0).build().unwrap();
        assert_eq!(c.top_k, 1);
    }

    #[test]
    fn empty_font_list_rejected() {
        let err = QuizConfig::builder()
            .fonts(FontConfig {
                regular: vec![],
                bold: vec![],
            })
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("regular font"));
    }

    #[test]
    fn debug_hides_provider() {
        let s = format!("{:?}", QuizConfig::default());
        assert!(s.contains("QuizConfig"));
        assert!(s.contains("quiz_vectorstore"));
    }
}
