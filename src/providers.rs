//! Seams between the pipeline and the services it delegates to.
//!
//! Each trait has one required method and a narrow contract so tests can
//! swap in deterministic fakes and hosts can plug in other backends:
//!
//! | Trait | Contract | Default implementation |
//! |-------|----------|------------------------|
//! | [`DocumentLoader`] | path → [`Document`] | [`crate::pipeline::loader::FileLoader`] |
//! | [`TextSplitter`] | text → ordered [`Chunk`]s | [`crate::pipeline::split::CharacterSplitter`] |
//! | [`EmbeddingProvider`] | texts → one vector each | [`LlmEmbeddings`] |
//! | [`SimilarityIndex`] | query vector → top-k chunks | [`crate::pipeline::index::VectorIndex`] |
//! | [`CompletionProvider`] | prompt + model → text | [`LlmCompletion`] |
//!
//! The `Llm*` adapters route through `edgequake-llm`, which reads the usual
//! API key variables (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, …).

use crate::document::{Chunk, Document, ScoredChunk};
use crate::error::QuizError;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Loads a document's text from disk.
pub trait DocumentLoader: Send + Sync {
    /// Fails with [`QuizError::NotFound`] if `path` does not exist.
    fn load(&self, path: &Path) -> Result<Document, QuizError>;
}

/// Splits text into ordered, deterministic chunks.
pub trait TextSplitter: Send + Sync {
    fn split(&self, text: &str) -> Vec<Chunk>;
}

/// Produces one embedding per input text, in input order.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, QuizError>;

    /// Model that produces the vectors; recorded in the persisted index.
    fn model(&self) -> &str {
        "unspecified"
    }
}

/// Nearest-neighbour search over stored chunk embeddings.
pub trait SimilarityIndex: Send + Sync {
    /// At most `k` chunks, most similar first.
    ///
    /// Fails if `query` cannot be compared with the stored vectors.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>, QuizError>;
}

/// A single-shot completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: Option<usize>,
}

/// Sends a prompt to a hosted model and returns its text unchanged.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, QuizError>;
}

// ── edgequake-llm adapters ───────────────────────────────────────────────

/// [`EmbeddingProvider`] backed by an `edgequake-llm` embedding provider.
pub struct LlmEmbeddings {
    inner: Arc<dyn edgequake_llm::EmbeddingProvider>,
}

impl LlmEmbeddings {
    pub fn new(inner: Arc<dyn edgequake_llm::EmbeddingProvider>) -> Self {
        Self { inner }
    }

    /// Auto-detect the embedding provider from the environment.
    pub fn from_env() -> Result<Self, QuizError> {
        let (_llm, embedding) =
            ProviderFactory::from_env().map_err(|e| QuizError::ProviderNotConfigured {
                provider: "auto".to_string(),
                hint: format!(
                    "No embedding provider could be auto-detected from environment.\n\
                    Set OPENAI_API_KEY or configure a provider.\n\
                    Error: {}",
                    e
                ),
            })?;
        Ok(Self::new(embedding))
    }
}

#[async_trait]
impl EmbeddingProvider for LlmEmbeddings {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, QuizError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let vectors = self
            .inner
            .embed(texts)
            .await
            .map_err(|e| QuizError::service("embedding", e))?;
        if vectors.len() != texts.len() {
            return Err(QuizError::service(
                "embedding",
                format!("expected {} vectors, got {}", texts.len(), vectors.len()),
            ));
        }
        Ok(vectors)
    }

    fn model(&self) -> &str {
        self.inner.model()
    }
}

/// [`CompletionProvider`] backed by `edgequake-llm` chat providers.
///
/// A provider is created for every request so the model named in the
/// request is the one that answers. A preset provider (tests, custom
/// middleware) is used as-is and answers with its own model.
pub struct LlmCompletion {
    provider_name: Option<String>,
    preset: Option<Arc<dyn LLMProvider>>,
}

impl LlmCompletion {
    pub fn new(provider_name: Option<String>, preset: Option<Arc<dyn LLMProvider>>) -> Self {
        Self {
            provider_name,
            preset,
        }
    }
}

#[async_trait]
impl CompletionProvider for LlmCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, QuizError> {
        let provider = match self.preset {
            Some(ref p) => Arc::clone(p),
            None => resolve_chat_provider(self.provider_name.as_deref(), &request.model)?,
        };

        let messages = vec![ChatMessage::user(&request.prompt)];
        let options = CompletionOptions {
            temperature: Some(request.temperature),
            max_tokens: request.max_tokens,
            ..Default::default()
        };

        let response = provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| QuizError::service("completion", e))?;
        debug!(
            "{}: {} input tokens, {} output tokens",
            request.model, response.prompt_tokens, response.completion_tokens
        );
        Ok(response.content)
    }
}

/// Resolve a chat provider for `model`, from most-specific to least-specific.
///
/// 1. **Named provider** — `provider_name` (e.g. `"openai"`); the factory
///    reads that provider's API key from the environment.
/// 2. **Environment** — `EDGEQUAKE_LLM_PROVIDER` names the provider.
/// 3. **OpenAI key present** — use `"openai"`.
/// 4. **Full auto-detection** — `ProviderFactory::from_env`; the model name
///    is then the provider's default and `model` is ignored with a warning.
pub fn resolve_chat_provider(
    provider_name: Option<&str>,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, QuizError> {
    if let Some(name) = provider_name {
        return create_chat_provider(name, model);
    }

    if let Ok(prov) = std::env::var("EDGEQUAKE_LLM_PROVIDER") {
        if !prov.is_empty() {
            return create_chat_provider(&prov, model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            return create_chat_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| QuizError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or pass --provider.\n\
                Error: {}",
                e
            ),
        })?;

    warn!(
        "Auto-detected provider '{}' answers with its default model '{}', not '{}'. \
        Set --provider or EDGEQUAKE_LLM_PROVIDER to select '{}'.",
        llm_provider.name(),
        llm_provider.model(),
        model,
        model
    );
    Ok(llm_provider)
}

fn create_chat_provider(name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, QuizError> {
    ProviderFactory::create_llm_provider(name, model).map_err(|e| {
        QuizError::ProviderNotConfigured {
            provider: name.to_string(),
            hint: format!("{e}"),
        }
    })
}
