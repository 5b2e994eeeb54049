//! The quiz bot: a retrieval index plus a completion model.
//!
//! [`QuizBot::new`] only records what to index and which services to use.
//! [`QuizBot::initialize`] builds or reloads the index; [`QuizBot::query`]
//! retrieves context and asks the model for a quiz. Querying an
//! uninitialized bot is an error rather than an implicit build.

use crate::config::QuizConfig;
use crate::error::QuizError;
use crate::pipeline::index::{IndexBuilder, VectorIndex};
use crate::pipeline::llm::{self, GenerationSettings};
use crate::pipeline::loader::FileLoader;
use crate::pipeline::split::CharacterSplitter;
use crate::progress::ProgressCallback;
use crate::providers::{
    CompletionProvider, DocumentLoader, EmbeddingProvider, LlmCompletion, LlmEmbeddings,
    TextSplitter,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// The services a [`QuizBot`] delegates to.
#[derive(Clone)]
pub struct Services {
    pub loader: Arc<dyn DocumentLoader>,
    pub splitter: Arc<dyn TextSplitter>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub completion: Arc<dyn CompletionProvider>,
}

impl Services {
    /// File loader, character splitter and `edgequake-llm` backed models.
    ///
    /// Reads provider settings from the environment but makes no request.
    pub fn from_config(config: &QuizConfig) -> Result<Self, QuizError> {
        Ok(Self {
            loader: Arc::new(FileLoader),
            splitter: Arc::new(CharacterSplitter::new(
                config.chunk_size,
                config.chunk_overlap,
            )),
            embedder: Arc::new(LlmEmbeddings::from_env()?),
            completion: Arc::new(LlmCompletion::new(
                config.provider_name.clone(),
                config.provider.clone(),
            )),
        })
    }
}

/// Answers questions about a fixed set of documents.
pub struct QuizBot {
    paths: Vec<PathBuf>,
    index_dir: PathBuf,
    reset: bool,
    settings: GenerationSettings,
    services: Services,
    progress: Option<ProgressCallback>,
    index: Option<VectorIndex>,
}

impl QuizBot {
    /// Record the documents, index location and services. No I/O.
    pub fn new(
        paths: Vec<PathBuf>,
        index_dir: impl Into<PathBuf>,
        reset: bool,
        settings: GenerationSettings,
        services: Services,
    ) -> Self {
        Self {
            paths,
            index_dir: index_dir.into(),
            reset,
            settings,
            services,
            progress: None,
            index: None,
        }
    }

    /// A bot over `paths` configured from `config`.
    pub fn from_config(paths: Vec<PathBuf>, config: &QuizConfig) -> Result<Self, QuizError> {
        Ok(Self::with_services(paths, config, Services::from_config(config)?))
    }

    /// A bot over `paths` configured from `config`, using `services`.
    pub fn with_services(paths: Vec<PathBuf>, config: &QuizConfig, services: Services) -> Self {
        Self::new(
            paths,
            config.index_dir.clone(),
            config.reset_index,
            GenerationSettings::from_config(config),
            services,
        )
        .with_progress(config.progress_callback.clone())
    }

    pub fn with_progress(mut self, progress: Option<ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.index.is_some()
    }

    /// Build (or reload) the index. Later calls return the loaded index.
    pub async fn initialize(&mut self) -> Result<&VectorIndex, QuizError> {
        if self.index.is_none() {
            let builder = IndexBuilder::new(
                Arc::clone(&self.services.loader),
                Arc::clone(&self.services.splitter),
                Arc::clone(&self.services.embedder),
            )
            .with_progress(self.progress.clone());
            let index = builder
                .build_or_load(&self.paths, &self.index_dir, self.reset)
                .await?;
            info!("Quiz bot ready: {} chunks indexed", index.len());
            self.index = Some(index);
        }
        self.index.as_ref().ok_or(QuizError::NotInitialized)
    }

    /// Ask for a quiz about the indexed documents.
    ///
    /// `token_budget` picks the model tier; see [`crate::pipeline::llm`].
    pub async fn query(
        &self,
        question: &str,
        token_budget: Option<usize>,
    ) -> Result<String, QuizError> {
        let index = self.index.as_ref().ok_or(QuizError::NotInitialized)?;
        llm::generate(
            index,
            self.services.embedder.as_ref(),
            self.services.completion.as_ref(),
            question,
            token_budget,
            &self.settings,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelTiers;
    use crate::providers::CompletionRequest;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct LengthEmbedder;

    #[async_trait]
    impl EmbeddingProvider for LengthEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, QuizError> {
            Ok(texts
                .iter()
                .map(|t| vec![t.len() as f32, 1.0])
                .collect())
        }
    }

    #[derive(Default)]
    struct RecordingCompletion {
        requests: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl CompletionProvider for RecordingCompletion {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, QuizError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok("1. Question?\na) A\nb) B\nc) C\nd) D\n\nQuestion #1 Answer: A".into())
        }
    }

    fn settings() -> GenerationSettings {
        GenerationSettings {
            models: ModelTiers::default(),
            top_k: 4,
            temperature: 0.0,
            max_tokens: None,
        }
    }

    fn bot(paths: Vec<PathBuf>, dir: PathBuf, completion: Arc<RecordingCompletion>) -> QuizBot {
        QuizBot::new(
            paths,
            dir,
            true,
            settings(),
            Services {
                loader: Arc::new(FileLoader),
                splitter: Arc::new(CharacterSplitter::default()),
                embedder: Arc::new(LengthEmbedder),
                completion,
            },
        )
    }

    #[test]
    fn query_before_initialize_fails() {
        let dir = tempfile::tempdir().unwrap();
        let bot = bot(
            vec![dir.path().join("doc.txt")],
            dir.path().join("index"),
            Arc::new(RecordingCompletion::default()),
        );
        let err = tokio_test::block_on(bot.query("Make me a quiz", None)).unwrap_err();
        assert!(matches!(err, QuizError::NotInitialized));
        assert!(!dir.path().join("index").exists());
    }

    #[tokio::test]
    async fn initialize_is_idempotent_and_query_uses_compact_model() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("doc.txt");
        std::fs::write(&doc, "Photosynthesis turns light into chemical energy.").unwrap();
        let completion = Arc::new(RecordingCompletion::default());
        let mut bot = bot(vec![doc], dir.path().join("index"), Arc::clone(&completion));

        assert_eq!(bot.initialize().await.unwrap().len(), 1);
        assert_eq!(bot.initialize().await.unwrap().len(), 1);
        assert!(bot.is_initialized());

        let quiz = bot.query("Make me a quiz", Some(12)).await.unwrap();
        assert!(quiz.contains("Question #1 Answer"));

        let requests = completion.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "gpt-4o-mini");
        assert!(requests[0].prompt.contains("Photosynthesis"));
    }
}
