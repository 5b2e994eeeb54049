//! Retrieval index: build once, persist, reload, search.
//!
//! The index is a flat list of `(chunk, embedding)` pairs searched
//! exhaustively by cosine similarity. Quiz documents are a handful of pages,
//! so a few hundred vectors at most; a linear scan answers in microseconds
//! and keeps the on-disk format a single JSON file.
//!
//! ## Lifecycle
//!
//! ```text
//! build_or_load(paths, dir, reset)
//!   ├─ no index.json, or reset ─────────▶ load docs ─▶ split ─▶ embed ─▶ save (tmp + rename)
//!   ├─ index.json from another model ───▶ (same rebuild)
//!   └─ always ──────────────────────────▶ load index.json ─▶ VectorIndex
//! ```
//!
//! The save writes `index.json.tmp` and renames it over `index.json`, so a
//! build that fails halfway leaves the previous index intact.
//!
//! Vectors from different embedding models cannot be compared, so the
//! index records the model that produced them and a query vector of the
//! wrong length is an error rather than a list of zero scores.

use crate::document::{Chunk, ScoredChunk};
use crate::error::QuizError;
use crate::pipeline::loader::load_blocking;
use crate::progress::ProgressCallback;
use crate::providers::{DocumentLoader, EmbeddingProvider, SimilarityIndex, TextSplitter};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// File name of the persisted index inside the index directory.
pub const INDEX_FILE: &str = "index.json";

/// Bumped whenever the persisted layout changes.
const FORMAT_VERSION: u32 = 2;

/// Chunks sent to the embedding service per request.
const EMBED_BATCH_SIZE: usize = 64;

/// A chunk and its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// In-memory form of the persisted index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndex {
    version: u32,
    created_at: DateTime<Utc>,
    embedding_model: String,
    sources: Vec<PathBuf>,
    dimension: usize,
    entries: Vec<IndexedChunk>,
    /// File the index was loaded from, for error messages.
    #[serde(skip)]
    location: Option<PathBuf>,
}

impl VectorIndex {
    /// Assemble an index, checking every embedding has the same length.
    pub fn new(
        sources: Vec<PathBuf>,
        embedding_model: impl Into<String>,
        entries: Vec<IndexedChunk>,
    ) -> Result<Self, QuizError> {
        let dimension = entries.first().map(|e| e.embedding.len()).unwrap_or(0);
        if let Some(bad) = entries.iter().find(|e| e.embedding.len() != dimension) {
            return Err(QuizError::service(
                "embedding",
                format!(
                    "inconsistent embedding dimension: chunk {} has {}, expected {}",
                    bad.chunk.ordinal,
                    bad.embedding.len(),
                    dimension
                ),
            ));
        }
        Ok(Self {
            version: FORMAT_VERSION,
            created_at: Utc::now(),
            embedding_model: embedding_model.into(),
            sources,
            dimension,
            entries,
            location: None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Embedding model the stored vectors came from.
    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    /// Stored chunks in split order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.entries.iter().map(|e| &e.chunk)
    }

    /// Path of the index file inside `dir`.
    pub fn file_path(dir: &Path) -> PathBuf {
        dir.join(INDEX_FILE)
    }

    pub fn exists(dir: &Path) -> bool {
        Self::file_path(dir).is_file()
    }

    /// Persist atomically: write to a temp file, then rename over the index.
    pub async fn save(&self, dir: &Path) -> Result<(), QuizError> {
        let final_path = Self::file_path(dir);
        let write_err = |source| QuizError::OutputWriteFailed {
            path: final_path.clone(),
            source,
        };

        tokio::fs::create_dir_all(dir).await.map_err(write_err)?;

        let data = serde_json::to_vec(self)
            .map_err(|e| QuizError::Internal(format!("index serialisation: {e}")))?;

        let tmp_path = final_path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, data).await.map_err(write_err)?;
        tokio::fs::rename(&tmp_path, &final_path)
            .await
            .map_err(write_err)?;

        debug!("Saved {} chunks to {}", self.len(), final_path.display());
        Ok(())
    }

    /// Load and validate the index persisted in `dir`.
    pub async fn load(dir: &Path) -> Result<Self, QuizError> {
        let path = Self::file_path(dir);
        let data = match tokio::fs::read(&path).await {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(QuizError::NotFound { path });
            }
            Err(e) => {
                return Err(QuizError::IndexCorrupt {
                    path,
                    detail: e.to_string(),
                })
            }
        };

        let mut index: VectorIndex =
            serde_json::from_slice(&data).map_err(|e| QuizError::IndexCorrupt {
                path: path.clone(),
                detail: e.to_string(),
            })?;

        if index.version != FORMAT_VERSION {
            return Err(QuizError::IndexCorrupt {
                path,
                detail: format!(
                    "format version {} (this build reads {})",
                    index.version, FORMAT_VERSION
                ),
            });
        }
        if let Some(bad) = index
            .entries
            .iter()
            .find(|e| e.embedding.len() != index.dimension)
        {
            return Err(QuizError::IndexCorrupt {
                path,
                detail: format!(
                    "chunk {} has a {}-dimensional embedding, index declares {}",
                    bad.chunk.ordinal,
                    bad.embedding.len(),
                    index.dimension
                ),
            });
        }

        debug!(
            "Loaded {} chunks ({}) from {}",
            index.len(),
            index.embedding_model,
            path.display()
        );
        index.location = Some(path);
        Ok(index)
    }
}

impl SimilarityIndex for VectorIndex {
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>, QuizError> {
        if !self.is_empty() && query.len() != self.dimension {
            return Err(QuizError::IndexCorrupt {
                path: self
                    .location
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(INDEX_FILE)),
                detail: format!(
                    "query embedding has {} dimensions but the index stores {} \
                    (built with '{}')",
                    query.len(),
                    self.dimension,
                    self.embedding_model
                ),
            });
        }

        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|e| ScoredChunk {
                chunk: e.chunk.clone(),
                score: cosine_similarity(query, &e.embedding),
            })
            .collect();

        // Stable: equal scores keep split order.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        Ok(scored)
    }
}

/// Cosine similarity in `[-1, 1]`.
///
/// Returns 0.0 for empty or mismatched vectors and near-zero norms.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a < 1e-8 || norm_b < 1e-8 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Builds the index from documents using the injected services.
pub struct IndexBuilder {
    loader: Arc<dyn DocumentLoader>,
    splitter: Arc<dyn TextSplitter>,
    embedder: Arc<dyn EmbeddingProvider>,
    progress: Option<ProgressCallback>,
}

impl IndexBuilder {
    pub fn new(
        loader: Arc<dyn DocumentLoader>,
        splitter: Arc<dyn TextSplitter>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            loader,
            splitter,
            embedder,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: Option<ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Build the index if it is missing, `reset` is set or it was embedded
    /// with another model, then always reload it from disk.
    pub async fn build_or_load(
        &self,
        paths: &[PathBuf],
        index_dir: &Path,
        reset: bool,
    ) -> Result<VectorIndex, QuizError> {
        let rebuild = if reset {
            info!("Rebuilding index in {}", index_dir.display());
            true
        } else if !VectorIndex::exists(index_dir) {
            info!("No index in {}, building one", index_dir.display());
            true
        } else {
            let existing = VectorIndex::load(index_dir).await?;
            let current = self.embedder.model();
            if existing.embedding_model() != current {
                warn!(
                    "Index in {} was embedded with '{}', current model is '{}'; rebuilding",
                    index_dir.display(),
                    existing.embedding_model(),
                    current
                );
                true
            } else {
                info!("Reusing index in {}", index_dir.display());
                false
            }
        };

        if rebuild {
            let index = self.build(paths).await?;
            index.save(index_dir).await?;
        }
        VectorIndex::load(index_dir).await
    }

    /// Load, split and embed `paths` into a fresh in-memory index.
    pub async fn build(&self, paths: &[PathBuf]) -> Result<VectorIndex, QuizError> {
        let mut texts = Vec::with_capacity(paths.len());
        for path in paths {
            if !path.exists() {
                return Err(QuizError::NotFound { path: path.clone() });
            }
            let doc = load_blocking(Arc::clone(&self.loader), path.clone()).await?;
            debug!("Loaded {} ({} pages)", path.display(), doc.pages.len());
            texts.push(doc.text());
        }

        let chunks = self.splitter.split(&texts.join("\n"));
        if chunks.is_empty() {
            return Err(QuizError::UnsupportedInput {
                path: paths.first().cloned().unwrap_or_default(),
                detail: "the document contains no text to index".into(),
            });
        }
        info!("Split {} document(s) into {} chunks", paths.len(), chunks.len());

        let total = chunks.len();
        let mut entries = Vec::with_capacity(total);
        for batch in chunks.chunks(EMBED_BATCH_SIZE) {
            let inputs: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = self.embedder.embed(&inputs).await?;
            if vectors.len() != batch.len() {
                return Err(QuizError::service(
                    "embedding",
                    format!("expected {} vectors, got {}", batch.len(), vectors.len()),
                ));
            }
            entries.extend(
                batch
                    .iter()
                    .cloned()
                    .zip(vectors)
                    .map(|(chunk, embedding)| IndexedChunk { chunk, embedding }),
            );
            if let Some(ref cb) = self.progress {
                cb.on_chunks_embedded(entries.len(), total);
            }
        }

        VectorIndex::new(paths.to_vec(), self.embedder.model(), entries)
    }
}

/// Embed `query` and return the `k` most similar chunks, best first.
pub async fn retrieve(
    index: &dyn SimilarityIndex,
    embedder: &dyn EmbeddingProvider,
    query: &str,
    k: usize,
) -> Result<Vec<Chunk>, QuizError> {
    let mut vectors = embedder.embed(&[query.to_string()]).await?;
    let query_vec = vectors
        .pop()
        .ok_or_else(|| QuizError::service("embedding", "no vector returned for the query"))?;

    let hits = index.search(&query_vec, k)?;
    debug!(
        "Retrieved {} chunks (best score {:.3})",
        hits.len(),
        hits.first().map(|h| h.score).unwrap_or(0.0)
    );
    Ok(hits.into_iter().map(|h| h.chunk).collect())
}
