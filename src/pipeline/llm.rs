//! Quiz generation: pick a model for the token budget, retrieve context,
//! fill the prompt, call the model once.
//!
//! ## Model tiers
//!
//! | Token budget | Tier |
//! |--------------|------|
//! | none, or ≤ 8192 | compact |
//! | 16384 – 32767 | standard |
//! | ≥ 32768 | large |
//! | 8193 – 16383 | [`QuizError::UnsupportedModelSelection`] |
//!
//! The gap between compact and standard is not covered by any model on
//! purpose: a budget there is reported instead of being routed to a guess.
//! The tier is chosen again on every call.

use crate::config::{ModelTiers, QuizConfig};
use crate::document::Chunk;
use crate::error::QuizError;
use crate::pipeline::index::retrieve;
use crate::prompts::{quiz_prompt, CONTEXT_SEPARATOR};
use crate::providers::{CompletionProvider, CompletionRequest, EmbeddingProvider, SimilarityIndex};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info};

/// Largest budget served by the compact tier.
pub const COMPACT_MAX_TOKENS: usize = 8192;
/// Smallest budget served by the standard tier.
pub const STANDARD_MIN_TOKENS: usize = 16384;
/// Smallest budget served by the large tier.
pub const LARGE_MIN_TOKENS: usize = 32768;

/// Model size class chosen from the token budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    Compact,
    Standard,
    Large,
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModelTier::Compact => "compact",
            ModelTier::Standard => "standard",
            ModelTier::Large => "large",
        };
        f.write_str(s)
    }
}

/// Map a token budget to a tier.
pub fn select_tier(token_budget: Option<usize>) -> Result<ModelTier, QuizError> {
    match token_budget {
        None => Ok(ModelTier::Compact),
        Some(t) if t <= COMPACT_MAX_TOKENS => Ok(ModelTier::Compact),
        Some(t) if t >= LARGE_MIN_TOKENS => Ok(ModelTier::Large),
        Some(t) if t >= STANDARD_MIN_TOKENS => Ok(ModelTier::Standard),
        Some(t) => Err(QuizError::UnsupportedModelSelection {
            tokens: t,
            compact_max: COMPACT_MAX_TOKENS,
            standard_min: STANDARD_MIN_TOKENS,
        }),
    }
}

/// Map a token budget to a model name from `tiers`.
pub fn select_model(token_budget: Option<usize>, tiers: &ModelTiers) -> Result<String, QuizError> {
    let tier = select_tier(token_budget)?;
    let model = match tier {
        ModelTier::Compact => &tiers.compact,
        ModelTier::Standard => &tiers.standard,
        ModelTier::Large => &tiers.large,
    };
    info!(
        "Token budget {} → {} tier ({})",
        token_budget.map_or_else(|| "unknown".to_string(), |t| t.to_string()),
        tier,
        model
    );
    Ok(model.clone())
}

/// Join retrieved chunks into the prompt's context slot.
pub fn build_context(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(|c| c.text.trim())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Generation knobs that are fixed for a run.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub models: ModelTiers,
    pub top_k: usize,
    pub temperature: f32,
    pub max_tokens: Option<usize>,
}

impl GenerationSettings {
    pub fn from_config(config: &QuizConfig) -> Self {
        Self {
            models: config.models.clone(),
            top_k: config.top_k,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Retrieve context for `question` and ask the selected model for a quiz.
///
/// The model's text is returned unchanged; an empty answer is an error
/// because it would otherwise render as a blank quiz.
pub async fn generate(
    index: &dyn SimilarityIndex,
    embedder: &dyn EmbeddingProvider,
    completion: &dyn CompletionProvider,
    question: &str,
    token_budget: Option<usize>,
    settings: &GenerationSettings,
) -> Result<String, QuizError> {
    let model = select_model(token_budget, &settings.models)?;

    let chunks = retrieve(index, embedder, question, settings.top_k).await?;
    let context = build_context(&chunks);
    debug!(
        "Context: {} chunks, {} chars",
        chunks.len(),
        context.chars().count()
    );

    let request = CompletionRequest {
        model,
        prompt: quiz_prompt(&context, question),
        temperature: settings.temperature,
        max_tokens: settings.max_tokens,
    };

    let start = Instant::now();
    let answer = completion.complete(&request).await?;
    info!(
        "{} answered with {} chars in {}ms",
        request.model,
        answer.chars().count(),
        start.elapsed().as_millis()
    );

    if answer.trim().is_empty() {
        return Err(QuizError::service(
            "completion",
            format!("{} returned an empty answer", request.model),
        ));
    }
    Ok(answer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        assert_eq!(select_tier(None).unwrap(), ModelTier::Compact);
        assert_eq!(select_tier(Some(0)).unwrap(), ModelTier::Compact);
        assert_eq!(select_tier(Some(8192)).unwrap(), ModelTier::Compact);
        assert_eq!(select_tier(Some(16384)).unwrap(), ModelTier::Standard);
        assert_eq!(select_tier(Some(32767)).unwrap(), ModelTier::Standard);
        assert_eq!(select_tier(Some(32768)).unwrap(), ModelTier::Large);
        assert_eq!(select_tier(Some(1_000_000)).unwrap(), ModelTier::Large);
    }

    #[test]
    fn gap_is_an_explicit_error() {
        for t in [8193, 10_000, 16383] {
            match select_tier(Some(t)) {
                Err(QuizError::UnsupportedModelSelection { tokens, .. }) => assert_eq!(tokens, t),
                other => panic!("budget {t}: expected gap error, got {other:?}"),
            }
        }
    }

    #[test]
    fn model_names_come_from_tiers() {
        let tiers = ModelTiers::default();
        assert_eq!(select_model(None, &tiers).unwrap(), "gpt-4o-mini");
        assert_eq!(select_model(Some(8192), &tiers).unwrap(), "gpt-4o-mini");
        assert_eq!(select_model(Some(16384), &tiers).unwrap(), "gpt-5-mini");
        assert_eq!(select_model(Some(32768), &tiers).unwrap(), "gpt-5");

        let custom = ModelTiers {
            compact: "small".into(),
            standard: "medium".into(),
            large: "big".into(),
        };
        assert_eq!(select_model(Some(40_000), &custom).unwrap(), "big");
    }

    #[test]
    fn context_joins_trimmed_chunks() {
        let chunks = vec![
            Chunk { ordinal: 0, start: 0, text: " alpha \n".into() },
            Chunk { ordinal: 1, start: 8, text: "beta".into() },
        ];
        assert_eq!(build_context(&chunks), "alpha\n\nbeta");
        assert_eq!(build_context(&[]), "");
    }
}
