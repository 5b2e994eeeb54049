//! End-to-end orchestration of one quiz run.
//!
//! ```text
//! answer 'y' ─▶ OCR image ─▶ render_plain(document_path) ─┐
//! answer 'n' ─▶ load input text ──────────────────────────┤
//!                                                          ▼
//!                      QuizBot::initialize ─▶ query ─▶ clean ─▶ render(output_path)
//! ```
//!
//! Every stage is awaited before the next starts and any failure ends the
//! run. The token budget that selects the model comes from the extracted
//! or loaded text.

use crate::config::QuizConfig;
use crate::document::estimate_tokens;
use crate::error::QuizError;
use crate::pipeline::loader::load_blocking;
use crate::pipeline::{ocr, postprocess};
use crate::progress::Stage;
use crate::quiz::{QuizBot, Services};
use crate::render;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Answer to "Is your file an image? (y/n/exit)".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageAnswer {
    /// OCR the input image first.
    Yes,
    /// The input is already a PDF or text document.
    No,
    /// Stop without doing anything.
    Exit,
}

impl FromStr for ImageAnswer {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Ok(ImageAnswer::Yes),
            "n" | "no" => Ok(ImageAnswer::No),
            "exit" => Ok(ImageAnswer::Exit),
            other => Err(QuizError::InvalidConfig(format!(
                "expected 'y', 'n' or 'exit', got '{other}'"
            ))),
        }
    }
}

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct QuizRun {
    /// Cleaned quiz text, as rendered.
    pub quiz: String,
    /// Document that was indexed.
    pub document_path: PathBuf,
    pub output_path: PathBuf,
    pub token_budget: Option<usize>,
    pub duration_ms: u64,
}

/// Result of [`run`].
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Completed(QuizRun),
    /// The user answered `exit`; nothing was read or written.
    Exited,
}

/// Run the pipeline with services built from `config`.
pub async fn run(config: &QuizConfig, answer: ImageAnswer) -> Result<RunOutcome, QuizError> {
    if answer == ImageAnswer::Exit {
        return Ok(RunOutcome::Exited);
    }
    let services = Services::from_config(config)?;
    run_with(config, answer, services).await
}

/// Run the pipeline with explicit services.
pub async fn run_with(
    config: &QuizConfig,
    answer: ImageAnswer,
    services: Services,
) -> Result<RunOutcome, QuizError> {
    let start = Instant::now();
    let progress = config.progress_callback.clone();
    let stage_start = |stage: Stage| {
        if let Some(ref cb) = progress {
            cb.on_stage_start(stage);
        }
    };
    let stage_done = |stage: Stage, detail: &str| {
        if let Some(ref cb) = progress {
            cb.on_stage_complete(stage, detail);
        }
    };

    // ── Step 1: Obtain the document text ─────────────────────────────────
    let (document_path, tokens) = match answer {
        ImageAnswer::Exit => return Ok(RunOutcome::Exited),
        ImageAnswer::Yes => {
            stage_start(Stage::Ocr);
            let extraction = ocr::extract_text(&config.input_path, config).await?;
            stage_done(Stage::Ocr, &format!("~{} tokens", extraction.token_count));

            stage_start(Stage::Normalize);
            render_plain_blocking(&extraction.text, &config.document_path, config).await?;
            stage_done(Stage::Normalize, &config.document_path.display().to_string());

            (config.document_path.clone(), extraction.token_count)
        }
        ImageAnswer::No => {
            let doc =
                load_blocking(Arc::clone(&services.loader), config.input_path.clone()).await?;
            (config.input_path.clone(), estimate_tokens(&doc.text()))
        }
    };
    let token_budget = Some(tokens);
    info!(
        "Quizzing on {} (~{} tokens)",
        document_path.display(),
        tokens
    );

    // ── Step 2: Build or reload the index ────────────────────────────────
    stage_start(Stage::Index);
    let mut bot = QuizBot::with_services(vec![document_path.clone()], config, services);
    let chunks = bot.initialize().await?.len();
    stage_done(Stage::Index, &format!("{chunks} chunks"));

    // ── Step 3: Generate ─────────────────────────────────────────────────
    stage_start(Stage::Generate);
    let raw = bot.query(&config.question, token_budget).await?;
    let quiz = postprocess::clean_quiz(&raw);
    stage_done(Stage::Generate, &format!("{} chars", quiz.chars().count()));

    // ── Step 4: Render the quiz ──────────────────────────────────────────
    stage_start(Stage::Render);
    render_blocking(&quiz, config).await?;
    stage_done(Stage::Render, &config.output_path.display().to_string());

    let duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Quiz written to {} in {}ms",
        config.output_path.display(),
        duration_ms
    );

    Ok(RunOutcome::Completed(QuizRun {
        quiz,
        document_path,
        output_path: config.output_path.clone(),
        token_budget,
        duration_ms,
    }))
}

/// Synchronous wrapper around [`run`] for callers without a runtime.
pub fn run_sync(config: &QuizConfig, answer: ImageAnswer) -> Result<RunOutcome, QuizError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| QuizError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(run(config, answer))
}

async fn render_plain_blocking(
    text: &str,
    output_path: &Path,
    config: &QuizConfig,
) -> Result<(), QuizError> {
    let text = text.to_string();
    let output_path = output_path.to_path_buf();
    let fonts = config.fonts.clone();
    tokio::task::spawn_blocking(move || render::render_plain(&text, &output_path, &fonts))
        .await
        .map_err(|e| QuizError::Internal(format!("Render task panicked: {}", e)))?
}

async fn render_blocking(quiz: &str, config: &QuizConfig) -> Result<(), QuizError> {
    let quiz = quiz.to_string();
    let logo = config.logo_path.clone();
    let output_path = config.output_path.clone();
    let fonts = config.fonts.clone();
    tokio::task::spawn_blocking(move || render::render(&quiz, &logo, &output_path, &fonts))
        .await
        .map_err(|e| QuizError::Internal(format!("Render task panicked: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_answers_case_insensitively() {
        assert_eq!("y".parse::<ImageAnswer>().unwrap(), ImageAnswer::Yes);
        assert_eq!(" YES\n".parse::<ImageAnswer>().unwrap(), ImageAnswer::Yes);
        assert_eq!("N".parse::<ImageAnswer>().unwrap(), ImageAnswer::No);
        assert_eq!("Exit".parse::<ImageAnswer>().unwrap(), ImageAnswer::Exit);
        assert!("maybe".parse::<ImageAnswer>().is_err());
    }

    #[tokio::test]
    async fn exit_does_no_work() {
        let dir = tempfile::tempdir().unwrap();
        let config = QuizConfig::builder()
            .input_path(dir.path().join("missing.png"))
            .output_path(dir.path().join("quiz.pdf"))
            .index_dir(dir.path().join("index"))
            .build()
            .unwrap();
        let outcome = run(&config, ImageAnswer::Exit).await.unwrap();
        assert!(matches!(outcome, RunOutcome::Exited));
        assert!(!dir.path().join("index").exists());
        assert!(!dir.path().join("quiz.pdf").exists());
    }
}
