//! CLI binary for docuquiz.
//!
//! A thin shim over the library crate that asks whether the input is an
//! image, maps CLI flags to `QuizConfig` and prints the quiz.

use anyhow::{Context, Result};
use clap::Parser;
use docuquiz::{
    run, ImageAnswer, OcrEngine, ProgressCallback, QuizConfig, QuizProgressCallback, RunOutcome,
    Stage,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal spinner: one line per finished stage, live message for the
/// running one.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl QuizProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        let msg = match stage {
            Stage::Ocr => "reading the image…",
            Stage::Normalize => "writing the normalized PDF…",
            Stage::Index => "indexing the document…",
            Stage::Generate => "asking the model for a quiz…",
            Stage::Render => "laying out the quiz PDF…",
        };
        self.bar.set_prefix(stage.to_string());
        self.bar.set_message(msg);
    }

    fn on_stage_complete(&self, stage: Stage, detail: &str) {
        self.bar.println(format!(
            "  {} {:<10} {}",
            green("✓"),
            stage.to_string(),
            dim(detail)
        ));
        if stage == Stage::Render {
            self.bar.finish_and_clear();
        }
    }

    fn on_chunks_embedded(&self, embedded: usize, total: usize) {
        self.bar
            .set_message(format!("embedded {embedded}/{total} chunks"));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Interactive: asks whether the input is an image
  docuquiz --input images/test.png

  # Scanned page, OCR with tesseract, keep the existing index
  docuquiz --is-image y --ocr tesseract --no-reset -i scans/chapter1.jpg

  # Existing PDF, skip OCR
  docuquiz --is-image n -i lecture.pdf -o quiz.pdf

MODEL SELECTION (by estimated document tokens, chars / 4):
  ≤ 8192           gpt-4o-mini
  16384 – 32767    gpt-5-mini
  ≥ 32768          gpt-5
  8193 – 16383     rejected (no model configured)

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  PDFIUM_LIB_PATH         Path to libpdfium
  RUST_LOG                Log filter (overrides --verbose/--quiet)

RESOURCES (relative to the working directory):
  fonts/dejavu-sans-ttf-2.37/DejaVuSans.ttf       (or fonts/ttf/DejaVuSans.ttf)
  fonts/dejavu-sans-ttf-2.37/DejaVuSans-Bold.ttf  (optional)
  logo/docuquiz_logo_transparent.png
"#;

/// Turn a scanned document into a multiple-choice quiz PDF.
#[derive(Parser, Debug)]
#[command(
    name = "docuquiz",
    version,
    about = "Turn a scanned document into a multiple-choice quiz PDF",
    long_about = "OCR a scanned page (or read a PDF), index its text for retrieval and ask an LLM \
for a ten-question multiple-choice quiz with an answer key, rendered as a branded PDF.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input image (or PDF/text document with --is-image n).
    #[arg(short, long, env = "DOCUQUIZ_INPUT", default_value = "images/test.png")]
    input: PathBuf,

    /// Where the OCR text is written as a normalized PDF.
    #[arg(long, env = "DOCUQUIZ_PDF", default_value = "data_sets/document.pdf")]
    pdf: PathBuf,

    /// Quiz PDF output path.
    #[arg(
        short,
        long,
        env = "DOCUQUIZ_OUTPUT",
        default_value = "docuquiz_results/docuquiz_quiz.pdf"
    )]
    output: PathBuf,

    /// Logo drawn in the quiz header.
    #[arg(long, env = "DOCUQUIZ_LOGO", default_value = "logo/docuquiz_logo_transparent.png")]
    logo: PathBuf,

    /// Directory of the persisted retrieval index.
    #[arg(long, env = "DOCUQUIZ_INDEX_DIR", default_value = docuquiz::config::DEFAULT_INDEX_DIR)]
    index_dir: PathBuf,

    /// Rebuild the index even if one exists (default).
    #[arg(long, overrides_with = "no_reset")]
    reset: bool,

    /// Reuse a persisted index when present.
    #[arg(long, env = "DOCUQUIZ_NO_RESET", overrides_with = "reset")]
    no_reset: bool,

    /// Answer to "Is your file an image?" (y, n or exit). Prompts if unset.
    #[arg(long, env = "DOCUQUIZ_IS_IMAGE")]
    is_image: Option<String>,

    /// Question sent to the quiz bot.
    #[arg(long, env = "DOCUQUIZ_QUESTION", default_value = docuquiz::config::DEFAULT_QUESTION)]
    question: String,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "DOCUQUIZ_PROVIDER")]
    provider: Option<String>,

    /// OCR backend for image inputs.
    #[arg(long, env = "DOCUQUIZ_OCR", value_enum, default_value = "vision")]
    ocr: OcrArg,

    /// tesseract executable used with --ocr tesseract.
    #[arg(long, env = "DOCUQUIZ_TESSERACT", default_value = "tesseract")]
    tesseract: PathBuf,

    /// Number of chunks retrieved as context.
    #[arg(long, env = "DOCUQUIZ_TOP_K", default_value_t = 4)]
    top_k: usize,

    /// Disable the progress spinner.
    #[arg(long, env = "DOCUQUIZ_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCUQUIZ_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCUQUIZ_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum OcrArg {
    Vision,
    Tesseract,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner gives the feedback that matters; library INFO logs would
    // interleave with it.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Ask what the input is ────────────────────────────────────────────
    let reply = match cli.is_image {
        Some(ref answer) => answer.clone(),
        None => prompt_is_image().context("Failed to read the answer from stdin")?,
    };
    let answer = match reply.parse::<ImageAnswer>() {
        Ok(a) => a,
        Err(_) => {
            eprintln!("No document loaded. Exiting.");
            return Ok(());
        }
    };
    if answer == ImageAnswer::Exit {
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn QuizProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run ──────────────────────────────────────────────────────────────
    let outcome = run(&config, answer).await.context("Quiz generation failed")?;

    if let RunOutcome::Completed(result) = outcome {
        if !cli.quiet {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(result.quiz.as_bytes())
                .context("Failed to write to stdout")?;
            eprintln!(
                "{}  ~{} tokens  {}ms  →  {}",
                green("✔"),
                result
                    .token_budget
                    .map_or_else(|| "?".to_string(), |t| t.to_string()),
                result.duration_ms,
                bold(&result.output_path.display().to_string()),
            );
        }
    }

    Ok(())
}

/// Ask "Is your file an image? (y/n/exit): " on stdout and read one line.
fn prompt_is_image() -> Result<String> {
    print!("Is your file an image? (y/n/exit): ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

/// Map CLI args to `QuizConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<QuizConfig> {
    let ocr = match cli.ocr {
        OcrArg::Vision => OcrEngine::Vision,
        OcrArg::Tesseract => OcrEngine::Tesseract {
            binary: cli.tesseract.clone(),
        },
    };

    let mut builder = QuizConfig::builder()
        .input_path(&cli.input)
        .document_path(&cli.pdf)
        .output_path(&cli.output)
        .logo_path(&cli.logo)
        .index_dir(&cli.index_dir)
        .reset_index(cli.reset || !cli.no_reset)
        .question(&cli.question)
        .ocr(ocr)
        .top_k(cli.top_k);

    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
