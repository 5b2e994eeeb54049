//! Progress-callback trait for pipeline stage events.
//!
//! Inject an [`Arc<dyn QuizProgressCallback>`] via
//! [`crate::config::QuizConfigBuilder::progress_callback`] to receive events
//! as the orchestrator moves through OCR, indexing, generation and
//! rendering. The CLI forwards them to a terminal spinner; library users can
//! forward them anywhere.
//!
//! # Example
//!
//! ```rust
//! use docuquiz::{QuizConfig, QuizProgressCallback, Stage};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     finished: AtomicUsize,
//! }
//!
//! impl QuizProgressCallback for CountingCallback {
//!     fn on_stage_complete(&self, stage: Stage, _detail: &str) {
//!         self.finished.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{stage} done");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { finished: AtomicUsize::new(0) });
//!
//! let config = QuizConfig::builder()
//!     .progress_callback(counter as Arc<dyn QuizProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::fmt;
use std::sync::Arc;

/// A step of the orchestrated run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Text extraction from the input image.
    Ocr,
    /// Rendering the extracted text into the normalized document.
    Normalize,
    /// Building or loading the retrieval index.
    Index,
    /// Retrieval and quiz completion.
    Generate,
    /// Rendering the quiz PDF.
    Render,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Ocr => "OCR",
            Stage::Normalize => "Normalize",
            Stage::Index => "Index",
            Stage::Generate => "Generate",
            Stage::Render => "Render",
        };
        f.write_str(s)
    }
}

/// Called by the pipeline as it runs.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. The pipeline is sequential, so events never
/// overlap, but the trait is `Send + Sync` to allow sharing the callback
/// with other threads of the host application.
pub trait QuizProgressCallback: Send + Sync {
    /// Called when a stage begins.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when a stage ends successfully.
    ///
    /// # Arguments
    /// * `stage`  — the finished stage
    /// * `detail` — short human-readable summary (e.g. "42 chunks")
    fn on_stage_complete(&self, stage: Stage, detail: &str) {
        let _ = (stage, detail);
    }

    /// Called after each chunk embedding batch while the index is built.
    ///
    /// # Arguments
    /// * `embedded` — chunks embedded so far
    /// * `total`    — chunks to embed
    fn on_chunks_embedded(&self, embedded: usize, total: usize) {
        let _ = (embedded, total);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl QuizProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::QuizConfig`].
pub type ProgressCallback = Arc<dyn QuizProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingCallback {
        events: Mutex<Vec<String>>,
    }

    impl QuizProgressCallback for RecordingCallback {
        fn on_stage_start(&self, stage: Stage) {
            self.events.lock().unwrap().push(format!("start {stage}"));
        }

        fn on_stage_complete(&self, stage: Stage, detail: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done {stage}: {detail}"));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_stage_start(Stage::Ocr);
        cb.on_stage_complete(Stage::Ocr, "12 chars");
        cb.on_chunks_embedded(3, 10);
    }

    #[test]
    fn recording_callback_sees_events_in_order() {
        let cb = RecordingCallback::default();
        cb.on_stage_start(Stage::Index);
        cb.on_chunks_embedded(1, 2);
        cb.on_stage_complete(Stage::Index, "2 chunks");
        let events = cb.events.lock().unwrap();
        assert_eq!(*events, vec!["start Index", "done Index: 2 chunks"]);
    }

    #[test]
    fn stage_display() {
        assert_eq!(Stage::Ocr.to_string(), "OCR");
        assert_eq!(Stage::Render.to_string(), "Render");
    }
}
