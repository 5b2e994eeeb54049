//! Font discovery and the process-wide font cache.
//!
//! Each face is looked up along its fallback list and the first existing
//! file wins. A resolved [`FontSet`] is cached for the lifetime of the
//! process, keyed by the fallback lists it was resolved from, and never
//! mutated afterwards. Failed lookups are not cached, so a font installed
//! while the process runs is picked up on the next render.

use crate::config::FontConfig;
use crate::error::QuizError;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// A TrueType file read into memory.
#[derive(Debug)]
pub struct FontFace {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// The regular and bold faces used by the renderer.
#[derive(Debug)]
pub struct FontSet {
    pub regular: FontFace,
    /// `None` when no bold file exists; callers draw bold text with the
    /// regular face instead.
    pub bold: Option<FontFace>,
}

static FONT_CACHE: Lazy<Mutex<HashMap<FontConfig, Arc<FontSet>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Resolve and read the fonts named by `config`, once per process.
pub fn font_set(config: &FontConfig) -> Result<Arc<FontSet>, QuizError> {
    let mut cache = FONT_CACHE
        .lock()
        .map_err(|_| QuizError::Internal("font cache lock poisoned".into()))?;

    if let Some(set) = cache.get(config) {
        return Ok(Arc::clone(set));
    }

    let set = Arc::new(load_font_set(config)?);
    cache.insert(config.clone(), Arc::clone(&set));
    Ok(set)
}

fn load_font_set(config: &FontConfig) -> Result<FontSet, QuizError> {
    let regular_path =
        first_existing(&config.regular).ok_or_else(|| QuizError::ResourceMissing {
            resource: "regular font".into(),
            searched: config.regular.clone(),
        })?;
    let regular = read_face(regular_path)?;

    let bold = match first_existing(&config.bold) {
        Some(path) => Some(read_face(path)?),
        None => {
            warn!(
                "No bold font found ({} paths searched); using {} for the title",
                config.bold.len(),
                regular.path.display()
            );
            None
        }
    };

    Ok(FontSet { regular, bold })
}

fn first_existing(candidates: &[PathBuf]) -> Option<&Path> {
    candidates
        .iter()
        .map(PathBuf::as_path)
        .find(|p| p.is_file())
}

fn read_face(path: &Path) -> Result<FontFace, QuizError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => QuizError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => QuizError::ResourceMissing {
            resource: format!("font ({e})"),
            searched: vec![path.to_path_buf()],
        },
    })?;
    debug!("Loaded font {} ({} bytes)", path.display(), bytes.len());
    Ok(FontFace {
        path: path.to_path_buf(),
        bytes,
    })
}
