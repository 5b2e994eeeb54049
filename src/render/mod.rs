//! PDF writing: the branded quiz template and the plain normalized document.
//!
//! ```text
//! text ─▶ wrap (layout) ─▶ paginate ─▶ paint via pdfium ─▶ <output>.tmp ─▶ rename
//! ```
//!
//! Fonts and the logo are checked before pdfium is bound and before any
//! file is created, and the document is saved to a temp file renamed over
//! the output, so a failed render never leaves a partial PDF behind.
//!
//! pdfium calls are blocking; async callers wrap these functions in
//! `tokio::task::spawn_blocking`.

pub mod fonts;
pub mod layout;

use crate::config::FontConfig;
use crate::error::QuizError;
use fonts::FontSet;
use image::{DynamicImage, GenericImageView};
use layout::{
    baseline_in_cell, body_width_mm, chars_per_line, paginate, wrap_text, HeaderLayout,
    PlacedLine, BODY_FONT_PT, FOOTER_FONT_PT, FOOTER_TEXT, LINE_HEIGHT_MM, PAGE_HEIGHT_MM,
    PT_TO_MM, SIDE_MARGIN_MM, TITLE_FONT_PT, TITLE_TEXT,
};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Render `text` as the branded quiz PDF: logos and title on every page,
/// copyright footer on every page.
pub fn render(
    text: &str,
    logo_path: &Path,
    output_path: &Path,
    fonts: &FontConfig,
) -> Result<(), QuizError> {
    let font_set = fonts::font_set(fonts)?;
    let logo = load_logo(logo_path)?;
    let (w, h) = logo.dimensions();
    let header = HeaderLayout::for_logo(w, h);

    let pages = paginate(wrap_body(text), header.body_top);
    write_pdf(output_path, &font_set, &pages, Some((&logo, &header)))
}

/// Render `text` on plain A4 pages with no header or footer.
pub fn render_plain(text: &str, output_path: &Path, fonts: &FontConfig) -> Result<(), QuizError> {
    let font_set = fonts::font_set(fonts)?;
    let pages = paginate(wrap_body(text), SIDE_MARGIN_MM);
    write_pdf(output_path, &font_set, &pages, None)
}

fn wrap_body(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n");
    wrap_text(
        normalized.trim_end_matches('\n'),
        chars_per_line(body_width_mm(), BODY_FONT_PT),
    )
}

fn load_logo(path: &Path) -> Result<DynamicImage, QuizError> {
    if !path.is_file() {
        return Err(QuizError::ResourceMissing {
            resource: "logo".into(),
            searched: vec![path.to_path_buf()],
        });
    }
    image::open(path).map_err(|e| QuizError::UnsupportedInput {
        path: path.to_path_buf(),
        detail: format!("logo could not be decoded: {e}"),
    })
}

fn write_pdf(
    output_path: &Path,
    font_set: &FontSet,
    pages: &[Vec<PlacedLine>],
    header: Option<(&DynamicImage, &HeaderLayout)>,
) -> Result<(), QuizError> {
    let start = Instant::now();
    let pdfium = crate::pdfium::bind()?;
    let pdf_err = |what: &str, e: PdfiumError| QuizError::Internal(format!("{what}: {e:?}"));

    let mut document = pdfium
        .create_new_pdf()
        .map_err(|e| pdf_err("creating PDF", e))?;

    let regular = document
        .fonts_mut()
        .load_true_type_from_bytes(&font_set.regular.bytes, true)
        .map_err(|e| pdf_err("registering regular font", e))?;
    let bold = match font_set.bold {
        Some(ref face) => document
            .fonts_mut()
            .load_true_type_from_bytes(&face.bytes, true)
            .map_err(|e| pdf_err("registering bold font", e))?,
        None => regular,
    };

    for lines in pages {
        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::a4())
            .map_err(|e| pdf_err("adding page", e))?;
        let objects = page.objects_mut();

        if let Some((logo, h)) = header {
            let logo_bottom = PAGE_HEIGHT_MM - h.logo_y - h.logo_height;
            for x in [h.left_logo_x, h.right_logo_x] {
                objects
                    .create_image_object(
                        PdfPoints::from_mm(x),
                        PdfPoints::from_mm(logo_bottom),
                        logo,
                        Some(PdfPoints::from_mm(h.logo_width)),
                        Some(PdfPoints::from_mm(h.logo_height)),
                    )
                    .map_err(|e| pdf_err("drawing logo", e))?;
            }

            let title_height = TITLE_FONT_PT * PT_TO_MM;
            let title_baseline = baseline_in_cell(h.title_y, title_height, TITLE_FONT_PT);
            objects
                .create_text_object(
                    PdfPoints::from_mm(h.title_x),
                    PdfPoints::from_mm(PAGE_HEIGHT_MM - title_baseline),
                    TITLE_TEXT,
                    bold,
                    PdfPoints::new(TITLE_FONT_PT),
                )
                .map_err(|e| pdf_err("drawing title", e))?;

            objects
                .create_text_object(
                    PdfPoints::from_mm(HeaderLayout::footer_x()),
                    PdfPoints::from_mm(PAGE_HEIGHT_MM - HeaderLayout::footer_baseline()),
                    FOOTER_TEXT,
                    regular,
                    PdfPoints::new(FOOTER_FONT_PT),
                )
                .map_err(|e| pdf_err("drawing footer", e))?;
        }

        for line in lines.iter().filter(|l| !l.text.is_empty()) {
            let baseline = baseline_in_cell(line.top, LINE_HEIGHT_MM, BODY_FONT_PT);
            objects
                .create_text_object(
                    PdfPoints::from_mm(SIDE_MARGIN_MM),
                    PdfPoints::from_mm(PAGE_HEIGHT_MM - baseline),
                    &line.text,
                    regular,
                    PdfPoints::new(BODY_FONT_PT),
                )
                .map_err(|e| pdf_err("drawing text", e))?;
        }
    }

    save_atomically(&document, output_path)?;
    info!(
        "Wrote {} ({} pages) in {}ms",
        output_path.display(),
        pages.len(),
        start.elapsed().as_millis()
    );
    Ok(())
}

fn save_atomically(document: &PdfDocument, output_path: &Path) -> Result<(), QuizError> {
    let write_err = |source| QuizError::OutputWriteFailed {
        path: output_path.to_path_buf(),
        source,
    };

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
    }

    let tmp = temp_path(output_path);
    if let Err(e) = document.save_to_file(&tmp) {
        let _ = std::fs::remove_file(&tmp);
        return Err(QuizError::OutputWriteFailed {
            path: output_path.to_path_buf(),
            source: std::io::Error::other(format!("{e:?}")),
        });
    }
    if let Err(e) = std::fs::rename(&tmp, output_path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(write_err(e));
    }
    debug!("Renamed {} → {}", tmp.display(), output_path.display());
    Ok(())
}

fn temp_path(output_path: &Path) -> PathBuf {
    let mut name = output_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "output.pdf".into());
    name.push(".tmp");
    output_path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_fonts() -> FontConfig {
        FontConfig {
            regular: vec![PathBuf::from("/no/such/fonts/DejaVuSans.ttf")],
            bold: vec![PathBuf::from("/no/such/fonts/DejaVuSans-Bold.ttf")],
        }
    }

    #[test]
    fn temp_path_sits_next_to_output() {
        assert_eq!(
            temp_path(Path::new("out/quiz.pdf")),
            PathBuf::from("out/quiz.pdf.tmp")
        );
    }

    #[test]
    fn plain_render_without_fonts_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("document.pdf");
        let err = render_plain("Hello World", &out, &missing_fonts()).unwrap_err();
        assert!(matches!(err, QuizError::ResourceMissing { .. }));
        assert!(!out.exists());
        assert!(!temp_path(&out).exists());
    }

    #[test]
    fn missing_logo_is_resource_missing() {
        let dir = tempfile::tempdir().unwrap();
        let font = dir.path().join("Regular.ttf");
        std::fs::write(&font, b"font bytes").unwrap();
        let fonts = FontConfig {
            regular: vec![font],
            bold: vec![],
        };
        let out = dir.path().join("quiz.pdf");
        let err = render("1. Q", &dir.path().join("logo.png"), &out, &fonts).unwrap_err();
        match err {
            QuizError::ResourceMissing { resource, .. } => assert_eq!(resource, "logo"),
            other => panic!("expected ResourceMissing, got {other:?}"),
        }
        assert!(!out.exists());
    }
}
