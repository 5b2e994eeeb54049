//! Page geometry: word wrapping and pagination in millimetres.
//!
//! Everything here is pure arithmetic on strings so it can be tested
//! without pdfium. Positions are measured from the top-left corner of an
//! A4 page; [`super`] flips them into PDF points when painting.
//!
//! Glyph widths are approximated as a fixed fraction of the font size
//! (DejaVu Sans averages a little over half an em). Lines are wrapped
//! against that estimate with a small safety factor, so long words never
//! run into the right margin.

/// A4 width.
pub const PAGE_WIDTH_MM: f32 = 210.0;
/// A4 height.
pub const PAGE_HEIGHT_MM: f32 = 297.0;
/// Left and right body margin, and top margin of plain pages.
pub const SIDE_MARGIN_MM: f32 = 10.0;
/// Space kept free at the bottom of every page for the footer.
pub const BOTTOM_MARGIN_MM: f32 = 15.0;
/// Vertical advance of one body line.
pub const LINE_HEIGHT_MM: f32 = 10.0;

pub const BODY_FONT_PT: f32 = 12.0;
pub const TITLE_FONT_PT: f32 = 24.0;
pub const FOOTER_FONT_PT: f32 = 8.0;

pub const LOGO_WIDTH_MM: f32 = 65.0;
/// Distance of each logo from its page edge.
pub const LOGO_INSET_MM: f32 = 6.0;
pub const LOGO_TOP_MM: f32 = 6.0;
/// Gap between the logo bottom and the first body line.
pub const BODY_GAP_MM: f32 = 6.0;
/// The title is centred between these left and right margins.
pub const TITLE_MARGIN_MM: f32 = 75.0;
/// The footer baseline sits this far above the bottom edge.
pub const FOOTER_OFFSET_MM: f32 = 15.0;

pub const TITLE_TEXT: &str = "DocuQuiz AI";
pub const FOOTER_TEXT: &str = "DocuQuiz AI™ © 2025 DocuQuiz AI Inc. All rights reserved.";

/// One typographic point in millimetres.
pub const PT_TO_MM: f32 = 0.352_777;

/// Average advance of a glyph as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.55;

/// Estimated rendered width of `text` at `size_pt`.
pub fn text_width_mm(text: &str, size_pt: f32) -> f32 {
    text.chars().count() as f32 * AVG_GLYPH_EM * size_pt * PT_TO_MM
}

/// Characters that fit in `width_mm` at `size_pt`. Always at least one.
pub fn chars_per_line(width_mm: f32, size_pt: f32) -> usize {
    let per_char = AVG_GLYPH_EM * size_pt * PT_TO_MM;
    ((width_mm / per_char).floor() as usize).max(1)
}

/// Spaces a tab expands to.
const TAB_WIDTH: usize = 4;

/// Greedy word wrap.
///
/// Explicit newlines always break; blank source lines are kept as empty
/// lines. Leading indentation is repeated on continuation lines and runs of
/// spaces between words are kept, so indented option lines keep their
/// shape. Indentation wider than half a line is dropped. Words longer than
/// the remaining width are split at character boundaries.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for source_line in text.split('\n') {
        let expanded = source_line.replace('\t', &" ".repeat(TAB_WIDTH));
        let body = expanded.trim_start();
        let mut indent = expanded[..expanded.len() - body.len()].to_string();
        if indent.chars().count() * 2 > max_chars {
            indent.clear();
        }
        let width = max_chars - indent.chars().count();

        let mut current = indent.clone();
        let mut current_len = 0usize;

        for (gap, word) in gaps_and_words(body) {
            let word_len = word.chars().count();

            if word_len > width {
                if current_len > 0 {
                    lines.push(std::mem::replace(&mut current, indent.clone()));
                    current_len = 0;
                }
                let chars: Vec<char> = word.chars().collect();
                let mut pieces = chars.chunks(width).peekable();
                while let Some(piece) = pieces.next() {
                    let piece: String = piece.iter().collect();
                    if pieces.peek().is_some() {
                        lines.push(format!("{indent}{piece}"));
                    } else {
                        current_len = piece.chars().count();
                        current.push_str(&piece);
                    }
                }
                continue;
            }

            let gap_len = if current_len == 0 {
                0
            } else {
                gap.chars().count()
            };
            let needed = current_len + gap_len + word_len;
            if needed > width {
                lines.push(std::mem::replace(&mut current, indent.clone()));
                current.push_str(word);
                current_len = word_len;
            } else {
                if current_len > 0 {
                    current.push_str(gap);
                }
                current.push_str(word);
                current_len = needed;
            }
        }

        if current_len == 0 {
            lines.push(String::new());
        } else {
            lines.push(current);
        }
    }

    lines
}

/// Split a line into `(preceding whitespace, word)` pairs. Trailing
/// whitespace is dropped.
fn gaps_and_words(line: &str) -> Vec<(&str, &str)> {
    let mut pairs = Vec::new();
    let mut rest = line;
    while let Some(word_start) = rest.find(|c: char| !c.is_whitespace()) {
        let (gap, tail) = rest.split_at(word_start);
        let word_end = tail.find(char::is_whitespace).unwrap_or(tail.len());
        let (word, next) = tail.split_at(word_end);
        pairs.push((gap, word));
        rest = next;
    }
    pairs
}

/// Positions of the header elements on a branded page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderLayout {
    pub logo_width: f32,
    pub logo_height: f32,
    pub left_logo_x: f32,
    pub right_logo_x: f32,
    pub logo_y: f32,
    /// Top of the title text box.
    pub title_y: f32,
    pub title_x: f32,
    /// Top of the first body line.
    pub body_top: f32,
}

impl HeaderLayout {
    /// Header for a logo of `pixel_width` × `pixel_height`.
    pub fn for_logo(pixel_width: u32, pixel_height: u32) -> Self {
        let logo_width = LOGO_WIDTH_MM;
        let logo_height = if pixel_width == 0 {
            0.0
        } else {
            logo_width * pixel_height as f32 / pixel_width as f32
        };
        let title_height = TITLE_FONT_PT * PT_TO_MM;
        let title_box = PAGE_WIDTH_MM - 2.0 * TITLE_MARGIN_MM;
        let title_x = TITLE_MARGIN_MM + (title_box - text_width_mm(TITLE_TEXT, TITLE_FONT_PT)) / 2.0;

        Self {
            logo_width,
            logo_height,
            left_logo_x: LOGO_INSET_MM,
            right_logo_x: PAGE_WIDTH_MM - LOGO_INSET_MM - logo_width,
            logo_y: LOGO_TOP_MM,
            title_y: LOGO_TOP_MM + logo_height / 2.0 - title_height / 2.0,
            title_x,
            body_top: LOGO_TOP_MM + logo_height + BODY_GAP_MM,
        }
    }

    /// Left edge of the centred footer line.
    pub fn footer_x() -> f32 {
        (PAGE_WIDTH_MM - text_width_mm(FOOTER_TEXT, FOOTER_FONT_PT)) / 2.0
    }

    /// Baseline of the footer line.
    pub fn footer_baseline() -> f32 {
        PAGE_HEIGHT_MM - FOOTER_OFFSET_MM
    }
}

/// A body line placed on a page; `top` is the top of its 10 mm cell.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub top: f32,
}

/// Distribute wrapped lines over pages whose body starts at `body_top`.
///
/// A new page is started whenever the next line would cross the bottom
/// margin. Always returns at least one page, possibly empty.
pub fn paginate(lines: Vec<String>, body_top: f32) -> Vec<Vec<PlacedLine>> {
    let limit = PAGE_HEIGHT_MM - BOTTOM_MARGIN_MM;
    let mut pages = vec![Vec::new()];
    let mut y = body_top;

    for text in lines {
        if y + LINE_HEIGHT_MM > limit {
            if let Some(last) = pages.last() {
                if !last.is_empty() {
                    pages.push(Vec::new());
                    y = body_top;
                }
            }
        }
        if let Some(page) = pages.last_mut() {
            page.push(PlacedLine { text, top: y });
        }
        y += LINE_HEIGHT_MM;
    }

    pages
}

/// Baseline of text of `size_pt` vertically centred in a cell.
pub fn baseline_in_cell(top: f32, cell_height: f32, size_pt: f32) -> f32 {
    top + cell_height / 2.0 + 0.3 * size_pt * PT_TO_MM
}

/// Width available to body text.
pub fn body_width_mm() -> f32 {
    PAGE_WIDTH_MM - 2.0 * SIDE_MARGIN_MM
}
