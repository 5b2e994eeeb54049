//! Cosmetic cleanup of the model's quiz text before it is rendered.
//!
//! The prompt asks for "a helpful answer in markdown", but the quiz PDF is
//! laid out as plain paragraphs. These rules remove the Markdown syntax
//! that would otherwise print literally (fences, `**`, `#`) and normalise
//! whitespace. They never reorder, drop or validate questions: the quiz
//! stays an opaque string.
//!
//! Rules (applied in order):
//! 1. Strip outer code fences wrapping the whole answer
//! 2. Normalise line endings (CRLF / CR → LF)
//! 3. Strip heading markers (`## Quiz` → `Quiz`)
//! 4. Strip bold markers hugging a word (`**a)**` → `a)`); `__` blanks and
//!    `2**3` stay as written
//! 5. Trim trailing whitespace per line
//! 6. Collapse runs of blank lines down to one
//! 7. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
//! 8. Ensure the text ends with exactly one newline

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to the raw model answer.
pub fn clean_quiz(input: &str) -> String {
    let s = strip_code_fences(input);
    let s = normalise_line_endings(&s);
    let s = strip_heading_markers(&s);
    let s = strip_emphasis(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    let s = remove_invisible_chars(&s);
    ensure_final_newline(&s)
}

// ── Rule 1: Strip outer code fences ──────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[a-zA-Z]*\r?\n(.*?)\r?\n```\s*$").unwrap());

fn strip_code_fences(input: &str) -> String {
    match RE_OUTER_FENCES.captures(input.trim()) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Strip heading markers ────────────────────────────────────────────

static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]+").unwrap());

fn strip_heading_markers(input: &str) -> String {
    RE_HEADING.replace_all(input, "").to_string()
}

// ── Rule 4: Strip emphasis markers ───────────────────────────────────────────

// `**` must not touch a word character on its outer side and the span must
// open and close on non-space text within one line.
static RE_STRONG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\B\*\*([^\s*](?:[^*\n]*?[^\s*])?)\*\*\B").unwrap());

fn strip_emphasis(input: &str) -> String {
    RE_STRONG.replace_all(input, "$1").to_string()
}

// ── Rule 5: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 6: Collapse blank lines ─────────────────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

// ── Rule 7: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 8: Ensure a single final newline ────────────────────────────────────

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.is_empty() {
        String::from("\n")
    } else {
        format!("{}\n", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markdown_fence() {
        assert_eq!(strip_code_fences("```markdown\n1. Q\n```"), "1. Q");
        assert_eq!(strip_code_fences("```\n1. Q\n```"), "1. Q");
        assert_eq!(strip_code_fences("1. Q"), "1. Q");
    }

    #[test]
    fn strips_headings_but_not_question_numbers() {
        let input = "## Quiz\n1. What is #1 in the list?";
        assert_eq!(
            strip_heading_markers(input),
            "Quiz\n1. What is #1 in the list?"
        );
    }

    #[test]
    fn strips_bold_answer_markers() {
        assert_eq!(
            strip_emphasis("**Question #1 Answer:** B"),
            "Question #1 Answer: B"
        );
    }

    #[test]
    fn fill_in_blanks_and_exponents_survive() {
        let raw = "1. The ______ is the powerhouse of the cell.\na) nucleus\n";
        assert_eq!(clean_quiz(raw), raw);
        assert_eq!(strip_emphasis("What is 2**3 + 3**2?"), "What is 2**3 + 3**2?");
        assert_eq!(strip_emphasis("__init__ and **bold__"), "__init__ and **bold__");
        assert_eq!(strip_emphasis("a ** b ** c"), "a ** b ** c");
    }

    #[test]
    fn collapses_blank_runs() {
        assert_eq!(collapse_blank_lines("a\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_lines("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn removes_invisible() {
        assert_eq!(remove_invisible_chars("a\u{200B}b\u{FEFF}c"), "abc");
    }

    #[test]
    fn final_newline() {
        assert_eq!(ensure_final_newline("quiz\n\n\n"), "quiz\n");
        assert_eq!(ensure_final_newline(""), "\n");
    }

    #[test]
    fn full_cleanup_keeps_quiz_content() {
        let raw = "```markdown\r\n### Quiz\r\n\r\n1. **What** is ATP?\r\n\r\n\r\n\r\na) Energy   \r\nb) Water\r\n\r\nQuestion #1 Answer: A\r\n```";
        let cleaned = clean_quiz(raw);
        assert_eq!(
            cleaned,
            "Quiz\n\n1. What is ATP?\n\na) Energy\nb) Water\n\nQuestion #1 Answer: A\n"
        );
    }
}
