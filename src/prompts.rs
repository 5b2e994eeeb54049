//! Prompts for quiz generation and vision OCR.
//!
//! Every prompt lives here so prompt changes never touch retrieval or
//! error-handling code, and so tests can inspect them without a model.

/// Quiz template. `{context}` and `{question}` are substituted by
/// [`quiz_prompt`].
pub const QUIZ_PROMPT_TEMPLATE: &str = r#"You are an intelligent and helpful AI assistant for making a quiz.
Make sure to make a quiz set based on the context provided.
Please provide the quiz in 10 questions.
ONLY use information from the context below. Do NOT add anything not in the context.
If there is not enough information to generate all 10 questions, generate fewer questions instead.
State every question and options only once, do not repeat the same question or/and responses.
Each question should have 4 options (a, b, c, d) and indicate the correct answer.
Make it in this format:
1. Question

a) Option A
b) Option B
c) Option C
d) Option D

Make sure the answer key is provided after all the questions and options are listed, in this format:
Question #1 Answer: A/B/C/D

If there are multiple answers, list them separated by commas like this:
Question #2 Answer: A,C

ONLY use information from the context below. Do NOT add anything not in the context.
If there is not enough information to generate all 10 questions, generate fewer questions instead.

Context:
{context}

Question:
{question}

Helpful answer in markdown:"#;

/// Separator placed between retrieved chunks in the `{context}` slot.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Fill [`QUIZ_PROMPT_TEMPLATE`].
///
/// `{question}` is substituted after `{context}` so a document that happens
/// to contain the literal text `{question}` is left alone.
pub fn quiz_prompt(context: &str, question: &str) -> String {
    let (head, tail) = QUIZ_PROMPT_TEMPLATE
        .split_once("{context}")
        .unwrap_or((QUIZ_PROMPT_TEMPLATE, ""));
    format!("{head}{context}{}", tail.replacen("{question}", question, 1))
}

/// System prompt for [`crate::config::OcrEngine::Vision`].
pub const OCR_SYSTEM_PROMPT: &str = r#"You are an OCR engine. Transcribe all text visible in the image exactly as written.

Rules:
- Preserve the reading order and line breaks of the original
- Do NOT translate, summarise, correct or explain anything
- Do NOT add Markdown formatting, code fences or commentary
- If the image contains no text, output nothing"#;
