//! Prompt templates — pure string rendering, deterministic for given input.

use crate::constants::PROMPT_CHUNK_LIMIT;
use crate::question::Question;

const TRUNCATION_MARKER: &str = "... [content truncated]";

/// Render the extraction prompt for one chunk.
/// Oversized chunks are cut to 2000 chars with a truncation marker.
pub fn build(chunk: &str, chunk_number: usize) -> String {
    let body = if chunk.chars().count() > PROMPT_CHUNK_LIMIT {
        let cut: String = chunk.chars().take(PROMPT_CHUNK_LIMIT).collect();
        format!("{}{}", cut, TRUNCATION_MARKER)
    } else {
        chunk.to_string()
    };

    format!(
        r#"You are a professional quiz-question extraction assistant. Break the following text into all the complete questions it contains.

Extraction rules:
1. Extract only complete questions. You may complete clearly truncated fragments using general knowledge, but never return a still-incomplete item.
2. Return a valid JSON array.
3. Every question carries these fields:
   - type: question type (multiple-choice, fill-in-blank, short-answer, calculation, ...)
   - category: subject (math, programming, physics, language, ...)
   - question: the full question text
   - answer: reference answer or solution outline
   - notes: optional free-form note
   - difficulty: difficulty level (1-5)
4. If a question has options, include them inside the question field. If the text embeds its own answer, move it into the answer field and replace it inside the question with an underline placeholder.
5. Put a newline between the question and its options and between the options themselves; remove every other line break.
6. If the text contains no questions, return an empty array [].

Text content (part {chunk_number}):
"{body}"

Return strictly the following JSON format, with no other text:

[
  {{
    "type": "question type",
    "category": "category name",
    "question": "full question",
    "answer": "answer",
    "notes": "notes",
    "difficulty": 3
  }}
]"#
    )
}

/// Render a follow-up prompt about one extracted question. Free-form reply,
/// no JSON contract.
pub fn build_followup(question: &Question, query: &str) -> String {
    format!(
        r#"You are a patient study tutor. A learner is asking about the following quiz question.

Question: {question}
Reference answer: {answer}

Learner's message: {query}

Reply concisely and directly, referring back to the question where helpful."#,
        question = question.question,
        answer = question.answer,
        query = query,
    )
}
