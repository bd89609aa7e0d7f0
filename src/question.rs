//! Question model — completeness invariant, dedup fingerprint, file hashing.
//!
//! A Question is "complete" iff `type`, `category`, `question`, and `answer`
//! are all present and non-blank, with `question` at least 5 chars and
//! `answer` at least 1 char after trimming. Incomplete questions never reach
//! the caller.

use std::path::Path;

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DIFFICULTY, FINGERPRINT_PREFIX_CHARS, MAX_DIFFICULTY, MIN_ANSWER_LEN, MIN_DIFFICULTY,
    MIN_QUESTION_LEN,
};

/// A validated quiz question, as produced by the post-processor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    /// Category label: multiple-choice, fill-in-blank, short-answer, etc.
    #[serde(rename = "type")]
    pub kind: String,
    /// Subject label: math, programming, physics, etc.
    pub category: String,
    /// Full question text; options are embedded newline-separated.
    pub question: String,
    /// Reference answer or explanation.
    pub answer: String,
    /// Optional free-form note.
    #[serde(default)]
    pub notes: String,
    /// Difficulty, clamped to [1, 5].
    pub difficulty: i64,
}

/// Stringify a scalar field from a raw parsed object. Models sometimes emit
/// numbers or booleans where strings belong; coerce those instead of
/// dropping the whole item. Null, arrays, and objects stay absent.
pub fn field_text(raw: &serde_json::Value, name: &str) -> Option<String> {
    match raw.get(name)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Check the completeness invariant on a raw parsed object.
/// Runs strictly before dedup — fingerprinting needs a `question` field.
pub fn is_complete(raw: &serde_json::Value) -> bool {
    for field in ["type", "category", "question", "answer"] {
        match field_text(raw, field) {
            Some(s) if !s.trim().is_empty() => {}
            _ => return false,
        }
    }

    let question = field_text(raw, "question").unwrap_or_default();
    if question.trim().chars().count() < MIN_QUESTION_LEN {
        return false;
    }

    let answer = field_text(raw, "answer").unwrap_or_default();
    answer.trim().chars().count() >= MIN_ANSWER_LEN
}

/// Content fingerprint of a question text, used for dedup across chunks.
///
/// Lowercase, trim, drop every non-word non-CJK character, keep the first
/// 100 chars, md5. Invariant to case, whitespace, and punctuation.
pub fn fingerprint(question_text: &str) -> String {
    let lowered = question_text.to_lowercase();
    let filtered: String = lowered
        .trim()
        .chars()
        .filter(|c| is_word_or_cjk(*c))
        .take(FINGERPRINT_PREFIX_CHARS)
        .collect();
    md5_hex(filtered.as_bytes())
}

/// Word character (alphanumeric or underscore) or CJK ideograph.
fn is_word_or_cjk(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Coerce a raw difficulty value to an integer clamped to [1, 5].
/// Missing or unparsable values default to 3.
pub fn clamp_difficulty(raw: Option<&serde_json::Value>) -> i64 {
    let parsed = match raw {
        Some(v) => {
            if let Some(n) = v.as_i64() {
                Some(n)
            } else if let Some(f) = v.as_f64() {
                Some(f as i64)
            } else {
                v.as_str().and_then(|s| s.trim().parse::<i64>().ok())
            }
        }
        None => None,
    };
    match parsed {
        Some(n) => n.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY),
        None => DEFAULT_DIFFICULTY,
    }
}

/// Cache key for a processed file.
///
/// Content hash when readable, falling back to mtime+path, then path alone.
/// The fallback chain means cache correctness degrades silently for files
/// that are unreadable for hashing but readable for extraction; documented
/// behavior, kept as-is.
pub fn file_hash(path: &Path) -> String {
    if let Ok(content) = std::fs::read(path) {
        return md5_hex(&content);
    }
    if let Ok(meta) = std::fs::metadata(path) {
        if let Ok(mtime) = meta.modified() {
            let stamp = mtime
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            return md5_hex(format!("{}_{}", path.display(), stamp).as_bytes());
        }
    }
    md5_hex(path.display().to_string().as_bytes())
}

fn md5_hex(bytes: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
