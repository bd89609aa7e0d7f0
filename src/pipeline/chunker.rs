//! Chunking — split normalized text into bounded pieces at semantic boundaries.
//!
//! Works on char indices so CJK text never splits mid-codepoint. Scanning
//! backward from the size limit, the best split point is (in priority order):
//! just after sentence-ending punctuation, a newline or clause separator once
//! the piece is over 80% full, or a space/tab once over 90% full. With no
//! candidate, the piece is hard-cut at the limit. Concatenating the returned
//! chunks always reproduces the input exactly.

use crate::constants::{CHUNK_NEWLINE_SPLIT_RATIO, CHUNK_SPACE_SPLIT_RATIO};

const SENTENCE_ENDERS: &str = "。！？.!?";
const CLAUSE_SEPARATORS: &str = "，,;；:";

/// Split `text` into chunks of at most `max_chunk_size` chars.
pub fn split(text: &str, max_chunk_size: usize) -> Vec<String> {
    // start must strictly advance each iteration, so the limit is at least 1.
    let max = max_chunk_size.max(1);

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < chars.len() {
        let mut end = start + max;

        if end >= chars.len() {
            chunks.push(chars[start..].iter().collect());
            break;
        }

        for split_point in (start + 1..=end).rev() {
            let c = chars[split_point];
            let prev = chars[split_point - 1];
            let filled = (split_point - start) as f64;

            if SENTENCE_ENDERS.contains(prev) {
                end = split_point;
                break;
            } else if c == '\n' && filled > max as f64 * CHUNK_NEWLINE_SPLIT_RATIO {
                end = split_point;
                break;
            } else if CLAUSE_SEPARATORS.contains(c)
                && filled > max as f64 * CHUNK_NEWLINE_SPLIT_RATIO
            {
                end = split_point;
                break;
            } else if (c == ' ' || c == '\t') && filled > max as f64 * CHUNK_SPACE_SPLIT_RATIO {
                end = split_point;
                break;
            }
        }

        chunks.push(chars[start..end].iter().collect());
        start = end;
    }

    chunks
}
