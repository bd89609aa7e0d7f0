//! Post-processing — completeness gate, fingerprint dedup, difficulty clamp.
//!
//! Completeness filtering runs strictly before dedup: fingerprinting needs
//! the `question` field to exist. Dedup keeps the first-seen instance in
//! chunk-processing order.

use std::collections::HashSet;

use serde_json::Value;

use crate::question::{self, Question};

/// Filter, deduplicate, and coerce raw parsed objects into Questions.
pub fn process(raw: Vec<Value>) -> Vec<Question> {
    let total = raw.len();
    let complete: Vec<Value> = raw.into_iter().filter(question::is_complete).collect();
    tracing::debug!(before = total, after = complete.len(), "Completeness filter");

    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for item in complete {
        let text = question::field_text(&item, "question").unwrap_or_default();
        if seen.insert(question::fingerprint(&text)) {
            unique.push(item);
        }
    }
    tracing::debug!(kept = unique.len(), "Dedup filter");

    unique
        .into_iter()
        .map(|item| Question {
            kind: field(&item, "type"),
            category: field(&item, "category"),
            question: field(&item, "question"),
            answer: field(&item, "answer"),
            notes: field(&item, "notes"),
            difficulty: question::clamp_difficulty(item.get("difficulty")),
        })
        .collect()
}

fn field(item: &Value, name: &str) -> String {
    question::field_text(item, name).unwrap_or_default()
}
