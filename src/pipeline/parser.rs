//! Response parsing — recover a JSON array from noisy model output.
//!
//! Strategies, in order: direct parse of the trimmed response, bracket
//! matching (first `[` to last `]`), then fenced/labeled regex patterns.
//! Never errors; unrecoverable input yields an empty list. Field validation
//! is the post-processor's job, not this module's.

use serde_json::Value;

/// Fallback patterns for responses that wrap the array in prose or fences.
const REPAIR_PATTERNS: [&str; 4] = [
    r"(?s)```json\s*(\[.*?\])\s*```",
    r"(?s)```\s*(\[.*?\])\s*```",
    r"(?s)JSON:\s*(\[.*?\])",
    r"(?s)输出:\s*(\[.*?\])",
];

/// Parse raw model output into question objects.
pub fn parse(raw: &str) -> Vec<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        tracing::debug!("Model response empty");
        return Vec::new();
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return into_items(value);
    }

    if let (Some(start), Some(end)) = (trimmed.find('['), trimmed.rfind(']')) {
        if end > start {
            if let Ok(value) = serde_json::from_str::<Value>(&trimmed[start..=end]) {
                return into_items(value);
            }
        }
    }

    for pattern in REPAIR_PATTERNS {
        let re = regex::Regex::new(pattern).unwrap();
        if let Some(caps) = re.captures(trimmed) {
            if let Ok(value) = serde_json::from_str::<Value>(&caps[1]) {
                return into_items(value);
            }
        }
    }

    tracing::warn!(
        response_len = raw.len(),
        "Could not recover a JSON array from model response"
    );
    Vec::new()
}

fn into_items(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => {
            tracing::warn!(got = ?json_type(&other), "Model returned valid JSON but not an array");
            Vec::new()
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
