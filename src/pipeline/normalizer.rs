//! Content normalization — whitespace collapse and character filtering.
//!
//! Two ordered passes over the raw extracted text. The second pass collapses
//! multi-newline runs to a paragraph break; after the first pass has already
//! collapsed every whitespace run to a single space it is effectively a
//! safeguard, and is kept for behavioral parity with the paragraph handling
//! the rest of the pipeline was tuned against.

/// Normalize raw source text. Empty input returns an empty string.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    // Pass 1: collapse every whitespace run (including newlines) to one space.
    let ws = regex::Regex::new(r"\s+").unwrap();
    let collapsed = ws.replace_all(text, " ");

    // Keep word chars, CJK ideographs, whitespace, and common punctuation.
    let disallowed = regex::Regex::new(
        r#"[^\w\x{4e00}-\x{9fff}\s.,?!，。？！：；“”‘’()\[\]+*/=<>-]"#,
    )
    .unwrap();
    let filtered = disallowed.replace_all(&collapsed, "");

    // Pass 2: collapse runs of blank lines to a single paragraph break.
    let paragraphs = regex::Regex::new(r"\n\s*\n").unwrap();
    let result = paragraphs.replace_all(&filtered, "\n\n");

    result.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace_runs() {
        assert_eq!(normalize("a  b\t\tc\n\nd"), "a b c d");
    }

    #[test]
    fn test_removes_disallowed_characters() {
        assert_eq!(normalize("price: $5 @home #tag"), "price 5 home tag");
        assert_eq!(normalize("emoji 🎉 gone"), "emoji gone");
    }

    #[test]
    fn test_keeps_cjk_and_punctuation() {
        assert_eq!(normalize("什么是惯性？答：略。"), "什么是惯性？答：略。");
        assert_eq!(normalize("2+2=4, right? (yes)"), "2+2=4, right? (yes)");
        assert_eq!(normalize("a [b] c <d> e/f*g"), "a [b] c <d> e/f*g");
    }

    #[test]
    fn test_trims_edges() {
        assert_eq!(normalize("  hello world  "), "hello world");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\t  "), "");
    }
}
