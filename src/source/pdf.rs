//! PDF text extraction via `pdf_extract`. Black box: bytes in, text out.

use std::path::Path;

/// Extract text from a PDF. Empty string on any failure.
pub fn extract_from_pdf(path: &Path) -> String {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read PDF file");
            return String::new();
        }
    };

    match pdf_extract::extract_text_from_mem(&bytes) {
        Ok(text) => {
            tracing::info!(path = %path.display(), chars = text.len(), "PDF text extracted");
            text
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "PDF text extraction failed");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_pdf_yields_empty() {
        assert_eq!(extract_from_pdf(Path::new("/no/such/doc.pdf")), "");
    }

    #[test]
    fn test_invalid_pdf_yields_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, "this is not a pdf").unwrap();
        assert_eq!(extract_from_pdf(&path), "");
    }
}
