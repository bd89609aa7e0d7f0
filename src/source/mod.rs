//! Text source adapters — file to raw text.
//!
//! Every adapter returns an empty string on failure and logs a warning;
//! the orchestrator treats empty text as the benign "nothing to extract"
//! case, never as an error.

pub mod image;
pub mod pdf;

use std::path::Path;

/// Supported source kinds. Plain text is the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Pdf,
    Image,
}

impl FileKind {
    /// Infer the kind from the file extension.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();
        match ext.as_str() {
            "pdf" => Self::Pdf,
            "png" | "jpg" | "jpeg" | "bmp" | "tiff" | "tif" | "gif" | "webp" => Self::Image,
            _ => Self::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Pdf => "pdf",
            Self::Image => "image",
        }
    }
}

/// Extract raw text from a file. Empty string on any failure.
pub fn extract_text(path: &Path, kind: FileKind, ocr_language: &str) -> String {
    match kind {
        FileKind::Text => read_plain_text(path),
        FileKind::Pdf => pdf::extract_from_pdf(path),
        FileKind::Image => image::extract_from_image(path, ocr_language),
    }
}

fn read_plain_text(path: &Path) -> String {
    match std::fs::read(path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read text file");
            String::new()
        }
    }
}
