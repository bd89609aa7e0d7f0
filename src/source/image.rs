//! Image OCR — fixed preprocessing pipeline, then Tesseract CLI.
//!
//! Preprocessing before OCR: grayscale, contrast boost, median denoise,
//! binary threshold, 2x upscale. Requires `tesseract` on PATH; any failure
//! (missing binary, unreadable image) yields an empty string.

use std::path::Path;
use std::process::Command;

use image::imageops::FilterType;
use image::GrayImage;

use crate::constants::{OCR_CONTRAST_BOOST, OCR_THRESHOLD, OCR_UPSCALE_FACTOR};

/// Extract text from an image via OCR. Empty string on any failure.
pub fn extract_from_image(path: &Path, lang: &str) -> String {
    let img = match image::open(path) {
        Ok(img) => img,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to open image");
            return String::new();
        }
    };

    let processed = preprocess_for_ocr(&img);

    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to create OCR scratch dir");
            return String::new();
        }
    };
    let scratch = dir.path().join("ocr_input.png");
    if let Err(e) = processed.save(&scratch) {
        tracing::warn!(error = %e, "Failed to write preprocessed image");
        return String::new();
    }

    match run_tesseract(&scratch, lang) {
        Ok(text) => {
            tracing::info!(path = %path.display(), chars = text.len(), "Image OCR complete");
            text
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Image OCR failed");
            String::new()
        }
    }
}

/// Grayscale → contrast boost → median denoise → threshold → 2x upscale.
fn preprocess_for_ocr(img: &image::DynamicImage) -> GrayImage {
    let gray = img.to_luma8();
    let contrasted = image::imageops::contrast(&gray, OCR_CONTRAST_BOOST);
    let mut denoised = imageproc::filter::median_filter(&contrasted, 1, 1);

    for pixel in denoised.pixels_mut() {
        pixel.0[0] = if pixel.0[0] > OCR_THRESHOLD { 255 } else { 0 };
    }

    let (width, height) = denoised.dimensions();
    image::imageops::resize(
        &denoised,
        width * OCR_UPSCALE_FACTOR,
        height * OCR_UPSCALE_FACTOR,
        FilterType::Lanczos3,
    )
}

fn run_tesseract(image_path: &Path, lang: &str) -> Result<String, String> {
    let output = Command::new("tesseract")
        .arg(image_path.as_os_str())
        .arg("stdout")
        .arg("-l")
        .arg(lang)
        .output()
        .map_err(|e| format!("failed to run tesseract (is it installed?): {}", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("tesseract exited with {}: {}", output.status, stderr));
    }

    // Strip the form feed tesseract appends to each page.
    let text = String::from_utf8_lossy(&output.stdout)
        .replace('\x0c', "")
        .trim()
        .to_string();
    Ok(text)
}

/// Check whether the tesseract binary is available on PATH.
pub fn is_tesseract_available() -> bool {
    Command::new("tesseract")
        .arg("--version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
