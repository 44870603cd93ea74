//! Image OCR with preprocessing.
//!
//! Small scans and photographed resumes OCR poorly as-is. The pipeline
//! here mirrors what recognition engines want: grayscale, a 2x
//! high-quality upscale, and mean-threshold binarization, before
//! handing the page to tesseract as a single text block.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageBuffer, ImageFormat, Luma};
use tracing::{debug, error, info, warn};

use crate::error::OcrResult;
use crate::extract::ocr::OcrEngine;
use crate::text::fix_ocr_artifacts;

/// Extract text from an image. Requires an OCR engine; without one the
/// result is empty. Best-effort: decode or OCR failures log and yield
/// empty text.
pub fn extract_image(bytes: &[u8], ocr: Option<&OcrEngine>) -> String {
    let Some(engine) = ocr else {
        warn!("OCR not available, skipping image extraction");
        return String::new();
    };

    match ocr_preprocessed(bytes, engine) {
        Ok(text) => fix_ocr_artifacts(&text),
        Err(err) => {
            error!(error = %err, "image OCR error");
            String::new()
        }
    }
}

fn ocr_preprocessed(bytes: &[u8], engine: &OcrEngine) -> OcrResult<String> {
    let decoded = image::load_from_memory(bytes)?;
    let gray = decoded.to_luma8();
    debug!("converted image to grayscale");

    let (width, height) = gray.dimensions();
    info!(width, height, "processing image");
    let scaled = image::imageops::resize(&gray, width * 2, height * 2, FilterType::Lanczos3);
    debug!(width = width * 2, height = height * 2, "enlarged image 2x");

    let binarized = binarize_at_mean(&scaled);
    debug!("applied adaptive thresholding");

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(binarized).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

    let text = engine.recognize(&png)?;
    info!(chars = text.len(), "OCR extracted characters");
    Ok(text)
}

/// Threshold at the image's mean pixel value: strictly above goes
/// white, at-or-below goes black.
fn binarize_at_mean(gray: &ImageBuffer<Luma<u8>, Vec<u8>>) -> ImageBuffer<Luma<u8>, Vec<u8>> {
    let (width, height) = gray.dimensions();
    let pixel_count = (width as u64) * (height as u64);
    if pixel_count == 0 {
        return gray.clone();
    }

    let sum: u64 = gray.pixels().map(|p| p.0[0] as u64).sum();
    let mean = (sum / pixel_count) as u8;

    ImageBuffer::from_fn(width, height, |x, y| {
        if gray.get_pixel(x, y).0[0] > mean {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}
