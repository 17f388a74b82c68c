//! Collaborator interfaces consumed by the extraction pipelines.
//!
//! The chapter engine only ever sees a [`DocumentSource`]; the image
//! pipelines see a [`LayoutDetector`] and a [`TextRecognizer`]. Keeping these
//! as traits isolates the heuristics from lopdf, from any rasterizer and from
//! any OCR engine, and lets tests drive them with in-memory fakes.

use image::DynamicImage;

use crate::error::Result;
use crate::model::{LayoutBlock, TextBlock, TocEntry};

/// Per-page text and layout access to an opened document.
///
/// Page indices are zero-based. Implementations own exclusive access to the
/// underlying document for the duration of a call.
pub trait DocumentSource {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Text blocks on a page, in reading order.
    fn page_blocks(&self, page: u32) -> Result<Vec<TextBlock>>;

    /// Plain text of a page. May be empty for scanned pages.
    fn page_text(&self, page: u32) -> Result<String>;

    /// Outline entries in document order; empty when the document has none.
    fn toc(&self) -> Result<Vec<TocEntry>>;
}

/// Rasterizes document pages.
pub trait PageRenderer {
    /// Render a zero-based page at the given resolution.
    fn render_page(&self, page: u32, dpi: u32) -> Result<DynamicImage>;
}

/// OCR engine.
pub trait TextRecognizer {
    /// Recognize the text in an image.
    fn recognize(&self, image: &DynamicImage) -> Result<String>;
}

/// Layout model that classifies regions of a page image.
pub trait LayoutDetector {
    /// Detect layout regions on an image.
    fn detect(&self, image: &DynamicImage) -> Result<Vec<LayoutBlock>>;
}

/// Simple text decoding fallback when no font encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let utf16: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
