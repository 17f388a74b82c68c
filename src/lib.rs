//! # unbook
//!
//! Structure extraction for book PDFs.
//!
//! This library finds chapter boundaries in a book, splits rendered pages
//! into paragraphs and pulls quoted citations out of paragraph text.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unbook::{extract_chapters, render};
//!
//! fn main() -> unbook::Result<()> {
//!     let chapters = extract_chapters("book.pdf")?;
//!     print!("{}", render::chapters_to_text(&chapters));
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Outline first**: chapters come straight from the PDF outline when it has one
//! - **Heading detection**: weighted keyword, font, case and numeral rules otherwise
//! - **Paragraphs**: vertical-gap grouping of layout regions, cropped and recognized
//! - **Citations**: quoted passages from recognized paragraph text
//! - **Pluggable collaborators**: rasterizer, OCR engine and layout model are traits

pub mod chapters;
pub mod citation;
pub mod config;
pub mod detect;
pub mod error;
pub mod export;
pub mod model;
pub mod paragraphs;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use chapters::{ChapterConfig, ChapterExtractor, ErrorMode, HeadingConfig, HeadingScorer};
pub use citation::{extract_citation_quotes, CitationExtractor};
pub use config::Config;
pub use error::{Error, Result};
pub use export::{ChapterImageExporter, ExportConfig};
pub use model::{
    BoundingBox, Chapter, ChapterOrigin, ChapterRecord, CitationResult, DocumentInfo,
    HeadingCandidate, LayoutBlock, LayoutKind, Paragraph, PixelBox, Quote, TextBlock, TocEntry,
};
pub use paragraphs::{ParagraphConfig, ParagraphDetector};
pub use parser::{DocumentSource, LayoutDetector, LopdfSource, PageRenderer, TextRecognizer};
pub use render::JsonFormat;

use std::path::Path;

/// Extract the chapters of a PDF file with default options.
///
/// # Example
///
/// ```no_run
/// use unbook::extract_chapters;
///
/// let chapters = extract_chapters("book.pdf").unwrap();
/// println!("Chapters: {}", chapters.len());
/// ```
pub fn extract_chapters<P: AsRef<Path>>(path: P) -> Result<Vec<Chapter>> {
    extract_chapters_with_config(path, &ChapterConfig::default())
}

/// Extract the chapters of a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use unbook::{extract_chapters_with_config, ChapterConfig};
///
/// let config = ChapterConfig::new().strict().with_fill_gaps(false);
/// let chapters = extract_chapters_with_config("book.pdf", &config).unwrap();
/// ```
pub fn extract_chapters_with_config<P: AsRef<Path>>(
    path: P,
    config: &ChapterConfig,
) -> Result<Vec<Chapter>> {
    let source = LopdfSource::open(path)?;
    ChapterExtractor::new(config.clone()).extract_chapters(&source)
}

/// Extract the chapters of an in-memory PDF with default options.
pub fn extract_chapters_from_bytes(data: &[u8]) -> Result<Vec<Chapter>> {
    let source = LopdfSource::from_bytes(data)?;
    ChapterExtractor::default().extract_chapters(&source)
}

/// Convert the chapters of a PDF file to JSON.
///
/// # Example
///
/// ```no_run
/// use unbook::{to_json, JsonFormat};
///
/// let json = to_json("book.pdf", JsonFormat::Pretty).unwrap();
/// std::fs::write("chapters.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let chapters = extract_chapters(path)?;
    render::chapters_to_json(&chapters, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_unavailable() {
        let result = extract_chapters("/nonexistent/book.pdf");
        assert!(matches!(result, Err(Error::DocumentUnavailable(_))));
    }

    #[test]
    fn test_from_bytes_empty_data() {
        let data: [u8; 0] = [];
        assert!(matches!(
            extract_chapters_from_bytes(&data),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_from_bytes_unknown_magic() {
        let data = b"<!DOCTYPE html><html></html>";
        assert!(extract_chapters_from_bytes(data).is_err());
    }

    #[test]
    fn test_from_bytes_truncated_pdf() {
        let data = b"%PDF-1.7\n%truncated";
        assert!(extract_chapters_from_bytes(data).is_err());
    }

    #[test]
    fn test_json_format_default() {
        assert_eq!(JsonFormat::default(), JsonFormat::Pretty);
    }
}
