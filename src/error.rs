//! Error types for unbook library.

use std::io;
use thiserror::Error;

/// Result type alias for unbook operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting chapters, paragraphs or citations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The document file is missing or the handle was never opened.
    #[error("Document unavailable: {0}")]
    DocumentUnavailable(String),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The PDF structure is corrupted or malformed.
    #[error("Corrupted PDF structure: {0}")]
    Corrupted(String),

    /// The PDF document is encrypted and cannot be read.
    #[error("Document is encrypted")]
    Encrypted,

    /// A rasterization or text-extraction collaborator failed on a page.
    #[error("Extraction failed on page {page}: {reason}")]
    ExtractionFailure {
        /// Zero-based page index
        page: u32,
        /// Collaborator error message
        reason: String,
    },

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// The layout detector failed.
    #[error("Layout detection error: {0}")]
    Layout(String),

    /// Text recognition (OCR) failed.
    #[error("Text recognition error: {0}")]
    Recognition(String),

    /// Error cropping, merging or saving an image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error during rendering (JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// A chapter record does not describe a valid page range.
    #[error("Invalid chapter record: {0}")]
    InvalidRecord(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build an [`Error::ExtractionFailure`] for a page.
    pub fn extraction(page: u32, reason: impl std::fmt::Display) -> Self {
        Error::ExtractionFailure {
            page,
            reason: reason.to_string(),
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::Corrupted(err.to_string()),
        }
    }
}
