//! Citation quotes found in paragraph text.

use serde::{Deserialize, Serialize};

/// A quoted passage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Text between the quote marks, verbatim
    pub quote_text: String,
    pub confidence: f64,
}

/// Result of running citation extraction on one paragraph image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationResult {
    /// Full recognized text
    pub full_text: String,
    /// Quotes in order of appearance
    pub quotes: Vec<Quote>,
    /// Surrounding context; currently always empty
    pub context: String,
    pub ocr_confidence: f64,
}
