//! Quoted citation extraction from paragraph images.

use image::DynamicImage;
use regex::Regex;

use crate::error::Result;
use crate::model::{CitationResult, Quote};
use crate::paragraphs::binarize;
use crate::parser::TextRecognizer;

/// Confidence given to every quote found.
pub const QUOTE_CONFIDENCE: f64 = 0.9;

/// Confidence reported for the recognized text.
pub const OCR_CONFIDENCE: f64 = 0.95;

/// Runs OCR on paragraph images and pulls out quoted passages.
pub struct CitationExtractor<'a> {
    recognizer: &'a dyn TextRecognizer,
    binarize: bool,
    quote_re: Regex,
}

impl<'a> CitationExtractor<'a> {
    pub fn new(recognizer: &'a dyn TextRecognizer) -> Self {
        Self {
            recognizer,
            binarize: false,
            quote_re: Regex::new(r#""([^"]+)"|“([^”]+)”"#).unwrap(),
        }
    }

    /// Convert images to black and white before OCR.
    pub fn with_binarize(mut self, binarize: bool) -> Self {
        self.binarize = binarize;
        self
    }

    /// Recognize a paragraph image and extract its quotes.
    pub fn extract(&self, image: &DynamicImage) -> Result<CitationResult> {
        let full_text = if self.binarize {
            self.recognizer.recognize(&binarize(image))?
        } else {
            self.recognizer.recognize(image)?
        };

        let quotes = self.find_quotes(&full_text);
        log::debug!("Found {} quotes in paragraph", quotes.len());

        Ok(CitationResult {
            full_text,
            quotes,
            context: String::new(),
            ocr_confidence: OCR_CONFIDENCE,
        })
    }

    /// Quoted passages of a text, in order of appearance.
    pub fn find_quotes(&self, text: &str) -> Vec<Quote> {
        self.quote_re
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|m| Quote {
                quote_text: m.as_str().to_string(),
                confidence: QUOTE_CONFIDENCE,
            })
            .collect()
    }
}

/// Recognize a paragraph image and extract its quotes with default settings.
pub fn extract_citation_quotes(
    image: &DynamicImage,
    recognizer: &dyn TextRecognizer,
) -> Result<CitationResult> {
    CitationExtractor::new(recognizer).extract(image)
}
