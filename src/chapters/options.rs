//! Chapter detection options and configuration.

use serde::{Deserialize, Serialize};

/// Keywords whose presence marks a block as a heading.
pub const DEFAULT_CHAPTER_KEYWORDS: &[&str] = &[
    "CHAPTER", "Chapter", "SECTION", "Section", "BOOK", "Book", "PART", "Part", "Preface",
    "Contents", "APPENDIX", "Appendix",
];

/// Words that end the last chapter when they appear on a later page.
pub const DEFAULT_BACK_MATTER_TERMS: &[&str] = &["appendix", "references"];

/// Options for the heading scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeadingConfig {
    /// Case-sensitive substrings that mark a heading
    pub keywords: Vec<String>,

    /// First-run font size above which any block is a heading
    pub gate_font_size: f32,

    /// First-run font size above which the score is boosted
    pub large_font_size: f32,

    /// Shortest trimmed text (in characters) that earns the length bonus
    pub min_heading_len: usize,

    /// Longest trimmed text (in characters) that earns the length bonus
    pub max_heading_len: usize,
}

impl HeadingConfig {
    /// Create heading options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the keyword list.
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set the gate font size.
    pub fn with_gate_font_size(mut self, size: f32) -> Self {
        self.gate_font_size = size;
        self
    }

    /// Set the large font size.
    pub fn with_large_font_size(mut self, size: f32) -> Self {
        self.large_font_size = size;
        self
    }
}

impl Default for HeadingConfig {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_CHAPTER_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            gate_font_size: 12.0,
            large_font_size: 14.0,
            min_heading_len: 10,
            max_heading_len: 100,
        }
    }
}

/// Options for chapter extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChapterConfig {
    /// Heading scorer options
    pub heading: HeadingConfig,

    /// Lower-case terms that end the last chapter on the page before they appear
    pub back_matter_terms: Vec<String>,

    /// Divisor turning a heading score into a confidence
    pub confidence_scale: f64,

    /// Clamp confidences to 1.0
    pub cap_confidence: bool,

    /// Add front and back matter chapters so chapters cover every page
    pub fill_gaps: bool,

    /// What to do when a page cannot be read
    pub error_mode: ErrorMode,

    /// Recognize page text with OCR when extraction returns nothing
    pub ocr_fallback: bool,

    /// Resolution for OCR fallback renders
    pub dpi: u32,
}

impl ChapterConfig {
    /// Create chapter options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set heading options.
    pub fn with_heading(mut self, heading: HeadingConfig) -> Self {
        self.heading = heading;
        self
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Fail on the first unreadable page.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Enable or disable front/back matter filling.
    pub fn with_fill_gaps(mut self, fill: bool) -> Self {
        self.fill_gaps = fill;
        self
    }

    /// Enable or disable confidence capping.
    pub fn with_cap_confidence(mut self, cap: bool) -> Self {
        self.cap_confidence = cap;
        self
    }

    /// Enable or disable OCR fallback for empty pages.
    pub fn with_ocr_fallback(mut self, enabled: bool) -> Self {
        self.ocr_fallback = enabled;
        self
    }

    /// Set OCR render resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Replace the back matter terms.
    pub fn with_back_matter_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.back_matter_terms = terms.into_iter().map(Into::into).collect();
        self
    }

    /// Convert a heading score into a confidence.
    pub fn confidence(&self, score: f64) -> f64 {
        let confidence = if self.confidence_scale > 0.0 {
            score / self.confidence_scale
        } else {
            score
        };
        if self.cap_confidence {
            confidence.min(1.0)
        } else {
            confidence
        }
    }
}

impl Default for ChapterConfig {
    fn default() -> Self {
        Self {
            heading: HeadingConfig::default(),
            back_matter_terms: DEFAULT_BACK_MATTER_TERMS
                .iter()
                .map(|t| t.to_string())
                .collect(),
            confidence_scale: 4.0,
            cap_confidence: false,
            fill_gaps: true,
            error_mode: ErrorMode::Lenient,
            ocr_fallback: false,
            dpi: 300,
        }
    }
}

/// Error handling mode for per-page failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Fail on the first page error
    Strict,
    /// Log the failing page, skip it and continue
    #[default]
    Lenient,
}
