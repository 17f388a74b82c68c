//! Chapter boundary detection.
//!
//! [`ChapterExtractor`] prefers the document outline. Only when a document has
//! no outline (or an empty one) does it fall back to the heuristic path:
//! score every text block ([`HeadingScorer`]), keep the heading-gated ones
//! ([`collect_candidates`]) and stitch them into page ranges
//! ([`resolve_chapters`]).
//!
//! # Example
//!
//! ```no_run
//! use unbook::chapters::{ChapterConfig, ChapterExtractor};
//! use unbook::parser::LopdfSource;
//!
//! let source = LopdfSource::open("book.pdf")?;
//! let chapters = ChapterExtractor::new(ChapterConfig::default()).extract_chapters(&source)?;
//! for chapter in &chapters {
//!     println!("{} {:?}", chapter.title, chapter.pages);
//! }
//! # Ok::<(), unbook::Error>(())
//! ```

mod collector;
mod options;
mod resolver;
mod scorer;
mod toc;

pub use collector::collect_candidates;
pub use options::{
    ChapterConfig, ErrorMode, HeadingConfig, DEFAULT_BACK_MATTER_TERMS, DEFAULT_CHAPTER_KEYWORDS,
};
pub use resolver::{find_back_matter, resolve_chapters};
pub use scorer::{default_rules, is_roman_numeral, BlockFeatures, HeadingRule, HeadingScorer};
pub use toc::chapters_from_toc;

use crate::error::{Error, Result};
use crate::model::{Chapter, ChapterOrigin, HeadingCandidate};
use crate::parser::{DocumentSource, PageRenderer, TextRecognizer};

/// Title of the chapter covering pages before the first heading.
pub const FRONT_MATTER_TITLE: &str = "Front Matter";

/// Title of the chapter covering pages after the last resolved chapter.
pub const BACK_MATTER_TITLE: &str = "Back Matter";

/// TOC-first chapter extractor.
pub struct ChapterExtractor<'a> {
    config: ChapterConfig,
    scorer: HeadingScorer,
    renderer: Option<&'a dyn PageRenderer>,
    recognizer: Option<&'a dyn TextRecognizer>,
}

impl<'a> ChapterExtractor<'a> {
    /// Create an extractor with the standard heading rules.
    pub fn new(config: ChapterConfig) -> Self {
        let scorer = HeadingScorer::new(config.heading.clone());
        Self {
            config,
            scorer,
            renderer: None,
            recognizer: None,
        }
    }

    /// Use a custom scorer.
    pub fn with_scorer(mut self, scorer: HeadingScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Attach the collaborators used for the OCR text fallback.
    pub fn with_ocr(
        mut self,
        renderer: &'a dyn PageRenderer,
        recognizer: &'a dyn TextRecognizer,
    ) -> Self {
        self.renderer = Some(renderer);
        self.recognizer = Some(recognizer);
        self
    }

    /// Options in use.
    pub fn config(&self) -> &ChapterConfig {
        &self.config
    }

    /// Extract chapters from a document.
    ///
    /// An empty result means no chapters were detected; it is not an error.
    pub fn extract_chapters(&self, source: &dyn DocumentSource) -> Result<Vec<Chapter>> {
        let page_count = source.page_count();

        let entries = match source.toc() {
            Ok(entries) => entries,
            Err(e) => match self.config.error_mode {
                ErrorMode::Strict => return Err(e),
                ErrorMode::Lenient => {
                    log::warn!("Failed to read outline, using heading detection: {}", e);
                    Vec::new()
                }
            },
        };

        if !entries.is_empty() {
            let chapters = chapters_from_toc(&entries, page_count);
            log::info!("Extracted {} chapters from outline", chapters.len());
            return Ok(chapters);
        }
        log::info!("No outline found; detecting chapter headings");

        let candidates = self.candidates(source)?;
        let mut chapters = resolve_chapters(&candidates, page_count, &self.config, |page| {
            self.page_text(source, page)
        })?;
        log::info!(
            "Detected {} chapters from {} heading candidates",
            chapters.len(),
            candidates.len()
        );

        if self.config.fill_gaps {
            fill_gaps(&mut chapters, page_count);
        }
        Ok(chapters)
    }

    /// Heading candidates of a document, in page order.
    pub fn candidates(&self, source: &dyn DocumentSource) -> Result<Vec<HeadingCandidate>> {
        collect_candidates(source, &self.scorer, self.config.error_mode)
    }

    /// Page text, recognized with OCR when extraction returns nothing and the
    /// fallback is enabled.
    pub fn page_text(&self, source: &dyn DocumentSource, page: u32) -> Result<String> {
        let text = source.page_text(page)?;
        if !text.trim().is_empty() || !self.config.ocr_fallback {
            return Ok(text);
        }

        match (self.renderer, self.recognizer) {
            (Some(renderer), Some(recognizer)) => {
                log::info!("Page {} has no text layer; using OCR", page);
                let image = renderer
                    .render_page(page, self.config.dpi)
                    .map_err(|e| Error::extraction(page, e))?;
                recognizer.recognize(&image)
            }
            _ => {
                log::debug!("OCR fallback enabled but no recognizer attached");
                Ok(text)
            }
        }
    }
}

impl Default for ChapterExtractor<'_> {
    fn default() -> Self {
        Self::new(ChapterConfig::default())
    }
}

/// Add front and back matter chapters so the chapters cover every page.
///
/// Does nothing for an empty list.
pub fn fill_gaps(chapters: &mut Vec<Chapter>, page_count: u32) {
    let (Some(first), Some(last)) = (chapters.first(), chapters.last()) else {
        return;
    };
    let (first_start, last_end) = (first.pages.start, last.pages.end);

    if last_end < page_count {
        chapters.push(Chapter::new(
            BACK_MATTER_TITLE,
            last_end..page_count,
            0.0,
            ChapterOrigin::Filler,
        ));
    }
    if first_start > 0 {
        chapters.insert(
            0,
            Chapter::new(FRONT_MATTER_TITLE, 0..first_start, 0.0, ChapterOrigin::Filler),
        );
    }
}

/// Extract chapters with default options.
pub fn extract_chapters(source: &dyn DocumentSource) -> Result<Vec<Chapter>> {
    ChapterExtractor::default().extract_chapters(source)
}
