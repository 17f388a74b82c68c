//! Chapter and table-of-contents types.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::BoundingBox;
use crate::error::Error;

/// How a chapter was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChapterOrigin {
    /// Taken from the document outline
    Toc,
    /// Inferred from a heading candidate
    #[default]
    Heading,
    /// Front or back matter added to cover pages outside any heading chapter
    Filler,
}

/// Optional details attached to a chapter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChapterMetadata {
    /// Raw heading score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Bounding box of the heading block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    /// Outline nesting level (1 = top level)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
}

impl ChapterMetadata {
    /// Check if no metadata is set.
    pub fn is_empty(&self) -> bool {
        self.score.is_none() && self.bbox.is_none() && self.level.is_none()
    }
}

/// A contiguous run of pages forming one chapter.
///
/// `pages` is half-open. An empty range (`start == end`) is kept for two
/// headings found on the same page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ChapterRecord", try_from = "ChapterRecord")]
pub struct Chapter {
    /// Heading text or outline title
    pub title: String,
    /// Zero-based pages of the chapter
    pub pages: Range<u32>,
    /// Confidence, nominally in [0, 1]
    pub confidence: f64,
    /// Where the chapter came from
    pub origin: ChapterOrigin,
    /// Extra details
    pub metadata: ChapterMetadata,
}

impl Chapter {
    /// Create a chapter without metadata.
    pub fn new(
        title: impl Into<String>,
        pages: Range<u32>,
        confidence: f64,
        origin: ChapterOrigin,
    ) -> Self {
        Self {
            title: title.into(),
            pages,
            confidence,
            origin,
            metadata: ChapterMetadata::default(),
        }
    }

    /// Attach metadata.
    pub fn with_metadata(mut self, metadata: ChapterMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// First page (inclusive).
    pub fn start_page(&self) -> u32 {
        self.pages.start
    }

    /// Last page (inclusive), or `None` for an empty chapter.
    pub fn end_page(&self) -> Option<u32> {
        if self.is_empty() {
            None
        } else {
            Some(self.pages.end - 1)
        }
    }

    /// Number of pages in the chapter.
    pub fn page_count(&self) -> u32 {
        self.pages.end.saturating_sub(self.pages.start)
    }

    /// Check if the chapter spans no pages.
    pub fn is_empty(&self) -> bool {
        self.pages.end <= self.pages.start
    }

    /// Check if a page belongs to the chapter.
    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains(&page)
    }

    /// Dictionary form of the chapter.
    pub fn to_record(&self) -> ChapterRecord {
        ChapterRecord::from(self.clone())
    }
}

/// Persisted dictionary form of a [`Chapter`].
///
/// `end_page` is inclusive, so an empty chapter has `end_page == start_page - 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterRecord {
    pub title: String,
    pub start_page: u32,
    pub end_page: i64,
    pub confidence: f64,
    #[serde(default)]
    pub origin: ChapterOrigin,
    #[serde(default, skip_serializing_if = "ChapterMetadata::is_empty")]
    pub metadata: ChapterMetadata,
}

impl From<Chapter> for ChapterRecord {
    fn from(chapter: Chapter) -> Self {
        Self {
            start_page: chapter.pages.start,
            end_page: i64::from(chapter.pages.end) - 1,
            title: chapter.title,
            confidence: chapter.confidence,
            origin: chapter.origin,
            metadata: chapter.metadata,
        }
    }
}

impl TryFrom<ChapterRecord> for Chapter {
    type Error = Error;

    fn try_from(record: ChapterRecord) -> Result<Self, Self::Error> {
        let end = record.end_page + 1;
        if end < i64::from(record.start_page) {
            return Err(Error::InvalidRecord(format!(
                "end page {} is before start page {}",
                record.end_page, record.start_page
            )));
        }
        let end = u32::try_from(end).map_err(|_| {
            Error::InvalidRecord(format!("end page {} is too large", record.end_page))
        })?;

        Ok(Chapter {
            title: record.title,
            pages: record.start_page..end,
            confidence: record.confidence,
            origin: record.origin,
            metadata: record.metadata,
        })
    }
}

/// One outline entry as reported by a document source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Nesting level (1 = top level)
    pub level: u8,
    /// Entry title
    pub title: String,
    /// Zero-based start page; `None` when the destination could not be resolved.
    /// May be negative or past the end in malformed outlines.
    pub start_page: Option<i64>,
}

impl TocEntry {
    /// Create a new outline entry.
    pub fn new(level: u8, title: impl Into<String>, start_page: Option<i64>) -> Self {
        Self {
            level,
            title: title.into(),
            start_page,
        }
    }
}
