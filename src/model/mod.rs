//! Data model shared by the chapter, paragraph and citation pipelines.
//!
//! Everything here is plain data: blocks come out of a document source,
//! candidates and chapters come out of the chapter engine, paragraphs and
//! citations come out of the image pipelines. Records that are persisted have
//! a serde form.

mod block;
mod chapter;
mod citation;
mod document;
mod paragraph;

pub use block::{BoundingBox, HeadingCandidate, TextBlock};
pub use chapter::{Chapter, ChapterMetadata, ChapterOrigin, ChapterRecord, TocEntry};
pub use citation::{CitationResult, Quote};
pub use document::DocumentInfo;
pub use paragraph::{LayoutBlock, LayoutKind, Paragraph, ParagraphRecord, PixelBox};
