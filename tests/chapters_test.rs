//! Integration tests for chapter extraction through the public API.

use std::cell::RefCell;
use std::collections::HashMap;

use unbook::chapters::{collect_candidates, resolve_chapters};
use unbook::error::Result;
use unbook::render::{chapters_from_json, chapters_to_json};
use unbook::{
    BoundingBox, Chapter, ChapterConfig, ChapterExtractor, ChapterOrigin, DocumentSource, Error,
    ErrorMode, HeadingScorer, JsonFormat, TextBlock, TocEntry,
};

/// In-memory book: headings by page, text by page, optional outline.
#[derive(Default)]
struct FakeBook {
    pages: u32,
    headings: HashMap<u32, Vec<(&'static str, f32)>>,
    text: HashMap<u32, &'static str>,
    toc: Vec<TocEntry>,
    broken_pages: Vec<u32>,
    text_requests: RefCell<Vec<u32>>,
}

impl FakeBook {
    fn new(pages: u32) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }

    fn heading(mut self, page: u32, text: &'static str, size: f32) -> Self {
        self.headings.entry(page).or_default().push((text, size));
        self
    }

    fn text(mut self, page: u32, text: &'static str) -> Self {
        self.text.insert(page, text);
        self
    }

    fn broken(mut self, page: u32) -> Self {
        self.broken_pages.push(page);
        self
    }

    fn outline(mut self, entries: Vec<TocEntry>) -> Self {
        self.toc = entries;
        self
    }
}

impl DocumentSource for FakeBook {
    fn page_count(&self) -> u32 {
        self.pages
    }

    fn page_blocks(&self, page: u32) -> Result<Vec<TextBlock>> {
        if self.broken_pages.contains(&page) {
            return Err(Error::extraction(page, "cannot decode content stream"));
        }
        let mut blocks = vec![TextBlock::new(
            page,
            BoundingBox::new(72.0, 400.0, 540.0, 700.0),
            "Ordinary body text on the page.",
            10.0,
        )];
        for (text, size) in self.headings.get(&page).into_iter().flatten() {
            blocks.push(TextBlock::new(
                page,
                BoundingBox::new(72.0, 72.0, 400.0, 100.0),
                *text,
                *size,
            ));
        }
        Ok(blocks)
    }

    fn page_text(&self, page: u32) -> Result<String> {
        self.text_requests.borrow_mut().push(page);
        Ok(self.text.get(&page).copied().unwrap_or("body").to_string())
    }

    fn toc(&self) -> Result<Vec<TocEntry>> {
        Ok(self.toc.clone())
    }
}

fn assert_covers(chapters: &[Chapter], page_count: u32) {
    let mut next = 0;
    for chapter in chapters {
        assert_eq!(chapter.pages.start, next, "gap or overlap at {:?}", chapter);
        assert!(chapter.pages.end >= chapter.pages.start);
        next = chapter.pages.end;
    }
    assert_eq!(next, page_count);
}

#[test]
fn test_resolver_example_book() {
    let book = FakeBook::new(60)
        .heading(5, "CHAPTER ONE", 16.0)
        .heading(20, "CHAPTER TWO", 16.0)
        .heading(45, "CHAPTER THREE", 16.0)
        .text(46, "Appendix A");
    let config = ChapterConfig::default();

    let candidates =
        collect_candidates(&book, &HeadingScorer::new(config.heading.clone()), ErrorMode::Lenient)
            .unwrap();
    let pages: Vec<u32> = candidates.iter().map(|c| c.page).collect();
    assert_eq!(pages, vec![5, 20, 45]);

    let chapters =
        resolve_chapters(&candidates, 60, &config, |page| book.page_text(page)).unwrap();
    let inclusive: Vec<(u32, Option<u32>)> = chapters
        .iter()
        .map(|c| (c.start_page(), c.end_page()))
        .collect();
    assert_eq!(inclusive, vec![(5, Some(19)), (20, Some(44)), (45, Some(45))]);

    // The lookahead starts at the last heading's page and stops at the hit.
    assert_eq!(*book.text_requests.borrow(), vec![45, 46]);
}

#[test]
fn test_extractor_covers_every_page() {
    let books = vec![
        FakeBook::new(60)
            .heading(5, "CHAPTER ONE", 16.0)
            .heading(20, "CHAPTER TWO", 16.0)
            .heading(45, "CHAPTER THREE", 16.0)
            .text(46, "Appendix A"),
        FakeBook::new(10).heading(0, "Preface", 10.0),
        FakeBook::new(12)
            .heading(3, "PART ONE", 16.0)
            .heading(3, "Chapter 1", 16.0)
            .heading(7, "XIV", 10.0),
        FakeBook::new(8)
            .heading(7, "Chapter 9", 14.0)
            .text(7, "References"),
        FakeBook::new(30)
            .heading(2, "Chapter 1", 13.0)
            .heading(29, "Chapter 2", 13.0),
    ];

    for book in &books {
        let chapters = ChapterExtractor::default().extract_chapters(book).unwrap();
        assert!(!chapters.is_empty());
        assert_covers(&chapters, book.pages);
    }
}

#[test]
fn test_toc_adjacency_and_confidence() {
    let book = FakeBook::new(40)
        .heading(3, "CHAPTER ONE", 16.0)
        .outline(vec![
            TocEntry::new(1, "Contents", Some(0)),
            TocEntry::new(1, "Beginnings", Some(2)),
            TocEntry::new(2, "Early Days", Some(5)),
            TocEntry::new(1, "Endings", Some(31)),
        ]);

    let chapters = ChapterExtractor::default().extract_chapters(&book).unwrap();
    let inclusive: Vec<(&str, u32, Option<u32>)> = chapters
        .iter()
        .map(|c| (c.title.as_str(), c.start_page(), c.end_page()))
        .collect();
    assert_eq!(
        inclusive,
        vec![
            ("Contents", 0, Some(1)),
            ("Beginnings", 2, Some(4)),
            ("Early Days", 5, Some(30)),
            ("Endings", 31, Some(39)),
        ]
    );
    assert!(chapters.iter().all(|c| c.confidence == 1.0));
    assert!(chapters.iter().all(|c| c.origin == ChapterOrigin::Toc));

    // The heuristic path never ran.
    assert!(book.text_requests.borrow().is_empty());
}

#[test]
fn test_malformed_toc_does_not_fail() {
    let book = FakeBook::new(10).outline(vec![
        TocEntry::new(1, "Negative", Some(-4)),
        TocEntry::new(1, "Missing", None),
        TocEntry::new(1, "Past end", Some(99)),
        TocEntry::new(1, "Backwards", Some(2)),
    ]);

    let chapters = ChapterExtractor::default().extract_chapters(&book).unwrap();
    let ranges: Vec<_> = chapters.iter().map(|c| c.pages.clone()).collect();
    assert_eq!(ranges, vec![0..0, 0..9, 9..9, 2..10]);
}

#[test]
fn test_no_headings_gives_empty_list() {
    let book = FakeBook::new(15);
    let chapters = ChapterExtractor::default().extract_chapters(&book).unwrap();
    assert!(chapters.is_empty());
}

#[test]
fn test_broken_page_isolation() {
    let book = FakeBook::new(20)
        .heading(2, "CHAPTER ONE", 16.0)
        .heading(8, "CHAPTER TWO", 16.0)
        .heading(12, "CHAPTER THREE", 16.0)
        .broken(8);

    let lenient = ChapterExtractor::new(ChapterConfig::default().with_fill_gaps(false));
    let chapters = lenient.extract_chapters(&book).unwrap();
    let ranges: Vec<_> = chapters.iter().map(|c| c.pages.clone()).collect();
    assert_eq!(ranges, vec![2..12, 12..20]);

    let strict = ChapterExtractor::new(ChapterConfig::default().strict());
    assert!(matches!(
        strict.extract_chapters(&book),
        Err(Error::ExtractionFailure { page: 8, .. })
    ));
}

#[test]
fn test_confidence_from_score() {
    let book = FakeBook::new(5).heading(1, "CHAPTER II", 20.0);
    let extractor = ChapterExtractor::new(ChapterConfig::default().with_fill_gaps(false));
    let chapters = extractor.extract_chapters(&book).unwrap();

    // keyword + large font + uppercase + length
    assert_eq!(chapters[0].confidence, 1.0);
    assert_eq!(chapters[0].metadata.score, Some(4.0));

    let book = FakeBook::new(5).heading(1, "IV", 20.0);
    let chapters = extractor.extract_chapters(&book).unwrap();
    // roman + large font + uppercase
    assert_eq!(chapters[0].confidence, 1.0);

    // roman + large font + uppercase + length: above 1.0 and left as is
    let book = FakeBook::new(5).heading(1, "MMMDCCCLXXXVIII", 20.0);
    let chapters = extractor.extract_chapters(&book).unwrap();
    assert_eq!(chapters[0].confidence, 1.125);

    let capped = ChapterExtractor::new(
        ChapterConfig::default()
            .with_fill_gaps(false)
            .with_cap_confidence(true),
    );
    let chapters = capped.extract_chapters(&book).unwrap();
    assert_eq!(chapters[0].confidence, 1.0);
}

#[test]
fn test_chapter_records_round_trip() {
    let book = FakeBook::new(60)
        .heading(5, "CHAPTER ONE", 16.0)
        .heading(20, "xiv", 10.0)
        .heading(20, "Chapter 2", 10.0)
        .text(46, "Appendix A");

    let chapters = ChapterExtractor::default().extract_chapters(&book).unwrap();
    let json = chapters_to_json(&chapters, JsonFormat::Pretty).unwrap();
    let back = chapters_from_json(&json).unwrap();

    assert_eq!(back.len(), chapters.len());
    for (a, b) in chapters.iter().zip(&back) {
        assert_eq!(a.title, b.title);
        assert_eq!(a.start_page(), b.start_page());
        assert_eq!(a.end_page(), b.end_page());
        assert_eq!(a.confidence, b.confidence);
    }
    assert!(json.contains("\"end_page\": 19"));
}
