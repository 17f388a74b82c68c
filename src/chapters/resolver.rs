//! Boundary resolution: heading candidates to chapter page ranges.

use std::ops::Range;

use super::collector::into_page_error;
use super::options::{ChapterConfig, ErrorMode};
use crate::error::Result;
use crate::model::{Chapter, ChapterMetadata, ChapterOrigin, HeadingCandidate};

/// Turn page-sorted candidates into chapters.
///
/// Each chapter runs from its candidate's page up to the page before the next
/// candidate. Two candidates on one page give an empty chapter; they are not
/// merged. The last chapter ends before the first page, starting at its own,
/// whose text mentions a back matter term, or at the end of the document.
///
/// `page_text` supplies page text for that lookahead.
pub fn resolve_chapters<F>(
    candidates: &[HeadingCandidate],
    page_count: u32,
    config: &ChapterConfig,
    page_text: F,
) -> Result<Vec<Chapter>>
where
    F: FnMut(u32) -> Result<String>,
{
    let Some(last) = candidates.last() else {
        return Ok(Vec::new());
    };

    let mut chapters: Vec<Chapter> = candidates
        .windows(2)
        .map(|pair| {
            let (current, next) = (&pair[0], &pair[1]);
            to_chapter(current, current.page..next.page.max(current.page), config)
        })
        .collect();

    let end = find_back_matter(last.page, page_count, config, page_text)?.unwrap_or(page_count);
    chapters.push(to_chapter(last, last.page..end.max(last.page), config));

    Ok(chapters)
}

/// First page in `from..page_count` whose lower-cased text contains a back matter term.
pub fn find_back_matter<F>(
    from: u32,
    page_count: u32,
    config: &ChapterConfig,
    mut page_text: F,
) -> Result<Option<u32>>
where
    F: FnMut(u32) -> Result<String>,
{
    for page in from..page_count {
        let text = match page_text(page) {
            Ok(text) => text.to_lowercase(),
            Err(e) => match config.error_mode {
                ErrorMode::Strict => return Err(into_page_error(page, e)),
                ErrorMode::Lenient => {
                    log::warn!("Skipping page {} during back matter lookahead: {}", page, e);
                    continue;
                }
            },
        };

        if config
            .back_matter_terms
            .iter()
            .any(|term| text.contains(term.as_str()))
        {
            log::debug!("Back matter found on page {}", page);
            return Ok(Some(page));
        }
    }
    Ok(None)
}

fn to_chapter(candidate: &HeadingCandidate, pages: Range<u32>, config: &ChapterConfig) -> Chapter {
    Chapter::new(
        candidate.text.clone(),
        pages,
        config.confidence(candidate.score),
        ChapterOrigin::Heading,
    )
    .with_metadata(ChapterMetadata {
        score: Some(candidate.score),
        bbox: Some(candidate.bbox),
        level: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::BoundingBox;

    fn candidate(page: u32, text: &str, score: f64) -> HeadingCandidate {
        HeadingCandidate {
            page,
            text: text.to_string(),
            bbox: BoundingBox::new(72.0, 72.0, 300.0, 96.0),
            score,
        }
    }

    fn no_text(_page: u32) -> Result<String> {
        Ok(String::new())
    }

    #[test]
    fn test_empty_candidates() {
        let chapters = resolve_chapters(&[], 10, &ChapterConfig::default(), no_text).unwrap();
        assert!(chapters.is_empty());
    }

    #[test]
    fn test_appendix_closes_last_chapter() {
        let candidates = vec![
            candidate(5, "CHAPTER ONE", 4.0),
            candidate(20, "CHAPTER TWO", 4.0),
            candidate(45, "CHAPTER THREE", 3.5),
        ];

        let chapters = resolve_chapters(&candidates, 60, &ChapterConfig::default(), |page| {
            Ok(if page == 46 {
                "Appendix A: Tables".to_string()
            } else {
                "body".to_string()
            })
        })
        .unwrap();

        let ranges: Vec<Range<u32>> = chapters.iter().map(|c| c.pages.clone()).collect();
        assert_eq!(ranges, vec![5..20, 20..45, 45..46]);

        let inclusive: Vec<(u32, Option<u32>)> = chapters
            .iter()
            .map(|c| (c.start_page(), c.end_page()))
            .collect();
        assert_eq!(inclusive, vec![(5, Some(19)), (20, Some(44)), (45, Some(45))]);
    }

    #[test]
    fn test_last_chapter_runs_to_end() {
        let candidates = vec![candidate(3, "Chapter 1", 2.5)];
        let chapters =
            resolve_chapters(&candidates, 12, &ChapterConfig::default(), no_text).unwrap();
        assert_eq!(chapters[0].pages, 3..12);
    }

    #[test]
    fn test_references_instead_of_appendix() {
        let candidates = vec![candidate(0, "Chapter 1", 2.5)];
        let chapters = resolve_chapters(&candidates, 10, &ChapterConfig::default(), |page| {
            Ok(if page >= 8 { "REFERENCES".to_string() } else { String::new() })
        })
        .unwrap();
        assert_eq!(chapters[0].pages, 0..8);
    }

    #[test]
    fn test_back_matter_on_heading_page_gives_empty_chapter() {
        let candidates = vec![candidate(4, "APPENDIX", 2.5)];
        let chapters = resolve_chapters(&candidates, 10, &ChapterConfig::default(), |_| {
            Ok("Appendix".to_string())
        })
        .unwrap();
        assert_eq!(chapters[0].pages, 4..4);
        assert!(chapters[0].is_empty());
    }

    #[test]
    fn test_same_page_candidates_not_merged() {
        let candidates = vec![
            candidate(2, "PART ONE", 3.0),
            candidate(2, "Chapter 1", 2.5),
            candidate(9, "Chapter 2", 2.5),
        ];
        let chapters =
            resolve_chapters(&candidates, 15, &ChapterConfig::default(), no_text).unwrap();

        assert_eq!(chapters.len(), 3);
        assert_eq!(chapters[0].pages, 2..2);
        assert_eq!(chapters[1].pages, 2..9);
        assert_eq!(chapters[2].pages, 9..15);
    }

    #[test]
    fn test_confidence_and_metadata() {
        let candidates = vec![candidate(0, "CHAPTER ONE", 6.0)];
        let chapters =
            resolve_chapters(&candidates, 5, &ChapterConfig::default(), no_text).unwrap();
        assert_eq!(chapters[0].confidence, 1.5);
        assert_eq!(chapters[0].metadata.score, Some(6.0));
        assert!(chapters[0].metadata.bbox.is_some());
        assert_eq!(chapters[0].origin, ChapterOrigin::Heading);

        let capped = ChapterConfig::default().with_cap_confidence(true);
        let chapters = resolve_chapters(&candidates, 5, &capped, no_text).unwrap();
        assert_eq!(chapters[0].confidence, 1.0);
    }

    #[test]
    fn test_lookahead_failure_modes() {
        let candidates = vec![candidate(0, "Chapter 1", 2.5)];
        let failing = |page: u32| {
            if page == 1 {
                Err(Error::Other("render failed".to_string()))
            } else if page == 3 {
                Ok("appendix".to_string())
            } else {
                Ok(String::new())
            }
        };

        let chapters =
            resolve_chapters(&candidates, 6, &ChapterConfig::default(), failing).unwrap();
        assert_eq!(chapters[0].pages, 0..3);

        let err = resolve_chapters(&candidates, 6, &ChapterConfig::default().strict(), failing)
            .unwrap_err();
        assert!(matches!(err, Error::ExtractionFailure { page: 1, .. }));
    }
}
