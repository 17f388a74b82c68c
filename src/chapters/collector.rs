//! Candidate collection over every page of a document.

use super::options::ErrorMode;
use super::scorer::HeadingScorer;
use crate::error::{Error, Result};
use crate::model::HeadingCandidate;
use crate::parser::DocumentSource;

/// Run the scorer on every block of every page and keep the heading-gated ones.
///
/// Candidates come out sorted by page, keeping block order within a page.
/// Several candidates may share a page. In [`ErrorMode::Lenient`] a page whose
/// blocks cannot be read is logged and skipped.
pub fn collect_candidates(
    source: &dyn DocumentSource,
    scorer: &HeadingScorer,
    mode: ErrorMode,
) -> Result<Vec<HeadingCandidate>> {
    let mut candidates = Vec::new();

    for page in 0..source.page_count() {
        let blocks = match source.page_blocks(page) {
            Ok(blocks) => blocks,
            Err(e) => match mode {
                ErrorMode::Strict => return Err(into_page_error(page, e)),
                ErrorMode::Lenient => {
                    log::warn!("Skipping page {} during candidate collection: {}", page, e);
                    continue;
                }
            },
        };

        for block in blocks {
            let (is_heading, score) = scorer.evaluate(&block);
            if !is_heading {
                continue;
            }

            let text = block.text.trim().to_string();
            log::debug!("Heading candidate on page {} (score {}): {:?}", page, score, text);
            candidates.push(HeadingCandidate {
                page,
                text,
                bbox: block.bbox,
                score,
            });
        }
    }

    candidates.sort_by_key(|c| c.page);
    Ok(candidates)
}

/// Keep page-level failures typed as extraction failures.
pub(crate) fn into_page_error(page: u32, err: Error) -> Error {
    match err {
        Error::ExtractionFailure { .. } => err,
        other => Error::extraction(page, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, TextBlock, TocEntry};

    struct Pages(Vec<Option<Vec<(&'static str, f32)>>>);

    impl DocumentSource for Pages {
        fn page_count(&self) -> u32 {
            self.0.len() as u32
        }

        fn page_blocks(&self, page: u32) -> Result<Vec<TextBlock>> {
            match &self.0[page as usize] {
                Some(blocks) => Ok(blocks
                    .iter()
                    .map(|(text, size)| {
                        TextBlock::new(page, BoundingBox::new(0.0, 0.0, 100.0, 20.0), *text, *size)
                    })
                    .collect()),
                None => Err(Error::Corrupted("bad content stream".to_string())),
            }
        }

        fn page_text(&self, _page: u32) -> Result<String> {
            Ok(String::new())
        }

        fn toc(&self) -> Result<Vec<TocEntry>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_collects_in_page_order() {
        let source = Pages(vec![
            Some(vec![("Preface", 10.0), ("body text", 10.0)]),
            Some(vec![("body text", 10.0)]),
            Some(vec![("CHAPTER ONE", 16.0), ("II", 10.0)]),
        ]);

        let candidates =
            collect_candidates(&source, &HeadingScorer::default(), ErrorMode::Lenient).unwrap();

        let found: Vec<(u32, &str)> = candidates.iter().map(|c| (c.page, c.text.as_str())).collect();
        assert_eq!(found, vec![(0, "Preface"), (2, "CHAPTER ONE"), (2, "II")]);
        assert_eq!(candidates[1].score, 4.0);
    }

    #[test]
    fn test_lenient_skips_failed_page() {
        let source = Pages(vec![
            Some(vec![("CHAPTER ONE", 16.0)]),
            None,
            Some(vec![("CHAPTER TWO", 16.0)]),
        ]);

        let candidates =
            collect_candidates(&source, &HeadingScorer::default(), ErrorMode::Lenient).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1].page, 2);
    }

    #[test]
    fn test_strict_aborts_on_failed_page() {
        let source = Pages(vec![Some(vec![("CHAPTER ONE", 16.0)]), None]);

        let err = collect_candidates(&source, &HeadingScorer::default(), ErrorMode::Strict)
            .unwrap_err();
        assert!(matches!(err, Error::ExtractionFailure { page: 1, .. }));
    }

    #[test]
    fn test_candidate_text_is_trimmed() {
        let source = Pages(vec![Some(vec![("  Chapter 7\n", 10.0)])]);
        let candidates =
            collect_candidates(&source, &HeadingScorer::default(), ErrorMode::Lenient).unwrap();
        assert_eq!(candidates[0].text, "Chapter 7");
    }
}
