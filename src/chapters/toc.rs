//! Outline entries to chapters.

use crate::model::{Chapter, ChapterMetadata, ChapterOrigin, TocEntry};

/// Build chapters from outline entries by adjacent-entry differencing.
///
/// Entry `i` runs up to the page before entry `i + 1` starts; the last entry
/// runs to the end of the document. Every chapter has confidence 1.0.
///
/// Malformed outlines never fail: start pages are clamped to the document,
/// an entry without a page starts where the previous one did, and an entry
/// followed by an earlier one gets an empty range.
pub fn chapters_from_toc(entries: &[TocEntry], page_count: u32) -> Vec<Chapter> {
    let last_page = i64::from(page_count.saturating_sub(1));

    let mut starts = Vec::with_capacity(entries.len());
    let mut previous = 0u32;
    for entry in entries {
        let start = match entry.start_page {
            Some(page) => page.clamp(0, last_page) as u32,
            None => {
                log::warn!("Outline entry {:?} has no page; using page {}", entry.title, previous);
                previous
            }
        };
        starts.push(start);
        previous = start;
    }

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let start = starts[i];
            let end = match starts.get(i + 1) {
                Some(&next) => next.max(start),
                None => page_count.max(start),
            };
            Chapter::new(entry.title.clone(), start..end, 1.0, ChapterOrigin::Toc).with_metadata(
                ChapterMetadata {
                    level: Some(entry.level),
                    ..Default::default()
                },
            )
        })
        .collect()
}
