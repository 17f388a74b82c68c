//! Plain text rendering of chapter lists.

use crate::model::{Chapter, ChapterOrigin};

/// One line per chapter: index, inclusive page range, confidence, title.
///
/// Pages are shown one-based. Filler chapters are marked with `*`.
pub fn chapters_to_text(chapters: &[Chapter]) -> String {
    let mut output = String::new();

    for (i, chapter) in chapters.iter().enumerate() {
        let pages = match chapter.end_page() {
            Some(end) if end == chapter.start_page() => format!("{}", end + 1),
            Some(end) => format!("{}-{}", chapter.start_page() + 1, end + 1),
            None => "-".to_string(),
        };
        let marker = if chapter.origin == ChapterOrigin::Filler {
            "*"
        } else {
            " "
        };

        output.push_str(&format!(
            "{:>3}{} {:<11} {:>6.3}  {}\n",
            i + 1,
            marker,
            pages,
            chapter.confidence,
            chapter.title
        ));
    }

    output
}
