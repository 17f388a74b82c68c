//! JSON rendering for chapter, paragraph and citation records.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{Chapter, Paragraph, ParagraphRecord};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize any record to JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Chapters in their dictionary form.
pub fn chapters_to_json(chapters: &[Chapter], format: JsonFormat) -> Result<String> {
    to_json(chapters, format)
}

/// Parse chapters back from their dictionary form.
pub fn chapters_from_json(json: &str) -> Result<Vec<Chapter>> {
    serde_json::from_str(json).map_err(|e| Error::InvalidRecord(e.to_string()))
}

/// Paragraph records, without pixel data.
pub fn paragraphs_to_json(paragraphs: &[Paragraph], format: JsonFormat) -> Result<String> {
    let records: Vec<ParagraphRecord> = paragraphs.iter().map(Paragraph::record).collect();
    to_json(&records, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChapterOrigin, CitationResult, Quote};

    #[test]
    fn test_to_json_pretty() {
        let chapters = vec![Chapter::new("Preface", 0..3, 1.0, ChapterOrigin::Toc)];
        let json = chapters_to_json(&chapters, JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"title\": \"Preface\""));
        assert!(json.contains("\"end_page\": 2"));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact() {
        let result = CitationResult {
            full_text: "\"a\"".to_string(),
            quotes: vec![Quote {
                quote_text: "a".to_string(),
                confidence: 0.9,
            }],
            context: String::new(),
            ocr_confidence: 0.95,
        };
        let json = to_json(&result, JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.contains("\"quote_text\":\"a\""));
    }

    #[test]
    fn test_chapters_round_trip() {
        let chapters = vec![
            Chapter::new("CHAPTER ONE", 5..20, 1.0, ChapterOrigin::Heading),
            Chapter::new("CHAPTER TWO", 20..20, 0.625, ChapterOrigin::Heading),
        ];
        let json = chapters_to_json(&chapters, JsonFormat::Compact).unwrap();
        assert_eq!(chapters_from_json(&json).unwrap(), chapters);
    }

    #[test]
    fn test_chapters_from_invalid_json() {
        let json = r#"[{"title":"x","start_page":9,"end_page":2,"confidence":1.0}]"#;
        assert!(matches!(chapters_from_json(json), Err(Error::InvalidRecord(_))));
    }
}
