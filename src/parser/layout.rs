//! Layout analysis for PDF pages.
//!
//! Decodes a page content stream into positioned text spans, groups spans
//! into lines by baseline and lines into blocks by spacing, and reports each
//! block with its bounding box and the font size of its first run.

use std::collections::BTreeMap;

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use super::backend::decode_text_simple;
use crate::error::{Error, Result};
use crate::model::{BoundingBox, TextBlock};

/// Default text leading when a stream moves lines without setting `TL`.
const DEFAULT_LEADING: f32 = 12.0;

/// A text span with position and size.
#[derive(Debug, Clone)]
pub(crate) struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline, PDF user space, bottom-up)
    pub y: f32,
    /// Estimated advance width
    pub width: f32,
    /// Font size in points
    pub font_size: f32,
}

impl TextSpan {
    pub fn new(text: String, x: f32, y: f32, font_size: f32) -> Self {
        // Without glyph metrics, assume an average advance of half the em.
        let width = text.chars().count() as f32 * font_size * 0.5;
        Self {
            text,
            x,
            y,
            width,
            font_size,
        }
    }

    fn top(&self) -> f32 {
        self.y + self.font_size * 0.8 // Approximate ascender
    }

    fn bottom(&self) -> f32 {
        self.y - self.font_size * 0.2 // Approximate descender
    }

    fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// A text line composed of spans on the same baseline.
#[derive(Debug, Clone)]
pub(crate) struct TextLine {
    /// Spans sorted by X position
    pub spans: Vec<TextSpan>,
    /// Baseline Y
    pub y: f32,
    /// Leftmost X
    pub x: f32,
    /// Dominant font size (weighted by text length)
    pub font_size: f32,
}

impl TextLine {
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

        let total_chars: usize = spans.iter().map(|s| s.text.len()).sum();
        let weighted_size: f32 = spans
            .iter()
            .map(|s| s.font_size * s.text.len() as f32)
            .sum();
        let font_size = match spans.first() {
            Some(_) if total_chars > 0 => weighted_size / total_chars as f32,
            Some(first) => first.font_size,
            None => 0.0,
        };

        let (x, y) = spans.first().map(|s| (s.x, s.y)).unwrap_or((0.0, 0.0));
        Self {
            spans,
            y,
            x,
            font_size,
        }
    }

    /// Combined text, inserting a space where the gap between spans is wide
    /// enough and neither side is in a script written without spaces.
    pub fn text(&self) -> String {
        let mut result = String::new();

        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 {
                let prev = &self.spans[i - 1];
                let gap = span.x - prev.right();
                let char_count = span.text.chars().count().max(1);
                let space_threshold = span.width / char_count as f32 * 0.2;

                let spaceless = prev
                    .text
                    .chars()
                    .last()
                    .is_some_and(is_spaceless_script_char)
                    && span
                        .text
                        .chars()
                        .next()
                        .is_some_and(is_spaceless_script_char);
                let has_space = prev.text.ends_with([' ', '\u{00A0}'])
                    || span.text.starts_with([' ', '\u{00A0}']);

                if gap > space_threshold && !spaceless && !has_space {
                    result.push(' ');
                }
            }
            result.push_str(&span.text);
        }

        result
    }
}

/// Extracts text blocks from the pages of a lopdf document.
pub struct LayoutAnalyzer<'a> {
    doc: &'a LopdfDocument,
}

impl<'a> LayoutAnalyzer<'a> {
    /// Create a new layout analyzer.
    pub fn new(doc: &'a LopdfDocument) -> Self {
        Self { doc }
    }

    /// Extract the text blocks of one page.
    ///
    /// `page` is the zero-based index recorded on each block; `page_height`
    /// flips PDF user space into top-down page coordinates.
    pub fn page_blocks(
        &self,
        page: u32,
        page_id: ObjectId,
        page_height: f32,
    ) -> Result<Vec<TextBlock>> {
        let spans = self.extract_page_spans(page_id).map_err(|e| match e {
            Error::ExtractionFailure { .. } => e,
            other => Error::extraction(page, other),
        })?;
        let lines = group_spans_into_lines(spans);
        let blocks = group_lines_into_blocks(lines)
            .iter()
            .map(|lines| to_text_block(lines, page, page_height))
            .filter(|block| !block.text.trim().is_empty())
            .collect();
        Ok(blocks)
    }

    /// Extract text spans from a page with position and font size.
    pub(crate) fn extract_page_spans(&self, page_id: ObjectId) -> Result<Vec<TextSpan>> {
        let fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::Corrupted(e.to_string()))?;
        let content = self.get_page_content(page_id)?;
        self.parse_content_stream(&content, &fonts)
    }

    /// Get the decompressed page content stream.
    fn get_page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::Corrupted(e.to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => contents,
            // A page without content is blank, not broken.
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r) {
                Ok(Object::Stream(s)) => Ok(s
                    .decompressed_content()
                    .unwrap_or_else(|_| s.content.clone())),
                _ => Err(Error::Corrupted("Invalid content stream".to_string())),
            },
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Reference(r) = obj {
                        if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                            if let Ok(data) = s.decompressed_content() {
                                content.extend_from_slice(&data);
                                content.push(b' ');
                            }
                        }
                    }
                }
                Ok(content)
            }
            _ => Err(Error::Corrupted("Invalid content stream".to_string())),
        }
    }

    /// Decode a string operand with the current font's encoding.
    fn decode(
        &self,
        fonts: &BTreeMap<Vec<u8>, &lopdf::Dictionary>,
        font_name: &[u8],
        bytes: &[u8],
    ) -> String {
        if let Some(font_dict) = fonts.get(font_name) {
            if let Ok(enc) = font_dict.get_font_encoding(self.doc) {
                if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                    return text;
                }
            }
        }
        decode_text_simple(bytes)
    }

    /// Walk the content stream and collect one span per text-showing operator.
    fn parse_content_stream(
        &self,
        content: &[u8],
        fonts: &BTreeMap<Vec<u8>, &lopdf::Dictionary>,
    ) -> Result<Vec<TextSpan>> {
        let content =
            lopdf::content::Content::decode(content).map_err(|e| Error::Corrupted(e.to_string()))?;

        let mut spans = Vec::new();
        let mut font_name: Vec<u8> = Vec::new();
        let mut font_size: f32 = 12.0;
        let mut matrix = TextMatrix::default();
        let mut in_text = false;

        for op in content.operations {
            let text = match op.operator.as_str() {
                "BT" => {
                    in_text = true;
                    matrix = TextMatrix::default();
                    None
                }
                "ET" => {
                    in_text = false;
                    None
                }
                "Tf" => {
                    if let [Object::Name(name), size, ..] = op.operands.as_slice() {
                        font_name = name.clone();
                        font_size = get_number(size).unwrap_or(12.0);
                    }
                    None
                }
                "TL" => {
                    if let Some(leading) = op.operands.first().and_then(get_number) {
                        matrix.leading = leading;
                    }
                    None
                }
                "Td" | "TD" => {
                    if let [tx, ty, ..] = op.operands.as_slice() {
                        let tx = get_number(tx).unwrap_or(0.0);
                        let ty = get_number(ty).unwrap_or(0.0);
                        if op.operator == "TD" {
                            matrix.leading = -ty;
                        }
                        matrix.translate(tx, ty);
                    }
                    None
                }
                "Tm" => {
                    if op.operands.len() >= 6 {
                        let n: Vec<f32> = op
                            .operands
                            .iter()
                            .take(6)
                            .map(|o| get_number(o).unwrap_or(0.0))
                            .collect();
                        matrix.set(n[0], n[1], n[2], n[3], n[4], n[5]);
                    }
                    None
                }
                "T*" => {
                    matrix.next_line();
                    None
                }
                "Tj" => match op.operands.first() {
                    Some(Object::String(bytes, _)) => Some(self.decode(fonts, &font_name, bytes)),
                    _ => None,
                },
                "TJ" => match op.operands.first() {
                    Some(Object::Array(items)) => Some(self.decode_tj(fonts, &font_name, items)),
                    _ => None,
                },
                "'" | "\"" => {
                    matrix.next_line();
                    let idx = if op.operator == "\"" { 2 } else { 0 };
                    match op.operands.get(idx) {
                        Some(Object::String(bytes, _)) => Some(self.decode(fonts, &font_name, bytes)),
                        _ => None,
                    }
                }
                _ => None,
            };

            if let Some(text) = text {
                if in_text && !text.trim().is_empty() {
                    let (x, y) = matrix.position();
                    let size = font_size * matrix.scale();
                    spans.push(TextSpan::new(text, x, y, size));
                }
            }
        }

        Ok(spans)
    }

    /// Decode a `TJ` array. Large negative adjustments are word breaks.
    fn decode_tj(
        &self,
        fonts: &BTreeMap<Vec<u8>, &lopdf::Dictionary>,
        font_name: &[u8],
        items: &[Object],
    ) -> String {
        // In 1/1000 text space units; roughly a fifth of the em.
        const SPACE_THRESHOLD: f32 = 200.0;

        let mut combined = String::new();
        for item in items {
            match item {
                Object::String(bytes, _) => {
                    combined.push_str(&self.decode(fonts, font_name, bytes));
                }
                other => {
                    let adjustment = -get_number(other).unwrap_or(0.0);
                    let breaks_word = combined
                        .chars()
                        .last()
                        .is_some_and(|c| c != ' ' && c != '\u{00A0}' && !is_spaceless_script_char(c));
                    if adjustment > SPACE_THRESHOLD && breaks_word {
                        combined.push(' ');
                    }
                }
            }
        }
        combined
    }
}

/// Group spans into lines by baseline, top to bottom.
pub(crate) fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    // PDF Y is bottom-up, so descending Y reads top to bottom.
    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let tolerance = span.font_size * 0.3;
        match current_y {
            Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(&mut current)));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }

    if !current.is_empty() {
        lines.push(TextLine::from_spans(current));
    }

    lines
}

/// Group consecutive lines into blocks, breaking on wide spacing, font size
/// changes and indentation changes.
pub(crate) fn group_lines_into_blocks(lines: Vec<TextLine>) -> Vec<Vec<TextLine>> {
    let avg_spacing = average_line_spacing(&lines);
    let mut blocks: Vec<Vec<TextLine>> = Vec::new();
    let mut current: Vec<TextLine> = Vec::new();

    for line in lines {
        if let Some(prev) = current.last() {
            if should_break_block(prev, &line, avg_spacing) {
                blocks.push(std::mem::take(&mut current));
            }
        }
        current.push(line);
    }

    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

fn average_line_spacing(lines: &[TextLine]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[0].y - w[1].y).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return DEFAULT_LEADING;
    }
    spacings.iter().sum::<f32>() / spacings.len() as f32
}

fn should_break_block(prev: &TextLine, curr: &TextLine, avg_spacing: f32) -> bool {
    let spacing = (prev.y - curr.y).abs();
    spacing > avg_spacing * 1.5
        || (prev.font_size - curr.font_size).abs() > 1.0
        || (prev.x - curr.x).abs() > 20.0
}

/// Build a model block from its lines.
pub(crate) fn to_text_block(lines: &[TextLine], page: u32, page_height: f32) -> TextBlock {
    let spans = || lines.iter().flat_map(|l| l.spans.iter());

    let x1 = spans().map(|s| s.x).fold(f32::INFINITY, f32::min);
    let x2 = spans().map(|s| s.right()).fold(f32::NEG_INFINITY, f32::max);
    let top = spans().map(|s| s.top()).fold(f32::NEG_INFINITY, f32::max);
    let bottom = spans().map(|s| s.bottom()).fold(f32::INFINITY, f32::min);

    let bbox = if x1.is_finite() {
        BoundingBox::new(x1, page_height - top, x2, page_height - bottom)
    } else {
        BoundingBox::default()
    };

    let text = lines
        .iter()
        .map(|l| l.text())
        .collect::<Vec<_>>()
        .join(" ");
    let font_size = spans().next().map(|s| s.font_size).unwrap_or(0.0);

    TextBlock::new(page, bbox, text, font_size)
}

/// Text matrix for tracking position in a content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32, // X translation
    f: f32, // Y translation
    leading: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            leading: DEFAULT_LEADING,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn next_line(&mut self) {
        self.translate(0.0, -self.leading);
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

/// Helper to extract a number from a PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Check if a character is from a script written without word spaces
/// (Chinese and Japanese; Korean uses spaces).
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        || (0x3040..=0x30FF).contains(&code)
        || (0x3000..=0x303F).contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, x: f32, y: f32, size: f32) -> TextSpan {
        TextSpan::new(text.to_string(), x, y, size)
    }

    #[test]
    fn test_line_text_inserts_spaces_on_gaps() {
        // "CHAPTER" at 16pt is 56pt wide; "ONE" starts after a 10pt gap.
        let line = TextLine::from_spans(vec![span("ONE", 138.0, 700.0, 16.0), span("CHAPTER", 72.0, 700.0, 16.0)]);
        assert_eq!(line.text(), "CHAPTER ONE");
    }

    #[test]
    fn test_line_text_no_space_between_cjk() {
        let line = TextLine::from_spans(vec![span("第一", 72.0, 700.0, 12.0), span("章", 100.0, 700.0, 12.0)]);
        assert_eq!(line.text(), "第一章");
    }

    #[test]
    fn test_spans_group_into_lines_top_down() {
        let lines = group_spans_into_lines(vec![
            span("second", 72.0, 680.0, 12.0),
            span("first", 72.0, 700.0, 12.0),
            span("same", 120.0, 701.0, 12.0),
        ]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "first same");
        assert_eq!(lines[1].text(), "second");
    }

    #[test]
    fn test_font_change_breaks_block() {
        let lines = group_spans_into_lines(vec![
            span("CHAPTER ONE", 72.0, 700.0, 18.0),
            span("It was a bright cold day.", 72.0, 680.0, 11.0),
            span("The clocks were striking.", 72.0, 667.0, 11.0),
        ]);
        let blocks = group_lines_into_blocks(lines);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].len(), 1);
        assert_eq!(blocks[1].len(), 2);
    }

    #[test]
    fn test_block_bbox_is_top_down() {
        let lines = vec![TextLine::from_spans(vec![span("Preface", 100.0, 700.0, 20.0)])];
        let block = to_text_block(&lines, 3, 792.0);

        assert_eq!(block.page, 3);
        assert_eq!(block.text, "Preface");
        assert_eq!(block.font_size, 20.0);
        // top = 700 + 16, bottom = 700 - 4
        assert!((block.bbox.y1 - 76.0).abs() < 1e-3);
        assert!((block.bbox.y2 - 96.0).abs() < 1e-3);
        assert!((block.bbox.x2 - 170.0).abs() < 1e-3);
    }

    #[test]
    fn test_block_font_size_is_first_run() {
        let lines = vec![TextLine::from_spans(vec![
            span("Big", 72.0, 700.0, 24.0),
            span("small tail", 130.0, 700.0, 10.0),
        ])];
        let block = to_text_block(&lines, 0, 792.0);
        assert_eq!(block.font_size, 24.0);
    }

    #[test]
    fn test_text_matrix_leading() {
        let mut m = TextMatrix::default();
        m.translate(72.0, 700.0);
        m.leading = 14.0;
        m.next_line();
        assert_eq!(m.position(), (72.0, 686.0));
    }
}
