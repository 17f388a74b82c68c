//! Document source backed by lopdf.

use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use super::backend::{decode_text_simple, DocumentSource};
use super::layout::LayoutAnalyzer;
use crate::detect::{check_pdf_file, pdf_version};
use crate::error::{Error, Result};
use crate::model::{DocumentInfo, TextBlock, TocEntry};

/// Default page height (US Letter) when a page has no usable MediaBox.
const DEFAULT_PAGE_HEIGHT: f32 = 792.0;

/// Name-tree and destination lookups give up past this depth.
const MAX_LOOKUP_DEPTH: usize = 32;

/// An opened PDF exposing per-page blocks, text and outline.
pub struct LopdfSource {
    doc: LopdfDocument,
    /// Page object ids in page order
    pages: Vec<ObjectId>,
    /// Page object id to zero-based index
    page_index: HashMap<ObjectId, u32>,
}

impl LopdfSource {
    /// Open a PDF file.
    ///
    /// Fails with [`Error::DocumentUnavailable`] when the file is missing and
    /// with a format or corruption error when it is not a readable PDF.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        check_pdf_file(path)?;

        let doc = LopdfDocument::load(path).map_err(load_error)?;
        log::info!("Opened PDF: {}", path.display());
        Ok(Self::from_document(doc))
    }

    /// Open a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        pdf_version(data)?;
        let doc = LopdfDocument::load_mem(data).map_err(load_error)?;
        Ok(Self::from_document(doc))
    }

    /// Open a PDF from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    fn from_document(doc: LopdfDocument) -> Self {
        if doc.is_encrypted() {
            log::warn!("Document is encrypted; text extraction may fail");
        }

        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        let page_index = pages
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, i as u32))
            .collect();

        Self {
            doc,
            pages,
            page_index,
        }
    }

    /// Document information (info dictionary, version, page count).
    pub fn info(&self) -> DocumentInfo {
        let mut info = DocumentInfo::with_version(self.doc.version.to_string());

        if let Some(dict) = self
            .doc
            .trailer
            .get(b"Info")
            .ok()
            .and_then(|obj| self.as_dict(obj))
        {
            info.title = get_string_from_dict(dict, b"Title");
            info.author = get_string_from_dict(dict, b"Author");
            info.subject = get_string_from_dict(dict, b"Subject");
            info.creator = get_string_from_dict(dict, b"Creator");
            info.producer = get_string_from_dict(dict, b"Producer");
            info.created =
                get_string_from_dict(dict, b"CreationDate").and_then(|d| parse_pdf_date(&d));
            info.modified =
                get_string_from_dict(dict, b"ModDate").and_then(|d| parse_pdf_date(&d));
        }

        info.page_count = self.page_count();
        info.encrypted = self.doc.is_encrypted();
        info.has_outline = self.outline_root().is_some();
        info
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.pages
            .get(page as usize)
            .copied()
            .ok_or(Error::PageOutOfRange(page, self.page_count()))
    }

    /// Page height from the MediaBox, walking up inherited attributes.
    fn page_height(&self, page_id: ObjectId) -> f32 {
        let mut current = self.doc.get_dictionary(page_id).ok();
        for _ in 0..MAX_LOOKUP_DEPTH {
            let Some(dict) = current else { break };
            if let Some(array) = dict
                .get(b"MediaBox")
                .ok()
                .and_then(|o| self.deref(o).as_array().ok())
            {
                if array.len() >= 4 {
                    let y0 = number(&array[1]).unwrap_or(0.0);
                    let y1 = number(&array[3]).unwrap_or(DEFAULT_PAGE_HEIGHT);
                    return (y1 - y0).abs();
                }
            }
            current = dict.get(b"Parent").ok().and_then(|p| self.as_dict(p));
        }
        DEFAULT_PAGE_HEIGHT
    }

    fn deref<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).unwrap_or(obj),
            _ => obj,
        }
    }

    fn as_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match self.deref(obj) {
            Object::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    fn outline_root(&self) -> Option<&Dictionary> {
        let catalog = self.doc.catalog().ok()?;
        let outlines = self.as_dict(catalog.get(b"Outlines").ok()?)?;
        outlines.get(b"First").ok().and_then(|o| self.as_dict(o))?;
        Some(outlines)
    }

    /// Walk the outline tree depth-first, flattening it into entries.
    fn collect_outline(
        &self,
        first: ObjectId,
        level: u8,
        visited: &mut HashSet<ObjectId>,
        entries: &mut Vec<TocEntry>,
    ) {
        let mut next = Some(first);

        while let Some(item_id) = next.take() {
            if !visited.insert(item_id) {
                log::warn!("Outline item {:?} visited twice; stopping walk", item_id);
                return;
            }
            let Ok(item) = self.doc.get_dictionary(item_id) else {
                return;
            };

            let title = get_string_from_dict(item, b"Title").unwrap_or_default();
            entries.push(TocEntry::new(level, title, self.outline_destination(item)));

            if let Ok(child) = item.get(b"First").and_then(Object::as_reference) {
                self.collect_outline(child, level.saturating_add(1), visited, entries);
            }

            next = item.get(b"Next").and_then(Object::as_reference).ok();
        }
    }

    /// Destination page of an outline item, from `Dest` or a GoTo action.
    fn outline_destination(&self, item: &Dictionary) -> Option<i64> {
        if let Ok(dest) = item.get(b"Dest") {
            return self.resolve_destination(dest, 0);
        }

        let action = self.as_dict(item.get(b"A").ok()?)?;
        self.resolve_destination(action.get(b"D").ok()?, 0)
    }

    /// Resolve an explicit or named destination to a zero-based page index.
    fn resolve_destination(&self, dest: &Object, depth: usize) -> Option<i64> {
        if depth > MAX_LOOKUP_DEPTH {
            return None;
        }

        match self.deref(dest) {
            Object::Array(array) => match array.first()? {
                Object::Reference(page_ref) => self.page_index.get(page_ref).map(|i| i64::from(*i)),
                // Remote destinations carry a page number instead of a reference.
                Object::Integer(n) => Some(*n),
                _ => None,
            },
            Object::Dictionary(dict) => self.resolve_destination(dict.get(b"D").ok()?, depth + 1),
            Object::Name(name) | Object::String(name, _) => {
                let target = self.named_destination(name)?;
                self.resolve_destination(target, depth + 1)
            }
            _ => None,
        }
    }

    /// Look a name up in the catalog `Dests` dictionary or the `Names/Dests` tree.
    fn named_destination(&self, name: &[u8]) -> Option<&Object> {
        let catalog = self.doc.catalog().ok()?;

        if let Some(dests) = catalog.get(b"Dests").ok().and_then(|d| self.as_dict(d)) {
            if let Ok(target) = dests.get(name) {
                return Some(target);
            }
        }

        let names = self.as_dict(catalog.get(b"Names").ok()?)?;
        let tree = self.as_dict(names.get(b"Dests").ok()?)?;
        self.search_name_tree(tree, name, 0)
    }

    fn search_name_tree<'a>(
        &'a self,
        node: &'a Dictionary,
        name: &[u8],
        depth: usize,
    ) -> Option<&'a Object> {
        if depth > MAX_LOOKUP_DEPTH {
            return None;
        }

        if let Ok(leaves) = node.get(b"Names").and_then(Object::as_array) {
            for pair in leaves.chunks_exact(2) {
                if let Object::String(key, _) = self.deref(&pair[0]) {
                    if key.as_slice() == name {
                        return Some(&pair[1]);
                    }
                }
            }
        }

        let kids = node.get(b"Kids").and_then(Object::as_array).ok()?;
        kids.iter()
            .filter_map(|kid| self.as_dict(kid))
            .find_map(|kid| self.search_name_tree(kid, name, depth + 1))
    }
}

impl DocumentSource for LopdfSource {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_blocks(&self, page: u32) -> Result<Vec<TextBlock>> {
        let page_id = self.page_id(page)?;
        let height = self.page_height(page_id);
        LayoutAnalyzer::new(&self.doc).page_blocks(page, page_id, height)
    }

    fn page_text(&self, page: u32) -> Result<String> {
        self.page_id(page)?;
        // lopdf numbers pages from 1.
        self.doc
            .extract_text(&[page + 1])
            .map_err(|e| Error::extraction(page, e))
    }

    fn toc(&self) -> Result<Vec<TocEntry>> {
        let mut entries = Vec::new();
        let Some(root) = self.outline_root() else {
            log::debug!("No outline in document");
            return Ok(entries);
        };

        if let Ok(first) = root.get(b"First").and_then(Object::as_reference) {
            self.collect_outline(first, 1, &mut HashSet::new(), &mut entries);
        }
        Ok(entries)
    }
}

fn load_error(err: lopdf::Error) -> Error {
    match err {
        lopdf::Error::Decryption(_) => Error::Encrypted,
        lopdf::Error::IO(e) => Error::DocumentUnavailable(e.to_string()),
        other => Error::Corrupted(other.to_string()),
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Helper to get a string from a PDF dictionary.
fn get_string_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => Some(decode_text_simple(bytes)),
        Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}

/// Parse a PDF date string (D:YYYYMMDDHHmmSSOHH'mm').
fn parse_pdf_date(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    let s = s.strip_prefix("D:").unwrap_or(s);

    let year: i32 = s.get(0..4)?.parse().ok()?;
    let field = |range: std::ops::Range<usize>, default: u32| {
        s.get(range).and_then(|v| v.parse().ok()).unwrap_or(default)
    };

    chrono::NaiveDate::from_ymd_opt(year, field(4..6, 1), field(6..8, 1))
        .and_then(|date| date.and_hms_opt(field(8..10, 0), field(10..12, 0), field(12..14, 0)))
        .map(|dt| chrono::DateTime::from_naive_utc_and_offset(dt, chrono::Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_pdf_date() {
        let date = parse_pdf_date("D:20240115103045").unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 15);
        assert_eq!(date.hour(), 10);
    }

    #[test]
    fn test_parse_pdf_date_minimal() {
        let date = parse_pdf_date("D:1999").unwrap();
        assert_eq!(date.year(), 1999);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 1);
    }

    #[test]
    fn test_parse_pdf_date_garbage() {
        assert!(parse_pdf_date("yesterday").is_none());
    }

    #[test]
    fn test_get_string_from_dict_utf16() {
        let mut dict = Dictionary::new();
        dict.set(
            "Title",
            Object::String(vec![0xFE, 0xFF, 0x00, 0x49, 0x00, 0x49], lopdf::StringFormat::Literal),
        );
        assert_eq!(get_string_from_dict(&dict, b"Title"), Some("II".to_string()));
    }

    #[test]
    fn test_from_bytes_rejects_non_pdf() {
        assert!(matches!(
            LopdfSource::from_bytes(b"plain text"),
            Err(Error::UnknownFormat)
        ));
    }
}
