//! Document access: collaborator traits and the lopdf-backed source.

mod backend;
mod layout;
mod pdf_parser;

pub use backend::{decode_text_simple, DocumentSource, LayoutDetector, PageRenderer, TextRecognizer};
pub use layout::LayoutAnalyzer;
pub use pdf_parser::LopdfSource;
