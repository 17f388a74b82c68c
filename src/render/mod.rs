//! Rendering of extraction results to JSON and plain text.

mod json;
mod text;

pub use json::{chapters_from_json, chapters_to_json, paragraphs_to_json, to_json, JsonFormat};
pub use text::chapters_to_text;
