//! Layout regions and the paragraphs grouped from them.

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use super::BoundingBox;

/// Semantic class assigned to a region by the layout model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    Text,
    Title,
    List,
    Table,
    Figure,
    /// Any label the model reports beyond the standard five
    Other(String),
}

impl LayoutKind {
    /// Map a model label ("Text", "Title", ...) to a kind.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Text" => LayoutKind::Text,
            "Title" => LayoutKind::Title,
            "List" => LayoutKind::List,
            "Table" => LayoutKind::Table,
            "Figure" => LayoutKind::Figure,
            other => LayoutKind::Other(other.to_string()),
        }
    }
}

/// A region of a page image found by the layout model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutBlock {
    /// Region class
    pub kind: LayoutKind,
    /// Region in image pixel coordinates
    pub bbox: BoundingBox,
}

impl LayoutBlock {
    /// Create a new layout block.
    pub fn new(kind: LayoutKind, bbox: BoundingBox) -> Self {
        Self { kind, bbox }
    }

    /// Shorthand for a text region.
    pub fn text(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::new(LayoutKind::Text, BoundingBox::new(x1, y1, x2, y2))
    }
}

/// Integer crop rectangle `(x1, y1, x2, y2)` inside an image, `x2`/`y2` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "[u32; 4]", into = "[u32; 4]")]
pub struct PixelBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl PixelBox {
    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }

    /// Check if the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

impl From<[u32; 4]> for PixelBox {
    fn from([x1, y1, x2, y2]: [u32; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl From<PixelBox> for [u32; 4] {
    fn from(b: PixelBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// A paragraph cropped out of a page image.
#[derive(Debug, Clone)]
pub struct Paragraph {
    /// Recognized text of the crop
    pub text: String,
    /// Crop rectangle (merged member boxes plus margin, clipped to the image)
    pub bbox: PixelBox,
    /// The cropped image
    pub image: DynamicImage,
    /// File name the crop was saved under, `chapter{N}_paragraph_{idx}.png`
    pub filename: String,
}

impl Paragraph {
    /// Persisted form, without the pixel data.
    pub fn record(&self) -> ParagraphRecord {
        ParagraphRecord {
            text: self.text.clone(),
            bbox: self.bbox,
            filename: self.filename.clone(),
        }
    }
}

/// Persisted form of a [`Paragraph`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphRecord {
    pub text: String,
    pub bbox: PixelBox,
    pub filename: String,
}
