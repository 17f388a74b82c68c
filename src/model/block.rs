//! Text blocks and the heading candidates derived from them.

use serde::{Deserialize, Serialize};

/// An axis-aligned box `(x1, y1, x2, y2)` in page or image coordinates.
///
/// `y` grows downwards; `(x1, y1)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Box width (never negative).
    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    /// Box height (never negative).
    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }
}

impl From<[f32; 4]> for BoundingBox {
    fn from([x1, y1, x2, y2]: [f32; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// A block of text on one page, as produced by a document source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Zero-based page index
    pub page: u32,
    /// Block extent in page coordinates
    pub bbox: BoundingBox,
    /// Concatenated text of every run in the block
    pub text: String,
    /// Font size of the first text run, in points
    pub font_size: f32,
}

impl TextBlock {
    /// Create a new text block.
    pub fn new(page: u32, bbox: BoundingBox, text: impl Into<String>, font_size: f32) -> Self {
        Self {
            page,
            bbox,
            text: text.into(),
            font_size,
        }
    }
}

/// A text block that passed the heading gate, with its additive score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingCandidate {
    /// Zero-based page index
    pub page: u32,
    /// Trimmed block text
    pub text: String,
    /// Bounding box of the source block
    pub bbox: BoundingBox,
    /// Heading score (>= 0, no upper bound)
    pub score: f64,
}
