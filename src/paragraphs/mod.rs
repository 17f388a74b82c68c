//! Paragraph detection on rendered page images.
//!
//! Text regions from a [`LayoutDetector`] are grouped by vertical gap, each
//! group is cropped out of the page image, recognized with a
//! [`TextRecognizer`] and saved as `chapter{N}_paragraph_{idx}.png`.

mod grouper;

pub use grouper::{group_blocks, merge_bbox};

use std::fs;
use std::path::Path;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{LayoutKind, Paragraph};
use crate::parser::{LayoutDetector, TextRecognizer};

/// Luma threshold used by [`binarize`].
pub const BINARIZE_THRESHOLD: u8 = 128;

/// Options for paragraph detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParagraphConfig {
    /// Vertical gap (pixels) at or above which a new paragraph starts
    pub grouping_threshold: f32,

    /// Pixels added around each merged paragraph box
    pub margin: u32,

    /// Convert crops to black and white before OCR
    pub binarize: bool,
}

impl ParagraphConfig {
    /// Create paragraph options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set grouping threshold.
    pub fn with_grouping_threshold(mut self, threshold: f32) -> Self {
        self.grouping_threshold = threshold;
        self
    }

    /// Set crop margin.
    pub fn with_margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self
    }

    /// Enable or disable OCR preprocessing.
    pub fn with_binarize(mut self, binarize: bool) -> Self {
        self.binarize = binarize;
        self
    }
}

impl Default for ParagraphConfig {
    fn default() -> Self {
        Self {
            grouping_threshold: 20.0,
            margin: 10,
            binarize: true,
        }
    }
}

/// Detects, crops, recognizes and saves the paragraphs of a page image.
pub struct ParagraphDetector<'a> {
    config: ParagraphConfig,
    layout: &'a dyn LayoutDetector,
    recognizer: &'a dyn TextRecognizer,
}

impl<'a> ParagraphDetector<'a> {
    /// Create a detector over the given collaborators.
    pub fn new(
        config: ParagraphConfig,
        layout: &'a dyn LayoutDetector,
        recognizer: &'a dyn TextRecognizer,
    ) -> Self {
        Self {
            config,
            layout,
            recognizer,
        }
    }

    /// Options in use.
    pub fn config(&self) -> &ParagraphConfig {
        &self.config
    }

    /// Detect the paragraphs of `image`, saving each crop under `output_dir`.
    ///
    /// Paragraphs are numbered from 1 in top-to-bottom order. Groups whose
    /// clipped box covers no pixels are skipped.
    pub fn detect_paragraphs(
        &self,
        image: &DynamicImage,
        chapter: usize,
        output_dir: impl AsRef<Path>,
    ) -> Result<Vec<Paragraph>> {
        let output_dir = output_dir.as_ref();
        fs::create_dir_all(output_dir)?;

        let text_blocks: Vec<_> = self
            .layout
            .detect(image)
            .map_err(|e| match e {
                Error::Layout(_) => e,
                other => Error::Layout(other.to_string()),
            })?
            .into_iter()
            .filter(|b| b.kind == LayoutKind::Text)
            .collect();

        let groups = group_blocks(&text_blocks, self.config.grouping_threshold);
        log::debug!(
            "Grouped {} text blocks into {} paragraphs",
            text_blocks.len(),
            groups.len()
        );

        let mut paragraphs = Vec::with_capacity(groups.len());
        for group in &groups {
            let bbox = merge_bbox(group, self.config.margin, image.width(), image.height());
            if bbox.is_empty() {
                log::warn!("Skipping paragraph with empty crop {:?}", bbox);
                continue;
            }

            let crop = image.crop_imm(bbox.x1, bbox.y1, bbox.width(), bbox.height());
            let text = if self.config.binarize {
                self.recognizer.recognize(&binarize(&crop))?
            } else {
                self.recognizer.recognize(&crop)?
            };

            let filename = format!("chapter{}_paragraph_{}.png", chapter, paragraphs.len() + 1);
            crop.save(output_dir.join(&filename))?;

            paragraphs.push(Paragraph {
                text: text.trim().to_string(),
                bbox,
                image: crop,
                filename,
            });
        }

        Ok(paragraphs)
    }
}

/// Grayscale then threshold at [`BINARIZE_THRESHOLD`].
pub fn binarize(image: &DynamicImage) -> DynamicImage {
    let mut gray = image.to_luma8();
    for pixel in gray.pixels_mut() {
        pixel.0[0] = if pixel.0[0] < BINARIZE_THRESHOLD { 0 } else { 255 };
    }
    DynamicImage::ImageLuma8(gray)
}
