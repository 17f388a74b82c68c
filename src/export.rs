//! Chapter image export: every page of a chapter stacked into one PNG.

use std::fs;
use std::path::{Path, PathBuf};

use image::{imageops, DynamicImage, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Chapter;
use crate::parser::PageRenderer;

/// Options for chapter image export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Page render resolution
    pub dpi: u32,

    /// Directory the chapter images are written to
    pub output_dir: PathBuf,
}

impl ExportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set render resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            output_dir: PathBuf::from("chapters"),
        }
    }
}

/// Stack images top to bottom on a white canvas as wide as the widest image.
pub fn merge_page_images(images: &[DynamicImage]) -> Result<DynamicImage> {
    if images.is_empty() {
        return Err(Error::Render("no pages to merge".to_string()));
    }

    let width = images.iter().map(|img| img.width()).max().unwrap_or(0);
    let height: u32 = images.iter().map(|img| img.height()).sum();

    let mut canvas = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    let mut y = 0i64;
    for img in images {
        imageops::overlay(&mut canvas, &img.to_rgb8(), 0, y);
        y += i64::from(img.height());
    }

    Ok(DynamicImage::ImageRgb8(canvas))
}

/// Renders chapters to `chapter_{index}.png` files.
pub struct ChapterImageExporter<'a> {
    config: ExportConfig,
    renderer: &'a dyn PageRenderer,
}

impl<'a> ChapterImageExporter<'a> {
    pub fn new(config: ExportConfig, renderer: &'a dyn PageRenderer) -> Self {
        Self { config, renderer }
    }

    /// Path a chapter with the given index is written to.
    pub fn output_path(&self, index: usize) -> PathBuf {
        self.config.output_dir.join(format!("chapter_{}.png", index))
    }

    /// Render and merge the pages of a chapter.
    pub fn render_chapter(&self, chapter: &Chapter) -> Result<DynamicImage> {
        let pages = chapter
            .pages
            .clone()
            .map(|page| {
                self.renderer
                    .render_page(page, self.config.dpi)
                    .map_err(|e| Error::extraction(page, e))
            })
            .collect::<Result<Vec<_>>>()?;
        merge_page_images(&pages)
    }

    /// Export one chapter and return the written path.
    pub fn export_chapter(&self, chapter: &Chapter, index: usize) -> Result<PathBuf> {
        let merged = self.render_chapter(chapter)?;
        let path = self.output_path(index);
        save(&merged, &path)?;
        log::info!("Exported chapter {} ({:?}) to {}", index, chapter.title, path.display());
        Ok(path)
    }

    /// Export every non-empty chapter, numbering them from 1 in list order.
    pub fn export_all(&self, chapters: &[Chapter]) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for (i, chapter) in chapters.iter().enumerate() {
            if chapter.is_empty() {
                log::warn!("Chapter {} ({:?}) has no pages; not exported", i + 1, chapter.title);
                continue;
            }
            paths.push(self.export_chapter(chapter, i + 1)?);
        }
        Ok(paths)
    }
}

fn save(image: &DynamicImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    image.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChapterOrigin;
    use tempfile::TempDir;

    struct SizedPages;

    impl PageRenderer for SizedPages {
        fn render_page(&self, page: u32, _dpi: u32) -> Result<DynamicImage> {
            let mut img = RgbImage::from_pixel(10 + page, 5, Rgb([0, 0, 0]));
            img.put_pixel(0, 0, Rgb([page as u8, 0, 0]));
            Ok(DynamicImage::ImageRgb8(img))
        }
    }

    #[test]
    fn test_merge_dimensions_and_background() {
        let images = vec![
            DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 2, Rgb([0, 0, 0]))),
            DynamicImage::ImageRgb8(RgbImage::from_pixel(6, 3, Rgb([0, 0, 0]))),
        ];
        let merged = merge_page_images(&images).unwrap().to_rgb8();

        assert_eq!(merged.dimensions(), (6, 5));
        assert_eq!(merged.get_pixel(5, 0), &Rgb([255, 255, 255]));
        assert_eq!(merged.get_pixel(5, 4), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_merge_empty_fails() {
        assert!(matches!(merge_page_images(&[]), Err(Error::Render(_))));
    }

    #[test]
    fn test_export_chapter() {
        let dir = TempDir::new().unwrap();
        let exporter = ChapterImageExporter::new(
            ExportConfig::new().with_output_dir(dir.path().join("chapters")),
            &SizedPages,
        );
        let chapter = Chapter::new("CHAPTER TWO", 2..4, 1.0, ChapterOrigin::Heading);

        let path = exporter.export_chapter(&chapter, 2).unwrap();
        assert!(path.ends_with("chapters/chapter_2.png"));

        let saved = image::open(&path).unwrap();
        assert_eq!((saved.width(), saved.height()), (13, 10));
    }

    #[test]
    fn test_export_all_skips_empty() {
        let dir = TempDir::new().unwrap();
        let exporter =
            ChapterImageExporter::new(ExportConfig::new().with_output_dir(dir.path()), &SizedPages);
        let chapters = vec![
            Chapter::new("A", 0..0, 0.5, ChapterOrigin::Heading),
            Chapter::new("B", 0..1, 0.5, ChapterOrigin::Heading),
        ];

        let paths = exporter.export_all(&chapters).unwrap();
        assert_eq!(paths, vec![dir.path().join("chapter_2.png")]);
    }
}
