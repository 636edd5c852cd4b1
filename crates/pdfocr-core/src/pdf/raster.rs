//! Page rasterization.

use std::ffi::OsStr;
use std::path::PathBuf;

use image::{DynamicImage, GenericImageView};
use tracing::debug;

use super::{Page, SourceDocument};
use crate::error::RasterError;
use crate::tool;

/// PDF user space units per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// A rendered page.
#[derive(Debug, Clone)]
pub struct RasterImage {
    /// 0-based index of the source page.
    pub page: usize,
    /// Resolution the page was rendered at.
    pub dpi: f64,
    /// Pixels.
    pub image: DynamicImage,
}

impl RasterImage {
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Renders pages of an open document to pixels.
pub trait Rasterizer: Send + Sync {
    /// Render `page` of `source` scaled by `zoom` (1.0 = 72 DPI).
    fn render(
        &self,
        source: &SourceDocument,
        page: &Page,
        zoom: f64,
    ) -> Result<RasterImage, RasterError>;
}

/// Rasterizer backed by poppler's `pdftoppm`.
pub struct PdftoppmRasterizer {
    executable: PathBuf,
}

impl PdftoppmRasterizer {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new("pdftoppm")
    }
}

impl Rasterizer for PdftoppmRasterizer {
    fn render(
        &self,
        source: &SourceDocument,
        page: &Page,
        zoom: f64,
    ) -> Result<RasterImage, RasterError> {
        let dpi = zoom * POINTS_PER_INCH;
        let scratch = tempfile::Builder::new().prefix("pdfocr-raster").tempdir()?;
        let prefix = scratch.path().join("page");
        // pdftoppm numbers pages from 1
        let number = (page.index + 1).to_string();
        let resolution = format!("{dpi:.3}");

        tool::run(
            &self.executable,
            [
                OsStr::new("-f"),
                OsStr::new(&number),
                OsStr::new("-l"),
                OsStr::new(&number),
                OsStr::new("-r"),
                OsStr::new(&resolution),
                OsStr::new("-cropbox"),
                OsStr::new("-png"),
                OsStr::new("-singlefile"),
                source.path().as_os_str(),
                prefix.as_os_str(),
            ],
        )?;

        let png = prefix.with_extension("png");
        if !png.is_file() {
            return Err(RasterError::Missing(png.display().to_string()));
        }
        let image = image::open(&png)?;

        debug!(
            "Rendered page {} at {:.1} DPI: {}x{}",
            page.index + 1,
            dpi,
            image.width(),
            image.height()
        );

        Ok(RasterImage {
            page: page.index,
            dpi,
            image,
        })
    }
}
