//! OCR engine wrapper around the `tesseract` command-line tool.

use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, info};

use super::{OcrEngine, PageFragment};
use crate::error::OcrError;
use crate::pdf::RasterImage;
use crate::tool;

/// OCR engine that shells out to `tesseract … pdf`.
///
/// Each call works in its own temporary directory, which is removed when the
/// call returns.
pub struct TesseractEngine {
    executable: PathBuf,
}

impl TesseractEngine {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, raster: &RasterImage) -> Result<PageFragment, OcrError> {
        let start = Instant::now();
        let scratch = tempfile::Builder::new().prefix("pdfocr-ocr").tempdir()?;
        let input = scratch.path().join("page.png");
        let output_base = scratch.path().join("page");

        raster.image.save_with_format(&input, image::ImageFormat::Png)?;

        // Without --dpi tesseract guesses the resolution and the fragment's
        // page size drifts from the source page.
        let dpi = format!("{}", raster.dpi.round() as u32);
        tool::run(
            &self.executable,
            [
                input.as_os_str(),
                output_base.as_os_str(),
                OsStr::new("--dpi"),
                OsStr::new(&dpi),
                OsStr::new("pdf"),
            ],
        )?;

        let pdf = output_base.with_extension("pdf");
        let bytes = fs::read(&pdf)
            .map_err(|e| OcrError::Fragment(format!("{}: {}", pdf.display(), e)))?;
        debug!("tesseract produced {} bytes", bytes.len());

        let fragment = PageFragment::from_bytes(&bytes)?;
        let (width, height) = raster.dimensions();
        info!(
            "OCR complete for page {} ({}x{}) in {}ms",
            raster.page + 1,
            width,
            height,
            start.elapsed().as_millis()
        );
        Ok(fragment)
    }
}
