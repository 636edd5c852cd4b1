//! In-process stand-ins for the external tools.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use image::DynamicImage;

use crate::compress::Compressor;
use crate::error::{CompressError, OcrError, RasterError, ToolError};
use crate::ocr::{OcrEngine, PageFragment};
use crate::pdf::testing::fragment_pdf;
use crate::pdf::{Page, RasterImage, Rasterizer, SourceDocument, POINTS_PER_INCH};

/// Renders a blank image of the page's size at the requested zoom.
#[derive(Default)]
pub(crate) struct FakeRasterizer {
    fail_on: Option<usize>,
    rendered: Mutex<Vec<usize>>,
}

impl FakeRasterizer {
    pub(crate) fn failing_on(page: usize) -> Self {
        Self {
            fail_on: Some(page),
            ..Self::default()
        }
    }

    /// Page indices rendered so far, in call order.
    pub(crate) fn rendered(&self) -> Vec<usize> {
        self.rendered.lock().unwrap().clone()
    }
}

impl Rasterizer for FakeRasterizer {
    fn render(
        &self,
        _source: &SourceDocument,
        page: &Page,
        zoom: f64,
    ) -> Result<RasterImage, RasterError> {
        self.rendered.lock().unwrap().push(page.index);
        if self.fail_on == Some(page.index) {
            return Err(RasterError::Missing("injected failure".to_string()));
        }
        let (width, height) = page.size.pixels(zoom);
        Ok(RasterImage {
            page: page.index,
            dpi: zoom * POINTS_PER_INCH,
            image: DynamicImage::new_luma8(width, height),
        })
    }
}

/// Produces a fragment sized from the raster and labelled `ocr-page-<index>`.
#[derive(Default)]
pub(crate) struct FakeEngine {
    fail_on: Option<usize>,
    seen: Mutex<Vec<(u32, u32)>>,
}

impl FakeEngine {
    pub(crate) fn failing_on(page: usize) -> Self {
        Self {
            fail_on: Some(page),
            ..Self::default()
        }
    }

    /// Raster dimensions received so far, in call order.
    pub(crate) fn seen_dimensions(&self) -> Vec<(u32, u32)> {
        self.seen.lock().unwrap().clone()
    }
}

impl OcrEngine for FakeEngine {
    fn recognize(&self, raster: &RasterImage) -> Result<PageFragment, OcrError> {
        let (width, height) = raster.dimensions();
        self.seen.lock().unwrap().push((width, height));
        if self.fail_on == Some(raster.page) {
            return Err(OcrError::Tool(ToolError::Failed {
                tool: "fake-ocr".to_string(),
                status: Some(1),
                stderr: "injected failure".to_string(),
            }));
        }
        let scale = POINTS_PER_INCH / raster.dpi;
        let bytes = fragment_pdf(
            width as f64 * scale,
            height as f64 * scale,
            &format!("ocr-page-{}", raster.page),
        );
        PageFragment::from_bytes(&bytes)
    }
}

/// Copies input to output and records every call.
#[derive(Default)]
pub(crate) struct FakeCompressor {
    calls: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl FakeCompressor {
    pub(crate) fn calls(&self) -> Vec<(PathBuf, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Compressor for FakeCompressor {
    fn compress(&self, input: &Path, output: &Path) -> Result<(), CompressError> {
        self.calls
            .lock()
            .unwrap()
            .push((input.to_path_buf(), output.to_path_buf()));
        let bytes = std::fs::read(input)?;
        std::fs::write(output, bytes)?;
        Ok(())
    }
}
