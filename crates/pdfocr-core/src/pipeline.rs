//! The page pipeline: rasterize, recognize, and append every page in order.

use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::{PageError, PdfOcrError, Result};
use crate::ocr::{OcrEngine, PageFragment};
use crate::pdf::{OutputDocument, Page, Rasterizer, SourceDocument, POINTS_PER_INCH};

/// Target rasterization resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution(u32);

impl Resolution {
    pub const DEFAULT_DPI: u32 = 300;

    /// A resolution of `dpi` dots per inch; zero is rejected.
    pub fn new(dpi: u32) -> Result<Self> {
        if dpi == 0 {
            return Err(PdfOcrError::Config("DPI must be positive".to_string()));
        }
        Ok(Self(dpi))
    }

    pub fn dpi(self) -> u32 {
        self.0
    }

    /// Scale factor from PDF points to pixels.
    pub fn zoom(self) -> f64 {
        self.0 as f64 / POINTS_PER_INCH
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self(Self::DEFAULT_DPI)
    }
}

/// Drives a source document through a rasterizer and an OCR engine.
pub struct PagePipeline<'a> {
    rasterizer: &'a dyn Rasterizer,
    engine: &'a dyn OcrEngine,
    parallel_pages: usize,
}

impl<'a> PagePipeline<'a> {
    pub fn new(rasterizer: &'a dyn Rasterizer, engine: &'a dyn OcrEngine) -> Self {
        Self {
            rasterizer,
            engine,
            parallel_pages: 1,
        }
    }

    /// Process up to `pages` pages concurrently. Output order is unaffected.
    pub fn with_parallel_pages(mut self, pages: usize) -> Self {
        self.parallel_pages = pages.max(1);
        self
    }

    /// OCR every page of `source_path` into a new document.
    ///
    /// Any page failure aborts the run; nothing is written to disk here.
    pub fn run(&self, source_path: &Path, resolution: Resolution) -> Result<OutputDocument> {
        let source = SourceDocument::open(source_path).map_err(|source| {
            PdfOcrError::SourceUnreadable {
                path: source_path.to_path_buf(),
                source,
            }
        })?;
        let zoom = resolution.zoom();

        info!(
            "OCR processing: {} ({} pages at {} DPI)",
            source_path.display(),
            source.page_count(),
            resolution.dpi()
        );

        let mut output = OutputDocument::new();
        if self.parallel_pages == 1 {
            for page in source.pages() {
                let fragment = self
                    .process_page(&source, &page, zoom)
                    .map_err(|e| page_error(source_path, page.index, e))?;
                append(&mut output, source_path, page.index, fragment)?;
            }
        } else {
            let pages: Vec<Page> = source.pages().collect();
            for window in pages.chunks(self.parallel_pages) {
                let fragments: Vec<_> = window
                    .par_iter()
                    .map(|page| self.process_page(&source, page, zoom))
                    .collect();
                for (page, fragment) in window.iter().zip(fragments) {
                    let fragment = fragment.map_err(|e| page_error(source_path, page.index, e))?;
                    append(&mut output, source_path, page.index, fragment)?;
                }
            }
        }

        debug_assert_eq!(output.page_count(), source.page_count());
        info!("OCR completed: {}", source_path.display());
        Ok(output)
    }

    fn process_page(
        &self,
        source: &SourceDocument,
        page: &Page,
        zoom: f64,
    ) -> std::result::Result<PageFragment, PageError> {
        let raster = self.rasterizer.render(source, page, zoom)?;
        let fragment = self.engine.recognize(&raster)?;
        let (width, height) = raster.dimensions();
        debug!(
            "Page {}: rendered {}x{}, fragment {} bytes",
            page.index + 1,
            width,
            height,
            fragment.byte_len()
        );
        Ok(fragment)
    }
}

fn append(
    output: &mut OutputDocument,
    path: &Path,
    index: usize,
    fragment: PageFragment,
) -> Result<()> {
    output
        .append(fragment)
        .map_err(|e| page_error(path, index, PageError::Ocr(e)))
}

fn page_error(path: &Path, page: usize, source: PageError) -> PdfOcrError {
    PdfOcrError::Page {
        path: path.to_path_buf(),
        page,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PdfError;
    use crate::pdf::testing::{blank_pdf, page_texts};
    use crate::testing::{FakeEngine, FakeRasterizer};
    use lopdf::Document;
    use pretty_assertions::assert_eq;

    fn write_source(dir: &Path, sizes: &[(f64, f64)]) -> std::path::PathBuf {
        let path = dir.join("doc.pdf");
        std::fs::write(&path, blank_pdf(sizes)).unwrap();
        path
    }

    fn page_boxes(doc: &Document) -> Vec<(f32, f32)> {
        doc.get_pages()
            .into_values()
            .map(|id| {
                let mb = doc.get_dictionary(id).unwrap().get(b"MediaBox").unwrap().as_array().unwrap();
                (mb[2].as_float().unwrap(), mb[3].as_float().unwrap())
            })
            .collect()
    }

    #[test]
    fn test_zoom_is_dpi_over_72() {
        assert_eq!(Resolution::new(72).unwrap().zoom(), 1.0);
        assert_eq!(Resolution::new(300).unwrap().zoom(), 300.0 / 72.0);
        assert!((Resolution::default().zoom() - 4.1667).abs() < 1e-4);
        assert_eq!(Resolution::default().dpi(), 300);
    }

    #[test]
    fn test_zero_dpi_rejected() {
        assert!(matches!(Resolution::new(0), Err(PdfOcrError::Config(_))));
    }

    #[test]
    fn test_every_page_in_source_order() {
        let dir = tempfile::tempdir().unwrap();
        // Multiples of 6 points render to whole pixels at 300 DPI
        let sizes = [(612.0, 792.0), (594.0, 840.0), (300.0, 198.0), (102.0, 402.0), (612.0, 792.0)];
        let path = write_source(dir.path(), &sizes);

        let rasterizer = FakeRasterizer::default();
        let engine = FakeEngine::default();
        let output = PagePipeline::new(&rasterizer, &engine)
            .run(&path, Resolution::default())
            .unwrap();
        assert_eq!(output.page_count(), 5);

        let doc = Document::load_mem(&output.into_bytes().unwrap()).unwrap();
        let texts = page_texts(&doc);
        for (i, text) in texts.iter().enumerate() {
            assert!(text.contains(&format!("ocr-page-{i}")), "page {i}: {text}");
        }
        let expected: Vec<(f32, f32)> = sizes.iter().map(|&(w, h)| (w as f32, h as f32)).collect();
        assert_eq!(page_boxes(&doc), expected);
        assert_eq!(rasterizer.rendered(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_zoom_reaches_rasterizer() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(dir.path(), &[(612.0, 792.0)]);

        let rasterizer = FakeRasterizer::default();
        let engine = FakeEngine::default();
        PagePipeline::new(&rasterizer, &engine)
            .run(&path, Resolution::new(72).unwrap())
            .unwrap();
        assert_eq!(engine.seen_dimensions(), vec![(612, 792)]);

        let engine = FakeEngine::default();
        PagePipeline::new(&rasterizer, &engine)
            .run(&path, Resolution::new(300).unwrap())
            .unwrap();
        assert_eq!(engine.seen_dimensions(), vec![(2550, 3300)]);
    }

    #[test]
    fn test_repeated_runs_agree() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(dir.path(), &[(612.0, 792.0), (300.0, 500.0), (842.0, 595.0)]);
        let rasterizer = FakeRasterizer::default();

        let mut runs = Vec::new();
        for _ in 0..2 {
            let engine = FakeEngine::default();
            let output = PagePipeline::new(&rasterizer, &engine)
                .run(&path, Resolution::new(150).unwrap())
                .unwrap();
            let doc = Document::load_mem(&output.into_bytes().unwrap()).unwrap();
            let texts = page_texts(&doc);
            assert!(texts.iter().all(|t| t.contains("3 Tr")), "every page has a text layer");
            runs.push((doc.get_pages().len(), engine.seen_dimensions(), page_boxes(&doc)));
        }
        assert_eq!(runs[0], runs[1]);
    }

    #[test]
    fn test_page_failure_aborts_with_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(dir.path(), &[(612.0, 792.0); 5]);

        let rasterizer = FakeRasterizer::default();
        let engine = FakeEngine::failing_on(2);
        let err = PagePipeline::new(&rasterizer, &engine)
            .run(&path, Resolution::default())
            .err()
            .unwrap();

        assert_eq!(err.page_index(), Some(2));
        assert!(err.to_string().contains("page 3"), "{err}");
        // Pages after the failure are never started
        assert_eq!(rasterizer.rendered(), vec![0, 1, 2]);
    }

    #[test]
    fn test_raster_failure_is_page_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(dir.path(), &[(612.0, 792.0); 3]);

        let rasterizer = FakeRasterizer::failing_on(1);
        let engine = FakeEngine::default();
        let err = PagePipeline::new(&rasterizer, &engine)
            .run(&path, Resolution::default())
            .err()
            .unwrap();

        assert!(matches!(
            err,
            PdfOcrError::Page { page: 1, source: PageError::Raster(_), .. }
        ));
    }

    #[test]
    fn test_unreadable_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"definitely not a pdf").unwrap();

        let rasterizer = FakeRasterizer::default();
        let engine = FakeEngine::default();
        let err = PagePipeline::new(&rasterizer, &engine)
            .run(&path, Resolution::default())
            .err()
            .unwrap();
        assert!(matches!(
            err,
            PdfOcrError::SourceUnreadable { source: PdfError::Parse(_), .. }
        ));
        assert!(rasterizer.rendered().is_empty());
    }

    #[test]
    fn test_parallel_windows_keep_order() {
        let dir = tempfile::tempdir().unwrap();
        let sizes: Vec<(f64, f64)> = (0..7).map(|i| (100.0 + i as f64 * 10.0, 200.0)).collect();
        let path = write_source(dir.path(), &sizes);

        let rasterizer = FakeRasterizer::default();
        let engine = FakeEngine::default();
        let output = PagePipeline::new(&rasterizer, &engine)
            .with_parallel_pages(3)
            .run(&path, Resolution::new(72).unwrap())
            .unwrap();

        let doc = Document::load_mem(&output.into_bytes().unwrap()).unwrap();
        for (i, text) in page_texts(&doc).iter().enumerate() {
            assert!(text.contains(&format!("ocr-page-{i}")), "page {i}: {text}");
        }
        let widths: Vec<f32> = page_boxes(&doc).into_iter().map(|(w, _)| w).collect();
        assert_eq!(widths, vec![100.0, 110.0, 120.0, 130.0, 140.0, 150.0, 160.0]);
    }

    #[test]
    fn test_parallel_failure_reports_lowest_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(dir.path(), &[(612.0, 792.0); 6]);

        let rasterizer = FakeRasterizer::default();
        let engine = FakeEngine::failing_on(4);
        let err = PagePipeline::new(&rasterizer, &engine)
            .with_parallel_pages(4)
            .run(&path, Resolution::new(72).unwrap())
            .err()
            .unwrap();
        assert_eq!(err.page_index(), Some(4));
    }
}
