//! Core library for turning PDFs into searchable PDFs.
//!
//! This crate provides:
//! - Page rendering through an external rasterizer (pdftoppm)
//! - OCR of each rendered page into a one-page PDF with an invisible text layer (tesseract)
//! - In-order reassembly of those pages into a single output document
//! - Optional compression of the result (Ghostscript or lopdf)
//! - Job orchestration over batches of files

pub mod compress;
pub mod error;
pub mod jobs;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod tool;

mod replace;

#[cfg(test)]
mod testing;

pub use compress::{Compressor, GhostscriptCompressor, LopdfCompressor};
pub use error::{PdfOcrError, Result};
pub use jobs::{BatchReport, FailurePolicy, JobEvent, JobOutcome, JobOutput, JobStatus, Orchestrator};
pub use models::{Action, CompressEngine, Job, OutputMode, OutputPaths, PdfOcrConfig};
pub use ocr::{OcrEngine, PageFragment, TesseractEngine};
pub use pdf::{OutputDocument, PdftoppmRasterizer, RasterImage, Rasterizer, SourceDocument};
pub use pipeline::{PagePipeline, Resolution};
