//! Configuration structures for the searchable-PDF pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::PdfOcrError;

/// Main configuration for pdfocr.
///
/// Passed explicitly into the orchestrator; nothing in the library reads
/// process-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfOcrConfig {
    /// Rasterization configuration.
    pub raster: RasterConfig,

    /// OCR engine configuration.
    pub ocr: OcrConfig,

    /// Compression configuration.
    pub compress: CompressConfig,

    /// Page pipeline configuration.
    pub pipeline: PipelineConfig,
}

/// Rasterization configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Target resolution for rendering pages before OCR.
    pub dpi: u32,

    /// `pdftoppm` executable.
    pub pdftoppm: PathBuf,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            pdftoppm: PathBuf::from("pdftoppm"),
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// `tesseract` executable.
    pub tesseract: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract: PathBuf::from("tesseract"),
        }
    }
}

/// Which compressor backs the compress action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressEngine {
    /// External Ghostscript with the `/screen` preset.
    #[default]
    Ghostscript,
    /// In-process stream compression with lopdf.
    Lopdf,
}

/// Compression configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressConfig {
    /// Compressor implementation.
    pub engine: CompressEngine,

    /// Ghostscript executable.
    pub ghostscript: PathBuf,
}

impl Default for CompressConfig {
    fn default() -> Self {
        Self {
            engine: CompressEngine::Ghostscript,
            ghostscript: PathBuf::from("gs"),
        }
    }
}

/// Page pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Pages rasterized and recognized concurrently (1 = strictly sequential).
    pub parallel_pages: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { parallel_pages: 1 }
    }
}

impl PdfOcrConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), PdfOcrError> {
        if self.raster.dpi == 0 {
            return Err(PdfOcrError::Config("raster.dpi must be positive".to_string()));
        }
        if self.pipeline.parallel_pages == 0 {
            return Err(PdfOcrError::Config(
                "pipeline.parallel_pages must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
