//! Error types for the pdfocr-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the pdfocr library.
///
/// Every variant that concerns a single file carries its path so that a batch
/// report can say which input failed without extra bookkeeping.
#[derive(Error, Debug)]
pub enum PdfOcrError {
    /// The input is missing, unreadable, or not a valid PDF.
    #[error("cannot read source {}: {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: PdfError,
    },

    /// Rasterization or OCR failed on one page.
    #[error("{}: page {} failed: {source}", path.display(), page + 1)]
    Page {
        path: PathBuf,
        /// 0-based page index.
        page: usize,
        #[source]
        source: PageError,
    },

    /// The output document could not be persisted.
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The compression step failed.
    #[error("cannot compress {}: {source}", path.display())]
    Compress {
        path: PathBuf,
        #[source]
        source: CompressError,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PdfOcrError {
    /// Index of the failing page, if the error is page-scoped.
    pub fn page_index(&self) -> Option<usize> {
        match self {
            Self::Page { page, .. } => Some(*page),
            _ => None,
        }
    }
}

/// Errors related to reading a source PDF.
#[derive(Error, Debug)]
pub enum PdfError {
    /// The file could not be read.
    #[error("failed to read file: {0}")]
    Read(#[from] std::io::Error),

    /// Failed to parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page index requested.
    #[error("invalid page index: {0}")]
    InvalidPage(usize),
}

/// Failure of an external executable.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The executable is not on the search path.
    #[error("`{tool}` not found on PATH")]
    NotFound { tool: String },

    /// The executable exists but could not be started.
    #[error("failed to run `{tool}`: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The executable exited unsuccessfully.
    #[error("`{tool}` exited with {}: {stderr}", status.map_or_else(|| "signal".to_string(), |c| format!("status {c}")))]
    Failed {
        tool: String,
        status: Option<i32>,
        stderr: String,
    },
}

/// Errors from the rasterizer adapter.
#[derive(Error, Debug)]
pub enum RasterError {
    /// The rendering tool failed.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// The rendered image could not be decoded.
    #[error("cannot decode rendered page: {0}")]
    Decode(#[from] image::ImageError),

    /// The renderer produced nothing usable.
    #[error("renderer produced no image: {0}")]
    Missing(String),

    /// Scratch file handling failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the OCR adapter.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The OCR engine failed.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// The raster could not be encoded for the engine.
    #[error("cannot encode page image: {0}")]
    Encode(#[from] image::ImageError),

    /// The engine output is not a usable single-page PDF.
    #[error("invalid page fragment: {0}")]
    Fragment(String),

    /// Scratch file handling failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors while processing a single page.
#[derive(Error, Debug)]
pub enum PageError {
    /// Rasterization failed.
    #[error("rasterization failed: {0}")]
    Raster(#[from] RasterError),

    /// OCR failed.
    #[error("OCR failed: {0}")]
    Ocr(#[from] OcrError),
}

/// Errors from the compression adapter.
#[derive(Error, Debug)]
pub enum CompressError {
    /// The compression tool failed.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// In-process compression could not parse or write the document.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Writing the compressed output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the pdfocr library.
pub type Result<T> = std::result::Result<T, PdfOcrError>;
