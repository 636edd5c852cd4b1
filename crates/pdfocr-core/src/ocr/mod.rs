//! OCR: turning a rendered page into a searchable single-page PDF.

mod tesseract;

pub use tesseract::TesseractEngine;

use lopdf::Document;

use crate::error::OcrError;
use crate::pdf::RasterImage;

/// Produces a searchable page from pixels.
pub trait OcrEngine: Send + Sync {
    /// Recognize `image` and return a one-page PDF holding the image and an
    /// invisible text layer aligned with it.
    fn recognize(&self, image: &RasterImage) -> Result<PageFragment, OcrError>;
}

/// A single-page PDF produced by an [`OcrEngine`].
///
/// Kept as the engine's serialized output so it can move freely between
/// worker threads; the assembler parses it once more when appending.
#[derive(Debug, Clone)]
pub struct PageFragment {
    bytes: Vec<u8>,
}

impl PageFragment {
    /// Validate engine output. Anything other than exactly one page is rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, OcrError> {
        let document = parse(bytes)?;
        let pages = document.get_pages().len();
        if pages != 1 {
            return Err(OcrError::Fragment(format!("expected 1 page, found {pages}")));
        }
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    /// Serialized size in bytes.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    pub(crate) fn into_document(self) -> Result<Document, OcrError> {
        parse(&self.bytes)
    }
}

fn parse(bytes: &[u8]) -> Result<Document, OcrError> {
    Document::load_mem(bytes).map_err(|e| OcrError::Fragment(e.to_string()))
}
