//! Opening source PDFs with lopdf.

use std::fs;
use std::path::{Path, PathBuf};

use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use super::{inherited_attribute, Result};
use crate::error::PdfError;

/// US Letter, used when a page tree carries no MediaBox at all.
const DEFAULT_PAGE_SIZE: PageSize = PageSize {
    width: 612.0,
    height: 792.0,
};

/// Page dimensions in PDF points (1/72 inch), as displayed (rotation applied).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    /// Pixel dimensions of this page rendered at `zoom`.
    pub fn pixels(&self, zoom: f64) -> (u32, u32) {
        (
            (self.width * zoom).round().max(1.0) as u32,
            (self.height * zoom).round().max(1.0) as u32,
        )
    }
}

/// A view of one page of an open [`SourceDocument`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page {
    /// 0-based position in the document.
    pub index: usize,
    /// Intrinsic size in points.
    pub size: PageSize,
}

/// An opened source PDF.
///
/// Opening parses the file once and keeps its page table; the parsed object
/// graph is released before `open` returns and nothing holds the file open.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    path: PathBuf,
    pages: Vec<PageSize>,
}

impl SourceDocument {
    /// Read and parse the PDF at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let data = fs::read(path)?;
        Self::from_bytes(path, &data)
    }

    /// Parse an in-memory PDF; `path` is kept for rasterizers that need a file.
    pub fn from_bytes(path: &Path, data: &[u8]) -> Result<Self> {
        let mut document = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted {} with empty password", path.display());
        }

        // get_pages is keyed by 1-based page number, so values are in order
        let pages: Vec<PageSize> = document
            .get_pages()
            .into_values()
            .map(|page_id| page_size(&document, page_id))
            .collect();
        if pages.is_empty() {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded {} with {} pages", path.display(), pages.len());
        Ok(Self {
            path: path.to_path_buf(),
            pages,
        })
    }

    /// Path the document was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page at a 0-based index.
    pub fn page(&self, index: usize) -> Result<Page> {
        let size = *self.pages.get(index).ok_or(PdfError::InvalidPage(index))?;
        Ok(Page { index, size })
    }

    /// All pages in document order.
    pub fn pages(&self) -> impl Iterator<Item = Page> + '_ {
        self.pages
            .iter()
            .enumerate()
            .map(|(index, &size)| Page { index, size })
    }
}

/// Displayed size of a page: CropBox falling back to MediaBox, with /Rotate.
fn page_size(doc: &Document, page_id: ObjectId) -> PageSize {
    let bbox = inherited_attribute(doc, page_id, b"CropBox")
        .or_else(|| inherited_attribute(doc, page_id, b"MediaBox"))
        .and_then(|obj| rectangle(doc, obj));

    let Some([x1, y1, x2, y2]) = bbox else {
        return DEFAULT_PAGE_SIZE;
    };
    let (width, height) = ((x2 - x1).abs(), (y2 - y1).abs());

    let rotate = inherited_attribute(doc, page_id, b"Rotate")
        .and_then(|obj| obj.as_i64().ok())
        .unwrap_or(0);
    if rotate.rem_euclid(180) == 90 {
        PageSize {
            width: height,
            height: width,
        }
    } else {
        PageSize { width, height }
    }
}

/// Read a `[x1 y1 x2 y2]` rectangle, following references.
fn rectangle(doc: &Document, obj: &Object) -> Option<[f64; 4]> {
    let (_, obj) = doc.dereference(obj).ok()?;
    let items = obj.as_array().ok()?;
    if items.len() != 4 {
        return None;
    }
    let mut rect = [0.0; 4];
    for (slot, item) in rect.iter_mut().zip(items) {
        *slot = number(doc, item)?;
    }
    Some(rect)
}

fn number(doc: &Document, obj: &Object) -> Option<f64> {
    match doc.dereference(obj).ok()?.1 {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}
