//! PDF handling: source documents, rasterization, and output assembly.

mod assembler;
mod raster;
mod source;

#[cfg(test)]
pub(crate) mod testing;

pub use assembler::{save, OutputDocument};
pub use raster::{PdftoppmRasterizer, RasterImage, Rasterizer, POINTS_PER_INCH};
pub use source::{Page, PageSize, SourceDocument};

use lopdf::{Document, Object, ObjectId};

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Page attributes a page may inherit from its ancestors in the page tree.
pub(crate) const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Page-tree depth at which lookup gives up; guards against `Parent` cycles.
const MAX_TREE_DEPTH: usize = 64;

/// Look up `key` on a page, falling back to its ancestors.
pub(crate) fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node_id = page_id;
    for _ in 0..MAX_TREE_DEPTH {
        let dict = doc.get_dictionary(node_id).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        node_id = dict.get(b"Parent").ok()?.as_reference().ok()?;
    }
    None
}
