//! Assembling OCR page fragments into one output PDF.

use std::io::Write;
use std::path::Path;

use lopdf::{dictionary, Document, Object, ObjectId};
use tracing::{debug, info};

use super::{inherited_attribute, INHERITABLE};
use crate::error::{OcrError, PdfOcrError};
use crate::ocr::PageFragment;
use crate::replace;

/// The document under construction.
///
/// Fragments are merged in as they arrive, so only the accumulated output
/// and the fragment being appended are alive at any time.
pub struct OutputDocument {
    document: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
}

impl OutputDocument {
    pub fn new() -> Self {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        Self {
            document,
            pages_id,
            kids: Vec::new(),
        }
    }

    /// Number of pages appended so far.
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append a fragment's page after the current last page.
    pub fn append(&mut self, fragment: PageFragment) -> Result<(), OcrError> {
        let mut fragment = fragment.into_document()?;
        fragment.renumber_objects_with(self.document.max_id + 1);

        let page_id = fragment
            .get_pages()
            .into_values()
            .next()
            .ok_or_else(|| OcrError::Fragment("fragment lost its page".to_string()))?;

        // The fragment's page tree is dropped, so anything the page inherited
        // from it has to move onto the page itself.
        let lifted: Vec<(&[u8], Object)> = INHERITABLE
            .iter()
            .filter_map(|&key| inherited_attribute(&fragment, page_id, key).map(|v| (key, v.clone())))
            .collect();

        let max_id = fragment.objects.keys().map(|&(id, _)| id).max().unwrap_or(0);
        for (object_id, object) in fragment.objects {
            match type_name(&object) {
                Some(b"Catalog") | Some(b"Pages") | Some(b"Outlines") => continue,
                _ => {}
            }
            let object = if object_id == page_id {
                let mut page = object.as_dict().cloned().map_err(|e| OcrError::Fragment(e.to_string()))?;
                for (key, value) in &lifted {
                    if page.get(key).is_err() {
                        page.set(key.to_vec(), value.clone());
                    }
                }
                page.set("Parent", self.pages_id);
                Object::Dictionary(page)
            } else {
                object
            };
            self.document.objects.insert(object_id, object);
        }

        self.document.max_id = self.document.max_id.max(max_id);
        self.kids.push(page_id);
        debug!("Appended page {} to output", self.kids.len());
        Ok(())
    }

    /// Close the page tree and return the finished document.
    fn finish(mut self) -> Document {
        let count = self.kids.len() as i64;
        let kids: Vec<Object> = self.kids.into_iter().map(Object::Reference).collect();
        self.document.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.document.trailer.set("Root", catalog_id);

        self.document.prune_objects();
        self.document.compress();
        self.document
    }

    /// Serialize the finished document.
    pub fn into_bytes(self) -> std::io::Result<Vec<u8>> {
        let mut document = self.finish();
        let mut buf = Vec::new();
        document
            .save_to(&mut buf)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        Ok(buf)
    }
}

impl Default for OutputDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Write `output` to `destination`, replacing whatever is there.
///
/// The bytes go to a temporary file in the destination directory which is
/// then renamed over the destination, so an interrupted write never leaves a
/// truncated file behind.
pub fn save(output: OutputDocument, destination: &Path) -> crate::Result<()> {
    let write_error = |source| PdfOcrError::Write {
        path: destination.to_path_buf(),
        source,
    };

    let pages = output.page_count();
    let bytes = output.into_bytes().map_err(write_error)?;

    let mut temp = replace::sibling_temp(destination).map_err(write_error)?;
    temp.write_all(&bytes).map_err(write_error)?;
    temp.as_file().sync_all().map_err(write_error)?;
    replace::persist(temp, destination).map_err(write_error)?;

    info!(
        "Saved {} pages ({} bytes) to {}",
        pages,
        bytes.len(),
        destination.display()
    );
    Ok(())
}

fn type_name(object: &Object) -> Option<&[u8]> {
    object.as_dict().ok()?.get(b"Type").ok()?.as_name().ok()
}
