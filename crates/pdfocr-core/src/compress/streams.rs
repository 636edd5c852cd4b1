//! In-process compression with lopdf.
//!
//! Much weaker than Ghostscript (images are not resampled) but needs no
//! external tool.

use std::path::Path;

use lopdf::Document;
use tracing::{debug, info};

use super::{write_replacing, Compressor};
use crate::error::CompressError;

/// Compressor that deflates streams and drops unreferenced objects.
#[derive(Debug, Default)]
pub struct LopdfCompressor;

impl LopdfCompressor {
    pub fn new() -> Self {
        Self
    }
}

impl Compressor for LopdfCompressor {
    fn compress(&self, input: &Path, output: &Path) -> Result<(), CompressError> {
        info!("Compressing {} with lopdf", input.display());
        let mut doc = Document::load(input).map_err(|e| CompressError::Pdf(e.to_string()))?;

        let pruned = doc.prune_objects();
        doc.delete_zero_length_streams();
        doc.compress();
        debug!("Pruned {} unreferenced objects", pruned.len());

        write_replacing(output, |temp| {
            doc.save(temp).map_err(|e| CompressError::Pdf(e.to_string()))?;
            Ok(())
        })
    }
}
