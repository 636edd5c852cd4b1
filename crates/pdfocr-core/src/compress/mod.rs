//! PDF compression.

mod ghostscript;
mod streams;

pub use ghostscript::GhostscriptCompressor;
pub use streams::LopdfCompressor;

use std::path::Path;

use crate::error::CompressError;
use crate::replace;

/// Rewrites a PDF at reduced size.
pub trait Compressor: Send + Sync {
    /// Compress `input` into `output`. `input` and `output` may be the same
    /// path.
    fn compress(&self, input: &Path, output: &Path) -> Result<(), CompressError>;
}

/// Run `write` against a temporary path next to `output`, then move the
/// result over `output`.
fn write_replacing<F>(output: &Path, write: F) -> Result<(), CompressError>
where
    F: FnOnce(&Path) -> Result<(), CompressError>,
{
    let temp = replace::sibling_temp(output)?;
    write(temp.path())?;
    replace::persist(temp, output)?;
    Ok(())
}
