//! Ghostscript `pdfwrite` compression.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::info;

use super::{write_replacing, Compressor};
use crate::error::CompressError;
use crate::tool;

/// Fixed `pdfwrite` profile: PDF 1.4, `/screen` quality, non-interactive.
const PROFILE: [&str; 6] = [
    "-sDEVICE=pdfwrite",
    "-dCompatibilityLevel=1.4",
    "-dPDFSETTINGS=/screen",
    "-dNOPAUSE",
    "-dQUIET",
    "-dBATCH",
];

/// Compressor that shells out to Ghostscript.
pub struct GhostscriptCompressor {
    executable: PathBuf,
}

impl GhostscriptCompressor {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    fn arguments(input: &Path, output: &Path) -> Vec<OsString> {
        let mut target = OsString::from("-sOutputFile=");
        target.push(output);

        let mut args: Vec<OsString> = PROFILE.iter().map(|&arg| OsString::from(arg)).collect();
        args.push(target);
        args.push(input.as_os_str().to_owned());
        args
    }
}

impl Default for GhostscriptCompressor {
    fn default() -> Self {
        Self::new("gs")
    }
}

impl Compressor for GhostscriptCompressor {
    fn compress(&self, input: &Path, output: &Path) -> Result<(), CompressError> {
        info!("Shrinking {}", input.display());
        write_replacing(output, |temp| {
            tool::run(&self.executable, Self::arguments(input, temp))?;
            Ok(())
        })?;
        info!("Shrinking completed: {}", output.display());
        Ok(())
    }
}
