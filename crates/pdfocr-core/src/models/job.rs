//! Processing jobs and output naming.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// What to do with an input file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Add an OCR text layer.
    Ocr,
    /// Shrink the file.
    Compress,
    /// OCR, then compress the OCR output.
    #[default]
    Both,
}

impl Action {
    pub fn runs_ocr(self) -> bool {
        matches!(self, Self::Ocr | Self::Both)
    }

    pub fn runs_compress(self) -> bool {
        matches!(self, Self::Compress | Self::Both)
    }
}

/// Where outputs are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Every action writes back to the input path.
    Overwrite,
    /// `<base>_ocr.pdf` / `<base>_small.pdf` next to the input.
    #[default]
    New,
}

/// One file to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub input: PathBuf,
    pub action: Action,
    pub mode: OutputMode,
}

impl Job {
    pub fn new(input: impl Into<PathBuf>, action: Action, mode: OutputMode) -> Self {
        Self {
            input: input.into(),
            action,
            mode,
        }
    }

    /// Destinations this job will write.
    pub fn output_paths(&self) -> OutputPaths {
        OutputPaths::resolve(&self.input, self.action, self.mode)
    }
}

/// Resolved destination paths for a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// Destination of the OCR step, if it runs.
    pub ocr: Option<PathBuf>,
    /// Destination of the compress step, if it runs.
    pub compress: Option<PathBuf>,
}

impl OutputPaths {
    /// Apply the naming policy to `input`.
    pub fn resolve(input: &Path, action: Action, mode: OutputMode) -> Self {
        let target = |suffix: &str| match mode {
            OutputMode::Overwrite => input.to_path_buf(),
            OutputMode::New => suffixed(input, suffix),
        };

        Self {
            ocr: action.runs_ocr().then(|| target("ocr")),
            compress: action.runs_compress().then(|| target("small")),
        }
    }
}

/// `dir/name.pdf` -> `dir/name_<suffix>.pdf`.
fn suffixed(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}_{suffix}.pdf"))
}
