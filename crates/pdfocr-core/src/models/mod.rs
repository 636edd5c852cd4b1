//! Configuration and job models.

pub mod config;
pub mod job;

pub use config::{CompressConfig, CompressEngine, OcrConfig, PdfOcrConfig, PipelineConfig, RasterConfig};
pub use job::{Action, Job, OutputMode, OutputPaths};
