//! Running jobs: OCR and/or compression per input file, in list order.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::compress::{Compressor, GhostscriptCompressor, LopdfCompressor};
use crate::error::{PdfError, PdfOcrError, Result};
use crate::models::config::{CompressEngine, PdfOcrConfig};
use crate::models::job::Job;
use crate::ocr::{OcrEngine, TesseractEngine};
use crate::pdf::{self, PdftoppmRasterizer, Rasterizer};
use crate::pipeline::{PagePipeline, Resolution};

/// What a batch does after a job fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Keep going and report every failure at the end.
    #[default]
    Continue,
    /// Stop at the first failure; remaining jobs are skipped.
    FailFast,
}

/// Files written by a successful job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobOutput {
    /// Searchable PDF, if OCR ran.
    pub ocr: Option<PathBuf>,
    /// Pages in the searchable PDF.
    pub pages: Option<usize>,
    /// Compressed PDF, if compression ran.
    pub compressed: Option<PathBuf>,
}

/// How a job ended.
#[derive(Debug)]
pub enum JobStatus {
    Succeeded(JobOutput),
    Failed(PdfOcrError),
    /// Not attempted because an earlier job failed under [`FailurePolicy::FailFast`].
    Skipped,
}

/// Result of one job within a batch.
#[derive(Debug)]
pub struct JobOutcome {
    pub job: Job,
    pub status: JobStatus,
    pub elapsed: Duration,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, JobStatus::Succeeded(_))
    }

    pub fn error(&self) -> Option<&PdfOcrError> {
        match &self.status {
            JobStatus::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Outcomes of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<JobOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &JobOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &JobOutcome> {
        self.outcomes.iter().filter(|o| o.error().is_some())
    }

    pub fn skipped(&self) -> impl Iterator<Item = &JobOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, JobStatus::Skipped))
    }

    /// True when every job succeeded.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(JobOutcome::is_success)
    }
}

/// Progress notifications from [`Orchestrator::run_batch`].
#[derive(Debug)]
pub enum JobEvent<'a> {
    Started {
        index: usize,
        total: usize,
        job: &'a Job,
    },
    Finished {
        index: usize,
        total: usize,
        outcome: &'a JobOutcome,
    },
}

/// Owns the tool adapters and runs jobs with them.
pub struct Orchestrator {
    rasterizer: Box<dyn Rasterizer>,
    engine: Box<dyn OcrEngine>,
    compressor: Box<dyn Compressor>,
    resolution: Resolution,
    parallel_pages: usize,
}

impl Orchestrator {
    /// Build an orchestrator from explicit adapters.
    pub fn new(
        config: &PdfOcrConfig,
        rasterizer: Box<dyn Rasterizer>,
        engine: Box<dyn OcrEngine>,
        compressor: Box<dyn Compressor>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            rasterizer,
            engine,
            compressor,
            resolution: Resolution::new(config.raster.dpi)?,
            parallel_pages: config.pipeline.parallel_pages,
        })
    }

    /// Build an orchestrator backed by the external tools named in `config`.
    pub fn from_config(config: &PdfOcrConfig) -> Result<Self> {
        let compressor: Box<dyn Compressor> = match config.compress.engine {
            CompressEngine::Ghostscript => {
                Box::new(GhostscriptCompressor::new(&config.compress.ghostscript))
            }
            CompressEngine::Lopdf => Box::new(LopdfCompressor::new()),
        };
        Self::new(
            config,
            Box::new(PdftoppmRasterizer::new(&config.raster.pdftoppm)),
            Box::new(TesseractEngine::new(&config.ocr.tesseract)),
            compressor,
        )
    }

    /// Run one job. Compression, when requested after OCR, reads the OCR
    /// output rather than the original.
    pub fn run_job(&self, job: &Job) -> Result<JobOutput> {
        let paths = job.output_paths();
        let mut output = JobOutput::default();
        let mut current = job.input.clone();

        if let Some(destination) = paths.ocr {
            let document = PagePipeline::new(self.rasterizer.as_ref(), self.engine.as_ref())
                .with_parallel_pages(self.parallel_pages)
                .run(&job.input, self.resolution)?;
            output.pages = Some(document.page_count());
            pdf::save(document, &destination)?;
            info!("OCR output written to {}", destination.display());
            current = destination.clone();
            output.ocr = Some(destination);
        }

        if let Some(destination) = paths.compress {
            fs::metadata(&current).map_err(|e| PdfOcrError::SourceUnreadable {
                path: current.clone(),
                source: PdfError::Read(e),
            })?;
            self.compressor
                .compress(&current, &destination)
                .map_err(|source| PdfOcrError::Compress {
                    path: current.clone(),
                    source,
                })?;
            output.compressed = Some(destination);
        }

        Ok(output)
    }

    /// Run `jobs` one after another in list order.
    pub fn run_batch<F>(&self, jobs: &[Job], policy: FailurePolicy, mut observer: F) -> BatchReport
    where
        F: FnMut(JobEvent<'_>),
    {
        let total = jobs.len();
        let mut report = BatchReport {
            outcomes: Vec::with_capacity(total),
        };
        let mut stopped = false;

        for (index, job) in jobs.iter().enumerate() {
            if stopped {
                report.outcomes.push(JobOutcome {
                    job: job.clone(),
                    status: JobStatus::Skipped,
                    elapsed: Duration::ZERO,
                });
                continue;
            }

            observer(JobEvent::Started { index, total, job });
            let start = Instant::now();
            let status = match self.run_job(job) {
                Ok(output) => JobStatus::Succeeded(output),
                Err(e) => {
                    warn!("Failed to process {}: {}", job.input.display(), e);
                    stopped = policy == FailurePolicy::FailFast;
                    JobStatus::Failed(e)
                }
            };
            let outcome = JobOutcome {
                job: job.clone(),
                status,
                elapsed: start.elapsed(),
            };
            observer(JobEvent::Finished {
                index,
                total,
                outcome: &outcome,
            });
            report.outcomes.push(outcome);
        }

        report
    }
}
