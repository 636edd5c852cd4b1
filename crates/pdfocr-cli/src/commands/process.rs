//! Process command - OCR and/or compress a batch of PDF files.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Args, ValueEnum};
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use pdfocr_core::{
    Action, BatchReport, CompressEngine, FailurePolicy, Job, JobEvent, JobOutcome, JobStatus,
    Orchestrator, OutputMode,
};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input files or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// What to do with each file
    #[arg(short, long, value_enum, default_value = "both")]
    action: ActionArg,

    /// Write new files next to the inputs or overwrite them
    #[arg(short, long, value_enum, default_value = "new")]
    output: OutputArg,

    /// Rendering resolution for OCR (default from config: 300)
    #[arg(long)]
    dpi: Option<u32>,

    /// Pages of one document rasterized and recognized concurrently
    #[arg(long)]
    parallel_pages: Option<usize>,

    /// Stop at the first failed file
    #[arg(long)]
    fail_fast: bool,

    /// Compression backend
    #[arg(long, value_enum)]
    compressor: Option<CompressorArg>,

    /// Write a per-file CSV summary
    #[arg(long)]
    summary: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ActionArg {
    /// Add a searchable text layer
    Ocr,
    /// Shrink the file
    #[value(alias = "shrink")]
    Compress,
    /// OCR, then compress the OCR output
    Both,
}

impl From<ActionArg> for Action {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Ocr => Action::Ocr,
            ActionArg::Compress => Action::Compress,
            ActionArg::Both => Action::Both,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputArg {
    /// Write <name>_ocr.pdf / <name>_small.pdf next to the input
    New,
    /// Replace the input file
    Overwrite,
}

impl From<OutputArg> for OutputMode {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::New => OutputMode::New,
            OutputArg::Overwrite => OutputMode::Overwrite,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CompressorArg {
    /// Ghostscript with the /screen preset
    Ghostscript,
    /// In-process stream compression
    Lopdf,
}

impl From<CompressorArg> for CompressEngine {
    fn from(arg: CompressorArg) -> Self {
        match arg {
            CompressorArg::Ghostscript => CompressEngine::Ghostscript,
            CompressorArg::Lopdf => CompressEngine::Lopdf,
        }
    }
}

/// Run the batch. Returns `false` if any file failed.
pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<bool> {
    let start = Instant::now();

    let mut config = super::config::load(config_path)?;
    if let Some(dpi) = args.dpi {
        config.raster.dpi = dpi;
    }
    if let Some(pages) = args.parallel_pages {
        config.pipeline.parallel_pages = pages;
    }
    if let Some(compressor) = args.compressor {
        config.compress.engine = compressor.into();
    }
    let orchestrator = Orchestrator::from_config(&config)?;

    let files = expand_inputs(&args.inputs)?;
    let action = Action::from(args.action);
    let mode = OutputMode::from(args.output);
    let jobs: Vec<Job> = files
        .into_iter()
        .map(|path| Job::new(path, action, mode))
        .collect();
    let policy = if args.fail_fast {
        FailurePolicy::FailFast
    } else {
        FailurePolicy::Continue
    };

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        jobs.len()
    );
    info!(
        "Action {:?}, output {:?}, {} DPI",
        action, mode, config.raster.dpi
    );

    let progress = ProgressBar::new(jobs.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")?
            .progress_chars("=>-"),
    );

    let observer_progress = progress.clone();
    let report = tokio::task::spawn_blocking(move || {
        orchestrator.run_batch(&jobs, policy, |event| match event {
            JobEvent::Started { job, .. } => {
                observer_progress.set_message(display_name(&job.input));
            }
            JobEvent::Finished { outcome, .. } => {
                debug!(
                    "{} finished in {:?}",
                    outcome.job.input.display(),
                    outcome.elapsed
                );
                observer_progress.inc(1);
            }
        })
    })
    .await?;

    progress.finish_with_message("Complete");

    if let Some(summary_path) = &args.summary {
        write_summary(summary_path, &report)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    print_report(&report, start.elapsed());

    Ok(report.is_success())
}

/// Expand glob patterns in order. Inputs that exist or match nothing are kept
/// as literal paths so a missing file shows up as a failed job.
fn expand_inputs(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let literal = PathBuf::from(pattern);
        if literal.exists() {
            files.push(literal);
            continue;
        }

        let matches: Vec<PathBuf> = glob(pattern)?.filter_map(|r| r.ok()).collect();
        if matches.is_empty() {
            files.push(literal);
        } else {
            files.extend(matches);
        }
    }
    Ok(files)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_report(report: &BatchReport, elapsed: Duration) {
    let failed: Vec<&JobOutcome> = report.failed().collect();
    let skipped = report.skipped().count();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        report.outcomes.len(),
        elapsed
    );
    println!(
        "   {} successful, {} failed, {} skipped",
        style(report.succeeded().count()).green(),
        style(failed.len()).red(),
        style(skipped).yellow()
    );

    for outcome in report.succeeded() {
        if let JobStatus::Succeeded(output) = &outcome.status {
            for written in output.ocr.iter().chain(output.compressed.iter()) {
                println!("   {} {}", style("→").dim(), written.display());
            }
        }
    }

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for outcome in failed {
            if let Some(error) = outcome.error() {
                println!("  - {}: {}", outcome.job.input.display(), error);
            }
        }
    }
}

fn write_summary(path: &Path, report: &BatchReport) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "file",
        "status",
        "ocr_output",
        "compressed_output",
        "pages",
        "processing_time_ms",
        "error",
    ])?;

    for outcome in &report.outcomes {
        let file = outcome.job.input.display().to_string();
        let elapsed = outcome.elapsed.as_millis().to_string();
        match &outcome.status {
            JobStatus::Succeeded(output) => {
                let ocr = output
                    .ocr
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                let compressed = output
                    .compressed
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                let pages = output.pages.map(|n| n.to_string()).unwrap_or_default();
                wtr.write_record([
                    file.as_str(),
                    "success",
                    &ocr,
                    &compressed,
                    &pages,
                    &elapsed,
                    "",
                ])?;
            }
            JobStatus::Failed(error) => {
                wtr.write_record([
                    file.as_str(),
                    "error",
                    "",
                    "",
                    "",
                    &elapsed,
                    &error.to_string(),
                ])?;
            }
            JobStatus::Skipped => {
                wtr.write_record([file.as_str(), "skipped", "", "", "", "", ""])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_inputs_keeps_missing_literals() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.pdf"), b"").unwrap();
        std::fs::write(dir.path().join("a.pdf"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let pattern = dir.path().join("*.pdf").display().to_string();
        let missing = dir.path().join("missing.pdf").display().to_string();
        let files = expand_inputs(&[missing.clone(), pattern]).unwrap();

        assert_eq!(
            files,
            vec![
                PathBuf::from(missing),
                dir.path().join("a.pdf"),
                dir.path().join("b.pdf"),
            ]
        );
    }

    #[test]
    fn test_shrink_is_an_alias_for_compress() {
        let action = ActionArg::from_str("shrink", false).unwrap();
        assert_eq!(Action::from(action), Action::Compress);
    }

    #[test]
    fn test_arguments_map_to_core_types() {
        assert_eq!(Action::from(ActionArg::Compress), Action::Compress);
        assert_eq!(OutputMode::from(OutputArg::Overwrite), OutputMode::Overwrite);
        assert_eq!(CompressEngine::from(CompressorArg::Lopdf), CompressEngine::Lopdf);
    }
}
