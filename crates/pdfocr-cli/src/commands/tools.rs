//! Tools command - check the external executables the pipeline depends on.

use std::path::Path;

use console::style;

use pdfocr_core::tool::locate;
use pdfocr_core::CompressEngine;

/// Print where each configured tool resolves to. Returns `false` if a tool the
/// current configuration needs is missing.
pub fn run(config_path: Option<&str>) -> anyhow::Result<bool> {
    let config = super::config::load(config_path)?;
    let ghostscript_used = config.compress.engine == CompressEngine::Ghostscript;

    let tools: [(&str, &Path, bool); 3] = [
        ("rasterizer", &config.raster.pdftoppm, true),
        ("ocr", &config.ocr.tesseract, true),
        ("compressor", &config.compress.ghostscript, ghostscript_used),
    ];

    let mut all_found = true;
    for (role, program, required) in tools {
        match locate(program) {
            Some(found) => println!(
                "{} {:<11} {} ({})",
                style("✓").green(),
                role,
                program.display(),
                found.display()
            ),
            None if required => {
                all_found = false;
                println!(
                    "{} {:<11} {} not found",
                    style("✗").red(),
                    role,
                    program.display()
                );
            }
            None => println!(
                "{} {:<11} {} not found (unused: compress.engine is lopdf)",
                style("-").dim(),
                role,
                program.display()
            ),
        }
    }

    Ok(all_found)
}
