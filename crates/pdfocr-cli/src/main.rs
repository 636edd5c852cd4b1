//! CLI application for turning scanned PDFs into searchable PDFs.

mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::style;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{config, process, tools};

/// pdfocr - Add a searchable text layer to PDFs and shrink them
#[derive(Parser)]
#[command(name = "pdfocr")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// OCR and/or compress PDF files
    Process(process::ProcessArgs),

    /// Check that the external tools can be found
    Tools,

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("{} {}", style("✗").red(), e);
        return ExitCode::from(2);
    }

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Process(args) => process::run(args, config_path).await,
        Commands::Tools => tools::run(config_path),
        Commands::Config(args) => config::run(args, config_path).map(|()| true),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("{} {:#}", style("✗").red(), e);
            ExitCode::from(2)
        }
    }
}
