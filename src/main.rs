//! PDF OCR Tool - desktop front end

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use pdf_ocr_tool::config::{self, AppConfig};
use pdf_ocr_tool::dashboard::run_desktop;
use pdf_ocr_tool::init_logging;

/// PaddleOCR text recognition for PDF and image files
#[derive(Parser, Debug)]
#[command(name = "pdf-ocr-tool")]
#[command(about = "Recognize text in PDF and image files with PaddleOCR models")]
struct Args {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the two model directories
    #[arg(long)]
    model_root: Option<PathBuf>,

    /// Root directory for per-page results
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not open the results after a run
    #[arg(long)]
    no_open: bool,
}

fn load(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::load_or_default(),
    };
    if let Some(root) = &args.model_root {
        config.models.root = root.clone();
    }
    if let Some(output) = &args.output {
        config.output.dir = output.clone();
    }
    if args.no_open {
        config.ui.open_results = false;
    }
    Ok(config)
}

fn main() -> Result<()> {
    init_logging();

    let args = Args::parse();
    let config = load(&args)?;

    for dir in [config.models.detection_dir(), config.models.recognition_dir()] {
        if !dir.is_dir() {
            error!("Model directory not found: {}", dir.display());
            eprintln!("Error: model directory not found: {}", dir.display());
            std::process::exit(1);
        }
    }

    info!("Starting PDF OCR Tool v{}", env!("CARGO_PKG_VERSION"));
    run_desktop(&config).map_err(|e| anyhow::anyhow!("Desktop window failed: {}", e))?;

    info!("PDF OCR Tool shutting down");
    Ok(())
}
