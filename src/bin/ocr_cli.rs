//! PDF OCR Tool - command-line front end
//!
//! Recognizes the configured input file and prints the text page by page.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

use pdf_ocr_tool::app::{paddle_engine_factory, OcrController, RunState};
use pdf_ocr_tool::config;
use pdf_ocr_tool::console::{list_pdfs, ConsolePresenter};
use pdf_ocr_tool::init_logging;

#[derive(Parser, Debug)]
#[command(name = "ocr_cli")]
#[command(about = "Recognize the configured PDF and print its text")]
struct Args {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn run(args: Args) -> Result<ExitCode> {
    let config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::load_or_default(),
    };

    for dir in [config.models.detection_dir(), config.models.recognition_dir()] {
        if !dir.is_dir() {
            eprintln!("Error: model directory not found: {}", dir.display());
            return Ok(ExitCode::FAILURE);
        }
    }

    let input = &config.cli.input_file;
    if !input.exists() {
        eprintln!("Error: input file not found: {}", input.display());
        println!("\nPDF files in the current directory:");
        let pdfs = list_pdfs(&std::env::current_dir()?);
        if pdfs.is_empty() {
            println!("  (none)");
        }
        for name in pdfs {
            println!("  - {}", name);
        }
        return Ok(ExitCode::FAILURE);
    }

    let factory = paddle_engine_factory(config.models.clone(), config.engine.clone());
    let mut controller = OcrController::new(factory, config.output.dir.clone());
    let mut presenter = ConsolePresenter::stdout();

    info!("Recognizing {:?}", input);
    controller.select_file(input.clone());
    controller.start()?;
    controller.wait(&mut presenter);

    Ok(match controller.state() {
        RunState::Done => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

fn main() -> ExitCode {
    init_logging();

    match run(Args::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
