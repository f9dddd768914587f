//! Copies the PaddleOCR models into the packaging directory
//!
//! `prepare_models --info` only lists what is in the source directory.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use pdf_ocr_tool::assets::{format_bytes, model_info, prepare_assets, FileAction, PrepareReport};
use pdf_ocr_tool::init_logging;

const RULE_WIDTH: usize = 60;

#[derive(Parser, Debug)]
#[command(name = "prepare_models")]
#[command(about = "Verify the OCR models and copy them into the packaging directory")]
struct Args {
    /// Print model file sizes and exit
    #[arg(long)]
    info: bool,

    /// Directory holding the development models
    #[arg(long, default_value = "testmodel")]
    source: PathBuf,

    /// Packaging directory to copy the models into
    #[arg(long, default_value = "models")]
    target: PathBuf,
}

fn print_info(args: &Args) {
    let rule = "=".repeat(RULE_WIDTH);
    println!("\n{}\nModel file info\n{}", rule, rule);

    for model in model_info(&args.source) {
        if !model.exists {
            println!("\n{}: [directory not found]", model.name);
            continue;
        }

        println!("\n{}:", model.name);
        for (filename, size) in &model.files {
            match size {
                Some(bytes) => println!("  {}: {} bytes", filename, format_bytes(*bytes)),
                None => println!("  {}: [missing]", filename),
            }
        }
        let total = model.total_bytes();
        println!(
            "  Total: {} bytes ({:.2} MB)",
            format_bytes(total),
            total as f64 / 1024.0 / 1024.0
        );
    }
}

fn print_report(report: &PrepareReport) {
    for model in &report.models {
        println!("\nChecking model: {}", model.name);
        println!("Source: {}", model.source.display());

        if !model.check.complete {
            println!("  [ERROR] Model files incomplete!");
            for missing in &model.check.missing {
                println!("    Missing: {}", missing);
            }
            continue;
        }

        println!("  [OK] Model files complete");
        for (filename, action) in &model.files {
            match action {
                FileAction::Copied { bytes } => {
                    println!("    {} ({:.1} KB)", filename, *bytes as f64 / 1024.0)
                }
                FileAction::Skipped => println!("    {} (already present, skipped)", filename),
            }
        }
    }
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    if args.info {
        print_info(&args);
        return ExitCode::SUCCESS;
    }

    let rule = "=".repeat(RULE_WIDTH);
    println!("{}\nPaddleOCR model preparation\n{}", rule, rule);

    let report = match prepare_assets(&args.source, &args.target) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    print_report(&report);

    println!("\n{}", rule);
    if report.is_success() {
        println!("[SUCCESS] All model files are ready!");
        println!("Target directory: {}", report.target.display());
        if let Some(manifest) = &report.manifest {
            println!("Manifest: {}", manifest.display());
        }
        ExitCode::SUCCESS
    } else {
        println!("[FAILED] Some model files are incomplete, please check!");
        ExitCode::FAILURE
    }
}
