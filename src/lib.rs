//! PDF OCR Tool - PaddleOCR text recognition for PDF and image files
//!
//! Renders each page, detects and recognizes text lines with the PP-OCRv5 mobile
//! ONNX models and writes an annotated image, a JSON dump and a text file per page.
//! The command-line, desktop and mobile front ends share one controller.

pub mod app;
pub mod assets;
pub mod config;
pub mod console;
pub mod dashboard;
pub mod error;
pub mod processor;
pub mod shared;
pub mod storage;
pub mod vision;

use tracing_subscriber::{fmt, EnvFilter};

pub use error::{OcrError, OcrResult};

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed by a test harness
    let _ = fmt().with_env_filter(filter).try_init();
}
