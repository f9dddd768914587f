//! PDF OCR Tool - mobile front end

use anyhow::Result;
use tracing::info;

use pdf_ocr_tool::config;
use pdf_ocr_tool::dashboard::run_mobile;
use pdf_ocr_tool::init_logging;

fn main() -> Result<()> {
    init_logging();

    let config = config::load_or_default();
    info!("Starting mobile front end");
    run_mobile(&config)
}
