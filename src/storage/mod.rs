//! Storage Layer
//!
//! Per-user directories for configuration, staged models and recognition output.

use anyhow::Result;
use directories::ProjectDirs;
use std::path::PathBuf;

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "pdfocrtool", "PdfOcrTool")
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))
}

/// Get the application data directory
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = project_dirs()?.data_dir().to_path_buf();
    std::fs::create_dir_all(&data_dir)?;

    Ok(data_dir)
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = project_dirs()?.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}

/// Directory the mobile front end stages bundled models into
pub fn get_staged_models_dir() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("models"))
}

/// Directory the mobile front end writes results into
pub fn get_user_output_dir() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("output"))
}
