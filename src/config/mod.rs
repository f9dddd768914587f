//! Application Configuration
//!
//! User settings stored in TOML format. Every section has defaults matching the
//! layout the tools expect when run from a project checkout (`testmodel/`, `output/`).

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::vision::models::{DETECTION_MODEL_NAME, RECOGNITION_MODEL_NAME};
use crate::vision::EngineOptions;

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Model locations
    pub models: ModelSettings,
    /// Recognition engine parameters
    pub engine: EngineOptions,
    /// Where per-page results are written
    pub output: OutputSettings,
    /// Command-line front end settings
    pub cli: CliSettings,
    /// GUI front end settings
    pub ui: UiSettings,
}

/// Model directory layout: `<root>/<detection>` and `<root>/<recognition>`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Directory holding both model directories
    pub root: PathBuf,
    /// Detection model directory name
    pub detection: String,
    /// Recognition model directory name
    pub recognition: String,
    /// Packaged copy of the models (the `prepare_models` target), staged into
    /// per-user storage by the mobile front end when `root` is absent
    pub bundle: PathBuf,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("testmodel"),
            detection: DETECTION_MODEL_NAME.to_string(),
            recognition: RECOGNITION_MODEL_NAME.to_string(),
            bundle: PathBuf::from("models"),
        }
    }
}

impl ModelSettings {
    pub fn detection_dir(&self) -> PathBuf {
        self.root.join(&self.detection)
    }

    pub fn recognition_dir(&self) -> PathBuf {
        self.root.join(&self.recognition)
    }

    /// Detection and recognition directory names
    pub fn dir_names(&self) -> [&str; 2] {
        [self.detection.as_str(), self.recognition.as_str()]
    }
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Root directory for `page_<NNN>_result` folders
    pub dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
        }
    }
}

/// Command-line front end settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliSettings {
    /// File recognized by `ocr_cli`
    pub input_file: PathBuf,
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            input_file: PathBuf::from("input.pdf"),
        }
    }
}

/// GUI front end settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Open the result folder, annotated image and text file after a run (desktop only)
    pub open_results: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self { open_results: true }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load configuration from the user config directory or fall back to defaults
pub fn load_or_default() -> AppConfig {
    if let Ok(config_dir) = crate::storage::get_config_dir() {
        let config_path = config_dir.join("config.toml");
        if config_path.exists() {
            match load_config(&config_path) {
                Ok(config) => {
                    info!("Loaded configuration from {:?}", config_path);
                    return config;
                }
                Err(e) => tracing::warn!("Ignoring unreadable config {:?}: {}", config_path, e),
            }
        }
    }
    info!("Using default configuration");
    AppConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();

        assert_eq!(config.models.root, PathBuf::from("testmodel"));
        assert_eq!(
            config.models.detection_dir(),
            PathBuf::from("testmodel").join("PP-OCRv5_mobile_det_infer")
        );
        assert_eq!(
            config.models.recognition_dir(),
            PathBuf::from("testmodel").join("PP-OCRv5_mobile_rec_infer")
        );
        assert_eq!(config.output.dir, PathBuf::from("output"));
        assert!(config.ui.open_results);

        // Feature toggles are all off
        assert!(!config.engine.use_doc_orientation_classify);
        assert!(!config.engine.use_doc_unwarping);
        assert!(!config.engine.use_textline_orientation);
    }

    #[test]
    fn test_save_and_load_config() {
        let mut config = AppConfig::default();
        config.output.dir = PathBuf::from("/tmp/ocr-out");
        config.engine.det_box_threshold = 0.7;

        let temp_file = NamedTempFile::new().unwrap();
        save_config(&config, temp_file.path()).unwrap();
        let loaded = load_config(temp_file.path()).unwrap();

        assert_eq!(loaded.output.dir, PathBuf::from("/tmp/ocr-out"));
        assert!((loaded.engine.det_box_threshold - 0.7).abs() < 0.001);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[models]\nroot = \"/opt/models\"").unwrap();

        let loaded = load_config(temp_file.path()).unwrap();
        assert_eq!(loaded.models.root, PathBuf::from("/opt/models"));
        assert_eq!(loaded.models.detection, DETECTION_MODEL_NAME);
        assert_eq!(loaded.cli.input_file, PathBuf::from("input.pdf"));
        assert_eq!(loaded.models.bundle, PathBuf::from("models"));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "this is not valid toml {{{{").unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }
}
