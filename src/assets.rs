//! Model asset preparation
//!
//! Copies the detection and recognition model directories from a development
//! checkout into a packaging directory, verifying that each model is complete.
//! Also used by the mobile front end to stage bundled models into per-user storage.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{OcrError, OcrResult};
use crate::vision::models::{
    verify_model_files, ModelCheck, ModelKind, ModelManifest, REQUIRED_MODEL_FILES,
};

/// What happened to one required file during preparation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileAction {
    Copied { bytes: u64 },
    /// Destination already had the same size
    Skipped,
}

/// Outcome for one model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelReport {
    pub name: String,
    pub source: PathBuf,
    pub check: ModelCheck,
    /// Per-file actions; empty when the model was incomplete
    pub files: Vec<(String, FileAction)>,
}

/// Outcome of [`prepare_assets`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrepareReport {
    pub target: PathBuf,
    pub models: Vec<ModelReport>,
    /// Set when every model was complete and a manifest was written
    pub manifest: Option<PathBuf>,
}

impl PrepareReport {
    /// Every model was complete
    pub fn is_success(&self) -> bool {
        self.models.iter().all(|m| m.check.complete)
    }

    pub fn copied_bytes(&self) -> u64 {
        self.models
            .iter()
            .flat_map(|m| &m.files)
            .map(|(_, action)| match action {
                FileAction::Copied { bytes } => *bytes,
                FileAction::Skipped => 0,
            })
            .sum()
    }

    pub fn copied_files(&self) -> usize {
        self.models
            .iter()
            .flat_map(|m| &m.files)
            .filter(|(_, action)| matches!(action, FileAction::Copied { .. }))
            .count()
    }
}

/// Copy every complete model from `source` to `target`.
///
/// Files whose destination already has the same size are skipped. Incomplete
/// models are reported and left uncopied; the report is unsuccessful if any model
/// was incomplete.
pub fn prepare_assets(source: &Path, target: &Path) -> OcrResult<PrepareReport> {
    let names = ModelKind::ALL.map(|kind| kind.dir_name());
    prepare_models_named(source, target, &names)
}

/// [`prepare_assets`] for model directories with custom names
pub fn prepare_models_named(
    source: &Path,
    target: &Path,
    names: &[&str],
) -> OcrResult<PrepareReport> {
    std::fs::create_dir_all(target)?;

    let mut report = PrepareReport {
        target: target.to_path_buf(),
        ..Default::default()
    };

    for name in names {
        let source_dir = source.join(name);
        let check = verify_model_files(&source_dir);

        if !check.complete {
            warn!("Model {} is incomplete, missing: {:?}", name, check.missing);
            report.models.push(ModelReport {
                name: name.to_string(),
                source: source_dir,
                check,
                files: Vec::new(),
            });
            continue;
        }

        let target_dir = target.join(name);
        std::fs::create_dir_all(&target_dir)?;

        let mut files = Vec::new();
        for filename in REQUIRED_MODEL_FILES {
            let action = copy_if_changed(&source_dir.join(filename), &target_dir.join(filename))?;
            debug!("{}/{}: {:?}", name, filename, action);
            files.push((filename.to_string(), action));
        }

        report.models.push(ModelReport {
            name: name.to_string(),
            source: source_dir,
            check,
            files,
        });
    }

    if report.is_success() {
        ModelManifest::build_named(target, names)?.save(target)?;
        report.manifest = Some(target.join(ModelManifest::FILE_NAME));
        info!(
            "Prepared models in {:?} ({} files, {} bytes copied)",
            target,
            report.copied_files(),
            report.copied_bytes()
        );
    }

    Ok(report)
}

fn copy_if_changed(src: &Path, dst: &Path) -> OcrResult<FileAction> {
    let src_size = std::fs::metadata(src)?.len();
    if let Ok(meta) = std::fs::metadata(dst) {
        if meta.len() == src_size {
            return Ok(FileAction::Skipped);
        }
    }

    let bytes = std::fs::copy(src, dst)?;
    Ok(FileAction::Copied { bytes })
}

/// Size listing for one model directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub name: &'static str,
    pub dir: PathBuf,
    pub exists: bool,
    /// Each required file with its size, `None` when missing
    pub files: Vec<(String, Option<u64>)>,
}

impl ModelInfo {
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().filter_map(|(_, size)| *size).sum()
    }
}

/// Describe the models under `root` without modifying anything
pub fn model_info(root: &Path) -> Vec<ModelInfo> {
    ModelKind::ALL
        .iter()
        .map(|kind| {
            let dir = root.join(kind.dir_name());
            let exists = dir.is_dir();
            let files = REQUIRED_MODEL_FILES
                .iter()
                .map(|name| {
                    let size = std::fs::metadata(dir.join(name)).ok().map(|m| m.len());
                    (name.to_string(), size)
                })
                .collect();

            ModelInfo {
                name: kind.dir_name(),
                dir,
                exists,
                files,
            }
        })
        .collect()
}

/// Make the bundled models `names` usable from `user_dir`.
///
/// Nothing is copied when every model is already complete there.
pub fn stage_models(bundle: &Path, user_dir: &Path, names: &[&str]) -> OcrResult<PathBuf> {
    let staged = names
        .iter()
        .all(|name| verify_model_files(&user_dir.join(name)).complete);
    if staged {
        debug!("Models already staged in {:?}", user_dir);
        return Ok(user_dir.to_path_buf());
    }

    info!("Staging bundled models from {:?} into {:?}", bundle, user_dir);
    let report = prepare_models_named(bundle, user_dir, names)?;
    if let Some(missing) = report.models.iter().find(|m| !m.check.complete) {
        return Err(OcrError::ModelDirMissing(missing.source.clone()));
    }

    Ok(user_dir.to_path_buf())
}

/// `1,234,567` style grouping for byte counts
pub fn format_bytes(bytes: u64) -> String {
    let digits = bytes.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::models::{CONFIG_FILE, MODEL_FILE};
    use tempfile::TempDir;

    fn write_model(root: &Path, kind: ModelKind, files: &[(&str, &str)]) {
        let dir = root.join(kind.dir_name());
        std::fs::create_dir_all(&dir).unwrap();
        for (name, contents) in files {
            std::fs::write(dir.join(name), contents).unwrap();
        }
    }

    fn complete_source() -> TempDir {
        let temp = TempDir::new().unwrap();
        for kind in ModelKind::ALL {
            write_model(
                temp.path(),
                kind,
                &[(MODEL_FILE, "onnx-graph-bytes"), (CONFIG_FILE, "PostProcess: {}")],
            );
        }
        temp
    }

    #[test]
    fn test_prepare_copies_complete_models() {
        let source = complete_source();
        let target = TempDir::new().unwrap();

        let report = prepare_assets(source.path(), target.path()).unwrap();

        assert!(report.is_success());
        assert_eq!(report.copied_files(), 4);
        for kind in ModelKind::ALL {
            assert!(verify_model_files(&target.path().join(kind.dir_name())).complete);
        }
        let manifest = ModelManifest::load(target.path()).unwrap();
        assert_eq!(manifest.models.len(), 4);
    }

    #[test]
    fn test_second_run_copies_nothing() {
        let source = complete_source();
        let target = TempDir::new().unwrap();

        prepare_assets(source.path(), target.path()).unwrap();
        let second = prepare_assets(source.path(), target.path()).unwrap();

        assert!(second.is_success());
        assert_eq!(second.copied_bytes(), 0);
        assert_eq!(second.copied_files(), 0);
        assert!(second
            .models
            .iter()
            .flat_map(|m| &m.files)
            .all(|(_, action)| *action == FileAction::Skipped));
    }

    #[test]
    fn test_changed_size_is_recopied() {
        let source = complete_source();
        let target = TempDir::new().unwrap();
        prepare_assets(source.path(), target.path()).unwrap();

        write_model(
            source.path(),
            ModelKind::Recognition,
            &[(MODEL_FILE, "a longer onnx graph than before")],
        );
        let report = prepare_assets(source.path(), target.path()).unwrap();

        assert_eq!(report.copied_files(), 1);
        assert_eq!(report.copied_bytes(), "a longer onnx graph than before".len() as u64);
    }

    #[test]
    fn test_incomplete_model_reported_and_not_copied() {
        let source = TempDir::new().unwrap();
        write_model(
            source.path(),
            ModelKind::Detection,
            &[(MODEL_FILE, "g"), (CONFIG_FILE, "c")],
        );
        write_model(source.path(), ModelKind::Recognition, &[(CONFIG_FILE, "c")]);
        let target = TempDir::new().unwrap();

        let report = prepare_assets(source.path(), target.path()).unwrap();

        assert!(!report.is_success());
        assert!(report.manifest.is_none());
        let rec = report
            .models
            .iter()
            .find(|m| m.name == ModelKind::Recognition.dir_name())
            .unwrap();
        assert_eq!(rec.check.missing, vec![MODEL_FILE.to_string()]);
        assert!(!target.path().join(ModelKind::Recognition.dir_name()).exists());
        // The complete model is still copied
        assert!(target
            .path()
            .join(ModelKind::Detection.dir_name())
            .join(MODEL_FILE)
            .exists());
    }

    #[test]
    fn test_model_info_sizes() {
        let source = TempDir::new().unwrap();
        write_model(source.path(), ModelKind::Detection, &[(MODEL_FILE, "12345")]);

        let info = model_info(source.path());

        assert_eq!(info.len(), 2);
        assert!(info[0].exists);
        assert_eq!(info[0].files[0], (MODEL_FILE.to_string(), Some(5)));
        assert_eq!(info[0].files[1], (CONFIG_FILE.to_string(), None));
        assert_eq!(info[0].total_bytes(), 5);
        assert!(!info[1].exists);
    }

    #[test]
    fn test_stage_models() {
        let bundle = complete_source();
        let user = TempDir::new().unwrap();
        let user_models = user.path().join("models");

        let names = ModelKind::ALL.map(|kind| kind.dir_name());

        let staged = stage_models(bundle.path(), &user_models, &names).unwrap();
        assert_eq!(staged, user_models);
        assert!(verify_model_files(&user_models.join(ModelKind::Detection.dir_name())).complete);

        // Already staged: bundle no longer needed
        let staged_again =
            stage_models(Path::new("/nonexistent/bundle"), &user_models, &names).unwrap();
        assert_eq!(staged_again, user_models);
    }

    #[test]
    fn test_stage_models_custom_names() {
        let bundle = TempDir::new().unwrap();
        for name in ["det_v2", "rec_v2"] {
            let dir = bundle.path().join(name);
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join(MODEL_FILE), "g").unwrap();
            std::fs::write(dir.join(CONFIG_FILE), "c").unwrap();
        }
        let user = TempDir::new().unwrap();

        stage_models(bundle.path(), user.path(), &["det_v2", "rec_v2"]).unwrap();

        assert!(verify_model_files(&user.path().join("det_v2")).complete);
        assert!(verify_model_files(&user.path().join("rec_v2")).complete);
        assert!(!user.path().join(ModelKind::Detection.dir_name()).exists());
        let manifest = ModelManifest::load(user.path()).unwrap();
        assert!(manifest.models.iter().all(|f| f.model.ends_with("_v2")));
    }

    #[test]
    fn test_stage_models_missing_bundle() {
        let user = TempDir::new().unwrap();
        let names = ModelKind::ALL.map(|kind| kind.dir_name());
        let result = stage_models(Path::new("/nonexistent/bundle"), user.path(), &names);
        assert!(matches!(result, Err(OcrError::ModelDirMissing(_))));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0");
        assert_eq!(format_bytes(999), "999");
        assert_eq!(format_bytes(1000), "1,000");
        assert_eq!(format_bytes(4_718_592), "4,718,592");
    }
}
