//! Mobile window
//!
//! Portrait layout with touch-sized controls. Models are staged from the bundled
//! copy into per-user storage the first time recognition runs, and results are
//! written to the per-user output folder.

use anyhow::{Context, Result};
use eframe::egui;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

use crate::app::{EngineFactory, FileKind, OcrController, Presenter, RestartPolicy};
use crate::assets::stage_models;
use crate::config::{AppConfig, ModelSettings};
use crate::dashboard::components::{model_cards, CardStatus, StatusCard};
use crate::dashboard::presenter::UiPresenter;
use crate::dashboard::theme::{self, Layout, ThemeColors};
use crate::storage;
use crate::vision::{init_ocr_model, EngineOptions, ModelPaths, OcrEngine};

const TITLE: &str = "PaddleOCR Mobile";

/// Models in `models.root` when present, otherwise the copy of `models.bundle`
/// staged into `staged_dir`
pub fn resolve_model_paths(models: &ModelSettings, staged_dir: &Path) -> Result<ModelPaths> {
    if models.detection_dir().is_dir() && models.recognition_dir().is_dir() {
        return Ok(ModelPaths::new(models.detection_dir(), models.recognition_dir())?);
    }

    let staged = stage_models(&models.bundle, staged_dir, &models.dir_names())
        .with_context(|| format!("Could not prepare models from {}", models.bundle.display()))?;
    Ok(ModelPaths::new(
        staged.join(&models.detection),
        staged.join(&models.recognition),
    )?)
}

/// Engine factory that stages models into per-user storage before loading them
pub fn mobile_engine_factory(models: ModelSettings, options: EngineOptions) -> EngineFactory {
    Arc::new(move || -> Result<Arc<dyn OcrEngine>> {
        let staged_dir = storage::get_staged_models_dir()?;
        let paths = resolve_model_paths(&models, &staged_dir)?;
        info!("Loading models from {:?}", paths.detection_dir());
        let engine = init_ocr_model(&paths, &options)?;
        Ok(Arc::new(engine) as Arc<dyn OcrEngine>)
    })
}

/// The mobile OCR application
pub struct MobileApp {
    controller: OcrController,
    presenter: UiPresenter,
    models: ModelSettings,
    /// Model status, refreshed when a run reports back
    cards: Vec<StatusCard>,
    theme_applied: bool,
}

impl MobileApp {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let output_dir = storage::get_user_output_dir()?;
        let factory = mobile_engine_factory(config.models.clone(), config.engine.clone());
        let controller = OcrController::new(factory, output_dir)
            .with_restart_policy(RestartPolicy::AfterNewSelection);

        Ok(Self {
            controller,
            presenter: UiPresenter::new(false),
            models: config.models.clone(),
            cards: model_cards(&config.models, false, CardStatus::Pending),
            theme_applied: false,
        })
    }

    pub fn options() -> eframe::NativeOptions {
        eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([400.0, 720.0])
                .with_min_inner_size([320.0, 560.0])
                .with_title(TITLE),
            ..Default::default()
        }
    }

    fn render_content(&mut self, ui: &mut egui::Ui) {
        let busy = self.controller.is_processing();
        let full_width = egui::vec2(ui.available_width(), 48.0);

        ui.vertical_centered(|ui| {
            ui.heading(TITLE);
        });
        ui.add_space(12.0);

        for card in &self.cards {
            card.show(ui);
        }
        ui.add_space(12.0);

        for (label, kind) in [("Select PDF", FileKind::Pdf), ("Select Image", FileKind::Image)] {
            let button = egui::Button::new(label).min_size(full_width);
            if ui.add_enabled(!busy, button).clicked() {
                self.controller.choose_file(&mut self.presenter, kind);
            }
        }

        let selected = match self.controller.selected_file() {
            Some(path) => egui::RichText::new(format!(
                "Selected: {}",
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string())
            ))
            .color(ThemeColors::TEXT_SELECTED),
            None => egui::RichText::new("No file selected").color(ThemeColors::TEXT_MUTED),
        };
        ui.label(selected);
        ui.add_space(16.0);

        ui.vertical_centered(|ui| {
            let start = theme::start_button("Start Recognition", Layout::Compact)
                .min_size(full_width);
            if ui.add_enabled(self.controller.can_start(), start).clicked() {
                if let Err(e) = self.controller.start() {
                    error!("Could not start recognition: {:#}", e);
                    self.presenter.show_error(&e.to_string());
                }
            }
        });

        if busy || self.presenter.fraction > 0.0 {
            ui.add_space(8.0);
            ui.add(egui::ProgressBar::new(self.presenter.fraction).show_percentage());
        }
        if !self.presenter.status.is_empty() {
            ui.label(
                egui::RichText::new(&self.presenter.status).color(ThemeColors::ACCENT_PRIMARY),
            );
        }
    }
}

impl eframe::App for MobileApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.theme_applied {
            theme::apply_theme(ctx, Layout::Compact);
            self.theme_applied = true;
        }

        if self.controller.poll(&mut self.presenter) {
            self.cards = model_cards(
                &self.models,
                self.controller.is_engine_loaded(),
                CardStatus::Pending,
            );
        }

        egui::CentralPanel::default()
            .frame(
                egui::Frame::none()
                    .fill(ThemeColors::BG_PAGE)
                    .inner_margin(16.0),
            )
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| self.render_content(ui));
            });

        self.presenter.show_dialog(ctx);
    }
}

/// Run the mobile window until it is closed
pub fn run_mobile(config: &AppConfig) -> Result<()> {
    let mut app = MobileApp::new(config)?;
    eframe::run_native(
        TITLE,
        MobileApp::options(),
        Box::new(move |cc| {
            let ctx = cc.egui_ctx.clone();
            app.controller
                .set_waker(Arc::new(move || ctx.request_repaint()));
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Mobile window failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OcrError;
    use crate::vision::models::{CONFIG_FILE, MODEL_FILE};
    use crate::vision::verify_model_files;
    use tempfile::TempDir;

    fn write_models(root: &Path, names: [&str; 2]) {
        for name in names {
            let dir = root.join(name);
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join(MODEL_FILE), "g").unwrap();
            std::fs::write(dir.join(CONFIG_FILE), "c").unwrap();
        }
    }

    #[test]
    fn test_resolve_prefers_existing_models() {
        let temp = TempDir::new().unwrap();
        let models = ModelSettings {
            root: temp.path().to_path_buf(),
            ..Default::default()
        };
        write_models(temp.path(), models.dir_names());
        let staged_dir = temp.path().join("staged");

        let paths = resolve_model_paths(&models, &staged_dir).unwrap();

        assert_eq!(paths.detection_dir(), models.detection_dir().as_path());
        assert_eq!(paths.recognition_dir(), models.recognition_dir().as_path());
        assert!(!staged_dir.exists());
    }

    #[test]
    fn test_resolve_stages_bundle_when_root_absent() {
        let temp = TempDir::new().unwrap();
        let models = ModelSettings {
            root: temp.path().join("testmodel"),
            bundle: temp.path().join("models"),
            ..Default::default()
        };
        write_models(&models.bundle, models.dir_names());
        let staged_dir = temp.path().join("user").join("models");

        let paths = resolve_model_paths(&models, &staged_dir).unwrap();

        assert_eq!(paths.detection_dir(), staged_dir.join(&models.detection).as_path());
        assert_eq!(paths.recognition_dir(), staged_dir.join(&models.recognition).as_path());
        assert!(verify_model_files(paths.detection_dir()).complete);
        assert!(verify_model_files(paths.recognition_dir()).complete);
    }

    #[test]
    fn test_resolve_stages_custom_model_names() {
        let temp = TempDir::new().unwrap();
        let models = ModelSettings {
            root: temp.path().join("testmodel"),
            bundle: temp.path().join("models"),
            detection: "det_server".to_string(),
            recognition: "rec_server".to_string(),
        };
        write_models(&models.bundle, ["det_server", "rec_server"]);
        let staged_dir = temp.path().join("staged");

        let paths = resolve_model_paths(&models, &staged_dir).unwrap();

        assert_eq!(paths.detection_dir(), staged_dir.join("det_server").as_path());
        assert_eq!(paths.recognition_dir(), staged_dir.join("rec_server").as_path());
    }

    #[test]
    fn test_resolve_fails_without_models_or_bundle() {
        let temp = TempDir::new().unwrap();
        let models = ModelSettings {
            root: temp.path().join("testmodel"),
            bundle: temp.path().join("models"),
            ..Default::default()
        };

        let err = resolve_model_paths(&models, &temp.path().join("staged")).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<OcrError>(),
            Some(OcrError::ModelDirMissing(_))
        ));
    }
}
