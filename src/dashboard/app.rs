//! Desktop window

use eframe::egui;
use std::sync::Arc;
use tracing::error;

use crate::app::{paddle_engine_factory, FileKind, OcrController, Presenter, RestartPolicy};
use crate::config::{AppConfig, ModelSettings};
use crate::dashboard::components::{model_cards, CardStatus, StatusCard};
use crate::dashboard::presenter::{preview_uri, UiPresenter};
use crate::dashboard::theme::{self, Layout, ThemeColors};

const TITLE: &str = "PaddleOCR Text Recognition Tool";

/// The desktop OCR application
pub struct DesktopApp {
    controller: OcrController,
    presenter: UiPresenter,
    models: ModelSettings,
    /// Model status, refreshed when a run reports back
    cards: Vec<StatusCard>,
    /// Whether theme has been applied
    theme_applied: bool,
}

impl DesktopApp {
    pub fn new(config: &AppConfig) -> Self {
        let factory = paddle_engine_factory(config.models.clone(), config.engine.clone());
        let controller = OcrController::new(factory, config.output.dir.clone())
            .with_restart_policy(RestartPolicy::Immediate);

        Self {
            controller,
            presenter: UiPresenter::new(config.ui.open_results),
            models: config.models.clone(),
            cards: model_cards(&config.models, false, CardStatus::Missing),
            theme_applied: false,
        }
    }

    /// Get native options for the window
    pub fn options() -> eframe::NativeOptions {
        eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([640.0, 560.0])
                .with_min_inner_size([520.0, 420.0])
                .with_title(TITLE),
            ..Default::default()
        }
    }

    fn render_models(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for card in &self.cards {
                card.show(ui);
            }
        });
    }

    fn render_file_picker(&mut self, ui: &mut egui::Ui) {
        let busy = self.controller.is_processing();
        ui.horizontal(|ui| {
            for (label, kind) in [("Select PDF", FileKind::Pdf), ("Select Image", FileKind::Image)] {
                if ui.add_enabled(!busy, egui::Button::new(label)).clicked() {
                    self.controller.choose_file(&mut self.presenter, kind);
                }
            }
        });

        let selected = match self.controller.selected_file() {
            Some(path) => egui::RichText::new(format!("Selected: {}", path.display()))
                .color(ThemeColors::TEXT_SELECTED),
            None => egui::RichText::new("No file selected").color(ThemeColors::TEXT_MUTED),
        };
        ui.label(selected);
    }

    fn render_run(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            let start = theme::start_button("Start Recognition", Layout::Regular);
            if ui.add_enabled(self.controller.can_start(), start).clicked() {
                if let Err(e) = self.controller.start() {
                    error!("Could not start recognition: {:#}", e);
                    self.presenter.show_error(&e.to_string());
                }
            }

            if self.controller.is_processing() {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(
                        egui::RichText::new(&self.presenter.status)
                            .color(ThemeColors::ACCENT_PRIMARY),
                    );
                });
            }
        });
    }

    fn render_preview(&self, ui: &mut egui::Ui) {
        let Some(path) = &self.presenter.preview else {
            return;
        };

        ui.separator();
        ui.label(egui::RichText::new("Last result").color(ThemeColors::TEXT_SECONDARY));
        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.add(
                egui::Image::new(preview_uri(path))
                    .max_width(ui.available_width())
                    .maintain_aspect_ratio(true),
            );
        });
    }
}

impl eframe::App for DesktopApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply theme once
        if !self.theme_applied {
            theme::apply_theme(ctx, Layout::Regular);
            self.theme_applied = true;
        }

        if self.controller.poll(&mut self.presenter) {
            self.cards = model_cards(
                &self.models,
                self.controller.is_engine_loaded(),
                CardStatus::Missing,
            );
        }
        // The result image is rewritten in place by every run
        if let Some(uri) = self.presenter.take_stale_preview() {
            ctx.forget_image(&uri);
        }

        egui::CentralPanel::default()
            .frame(
                egui::Frame::none()
                    .fill(ThemeColors::BG_PAGE)
                    .inner_margin(24.0),
            )
            .show(ctx, |ui| {
                ui.heading(TITLE);
                ui.add_space(12.0);

                self.render_models(ui);
                ui.add_space(12.0);

                self.render_file_picker(ui);
                ui.add_space(16.0);

                self.render_run(ui);
                ui.add_space(8.0);

                ui.label(
                    egui::RichText::new("Supported formats: PDF, JPG, PNG, BMP")
                        .small()
                        .color(ThemeColors::TEXT_MUTED),
                );

                self.render_preview(ui);
            });

        self.presenter.show_dialog(ctx);
    }
}

/// Run the desktop window until it is closed
pub fn run_desktop(config: &AppConfig) -> Result<(), eframe::Error> {
    let mut app = DesktopApp::new(config);
    eframe::run_native(
        TITLE,
        DesktopApp::options(),
        Box::new(move |cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            let ctx = cc.egui_ctx.clone();
            app.controller
                .set_waker(Arc::new(move || ctx.request_repaint()));
            Ok(Box::new(app))
        }),
    )
}
