//! Card showing whether a model is ready for use

use crate::config::ModelSettings;
use crate::dashboard::theme::ThemeColors;
use crate::vision::models::{verify_model_files, ModelKind};
use egui::{Color32, RichText, Rounding, Vec2};
use std::path::Path;

/// A card displaying one model and its state
pub struct StatusCard {
    pub title: String,
    pub value: String,
    pub status: CardStatus,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CardStatus {
    /// Files on disk, engine not loaded yet
    Found,
    /// Engine loaded in this window
    Loaded,
    /// Not on disk; may be staged on first run
    Pending,
    Missing,
}

impl CardStatus {
    pub fn color(&self) -> Color32 {
        match self {
            CardStatus::Found => ThemeColors::ACCENT_PRIMARY,
            CardStatus::Loaded => ThemeColors::ACCENT_START,
            CardStatus::Pending => ThemeColors::ACCENT_WARNING,
            CardStatus::Missing => ThemeColors::ACCENT_ERROR,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CardStatus::Found => "Found",
            CardStatus::Loaded => "Loaded",
            CardStatus::Pending => "Will be prepared on first run",
            CardStatus::Missing => "Missing",
        }
    }
}

/// Detection and recognition cards, checked against the disk once.
///
/// Windows keep the result and rebuild it when a run reports back rather than
/// on every frame.
pub fn model_cards(models: &ModelSettings, loaded: bool, missing: CardStatus) -> Vec<StatusCard> {
    [
        (ModelKind::Detection, models.detection_dir()),
        (ModelKind::Recognition, models.recognition_dir()),
    ]
    .into_iter()
    .map(|(kind, dir)| StatusCard::for_model(kind, &dir, loaded, missing))
    .collect()
}

impl StatusCard {
    pub fn new(title: impl Into<String>, value: impl Into<String>, status: CardStatus) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            status,
        }
    }

    /// Card for the model of `kind` stored in `dir`
    pub fn for_model(kind: ModelKind, dir: &Path, loaded: bool, missing: CardStatus) -> Self {
        let status = if loaded {
            CardStatus::Loaded
        } else if verify_model_files(dir).complete {
            CardStatus::Found
        } else {
            missing
        };
        let value = dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());

        Self::new(kind.display_name(), value, status)
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        egui::Frame::none()
            .fill(ThemeColors::BG_CARD)
            .stroke(egui::Stroke::new(1.0, ThemeColors::BORDER))
            .rounding(Rounding::same(8.0))
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_min_width(200.0);

                ui.horizontal(|ui| {
                    let dot_center = ui.cursor().left_top() + Vec2::new(6.0, 10.0);
                    ui.painter()
                        .circle_filled(dot_center, 4.0, self.status.color());
                    ui.add_space(16.0);

                    ui.vertical(|ui| {
                        ui.label(
                            RichText::new(&self.title)
                                .size(12.0)
                                .color(ThemeColors::TEXT_MUTED),
                        );
                        ui.label(
                            RichText::new(&self.value)
                                .size(15.0)
                                .color(ThemeColors::TEXT_PRIMARY)
                                .strong(),
                        );
                        ui.label(
                            RichText::new(self.status.label())
                                .size(11.0)
                                .color(self.status.color()),
                        );
                    });
                });
            });
    }
}
