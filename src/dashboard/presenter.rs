//! Presenter shared by the desktop and mobile windows
//!
//! Holds what the window should display between frames: the status line, the
//! progress fraction, the pending popup and the annotated image to preview.

use std::path::{Path, PathBuf};
use tracing::debug;

use super::launch;
use super::theme::ThemeColors;
use crate::app::{FileKind, Presenter};
use crate::processor::{Progress, RunOutput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Info,
    Error,
}

/// Popup waiting to be acknowledged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub kind: DialogKind,
    pub title: String,
    pub message: String,
}

/// Image loader URI for a result file on disk
pub fn preview_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

pub struct UiPresenter {
    pub status: String,
    /// Determinate progress, 0.0..=1.0
    pub fraction: f32,
    pub dialog: Option<Dialog>,
    /// Annotated image of the first page of the last run
    pub preview: Option<PathBuf>,
    /// Set when a run finished, since the preview file may have been rewritten
    /// under an unchanged path
    preview_stale: bool,
    /// Open the results once the completion popup is dismissed
    open_results: bool,
    pending_open: Option<PathBuf>,
}

impl UiPresenter {
    pub fn new(open_results: bool) -> Self {
        Self {
            status: String::new(),
            fraction: 0.0,
            dialog: None,
            preview: None,
            preview_stale: false,
            open_results,
            pending_open: None,
        }
    }

    /// URI whose cached texture must be dropped before the preview is drawn again.
    /// Returns `None` until the next run finishes.
    pub fn take_stale_preview(&mut self) -> Option<String> {
        if !std::mem::take(&mut self.preview_stale) {
            return None;
        }
        self.preview.as_deref().map(preview_uri)
    }

    /// Close the popup and run whatever was waiting on it
    pub fn dismiss_dialog(&mut self) {
        self.dialog = None;
        if let Some(dir) = self.pending_open.take() {
            launch::open_results(&dir);
        }
    }

    /// Draw the pending popup, if any
    pub fn show_dialog(&mut self, ctx: &egui::Context) {
        let Some(dialog) = &self.dialog else {
            return;
        };

        let color = match dialog.kind {
            DialogKind::Info => ThemeColors::TEXT_PRIMARY,
            DialogKind::Error => ThemeColors::ACCENT_ERROR,
        };
        let mut dismissed = false;

        egui::Window::new(dialog.title.as_str())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(egui::RichText::new(dialog.message.as_str()).color(color));
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
            });

        if dismissed {
            self.dismiss_dialog();
        }
    }
}

impl Presenter for UiPresenter {
    fn select_file(&mut self, kind: FileKind) -> Option<PathBuf> {
        let title = match kind {
            FileKind::Pdf => "Select a PDF file",
            FileKind::Image => "Select an image file",
        };
        rfd::FileDialog::new()
            .set_title(title)
            .add_filter(kind.filter_name(), kind.extensions())
            .add_filter("All files", &["*"])
            .pick_file()
    }

    fn show_progress(&mut self, progress: &Progress) {
        self.status = progress.to_string();
        self.fraction = progress.fraction();
    }

    fn show_result(&mut self, output: &RunOutput) {
        self.status.clear();
        self.fraction = 1.0;
        self.preview = output
            .first_result_dir
            .as_deref()
            .and_then(|dir| launch::find_result_files(dir).0);
        self.preview_stale = true;
        debug!("Preview image: {:?}", self.preview);

        if self.open_results {
            self.pending_open = output.first_result_dir.clone();
        }
        self.dialog = Some(Dialog {
            kind: DialogKind::Info,
            title: "Done".to_string(),
            message: output.summary(),
        });
    }

    fn show_error(&mut self, message: &str) {
        self.status.clear();
        self.fraction = 0.0;
        self.pending_open = None;
        self.dialog = Some(Dialog {
            kind: DialogKind::Error,
            title: "Error".to_string(),
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::PageResult;
    use tempfile::TempDir;

    fn finished_run(dir: &std::path::Path) -> RunOutput {
        let page_dir = dir.join("page_001_result");
        std::fs::create_dir_all(&page_dir).unwrap();
        std::fs::write(page_dir.join("scan_ocr_res_img.png"), "png").unwrap();

        RunOutput {
            first_result_dir: Some(page_dir.clone()),
            all_text: vec!["hello".to_string()],
            pages: vec![PageResult {
                page_number: 1,
                lines: vec!["hello".to_string()],
                output_dir: page_dir,
            }],
        }
    }

    #[test]
    fn test_progress_updates_status() {
        let mut presenter = UiPresenter::new(false);
        presenter.show_progress(&Progress::Page {
            number: 1,
            total: Some(2),
        });

        assert_eq!(presenter.status, "Processing page 1/2...");
        assert!(presenter.fraction > 0.5);
    }

    #[test]
    fn test_result_sets_dialog_and_preview() {
        let temp = TempDir::new().unwrap();
        let output = finished_run(temp.path());
        let mut presenter = UiPresenter::new(false);

        presenter.show_result(&output);

        let dialog = presenter.dialog.clone().unwrap();
        assert_eq!(dialog.kind, DialogKind::Info);
        assert!(dialog.message.contains("Recognized 1 lines of text"));
        assert_eq!(
            presenter.preview,
            Some(temp.path().join("page_001_result").join("scan_ocr_res_img.png"))
        );
        assert_eq!(presenter.fraction, 1.0);

        presenter.dismiss_dialog();
        assert!(presenter.dialog.is_none());
    }

    #[test]
    fn test_rerun_marks_same_preview_stale() {
        let temp = TempDir::new().unwrap();
        let output = finished_run(temp.path());
        let mut presenter = UiPresenter::new(false);
        assert_eq!(presenter.take_stale_preview(), None);

        presenter.show_result(&output);
        let uri = presenter.take_stale_preview().unwrap();
        assert!(uri.starts_with("file://"));
        assert!(uri.ends_with("scan_ocr_res_img.png"));
        // Only once per run
        assert_eq!(presenter.take_stale_preview(), None);

        // A second run over the same file writes to the same path
        presenter.show_result(&output);
        assert_eq!(presenter.take_stale_preview(), Some(uri));
    }

    #[test]
    fn test_error_clears_pending_open() {
        let temp = TempDir::new().unwrap();
        let mut presenter = UiPresenter::new(true);
        presenter.show_result(&finished_run(temp.path()));
        assert!(presenter.pending_open.is_some());

        presenter.show_error("Recognition failed: bad page");

        assert!(presenter.pending_open.is_none());
        assert_eq!(presenter.dialog.unwrap().kind, DialogKind::Error);
    }
}
