//! Dashboard theme and styling
//!
//! Light document-tool theme shared by the desktop and mobile windows.

use egui::{Color32, FontFamily, FontId, Rounding, Stroke, TextStyle, Visuals};

/// Color palette
pub struct ThemeColors;

impl ThemeColors {
    // Background colors
    pub const BG_PAGE: Color32 = Color32::from_rgb(246, 247, 249);
    pub const BG_CARD: Color32 = Color32::from_rgb(255, 255, 255);
    pub const BG_WIDGET: Color32 = Color32::from_rgb(232, 235, 240);
    pub const BG_HOVER: Color32 = Color32::from_rgb(218, 223, 230);

    // Accent colors
    pub const ACCENT_PRIMARY: Color32 = Color32::from_rgb(33, 110, 214);
    pub const ACCENT_START: Color32 = Color32::from_rgb(76, 175, 80);
    pub const ACCENT_WARNING: Color32 = Color32::from_rgb(230, 162, 0);
    pub const ACCENT_ERROR: Color32 = Color32::from_rgb(211, 47, 47);

    // Text colors
    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(28, 30, 34);
    pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(90, 96, 106);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(140, 146, 156);
    pub const TEXT_SELECTED: Color32 = Color32::from_rgb(25, 90, 190);

    pub const BORDER: Color32 = Color32::from_rgb(210, 214, 220);
}

/// Window layout the theme is tuned for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Desktop window
    Regular,
    /// Narrow portrait window with touch-sized controls
    Compact,
}

impl Layout {
    fn scale(&self) -> f32 {
        match self {
            Layout::Regular => 1.0,
            Layout::Compact => 1.25,
        }
    }
}

/// Apply the theme to egui
pub fn apply_theme(ctx: &egui::Context, layout: Layout) {
    let mut style = (*ctx.style()).clone();
    let mut visuals = Visuals::light();

    visuals.window_fill = ThemeColors::BG_CARD;
    visuals.panel_fill = ThemeColors::BG_PAGE;
    visuals.faint_bg_color = ThemeColors::BG_WIDGET;
    visuals.extreme_bg_color = ThemeColors::BG_CARD;

    let rounding = Rounding::same(6.0);
    for widget in [
        &mut visuals.widgets.noninteractive,
        &mut visuals.widgets.inactive,
        &mut visuals.widgets.hovered,
        &mut visuals.widgets.active,
        &mut visuals.widgets.open,
    ] {
        widget.rounding = rounding;
        widget.fg_stroke = Stroke::new(1.0, ThemeColors::TEXT_PRIMARY);
    }
    visuals.widgets.noninteractive.bg_fill = ThemeColors::BG_CARD;
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, ThemeColors::TEXT_SECONDARY);
    visuals.widgets.inactive.bg_fill = ThemeColors::BG_WIDGET;
    visuals.widgets.inactive.weak_bg_fill = ThemeColors::BG_WIDGET;
    visuals.widgets.hovered.bg_fill = ThemeColors::BG_HOVER;
    visuals.widgets.hovered.weak_bg_fill = ThemeColors::BG_HOVER;
    visuals.widgets.active.bg_fill = ThemeColors::ACCENT_PRIMARY;

    visuals.selection.bg_fill = color_with_alpha(ThemeColors::ACCENT_PRIMARY, 60);
    visuals.selection.stroke = Stroke::new(1.0, ThemeColors::ACCENT_PRIMARY);
    visuals.hyperlink_color = ThemeColors::ACCENT_PRIMARY;

    visuals.window_rounding = Rounding::same(8.0);
    visuals.window_stroke = Stroke::new(1.0, ThemeColors::BORDER);

    style.visuals = visuals;

    let scale = layout.scale();
    style.spacing.item_spacing = egui::vec2(8.0, 8.0 * scale);
    style.spacing.button_padding = egui::vec2(14.0 * scale, 8.0 * scale);
    style.spacing.window_margin = egui::Margin::same(16.0);

    style.text_styles = [
        (TextStyle::Small, FontId::new(12.0 * scale, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(14.0 * scale, FontFamily::Proportional)),
        (TextStyle::Monospace, FontId::new(13.0 * scale, FontFamily::Monospace)),
        (TextStyle::Button, FontId::new(15.0 * scale, FontFamily::Proportional)),
        (TextStyle::Heading, FontId::new(22.0 * scale, FontFamily::Proportional)),
    ]
    .into();

    ctx.set_style(style);
}

/// Helper to create a color with modified alpha
pub fn color_with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

/// Large filled button used for the start action
pub fn start_button(text: &str, layout: Layout) -> egui::Button<'static> {
    let scale = layout.scale();
    egui::Button::new(
        egui::RichText::new(text.to_string())
            .size(16.0 * scale)
            .strong()
            .color(Color32::WHITE),
    )
    .fill(ThemeColors::ACCENT_START)
    .min_size(egui::vec2(160.0 * scale, 44.0 * scale))
}
