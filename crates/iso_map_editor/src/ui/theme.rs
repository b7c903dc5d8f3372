//! Editor theme and styling for egui
//!
//! A flat dark theme with a moss-green accent, picked to match the viewport
//! overlays (hover outline and pointer dot) drawn by the render module.

use bevy_egui::egui::{self, Color32, CornerRadius, Stroke, Visuals};

pub struct EditorTheme;

impl EditorTheme {
    // -------------------------------------------------------------------------------
    // Background Colors
    // -------------------------------------------------------------------------------

    /// Window and modal background
    pub const BG_WINDOW: Color32 = Color32::from_rgb(28, 34, 30);

    /// Side/top panel background
    pub const BG_PANEL: Color32 = Color32::from_rgb(35, 48, 39);

    /// Widget background
    pub const BG_WIDGET: Color32 = Color32::from_rgb(52, 66, 56);

    /// Hovered widget background
    pub const BG_HOVER: Color32 = Color32::from_rgb(66, 84, 71);

    pub const BORDER_WIDGET: Color32 = Color32::from_rgb(45, 70, 53);

    // -------------------------------------------------------------------------------
    // Accent / Text
    // -------------------------------------------------------------------------------

    /// Hover outline green, also used for selection
    pub const ACCENT: Color32 = Color32::from_rgb(112, 214, 123);

    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(246, 250, 239);

    pub const TEXT_MUTED: Color32 = Color32::from_rgb(170, 182, 168);

    pub const ERROR: Color32 = Color32::from_rgb(224, 112, 112);

    /// Apply the editor theme to the egui context.
    pub fn apply(ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();
        let mut visuals = Visuals::dark();

        visuals.window_fill = Self::BG_WINDOW;
        visuals.panel_fill = Self::BG_PANEL;
        visuals.faint_bg_color = Self::BG_WINDOW;
        visuals.extreme_bg_color = Self::BG_WINDOW;
        visuals.popup_shadow = egui::Shadow::NONE;
        visuals.window_shadow = egui::Shadow::NONE;

        visuals.widgets.noninteractive.bg_fill = Self::BG_WIDGET;
        visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, Self::TEXT_MUTED);
        visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, Self::BORDER_WIDGET);

        visuals.widgets.inactive.bg_fill = Self::BG_WIDGET;
        visuals.widgets.inactive.weak_bg_fill = Self::BG_WIDGET;
        visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, Self::TEXT_PRIMARY);
        visuals.widgets.inactive.corner_radius = CornerRadius::same(4);

        visuals.widgets.hovered.bg_fill = Self::BG_HOVER;
        visuals.widgets.hovered.weak_bg_fill = Self::BG_HOVER;
        visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, Self::TEXT_PRIMARY);
        visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, Self::ACCENT);
        visuals.widgets.hovered.corner_radius = CornerRadius::same(4);

        visuals.widgets.active.bg_fill = Self::ACCENT;
        visuals.widgets.active.weak_bg_fill = Self::ACCENT;
        visuals.widgets.active.fg_stroke = Stroke::new(1.5, Self::BG_PANEL);
        visuals.widgets.active.corner_radius = CornerRadius::same(4);

        visuals.selection.bg_fill = Self::BORDER_WIDGET;
        visuals.selection.stroke = Stroke::new(1.0, Self::ACCENT);

        visuals.window_corner_radius = CornerRadius::same(6);
        visuals.error_fg_color = Self::ERROR;

        style.spacing.item_spacing = egui::vec2(4.0, 4.0);
        style.spacing.button_padding = egui::vec2(6.0, 3.0);

        style.visuals = visuals;
        ctx.set_style(style);
    }
}
