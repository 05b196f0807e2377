use eframe::egui;
use eframe::egui::Color32;

use crate::state::ThemeMode;

// Brand colors shared by both themes
pub const PRIMARY: Color32 = Color32::from_rgb(99, 102, 241); // Indigo
pub const SUCCESS: Color32 = Color32::from_rgb(34, 197, 94); // Confirmed / active
pub const WARNING: Color32 = Color32::from_rgb(250, 168, 26); // Expiring / pending
pub const DANGER: Color32 = Color32::from_rgb(239, 68, 68); // Errors / declined

pub const TEXT_MUTED_DARK: Color32 = Color32::from_rgb(148, 152, 161);
pub const TEXT_MUTED_LIGHT: Color32 = Color32::from_rgb(107, 114, 128);

pub const AVATAR_BG: Color32 = Color32::from_rgb(79, 70, 229);

/// Secondary text color for the active theme
pub fn text_muted(mode: ThemeMode) -> Color32 {
    match mode {
        ThemeMode::Dark => TEXT_MUTED_DARK,
        ThemeMode::Light => TEXT_MUTED_LIGHT,
    }
}

/// Apply the theme to the whole context
pub fn apply(ctx: &egui::Context, mode: ThemeMode) {
    let mut visuals = match mode {
        ThemeMode::Dark => egui::Visuals::dark(),
        ThemeMode::Light => egui::Visuals::light(),
    };
    visuals.selection.bg_fill = PRIMARY;
    visuals.hyperlink_color = PRIMARY;
    ctx.set_visuals(visuals);
}
