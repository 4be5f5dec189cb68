//! Keyboard shortcut handling

use eframe::egui;

use crate::state::AppState;
use crate::ui::toolbar;

/// Handle keyboard shortcuts for the application
pub fn handle_keyboard(ctx: &egui::Context, state: &mut AppState) {
    // Don't handle shortcuts when a text field is focused
    if ctx.memory(|m| m.focused().is_some()) {
        return;
    }

    ctx.input(|i| {
        // Space: fold / unfold
        if i.key_pressed(egui::Key::Space) {
            toolbar::action_toggle(state);
        }
        // F: frame the current mode
        if i.key_pressed(egui::Key::F) && !i.modifiers.command {
            toolbar::action_frame(state);
        }
        // R: reload geometry
        if i.key_pressed(egui::Key::R) && !i.modifiers.command {
            state.loader.request();
        }
        // Ctrl+,: settings
        if i.modifiers.command && i.key_pressed(egui::Key::Comma) {
            state.show_settings_window = true;
        }
    });
}
