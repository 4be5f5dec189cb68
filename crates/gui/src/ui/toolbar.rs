//! Toolbar: fold toggle, camera framing, catalog picker

use egui::Ui;
use shared::catalog;

use crate::state::{AppState, PreviewMessage, ViewMode};

// ── Public actions (callable from menus too) ─────────────────

pub fn action_toggle(state: &mut AppState) {
    state.preview.send(PreviewMessage::Toggle);
}

pub fn action_set_mode(state: &mut AppState, mode: ViewMode) {
    state.preview.send(PreviewMessage::SetMode(mode));
}

pub fn action_frame(state: &mut AppState) {
    state.preview.send(PreviewMessage::ResetCamera);
}

pub fn show(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        // ── Mode ──
        let mode = state.preview.mode();
        for candidate in [ViewMode::Flat, ViewMode::Assembled] {
            if ui
                .selectable_label(mode == candidate, candidate.label())
                .on_hover_text("Space toggles")
                .clicked()
                && mode != candidate
            {
                action_set_mode(state, candidate);
            }
        }

        ui.separator();

        if ui.button("Frame").on_hover_text("Fit the camera (F)").clicked() {
            action_frame(state);
        }
        if ui.button("Reload").on_hover_text("Request geometry again (R)").clicked() {
            state.loader.request();
        }

        ui.separator();

        // ── Catalog picker (local sources only) ──
        if let Some(current) = state.loader.definition() {
            let current_key = current.key.clone();
            let current_name = current.name.clone();
            egui::ComboBox::from_id_salt("assembly_combo")
                .selected_text(current_name)
                .show_ui(ui, |ui| {
                    for definition in catalog::default_assemblies() {
                        let selected = definition.key == current_key;
                        if ui
                            .selectable_label(selected, definition.name.as_str())
                            .clicked()
                            && !selected
                        {
                            state.loader.set_definition(definition);
                        }
                    }
                });
        } else {
            ui.weak(state.loader.description());
        }
    });
}
