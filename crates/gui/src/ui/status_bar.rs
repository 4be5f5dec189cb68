use egui::Ui;

use crate::state::{AppState, LoadStatus};

pub fn show(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui| {
        let preview = &state.preview;
        ui.weak(format!("Panels: {}", preview.scene().panels.len()));

        ui.separator();

        ui.label(format!(
            "{} · {:.0}%",
            preview.mode().label(),
            preview.progress() * 100.0
        ));

        if let Some(key) = &state.hovered {
            ui.separator();
            let label = preview
                .scene()
                .panel(key)
                .map(|panel| panel.label.as_str())
                .unwrap_or(key.as_str());
            ui.label(label);
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            match preview.status() {
                LoadStatus::Idle => {
                    ui.weak("Idle");
                }
                LoadStatus::Loading => {
                    ui.spinner();
                    ui.weak("Loading geometry…");
                }
                LoadStatus::Ready => {
                    ui.weak(state.loader.description());
                }
                LoadStatus::Failed(error) => {
                    ui.colored_label(egui::Color32::from_rgb(180, 60, 50), format!("Load failed: {error}"));
                }
            }
        });
    });
}
