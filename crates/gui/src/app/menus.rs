//! Application menu bar and settings window

use eframe::egui;
use shared::{catalog, SvgRenderer};

use crate::state::{AppSettings, AppState, ViewMode};
use crate::ui::toolbar;

/// Show the file menu
pub fn file_menu(ui: &mut egui::Ui, state: &mut AppState) {
    ui.menu_button("File", |ui| {
        ui.menu_button("Catalog", |ui| {
            for definition in catalog::default_assemblies() {
                if ui.button(definition.name.as_str()).clicked() {
                    tracing::info!("Switched to catalog assembly '{}'", definition.key);
                    state.loader.set_definition(definition);
                    ui.close_menu();
                }
            }
        });
        if ui.button("Open assembly…").clicked() {
            ui.close_menu();
            if let Some(path) = rfd::FileDialog::new()
                .set_title("Open assembly definition")
                .add_filter("JSON", &["json"])
                .pick_file()
            {
                match crate::load_definition(&path.to_string_lossy()) {
                    Ok(definition) => {
                        tracing::info!("Loaded assembly '{}' from {}", definition.key, path.display());
                        state.loader.set_definition(definition);
                    }
                    Err(e) => tracing::error!("Failed to load assembly: {e}"),
                }
            }
        }
        let can_save = state.loader.definition().is_some();
        if ui
            .add_enabled(can_save, egui::Button::new("Save assembly…"))
            .clicked()
        {
            ui.close_menu();
            save_definition(state);
        }
        ui.separator();
        let has_geometry = state.preview.geometry().is_some();
        if ui
            .add_enabled(has_geometry, egui::Button::new("Export pattern SVG…"))
            .clicked()
        {
            ui.close_menu();
            export_svg(state);
        }
        ui.separator();
        if ui.button("Quit").clicked() {
            ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
        }
    });
}

fn save_definition(state: &AppState) {
    let Some(definition) = state.loader.definition() else {
        return;
    };
    if let Some(path) = rfd::FileDialog::new()
        .set_title("Save assembly definition")
        .add_filter("JSON", &["json"])
        .set_file_name(format!("{}.json", definition.key))
        .save_file()
    {
        match definition.to_json() {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    tracing::error!("Failed to write assembly: {e}");
                } else {
                    tracing::info!("Saved assembly to {}", path.display());
                }
            }
            Err(e) => tracing::error!("Failed to serialize assembly: {e}"),
        }
    }
}

fn export_svg(state: &AppState) {
    let Some(geometry) = state.preview.geometry() else {
        return;
    };
    let svg = SvgRenderer::default().render(geometry);
    if let Some(path) = rfd::FileDialog::new()
        .set_title("Export pattern sheet")
        .add_filter("SVG", &["svg"])
        .set_file_name(format!("{}.svg", geometry.assembly_key))
        .save_file()
    {
        if let Err(e) = std::fs::write(&path, svg) {
            tracing::error!("Failed to write SVG: {e}");
        }
    }
}

/// Show the view menu
pub fn view_menu(ui: &mut egui::Ui, state: &mut AppState) {
    ui.menu_button("View", |ui| {
        let label = match state.preview.mode().toggled() {
            ViewMode::Flat => "Flatten  (Space)",
            ViewMode::Assembled => "Assemble  (Space)",
        };
        if ui.button(label).clicked() {
            toolbar::action_toggle(state);
            ui.close_menu();
        }
        if ui.button("Frame view  (F)").clicked() {
            toolbar::action_frame(state);
            ui.close_menu();
        }
        ui.separator();
        ui.checkbox(&mut state.panels.parameters, "Parameters");
        ui.checkbox(&mut state.panels.steps, "Assembly steps");
        ui.checkbox(&mut state.settings.viewport.show_labels, "Panel labels");
    });
}

/// Show the settings menu
pub fn settings_menu(ui: &mut egui::Ui, state: &mut AppState) {
    ui.menu_button("Settings", |ui| {
        if ui.button("Preferences…").clicked() {
            state.show_settings_window = true;
            ui.close_menu();
        }
    });
}

/// Show the settings window
pub fn settings_window(ctx: &egui::Context, state: &mut AppState) {
    let mut open = state.show_settings_window;
    egui::Window::new("Settings")
        .open(&mut open)
        .resizable(true)
        .default_width(380.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                show_preview_settings(ui, state);
                show_viewport_settings(ui, state);
                show_ui_settings(ui, state);
                show_server_settings(ui, state);
                show_settings_buttons(ui, state);
            });
        });
    state.show_settings_window = open;
}

fn show_preview_settings(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("Preview");
    let preview = &mut state.settings.preview;

    ui.horizontal(|ui| {
        ui.label("Transition");
        ui.add(
            egui::DragValue::new(&mut preview.transition_ms)
                .speed(10)
                .range(0..=5000)
                .suffix(" ms"),
        );
    });
    ui.horizontal(|ui| {
        ui.label("Camera follow");
        ui.add(egui::Slider::new(&mut preview.camera_follow, 0.01..=1.0));
    });
    ui.horizontal(|ui| {
        ui.label("Layout columns");
        ui.add(egui::DragValue::new(&mut preview.columns).speed(1).range(1..=8));
    });
    ui.horizontal(|ui| {
        ui.label("Layout gap");
        ui.add(
            egui::DragValue::new(&mut preview.gap)
                .speed(0.01)
                .range(0.0..=2.0),
        );
    });
    ui.horizontal(|ui| {
        ui.label("Field of view");
        ui.add(
            egui::DragValue::new(&mut preview.fov_degrees)
                .speed(0.5)
                .range(10.0..=120.0)
                .suffix("°"),
        );
    });
    ui.add_space(10.0);
}

fn show_viewport_settings(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("Viewport");
    let viewport = &mut state.settings.viewport;
    for (label, rgb) in [
        ("Background", &mut viewport.background_color),
        ("Panel fill", &mut viewport.panel_color),
        ("Highlight", &mut viewport.highlight_color),
    ] {
        ui.horizontal(|ui| {
            ui.label(label);
            let mut color = egui::Color32::from_rgb(rgb[0], rgb[1], rgb[2]);
            if ui.color_edit_button_srgba(&mut color).changed() {
                *rgb = [color.r(), color.g(), color.b()];
            }
        });
    }
    ui.checkbox(&mut viewport.show_labels, "Panel labels");
    ui.add_space(10.0);
}

fn show_ui_settings(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("Interface");
    ui.horizontal(|ui| {
        ui.label("Font size");
        ui.add(
            egui::DragValue::new(&mut state.settings.ui.font_size)
                .speed(0.5)
                .range(8.0..=24.0)
                .suffix(" pt"),
        );
    });
    ui.add_space(10.0);
}

fn show_server_settings(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("Server");
    let mut url = state.settings.server_url.clone().unwrap_or_default();
    ui.horizontal(|ui| {
        ui.label("URL");
        if ui.text_edit_singleline(&mut url).changed() {
            let url = url.trim();
            state.settings.server_url = (!url.is_empty()).then(|| url.to_string());
        }
    });
    ui.add_space(10.0);
}

fn show_settings_buttons(ui: &mut egui::Ui, state: &mut AppState) {
    ui.separator();
    ui.horizontal(|ui| {
        if ui.button("Apply").clicked() {
            state.preview.set_config(state.settings.preview.clone());
            state.settings.save();
        }
        if ui.button("Reset").clicked() {
            state.settings = AppSettings::default();
            state.preview.set_config(state.settings.preview.clone());
        }
        if ui.button("Close").clicked() {
            state.show_settings_window = false;
        }
    });
}
