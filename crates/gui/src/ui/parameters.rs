//! Parameters panel: one drag value per numeric parameter of the current geometry.
//!
//! Edits go through the geometry loader, so a local definition is rebuilt
//! immediately and a remote session is patched and fetched again once the
//! edits settle. Unsaved remote values are shown in place of the server's.

use egui::Ui;
use shared::{ParameterDef, ParameterValue};

use crate::state::AppState;

/// Row data gathered before drawing, so the loader can be borrowed mutably after
struct ParamRow {
    key: String,
    label: String,
    value: Option<f64>,
    formula: Option<String>,
}

pub fn show(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Parameters");
    ui.separator();

    let Some(geometry) = state.preview.geometry() else {
        ui.add_space(10.0);
        ui.vertical_centered(|ui| {
            ui.weak("No geometry loaded");
        });
        return;
    };

    let defs: &[ParameterDef] = state
        .loader
        .definition()
        .map(|definition| definition.parameters.as_slice())
        .unwrap_or(&[]);

    let rows: Vec<ParamRow> = geometry
        .params
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            let def = defs.iter().find(|def| &def.key == key);
            ParamRow {
                key: key.clone(),
                label: def
                    .and_then(|def| def.label.clone())
                    .unwrap_or_else(|| key.clone()),
                value: state.loader.unsaved_param(key).or_else(|| value.as_f64()),
                formula: def.and_then(|def| match &def.value {
                    ParameterValue::Formula { expression } => Some(expression.clone()),
                    ParameterValue::Number { .. } => None,
                }),
            }
        })
        .collect();

    if rows.is_empty() {
        ui.weak("This assembly declares no parameters");
        return;
    }

    let mut edits: Vec<(String, f64)> = Vec::new();

    egui::Grid::new("params_grid")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui| {
            for row in &rows {
                ui.label(&row.label);
                match (row.value, &row.formula) {
                    (Some(mut value), formula) => {
                        let response = ui.add(
                            egui::DragValue::new(&mut value)
                                .speed(0.125)
                                .range(0.0..=f64::INFINITY)
                                .max_decimals(3),
                        );
                        let response = match formula {
                            Some(expression) => response.on_hover_text(format!("= {expression}")),
                            None => response,
                        };
                        if response.changed() {
                            edits.push((row.key.clone(), value));
                        }
                    }
                    (None, _) => {
                        ui.weak("-");
                    }
                }
                ui.end_row();
            }
        });

    for (key, value) in edits {
        state.loader.set_param(&key, value);
    }
}

/// Free-form assembly instructions of the current geometry
pub fn show_steps(ui: &mut Ui, state: &AppState) {
    ui.heading("Assembly steps");
    ui.separator();

    let steps = state
        .preview
        .geometry()
        .map(|geometry| geometry.steps.as_slice())
        .unwrap_or(&[]);
    if steps.is_empty() {
        ui.weak("No steps");
        return;
    }
    for (index, step) in steps.iter().enumerate() {
        ui.label(format!("{}. {step}", index + 1));
    }
}
