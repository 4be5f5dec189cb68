//! JSON command protocol for driving the preview from an agent or a script.

use serde::{Deserialize, Serialize};
use shared::ParamValue;

use crate::harness::TestHarness;

/// A command executed on the headless harness.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum AgentCommand {
    /// Flip between flat and assembled
    Toggle,
    /// Override a parameter and rebuild geometry
    SetParam { key: String, value: ParamValue },
    /// Advance one frame by `ms` milliseconds
    Tick { ms: u64 },
    /// Orbit the camera (degrees)
    Orbit { dx: f32, dy: f32 },
    /// Inspect mode, progress and the current panel poses.
    Inspect,
    /// Export the current geometry as JSON.
    ExportGeometry,
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }
}

/// Execute a single command on the harness.
pub fn execute_command(harness: &mut TestHarness, cmd: AgentCommand) -> CommandResponse {
    match cmd {
        AgentCommand::Toggle => {
            harness.toggle();
            harness.tick_ms(0);
            CommandResponse::ok_with_data(serde_json::json!({ "mode": harness.mode() }))
        }

        AgentCommand::SetParam { key, value } => {
            if key.trim().is_empty() {
                return CommandResponse::err("parameter key must not be empty");
            }
            harness.set_param(&key, value);
            CommandResponse::ok_with_data(serde_json::json!({
                "panel_count": harness.panel_count(),
            }))
        }

        AgentCommand::Tick { ms } => {
            harness.tick_ms(ms);
            CommandResponse::ok_with_data(serde_json::json!({
                "progress": harness.progress(),
                "animating": harness.preview.is_animating(),
            }))
        }

        AgentCommand::Orbit { dx, dy } => {
            harness.orbit(dx, dy);
            harness.tick_ms(0);
            CommandResponse::ok()
        }

        AgentCommand::Inspect => {
            let panels: Vec<serde_json::Value> = harness
                .preview
                .poses()
                .iter()
                .map(|pose| {
                    serde_json::json!({
                        "key": pose.key,
                        "label": pose.label,
                        "width": pose.size.width,
                        "height": pose.size.height,
                        "position": pose.transform.position.to_array(),
                        "rotation": pose.transform.rotation.to_array(),
                    })
                })
                .collect();
            CommandResponse::ok_with_data(serde_json::json!({
                "assembly_key": harness.scene().assembly_key,
                "mode": harness.mode(),
                "progress": harness.progress(),
                "panel_count": panels.len(),
                "panels": panels,
            }))
        }

        AgentCommand::ExportGeometry => {
            let json = harness.export_geometry_json();
            CommandResponse::ok_with_data(serde_json::json!({ "geometry_json": json }))
        }
    }
}

/// Parse and execute a single JSON command string.
pub fn execute_json(harness: &mut TestHarness, json: &str) -> Result<CommandResponse, String> {
    let cmd: AgentCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(harness, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch(
    harness: &mut TestHarness,
    json: &str,
) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<AgentCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(harness, cmd))
        .collect())
}
