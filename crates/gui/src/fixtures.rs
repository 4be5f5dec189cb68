//! Factory functions for test data.
//!
//! Definitions built here give every panel its own pair of number parameters
//! (`<key>_width`, `<key>_height`) so sizes can be set per panel.

use std::collections::BTreeMap;

use shared::*;

use crate::build::{PanelSize, SizedPanel};

// ── Keys, panels, seams ─────────────────────────────────────────

/// Panel key from a literal. Panics on an empty key.
pub fn key(k: &str) -> PanelKey {
    PanelKey::new(k).expect("fixture panel keys are non-empty")
}

pub fn seam(parent: &str, parent_edge: Edge, child: &str, child_edge: Edge, angle: f64) -> SeamDef {
    SeamDef {
        parent: key(parent),
        parent_edge,
        child: key(child),
        child_edge,
        angle,
    }
}

pub fn sized(k: &str, width: f32, height: f32) -> SizedPanel {
    SizedPanel {
        key: key(k),
        size: PanelSize::new(width, height),
    }
}

// ── Definitions ─────────────────────────────────────────────────

/// Definition with fixed panel sizes, seams and an optional root
pub fn definition(
    assembly_key: &str,
    panels: &[(&str, f64, f64)],
    seams: Vec<SeamDef>,
    root: Option<&str>,
) -> AssemblyDefinition {
    let mut def = AssemblyDefinition::empty(assembly_key, assembly_key);
    for &(k, width, height) in panels {
        let width_param = format!("{k}_width");
        let height_param = format!("{k}_height");
        def.parameters.push(ParameterDef::number(&width_param, width));
        def.parameters.push(ParameterDef::number(&height_param, height));
        def.panels.push(PanelDef {
            key: key(k),
            label: None,
            width_param: Some(width_param),
            height_param: Some(height_param),
        });
    }
    def.seams = seams;
    def.preview_3d.root = root.map(key);
    def
}

/// Assign roles and the depth parameter on an existing definition
pub fn with_roles(mut def: AssemblyDefinition, roles: &[(&str, Role)], depth: Option<f64>) -> AssemblyDefinition {
    def.preview_3d.panels = roles
        .iter()
        .map(|&(k, role)| (key(k), RoleAssignment { role }))
        .collect();
    if let Some(depth) = depth {
        def.parameters.push(ParameterDef::number("depth", depth));
        def.preview_3d.depth_param = Some("depth".to_string());
    }
    def
}

/// Square front and back (10×10), two 2×10 gussets hinged on the front
pub fn front_with_gussets() -> AssemblyDefinition {
    definition(
        "gussets",
        &[
            ("front", 10.0, 10.0),
            ("back", 10.0, 10.0),
            ("gusset", 2.0, 10.0),
            ("leftgusset", 2.0, 10.0),
        ],
        vec![
            seam("front", Edge::Right, "gusset", Edge::Left, 90.0),
            seam("front", Edge::Left, "leftgusset", Edge::Right, -90.0),
        ],
        Some("front"),
    )
}

/// A single `back` role panel with no seams
pub fn lone_back_panel(depth: f64) -> AssemblyDefinition {
    with_roles(
        definition("lone_back", &[("back", 10.0, 10.0)], Vec::new(), None),
        &[("back", Role::Back)],
        Some(depth),
    )
}

/// `count` equal panels hinged bottom-to-top in a chain
pub fn chain(count: usize, angle: f64) -> AssemblyDefinition {
    let keys: Vec<String> = (0..count).map(|i| format!("p{i}")).collect();
    let panels: Vec<(&str, f64, f64)> = keys.iter().map(|k| (k.as_str(), 4.0, 3.0)).collect();
    let seams = keys
        .windows(2)
        .map(|pair| seam(&pair[0], Edge::Bottom, &pair[1], Edge::Top, angle))
        .collect();
    definition("chain", &panels, seams, keys.first().map(String::as_str))
}

// ── Geometry ────────────────────────────────────────────────────

/// Geometry at the definition's defaults
pub fn geometry_of(def: &AssemblyDefinition) -> Geometry {
    GeometryEngine::new(def, &BTreeMap::new()).build()
}

/// Geometry with numeric overrides
pub fn geometry_with(def: &AssemblyDefinition, overrides: &[(&str, f64)]) -> Geometry {
    let snapshot: BTreeMap<String, ParamValue> = overrides
        .iter()
        .map(|&(k, v)| (k.to_string(), ParamValue::Number(v)))
        .collect();
    GeometryEngine::new(def, &snapshot).build()
}
