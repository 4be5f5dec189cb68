//! Встроенный каталог сборок (zipper_pouch, tote_bag)

use crate::{
    AssemblyDefinition, Edge, PanelDef, PanelKey, ParameterDef, Preview3d, Role, RoleAssignment,
    SeamDef,
};
use std::collections::BTreeMap;

fn key(k: &str) -> PanelKey {
    PanelKey(k.to_string())
}

fn panel(k: &str, label: &str, width: &str, height: &str) -> PanelDef {
    PanelDef {
        key: key(k),
        label: Some(label.to_string()),
        width_param: Some(width.to_string()),
        height_param: Some(height.to_string()),
    }
}

fn seam(parent: &str, parent_edge: Edge, child: &str, child_edge: Edge, angle: f64) -> SeamDef {
    SeamDef {
        parent: key(parent),
        parent_edge,
        child: key(child),
        child_edge,
        angle,
    }
}

fn roles(pairs: &[(&str, Role)]) -> BTreeMap<PanelKey, RoleAssignment> {
    pairs
        .iter()
        .map(|(k, role)| (key(k), RoleAssignment { role: *role }))
        .collect()
}

/// Коробка: перед, дно, зад, две боковины. Швы складывают её назад от переда.
fn box_seams() -> Vec<SeamDef> {
    vec![
        seam("front", Edge::Bottom, "bottom", Edge::Top, 90.0),
        seam("bottom", Edge::Bottom, "back", Edge::Bottom, -90.0),
        seam("front", Edge::Right, "side", Edge::Left, 90.0),
        seam("front", Edge::Left, "side_left", Edge::Right, -90.0),
    ]
}

fn box_panels() -> Vec<PanelDef> {
    vec![
        panel("front", "Front", "width", "height"),
        panel("back", "Back", "width", "height"),
        panel("bottom", "Bottom", "width", "depth"),
        panel("side", "Right gusset", "depth", "height"),
        panel("side_left", "Left gusset", "depth", "height"),
    ]
}

fn box_roles() -> Vec<(&'static str, Role)> {
    vec![
        ("front", Role::Front),
        ("back", Role::Back),
        ("bottom", Role::Bottom),
        ("side", Role::Side),
        ("side_left", Role::SideLeft),
    ]
}

pub fn zipper_pouch() -> AssemblyDefinition {
    AssemblyDefinition {
        key: "zipper_pouch".to_string(),
        name: "Zipper Pouch".to_string(),
        version: 1,
        parameters: vec![
            ParameterDef::number("width", 9.0).with_label("Width"),
            ParameterDef::number("height", 6.0).with_label("Height"),
            ParameterDef::number("depth", 2.0).with_label("Depth"),
            ParameterDef::number("seam_allowance", 0.375).with_label("Seam allowance"),
        ],
        panels: box_panels(),
        seams: box_seams(),
        steps: vec![
            "Cut front, back, bottom and two gussets".to_string(),
            "Install the zipper between front and back top edges".to_string(),
            "Sew the bottom to front and back".to_string(),
            "Sew the gussets and turn right side out".to_string(),
        ],
        preview_3d: Preview3d {
            seams: Vec::new(),
            panels: roles(&box_roles()),
            root: Some(key("front")),
            width_param: Some("width".to_string()),
            height_param: Some("height".to_string()),
            depth_param: Some("depth".to_string()),
        },
    }
}

pub fn tote_bag() -> AssemblyDefinition {
    let mut panels = box_panels();
    panels.push(panel("strap", "Strap", "strap_width", "strap_length"));

    let mut role_pairs = box_roles();
    role_pairs.push(("strap", Role::Strap));

    AssemblyDefinition {
        key: "tote_bag".to_string(),
        name: "Tote Bag".to_string(),
        version: 1,
        parameters: vec![
            ParameterDef::number("width", 14.0).with_label("Width"),
            ParameterDef::number("height", 15.0).with_label("Height"),
            ParameterDef::number("depth", 4.0).with_label("Depth"),
            ParameterDef::formula("strap_length", "height * 2").with_label("Strap length"),
            ParameterDef::number("strap_width", 1.5).with_label("Strap width"),
        ],
        panels,
        seams: box_seams(),
        steps: vec![
            "Cut body panels and strap".to_string(),
            "Sew the bottom to front and back".to_string(),
            "Sew the gussets".to_string(),
            "Fold and topstitch the strap, attach at the side seams".to_string(),
        ],
        preview_3d: Preview3d {
            seams: Vec::new(),
            panels: roles(&role_pairs),
            root: Some(key("front")),
            width_param: Some("width".to_string()),
            height_param: Some("height".to_string()),
            depth_param: Some("depth".to_string()),
        },
    }
}

/// Сборки по умолчанию, которыми заполняется хранилище
pub fn default_assemblies() -> Vec<AssemblyDefinition> {
    vec![zipper_pouch(), tote_bag()]
}

pub fn find(key: &str) -> Option<AssemblyDefinition> {
    default_assemblies().into_iter().find(|def| def.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        for def in default_assemblies() {
            let issues = def.validate();
            assert!(issues.is_empty(), "{}: {:?}", def.key, issues);
        }
    }

    #[test]
    fn test_find_by_key() {
        assert_eq!(find("tote_bag").map(|def| def.name), Some("Tote Bag".to_string()));
        assert!(find("backpack").is_none());
    }

    #[test]
    fn test_tote_strap_has_no_seam() {
        let def = tote_bag();
        assert!(def.seam_list().iter().all(|s| s.child.as_str() != "strap"));
        assert_eq!(def.preview_3d.role_of("strap"), Some(Role::Strap));
    }

    #[test]
    fn test_catalog_json_roundtrip() {
        let def = zipper_pouch();
        let json = def.to_json().unwrap();
        assert_eq!(AssemblyDefinition::from_json(&json).unwrap(), def);
    }
}
