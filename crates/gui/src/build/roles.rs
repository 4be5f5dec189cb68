//! Role-based canonical placement and depth centering.

use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Quat, Vec3};
use shared::{PanelKey, Preview3d, Role};

use super::PanelTransform;

/// Overall assembly size in scene units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AssemblyExtents {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

/// Canonical transform for a panel that no seam reaches
pub fn role_transform(role: Role, extents: AssemblyExtents, strap_offset: f32) -> PanelTransform {
    let hw = extents.width * 0.5;
    let hh = extents.height * 0.5;
    let hd = extents.depth * 0.5;
    match role {
        Role::Front => PanelTransform::from_position(Vec3::new(0.0, 0.0, hd)),
        Role::Back => PanelTransform::new(Vec3::new(0.0, 0.0, -hd), Quat::from_rotation_y(PI)),
        Role::Bottom => {
            PanelTransform::new(Vec3::new(0.0, -hh, 0.0), Quat::from_rotation_x(-FRAC_PI_2))
        }
        Role::Top => PanelTransform::new(Vec3::new(0.0, hh, 0.0), Quat::from_rotation_x(FRAC_PI_2)),
        Role::Side => PanelTransform::new(Vec3::new(hw, 0.0, 0.0), Quat::from_rotation_y(FRAC_PI_2)),
        Role::SideLeft => {
            PanelTransform::new(Vec3::new(-hw, 0.0, 0.0), Quat::from_rotation_y(-FRAC_PI_2))
        }
        Role::Strap => PanelTransform::new(
            Vec3::new(0.0, hh + strap_offset, 0.0),
            Quat::from_rotation_x(FRAC_PI_2),
        ),
        Role::Unknown => PanelTransform::IDENTITY,
    }
}

/// Shift seam-resolved transforms along z so the front panel sits at
/// `+depth/2`, or the back panel at `-depth/2` when there is no front.
/// With several panels sharing a role the first by key is used.
/// Returns whether a shift was applied.
pub fn align_depth_center(
    resolved: &mut HashMap<PanelKey, PanelTransform>,
    preview: &Preview3d,
    depth: f32,
) -> bool {
    if !depth.is_finite() || depth <= 0.0 {
        return false;
    }

    // The anchor counts only when it has a seam path
    let anchor = |role: Role| {
        preview
            .panel_with_role(role)
            .and_then(|key| resolved.get(key))
            .map(|t| t.position.z)
    };

    let shift = if let Some(z) = anchor(Role::Front) {
        depth * 0.5 - z
    } else if let Some(z) = anchor(Role::Back) {
        -depth * 0.5 - z
    } else {
        return false;
    };

    for transform in resolved.values_mut() {
        transform.position.z += shift;
    }
    true
}
