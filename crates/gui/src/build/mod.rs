//! Scene building: flat layout and seam assembly for one geometry snapshot.
//!
//! A [`PanelScene`] is rebuilt from scratch whenever geometry changes and is
//! swapped into the preview state as a unit.

pub mod layout;
pub mod roles;
pub mod seams;

use std::collections::{HashMap, HashSet};

use glam::{Mat4, Quat, Vec3};
use serde::Serialize;
use shared::{Geometry, PanelKey};

use crate::state::settings::PreviewConfig;
use crate::viewport::bounds::Aabb;

pub use layout::flat_layout;
pub use roles::{align_depth_center, role_transform, AssemblyExtents};
pub use seams::{resolve_assembly, SeamGraph};

/// Rigid transform of one panel (no scale)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PanelTransform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl PanelTransform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// Decompose a rigid matrix; any scale picked up by rounding is dropped
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (_, rotation, position) = matrix.to_scale_rotation_translation();
        Self::new(position, rotation.normalize())
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Linear position, spherical orientation. Endpoints are returned exactly.
    pub fn interpolate(&self, other: &Self, t: f32) -> Self {
        if t <= 0.0 {
            return *self;
        }
        if t >= 1.0 {
            return *other;
        }
        Self::new(
            self.position.lerp(other.position, t),
            self.rotation.slerp(other.rotation, t),
        )
    }
}

/// Panel dimensions in scene units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PanelSize {
    pub width: f32,
    pub height: f32,
}

impl PanelSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: sanitize(width),
            height: sanitize(height),
        }
    }

    pub fn half_extents(&self) -> (f32, f32) {
        (self.width * 0.5, self.height * 0.5)
    }

    /// Corners in the panel's local frame, counter-clockwise from bottom-left
    pub fn local_corners(&self) -> [Vec3; 4] {
        let (hw, hh) = self.half_extents();
        [
            Vec3::new(-hw, -hh, 0.0),
            Vec3::new(hw, -hh, 0.0),
            Vec3::new(hw, hh, 0.0),
            Vec3::new(-hw, hh, 0.0),
        ]
    }
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Panel key with its size, in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct SizedPanel {
    pub key: PanelKey,
    pub size: PanelSize,
}

/// Where an assembled transform came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Seam,
    Role,
    Unplaced,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenePanel {
    pub key: PanelKey,
    pub label: String,
    pub size: PanelSize,
    pub flat: PanelTransform,
    pub assembled: PanelTransform,
    pub placement: Placement,
}

/// Flat and assembled transforms of every panel, each set centered on its own box
#[derive(Debug, Clone, PartialEq)]
pub struct PanelScene {
    pub assembly_key: String,
    pub panels: Vec<ScenePanel>,
    pub flat_box: Aabb,
    pub assembled_box: Aabb,
}

impl Default for PanelScene {
    fn default() -> Self {
        Self {
            assembly_key: String::new(),
            panels: Vec::new(),
            flat_box: Aabb::EMPTY,
            assembled_box: Aabb::EMPTY,
        }
    }
}

impl PanelScene {
    pub fn build(geometry: &Geometry, config: &PreviewConfig) -> Self {
        let scale = config.unit_scale;

        let mut seen = HashSet::new();
        let mut sized = Vec::with_capacity(geometry.panels.len());
        let mut labels = Vec::with_capacity(geometry.panels.len());
        for panel in &geometry.panels {
            if !seen.insert(panel.key.clone()) {
                tracing::warn!("duplicate panel '{}' ignored", panel.key);
                continue;
            }
            sized.push(SizedPanel {
                key: panel.key.clone(),
                size: PanelSize::new(panel.width as f32 * scale, panel.height as f32 * scale),
            });
            labels.push(panel.display_name().to_string());
        }

        let sizes: Vec<PanelSize> = sized.iter().map(|p| p.size).collect();
        let mut flat = flat_layout(&sizes, config.columns, config.gap);

        let preview = &geometry.preview_3d;
        let mut resolved = resolve_assembly(&sized, geometry.seam_list(), preview.root.as_ref());

        let extents = AssemblyExtents {
            width: geometry.numeric_param(preview.width_param.as_deref()) as f32 * scale,
            height: geometry.numeric_param(preview.height_param.as_deref()) as f32 * scale,
            depth: geometry.numeric_param(preview.depth_param.as_deref()) as f32 * scale,
        };
        align_depth_center(&mut resolved, preview, extents.depth);

        let mut placements = Vec::with_capacity(sized.len());
        let mut assembled: Vec<PanelTransform> = sized
            .iter()
            .map(|panel| {
                if let Some(transform) = resolved.get(&panel.key) {
                    placements.push(Placement::Seam);
                    return *transform;
                }
                match preview.role_of(panel.key.as_str()) {
                    Some(role) => {
                        placements.push(Placement::Role);
                        role_transform(role, extents, config.strap_offset)
                    }
                    None => {
                        tracing::debug!("panel '{}' has no seam path or role", panel.key);
                        placements.push(Placement::Unplaced);
                        PanelTransform::IDENTITY
                    }
                }
            })
            .collect();

        let flat_box = center_on_origin(&mut flat, &sizes);
        let assembled_box = center_on_origin(&mut assembled, &sizes);

        let panels = sized
            .into_iter()
            .zip(labels)
            .zip(flat.into_iter().zip(assembled))
            .zip(placements)
            .map(|(((panel, label), (flat, assembled)), placement)| ScenePanel {
                key: panel.key,
                label,
                size: panel.size,
                flat,
                assembled,
                placement,
            })
            .collect();

        Self {
            assembly_key: geometry.assembly_key.clone(),
            panels,
            flat_box,
            assembled_box,
        }
    }

    pub fn panel(&self, key: &str) -> Option<&ScenePanel> {
        self.panels.iter().find(|panel| panel.key.as_str() == key)
    }

    pub fn flat_transforms(&self) -> HashMap<PanelKey, PanelTransform> {
        self.panels
            .iter()
            .map(|panel| (panel.key.clone(), panel.flat))
            .collect()
    }

    pub fn assembled_transforms(&self) -> HashMap<PanelKey, PanelTransform> {
        self.panels
            .iter()
            .map(|panel| (panel.key.clone(), panel.assembled))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }
}

/// Shift every position so the set's bounding box is centered on the origin.
/// Returns the box after the shift.
pub fn center_on_origin(transforms: &mut [PanelTransform], sizes: &[PanelSize]) -> Aabb {
    let bounds = Aabb::from_panels(transforms.iter().zip(sizes.iter()));
    if bounds.is_empty() {
        return bounds;
    }
    let center = bounds.center();
    for transform in transforms.iter_mut() {
        transform.position -= center;
    }
    bounds.translated(-center)
}
