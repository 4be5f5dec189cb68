//! Scene validation utilities.
//!
//! `SceneValidator` checks a built [`PanelScene`]: seams close in the assembled
//! state, both transform sets are centered, flat panels do not overlap and
//! rotations stay normalized.

use glam::Vec3;
use shared::SeamDef;

use crate::build::seams::edge_point;
use crate::build::{PanelScene, Placement, ScenePanel};
use crate::viewport::bounds::Aabb;

/// Distance between the two edge midpoints of one seam in the assembled state
#[derive(Debug, Clone, PartialEq)]
pub struct SeamGap {
    pub seam: usize,
    pub parent_point: Vec3,
    pub child_point: Vec3,
    pub distance: f32,
}

/// Validator for `PanelScene` integrity checks.
pub struct SceneValidator<'a> {
    scene: &'a PanelScene,
}

impl<'a> SceneValidator<'a> {
    pub fn new(scene: &'a PanelScene) -> Self {
        Self { scene }
    }

    pub fn panel_count(&self) -> usize {
        self.scene.panels.len()
    }

    /// Gap for every seam whose two panels were both placed by seams.
    ///
    /// For a seam tree every seam closes. When a child is reachable from
    /// several seams only the one that placed it does.
    pub fn seam_gaps(&self, seams: &[SeamDef]) -> Vec<SeamGap> {
        seams
            .iter()
            .enumerate()
            .filter_map(|(index, seam)| {
                let parent = self.seam_placed(seam.parent.as_str())?;
                let child = self.seam_placed(seam.child.as_str())?;
                let parent_point = parent
                    .assembled
                    .transform_point(edge_point(seam.parent_edge, parent.size));
                let child_point = child
                    .assembled
                    .transform_point(edge_point(seam.child_edge, child.size));
                Some(SeamGap {
                    seam: index,
                    parent_point,
                    child_point,
                    distance: parent_point.distance(child_point),
                })
            })
            .collect()
    }

    /// Largest seam gap, 0 when no seam can be checked
    pub fn max_seam_gap(&self, seams: &[SeamDef]) -> f32 {
        self.seam_gaps(seams)
            .iter()
            .map(|gap| gap.distance)
            .fold(0.0, f32::max)
    }

    fn seam_placed(&self, key: &str) -> Option<&ScenePanel> {
        self.scene
            .panel(key)
            .filter(|panel| panel.placement == Placement::Seam)
    }

    /// Flat box recomputed from the transforms
    pub fn flat_bounds(&self) -> Aabb {
        Aabb::from_panels(self.scene.panels.iter().map(|p| (&p.flat, &p.size)))
    }

    /// Assembled box recomputed from the transforms
    pub fn assembled_bounds(&self) -> Aabb {
        Aabb::from_panels(self.scene.panels.iter().map(|p| (&p.assembled, &p.size)))
    }

    /// Both transform sets centered on the origin (empty sets count as centered)
    pub fn is_centered(&self, epsilon: f32) -> bool {
        [self.flat_bounds(), self.assembled_bounds()]
            .iter()
            .all(|bounds| bounds.is_empty() || bounds.center().abs_diff_eq(Vec3::ZERO, epsilon))
    }

    /// No two flat rectangles share interior area
    pub fn flat_panels_disjoint(&self) -> bool {
        let rects: Vec<(f32, f32, f32, f32)> = self
            .scene
            .panels
            .iter()
            .map(|panel| {
                let (hw, hh) = panel.size.half_extents();
                let p = panel.flat.position;
                (p.x - hw, p.x + hw, p.y - hh, p.y + hh)
            })
            .collect();

        const EPS: f32 = 1e-5;
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                let overlap_x = a.1.min(b.1) - a.0.max(b.0);
                let overlap_y = a.3.min(b.3) - a.2.max(b.2);
                if overlap_x > EPS && overlap_y > EPS {
                    return false;
                }
            }
        }
        true
    }

    /// Every rotation in both sets has unit length
    pub fn rotations_normalized(&self, epsilon: f32) -> bool {
        self.scene.panels.iter().all(|panel| {
            (panel.flat.rotation.length() - 1.0).abs() < epsilon
                && (panel.assembled.rotation.length() - 1.0).abs() < epsilon
        })
    }

    /// Assembled box dimensions (x, y, z)
    pub fn assembled_dimensions(&self) -> [f32; 3] {
        self.assembled_bounds().size().to_array()
    }

    /// Check that the assembled dimensions are approximately equal to `expected`.
    pub fn assert_dimensions_approx(&self, expected: [f32; 3], tolerance: f32) -> bool {
        let dims = self.assembled_dimensions();
        dims.iter()
            .zip(expected.iter())
            .all(|(actual, expected)| (actual - expected).abs() < tolerance)
    }
}
