//! Seam assembly: breadth-first placement of panels from a root along seams.

use std::collections::{HashMap, VecDeque};

use glam::{Mat4, Quat, Vec3};
use shared::{Edge, PanelKey, SeamDef};

use super::{PanelSize, PanelTransform, SizedPanel};

/// Seams indexed by parent key, declaration order preserved
pub struct SeamGraph<'a> {
    by_parent: HashMap<&'a str, Vec<&'a SeamDef>>,
}

impl<'a> SeamGraph<'a> {
    pub fn new(seams: &'a [SeamDef]) -> Self {
        let mut by_parent: HashMap<&'a str, Vec<&'a SeamDef>> = HashMap::new();
        for seam in seams {
            by_parent.entry(seam.parent.as_str()).or_default().push(seam);
        }
        Self { by_parent }
    }

    pub fn children_of(&self, parent: &str) -> &[&'a SeamDef] {
        self.by_parent.get(parent).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Midpoint of an edge in the panel's local frame
pub fn edge_point(edge: Edge, size: PanelSize) -> Vec3 {
    let (hw, hh) = size.half_extents();
    match edge {
        Edge::Left => Vec3::new(-hw, 0.0, 0.0),
        Edge::Right => Vec3::new(hw, 0.0, 0.0),
        Edge::Top => Vec3::new(0.0, hh, 0.0),
        Edge::Bottom => Vec3::new(0.0, -hh, 0.0),
        Edge::Unknown => Vec3::ZERO,
    }
}

/// Hinge axis, parallel to the parent edge
pub fn edge_axis(edge: Edge) -> Vec3 {
    match edge {
        Edge::Top | Edge::Bottom => Vec3::X,
        Edge::Left | Edge::Right | Edge::Unknown => Vec3::Y,
    }
}

/// Child placement relative to its parent's frame: align the edge points,
/// then hinge around the parent edge point.
pub fn seam_local_matrix(seam: &SeamDef, parent: PanelSize, child: PanelSize) -> Mat4 {
    let pivot = edge_point(seam.parent_edge, parent);
    let align = pivot - edge_point(seam.child_edge, child);
    let angle = if seam.angle.is_finite() {
        (seam.angle as f32).to_radians()
    } else {
        0.0
    };
    let rotation = Quat::from_axis_angle(edge_axis(seam.parent_edge), angle);

    Mat4::from_translation(pivot)
        * Mat4::from_quat(rotation)
        * Mat4::from_translation(-pivot)
        * Mat4::from_translation(align)
}

/// Child transform in world space given the parent's world transform
pub fn transform_from_seam(
    seam: &SeamDef,
    parent_world: &PanelTransform,
    parent: PanelSize,
    child: PanelSize,
) -> PanelTransform {
    PanelTransform::from_matrix(parent_world.matrix() * seam_local_matrix(seam, parent, child))
}

/// Resolve assembled transforms for every panel reachable from the root.
///
/// The root is `root` when it names a known panel, otherwise the first panel.
/// Seams naming unknown panels are skipped. A child reachable through more
/// than one seam keeps the first transform assigned in traversal order.
/// Unreachable panels are absent from the result.
pub fn resolve_assembly(
    panels: &[SizedPanel],
    seams: &[SeamDef],
    root: Option<&PanelKey>,
) -> HashMap<PanelKey, PanelTransform> {
    let mut resolved = HashMap::new();

    let sizes: HashMap<&str, PanelSize> = panels
        .iter()
        .map(|panel| (panel.key.as_str(), panel.size))
        .collect();

    let root = match root {
        Some(key) if sizes.contains_key(key.as_str()) => key.clone(),
        declared => {
            let Some(first) = panels.first() else {
                return resolved;
            };
            if let Some(key) = declared {
                tracing::warn!("root panel '{key}' not found, using '{}'", first.key);
            }
            first.key.clone()
        }
    };

    let graph = SeamGraph::new(seams);
    resolved.insert(root.clone(), PanelTransform::IDENTITY);

    let mut queue = VecDeque::from([root]);
    while let Some(parent_key) = queue.pop_front() {
        let (Some(&parent_size), Some(&parent_world)) =
            (sizes.get(parent_key.as_str()), resolved.get(&parent_key))
        else {
            continue;
        };

        for seam in graph.children_of(parent_key.as_str()) {
            if resolved.contains_key(&seam.child) {
                continue;
            }
            let Some(&child_size) = sizes.get(seam.child.as_str()) else {
                tracing::debug!("seam {} -> {} skipped: unknown child", seam.parent, seam.child);
                continue;
            };
            let child = transform_from_seam(seam, &parent_world, parent_size, child_size);
            resolved.insert(seam.child.clone(), child);
            queue.push_back(seam.child.clone());
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn key(k: &str) -> PanelKey {
        PanelKey::new(k).unwrap()
    }

    fn sized(k: &str, w: f32, h: f32) -> SizedPanel {
        SizedPanel {
            key: key(k),
            size: PanelSize::new(w, h),
        }
    }

    fn seam(parent: &str, pe: Edge, child: &str, ce: Edge, angle: f64) -> SeamDef {
        SeamDef {
            parent: key(parent),
            parent_edge: pe,
            child: key(child),
            child_edge: ce,
            angle,
        }
    }

    fn world_edge_point(
        resolved: &HashMap<PanelKey, PanelTransform>,
        panels: &[SizedPanel],
        k: &str,
        edge: Edge,
    ) -> Vec3 {
        let size = panels.iter().find(|p| p.key.as_str() == k).unwrap().size;
        resolved[&key(k)].transform_point(edge_point(edge, size))
    }

    #[test]
    fn test_edge_points() {
        let size = PanelSize::new(4.0, 2.0);
        assert_eq!(edge_point(Edge::Right, size), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(edge_point(Edge::Left, size), Vec3::new(-2.0, 0.0, 0.0));
        assert_eq!(edge_point(Edge::Top, size), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(edge_point(Edge::Bottom, size), Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(edge_point(Edge::Unknown, size), Vec3::ZERO);
    }

    #[test]
    fn test_front_and_gussets() {
        let panels = vec![
            sized("front", 10.0, 10.0),
            sized("back", 10.0, 10.0),
            sized("gusset", 10.0, 2.0),
            sized("leftgusset", 10.0, 2.0),
        ];
        let seams = vec![
            seam("front", Edge::Right, "gusset", Edge::Left, 90.0),
            seam("front", Edge::Left, "leftgusset", Edge::Right, -90.0),
        ];
        let resolved = resolve_assembly(&panels, &seams, Some(&key("front")));

        assert_eq!(resolved[&key("front")], PanelTransform::IDENTITY);

        let gusset_left = world_edge_point(&resolved, &panels, "gusset", Edge::Left);
        assert!(gusset_left.abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), 1e-5));
        let expected = Quat::from_axis_angle(Vec3::Y, FRAC_PI_2);
        assert!(resolved[&key("gusset")].rotation.abs_diff_eq(expected, 1e-5));

        let left_right = world_edge_point(&resolved, &panels, "leftgusset", Edge::Right);
        assert!(left_right.abs_diff_eq(Vec3::new(-5.0, 0.0, 0.0), 1e-5));

        // back has no seam path
        assert!(!resolved.contains_key(&key("back")));
    }

    #[test]
    fn test_chain_keeps_edges_coincident() {
        let panels = vec![
            sized("front", 9.0, 6.0),
            sized("bottom", 9.0, 2.0),
            sized("back", 9.0, 6.0),
        ];
        let seams = vec![
            seam("front", Edge::Bottom, "bottom", Edge::Top, 90.0),
            seam("bottom", Edge::Bottom, "back", Edge::Bottom, -90.0),
        ];
        let resolved = resolve_assembly(&panels, &seams, None);

        for s in &seams {
            let parent = world_edge_point(&resolved, &panels, s.parent.as_str(), s.parent_edge);
            let child = world_edge_point(&resolved, &panels, s.child.as_str(), s.child_edge);
            assert!(parent.abs_diff_eq(child, 1e-5), "{parent} != {child}");
        }

        // back folds to sit depth behind front
        let back = resolved[&key("back")];
        assert!(back.position.abs_diff_eq(Vec3::new(0.0, 0.0, -2.0), 1e-5));
    }

    #[test]
    fn test_unknown_root_falls_back_to_first_panel() {
        let panels = vec![sized("a", 1.0, 1.0), sized("b", 1.0, 1.0)];
        let seams = vec![seam("a", Edge::Right, "b", Edge::Left, 0.0)];
        let resolved = resolve_assembly(&panels, &seams, Some(&key("ghost")));
        assert_eq!(resolved[&key("a")], PanelTransform::IDENTITY);
        assert!(resolved[&key("b")]
            .position
            .abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn test_unknown_seam_panels_skipped() {
        let panels = vec![sized("a", 1.0, 1.0), sized("b", 1.0, 1.0)];
        let seams = vec![
            seam("a", Edge::Right, "ghost", Edge::Left, 90.0),
            seam("ghost", Edge::Right, "b", Edge::Left, 90.0),
            seam("a", Edge::Top, "b", Edge::Bottom, 0.0),
        ];
        let resolved = resolve_assembly(&panels, &seams, None);
        assert_eq!(resolved.len(), 2);
        assert!(resolved[&key("b")]
            .position
            .abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-6));
    }

    #[test]
    fn test_first_seam_wins() {
        let panels = vec![sized("a", 2.0, 2.0), sized("b", 2.0, 2.0)];
        let seams = vec![
            seam("a", Edge::Right, "b", Edge::Left, 90.0),
            seam("a", Edge::Top, "b", Edge::Bottom, 45.0),
        ];
        let resolved = resolve_assembly(&panels, &seams, None);
        let expected = Quat::from_axis_angle(Vec3::Y, FRAC_PI_2);
        assert!(resolved[&key("b")].rotation.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn test_cycle_terminates() {
        let panels = vec![sized("a", 1.0, 1.0), sized("b", 1.0, 1.0)];
        let seams = vec![
            seam("a", Edge::Right, "b", Edge::Left, 90.0),
            seam("b", Edge::Right, "a", Edge::Left, 90.0),
        ];
        let resolved = resolve_assembly(&panels, &seams, None);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[&key("a")], PanelTransform::IDENTITY);
    }

    #[test]
    fn test_empty_panels() {
        assert!(resolve_assembly(&[], &[], Some(&key("a"))).is_empty());
    }
}
