//! Property-based tests for layout, seam assembly, centering and the render loop.
//!
//! Run with: cargo test -p pattern-gui -- proptest

use std::time::Duration;

use glam::{Quat, Vec3};
use pattern_gui_lib::build::seams::edge_point;
use pattern_gui_lib::build::{center_on_origin, flat_layout, resolve_assembly, PanelSize, PanelTransform, SizedPanel};
use pattern_gui_lib::fixtures;
use pattern_gui_lib::state::{PreviewConfig, PreviewMessage, PreviewState};
use proptest::prelude::*;
use shared::{catalog, Edge, SeamDef};

// =============================================================================
// Strategies
// =============================================================================

fn arb_size() -> impl Strategy<Value = PanelSize> {
    (0.0f32..10.0, 0.0f32..10.0).prop_map(|(w, h)| PanelSize::new(w, h))
}

fn arb_edge() -> impl Strategy<Value = Edge> {
    prop_oneof![
        Just(Edge::Left),
        Just(Edge::Right),
        Just(Edge::Top),
        Just(Edge::Bottom),
    ]
}

fn arb_transform() -> impl Strategy<Value = PanelTransform> {
    (
        prop::array::uniform3(-20.0f32..20.0),
        prop::array::uniform3(-1.0f32..1.0),
        -3.1f32..3.1,
    )
        .prop_map(|(position, axis, angle)| {
            let axis = Vec3::from_array(axis).try_normalize().unwrap_or(Vec3::Y);
            PanelTransform::new(Vec3::from_array(position), Quat::from_axis_angle(axis, angle))
        })
}

/// Random seam tree: panel `i > 0` hangs off a random earlier panel.
fn arb_tree() -> impl Strategy<Value = (Vec<SizedPanel>, Vec<SeamDef>)> {
    prop::collection::vec((0.5f32..5.0, 0.5f32..5.0), 2..8)
        .prop_flat_map(|sizes| {
            let links = prop::collection::vec(
                (any::<prop::sample::Index>(), arb_edge(), arb_edge(), -180.0f64..180.0),
                sizes.len() - 1,
            );
            (Just(sizes), links)
        })
        .prop_map(|(sizes, links)| {
            let panels = sizes
                .iter()
                .enumerate()
                .map(|(i, &(w, h))| fixtures::sized(&format!("p{i}"), w, h))
                .collect();
            let seams = links
                .iter()
                .enumerate()
                .map(|(i, (parent, parent_edge, child_edge, angle))| {
                    let child = i + 1;
                    let parent = parent.index(child);
                    fixtures::seam(
                        &format!("p{parent}"),
                        *parent_edge,
                        &format!("p{child}"),
                        *child_edge,
                        *angle,
                    )
                })
                .collect();
            (panels, seams)
        })
}

// =============================================================================
// Flat layout
// =============================================================================

proptest! {
    #[test]
    fn proptest_rows_stack_downward(
        sizes in prop::collection::vec(arb_size(), 0..12),
        columns in 1usize..5,
        gap in 0.0f32..1.0,
    ) {
        let layout = flat_layout(&sizes, columns, gap);
        prop_assert_eq!(layout.len(), sizes.len());

        for (i, (a, sa)) in layout.iter().zip(&sizes).enumerate() {
            prop_assert_eq!(a.rotation, Quat::IDENTITY);
            prop_assert_eq!(a.position.z, 0.0);
            for (j, (b, sb)) in layout.iter().zip(&sizes).enumerate() {
                let (row_a, row_b) = (i / columns, j / columns);
                let (col_a, col_b) = (i % columns, j % columns);
                if row_b > row_a {
                    // every later row sits entirely below
                    prop_assert!(b.position.y + sb.height / 2.0 <= a.position.y - sa.height / 2.0 + 1e-4);
                }
                if col_b > col_a {
                    prop_assert!(b.position.x - sb.width / 2.0 >= a.position.x + sa.width / 2.0 - 1e-4);
                }
            }
        }
    }

    #[test]
    fn proptest_zero_columns_is_one_column(sizes in prop::collection::vec(arb_size(), 0..6)) {
        prop_assert_eq!(flat_layout(&sizes, 0, 0.2), flat_layout(&sizes, 1, 0.2));
    }
}

// =============================================================================
// Seam assembly
// =============================================================================

proptest! {
    #[test]
    fn proptest_seam_edges_coincide((panels, seams) in arb_tree()) {
        let root = panels[0].key.clone();
        let resolved = resolve_assembly(&panels, &seams, Some(&root));
        prop_assert_eq!(resolved.len(), panels.len());
        prop_assert_eq!(resolved[&root], PanelTransform::IDENTITY);

        let size_of = |key: &str| panels.iter().find(|p| p.key.as_str() == key).map(|p| p.size);
        for seam in &seams {
            let parent = resolved[&seam.parent];
            let child = resolved[&seam.child];
            let parent_point = parent.transform_point(edge_point(seam.parent_edge, size_of(seam.parent.as_str()).unwrap()));
            let child_point = child.transform_point(edge_point(seam.child_edge, size_of(seam.child.as_str()).unwrap()));
            prop_assert!(
                parent_point.abs_diff_eq(child_point, 1e-3),
                "seam {} -> {}: {} vs {}", seam.parent, seam.child, parent_point, child_point
            );
        }
    }

    #[test]
    fn proptest_assembly_is_deterministic((panels, seams) in arb_tree()) {
        let first = resolve_assembly(&panels, &seams, None);
        let second = resolve_assembly(&panels, &seams, None);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn proptest_rotations_stay_normalized((panels, seams) in arb_tree()) {
        let resolved = resolve_assembly(&panels, &seams, None);
        for transform in resolved.values() {
            prop_assert!((transform.rotation.length() - 1.0).abs() < 1e-4);
        }
    }
}

// =============================================================================
// Interpolation and centering
// =============================================================================

proptest! {
    #[test]
    fn proptest_interpolation_endpoints(a in arb_transform(), b in arb_transform(), t in 0.0f32..1.0) {
        prop_assert_eq!(a.interpolate(&b, 0.0), a);
        prop_assert_eq!(a.interpolate(&b, 1.0), b);

        let mid = a.interpolate(&b, t);
        prop_assert!((mid.rotation.length() - 1.0).abs() < 1e-4);
        prop_assert!(mid.position.is_finite());
    }

    #[test]
    fn proptest_centering_moves_box_to_origin(
        placed in prop::collection::vec((arb_transform(), arb_size()), 1..10),
    ) {
        let (mut transforms, sizes): (Vec<PanelTransform>, Vec<PanelSize>) = placed.into_iter().unzip();
        let centered = center_on_origin(&mut transforms, &sizes);
        prop_assert!(centered.center().abs_diff_eq(Vec3::ZERO, 1e-3));

        let recomputed = pattern_gui_lib::viewport::bounds::Aabb::from_panels(transforms.iter().zip(&sizes));
        prop_assert!(recomputed.center().abs_diff_eq(Vec3::ZERO, 1e-3));
    }
}

// =============================================================================
// Render loop
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn proptest_reversal_is_continuous(
        reverse_after in 0usize..40,
        frames in prop::collection::vec(1u64..40, 60..80),
    ) {
        let geometry = fixtures::geometry_of(&catalog::zipper_pouch());
        let mut state = PreviewState::with_geometry(PreviewConfig::default(), geometry);
        state.send(PreviewMessage::Toggle);
        state.advance(Duration::ZERO);

        let mut last = state.progress();
        for (index, ms) in frames.iter().enumerate() {
            if index == reverse_after {
                state.send(PreviewMessage::Toggle);
            }
            state.advance(Duration::from_millis(*ms));
            let now = state.progress();
            // ease-out slope never exceeds 2 per window
            prop_assert!((now - last).abs() <= 2.0 * *ms as f32 / 600.0 + 1e-4);
            prop_assert!((0.0..=1.0).contains(&now));
            last = now;
        }
        state.advance(Duration::from_millis(600));
        prop_assert_eq!(state.progress(), 1.0);
    }
}
