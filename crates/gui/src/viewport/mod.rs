//! 3D viewport: projects the interpolated panel rectangles with the arc-ball
//! camera and paints them back to front with the egui painter.

pub use pattern_gui_lib::viewport::{bounds, camera, picking};

use egui::{Color32, Pos2, Rect, Stroke, Ui};

use crate::state::{AppState, PanelPose, PreviewMessage};
use picking::pick_nearest;

const ORBIT_SPEED: f32 = 0.5;
const PAN_SPEED: f32 = 0.002;
const ZOOM_SPEED: f32 = 0.002;

const OUTLINE: Color32 = Color32::from_rgb(107, 100, 96);
const SEAM_LINE: Color32 = Color32::from_rgb(201, 195, 187);

/// Panel projected to screen space
struct Projected<'a> {
    pose: &'a PanelPose,
    corners: [Pos2; 4],
    center: Pos2,
    depth: f32,
}

#[derive(Default)]
pub struct ViewportPanel;

impl ViewportPanel {
    pub fn new() -> Self {
        Self
    }

    pub fn show(&mut self, ui: &mut Ui, state: &mut AppState) {
        let (rect, response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

        // ── Camera controls ─────────────────────────────
        if response.dragged_by(egui::PointerButton::Primary) {
            let delta = response.drag_delta();
            state.preview.send(PreviewMessage::Orbit {
                dx: -delta.x * ORBIT_SPEED,
                dy: delta.y * ORBIT_SPEED,
            });
        }
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            let delta = response.drag_delta();
            let scale = state.preview.camera().distance * PAN_SPEED;
            state.preview.send(PreviewMessage::Pan {
                dx: -delta.x * scale,
                dy: delta.y * scale,
            });
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll.abs() > 0.1 {
                state.preview.send(PreviewMessage::Zoom(scroll * ZOOM_SPEED));
            }
        }
        if response.double_clicked() {
            state.preview.send(PreviewMessage::ResetCamera);
        }

        // ── Hover picking ─────────────────────────────
        state.hovered = response.hover_pos().and_then(|pos| {
            let ray = state.preview.camera().screen_ray(pos, rect);
            let poses = state.preview.poses();
            pick_nearest(&ray, poses.iter().map(|p| (&p.transform, &p.size)))
                .map(|index| poses[index].key.to_string())
        });

        if !ui.is_rect_visible(rect) {
            return;
        }

        self.paint(ui, rect, state);
    }

    fn paint(&self, ui: &Ui, rect: Rect, state: &AppState) {
        let settings = &state.settings.viewport;
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, rgb(settings.background_color));

        let camera = state.preview.camera();
        let eye = camera.eye_position();

        let mut projected: Vec<Projected<'_>> = state
            .preview
            .poses()
            .iter()
            .filter_map(|pose| {
                let corners = pose
                    .size
                    .local_corners()
                    .map(|corner| camera.project(pose.transform.transform_point(corner), rect));
                let [a, b, c, d] = corners;
                Some(Projected {
                    pose,
                    corners: [a?, b?, c?, d?],
                    center: camera.project(pose.transform.position, rect)?,
                    depth: pose.transform.position.distance(eye),
                })
            })
            .collect();

        if projected.is_empty() {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "No panels",
                egui::FontId::proportional(16.0),
                OUTLINE,
            );
            return;
        }

        // Painter's algorithm: farthest first
        projected.sort_by(|a, b| b.depth.total_cmp(&a.depth));

        let fill = rgb(settings.panel_color);
        let highlight = rgb(settings.highlight_color);
        for panel in &projected {
            let hovered = state.hovered.as_deref() == Some(panel.pose.key.as_str());
            painter.add(egui::Shape::convex_polygon(
                panel.corners.to_vec(),
                if hovered { highlight } else { fill },
                Stroke::new(if hovered { 2.0 } else { 1.0 }, OUTLINE),
            ));
        }

        if settings.show_labels {
            for panel in &projected {
                painter.text(
                    panel.center,
                    egui::Align2::CENTER_CENTER,
                    &panel.pose.label,
                    egui::FontId::proportional(12.0),
                    OUTLINE,
                );
            }
        }

        // Origin marker
        if let Some(origin) = camera.project(glam::Vec3::ZERO, rect) {
            painter.circle_stroke(origin, 3.0, Stroke::new(1.0, SEAM_LINE));
        }
    }
}

fn rgb(color: [u8; 3]) -> Color32 {
    Color32::from_rgb(color[0], color[1], color[2])
}
