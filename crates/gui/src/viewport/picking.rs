use glam::Vec3;

use crate::build::{PanelSize, PanelTransform};

/// A ray in world space
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Ray against a transformed panel rectangle. Returns the distance along
/// the ray to the hit, or None.
pub fn ray_panel(ray: &Ray, transform: &PanelTransform, size: &PanelSize) -> Option<f32> {
    let normal = transform.rotation * Vec3::Z;
    let denom = normal.dot(ray.direction);
    if denom.abs() < 1e-6 {
        return None;
    }
    let t = normal.dot(transform.position - ray.origin) / denom;
    if t < 0.0 || !t.is_finite() {
        return None;
    }

    let hit = ray.origin + ray.direction * t;
    let local = transform.rotation.inverse() * (hit - transform.position);
    let (hw, hh) = size.half_extents();
    (local.x.abs() <= hw && local.y.abs() <= hh).then_some(t)
}

/// Index of the nearest panel hit by the ray
pub fn pick_nearest<'a>(
    ray: &Ray,
    panels: impl IntoIterator<Item = (&'a PanelTransform, &'a PanelSize)>,
) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, (transform, size)) in panels.into_iter().enumerate() {
        if let Some(t) = ray_panel(ray, transform, size) {
            if best.map_or(true, |(_, best_t)| t < best_t) {
                best = Some((index, t));
            }
        }
    }
    best.map(|(index, _)| index)
}
