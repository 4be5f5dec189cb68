use glam::{Mat4, Vec3, Vec4};

use super::bounds::Aabb;
use super::picking::Ray;

/// Eye and look-at target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub eye: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    /// Move a fraction `t` of the way toward `goal`
    pub fn approach(&self, goal: &CameraPose, t: f32) -> CameraPose {
        CameraPose {
            eye: self.eye.lerp(goal.eye, t),
            target: self.target.lerp(goal.target, t),
        }
    }

    /// Both eye and target within `epsilon` of `other`
    pub fn is_near(&self, other: &CameraPose, epsilon: f32) -> bool {
        self.eye.distance(other.eye) < epsilon && self.target.distance(other.target) < epsilon
    }
}

/// Camera pose and clip planes that frame a bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFit {
    pub pose: CameraPose,
    pub near: f32,
    pub far: f32,
}

/// Frame `bounds` so its largest dimension fits the vertical field of view,
/// looking along `-direction`. Empty or zero-size boxes cannot be framed.
pub fn fit_camera_to_box(bounds: &Aabb, fov: f32, padding: f32, direction: Vec3) -> Option<CameraFit> {
    let max_dim = bounds.max_dimension();
    if bounds.is_empty() || !max_dim.is_finite() || max_dim <= 0.0 {
        return None;
    }
    let half_tan = (fov * 0.5).tan();
    if !half_tan.is_finite() || half_tan <= 0.0 {
        return None;
    }

    let distance = max_dim / (2.0 * half_tan);
    let center = bounds.center();
    let direction = direction.try_normalize().unwrap_or(Vec3::Z);

    Some(CameraFit {
        pose: CameraPose {
            eye: center + direction * distance * padding,
            target: center,
        },
        near: (distance / 100.0).max(0.01),
        far: distance * 100.0,
    })
}

/// Arc-ball camera for 3D viewport
#[derive(Debug, Clone)]
pub struct ArcBallCamera {
    /// Horizontal rotation angle (radians)
    pub yaw: f32,
    /// Vertical rotation angle (radians)
    pub pitch: f32,
    /// Distance from target
    pub distance: f32,
    /// Camera target point
    pub target: Vec3,
    /// Vertical field of view (radians)
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ArcBallCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl ArcBallCamera {
    pub fn new() -> Self {
        Self {
            yaw: 0.6,
            pitch: 0.4,
            distance: 6.0,
            target: Vec3::ZERO,
            fov: 45.0_f32.to_radians(),
            near: 0.01,
            far: 200.0,
        }
    }

    pub fn with_fov_degrees(mut self, degrees: f32) -> Self {
        if degrees.is_finite() && degrees > 1.0 && degrees < 179.0 {
            self.fov = degrees.to_radians();
        }
        self
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx.to_radians();
        self.pitch = (self.pitch + dy.to_radians()).clamp(-1.5, 1.5);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance * (1.0 - delta)).clamp(0.05, 500.0);
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        let right = self.right_vector();
        let up = self.up_vector();
        let offset = right * dx + up * dy;
        self.target += offset;
    }

    /// Camera position in world space
    pub fn eye_position(&self) -> Vec3 {
        let cy = self.yaw.cos();
        let sy = self.yaw.sin();
        let cp = self.pitch.cos();
        let sp = self.pitch.sin();

        self.target
            + Vec3::new(
                self.distance * cp * sy,
                self.distance * sp,
                self.distance * cp * cy,
            )
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            eye: self.eye_position(),
            target: self.target,
        }
    }

    /// Place the camera at `pose.eye` looking at `pose.target`
    pub fn set_pose(&mut self, pose: CameraPose) {
        let offset = pose.eye - pose.target;
        let distance = offset.length();
        self.target = pose.target;
        if !distance.is_finite() || distance < 1e-6 {
            return;
        }
        self.distance = distance;
        self.pitch = (offset.y / distance).clamp(-1.0, 1.0).asin().clamp(-1.5, 1.5);
        self.yaw = offset.x.atan2(offset.z);
    }

    pub fn apply_fit(&mut self, fit: &CameraFit) {
        self.set_pose(fit.pose);
        self.near = fit.near;
        self.far = fit.far;
    }

    /// View matrix (world -> camera)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye_position(), self.target, Vec3::Y)
    }

    /// Projection matrix (camera -> clip)
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, aspect, self.near, self.far.max(self.near * 2.0))
    }

    /// Combined view-projection matrix
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    fn right_vector(&self) -> Vec3 {
        let fwd = (self.target - self.eye_position()).normalize_or_zero();
        fwd.cross(Vec3::Y).normalize_or_zero()
    }

    fn up_vector(&self) -> Vec3 {
        let fwd = (self.target - self.eye_position()).normalize_or_zero();
        let right = self.right_vector();
        right.cross(fwd).normalize_or_zero()
    }

    /// Project a 3D point to 2D screen coords
    pub fn project(&self, point: Vec3, rect: egui::Rect) -> Option<egui::Pos2> {
        let aspect = rect.width() / rect.height();
        let vp = self.view_projection(aspect);
        let p = vp * point.extend(1.0);
        if p.w <= 0.0 {
            return None;
        }
        let ndc = p.truncate() / p.w;
        let screen_x = rect.center().x + ndc.x * rect.width() * 0.5;
        let screen_y = rect.center().y - ndc.y * rect.height() * 0.5;
        Some(egui::pos2(screen_x, screen_y))
    }

    /// Cast a ray from a screen position into the 3D scene
    pub fn screen_ray(&self, screen_pos: egui::Pos2, rect: egui::Rect) -> Ray {
        let aspect = rect.width() / rect.height();

        // Screen → NDC
        let ndc_x = (screen_pos.x - rect.center().x) / (rect.width() * 0.5);
        let ndc_y = -(screen_pos.y - rect.center().y) / (rect.height() * 0.5);

        let vp_inv = self.view_projection(aspect).inverse();

        let near_world = vp_inv * Vec4::new(ndc_x, ndc_y, -1.0, 1.0);
        let far_world = vp_inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);

        let near = near_world.truncate() / near_world.w;
        let far = far_world.truncate() / far_world.w;

        Ray {
            origin: self.eye_position(),
            direction: (far - near).normalize_or_zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        let mut b = Aabb::EMPTY;
        b.expand(Vec3::new(-1.0, -0.5, 0.0));
        b.expand(Vec3::new(1.0, 0.5, 0.0));
        b
    }

    #[test]
    fn test_fit_flat_straight_on() {
        let fov = 45.0_f32.to_radians();
        let fit = fit_camera_to_box(&unit_box(), fov, 1.4, Vec3::Z).unwrap();
        let distance = 2.0 / (2.0 * (fov * 0.5).tan());
        assert_eq!(fit.pose.target, Vec3::ZERO);
        assert!(fit.pose.eye.abs_diff_eq(Vec3::new(0.0, 0.0, distance * 1.4), 1e-5));
        assert!((fit.near - (distance / 100.0).max(0.01)).abs() < 1e-6);
        assert!((fit.far - distance * 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_fit_assembled_oblique() {
        let dir = Vec3::new(1.0, 0.8, 1.2).normalize();
        let fit = fit_camera_to_box(&unit_box(), 0.8, 1.4, dir).unwrap();
        let offset = (fit.pose.eye - fit.pose.target).normalize();
        assert!(offset.abs_diff_eq(dir, 1e-5));
    }

    #[test]
    fn test_fit_degenerate_boxes() {
        assert!(fit_camera_to_box(&Aabb::EMPTY, 0.8, 1.4, Vec3::Z).is_none());
        let mut point = Aabb::EMPTY;
        point.expand(Vec3::ONE);
        assert!(fit_camera_to_box(&point, 0.8, 1.4, Vec3::Z).is_none());
    }

    #[test]
    fn test_set_pose_roundtrip() {
        let mut camera = ArcBallCamera::new();
        let pose = CameraPose {
            eye: Vec3::new(3.0, 2.0, 4.0),
            target: Vec3::new(0.5, 0.0, -1.0),
        };
        camera.set_pose(pose);
        assert!(camera.pose().is_near(&pose, 1e-4));
    }

    #[test]
    fn test_approach_converges() {
        let goal = CameraPose {
            eye: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
        };
        let mut pose = CameraPose {
            eye: Vec3::new(5.0, 5.0, 5.0),
            target: Vec3::ONE,
        };
        for _ in 0..200 {
            pose = pose.approach(&goal, 0.12);
        }
        assert!(pose.is_near(&goal, 0.01));
    }

    #[test]
    fn test_project_center() {
        let mut camera = ArcBallCamera::new();
        camera.set_pose(CameraPose {
            eye: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
        });
        let rect = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(200.0, 100.0));
        let p = camera.project(Vec3::ZERO, rect).unwrap();
        assert!((p.x - 100.0).abs() < 1e-3 && (p.y - 50.0).abs() < 1e-3);
    }
}
