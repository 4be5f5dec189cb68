//! Fold/unfold render loop.
//!
//! `PreviewState` owns everything that changes per frame. Inputs arrive as
//! [`PreviewMessage`]s; [`PreviewState::advance`] applies every queued message,
//! then steps the transition, the panel poses and the camera, in that order.

use std::collections::VecDeque;
use std::time::Duration;

use glam::Vec3;
use serde::Serialize;
use shared::{Geometry, PanelKey};

use crate::build::{PanelScene, PanelSize, PanelTransform};
use crate::state::settings::PreviewConfig;
use crate::viewport::bounds::Aabb;
use crate::viewport::camera::{fit_camera_to_box, ArcBallCamera, CameraFit};

/// Which end of the transition the preview is heading to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    Flat,
    Assembled,
}

impl ViewMode {
    pub fn progress(self) -> f32 {
        match self {
            ViewMode::Flat => 0.0,
            ViewMode::Assembled => 1.0,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Flat => ViewMode::Assembled,
            ViewMode::Assembled => ViewMode::Flat,
        }
    }

    /// Direction from the framed box toward the camera
    pub fn camera_direction(self) -> Vec3 {
        match self {
            ViewMode::Flat => Vec3::Z,
            ViewMode::Assembled => Vec3::new(1.0, 0.8, 1.2).normalize(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Flat => "Flat",
            ViewMode::Assembled => "Assembled",
        }
    }
}

/// State of the last geometry request
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// Input to the render loop, applied at the start of the next frame
#[derive(Debug, Clone)]
pub enum PreviewMessage {
    Toggle,
    SetMode(ViewMode),
    GeometryLoading,
    GeometryLoaded(Box<Geometry>),
    GeometryFailed(String),
    Orbit { dx: f32, dy: f32 },
    Pan { dx: f32, dy: f32 },
    Zoom(f32),
    ResetCamera,
}

/// An in-flight eased move of `progress` from `from` to `to`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: f32,
    pub to: f32,
    pub elapsed: Duration,
}

/// Ease-out quadratic on [0, 1]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * (2.0 - t)
}

/// One panel as it should be drawn this frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelPose {
    pub key: PanelKey,
    pub label: String,
    pub size: PanelSize,
    pub transform: PanelTransform,
}

pub struct PreviewState {
    config: PreviewConfig,
    scene: PanelScene,
    geometry: Option<Geometry>,
    mode: ViewMode,
    progress: f32,
    transition: Option<Transition>,
    camera: ArcBallCamera,
    camera_goal: Option<CameraFit>,
    messages: VecDeque<PreviewMessage>,
    status: LoadStatus,
    poses: Vec<PanelPose>,
}

impl PreviewState {
    pub fn new(config: PreviewConfig) -> Self {
        let config = config.sanitized();
        let camera = ArcBallCamera::new().with_fov_degrees(config.fov_degrees);
        Self {
            config,
            scene: PanelScene::default(),
            geometry: None,
            mode: ViewMode::Assembled,
            progress: 1.0,
            transition: None,
            camera,
            camera_goal: None,
            messages: VecDeque::new(),
            status: LoadStatus::Idle,
            poses: Vec::new(),
        }
    }

    /// A state with `geometry` already loaded and posed
    pub fn with_geometry(config: PreviewConfig, geometry: Geometry) -> Self {
        let mut state = Self::new(config);
        state.send(PreviewMessage::GeometryLoaded(Box::new(geometry)));
        state.advance(Duration::ZERO);
        state
    }

    /// Replace the tuning and rebuild the current scene with it
    pub fn set_config(&mut self, config: PreviewConfig) {
        let config = config.sanitized();
        self.camera = self.camera.clone().with_fov_degrees(config.fov_degrees);
        self.config = config;
        if let Some(geometry) = self.geometry.take() {
            self.load_geometry(geometry);
            self.update_poses();
        }
    }

    pub fn send(&mut self, message: PreviewMessage) {
        self.messages.push_back(message);
    }

    /// One frame: drain messages, step the transition, pose panels, move the camera
    pub fn advance(&mut self, dt: Duration) {
        while let Some(message) = self.messages.pop_front() {
            self.apply(message);
        }
        self.step_transition(dt);
        self.update_poses();
        self.step_camera();
    }

    fn apply(&mut self, message: PreviewMessage) {
        match message {
            PreviewMessage::Toggle => self.set_mode(self.mode.toggled()),
            PreviewMessage::SetMode(mode) => {
                if mode != self.mode {
                    self.set_mode(mode);
                }
            }
            PreviewMessage::GeometryLoading => self.status = LoadStatus::Loading,
            PreviewMessage::GeometryLoaded(geometry) => self.load_geometry(*geometry),
            PreviewMessage::GeometryFailed(error) => {
                tracing::warn!("geometry request failed: {error}");
                self.status = LoadStatus::Failed(error);
            }
            PreviewMessage::Orbit { dx, dy } => {
                self.camera_goal = None;
                self.camera.rotate(dx, dy);
            }
            PreviewMessage::Pan { dx, dy } => {
                self.camera_goal = None;
                self.camera.pan(dx, dy);
            }
            PreviewMessage::Zoom(delta) => {
                self.camera_goal = None;
                self.camera.zoom(delta);
            }
            PreviewMessage::ResetCamera => self.snap_camera(),
        }
    }

    /// Redirect toward `mode` from wherever progress currently is
    fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
        self.transition = Some(Transition {
            from: self.progress,
            to: mode.progress(),
            elapsed: Duration::ZERO,
        });

        self.camera_goal = self.fit_for(mode);
        if let Some(goal) = &self.camera_goal {
            // widen the clip range while moving, tighten on arrival
            self.camera.near = self.camera.near.min(goal.near);
            self.camera.far = self.camera.far.max(goal.far);
        }
        tracing::debug!("mode -> {:?} from progress {:.3}", mode, self.progress);
    }

    fn load_geometry(&mut self, geometry: Geometry) {
        let scene = PanelScene::build(&geometry, &self.config);
        tracing::info!(
            "loaded '{}' ({} panels)",
            geometry.assembly_key,
            scene.panels.len()
        );
        self.scene = scene;
        self.geometry = Some(geometry);
        self.status = LoadStatus::Ready;
        self.snap_camera();
    }

    fn snap_camera(&mut self) {
        self.camera_goal = None;
        if let Some(fit) = self.fit_for(self.mode) {
            self.camera.apply_fit(&fit);
        }
    }

    fn fit_for(&self, mode: ViewMode) -> Option<CameraFit> {
        fit_camera_to_box(
            self.bounds_for(mode),
            self.camera.fov,
            self.config.fit_padding,
            mode.camera_direction(),
        )
    }

    pub fn bounds_for(&self, mode: ViewMode) -> &Aabb {
        match mode {
            ViewMode::Flat => &self.scene.flat_box,
            ViewMode::Assembled => &self.scene.assembled_box,
        }
    }

    fn step_transition(&mut self, dt: Duration) {
        let Some(transition) = self.transition.as_mut() else {
            return;
        };
        transition.elapsed += dt;

        let duration = self.config.transition();
        let t = if duration.is_zero() {
            1.0
        } else {
            (transition.elapsed.as_secs_f32() / duration.as_secs_f32()).min(1.0)
        };

        if t >= 1.0 {
            self.progress = transition.to;
            self.transition = None;
        } else {
            self.progress = transition.from + (transition.to - transition.from) * ease_out(t);
        }
    }

    fn update_poses(&mut self) {
        let progress = self.progress;
        self.poses = self
            .scene
            .panels
            .iter()
            .map(|panel| PanelPose {
                key: panel.key.clone(),
                label: panel.label.clone(),
                size: panel.size,
                transform: panel.flat.interpolate(&panel.assembled, progress),
            })
            .collect();
    }

    fn step_camera(&mut self) {
        let Some(goal) = self.camera_goal else {
            return;
        };
        let next = self
            .camera
            .pose()
            .approach(&goal.pose, self.config.camera_follow);
        if next.is_near(&goal.pose, self.config.camera_settle) {
            self.camera.apply_fit(&goal);
            self.camera_goal = None;
        } else {
            self.camera.set_pose(next);
        }
    }

    // ── Accessors ────────────────────────────────────────────

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    pub fn scene(&self) -> &PanelScene {
        &self.scene
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    pub fn camera(&self) -> &ArcBallCamera {
        &self.camera
    }

    pub fn camera_goal(&self) -> Option<&CameraFit> {
        self.camera_goal.as_ref()
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn poses(&self) -> &[PanelPose] {
        &self.poses
    }

    pub fn pose(&self, key: &str) -> Option<&PanelPose> {
        self.poses.iter().find(|pose| pose.key.as_str() == key)
    }

    pub fn pending_messages(&self) -> usize {
        self.messages.len()
    }

    /// Anything still moving (panels or camera)
    pub fn is_animating(&self) -> bool {
        self.transition.is_some() || self.camera_goal.is_some()
    }
}
