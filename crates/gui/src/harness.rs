//! Headless test harness for driving the preview without a window.
//!
//! Owns a definition, a parameter snapshot and a [`PreviewState`], and steps
//! frames with explicit durations so animations are deterministic.

use std::collections::BTreeMap;
use std::time::Duration;

use shared::{catalog, AssemblyDefinition, Geometry, GeometryEngine, ParamValue};

use crate::build::PanelScene;
use crate::state::preview::{PanelPose, PreviewMessage, PreviewState, ViewMode};
use crate::state::settings::PreviewConfig;
use crate::validation::SceneValidator;

/// Nominal frame length used by [`TestHarness::run_frames`]
pub const FRAME: Duration = Duration::from_millis(16);

/// Headless test harness: definition, parameters and preview state
pub struct TestHarness {
    pub definition: AssemblyDefinition,
    pub snapshot: BTreeMap<String, ParamValue>,
    pub preview: PreviewState,
}

impl TestHarness {
    /// Harness on the built-in zipper pouch
    pub fn new() -> Self {
        Self::with_definition(catalog::zipper_pouch())
    }

    pub fn with_definition(definition: AssemblyDefinition) -> Self {
        Self::with_config(definition, PreviewConfig::default())
    }

    pub fn with_config(definition: AssemblyDefinition, config: PreviewConfig) -> Self {
        let mut harness = Self {
            definition,
            snapshot: BTreeMap::new(),
            preview: PreviewState::new(config),
        };
        harness.reload();
        harness
    }

    // ── Definition + parameters ───────────────────────────────

    /// Load a definition from JSON (replaces current, clears overrides)
    pub fn load_definition_json(&mut self, json: &str) -> Result<(), String> {
        let definition =
            AssemblyDefinition::from_json(json).map_err(|e| format!("JSON parse error: {e}"))?;
        self.definition = definition;
        self.snapshot.clear();
        self.reload();
        Ok(())
    }

    /// Override a parameter and rebuild geometry
    pub fn set_param(&mut self, key: &str, value: impl Into<ParamValue>) {
        self.snapshot.insert(key.to_string(), value.into());
        self.reload();
    }

    /// Geometry for the current definition and overrides
    pub fn geometry(&self) -> Geometry {
        GeometryEngine::new(&self.definition, &self.snapshot).build()
    }

    /// Queue fresh geometry and apply it within one zero-length frame
    pub fn reload(&mut self) {
        let geometry = self.geometry();
        self.preview
            .send(PreviewMessage::GeometryLoaded(Box::new(geometry)));
        self.preview.advance(Duration::ZERO);
    }

    // ── Animation ─────────────────────────────────────────────

    pub fn toggle(&mut self) {
        self.preview.send(PreviewMessage::Toggle);
    }

    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.preview.send(PreviewMessage::Orbit { dx, dy });
    }

    /// Advance one frame of `dt`
    pub fn tick(&mut self, dt: Duration) {
        self.preview.advance(dt);
    }

    pub fn tick_ms(&mut self, ms: u64) {
        self.tick(Duration::from_millis(ms));
    }

    pub fn run_frames(&mut self, frames: usize) {
        for _ in 0..frames {
            self.tick(FRAME);
        }
    }

    /// Step frames until nothing animates, up to `max_frames`. Returns the frame count.
    pub fn settle(&mut self, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames && (self.preview.is_animating() || self.preview.pending_messages() > 0) {
            self.tick(FRAME);
            frames += 1;
        }
        frames
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn mode(&self) -> ViewMode {
        self.preview.mode()
    }

    pub fn progress(&self) -> f32 {
        self.preview.progress()
    }

    pub fn scene(&self) -> &PanelScene {
        self.preview.scene()
    }

    pub fn panel_count(&self) -> usize {
        self.preview.scene().panels.len()
    }

    pub fn pose(&self, key: &str) -> Option<&PanelPose> {
        self.preview.pose(key)
    }

    pub fn validator(&self) -> SceneValidator<'_> {
        SceneValidator::new(self.preview.scene())
    }

    /// Export the current geometry as JSON
    pub fn export_geometry_json(&self) -> String {
        serde_json::to_string_pretty(&self.geometry()).unwrap_or_default()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
