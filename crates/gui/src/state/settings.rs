//! Application settings

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Fold/unfold preview tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Real-world units (inches) to scene units
    pub unit_scale: f32,
    /// Gap between flat layout cells, scene units
    pub gap: f32,
    /// Flat layout column count
    pub columns: usize,
    /// Fold/unfold transition length
    pub transition_ms: u64,
    /// Fraction of the remaining camera distance covered per frame
    pub camera_follow: f32,
    /// Camera convergence stops once within this distance
    pub camera_settle: f32,
    /// Extra distance over the exact fit
    pub fit_padding: f32,
    /// Vertical field of view (degrees)
    pub fov_degrees: f32,
    /// Gap between the top of the assembly and a strap
    pub strap_offset: f32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            unit_scale: 0.1,
            gap: 0.2,
            columns: 2,
            transition_ms: 600,
            camera_follow: 0.12,
            camera_settle: 0.01,
            fit_padding: 1.4,
            fov_degrees: 45.0,
            strap_offset: 0.05,
        }
    }
}

impl PreviewConfig {
    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    /// Camera rates forced into `(0, 1]`; unusable values fall back to defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.camera_follow = unit_rate(self.camera_follow, defaults.camera_follow);
        self.camera_settle = unit_rate(self.camera_settle, defaults.camera_settle);
        self
    }
}

fn unit_rate(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value.min(1.0)
    } else {
        fallback
    }
}

/// Viewport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    /// Background color RGB
    pub background_color: [u8; 3],
    /// Panel fill RGB
    pub panel_color: [u8; 3],
    /// Hovered panel fill RGB
    pub highlight_color: [u8; 3],
    /// Draw panel labels at panel centers
    pub show_labels: bool,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            background_color: [251, 250, 248],
            panel_color: [236, 228, 216],
            highlight_color: [214, 196, 170],
            show_labels: true,
        }
    }
}

/// UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Font size in points
    pub font_size: f32,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self { font_size: 14.0 }
    }
}

/// All application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub viewport: ViewportSettings,
    #[serde(default)]
    pub ui: UiSettings,
    /// Base URL of the pattern server, for remote sessions
    #[serde(default)]
    pub server_url: Option<String>,
}

impl AppSettings {
    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "pattern-studio", "pattern-studio")
    }

    /// Load settings from file, or return default if not found
    pub fn load() -> Self {
        if let Some(dirs) = Self::project_dirs() {
            let config_path = dirs.config_dir().join("settings.json");
            if let Ok(json) = std::fs::read_to_string(&config_path) {
                match serde_json::from_str::<Self>(&json) {
                    Ok(mut settings) => {
                        settings.preview = settings.preview.sanitized();
                        return settings;
                    }
                    Err(e) => tracing::warn!("ignoring {}: {e}", config_path.display()),
                }
            }
        }
        Self::default()
    }

    /// Save settings to file
    pub fn save(&self) {
        if let Some(dirs) = Self::project_dirs() {
            let config_dir = dirs.config_dir();
            if std::fs::create_dir_all(config_dir).is_ok() {
                let config_path = config_dir.join("settings.json");
                if let Ok(json) = serde_json::to_string_pretty(self) {
                    if let Err(e) = std::fs::write(&config_path, json) {
                        tracing::warn!("failed to save {}: {e}", config_path.display());
                    }
                }
            }
        }
    }
}
