pub mod preview;
pub mod settings;
pub mod source;

pub use preview::{LoadStatus, PanelPose, PreviewMessage, PreviewState, ViewMode};
pub use settings::{AppSettings, PreviewConfig, UiSettings, ViewportSettings};
pub use source::{FetchError, GeometryLoader, RemoteSession};

/// Panel visibility flags
pub struct PanelVisibility {
    pub parameters: bool,
    pub steps: bool,
}

impl Default for PanelVisibility {
    fn default() -> Self {
        Self {
            parameters: true,
            steps: false,
        }
    }
}

/// Combined application state
pub struct AppState {
    pub preview: PreviewState,
    pub loader: GeometryLoader,
    pub panels: PanelVisibility,
    pub settings: AppSettings,
    /// Panel under the pointer in the viewport
    pub hovered: Option<String>,
    /// Show settings window
    pub show_settings_window: bool,
}

impl AppState {
    pub fn new(settings: AppSettings, loader: GeometryLoader) -> Self {
        Self {
            preview: PreviewState::new(settings.preview.clone()),
            loader,
            panels: PanelVisibility::default(),
            settings,
            hovered: None,
            show_settings_window: false,
        }
    }

    /// Route finished geometry requests into the preview, save due remote
    /// edits, then step one frame
    pub fn tick(&mut self, dt: std::time::Duration) {
        self.loader.poll(&mut self.preview);
        self.loader.flush(std::time::Instant::now());
        self.preview.advance(dt);
    }
}
