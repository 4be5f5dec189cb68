// Library crate: exposes the preview core for integration tests and the agent interface.
// Window, widgets and painting stay in the binary crate.

pub mod build;
pub mod command;
pub mod fixtures;
pub mod harness;
pub mod state;
pub mod validation;

/// Framing and picking math shared by the render loop and the viewport widget.
pub mod viewport {
    pub mod bounds;
    pub mod camera;
    pub mod picking;
}
