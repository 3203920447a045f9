//! orbs-scene: a sky-box with fifty mirror spheres orbiting in front of it.
//!
//! The camera drifts toward the pointer and always looks at the scene origin.
//! [`SceneController`] owns the scene state and is renderer-agnostic; [`run`]
//! wires it to a window and the wgpu surface.

mod app;
pub mod constants;
mod controller;
mod error;
mod pointer;

use anyhow::Result;
use orbs_config::OrbsConfig;
use orbs_window::HostWindow;

pub use app::SceneApp;
pub use controller::{
    AnimatedObject, SceneController, SceneSlot, orbit_position, orbit_timer, wall_clock_ms,
};
pub use error::SceneError;
pub use pointer::PointerOffset;

/// Open the window and animate until it is closed.
pub fn run(config: &OrbsConfig) -> Result<()> {
    let sky_dir = config.assets.resolve(constants::SKYBOX_DIR);
    log::info!("loading sky-box from {}", sky_dir.display());
    let host = HostWindow::new(&config.window.title)?;
    host.run(SceneApp::new(sky_dir))
}
